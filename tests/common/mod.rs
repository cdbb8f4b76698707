//! Shared utilities for integration testing.
//!
//! Mock servers run on their own thread with their own runtime, so tests can
//! call the blocking initialization and drain APIs directly.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use ctxlog::testing::SharedBuffer;
use ctxlog::{Builder, Context, Logger, LoggingConfig};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

pub const RSA_KEY_PEM: &str = include_str!("../fixtures/rsa_key.pem");

/// Run `serve` on a fresh listener bound to an ephemeral port.
fn spawn_server<F, Fut>(serve: F) -> SocketAddr
where
    F: FnOnce(TcpListener) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()>,
{
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    std_listener.set_nonblocking(true).unwrap();
    let addr = std_listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = TcpListener::from_std(std_listener).unwrap();
            serve(listener).await;
        });
    });
    addr
}

/// Poll `f` until it returns `Some` or `timeout` elapses.
pub fn wait_for<T>(timeout: Duration, mut f: impl FnMut() -> Option<T>) -> Option<T> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = f() {
            return Some(value);
        }
        if Instant::now() >= deadline {
            return None;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

/// A logging agent that records every line it receives.
pub struct MockAgent {
    pub addr: SocketAddr,
    lines: Arc<Mutex<Vec<String>>>,
}

impl MockAgent {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.lines().iter().map(|l| serde_json::from_str(l).unwrap()).collect()
    }
}

pub fn start_mock_agent() -> MockAgent {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    let addr = spawn_server(move |listener| async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            let sink = sink.clone();
            tokio::spawn(async move {
                let mut reader = BufReader::new(socket).lines();
                while let Ok(Some(line)) = reader.next_line().await {
                    sink.lock().unwrap().push(line);
                }
            });
        }
    });
    MockAgent { addr, lines }
}

/// One request received by [`MockHttp`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// An HTTP/1.1 server answering from a closure and recording requests.
pub struct MockHttp {
    pub base_url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockHttp {
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<CapturedRequest> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<CapturedRequest> {
    let mut reader = BufReader::new(socket);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await.ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await.ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_string(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await.ok()?;

    Some(CapturedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Start a programmable mock backend answering `(status, body)`.
pub fn start_programmable_backend<F>(respond: F) -> MockHttp
where
    F: Fn(&CapturedRequest) -> (u16, String) + Send + Sync + 'static,
{
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = requests.clone();
    let respond = Arc::new(respond);
    let addr = spawn_server(move |listener| async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let log = log.clone();
            let respond = respond.clone();
            tokio::spawn(async move {
                let Some(request) = read_request(&mut socket).await else {
                    return;
                };
                let (status, body) = respond(&request);
                log.lock().unwrap().push(request);

                let status_text = match status {
                    200 => "200 OK",
                    401 => "401 Unauthorized",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    MockHttp {
        base_url: format!("http://{addr}"),
        requests,
    }
}

/// Standard token response.
pub fn token_body(token: &str) -> String {
    format!(r#"{{"access_token":"{token}","expires_in":3600,"token_type":"Bearer"}}"#)
}

/// Remote config with fast batching, pointed at `mock` for every endpoint.
pub fn remote_config(mock: &MockHttp) -> LoggingConfig {
    let mut config = LoggingConfig::default();
    config.remote.enabled = true;
    config.remote.metadata_url = mock.base_url.clone();
    config.remote.api_endpoint = mock.base_url.clone();
    config.remote.flush_interval_ms = 50;
    config.remote.max_retries = 1;
    config.remote.exit_timeout_ms = 5_000;
    config
}

/// Write a service-account key file whose token endpoint is `token_uri`.
pub fn write_service_account(token_uri: &str) -> tempfile::NamedTempFile {
    let key = serde_json::json!({
        "type": "service_account",
        "project_id": "proj-test",
        "private_key_id": "fixture",
        "private_key": RSA_KEY_PEM,
        "client_email": "ctxlog@proj-test.iam.gserviceaccount.com",
        "token_uri": token_uri,
    });
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), serde_json::to_vec(&key).unwrap()).unwrap();
    file
}

/// Non-interactive root logger writing into a buffer.
pub fn build(app_name: &str, config: LoggingConfig) -> Result<(Context, Logger, SharedBuffer), ctxlog::SinkError> {
    let buffer = SharedBuffer::new();
    let (ctx, logger) = Builder::new(app_name, config)
        .terminal(false)
        .writer(buffer.clone())
        .build()?;
    Ok((ctx, logger, buffer))
}
