//! Delivery through a local logging agent.
//!
//! Records are written as forward-protocol JSON messages, one per line:
//! `[tag, unix_seconds, payload]`. The agent is expected to be running; a
//! failed initial connection is a construction error.

use std::io;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::payload::{payload, severity};
use super::worker::{BufferedSink, Transport};
use super::{BatchOptions, DeliveryError, SinkError};
use crate::config::RemoteConfig;
use crate::context::LogIdentity;
use crate::logger::Record;

pub const NAME: &str = "agent";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

struct AgentTransport {
    address: String,
    tag: String,
    stream: Option<TcpStream>,
    write_timeout: Duration,
}

/// Connect to `address`, giving up after `limit`.
async fn dial(address: &str, limit: Duration) -> io::Result<TcpStream> {
    timeout(limit, TcpStream::connect(address))
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, format!("connect timed out after {limit:?}")))?
}

impl AgentTransport {
    async fn connect(address: String, tag: String) -> Result<Self, SinkError> {
        let stream = dial(&address, CONNECT_TIMEOUT)
            .await
            .map_err(|source| SinkError::AgentUnreachable {
                address: address.clone(),
                source,
            })?;
        Ok(Self {
            address,
            tag,
            stream: Some(stream),
            write_timeout: WRITE_TIMEOUT,
        })
    }

    fn encode(&self, batch: &[Record]) -> Result<Vec<u8>, DeliveryError> {
        let mut buf = Vec::with_capacity(batch.len() * 256);
        for record in batch {
            let mut body = payload(record);
            if let Value::Object(map) = &mut body {
                map.insert("severity".to_string(), Value::String(severity(record.level).to_string()));
            }
            serde_json::to_writer(&mut buf, &json!([self.tag, record.time.timestamp(), body]))?;
            buf.push(b'\n');
        }
        Ok(buf)
    }
}

impl Transport for AgentTransport {
    async fn send(&mut self, batch: &[Record]) -> Result<(), DeliveryError> {
        let buf = self.encode(batch)?;
        let mut stream = match self.stream.take() {
            Some(stream) => stream,
            None => dial(&self.address, CONNECT_TIMEOUT).await?,
        };
        let write = async {
            stream.write_all(&buf).await?;
            stream.flush().await
        };
        timeout(self.write_timeout, write)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "agent stopped reading"))??;
        // Only keep connections that are known to work.
        self.stream = Some(stream);
        Ok(())
    }
}

/// Connect to the agent and start the delivery worker.
pub(super) fn start(remote: &RemoteConfig, options: BatchOptions, diag: LogIdentity) -> Result<BufferedSink, SinkError> {
    let address = remote.agent_address.clone();
    let tag = remote.log_name.clone();
    let worker_diag = diag.clone();
    let sink = BufferedSink::spawn(NAME, options, worker_diag, move || AgentTransport::connect(address, tag))?;
    diag.emit(
        crate::logger::Level::Info,
        format_args!("Shipping logs to agent at {}", remote.agent_address),
        None,
    );
    Ok(sink)
}
