//! Hosted delivery authenticated with a service-account key file.

use std::fs;
use std::path::Path;

use jsonwebtoken::EncodingKey;
use serde::Deserialize;

use super::cloud::{http_client, CloudTransport, TokenSource};
use super::worker::BufferedSink;
use super::{BatchOptions, SinkError};
use crate::config::RemoteConfig;
use crate::context::LogIdentity;
use crate::logger::Level;

pub const NAME: &str = "credentials";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The parts of a service-account key file this sink uses.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Read and parse a key file. Any problem is a construction error.
    pub fn from_file(path: &Path) -> Result<Self, SinkError> {
        let display = path.display().to_string();
        let data = fs::read(path).map_err(|source| SinkError::CredentialsUnreadable {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&data).map_err(|message| SinkError::CredentialsMalformed { path: display, message })
    }

    fn from_json(data: &[u8]) -> Result<Self, String> {
        let key: ServiceAccountKey = serde_json::from_slice(data).map_err(|e| e.to_string())?;
        for (name, value) in [
            ("project_id", &key.project_id),
            ("client_email", &key.client_email),
            ("private_key", &key.private_key),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{name} is empty"));
            }
        }
        Ok(key)
    }

    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }

    fn encoding_key(&self) -> Result<EncodingKey, String> {
        EncodingKey::from_rsa_pem(self.private_key.as_bytes()).map_err(|e| format!("private_key: {e}"))
    }
}

/// Host name for the node id label.
fn node_hostname() -> Result<String, String> {
    let name = hostname::get().map_err(|e| e.to_string())?;
    let name = name.to_string_lossy().trim().to_string();
    if name.is_empty() {
        return Err("host name is empty".to_string());
    }
    Ok(name)
}

/// Load the key file and start the delivery worker.
pub(super) fn start(remote: &RemoteConfig, options: BatchOptions, diag: LogIdentity) -> Result<BufferedSink, SinkError> {
    let key = ServiceAccountKey::from_file(&remote.credentials_path)?;
    let encoding_key = key.encoding_key().map_err(|message| SinkError::CredentialsMalformed {
        path: remote.credentials_path.display().to_string(),
        message,
    })?;

    let node_id = node_hostname().unwrap_or_else(|e| {
        diag.emit(Level::Warn, format_args!("Error determining hostname: {e}"), None);
        "unknown".to_string()
    });

    let client = http_client()?;
    let transport = CloudTransport::new(
        client,
        &remote.api_endpoint,
        &key.project_id,
        &node_id,
        &remote.log_name,
        TokenSource::ServiceAccount {
            client_email: key.client_email.clone(),
            token_uri: key.token_uri().to_string(),
            key: encoding_key,
        },
    );

    let sink = BufferedSink::spawn(NAME, options, diag.clone(), move || async move { Ok(transport) })?;
    diag.emit(
        Level::Info,
        format_args!(
            "Starting remote logging with service account '{}' on project '{}' with node id '{}'",
            key.client_email, key.project_id, node_id
        ),
        None,
    );
    Ok(sink)
}
