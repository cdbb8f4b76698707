//! Hosted delivery with identity discovered from the instance metadata server.

use super::cloud::{http_client, CloudTransport, TokenSource, METADATA_FLAVOR};
use super::worker::BufferedSink;
use super::{BatchOptions, SinkError};
use crate::config::RemoteConfig;
use crate::context::LogIdentity;
use crate::logger::Level;

pub const NAME: &str = "metadata";

const UNKNOWN_NODE: &str = "unknown";

async fn lookup(client: &reqwest::Client, base_url: &str, path: &str) -> Result<String, String> {
    let url = format!("{}/computeMetadata/v1/{path}", base_url.trim_end_matches('/'));
    let response = client
        .get(&url)
        .header(METADATA_FLAVOR.0, METADATA_FLAVOR.1)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("{url} returned {}", status.as_u16()));
    }
    let body = response.text().await.map_err(|e| e.to_string())?;
    let value = body.trim();
    if value.is_empty() {
        return Err(format!("{url} returned an empty value"));
    }
    Ok(value.to_string())
}

async fn connect(
    remote: RemoteConfig,
    client: reqwest::Client,
    diag: LogIdentity,
) -> Result<CloudTransport, SinkError> {
    let node_id = match lookup(&client, &remote.metadata_url, "instance/name").await {
        Ok(name) => name,
        Err(e) => {
            diag.emit(
                Level::Warn,
                format_args!("Error determining instance id: {e}"),
                None,
            );
            UNKNOWN_NODE.to_string()
        }
    };
    let project_id = lookup(&client, &remote.metadata_url, "project/project-id")
        .await
        .map_err(SinkError::ProjectUnresolved)?;

    diag.emit(
        Level::Info,
        format_args!("Starting remote logging via metadata server on project '{project_id}' with node id '{node_id}'"),
        None,
    );

    Ok(CloudTransport::new(
        client,
        &remote.api_endpoint,
        &project_id,
        &node_id,
        &remote.log_name,
        TokenSource::Metadata {
            base_url: remote.metadata_url.clone(),
        },
    ))
}

/// Resolve project and instance, then start the delivery worker.
///
/// An unresolvable project is a construction error; an unresolvable instance
/// name is only a warning.
pub(super) fn start(remote: &RemoteConfig, options: BatchOptions, diag: LogIdentity) -> Result<BufferedSink, SinkError> {
    let client = http_client()?;
    let remote = remote.clone();
    let connect_diag = diag.clone();
    BufferedSink::spawn(NAME, options, diag, move || connect(remote, client, connect_diag))
}
