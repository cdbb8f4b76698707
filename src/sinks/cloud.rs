//! Delivery to the hosted logging API.
//!
//! Uses `reqwest` for transport. Access tokens come either from the instance
//! metadata server or from an RS256-signed JWT-bearer grant, and are cached
//! until shortly before they expire.

use std::time::{Duration, Instant};

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::payload::{payload, severity};
use super::worker::Transport;
use super::DeliveryError;
use crate::logger::Record;

/// Scope requested for service-account tokens.
const LOGGING_WRITE_SCOPE: &str = "https://www.googleapis.com/auth/logging.write";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for signed assertions.
const ASSERTION_VALIDITY: Duration = Duration::from_secs(60 * 60);

/// Tokens are refreshed this long before their reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

pub(super) const METADATA_FLAVOR: (&str, &str) = ("Metadata-Flavor", "Google");

/// JWT claims for the JWT-bearer grant.
#[derive(Debug, Serialize, Deserialize)]
struct GrantClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Cached access token with expiry tracking.
struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Where access tokens come from.
pub(super) enum TokenSource {
    /// `instance/service-accounts/default/token` on the metadata server.
    Metadata { base_url: String },
    /// A service-account key signing its own assertions.
    ServiceAccount {
        client_email: String,
        token_uri: String,
        key: EncodingKey,
    },
}

impl TokenSource {
    async fn fetch(&self, client: &reqwest::Client) -> Result<CachedToken, DeliveryError> {
        let request = match self {
            TokenSource::Metadata { base_url } => client
                .get(format!(
                    "{}/computeMetadata/v1/instance/service-accounts/default/token",
                    base_url.trim_end_matches('/')
                ))
                .header(METADATA_FLAVOR.0, METADATA_FLAVOR.1),
            TokenSource::ServiceAccount {
                client_email,
                token_uri,
                key,
            } => {
                let assertion = sign_assertion(client_email, token_uri, key)?;
                let body = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("grant_type", JWT_BEARER_GRANT)
                    .append_pair("assertion", &assertion)
                    .finish();
                client
                    .post(token_uri)
                    .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(body)
            }
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Token(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                response.text().await.unwrap_or_default()
            )));
        }
        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(ASSERTION_VALIDITY.as_secs()));
        Ok(CachedToken {
            token: token.access_token,
            expires_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        })
    }
}

fn sign_assertion(client_email: &str, token_uri: &str, key: &EncodingKey) -> Result<String, DeliveryError> {
    let iat = chrono::Utc::now().timestamp();
    let claims = GrantClaims {
        iss: client_email.to_string(),
        scope: LOGGING_WRITE_SCOPE.to_string(),
        aud: token_uri.to_string(),
        iat,
        exp: iat + ASSERTION_VALIDITY.as_secs() as i64,
    };
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, key)
        .map_err(|e| DeliveryError::Token(format!("JWT signing failed: {e}")))
}

/// Writes batches with `entries:write`.
pub(super) struct CloudTransport {
    client: reqwest::Client,
    write_url: String,
    log_name: String,
    resource: Value,
    tokens: TokenSource,
    cached_token: Option<CachedToken>,
}

impl CloudTransport {
    pub(super) fn new(
        client: reqwest::Client,
        api_endpoint: &str,
        project_id: &str,
        node_id: &str,
        log_name: &str,
        tokens: TokenSource,
    ) -> Self {
        Self {
            client,
            write_url: format!("{}/v2/entries:write", api_endpoint.trim_end_matches('/')),
            log_name: format!("projects/{project_id}/logs/{log_name}"),
            resource: json!({
                "type": "generic_node",
                "labels": { "project_id": project_id, "node_id": node_id },
            }),
            tokens,
            cached_token: None,
        }
    }

    async fn access_token(&mut self) -> Result<String, DeliveryError> {
        if let Some(cached) = &self.cached_token {
            if Instant::now() < cached.expires_at {
                return Ok(cached.token.clone());
            }
        }
        let fresh = self.tokens.fetch(&self.client).await?;
        let token = fresh.token.clone();
        self.cached_token = Some(fresh);
        Ok(token)
    }

    fn body(&self, batch: &[Record]) -> Value {
        let entries: Vec<Value> = batch
            .iter()
            .map(|record| {
                json!({
                    "timestamp": record.time.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
                    "severity": severity(record.level),
                    "jsonPayload": payload(record),
                })
            })
            .collect();
        json!({
            "logName": self.log_name,
            "resource": self.resource,
            "entries": entries,
        })
    }
}

impl Transport for CloudTransport {
    async fn send(&mut self, batch: &[Record]) -> Result<(), DeliveryError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .post(&self.write_url)
            .bearer_auth(&token)
            .json(&self.body(batch))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.cached_token = None;
        }
        Err(DeliveryError::Status {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}

/// HTTP client shared by the hosted-API sinks.
pub(super) fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(Duration::from_secs(30)).build()
}
