//! Typed client for the voice demo bridge.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct AskRequest<'a> {
    pub persona: &'a str,
    pub message: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub reply_text: String,
    pub reply_audio_url: String,
    pub persona: String,
    pub timestamp: String,
}

/// Failure body returned by the bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct Failure {
    pub error: String,
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub healthy: bool,
    pub reachable: bool,
    pub status: String,
    pub websocket_available: bool,
    #[serde(default)]
    pub services: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
    pub upstream: String,
    pub timestamp: String,
}

#[derive(Debug)]
pub enum ClientError {
    /// The bridge answered with a structured failure.
    Bridge { status: StatusCode, failure: Failure },
    Http(reqwest::Error),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Bridge { status, failure } => {
                write!(f, "bridge returned {} ({}): {}", status, failure.kind, failure.error)
            }
            ClientError::Http(e) => write!(f, "HTTP error: {}", e),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e)
    }
}

pub struct VoiceBridgeClient {
    client: Client,
    endpoint: String,
}

impl VoiceBridgeClient {
    /// `base_url` is the bridge origin, e.g. "http://localhost:3000".
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/api/voice-demo", base_url.trim_end_matches('/')),
        }
    }

    /// Ask a persona one question.
    pub async fn ask(&self, persona: &str, message: &str) -> Result<Reply, ClientError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&AskRequest { persona, message })
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(resp.json::<Reply>().await?)
        } else {
            let failure = resp.json::<Failure>().await?;
            Err(ClientError::Bridge { status, failure })
        }
    }

    /// Fetch voice service diagnostics. Unhealthy results are not errors.
    pub async fn health(&self) -> Result<Health, ClientError> {
        let resp = self.client.get(&self.endpoint).send().await?;
        Ok(resp.json::<Health>().await?)
    }
}
