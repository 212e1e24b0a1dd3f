use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an RPC error reply.
    #[error("{code}: {message}")]
    Status { code: String, message: String },

    #[error("unexpected reply (HTTP {status}): {body}")]
    Decode { status: StatusCode, body: String },
}

impl ClientError {
    /// RPC status code, when the server produced one.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Status { code, .. } => Some(code),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorReply {
    code: String,
    message: String,
}

#[derive(Deserialize)]
struct HealthReply {
    status: String,
}

/// Client for the `/rpc/<service>/<method>` JSON transport.
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: Client,
    base_url: String,
}

impl RpcClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Invoke `service/method` with a JSON payload.
    pub async fn call(&self, service: &str, method: &str, payload: &Value) -> Result<Value, ClientError> {
        let resp = self
            .client
            .post(format!("{}/rpc/{}/{}", self.base_url, service, method))
            .json(payload)
            .send()
            .await?;

        decode(resp).await
    }

    /// Serving status reported by `GET /health` (`SERVING` or `NOT_SERVING`).
    pub async fn health(&self) -> Result<String, ClientError> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        match serde_json::from_str::<HealthReply>(&text) {
            Ok(reply) => Ok(reply.status),
            Err(_) => Err(ClientError::Decode { status, body: text }),
        }
    }
}

async fn decode(resp: Response) -> Result<Value, ClientError> {
    let status = resp.status();
    let text = resp.text().await?;

    if status.is_success() {
        return serde_json::from_str(&text).map_err(|_| ClientError::Decode { status, body: text });
    }

    match serde_json::from_str::<ErrorReply>(&text) {
        Ok(reply) => Err(ClientError::Status {
            code: reply.code,
            message: reply.message,
        }),
        Err(_) => Err(ClientError::Decode { status, body: text }),
    }
}
