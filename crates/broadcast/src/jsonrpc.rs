use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// JSON-RPC 2.0 call failures
#[derive(Error, Debug)]
pub enum JsonRpcError {
    /// The reqwest error is the source, not part of this message
    #[error("Failed to send RPC request")]
    Transport(#[from] reqwest::Error),

    #[error("RPC request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The node answered with a JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Rejected { code: i64, message: String },

    #[error("Failed to parse RPC response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    result: Option<Value>,
    error: Option<ErrorObject>,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Minimal JSON-RPC 2.0 client over a shared reqwest client
#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    http: Client,
    url: String,
}

impl JsonRpcClient {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, JsonRpcError> {
        debug!("JSON-RPC {} -> {}", method, self.url);

        let request_body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response = self.http.post(&self.url).json(&request_body).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Nodes often pair an error object with a non-2xx status; the error
        // object is the more useful of the two.
        let envelope = match serde_json::from_str::<Envelope>(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(JsonRpcError::InvalidResponse(e.to_string()))
            }
            Err(_) => return Err(JsonRpcError::Status { status, body }),
        };

        if let Some(error) = envelope.error {
            let message = if error.message.is_empty() {
                "Unknown error".to_string()
            } else {
                error.message
            };
            return Err(JsonRpcError::Rejected {
                code: error.code,
                message,
            });
        }

        if !status.is_success() {
            return Err(JsonRpcError::Status { status, body });
        }

        let result = envelope
            .result
            .ok_or_else(|| JsonRpcError::InvalidResponse("missing result".to_string()))?;

        serde_json::from_value(result).map_err(|e| JsonRpcError::InvalidResponse(e.to_string()))
    }
}
