//! Response envelope handling.
//!
//! Every endpoint answers `{ success, data, message? }`. Unwrapping happens
//! here and nowhere else.

use crate::error::{ApiClientError, ApiClientResult};
use docview_core::ApiResponse;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Decode a raw response into `T`.
///
/// Non-2xx responses become [`ApiClientError::Http`], taking the envelope's
/// message when the error body is itself an envelope. A 2xx body with
/// `success: false` becomes [`ApiClientError::Envelope`].
pub fn unwrap_envelope<T: DeserializeOwned>(response: &ApiResponse) -> ApiClientResult<T> {
    if !response.is_success() {
        return Err(ApiClientError::Http {
            status: response.status,
            message: error_message(response),
        });
    }

    let envelope: Envelope<Value> = serde_json::from_str(&response.body)?;
    if !envelope.success {
        return Err(ApiClientError::Envelope {
            message: envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "request was not successful".to_string()),
        });
    }
    Ok(serde_json::from_value(envelope.data.unwrap_or(Value::Null))?)
}

fn error_message(response: &ApiResponse) -> String {
    if let Ok(envelope) = serde_json::from_str::<Envelope<Value>>(&response.body) {
        if let Some(message) = envelope.message.filter(|m| !m.trim().is_empty()) {
            return message;
        }
    }
    let text = response.body.trim();
    if text.is_empty() {
        "empty response body".to_string()
    } else {
        text.to_string()
    }
}
