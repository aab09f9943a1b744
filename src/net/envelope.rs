//! Response envelope and fetch error taxonomy.
//!
//! ERROR HANDLING
//! ==============
//! The API signals business failures inside a 2xx body (`success: false`)
//! as well as with HTTP status codes. Both collapse into [`FetchError`] here;
//! resource units only ever see `Result<T, FetchError>`.

#[cfg(test)]
#[path = "envelope_test.rs"]
mod envelope_test;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message shown when a failed envelope carries neither `error` nor `message`.
pub const DEFAULT_REJECTED_MESSAGE: &str = "Request failed";

/// Message shown when a transport error has no description of its own.
pub const DEFAULT_NETWORK_MESSAGE: &str = "Network error, please try again";

// =============================================================================
// ERROR
// =============================================================================

/// Why a resource fetch did not produce a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a decodable response.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered `success: false`.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The server answered `success: true` without the expected payload.
    #[error("response is missing `{what}`")]
    MissingPayload { what: String },

    /// The requested item does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// The payload was present but did not match the expected shape.
    #[error("payload decode failed: {0}")]
    Decode(String),

    /// The in-flight fetch was dropped before it settled.
    #[error("request cancelled")]
    Cancelled,
}

impl FetchError {
    /// Human-readable text stored on an errored resource.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(msg) if msg.trim().is_empty() => DEFAULT_NETWORK_MESSAGE.to_owned(),
            Self::Network(msg) | Self::Rejected(msg) => msg.clone(),
            Self::MissingPayload { what } => format!("Unable to load {what}"),
            Self::NotFound { kind, id } => format!("{kind} {id} not found"),
            Self::Decode(_) => "Received an unexpected response from the server".to_owned(),
            Self::Cancelled => "request cancelled".to_owned(),
        }
    }
}

// =============================================================================
// ENVELOPE
// =============================================================================

/// Standard API response wrapper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope around `data`.
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None, message: None }
    }

    /// Failed envelope with an `error` string.
    pub fn err(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()), message: None }
    }

    /// Failure text: `error`, then `message`, then the fixed default.
    #[must_use]
    pub fn failure_message(&self) -> String {
        self.error
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.message.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(DEFAULT_REJECTED_MESSAGE)
            .to_owned()
    }

    /// Collapse into a result over the whole `data` field.
    ///
    /// # Errors
    ///
    /// `Rejected` when `success` is false, `MissingPayload` when `data` is absent.
    pub fn into_result(self, what: &str) -> Result<T, FetchError> {
        if !self.success {
            return Err(FetchError::Rejected(self.failure_message()));
        }
        self.data.ok_or_else(|| FetchError::MissingPayload { what: what.to_owned() })
    }
}

impl Envelope<Value> {
    /// Unwrap the nested payload stored under `data[key]`.
    ///
    /// # Errors
    ///
    /// `Rejected` when `success` is false, `MissingPayload` when `data` or the
    /// key is absent or null, `Decode` when the payload has the wrong shape.
    pub fn payload<T: DeserializeOwned>(self, key: &str) -> Result<T, FetchError> {
        let mut data = self.into_result(key)?;
        let nested = data
            .get_mut(key)
            .map(Value::take)
            .filter(|v| !v.is_null())
            .ok_or_else(|| FetchError::MissingPayload { what: key.to_owned() })?;
        serde_json::from_value(nested).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
