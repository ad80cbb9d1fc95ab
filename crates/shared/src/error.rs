use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown when a failure carries nothing worth surfacing verbatim.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchErrorKind {
    Network,
    Timeout,
    Http,
    MalformedResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("bot launch timed out after {after:?}")]
    Timeout { after: Duration },
    #[error("bot launch failed with HTTP {status}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Http { status: u16, detail: Option<String> },
    #[error("malformed bot launch response: {0}")]
    MalformedResponse(String),
}

impl LaunchError {
    pub fn kind(&self) -> LaunchErrorKind {
        match self {
            Self::Network(_) => LaunchErrorKind::Network,
            Self::Timeout { .. } => LaunchErrorKind::Timeout,
            Self::Http { .. } => LaunchErrorKind::Http,
            Self::MalformedResponse(_) => LaunchErrorKind::MalformedResponse,
        }
    }

    /// Message for the error screen: the collaborator's own detail when it
    /// sent one, a timeout notice, or the generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.trim().to_string(),
            Self::Timeout { .. } => self.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Error body shape returned by the bot launch service on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_detail_is_surfaced_verbatim() {
        let err = LaunchError::Http {
            status: 500,
            detail: Some("Failed to spawn VM: quota".into()),
        };
        assert_eq!(err.user_message(), "Failed to spawn VM: quota");
        assert_eq!(
            err.to_string(),
            "bot launch failed with HTTP 500: Failed to spawn VM: quota"
        );
    }

    #[test]
    fn missing_detail_falls_back_to_generic_message() {
        let err = LaunchError::Http {
            status: 502,
            detail: None,
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(err.to_string(), "bot launch failed with HTTP 502");
        assert_eq!(
            LaunchError::Network("connection refused".into()).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
    }

    #[test]
    fn timeout_message_names_the_timeout() {
        let err = LaunchError::Timeout {
            after: Duration::from_secs(120),
        };
        assert_eq!(err.kind(), LaunchErrorKind::Timeout);
        assert_eq!(err.user_message(), "bot launch timed out after 120s");
    }

    #[test]
    fn sub_second_timeout_keeps_its_unit() {
        let err = LaunchError::Timeout {
            after: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "bot launch timed out after 250ms");
    }

    #[test]
    fn kind_serializes_snake_case() {
        let raw = serde_json::to_string(&LaunchErrorKind::MalformedResponse).expect("json");
        assert_eq!(raw, "\"malformed_response\"");
    }
}
