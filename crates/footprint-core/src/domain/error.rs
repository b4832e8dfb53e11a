//! Error taxonomy for FootprintGuard.
//!
//! Only [`ValidationError`] and [`FootprintError`] ever reach a caller.
//! [`ProviderError`] and [`EngineError`] are absorbed at the stage that
//! produced them and surface as annotations on the stage's output.

/// Errors produced while normalizing an inbound scan request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "at least one of githubUsername, email, socialHandles or fullName must be provided"
    )]
    NoIdentityHints,

    #[error("invalid email address: {value}")]
    InvalidEmail { value: String },

    #[error("invalid username: {value}")]
    InvalidUsername { value: String },
}

/// Failure of a single capability-provider call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("provider input rejected: {0}")]
    InvalidInput(String),
}

/// Failure of a judgment-engine call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("judgment engine is not configured: {0}")]
    NotConfigured(String),

    #[error("judgment engine transport error: {0}")]
    Transport(String),

    #[error("judgment engine returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("judgment engine returned an empty response")]
    EmptyResponse,
}

/// Structural failure to read judgment-engine output as the expected schema.
#[derive(Debug, thiserror::Error)]
pub enum JudgmentParseError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field {field} has unexpected value: {value}")]
    UnexpectedValue { field: &'static str, value: String },
}

/// Top-level FootprintGuard errors.
#[derive(Debug, thiserror::Error)]
pub enum FootprintError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("workflow failure: {0}")]
    Workflow(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid scan id: {value}")]
    InvalidScanId { value: String },

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FootprintError {
    /// Whether the caller sent a bad request (as opposed to a server fault).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FootprintError::Validation(_) | FootprintError::InvalidScanId { .. }
        )
    }
}

/// Result type for FootprintGuard operations.
pub type Result<T> = std::result::Result<T, FootprintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_is_client_error() {
        let err: FootprintError = ValidationError::NoIdentityHints.into();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("validation error"));

        let err = FootprintError::Workflow("join failed".to_string());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_invalid_email_mentions_value() {
        let err = ValidationError::InvalidEmail {
            value: "not-an-email".to_string(),
        };
        assert!(err.to_string().contains("not-an-email"));
    }

    #[test]
    fn test_digest_mismatch_error() {
        let err = FootprintError::DigestMismatch {
            expected: "abc123".to_string(),
            actual: "def456".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("abc123"));
        assert!(msg.contains("def456"));
    }

    #[test]
    fn test_engine_status_error_display() {
        let err = EngineError::Status {
            status: 429,
            body: "quota".to_string(),
        };
        assert!(err.to_string().contains("429"));
    }
}
