//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitRulesError {
    /// The request itself is invalid (unknown label, disallowed function, ...)
    #[error("BAD_REQUEST/{0}")]
    BadRequest(String),

    /// The caller lacks the required project permission
    #[error("AUTH/{0}")]
    Auth(String),

    #[error("NOT_FOUND/{0}")]
    NotFound(String),

    /// The project config moved on between opening an edit and committing it
    #[error("CONFLICT/{0}")]
    Conflict(String),

    #[error("STORAGE/{0}")]
    Storage(String),
}

impl SubmitRulesError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Stable prefix of the display text
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Auth(_) => "AUTH",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Storage(_) => "STORAGE",
        }
    }

    /// The message without its prefix
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::Auth(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Storage(m) => m,
        }
    }
}

pub type Result<T, E = SubmitRulesError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = SubmitRulesError::bad_request("The label Foo does not exist.");
        assert_eq!(err.to_string(), "BAD_REQUEST/The label Foo does not exist.");
        assert_eq!(
            SubmitRulesError::storage("disk full").to_string(),
            "STORAGE/disk full"
        );
    }

    #[test]
    fn test_code_and_message() {
        let err = SubmitRulesError::Conflict("stale".into());
        assert_eq!(err.code(), "CONFLICT");
        assert_eq!(err.message(), "stale");
        assert_eq!(err.to_string(), format!("{}/{}", err.code(), err.message()));
    }
}
