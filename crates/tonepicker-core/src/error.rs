//! Error taxonomy for tone transformation.
//!
//! Input failures are classified by the service, transport and provider
//! failures by the provider client. Nothing downstream reclassifies them: the
//! HTTP layer only maps a variant to its status code and message.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToneError {
    /// Text or tone missing, or text is blank.
    #[error("Text and tone are required")]
    EmptyInput,

    /// Tone identifier is not one of the nine known directions.
    #[error("Invalid tone selection")]
    InvalidTone,

    /// Provider rejected the credential, or none is configured.
    #[error("Invalid API key. Please check your provider API key configuration.")]
    Unauthorized,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    /// No provider response within the request budget.
    #[error("Request timeout. Please try again.")]
    Timeout,

    /// Connection, DNS or other transport failure before a response arrived.
    #[error("Service temporarily unavailable. Please try again later.")]
    Unreachable,

    /// Anything else. The detail is for logs only and is not shown to users.
    #[error("Failed to process tone change")]
    Unknown(String),
}

impl ToneError {
    /// HTTP status the API reports for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            ToneError::EmptyInput | ToneError::InvalidTone => 400,
            ToneError::Unauthorized => 401,
            ToneError::Timeout => 408,
            ToneError::RateLimited => 429,
            ToneError::Unreachable => 503,
            ToneError::Unknown(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, ToneError::EmptyInput | ToneError::InvalidTone)
    }
}

pub type Result<T> = std::result::Result<T, ToneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ToneError::EmptyInput.status_code(), 400);
        assert_eq!(ToneError::InvalidTone.status_code(), 400);
        assert_eq!(ToneError::Unauthorized.status_code(), 401);
        assert_eq!(ToneError::Timeout.status_code(), 408);
        assert_eq!(ToneError::RateLimited.status_code(), 429);
        assert_eq!(ToneError::Unreachable.status_code(), 503);
        assert_eq!(ToneError::Unknown("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_input_messages_are_distinct() {
        assert_ne!(
            ToneError::EmptyInput.to_string(),
            ToneError::InvalidTone.to_string()
        );
    }

    #[test]
    fn test_unknown_detail_is_not_in_message() {
        let err = ToneError::Unknown("upstream said 502 with secret body".into());
        assert_eq!(err.to_string(), "Failed to process tone change");
    }
}
