//! Error types for the mediaview controller

use thiserror::Error;

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, Error>;

/// Controller error types
#[derive(Error, Debug)]
pub enum Error {
    // Source errors
    #[error("Invalid URL: {0:?} does not name a supported media container")]
    InvalidUrl(String),

    #[error("Invalid source {uri}: {reason}")]
    InvalidSource { uri: String, reason: String },

    // Decoder errors
    #[error("Decoder fault (what={what}, extra={extra})")]
    DecoderFault { what: i32, extra: i32 },

    #[error("No active playback session to stop")]
    NoActiveSession,

    #[error("Render surface is not available")]
    SurfaceUnavailable,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    // Runtime errors
    #[error("UI event loop has shut down")]
    EventLoopClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid source error
    pub fn invalid_source(uri: impl Into<String>, reason: impl ToString) -> Self {
        Error::InvalidSource {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    /// Session errors are terminal; the user has to start playback again.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::InvalidUrl(_) | Error::SurfaceUnavailable)
    }

    /// Returns the error code for logging
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::InvalidSource { .. } => "INVALID_SOURCE",
            Error::DecoderFault { .. } => "DECODER_FAULT",
            Error::NoActiveSession => "NO_ACTIVE_SESSION",
            Error::SurfaceUnavailable => "SURFACE_UNAVAILABLE",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::ConfigParse(_) => "CONFIG_PARSE",
            Error::EventLoopClosed => "EVENT_LOOP_CLOSED",
            Error::Io(_) => "IO",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::InvalidUrl("a.mov".into()).error_code(), "INVALID_URL");
        assert_eq!(
            Error::DecoderFault { what: 1, extra: -1004 }.error_code(),
            "DECODER_FAULT"
        );
        assert_eq!(Error::NoActiveSession.error_code(), "NO_ACTIVE_SESSION");
    }

    #[test]
    fn test_session_errors_are_terminal() {
        assert!(!Error::DecoderFault { what: 1, extra: 0 }.is_recoverable());
        assert!(!Error::invalid_source("clip.mp4", "unreachable").is_recoverable());
        assert!(Error::InvalidUrl(String::new()).is_recoverable());
    }

    #[test]
    fn test_display() {
        let err = Error::invalid_source("http://host/clip.mp4", "404");
        assert_eq!(err.to_string(), "Invalid source http://host/clip.mp4: 404");
    }
}
