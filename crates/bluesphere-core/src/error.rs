use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not connected: {0}")]
    NotConnected(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Unexpected response: expected {expected}, got {actual}")]
    UnexpectedResponse { expected: String, actual: String },

    #[error("Server refused connection: {}", .0.join(", "))]
    ConnectionRefused(Vec<String>),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("{0}")]
    GenerationUnsupported(&'static str),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Check if the failed operation can simply be retried on the next poll.
    ///
    /// Only a request the emulator answered with an error leaves the
    /// connection usable; anything else means it has to be rebuilt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::RequestFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.is_not_found());

        let other_io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err2 = Error::Io(other_io_err);
        assert!(!err2.is_not_found());
    }

    #[test]
    fn test_error_is_transient() {
        assert!(Error::RequestFailed("busy".to_string()).is_transient());
        assert!(!Error::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, "slow")).is_transient());

        assert!(!Error::NotConnected("gone".to_string()).is_transient());
        assert!(
            !Error::Io(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
                .is_transient()
        );
    }

    #[test]
    fn test_connection_refused_message() {
        let err = Error::ConnectionRefused(vec![
            "InvalidSlot".to_string(),
            "InvalidPassword".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Server refused connection: InvalidSlot, InvalidPassword"
        );
    }
}
