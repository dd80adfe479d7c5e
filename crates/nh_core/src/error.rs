use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Fetch error: {0}")]
    Fetch(String),

    /// A completion arrived for a request that has since been superseded.
    #[error("Stale result discarded")]
    StaleResult,

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid country: {0}")]
    InvalidCountry(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// True for failures coming from the retrieval side (transport, status, payload).
    pub fn is_fetch(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Status { .. } | Error::Fetch(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_classification() {
        assert!(Error::Fetch("rateLimited".to_string()).is_fetch());
        assert!(Error::Status { status: 502, message: "bad gateway".to_string() }.is_fetch());
        assert!(!Error::StaleResult.is_fetch());
        assert!(!Error::StorageUnavailable("disk".to_string()).is_fetch());
    }

    #[test]
    fn test_status_message() {
        let err = Error::Status { status: 401, message: "apiKeyInvalid".to_string() };
        assert_eq!(err.to_string(), "Request failed with status 401: apiKeyInvalid");
    }
}
