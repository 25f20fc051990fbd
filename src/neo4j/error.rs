//! Transport errors surfaced to the kernel as error replies.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// Database unreachable, bad credentials, non-2xx HTTP status
    #[error("could not connect to Neo4j: {0}")]
    Connection(String),

    /// The database rejected or failed the statement
    #[error("{0}")]
    Query(String),

    #[error("driver error: {0}")]
    Driver(#[from] neo4rs::Error),

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The response could not be decoded
    #[error("malformed response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Short error name used as `ename` in kernel replies
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "ConnectionError",
            Self::Query(_) => "CypherError",
            Self::Driver(_) => "DriverError",
            Self::Timeout(_) => "TimeoutError",
            Self::Io(_) => "IOError",
            Self::Decode(_) => "DecodeError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_and_messages() {
        let err = TransportError::Query("Variable `x` not defined".into());
        assert_eq!(err.kind(), "CypherError");
        assert_eq!(err.to_string(), "Variable `x` not defined");

        let err = TransportError::Timeout(Duration::from_secs(2));
        assert_eq!(err.kind(), "TimeoutError");
        assert_eq!(err.to_string(), "no reply within 2s");

        let err: TransportError = std::io::Error::other("boom").into();
        assert_eq!(err.kind(), "IOError");
    }
}
