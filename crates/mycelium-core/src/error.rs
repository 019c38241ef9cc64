//! Error types for Mycelium operations.
//!
//! Nothing in the simulation is fatal: the engine logs and swallows these at
//! its collaborator seams. They exist so that stores, sources and hosts can
//! still report what went wrong.

use thiserror::Error;

/// Result type for Mycelium operations.
pub type Result<T> = std::result::Result<T, MyceliumError>;

/// Errors that can occur during Mycelium operations.
#[derive(Debug, Error)]
pub enum MyceliumError {
    /// The backing snapshot store rejected a read or write.
    #[error("store error: {0}")]
    Store(String),

    /// I/O errors (wrapped).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A room the topology does not know about.
    #[error("unknown room: {0}")]
    UnknownRoom(String),

    /// A malformed undirected edge key.
    #[error("invalid edge key: {0:?} (expected \"a|b\")")]
    InvalidEdgeKey(String),

    /// A grown edge was refused by the topology.
    #[error("growth refused between {from} and {to}: {reason}")]
    GrowthRefused {
        from: String,
        to: String,
        reason: String,
    },

    /// The compost source could not be queried this cycle.
    #[error("compost source unavailable: {0}")]
    CompostUnavailable(String),

    /// Configuration value out of range.
    #[error("{field} out of range: {value} ({reason})")]
    Config {
        field: String,
        value: String,
        reason: String,
    },
}

// Convenience constructors
impl MyceliumError {
    pub fn store(msg: impl Into<String>) -> Self {
        MyceliumError::Store(msg.into())
    }

    pub fn unknown_room(id: impl Into<String>) -> Self {
        MyceliumError::UnknownRoom(id.into())
    }

    pub fn invalid_edge_key(raw: impl Into<String>) -> Self {
        MyceliumError::InvalidEdgeKey(raw.into())
    }

    pub fn growth_refused(
        from: impl Into<String>,
        to: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        MyceliumError::GrowthRefused {
            from: from.into(),
            to: to.into(),
            reason: reason.into(),
        }
    }

    pub fn compost_unavailable(msg: impl Into<String>) -> Self {
        MyceliumError::CompostUnavailable(msg.into())
    }

    pub fn invalid_config(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        MyceliumError::Config {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_message_names_field() {
        let err = MyceliumError::invalid_config("trail_decay", 1.5, "must be in (0, 1)");
        assert_eq!(err.to_string(), "trail_decay out of range: 1.5 (must be in (0, 1))");
    }

    #[test]
    fn io_errors_convert() {
        fn fails() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "quota exceeded"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(MyceliumError::Io(_))));
    }
}
