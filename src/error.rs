// Engine error types
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A channel's parameters can never produce a valid simulation.
    #[error("invalid configuration for channel `{channel}`: {reason}")]
    InvalidConfiguration { channel: String, reason: String },

    #[error("screen references unknown channel `{0}`")]
    UnknownChannel(String),

    #[error("channel `{0}` is configured more than once")]
    DuplicateChannel(String),
}

impl EngineError {
    pub fn invalid(channel: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            channel: channel.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
