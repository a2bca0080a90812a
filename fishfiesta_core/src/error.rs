//! Error types for the fishfiesta_core library.

use crate::ConditionKind;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fishfiesta_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Creature id is not part of the discovered catalog
    #[error("Unknown creature: {0}")]
    UnknownCreature(String),

    /// Level id is not part of the discovered catalog
    #[error("Unknown level: {0}")]
    UnknownLevel(String),

    /// A required block is missing from a level file
    #[error("Level '{level}' has no '{block}' block")]
    MissingBlock { level: String, block: &'static str },

    /// A required block is present but resolved to nothing
    #[error("Level '{level}' has an empty '{block}' block")]
    EmptyBlock { level: String, block: &'static str },

    /// A condition token does not name a member of the expected enum
    #[error("Invalid value '{value}' for condition {kind}")]
    InvalidConditionValue { kind: ConditionKind, value: String },

    /// Level session state machine misuse
    #[error("State error: {0}")]
    State(String),
}
