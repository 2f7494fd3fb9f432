use thiserror::Error;

#[derive(Error, Debug)]
pub enum CombatAiError {
    #[error("Missing context field: {field}")]
    MissingData { field: &'static str },

    #[error("No tactic or action applies to the current context")]
    NoCandidateAction,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("State blob holds invalid values: {0}")]
    InvalidState(String),

    #[error("State blob version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CombatAiError>;
