//! Error types

use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

/// Failures surfaced at the public entry points
///
/// The traced path itself never errors; a missed query or a degenerate
/// refraction is ordinary data. Everything here is either a rejected
/// precondition or a config-loading problem.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("invalid seed: {0}")]
    Seed(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SimError {
    pub fn seed(message: impl Into<String>) -> Self {
        Self::Seed(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
