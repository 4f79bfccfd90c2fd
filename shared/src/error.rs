//! Errors raised by the controller core.
//!
//! Everything here happens at configuration or attach time. Once a controller
//! is running, every input combination is a normal state of the model.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    /// A tunable or key binding failed validation in `configure`.
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    /// `attach_input` was called without a capture-request source.
    #[error("no capture-request source was provided")]
    MissingInputSource,

    #[error("failed to parse controller config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    #[error("failed to read controller config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ControllerError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field, for `InvalidConfiguration`.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidConfiguration { field, .. } => Some(*field),
            _ => None,
        }
    }
}
