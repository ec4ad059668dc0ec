//! Error types for bridge generation

use thiserror::Error;

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that end a single bridge run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("degenerate step direction at step {step} after {redraws} redraws")]
    DegenerateDirection { step: u32, redraws: u32 },
}

impl BridgeError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        BridgeError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
