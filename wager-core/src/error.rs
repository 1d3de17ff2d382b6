use crate::types::Amount;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EscrowError>;

#[derive(Error, Debug)]
pub enum EscrowError {
    #[error("No balance")]
    NoBalance,

    #[error("Insufficient balance: need {need}, have {available}")]
    InsufficientBalance { need: Amount, available: Amount },

    #[error("Value mismatch: expected {expected}, got {actual}")]
    ValueMismatch { expected: Amount, actual: Amount },

    #[error("System paused")]
    SystemPaused,

    #[error("Owner permission required")]
    OwnerRequired,

    #[error("Already paused")]
    AlreadyPaused,

    #[error("Not paused")]
    NotPaused,

    #[error("Amount overflow")]
    Overflow,

    #[error("Invalid commitment: {0}")]
    InvalidCommitment(String),

    #[error("Payout failed: {0}")]
    PayoutFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EscrowError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn payout(msg: impl Into<String>) -> Self {
        Self::PayoutFailed(msg.into())
    }

    pub fn value_mismatch(expected: Amount, actual: Amount) -> Self {
        Self::ValueMismatch { expected, actual }
    }
}
