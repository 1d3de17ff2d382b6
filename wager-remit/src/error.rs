use thiserror::Error;
use wager_core::Commitment;

pub type Result<T> = std::result::Result<T, RemittanceError>;

#[derive(Error, Debug)]
pub enum RemittanceError {
    #[error("Escrow error: {0}")]
    Escrow(#[from] wager_core::EscrowError),

    #[error("Invalid puzzle")]
    InvalidPuzzle,

    #[error("Need to deposit something")]
    EmptyDeposit,

    #[error("Deposit is not empty: {0}")]
    NotEmpty(Commitment),

    #[error("No balance available")]
    NoBalance,

    #[error("Deposit is not expired, {remaining_secs}s left")]
    NotExpired { remaining_secs: i64 },
}
