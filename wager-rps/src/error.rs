use thiserror::Error;
use wager_core::{Commitment, Identity};

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Escrow error: {0}")]
    Escrow(#[from] wager_core::EscrowError),

    #[error("Invalid guess")]
    InvalidMove,

    #[error("Game already exists: {0}")]
    RoomExists(Commitment),

    #[error("Creator {0} already has an active game")]
    CreatorBusy(Identity),

    #[error("Game not found: {0}")]
    GameNotFound(Commitment),

    #[error("Not a valid game: {0}")]
    NotAValidGame(Commitment),

    #[error("Game not joined: {0}")]
    NotJoined(Commitment),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Too early to cancel, {remaining_secs}s of cooldown left")]
    TooEarly { remaining_secs: i64 },
}

impl GameError {
    pub fn not_authorized(msg: impl Into<String>) -> Self {
        Self::NotAuthorized(msg.into())
    }
}
