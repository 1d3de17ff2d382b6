//! Commit/reveal rock-paper-scissors wagering for 2 players
//!
//! The creator opens a room keyed by the hash of their move and a secret,
//! escrowing a wager. A counterparty joins in the clear with a matching
//! wager, and the creator settles by revealing. Payouts accrue as standing
//! credit that can be withdrawn or bet again. Stalled rooms unlock after a
//! cooldown.

pub mod commitment;
pub mod error;
pub mod events;
pub mod game;
pub mod moves;
pub mod registry;
pub mod room;

pub use commitment::{encode_move, MoveCommitment, MovePreimage};
pub use error::{GameError, Result};
pub use events::GameEvent;
pub use game::{RockPaper, RockPaperSnapshot};
pub use moves::{resolve, Move, Outcome};
pub use registry::RoomRegistry;
pub use room::{Closure, Phase, Room, RoomStatus, Slot, Tombstone};

use std::sync::Arc;
use wager_core::{Identity, ProtocolConfig, SystemClock};

/// Create a wagering state machine on the system clock with default settings
pub fn create_game(owner: impl Into<Identity>) -> Result<RockPaper> {
    RockPaper::new(owner.into(), ProtocolConfig::default(), Arc::new(SystemClock))
}
