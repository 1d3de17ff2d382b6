use crate::moves::Move;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wager_core::{Amount, Commitment, EscrowError, Identity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// Creator's stake is escrowed, waiting for a counterparty.
    Open,
    /// Both stakes escrowed, waiting for the creator to reveal.
    Joined {
        counterparty: Identity,
        counterparty_move: Move,
    },
}

/// One live two-party wager, keyed by the creator's move commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: Commitment,
    pub creator: Identity,
    /// If set, only this identity may join.
    pub designated: Option<Identity>,
    pub wager: Amount,
    pub phase: Phase,
    pub last_action: DateTime<Utc>,
}

impl Room {
    pub fn is_open(&self) -> bool {
        matches!(self.phase, Phase::Open)
    }

    pub fn is_joined(&self) -> bool {
        matches!(self.phase, Phase::Joined { .. })
    }

    pub fn counterparty(&self) -> Option<&Identity> {
        match &self.phase {
            Phase::Open => None,
            Phase::Joined { counterparty, .. } => Some(counterparty),
        }
    }

    /// Whether `who` is allowed to take the counterparty seat.
    pub fn admits(&self, who: &Identity) -> bool {
        *who != self.creator && self.designated.as_ref().map_or(true, |d| d == who)
    }

    pub fn pot(&self) -> Result<Amount, EscrowError> {
        self.wager.checked_mul(2).ok_or(EscrowError::Overflow)
    }

    /// Funds currently held for this room.
    pub fn escrowed(&self) -> Amount {
        match self.phase {
            Phase::Open => self.wager,
            Phase::Joined { .. } => self.wager.saturating_add(self.wager),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "closure", rename_all = "snake_case")]
pub enum Closure {
    Settled { winner: Identity },
    Drawn,
    Cancelled { by: Identity },
}

/// What remains of a closed room. Never removed, so the identifier cannot
/// fund a second room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tombstone {
    pub creator: Identity,
    pub closed_at: DateTime<Utc>,
    pub closure: Closure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "slot", rename_all = "snake_case")]
pub enum Slot {
    Active(Room),
    Closed(Tombstone),
}

impl Slot {
    pub fn creator(&self) -> &Identity {
        match self {
            Slot::Active(room) => &room.creator,
            Slot::Closed(tombstone) => &tombstone.creator,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Empty,
    Open,
    Joined,
    Closed,
}
