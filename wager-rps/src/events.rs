use crate::moves::Move;
use serde::{Deserialize, Serialize};
use wager_core::{AdminEvent, Amount, Commitment, Event, Identity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    RoomOpened {
        room: Commitment,
        creator: Identity,
        counterparty: Option<Identity>,
        wager: Amount,
    },
    RoomJoined {
        room: Commitment,
        creator: Identity,
        counterparty: Identity,
        wager: Amount,
        counterparty_move: Move,
    },
    RoomSettled {
        room: Commitment,
        creator: Identity,
        counterparty: Identity,
        winner: Identity,
        wager: Amount,
        creator_move: Move,
        counterparty_move: Move,
    },
    RoomDrawn {
        room: Commitment,
        creator: Identity,
        counterparty: Identity,
        wager: Amount,
        played: Move,
    },
    RoomCancelled {
        room: Commitment,
        creator: Identity,
        counterparty: Option<Identity>,
        by: Identity,
        refunded: Amount,
    },
    WinningsWithdrawn {
        to: Identity,
        amount: Amount,
    },
    Admin(AdminEvent),
}

impl GameEvent {
    pub fn room(&self) -> Option<Commitment> {
        match self {
            GameEvent::RoomOpened { room, .. }
            | GameEvent::RoomJoined { room, .. }
            | GameEvent::RoomSettled { room, .. }
            | GameEvent::RoomDrawn { room, .. }
            | GameEvent::RoomCancelled { room, .. } => Some(*room),
            GameEvent::WinningsWithdrawn { .. } | GameEvent::Admin(_) => None,
        }
    }
}

impl Event for GameEvent {
    fn name(&self) -> &'static str {
        match self {
            GameEvent::RoomOpened { .. } => "room_opened",
            GameEvent::RoomJoined { .. } => "room_joined",
            GameEvent::RoomSettled { .. } => "room_settled",
            GameEvent::RoomDrawn { .. } => "room_drawn",
            GameEvent::RoomCancelled { .. } => "room_cancelled",
            GameEvent::WinningsWithdrawn { .. } => "winnings_withdrawn",
            GameEvent::Admin(event) => event.name(),
        }
    }
}

impl From<AdminEvent> for GameEvent {
    fn from(event: AdminEvent) -> Self {
        GameEvent::Admin(event)
    }
}
