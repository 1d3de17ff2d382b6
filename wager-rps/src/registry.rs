use crate::error::{GameError, Result};
use crate::room::{Closure, Room, RoomStatus, Slot, Tombstone};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wager_core::{Amount, Commitment, Identity};

#[derive(Serialize, Deserialize)]
struct RegistryState {
    slots: BTreeMap<Commitment, Slot>,
}

/// Room identifier to slot. An identifier moves from absent to active to
/// tombstoned and never back. Each creator has at most one active room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RegistryState", into = "RegistryState")]
pub struct RoomRegistry {
    slots: BTreeMap<Commitment, Slot>,
    active_by_creator: BTreeMap<Identity, Commitment>,
}

impl From<RegistryState> for RoomRegistry {
    fn from(state: RegistryState) -> Self {
        let active_by_creator = state
            .slots
            .iter()
            .filter_map(|(id, slot)| match slot {
                Slot::Active(room) => Some((room.creator.clone(), *id)),
                Slot::Closed(_) => None,
            })
            .collect();

        Self {
            slots: state.slots,
            active_by_creator,
        }
    }
}

impl From<RoomRegistry> for RegistryState {
    fn from(registry: RoomRegistry) -> Self {
        Self {
            slots: registry.slots,
        }
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, id: &Commitment) -> RoomStatus {
        match self.slots.get(id) {
            None => RoomStatus::Empty,
            Some(Slot::Active(room)) if room.is_open() => RoomStatus::Open,
            Some(Slot::Active(_)) => RoomStatus::Joined,
            Some(Slot::Closed(_)) => RoomStatus::Closed,
        }
    }

    pub fn slot(&self, id: &Commitment) -> Option<&Slot> {
        self.slots.get(id)
    }

    pub fn room(&self, id: &Commitment) -> Option<&Room> {
        match self.slots.get(id) {
            Some(Slot::Active(room)) => Some(room),
            _ => None,
        }
    }

    pub fn room_mut(&mut self, id: &Commitment) -> Option<&mut Room> {
        match self.slots.get_mut(id) {
            Some(Slot::Active(room)) => Some(room),
            _ => None,
        }
    }

    pub fn room_of(&self, creator: &Identity) -> Option<&Room> {
        self.active_by_creator
            .get(creator)
            .and_then(|id| self.room(id))
    }

    pub fn active_rooms(&self) -> impl Iterator<Item = &Room> {
        self.slots.values().filter_map(|slot| match slot {
            Slot::Active(room) => Some(room),
            Slot::Closed(_) => None,
        })
    }

    /// Funds held across all active rooms.
    pub fn escrowed(&self) -> Amount {
        self.active_rooms()
            .fold(Amount::ZERO, |acc, room| acc.saturating_add(room.escrowed()))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ensure_available(&self, id: &Commitment, creator: &Identity) -> Result<()> {
        if self.slots.contains_key(id) {
            return Err(GameError::RoomExists(*id));
        }
        if self.active_by_creator.contains_key(creator) {
            return Err(GameError::CreatorBusy(creator.clone()));
        }
        Ok(())
    }

    pub fn insert(&mut self, room: Room) -> Result<()> {
        self.ensure_available(&room.id, &room.creator)?;

        self.active_by_creator.insert(room.creator.clone(), room.id);
        self.slots.insert(room.id, Slot::Active(room));
        Ok(())
    }

    /// Tombstones an active room and hands back its final state.
    pub fn close(&mut self, id: &Commitment, closure: Closure, at: DateTime<Utc>) -> Result<Room> {
        let slot = self.slots.get_mut(id).ok_or(GameError::GameNotFound(*id))?;
        let creator = match slot {
            Slot::Active(room) => room.creator.clone(),
            Slot::Closed(_) => return Err(GameError::NotAValidGame(*id)),
        };

        let tombstone = Slot::Closed(Tombstone {
            creator,
            closed_at: at,
            closure,
        });
        let room = match std::mem::replace(slot, tombstone) {
            Slot::Active(room) => room,
            Slot::Closed(_) => return Err(GameError::NotAValidGame(*id)),
        };

        self.active_by_creator.remove(&room.creator);
        Ok(room)
    }
}
