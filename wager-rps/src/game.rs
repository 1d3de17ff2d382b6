use crate::commitment::encode_move;
use crate::error::{GameError, Result};
use crate::events::GameEvent;
use crate::moves::{resolve, Move, Outcome};
use crate::registry::RoomRegistry;
use crate::room::{Closure, Phase, Room, RoomStatus, Slot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wager_core::{
    Amount, Call, Clock, Commitment, Controls, EscrowError, EscrowLedger, EventLog, EventStore,
    Identity, Payout, ProtocolConfig, SnapshotStore, Storage,
};

/// Storage key for snapshots and events of this state machine.
pub const COMPONENT: &str = "rock_paper";

/// Everything needed to rebuild a [`RockPaper`] exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RockPaperSnapshot {
    pub config: ProtocolConfig,
    pub controls: Controls,
    pub registry: RoomRegistry,
    pub ledger: EscrowLedger,
    pub custody: Amount,
}

/// Commit/reveal wagering rooms.
///
/// Each method is one atomic call: all preconditions are checked before any
/// state changes, and exactly one event is emitted on success.
pub struct RockPaper {
    config: ProtocolConfig,
    controls: Controls,
    registry: RoomRegistry,
    ledger: EscrowLedger,
    custody: Amount,
    events: EventLog<GameEvent>,
    clock: Arc<dyn Clock>,
}

impl RockPaper {
    pub fn new(owner: Identity, config: ProtocolConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let controls = Controls::new(owner, config.start_paused);
        Ok(Self {
            config,
            controls,
            registry: RoomRegistry::new(),
            ledger: EscrowLedger::new(),
            custody: Amount::ZERO,
            events: EventLog::new(),
            clock,
        })
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn owner(&self) -> &Identity {
        self.controls.owner()
    }

    pub fn is_running(&self) -> bool {
        self.controls.is_running()
    }

    pub fn room(&self, id: &Commitment) -> Option<&Room> {
        self.registry.room(id)
    }

    pub fn slot(&self, id: &Commitment) -> Option<&Slot> {
        self.registry.slot(id)
    }

    pub fn status(&self, id: &Commitment) -> RoomStatus {
        self.registry.status(id)
    }

    pub fn room_of(&self, creator: &Identity) -> Option<&Room> {
        self.registry.room_of(creator)
    }

    pub fn winnings(&self, who: &Identity) -> Amount {
        self.ledger.balance_of(who)
    }

    /// Total funds held: standing credit plus stakes in active rooms.
    pub fn custody(&self) -> Amount {
        self.custody
    }

    pub fn events(&self) -> &EventLog<GameEvent> {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// Commitment a creator publishes as the room identifier.
    pub fn encode_move(&self, mv: Move, secret: &[u8]) -> Commitment {
        encode_move(mv, secret)
    }

    /// Opens a room keyed by the creator's commitment. The stake is funded by
    /// the attached value plus `from_credit` of the caller's standing credit,
    /// which together must equal `wager` exactly.
    pub fn open(
        &mut self,
        call: &Call,
        room_id: Commitment,
        counterparty: Option<Identity>,
        wager: Amount,
        from_credit: Amount,
    ) -> Result<()> {
        self.controls.ensure_running()?;
        if room_id.is_zero() {
            return Err(GameError::InvalidMove);
        }
        self.registry.ensure_available(&room_id, &call.caller)?;

        if counterparty.as_ref() == Some(&call.caller) {
            return Err(GameError::not_authorized("creator cannot be the counterparty"));
        }
        if wager < self.config.min_wager {
            return Err(EscrowError::value_mismatch(self.config.min_wager, wager).into());
        }
        let custody = self.check_funding(call, wager, from_credit)?;
        let now = self.clock.now();

        let room = Room {
            id: room_id,
            creator: call.caller.clone(),
            designated: counterparty.clone(),
            wager,
            phase: Phase::Open,
            last_action: now,
        };
        self.registry.insert(room)?;
        self.ledger.debit(&call.caller, from_credit)?;
        self.custody = custody;

        tracing::info!(
            "Game {} created by {} with wager {}",
            room_id.short(),
            call.caller,
            wager
        );
        self.events.emit(GameEvent::RoomOpened {
            room: room_id,
            creator: call.caller.clone(),
            counterparty,
            wager,
        });
        Ok(())
    }

    /// Takes the counterparty seat of an open room, matching its wager.
    pub fn join(
        &mut self,
        call: &Call,
        room_id: Commitment,
        counterparty_move: Move,
        from_credit: Amount,
    ) -> Result<()> {
        self.controls.ensure_running()?;

        let (creator, wager) = match self.registry.slot(&room_id) {
            None => return Err(GameError::GameNotFound(room_id)),
            Some(Slot::Active(room)) if room.is_open() => {
                if !room.admits(&call.caller) {
                    return Err(GameError::not_authorized(format!(
                        "{} may not join this game",
                        call.caller
                    )));
                }
                (room.creator.clone(), room.wager)
            }
            Some(_) => return Err(GameError::NotAValidGame(room_id)),
        };
        let custody = self.check_funding(call, wager, from_credit)?;
        let now = self.clock.now();

        let room = self
            .registry
            .room_mut(&room_id)
            .ok_or(GameError::NotAValidGame(room_id))?;
        room.phase = Phase::Joined {
            counterparty: call.caller.clone(),
            counterparty_move,
        };
        room.last_action = now;
        self.ledger.debit(&call.caller, from_credit)?;
        self.custody = custody;

        tracing::info!("Player {} joined game {}", call.caller, room_id.short());
        self.events.emit(GameEvent::RoomJoined {
            room: room_id,
            creator,
            counterparty: call.caller.clone(),
            wager,
            counterparty_move,
        });
        Ok(())
    }

    /// Creator reveals their move. The winner is credited the pot; a draw
    /// credits each side its own wager.
    pub fn settle(
        &mut self,
        call: &Call,
        room_id: Commitment,
        creator_move: Move,
        secret: &[u8],
    ) -> Result<Outcome> {
        self.controls.ensure_running()?;
        call.ensure_no_value()?;

        let slot = self
            .registry
            .slot(&room_id)
            .ok_or(GameError::GameNotFound(room_id))?;
        if *slot.creator() != call.caller {
            return Err(GameError::not_authorized("only the creator can settle"));
        }
        let (counterparty, counterparty_move, wager) = match slot {
            Slot::Active(Room {
                phase:
                    Phase::Joined {
                        counterparty,
                        counterparty_move,
                    },
                wager,
                ..
            }) => (counterparty.clone(), *counterparty_move, *wager),
            _ => return Err(GameError::NotJoined(room_id)),
        };
        if encode_move(creator_move, secret) != room_id {
            return Err(GameError::InvalidMove);
        }

        let outcome = resolve(creator_move, counterparty_move);
        let pot = wager.checked_mul(2).ok_or(EscrowError::Overflow)?;
        let creator = call.caller.clone();
        let (closure, event) = match outcome {
            Outcome::Draw => (
                Closure::Drawn,
                GameEvent::RoomDrawn {
                    room: room_id,
                    creator: creator.clone(),
                    counterparty: counterparty.clone(),
                    wager,
                    played: creator_move,
                },
            ),
            Outcome::CreatorWins | Outcome::CounterpartyWins => {
                let winner = if outcome == Outcome::CreatorWins {
                    creator.clone()
                } else {
                    counterparty.clone()
                };
                (
                    Closure::Settled {
                        winner: winner.clone(),
                    },
                    GameEvent::RoomSettled {
                        room: room_id,
                        creator: creator.clone(),
                        counterparty: counterparty.clone(),
                        winner,
                        wager,
                        creator_move,
                        counterparty_move,
                    },
                )
            }
        };

        let now = self.clock.now();
        self.registry.close(&room_id, closure, now)?;
        match outcome {
            Outcome::Draw => {
                self.ledger.credit(&creator, wager);
                self.ledger.credit(&counterparty, wager);
            }
            Outcome::CreatorWins => self.ledger.credit(&creator, pot),
            Outcome::CounterpartyWins => self.ledger.credit(&counterparty, pot),
        }

        tracing::info!(
            "Game {} settled: {} vs {} -> {:?}",
            room_id.short(),
            creator_move,
            counterparty_move,
            outcome
        );
        self.events.emit(event);
        Ok(outcome)
    }

    /// Unilateral exit once the other side has been idle for the cooldown.
    ///
    /// An open room can be cancelled by its creator, who gets the wager back.
    /// A joined room can be cancelled by the counterparty, who takes the pot.
    pub fn cancel(&mut self, call: &Call, room_id: Commitment) -> Result<Amount> {
        self.controls.ensure_running()?;
        call.ensure_no_value()?;

        let room = match self.registry.slot(&room_id) {
            None => return Err(GameError::GameNotFound(room_id)),
            Some(Slot::Closed(_)) => return Err(GameError::NotAValidGame(room_id)),
            Some(Slot::Active(room)) => room,
        };
        let refund = match &room.phase {
            Phase::Open if room.creator == call.caller => room.wager,
            Phase::Joined { counterparty, .. } if *counterparty == call.caller => room.pot()?,
            Phase::Open => {
                return Err(GameError::not_authorized("only the creator can cancel an open game"))
            }
            Phase::Joined { .. } => {
                return Err(GameError::not_authorized(
                    "only the counterparty can cancel a joined game",
                ))
            }
        };

        let now = self.clock.now();
        let cooldown = self.config.cooldown()?;
        let elapsed = now - room.last_action;
        if elapsed < cooldown {
            return Err(GameError::TooEarly {
                remaining_secs: (cooldown - elapsed).num_seconds(),
            });
        }

        let closed = self.registry.close(
            &room_id,
            Closure::Cancelled {
                by: call.caller.clone(),
            },
            now,
        )?;
        self.ledger.credit(&call.caller, refund);

        tracing::warn!(
            "Game {} cancelled by {}, refunded {}",
            room_id.short(),
            call.caller,
            refund
        );
        self.events.emit(GameEvent::RoomCancelled {
            room: room_id,
            creator: closed.creator.clone(),
            counterparty: closed.counterparty().cloned(),
            by: call.caller.clone(),
            refunded: refund,
        });
        Ok(refund)
    }

    /// Pays out the caller's full standing credit.
    pub fn withdraw_winnings(&mut self, call: &Call, payout: &mut dyn Payout) -> Result<Amount> {
        self.controls.ensure_running()?;
        call.ensure_no_value()?;

        let owed = self.ledger.balance_of(&call.caller);
        let custody = self.custody.try_sub(owed)?;
        let amount = self.ledger.withdraw_to(&call.caller, payout)?;
        self.custody = custody;

        tracing::info!("Player {} withdrew {}", call.caller, amount);
        self.events.emit(GameEvent::WinningsWithdrawn {
            to: call.caller.clone(),
            amount,
        });
        Ok(amount)
    }

    pub fn pause(&mut self, call: &Call) -> Result<()> {
        call.ensure_no_value()?;
        let event = self.controls.pause(&call.caller)?;
        self.events.emit(event.into());
        Ok(())
    }

    pub fn resume(&mut self, call: &Call) -> Result<()> {
        call.ensure_no_value()?;
        let event = self.controls.resume(&call.caller)?;
        self.events.emit(event.into());
        Ok(())
    }

    pub fn transfer_ownership(&mut self, call: &Call, new_owner: Identity) -> Result<()> {
        call.ensure_no_value()?;
        let event = self.controls.transfer_ownership(&call.caller, new_owner)?;
        self.events.emit(event.into());
        Ok(())
    }

    /// Validates that fresh value plus betted credit equals `wager` and
    /// returns the custody total after accepting the fresh value.
    fn check_funding(&self, call: &Call, wager: Amount, from_credit: Amount) -> Result<Amount> {
        let offered = call.value.try_add(from_credit)?;
        if offered != wager {
            return Err(EscrowError::value_mismatch(wager, offered).into());
        }
        self.ledger.ensure_available(&call.caller, from_credit)?;
        Ok(self.custody.try_add(call.value)?)
    }

    pub fn snapshot(&self) -> RockPaperSnapshot {
        RockPaperSnapshot {
            config: self.config.clone(),
            controls: self.controls.clone(),
            registry: self.registry.clone(),
            ledger: self.ledger.clone(),
            custody: self.custody,
        }
    }

    pub fn from_snapshot(snapshot: RockPaperSnapshot, clock: Arc<dyn Clock>) -> Result<Self> {
        snapshot.config.validate()?;

        let held = snapshot
            .ledger
            .total()
            .try_add(snapshot.registry.escrowed())?;
        if held != snapshot.custody {
            return Err(EscrowError::internal(format!(
                "Snapshot custody {} does not match held funds {}",
                snapshot.custody, held
            ))
            .into());
        }

        Ok(Self {
            config: snapshot.config,
            controls: snapshot.controls,
            registry: snapshot.registry,
            ledger: snapshot.ledger,
            custody: snapshot.custody,
            events: EventLog::new(),
            clock,
        })
    }

    /// Appends pending events, then saves the current state.
    pub async fn persist(&mut self, storage: &Storage) -> Result<()> {
        let now = self.clock.now();
        EventStore::new(storage)
            .append(COMPONENT, self.events.events(), now)
            .await?;
        self.events.drain();

        SnapshotStore::new(storage)
            .save(COMPONENT, &self.snapshot(), now)
            .await?;
        Ok(())
    }

    pub async fn restore(storage: &Storage, clock: Arc<dyn Clock>) -> Result<Option<Self>> {
        let snapshot: Option<RockPaperSnapshot> =
            SnapshotStore::new(storage).load(COMPONENT).await?;
        snapshot
            .map(|snapshot| Self::from_snapshot(snapshot, clock))
            .transpose()
    }
}

impl std::fmt::Debug for RockPaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RockPaper")
            .field("owner", self.controls.owner())
            .field("running", &self.controls.is_running())
            .field("rooms", &self.registry.len())
            .field("custody", &self.custody)
            .field("pending_events", &self.events.len())
            .finish()
    }
}
