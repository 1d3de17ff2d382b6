//! Core escrow primitives for commit/reveal wagering.
//!
//! Shared by every wagering variant: caller and amount types, the commitment
//! codec, the escrow ledger of standing credit, owner-gated admin controls,
//! the event log and sqlite persistence of state snapshots.

pub mod admin;
pub mod clock;
pub mod commitment;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod payout;
pub mod storage;
pub mod types;

pub use admin::{AdminEvent, Controls, FeeVault};
pub use clock::{Clock, ManualClock, SystemClock};
pub use commitment::{generate_secret, Commitment, CommitmentScheme};
pub use config::ProtocolConfig;
pub use error::{EscrowError, Result};
pub use events::{Event, EventLog};
pub use ledger::EscrowLedger;
pub use payout::{Accounts, Payout};
pub use storage::{EventStore, SnapshotStore, Storage};
pub use types::{Amount, Call, Identity};
