//! Password escrow
//!
//! A depositor locks funds under a puzzle derived from the recipient's
//! identity and a password shared out of band. The recipient claims by
//! presenting the password; after the timeout the depositor can take the
//! funds back. The owner keeps a fixed fee from every deposit.

pub mod deposit;
pub mod error;
pub mod events;
pub mod puzzle;
pub mod remittance;

pub use deposit::{Deposit, DepositSlot, DepositStatus, SpentDeposit, TransferKind};
pub use error::{RemittanceError, Result};
pub use events::RemittanceEvent;
pub use puzzle::{create_puzzle, PuzzleCommitment, PuzzlePreimage};
pub use remittance::{Remittance, RemittanceSnapshot};
