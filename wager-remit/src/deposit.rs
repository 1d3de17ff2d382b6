use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wager_core::{Amount, Identity};

/// Funds locked under a puzzle until claimed or reclaimed after expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub owner: Identity,
    pub balance: Amount,
    pub expires_at: DateTime<Utc>,
}

impl Deposit {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    /// Claimed by the recipient with the password.
    Withdrawal,
    /// Refunded to the depositor after expiry.
    Reclaim,
}

/// A spent puzzle. Kept forever so the puzzle cannot be funded again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpentDeposit {
    pub owner: Identity,
    pub paid_to: Identity,
    pub amount: Amount,
    pub kind: TransferKind,
    pub spent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "slot", rename_all = "snake_case")]
pub enum DepositSlot {
    Active(Deposit),
    Spent(SpentDeposit),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    Empty,
    Deposited,
    Withdrawn,
    Reclaimed,
}

impl From<Option<&DepositSlot>> for DepositStatus {
    fn from(slot: Option<&DepositSlot>) -> Self {
        match slot {
            None => DepositStatus::Empty,
            Some(DepositSlot::Active(_)) => DepositStatus::Deposited,
            Some(DepositSlot::Spent(spent)) => match spent.kind {
                TransferKind::Withdrawal => DepositStatus::Withdrawn,
                TransferKind::Reclaim => DepositStatus::Reclaimed,
            },
        }
    }
}
