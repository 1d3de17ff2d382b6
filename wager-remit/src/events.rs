use crate::deposit::TransferKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wager_core::{AdminEvent, Amount, Commitment, Event, Identity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RemittanceEvent {
    Deposited {
        puzzle: Commitment,
        owner: Identity,
        amount: Amount,
        fee: Amount,
        expires_at: DateTime<Utc>,
    },
    Transferred {
        puzzle: Commitment,
        to: Identity,
        amount: Amount,
        kind: TransferKind,
    },
    Admin(AdminEvent),
}

impl RemittanceEvent {
    pub fn puzzle(&self) -> Option<Commitment> {
        match self {
            RemittanceEvent::Deposited { puzzle, .. }
            | RemittanceEvent::Transferred { puzzle, .. } => Some(*puzzle),
            RemittanceEvent::Admin(_) => None,
        }
    }
}

impl Event for RemittanceEvent {
    fn name(&self) -> &'static str {
        match self {
            RemittanceEvent::Deposited { .. } => "deposited",
            RemittanceEvent::Transferred { .. } => "transferred",
            RemittanceEvent::Admin(event) => event.name(),
        }
    }
}

impl From<AdminEvent> for RemittanceEvent {
    fn from(event: AdminEvent) -> Self {
        RemittanceEvent::Admin(event)
    }
}
