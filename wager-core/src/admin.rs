//! Owner-gated controls shared by every state machine: the pause switch,
//! ownership, and the fee vault used by deposit-taking variants.

use crate::error::{EscrowError, Result};
use crate::events::Event;
use crate::payout::Payout;
use crate::types::{Amount, Identity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdminEvent {
    Paused { by: Identity },
    Resumed { by: Identity },
    OwnershipTransferred { from: Identity, to: Identity },
    DepositFeeChanged { by: Identity, old: Amount, new: Amount },
    FeesWithdrawn { to: Identity, amount: Amount },
}

impl Event for AdminEvent {
    fn name(&self) -> &'static str {
        match self {
            AdminEvent::Paused { .. } => "paused",
            AdminEvent::Resumed { .. } => "resumed",
            AdminEvent::OwnershipTransferred { .. } => "ownership_transferred",
            AdminEvent::DepositFeeChanged { .. } => "deposit_fee_changed",
            AdminEvent::FeesWithdrawn { .. } => "fees_withdrawn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    owner: Identity,
    paused: bool,
}

impl Controls {
    pub fn new(owner: Identity, paused: bool) -> Self {
        Self { owner, paused }
    }

    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    pub fn is_running(&self) -> bool {
        !self.paused
    }

    pub fn ensure_running(&self) -> Result<()> {
        if self.paused {
            return Err(EscrowError::SystemPaused);
        }
        Ok(())
    }

    pub fn ensure_owner(&self, caller: &Identity) -> Result<()> {
        if *caller != self.owner {
            return Err(EscrowError::OwnerRequired);
        }
        Ok(())
    }

    pub fn pause(&mut self, caller: &Identity) -> Result<AdminEvent> {
        self.ensure_owner(caller)?;
        if self.paused {
            return Err(EscrowError::AlreadyPaused);
        }

        self.paused = true;
        tracing::warn!("Paused by {}", caller);
        Ok(AdminEvent::Paused { by: caller.clone() })
    }

    pub fn resume(&mut self, caller: &Identity) -> Result<AdminEvent> {
        self.ensure_owner(caller)?;
        if !self.paused {
            return Err(EscrowError::NotPaused);
        }

        self.paused = false;
        tracing::info!("Resumed by {}", caller);
        Ok(AdminEvent::Resumed { by: caller.clone() })
    }

    pub fn transfer_ownership(&mut self, caller: &Identity, new_owner: Identity) -> Result<AdminEvent> {
        self.ensure_owner(caller)?;

        let from = std::mem::replace(&mut self.owner, new_owner.clone());
        tracing::info!("Ownership transferred from {} to {}", from, new_owner);
        Ok(AdminEvent::OwnershipTransferred {
            from,
            to: new_owner,
        })
    }
}

/// Fee charged per deposit and the fees collected so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeVault {
    fee: Amount,
    collected: Amount,
}

impl FeeVault {
    pub fn new(fee: Amount) -> Self {
        Self {
            fee,
            collected: Amount::ZERO,
        }
    }

    pub fn fee(&self) -> Amount {
        self.fee
    }

    pub fn collected(&self) -> Amount {
        self.collected
    }

    pub fn collect(&mut self, amount: Amount) -> Result<()> {
        self.collected = self.collected.try_add(amount)?;
        Ok(())
    }

    pub fn set_fee(&mut self, controls: &Controls, caller: &Identity, fee: Amount) -> Result<AdminEvent> {
        controls.ensure_owner(caller)?;

        let old = std::mem::replace(&mut self.fee, fee);
        tracing::info!("Deposit fee changed from {} to {}", old, fee);
        Ok(AdminEvent::DepositFeeChanged {
            by: caller.clone(),
            old,
            new: fee,
        })
    }

    /// Zeroes the collected fees before paying them to the owner.
    pub fn withdraw_to(
        &mut self,
        controls: &Controls,
        caller: &Identity,
        payout: &mut dyn Payout,
    ) -> Result<AdminEvent> {
        controls.ensure_owner(caller)?;
        if self.collected.is_zero() {
            return Err(EscrowError::NoBalance);
        }

        let amount = std::mem::take(&mut self.collected);
        if let Err(e) = payout.pay(caller, amount) {
            tracing::warn!("Fee withdrawal of {} failed: {}", amount, e);
            self.collected = amount;
            return Err(e);
        }

        tracing::info!("Withdrew {} in fees to {}", amount, caller);
        Ok(AdminEvent::FeesWithdrawn {
            to: caller.clone(),
            amount,
        })
    }
}
