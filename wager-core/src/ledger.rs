use crate::error::{EscrowError, Result};
use crate::payout::Payout;
use crate::types::{Amount, Identity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Standing credit owed to each identity, withdrawable on demand and
/// independent of any room lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowLedger {
    balances: BTreeMap<Identity, Amount>,
}

impl EscrowLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, who: &Identity) -> Amount {
        self.balances.get(who).copied().unwrap_or_default()
    }

    /// Sum of all standing credit.
    pub fn total(&self) -> Amount {
        self.balances
            .values()
            .fold(Amount::ZERO, |acc, b| acc.saturating_add(*b))
    }

    /// Every credited amount is already held in custody and custody is
    /// overflow-checked on the way in, so a balance cannot saturate.
    pub fn credit(&mut self, who: &Identity, amount: Amount) {
        if amount.is_zero() {
            return;
        }
        let balance = self.balances.entry(who.clone()).or_default();
        *balance = balance.saturating_add(amount);
        tracing::debug!("Credited {} to {} (now {})", amount, who, balance);
    }

    /// Checks that `amount` of standing credit could be debited.
    pub fn ensure_available(&self, who: &Identity, amount: Amount) -> Result<()> {
        let available = self.balance_of(who);
        if available < amount {
            return Err(EscrowError::InsufficientBalance {
                need: amount,
                available,
            });
        }
        Ok(())
    }

    /// Moves standing credit back into play, e.g. as a new wager.
    pub fn debit(&mut self, who: &Identity, amount: Amount) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }
        self.ensure_available(who, amount)?;

        let remaining = self.balance_of(who).try_sub(amount)?;
        if remaining.is_zero() {
            self.balances.remove(who);
        } else {
            self.balances.insert(who.clone(), remaining);
        }
        Ok(())
    }

    /// Zeroes the balance and returns what was owed.
    pub fn withdraw(&mut self, who: &Identity) -> Result<Amount> {
        match self.balances.remove(who) {
            Some(amount) if !amount.is_zero() => Ok(amount),
            _ => Err(EscrowError::NoBalance),
        }
    }

    /// Zeroes the balance, then pays it out. A failed payout restores the
    /// balance so the call leaves no trace.
    pub fn withdraw_to(&mut self, who: &Identity, payout: &mut dyn Payout) -> Result<Amount> {
        let amount = self.withdraw(who)?;

        if let Err(e) = payout.pay(who, amount) {
            tracing::warn!("Payout of {} to {} failed: {}", amount, who, e);
            self.balances.insert(who.clone(), amount);
            return Err(e);
        }

        Ok(amount)
    }
}
