use crate::error::{EscrowError, Result};
use crate::types::{Amount, Identity};
use std::collections::HashMap;

/// Outgoing transfer to an identity, performed by the hosting ledger.
///
/// Callers zero their own bookkeeping before invoking `pay` and restore it
/// if `pay` fails.
pub trait Payout {
    fn pay(&mut self, to: &Identity, amount: Amount) -> Result<()>;
}

/// In-memory payout sink used for simulation and tests.
#[derive(Debug, Default)]
pub struct Accounts {
    balances: HashMap<Identity, Amount>,
    transfers: Vec<(Identity, Amount)>,
    failing: bool,
}

impl Accounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, who: &Identity) -> Amount {
        self.balances.get(who).copied().unwrap_or_default()
    }

    pub fn transfers(&self) -> &[(Identity, Amount)] {
        &self.transfers
    }

    /// Makes every following transfer fail until switched back.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl Payout for Accounts {
    fn pay(&mut self, to: &Identity, amount: Amount) -> Result<()> {
        if self.failing {
            return Err(EscrowError::payout(format!("transfer to {} rejected", to)));
        }

        let balance = self.balances.entry(to.clone()).or_default();
        *balance = balance.try_add(amount)?;
        self.transfers.push((to.clone(), amount));
        Ok(())
    }
}
