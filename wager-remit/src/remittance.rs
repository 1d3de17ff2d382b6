use crate::deposit::{Deposit, DepositSlot, DepositStatus, SpentDeposit, TransferKind};
use crate::error::{RemittanceError, Result};
use crate::events::RemittanceEvent;
use crate::puzzle::create_puzzle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use wager_core::{
    Amount, Call, Clock, Commitment, Controls, EscrowError, EventLog, EventStore, FeeVault,
    Identity, Payout, ProtocolConfig, SnapshotStore, Storage,
};

/// Storage key for snapshots and events of this state machine.
pub const COMPONENT: &str = "remittance";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemittanceSnapshot {
    pub config: ProtocolConfig,
    pub controls: Controls,
    pub fees: FeeVault,
    pub deposits: BTreeMap<Commitment, DepositSlot>,
    pub custody: Amount,
}

/// Password escrow. A depositor locks funds under the puzzle of a recipient
/// and password; the recipient claims them by presenting the password, or
/// the depositor takes them back once the deposit expires.
pub struct Remittance {
    config: ProtocolConfig,
    controls: Controls,
    fees: FeeVault,
    deposits: BTreeMap<Commitment, DepositSlot>,
    custody: Amount,
    events: EventLog<RemittanceEvent>,
    clock: Arc<dyn Clock>,
}

impl Remittance {
    pub fn new(owner: Identity, config: ProtocolConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            controls: Controls::new(owner, config.start_paused),
            fees: FeeVault::new(config.deposit_fee),
            config,
            deposits: BTreeMap::new(),
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

    pub fn deposit_fee(&self) -> Amount {
        self.fees.fee()
    }

    /// Fees collected and not yet withdrawn by the owner.
    pub fn fees(&self) -> Amount {
        self.fees.collected()
    }

    pub fn deposit_of(&self, puzzle: &Commitment) -> Option<&Deposit> {
        match self.deposits.get(puzzle) {
            Some(DepositSlot::Active(deposit)) => Some(deposit),
            _ => None,
        }
    }

    pub fn slot(&self, puzzle: &Commitment) -> Option<&DepositSlot> {
        self.deposits.get(puzzle)
    }

    pub fn status(&self, puzzle: &Commitment) -> DepositStatus {
        DepositStatus::from(self.deposits.get(puzzle))
    }

    /// Active deposit balances plus collected fees.
    pub fn custody(&self) -> Amount {
        self.custody
    }

    pub fn events(&self) -> &EventLog<RemittanceEvent> {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<RemittanceEvent> {
        self.events.drain()
    }

    pub fn create_puzzle(&self, recipient: &Identity, secret: &[u8]) -> Commitment {
        create_puzzle(recipient, secret)
    }

    /// Locks the attached value under `puzzle`, less the deposit fee. The
    /// depositor may reclaim it once `timeout` has passed.
    pub fn deposit(&mut self, call: &Call, puzzle: Commitment, timeout: Duration) -> Result<()> {
        self.controls.ensure_running()?;
        if puzzle.is_zero() {
            return Err(RemittanceError::InvalidPuzzle);
        }
        if call.value.is_zero() {
            return Err(RemittanceError::EmptyDeposit);
        }
        if self.deposits.contains_key(&puzzle) {
            return Err(RemittanceError::NotEmpty(puzzle));
        }

        let fee = self.fees.fee();
        if call.value <= fee {
            let minimum = fee.try_add(Amount::from_units(1))?;
            return Err(EscrowError::value_mismatch(minimum, call.value).into());
        }
        let balance = call.value.try_sub(fee)?;
        let custody = self.custody.try_add(call.value)?;

        let timeout = chrono::Duration::from_std(timeout).map_err(|_| EscrowError::Overflow)?;
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(timeout)
            .ok_or(EscrowError::Overflow)?;

        self.fees.collect(fee)?;
        self.deposits.insert(
            puzzle,
            DepositSlot::Active(Deposit {
                owner: call.caller.clone(),
                balance,
                expires_at,
            }),
        );
        self.custody = custody;

        tracing::info!(
            "Deposit {} of {} by {}, expires {}",
            puzzle.short(),
            balance,
            call.caller,
            expires_at
        );
        self.events.emit(RemittanceEvent::Deposited {
            puzzle,
            owner: call.caller.clone(),
            amount: balance,
            fee,
            expires_at,
        });
        Ok(())
    }

    /// Recipient claim: the puzzle is recomputed from the caller and the
    /// presented password.
    pub fn withdraw(&mut self, call: &Call, secret: &[u8], payout: &mut dyn Payout) -> Result<Amount> {
        self.controls.ensure_running()?;
        call.ensure_no_value()?;

        let puzzle = create_puzzle(&call.caller, secret);
        if self.deposit_of(&puzzle).is_none() {
            return Err(RemittanceError::NoBalance);
        }
        let now = self.clock.now();

        self.pay_out(puzzle, &call.caller, TransferKind::Withdrawal, now, payout)
    }

    /// Depositor refund once the deposit has expired.
    pub fn remitter_withdraw(
        &mut self,
        call: &Call,
        puzzle: Commitment,
        payout: &mut dyn Payout,
    ) -> Result<Amount> {
        self.controls.ensure_running()?;
        call.ensure_no_value()?;

        let deposit = self.deposit_of(&puzzle).ok_or(RemittanceError::NoBalance)?;
        let now = self.clock.now();
        if !deposit.is_expired(now) {
            return Err(RemittanceError::NotExpired {
                remaining_secs: (deposit.expires_at - now).num_seconds(),
            });
        }
        if deposit.owner != call.caller {
            return Err(RemittanceError::NoBalance);
        }

        self.pay_out(puzzle, &call.caller, TransferKind::Reclaim, now, payout)
    }

    /// Tombstones the deposit, then pays. A failed payout puts the deposit
    /// back untouched.
    fn pay_out(
        &mut self,
        puzzle: Commitment,
        to: &Identity,
        kind: TransferKind,
        now: DateTime<Utc>,
        payout: &mut dyn Payout,
    ) -> Result<Amount> {
        let slot = self
            .deposits
            .get_mut(&puzzle)
            .ok_or(RemittanceError::NoBalance)?;
        let DepositSlot::Active(deposit) = &*slot else {
            return Err(RemittanceError::NoBalance);
        };
        let amount = deposit.balance;
        let custody = self.custody.try_sub(amount)?;

        let spent = DepositSlot::Spent(SpentDeposit {
            owner: deposit.owner.clone(),
            paid_to: to.clone(),
            amount,
            kind,
            spent_at: now,
        });
        let previous = std::mem::replace(slot, spent);

        if let Err(e) = payout.pay(to, amount) {
            tracing::warn!("Transfer of {} to {} failed: {}", amount, to, e);
            *slot = previous;
            return Err(e.into());
        }
        self.custody = custody;

        tracing::info!("Deposit {} paid {} to {} ({:?})", puzzle.short(), amount, to, kind);
        self.events.emit(RemittanceEvent::Transferred {
            puzzle,
            to: to.clone(),
            amount,
            kind,
        });
        Ok(amount)
    }

    pub fn set_deposit_fee(&mut self, call: &Call, fee: Amount) -> Result<()> {
        call.ensure_no_value()?;
        let event = self.fees.set_fee(&self.controls, &call.caller, fee)?;
        self.config.deposit_fee = fee;
        self.events.emit(event.into());
        Ok(())
    }

    /// Pays all collected fees to the owner.
    pub fn withdraw_deposit_fees(&mut self, call: &Call, payout: &mut dyn Payout) -> Result<Amount> {
        call.ensure_no_value()?;

        let amount = self.fees.collected();
        let custody = self.custody.try_sub(amount)?;
        let event = self.fees.withdraw_to(&self.controls, &call.caller, payout)?;
        self.custody = custody;

        self.events.emit(event.into());
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

    pub fn snapshot(&self) -> RemittanceSnapshot {
        RemittanceSnapshot {
            config: self.config.clone(),
            controls: self.controls.clone(),
            fees: self.fees.clone(),
            deposits: self.deposits.clone(),
            custody: self.custody,
        }
    }

    pub fn from_snapshot(snapshot: RemittanceSnapshot, clock: Arc<dyn Clock>) -> Result<Self> {
        snapshot.config.validate()?;

        let mut held = snapshot.fees.collected();
        for slot in snapshot.deposits.values() {
            if let DepositSlot::Active(deposit) = slot {
                held = held.try_add(deposit.balance)?;
            }
        }
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
            fees: snapshot.fees,
            deposits: snapshot.deposits,
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
        let snapshot: Option<RemittanceSnapshot> =
            SnapshotStore::new(storage).load(COMPONENT).await?;
        snapshot
            .map(|snapshot| Self::from_snapshot(snapshot, clock))
            .transpose()
    }
}

impl std::fmt::Debug for Remittance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Remittance")
            .field("owner", self.controls.owner())
            .field("running", &self.controls.is_running())
            .field("deposits", &self.deposits.len())
            .field("fees", &self.fees.collected())
            .field("custody", &self.custody)
            .finish()
    }
}
