use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wager_core::{
    Accounts, Amount, Call, EscrowError, Event, EventStore, Identity, ManualClock, ProtocolConfig,
    Storage,
};
use wager_remit::{
    create_puzzle, DepositStatus, Remittance, RemittanceError, RemittanceEvent, TransferKind,
};

/// 0.1 ether in wei.
const VALUE: Amount = Amount::from_units(100_000_000_000_000_000);
const DEPOSIT_FEE: Amount = Amount::from_units(100);
const TIMEOUT: Duration = Duration::from_secs(60 * 60 * 24);
const PASSWORD: &[u8] = b"password";
const FALSE_PASSWORD: &[u8] = b"something";

fn contract_owner() -> Identity {
    Identity::from("contract_owner")
}
fn deposit_owner() -> Identity {
    Identity::from("deposit_owner")
}
fn recipient() -> Identity {
    Identity::from("recipient")
}

struct Fixture {
    remittance: Remittance,
    clock: ManualClock,
    accounts: Accounts,
}

fn setup() -> Fixture {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let clock = ManualClock::starting_now();
    let config = ProtocolConfig::default().with_deposit_fee(DEPOSIT_FEE);
    let remittance = Remittance::new(contract_owner(), config, Arc::new(clock.clone())).unwrap();
    Fixture {
        remittance,
        clock,
        accounts: Accounts::new(),
    }
}

fn puzzle() -> wager_core::Commitment {
    create_puzzle(&recipient(), PASSWORD)
}

fn deposit(f: &mut Fixture) {
    f.remittance
        .deposit(&Call::paying(deposit_owner(), VALUE), puzzle(), TIMEOUT)
        .unwrap();
}

fn net_value() -> Amount {
    VALUE.try_sub(DEPOSIT_FEE).unwrap()
}

#[test]
fn running_by_default() {
    let f = setup();
    assert!(f.remittance.is_running());
    assert_eq!(f.remittance.owner(), &contract_owner());
}

#[test]
fn should_emit_on_deposit() {
    let mut f = setup();
    deposit(&mut f);

    assert_eq!(f.remittance.events().len(), 1, "We should have an event");
    let event = f.remittance.events().last().unwrap();
    assert_eq!(event.name(), "deposited");
    assert_eq!(event.puzzle(), Some(puzzle()));
    match event {
        RemittanceEvent::Deposited {
            owner, amount, fee, ..
        } => {
            assert_eq!(owner, &deposit_owner());
            assert_eq!(*amount, net_value());
            assert_eq!(*fee, DEPOSIT_FEE);
        }
        other => panic!("unexpected event {:?}", other),
    }

    let stored = f.remittance.deposit_of(&puzzle()).unwrap();
    assert_eq!(stored.owner, deposit_owner());
    assert_eq!(stored.balance, net_value());
    assert_eq!(f.remittance.fees(), DEPOSIT_FEE);
    assert_eq!(f.remittance.custody(), VALUE);
}

#[test]
fn should_be_unable_to_deposit_twice_with_the_same_puzzle() {
    let mut f = setup();
    deposit(&mut f);

    let err = f
        .remittance
        .deposit(&Call::paying(deposit_owner(), VALUE), puzzle(), TIMEOUT)
        .unwrap_err();
    assert!(matches!(err, RemittanceError::NotEmpty(_)));
    assert!(err.to_string().contains("Deposit is not empty"));
    assert_eq!(f.remittance.events().len(), 1);
}

#[test]
fn deposit_should_revert_if_no_value() {
    let mut f = setup();
    let err = f
        .remittance
        .deposit(&Call::new(deposit_owner()), puzzle(), TIMEOUT)
        .unwrap_err();
    assert_eq!(err.to_string(), "Need to deposit something");
}

#[test]
fn should_be_unable_to_withdraw_with_invalid_password() {
    let mut f = setup();
    deposit(&mut f);

    let err = f
        .remittance
        .withdraw(&Call::new(recipient()), FALSE_PASSWORD, &mut f.accounts)
        .unwrap_err();
    assert_eq!(err.to_string(), "No balance available");

    // Right password, wrong recipient
    assert!(matches!(
        f.remittance
            .withdraw(&Call::new(deposit_owner()), PASSWORD, &mut f.accounts),
        Err(RemittanceError::NoBalance)
    ));
    assert_eq!(f.remittance.status(&puzzle()), DepositStatus::Deposited);
}

#[test]
fn should_be_unable_to_withdraw_if_not_deposited() {
    let mut f = setup();
    assert!(matches!(
        f.remittance
            .withdraw(&Call::new(recipient()), PASSWORD, &mut f.accounts),
        Err(RemittanceError::NoBalance)
    ));
}

#[test]
fn should_withdraw_deposit_with_valid_password() {
    let mut f = setup();
    deposit(&mut f);

    let paid = f
        .remittance
        .withdraw(&Call::new(recipient()), PASSWORD, &mut f.accounts)
        .unwrap();

    assert_eq!(paid, net_value());
    assert_eq!(f.accounts.balance_of(&recipient()), net_value());
    assert_eq!(f.remittance.events().len(), 2);
    assert_eq!(
        f.remittance.events().last().unwrap(),
        &RemittanceEvent::Transferred {
            puzzle: puzzle(),
            to: recipient(),
            amount: net_value(),
            kind: TransferKind::Withdrawal,
        }
    );
    assert_eq!(f.remittance.status(&puzzle()), DepositStatus::Withdrawn);
    assert_eq!(f.remittance.custody(), DEPOSIT_FEE);

    // Second claim finds nothing
    assert!(matches!(
        f.remittance
            .withdraw(&Call::new(recipient()), PASSWORD, &mut f.accounts),
        Err(RemittanceError::NoBalance)
    ));
}

#[test]
fn deposit_owner_cannot_reclaim_until_expired() {
    let mut f = setup();
    deposit(&mut f);

    let err = f
        .remittance
        .remitter_withdraw(&Call::new(deposit_owner()), puzzle(), &mut f.accounts)
        .unwrap_err();
    assert!(err.to_string().starts_with("Deposit is not expired"));

    f.clock.advance_secs(TIMEOUT.as_secs() as i64 - 1);
    assert!(matches!(
        f.remittance
            .remitter_withdraw(&Call::new(deposit_owner()), puzzle(), &mut f.accounts),
        Err(RemittanceError::NotExpired { remaining_secs: 1 })
    ));
}

#[test]
fn should_reclaim_after_the_deposit_expired() {
    let mut f = setup();
    deposit(&mut f);
    f.clock.advance_secs(86_400 * 28);

    // Only the depositor may reclaim
    assert!(matches!(
        f.remittance
            .remitter_withdraw(&Call::new(recipient()), puzzle(), &mut f.accounts),
        Err(RemittanceError::NoBalance)
    ));

    let refunded = f
        .remittance
        .remitter_withdraw(&Call::new(deposit_owner()), puzzle(), &mut f.accounts)
        .unwrap();
    assert_eq!(refunded, net_value());
    assert_eq!(f.accounts.balance_of(&deposit_owner()), net_value());
    assert_eq!(f.remittance.events().len(), 2);
    assert_eq!(f.remittance.events().last().unwrap().name(), "transferred");
    assert_eq!(f.remittance.status(&puzzle()), DepositStatus::Reclaimed);

    // The recipient is too late
    assert!(matches!(
        f.remittance
            .withdraw(&Call::new(recipient()), PASSWORD, &mut f.accounts),
        Err(RemittanceError::NoBalance)
    ));
}

#[test]
fn reclaim_without_deposit_has_no_balance() {
    let mut f = setup();
    assert!(matches!(
        f.remittance
            .remitter_withdraw(&Call::new(deposit_owner()), puzzle(), &mut f.accounts),
        Err(RemittanceError::NoBalance)
    ));
}

#[test]
fn recipient_can_still_claim_after_expiry() {
    let mut f = setup();
    deposit(&mut f);
    f.clock.advance_secs(86_400 * 2);

    f.remittance
        .withdraw(&Call::new(recipient()), PASSWORD, &mut f.accounts)
        .unwrap();
    assert!(matches!(
        f.remittance
            .remitter_withdraw(&Call::new(deposit_owner()), puzzle(), &mut f.accounts),
        Err(RemittanceError::NoBalance)
    ));
}

#[test]
fn contract_should_have_a_cut_of_the_action() {
    let mut f = setup();

    assert!(matches!(
        f.remittance
            .set_deposit_fee(&Call::new(deposit_owner()), Amount::from_units(150)),
        Err(RemittanceError::Escrow(EscrowError::OwnerRequired))
    ));
    f.remittance
        .set_deposit_fee(&Call::new(contract_owner()), Amount::from_units(150))
        .unwrap();
    assert_eq!(f.remittance.deposit_fee(), Amount::from_units(150));
    assert_eq!(f.remittance.events().last().unwrap().name(), "deposit_fee_changed");

    deposit(&mut f);
    f.remittance
        .withdraw(&Call::new(recipient()), PASSWORD, &mut f.accounts)
        .unwrap();
    assert_eq!(f.remittance.custody(), Amount::from_units(150));

    assert!(matches!(
        f.remittance
            .withdraw_deposit_fees(&Call::new(recipient()), &mut f.accounts),
        Err(RemittanceError::Escrow(EscrowError::OwnerRequired))
    ));
    let events_before = f.remittance.events().len();
    let fees = f
        .remittance
        .withdraw_deposit_fees(&Call::new(contract_owner()), &mut f.accounts)
        .unwrap();
    assert_eq!(fees, Amount::from_units(150));
    assert_eq!(f.remittance.events().len(), events_before + 1);
    assert_eq!(f.remittance.events().last().unwrap().name(), "fees_withdrawn");
    assert_eq!(f.accounts.balance_of(&contract_owner()), Amount::from_units(150));
    assert_eq!(f.remittance.custody(), Amount::ZERO);

    assert!(matches!(
        f.remittance
            .withdraw_deposit_fees(&Call::new(contract_owner()), &mut f.accounts),
        Err(RemittanceError::Escrow(EscrowError::NoBalance))
    ));
}

#[test]
fn should_not_use_the_same_puzzle_twice() {
    let mut f = setup();
    deposit(&mut f);
    f.remittance
        .withdraw(&Call::new(recipient()), PASSWORD, &mut f.accounts)
        .unwrap();

    assert!(matches!(
        f.remittance
            .deposit(&Call::paying(deposit_owner(), VALUE), puzzle(), TIMEOUT),
        Err(RemittanceError::NotEmpty(_))
    ));
}

#[test]
fn value_must_exceed_the_fee() {
    let mut f = setup();
    assert!(matches!(
        f.remittance
            .deposit(&Call::paying(deposit_owner(), DEPOSIT_FEE), puzzle(), TIMEOUT),
        Err(RemittanceError::Escrow(EscrowError::ValueMismatch { .. }))
    ));

    let just_enough = DEPOSIT_FEE.try_add(Amount::from_units(1)).unwrap();
    f.remittance
        .deposit(&Call::paying(deposit_owner(), just_enough), puzzle(), TIMEOUT)
        .unwrap();
    assert_eq!(
        f.remittance.deposit_of(&puzzle()).unwrap().balance,
        Amount::from_units(1)
    );
}

#[test]
fn pause_blocks_deposits_and_claims_but_not_admin() {
    let mut f = setup();
    deposit(&mut f);

    f.remittance.pause(&Call::new(contract_owner())).unwrap();
    assert!(matches!(
        f.remittance.deposit(
            &Call::paying(deposit_owner(), VALUE),
            create_puzzle(&recipient(), b"other"),
            TIMEOUT
        ),
        Err(RemittanceError::Escrow(EscrowError::SystemPaused))
    ));
    assert!(matches!(
        f.remittance
            .withdraw(&Call::new(recipient()), PASSWORD, &mut f.accounts),
        Err(RemittanceError::Escrow(EscrowError::SystemPaused))
    ));

    f.remittance
        .withdraw_deposit_fees(&Call::new(contract_owner()), &mut f.accounts)
        .unwrap();
    f.remittance.resume(&Call::new(contract_owner())).unwrap();
    f.remittance
        .withdraw(&Call::new(recipient()), PASSWORD, &mut f.accounts)
        .unwrap();
}

#[test]
fn ownership_transfer_moves_fee_rights() {
    let mut f = setup();
    deposit(&mut f);
    let heir = Identity::from("heir");

    f.remittance
        .transfer_ownership(&Call::new(contract_owner()), heir.clone())
        .unwrap();
    assert!(matches!(
        f.remittance
            .withdraw_deposit_fees(&Call::new(contract_owner()), &mut f.accounts),
        Err(RemittanceError::Escrow(EscrowError::OwnerRequired))
    ));
    f.remittance
        .withdraw_deposit_fees(&Call::new(heir.clone()), &mut f.accounts)
        .unwrap();
    assert_eq!(f.accounts.balance_of(&heir), DEPOSIT_FEE);
}

#[tokio::test]
async fn persist_and_restore_keeps_spent_puzzles() {
    let temp_dir = TempDir::new().unwrap();
    let storage = Storage::new(&temp_dir.path().join("remittance.db"))
        .await
        .unwrap();

    let mut f = setup();
    deposit(&mut f);
    f.remittance
        .withdraw(&Call::new(recipient()), PASSWORD, &mut f.accounts)
        .unwrap();
    let pending = create_puzzle(&recipient(), b"second");
    f.remittance
        .deposit(&Call::paying(deposit_owner(), VALUE), pending, TIMEOUT)
        .unwrap();
    f.remittance.persist(&storage).await.unwrap();

    let mut restored = Remittance::restore(&storage, Arc::new(f.clock.clone()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(restored.snapshot(), f.remittance.snapshot());
    assert_eq!(restored.status(&puzzle()), DepositStatus::Withdrawn);
    assert_eq!(restored.fees(), DEPOSIT_FEE.checked_mul(2).unwrap());
    assert!(matches!(
        restored.deposit(&Call::paying(deposit_owner(), VALUE), puzzle(), TIMEOUT),
        Err(RemittanceError::NotEmpty(_))
    ));

    assert_eq!(EventStore::new(&storage).count("remittance").await.unwrap(), 3);
}
