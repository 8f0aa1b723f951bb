use std::str::FromStr;

use assert2::let_assert;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rstest::rstest;
use rust_decimal::Decimal;

use crate::account::AccountKind;
use crate::account::LedgerAccount;
use crate::account::LedgerAccountError;
use crate::engine::AppliedPosting;
use crate::engine::LedgerEngine;
use crate::engine::LedgerEngineError;
use crate::engine::Posting;
use crate::engine::ReferencePolicy;
use crate::engine::Side;
use crate::engine::SideOutcome;
use crate::store::LedgerStore;
use crate::store::MemoryStore;
use crate::store::UnitOfWork;
use crate::transaction::AccountId;
use crate::transaction::OwnerId;
use crate::transaction::PositiveAmount;
use crate::transaction::TransactionDetails;
use crate::transaction::TransactionId;
use crate::transaction::TransactionKind;
use crate::transaction::TransactionPatch;

const OWNER: OwnerId = OwnerId(1);
const OTHER_OWNER: OwnerId = OwnerId(2);
const CHECKING: AccountId = AccountId(1);
const WALLET: AccountId = AccountId(2);
const VISA: AccountId = AccountId(3);
const SAVINGS: AccountId = AccountId(4);
const FOREIGN: AccountId = AccountId(5);
const UNKNOWN: AccountId = AccountId(99);

#[test]
fn create_update_delete_expense_keeps_bank_balance_consistent() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);

    let posted = engine
        .create(&mut store, OWNER, expense("200").with_source(CHECKING))
        .unwrap();
    assert_eq!(balance(&store, CHECKING), dec("800"));

    engine
        .update(&mut store, OWNER, posted.transaction.id, TransactionPatch::amount(amount("300")))
        .unwrap();
    assert_eq!(balance(&store, CHECKING), dec("700"));

    engine.delete(&mut store, OWNER, posted.transaction.id).unwrap();
    assert_eq!(balance(&store, CHECKING), dec("1000"));
    assert_eq!(store.transactions().count(), 0);
}

#[test]
fn transfer_paying_off_a_card_floors_used_amount_at_zero() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);

    engine
        .create(&mut store, OWNER, expense("1500").with_source(VISA))
        .unwrap();
    assert_eq!(used(&store, VISA), dec("1500"));

    let posted = engine
        .create(&mut store, OWNER, transfer("2000", SAVINGS, VISA))
        .unwrap();
    assert_eq!(used(&store, VISA), Decimal::ZERO);
    assert_eq!(balance(&store, SAVINGS), dec("-1800"));
    assert_eq!(
        posted.outcome.destination,
        SideOutcome::Posted {
            account_id: VISA,
            posting: Posting::PayDown
        }
    );
}

#[test]
fn income_into_cash_is_undone_by_delete() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);

    let posted = engine
        .create(&mut store, OWNER, income("500").with_destination(WALLET))
        .unwrap();
    assert_eq!(balance(&store, WALLET), dec("500"));
    assert!(posted.outcome.is_complete());

    engine.delete(&mut store, OWNER, posted.transaction.id).unwrap();
    assert_eq!(balance(&store, WALLET), Decimal::ZERO);
}

#[test]
fn apply_and_revert_transfer_between_bank_accounts() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);
    let mut unit = store.begin();
    let tx = unit
        .insert_transaction(OWNER, transfer("300", CHECKING, SAVINGS))
        .unwrap();

    engine.apply(&mut unit, &tx).unwrap();
    assert_eq!(unit.account(CHECKING).unwrap().unwrap().current_balance(), dec("700"));
    assert_eq!(unit.account(SAVINGS).unwrap().unwrap().current_balance(), dec("500"));

    let outcome = engine.revert(&mut unit, &tx).unwrap();
    assert_eq!(unit.account(CHECKING).unwrap().unwrap().current_balance(), dec("1000"));
    assert_eq!(unit.account(SAVINGS).unwrap().unwrap().current_balance(), dec("200"));
    assert_eq!(
        outcome.source,
        SideOutcome::Posted {
            account_id: CHECKING,
            posting: Posting::CreditBalance
        }
    );
}

#[rstest]
#[case::income(income("75.25").with_destination(SAVINGS))]
#[case::bank_expense(expense("120").with_source(CHECKING))]
#[case::card_expense(expense("99.99").with_source(VISA))]
#[case::transfer(transfer("10", WALLET, CHECKING))]
#[case::missing_reference(expense("5"))]
#[case::unknown_account(expense("5").with_source(UNKNOWN))]
fn create_then_delete_restores_every_account(#[case] details: TransactionDetails) {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);
    let before = snapshot(&store);

    let posted = engine.create(&mut store, OWNER, details).unwrap();
    engine.delete(&mut store, OWNER, posted.transaction.id).unwrap();

    assert_eq!(snapshot(&store), before);
}

#[test]
fn update_migrates_effects_to_the_new_routing() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);
    let posted = engine
        .create(&mut store, OWNER, expense("250").with_source(CHECKING))
        .unwrap();

    let patch = TransactionPatch {
        amount: Some(amount("400")),
        source_account_id: Some(Some(VISA)),
        ..TransactionPatch::default()
    };
    let updated = engine
        .update(&mut store, OWNER, posted.transaction.id, patch)
        .unwrap();

    assert_eq!(balance(&store, CHECKING), dec("1000"));
    assert_eq!(used(&store, VISA), dec("400"));
    assert_eq!(store.transaction(posted.transaction.id), Some(&updated.transaction));
}

#[test]
fn update_changing_kind_moves_effect_from_source_to_destination() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);
    let posted = engine
        .create(&mut store, OWNER, expense("60").with_source(WALLET))
        .unwrap();
    assert_eq!(balance(&store, WALLET), dec("-60"));

    let patch = TransactionPatch {
        kind: Some(TransactionKind::Income),
        source_account_id: Some(None),
        dest_account_id: Some(Some(WALLET)),
        ..TransactionPatch::default()
    };
    engine
        .update(&mut store, OWNER, posted.transaction.id, patch)
        .unwrap();

    assert_eq!(balance(&store, WALLET), dec("60"));
}

#[test]
fn used_amount_never_goes_negative() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);
    let mut created = Vec::new();

    for details in [
        expense("100").with_source(VISA),
        transfer("300", CHECKING, VISA),
        expense("50").with_source(VISA),
        transfer("20", SAVINGS, VISA),
        transfer("500", CHECKING, VISA),
    ] {
        created.push(engine.create(&mut store, OWNER, details).unwrap().transaction.id);
        assert!(used(&store, VISA) >= Decimal::ZERO);
    }

    for id in created {
        engine.delete(&mut store, OWNER, id).unwrap();
        assert!(used(&store, VISA) >= Decimal::ZERO);
    }
}

#[test]
fn deleting_a_clamped_pay_down_charges_back_the_full_amount() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);
    engine
        .create(&mut store, OWNER, expense("100").with_source(VISA))
        .unwrap();
    let payment = engine
        .create(&mut store, OWNER, transfer("300", CHECKING, VISA))
        .unwrap();
    assert_eq!(used(&store, VISA), Decimal::ZERO);

    engine.delete(&mut store, OWNER, payment.transaction.id).unwrap();

    assert_eq!(used(&store, VISA), dec("300"));
    assert_eq!(balance(&store, CHECKING), dec("1000"));
}

#[test]
fn delete_does_not_touch_an_account_opened_after_apply_skipped_it() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);
    let posted = engine
        .create(&mut store, OWNER, expense("100").with_source(UNKNOWN))
        .unwrap();
    assert_eq!(posted.outcome.source, SideOutcome::AccountNotFound { account_id: UNKNOWN });
    store
        .open_account(LedgerAccount::bank(UNKNOWN, OWNER, "Late", dec("1000")))
        .unwrap();

    let deleted = engine.delete(&mut store, OWNER, posted.transaction.id).unwrap();

    assert_eq!(deleted.outcome.source, SideOutcome::NotPosted);
    assert_eq!(balance(&store, UNKNOWN), dec("1000"));
}

#[test]
fn update_only_reverts_what_was_applied_and_records_the_new_postings() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);
    let posted = engine
        .create(&mut store, OWNER, expense("100").with_source(UNKNOWN))
        .unwrap();
    assert!(store.postings(posted.transaction.id).is_empty());
    store
        .open_account(LedgerAccount::bank(UNKNOWN, OWNER, "Late", dec("1000")))
        .unwrap();

    engine
        .update(&mut store, OWNER, posted.transaction.id, TransactionPatch::amount(amount("40")))
        .unwrap();
    assert_eq!(balance(&store, UNKNOWN), dec("960"));
    assert_eq!(
        store.postings(posted.transaction.id),
        [AppliedPosting {
            side: Side::Source,
            account_id: UNKNOWN,
            posting: Posting::DebitBalance,
            amount: amount("40"),
        }]
    );

    engine.delete(&mut store, OWNER, posted.transaction.id).unwrap();
    assert_eq!(balance(&store, UNKNOWN), dec("1000"));
    assert!(store.postings(posted.transaction.id).is_empty());
}

#[test]
fn closing_an_account_keeps_transactions_and_later_reverts_skip_it() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);
    let payment = engine
        .create(&mut store, OWNER, transfer("300", CHECKING, SAVINGS))
        .unwrap();
    let spending = engine
        .create(&mut store, OWNER, expense("50").with_source(SAVINGS))
        .unwrap();

    store.close_account(SAVINGS).unwrap();

    assert_eq!(store.transaction(payment.transaction.id).unwrap().dest_account_id(), None);
    assert_eq!(store.transaction(spending.transaction.id).unwrap().source_account_id(), None);

    let deleted = engine.delete(&mut store, OWNER, payment.transaction.id).unwrap();
    assert_eq!(deleted.outcome.destination, SideOutcome::NotPosted);
    assert_eq!(balance(&store, CHECKING), dec("1000"));

    engine
        .update(&mut store, OWNER, spending.transaction.id, TransactionPatch::amount(amount("75")))
        .unwrap();
    assert_eq!(store.transactions().count(), 1);
    assert_eq!(balance(&store, CHECKING), dec("1000"));
}

#[test]
fn lenient_create_skips_missing_source_and_still_stores_the_transaction() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);
    let before = snapshot(&store);

    let posted = engine.create(&mut store, OWNER, expense("42")).unwrap();

    assert_eq!(posted.outcome.source, SideOutcome::MissingReference);
    assert_eq!(posted.outcome.destination, SideOutcome::NotApplicable);
    assert!(!posted.outcome.is_complete());
    assert_eq!(snapshot(&store), before);
    assert_eq!(store.transaction(posted.transaction.id), Some(&posted.transaction));
}

#[test]
fn lenient_transfer_with_unknown_destination_posts_neither_side() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);
    let before = snapshot(&store);

    let posted = engine
        .create(&mut store, OWNER, transfer("10", CHECKING, UNKNOWN))
        .unwrap();

    assert_eq!(
        posted.outcome.source,
        SideOutcome::CounterpartUnresolved { account_id: CHECKING }
    );
    assert_eq!(
        posted.outcome.destination,
        SideOutcome::AccountNotFound { account_id: UNKNOWN }
    );
    assert_eq!(snapshot(&store), before);
}

#[test]
fn lenient_income_into_credit_card_is_unmodeled() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);

    let posted = engine
        .create(&mut store, OWNER, income("10").with_destination(VISA))
        .unwrap();

    assert_eq!(
        posted.outcome.destination,
        SideOutcome::Unmodeled {
            account_id: VISA,
            account_kind: AccountKind::CreditCard
        }
    );
    assert_eq!(used(&store, VISA), Decimal::ZERO);
}

#[test]
fn strict_create_rejects_missing_reference_without_storing_anything() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Strict);

    let res = engine.create(&mut store, OWNER, income("10"));

    let_assert!(Err(LedgerEngineError::UnresolvedReference { side, outcome, .. }) = res);
    assert_eq!(side, Side::Destination);
    assert_eq!(outcome, SideOutcome::MissingReference);
    assert_eq!(store.transactions().count(), 0);
}

#[test]
fn strict_update_rejection_keeps_the_stored_state() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Strict);
    let posted = engine
        .create(&mut store, OWNER, expense("200").with_source(CHECKING))
        .unwrap();

    let patch = TransactionPatch {
        source_account_id: Some(Some(UNKNOWN)),
        ..TransactionPatch::default()
    };
    let res = engine.update(&mut store, OWNER, posted.transaction.id, patch);

    let_assert!(Err(LedgerEngineError::UnresolvedReference { tx_id, .. }) = res);
    assert_eq!(tx_id, posted.transaction.id);
    assert_eq!(balance(&store, CHECKING), dec("800"));
    assert_eq!(store.transaction(posted.transaction.id), Some(&posted.transaction));
}

#[test]
fn create_rejects_accounts_of_another_owner() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);

    let res = engine.create(&mut store, OWNER, expense("10").with_source(FOREIGN));

    let_assert!(Err(LedgerEngineError::ForeignAccount { account_id, owner_id, .. }) = res);
    assert_eq!(account_id, FOREIGN);
    assert_eq!(owner_id, OWNER);
    assert_eq!(balance(&store, FOREIGN), dec("50"));
    assert_eq!(store.transactions().count(), 0);
}

#[test]
fn update_and_delete_do_not_see_transactions_of_another_owner() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);
    let posted = engine
        .create(&mut store, OWNER, expense("10").with_source(CHECKING))
        .unwrap();
    let id = posted.transaction.id;

    let_assert!(
        Err(LedgerEngineError::TransactionNotFound { owner_id, .. }) =
            engine.update(&mut store, OTHER_OWNER, id, TransactionPatch::amount(amount("1")))
    );
    assert_eq!(owner_id, OTHER_OWNER);
    let_assert!(Err(LedgerEngineError::TransactionNotFound { .. }) = engine.delete(&mut store, OTHER_OWNER, id));
    let_assert!(
        Err(LedgerEngineError::TransactionNotFound { .. }) = engine.delete(&mut store, OWNER, TransactionId(404))
    );
    assert_eq!(balance(&store, CHECKING), dec("990"));
}

#[test]
fn overflow_rolls_back_the_whole_unit_of_work() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);
    store
        .open_account(LedgerAccount::bank(AccountId(6), OWNER, "Vault", Decimal::MAX))
        .unwrap();

    let res = engine.create(&mut store, OWNER, transfer("1", CHECKING, AccountId(6)));

    let_assert!(Err(LedgerEngineError::Account(LedgerAccountError::OperationOverflow { account_id, .. })) = res);
    assert_eq!(account_id, AccountId(6));
    // The source side was posted before the overflow and must not survive.
    assert_eq!(balance(&store, CHECKING), dec("1000"));
    assert_eq!(store.transactions().count(), 0);
}

#[test]
fn transfer_to_the_same_account_leaves_it_unchanged() {
    let (engine, mut store) = setup_engine_and_store(ReferencePolicy::Lenient);

    let posted = engine
        .create(&mut store, OWNER, transfer("300", CHECKING, CHECKING))
        .unwrap();

    assert!(posted.outcome.is_complete());
    assert_eq!(balance(&store, CHECKING), dec("1000"));
}

fn setup_engine_and_store(reference_policy: ReferencePolicy) -> (LedgerEngine, MemoryStore) {
    let mut store = MemoryStore::new();
    for account in [
        LedgerAccount::bank(CHECKING, OWNER, "Checking", dec("1000")),
        LedgerAccount::cash(WALLET, OWNER, "Wallet", Decimal::ZERO),
        LedgerAccount::credit_card(VISA, OWNER, "Visa", dec("5000")),
        LedgerAccount::bank(SAVINGS, OWNER, "Savings", dec("200")),
        LedgerAccount::bank(FOREIGN, OTHER_OWNER, "Joint", dec("50")),
    ] {
        store.open_account(account).unwrap();
    }
    (LedgerEngine::new(reference_policy), store)
}

fn snapshot(store: &MemoryStore) -> Vec<(AccountId, Decimal, Decimal)> {
    store
        .accounts()
        .map(|account| (account.id(), account.current_balance(), account.used_amount()))
        .collect()
}

fn balance(store: &MemoryStore, id: AccountId) -> Decimal {
    store.account(id).unwrap().current_balance()
}

fn used(store: &MemoryStore, id: AccountId) -> Decimal {
    store.account(id).unwrap().used_amount()
}

fn income(value: &str) -> TransactionDetails {
    TransactionDetails::new(TransactionKind::Income, amount(value), date())
}

fn expense(value: &str) -> TransactionDetails {
    TransactionDetails::new(TransactionKind::Expense, amount(value), date())
}

fn transfer(value: &str, source: AccountId, destination: AccountId) -> TransactionDetails {
    TransactionDetails::new(TransactionKind::Transfer, amount(value), date())
        .with_source(source)
        .with_destination(destination)
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn amount(value: &str) -> PositiveAmount {
    PositiveAmount::try_from(dec(value)).unwrap()
}

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}
