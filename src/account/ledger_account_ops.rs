//! Free functions that mutate a supplied [`LedgerAccount`].
//!
//! Every function checks that the account kind carries the bucket it touches:
//! `current_balance` for bank and cash accounts, `used_amount` for credit cards.
//! New values are computed with checked arithmetic and written only once all of
//! them are known, so a failed call leaves the account untouched.

use rust_decimal::Decimal;

use crate::account::AccountKind;
use crate::account::AccountUpdate;
use crate::account::LedgerAccount;
use crate::transaction::AccountId;
use crate::transaction::PositiveAmount;

#[derive(thiserror::Error, Debug)]
pub enum LedgerAccountError {
    #[error("overflow while applying {amount} to account_id={account_id}")]
    OperationOverflow {
        account_id: AccountId,
        amount: PositiveAmount,
    },
    #[error("cannot {operation} on {kind} account_id={account_id}")]
    KindMismatch {
        account_id: AccountId,
        kind: AccountKind,
        operation: &'static str,
    },
}

/// Adds `amount` to the current balance of a bank or cash account.
///
/// # Errors
///
/// Returns an error if:
/// - The account is a credit card ([`LedgerAccountError::KindMismatch`]).
/// - Adding `amount` overflows ([`LedgerAccountError::OperationOverflow`]).
pub fn credit_balance(account: &mut LedgerAccount, amount: PositiveAmount) -> Result<(), LedgerAccountError> {
    ensure_holds_balance(account, "credit balance")?;
    account.current_balance = account
        .current_balance
        .checked_add(amount.as_inner())
        .ok_or_else(|| overflow_error(account, amount))?;
    Ok(())
}

/// Subtracts `amount` from the current balance of a bank or cash account.
///
/// The balance is allowed to go negative.
///
/// # Errors
///
/// Returns an error if:
/// - The account is a credit card ([`LedgerAccountError::KindMismatch`]).
/// - Subtracting `amount` overflows ([`LedgerAccountError::OperationOverflow`]).
pub fn debit_balance(account: &mut LedgerAccount, amount: PositiveAmount) -> Result<(), LedgerAccountError> {
    ensure_holds_balance(account, "debit balance")?;
    account.current_balance = account
        .current_balance
        .checked_sub(amount.as_inner())
        .ok_or_else(|| overflow_error(account, amount))?;
    Ok(())
}

/// Adds `amount` to the debt of a credit card.
///
/// # Errors
///
/// Returns an error if:
/// - The account is not a credit card ([`LedgerAccountError::KindMismatch`]).
/// - Adding `amount` overflows ([`LedgerAccountError::OperationOverflow`]).
pub fn charge(account: &mut LedgerAccount, amount: PositiveAmount) -> Result<(), LedgerAccountError> {
    ensure_credit_card(account, "charge")?;
    account.used_amount = account
        .used_amount
        .checked_add(amount.as_inner())
        .ok_or_else(|| overflow_error(account, amount))?;
    Ok(())
}

/// Reduces the debt of a credit card by `amount`, flooring it at zero.
///
/// # Errors
///
/// Returns an error if:
/// - The account is not a credit card ([`LedgerAccountError::KindMismatch`]).
pub fn pay_down(account: &mut LedgerAccount, amount: PositiveAmount) -> Result<(), LedgerAccountError> {
    ensure_credit_card(account, "pay down")?;
    // used_amount >= 0 and amount > 0, the subtraction cannot overflow.
    account.used_amount = (account.used_amount - amount.as_inner()).max(Decimal::ZERO);
    Ok(())
}

/// Assigns the descriptive fields of `update`. Balances are never touched.
///
/// # Errors
///
/// Returns [`LedgerAccountError::KindMismatch`] if `update` sets a limit on an account
/// that is not a credit card. Nothing is assigned in that case.
pub fn update_details(account: &mut LedgerAccount, update: AccountUpdate) -> Result<(), LedgerAccountError> {
    let AccountUpdate { name, total_limit } = update;
    if total_limit.is_some() {
        ensure_credit_card(account, "set total limit")?;
    }
    if let Some(name) = name {
        account.name = name;
    }
    if let Some(total_limit) = total_limit {
        account.total_limit = total_limit;
    }
    Ok(())
}

const fn ensure_holds_balance(account: &LedgerAccount, operation: &'static str) -> Result<(), LedgerAccountError> {
    if account.kind.holds_balance() {
        return Ok(());
    }
    Err(kind_mismatch_error(account, operation))
}

const fn ensure_credit_card(account: &LedgerAccount, operation: &'static str) -> Result<(), LedgerAccountError> {
    if let AccountKind::CreditCard = account.kind {
        return Ok(());
    }
    Err(kind_mismatch_error(account, operation))
}

const fn overflow_error(account: &LedgerAccount, amount: PositiveAmount) -> LedgerAccountError {
    LedgerAccountError::OperationOverflow {
        account_id: account.id,
        amount,
    }
}

const fn kind_mismatch_error(account: &LedgerAccount, operation: &'static str) -> LedgerAccountError {
    LedgerAccountError::KindMismatch {
        account_id: account.id,
        kind: account.kind,
        operation,
    }
}
