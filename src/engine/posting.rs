use crate::account::AccountKind;
use crate::account::LedgerAccount;
use crate::account::LedgerAccountError;
use crate::transaction::AccountId;
use crate::transaction::PositiveAmount;
use crate::transaction::Transaction;
use crate::transaction::TransactionKind;

/// A single balance mutation on one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, parse_display::Display)]
#[display(style = "snake_case")]
pub enum Posting {
    CreditBalance,
    DebitBalance,
    Charge,
    PayDown,
}

impl Posting {
    pub const fn inverse(self) -> Self {
        match self {
            Self::CreditBalance => Self::DebitBalance,
            Self::DebitBalance => Self::CreditBalance,
            Self::Charge => Self::PayDown,
            Self::PayDown => Self::Charge,
        }
    }

    pub(in crate::engine) fn post(
        self,
        account: &mut LedgerAccount,
        amount: PositiveAmount,
    ) -> Result<(), LedgerAccountError> {
        match self {
            Self::CreditBalance => crate::account::credit_balance(account, amount),
            Self::DebitBalance => crate::account::debit_balance(account, amount),
            Self::Charge => crate::account::charge(account, amount),
            Self::PayDown => crate::account::pay_down(account, amount),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, parse_display::Display)]
#[display(style = "snake_case")]
pub enum Side {
    Source,
    Destination,
}

impl Side {
    pub const fn account_id(self, tx: &Transaction) -> Option<AccountId> {
        match self {
            Self::Source => tx.source_account_id(),
            Self::Destination => tx.dest_account_id(),
        }
    }
}

/// A posting as it was applied to an account, recorded with its transaction so that
/// reverting undoes exactly what applying did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, parse_display::Display)]
#[display("{posting} {amount} on {side} account_id={account_id}")]
pub struct AppliedPosting {
    pub side: Side,
    pub account_id: AccountId,
    pub posting: Posting,
    pub amount: PositiveAmount,
}

impl AppliedPosting {
    pub const fn inverse(self) -> Self {
        Self {
            posting: self.posting.inverse(),
            ..self
        }
    }

    pub(in crate::engine) fn post(self, account: &mut LedgerAccount) -> Result<(), LedgerAccountError> {
        self.posting.post(account, self.amount)
    }
}

/// Whether a transaction of `kind` routes money through `side`.
pub const fn requires(kind: TransactionKind, side: Side) -> bool {
    matches!(
        (kind, side),
        (TransactionKind::Income, Side::Destination)
            | (TransactionKind::Expense, Side::Source)
            | (TransactionKind::Transfer, _)
    )
}

/// Whether every required side must resolve for any side to be posted.
pub const fn is_all_or_nothing(kind: TransactionKind) -> bool {
    matches!(kind, TransactionKind::Transfer)
}

/// The posting a transaction applies to the account on `side`.
///
/// `None` means the combination is not modeled and the side has no effect.
pub const fn posting_for(kind: TransactionKind, side: Side, account_kind: AccountKind) -> Option<Posting> {
    use AccountKind::Bank;
    use AccountKind::Cash;
    use AccountKind::CreditCard;

    match (kind, side, account_kind) {
        (TransactionKind::Income, Side::Destination, Bank | Cash) => Some(Posting::CreditBalance),
        (TransactionKind::Expense, Side::Source, Bank | Cash) => Some(Posting::DebitBalance),
        (TransactionKind::Expense, Side::Source, CreditCard) => Some(Posting::Charge),
        (TransactionKind::Transfer, Side::Source, Bank | Cash) => Some(Posting::DebitBalance),
        (TransactionKind::Transfer, Side::Destination, Bank | Cash) => Some(Posting::CreditBalance),
        (TransactionKind::Transfer, Side::Destination, CreditCard) => Some(Posting::PayDown),
        _ => None,
    }
}
