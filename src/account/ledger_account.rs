use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;

use crate::transaction::AccountId;
use crate::transaction::OwnerId;

#[derive(Debug, Serialize, Deserialize, Copy, Clone, Hash, PartialEq, Eq, Ord, PartialOrd, parse_display::Display)]
#[serde(rename_all = "snake_case")]
#[display(style = "snake_case")]
pub enum AccountKind {
    Bank,
    Cash,
    CreditCard,
}

impl AccountKind {
    /// Bank and cash accounts hold money in `current_balance`, credit cards owe it in `used_amount`.
    pub const fn holds_balance(self) -> bool {
        match self {
            Self::Bank | Self::Cash => true,
            Self::CreditCard => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, parse_display::Display)]
#[display("account=({kind} id={id} owner_id={owner_id} balance={current_balance} used={used_amount})")]
pub struct LedgerAccount {
    pub(in crate::account) id: AccountId,
    pub(in crate::account) owner_id: OwnerId,
    pub(in crate::account) kind: AccountKind,
    pub(in crate::account) name: String,
    pub(in crate::account) initial_balance: Decimal,
    pub(in crate::account) current_balance: Decimal,
    pub(in crate::account) total_limit: Decimal,
    pub(in crate::account) used_amount: Decimal,
}

impl LedgerAccount {
    pub fn bank(id: AccountId, owner_id: OwnerId, name: impl Into<String>, initial_balance: Decimal) -> Self {
        Self::with_balance(id, owner_id, AccountKind::Bank, name.into(), initial_balance)
    }

    pub fn cash(id: AccountId, owner_id: OwnerId, name: impl Into<String>, initial_balance: Decimal) -> Self {
        Self::with_balance(id, owner_id, AccountKind::Cash, name.into(), initial_balance)
    }

    /// A new card starts without debt.
    pub fn credit_card(id: AccountId, owner_id: OwnerId, name: impl Into<String>, total_limit: Decimal) -> Self {
        Self {
            id,
            owner_id,
            kind: AccountKind::CreditCard,
            name: name.into(),
            initial_balance: Decimal::ZERO,
            current_balance: Decimal::ZERO,
            total_limit,
            used_amount: Decimal::ZERO,
        }
    }

    const fn with_balance(
        id: AccountId,
        owner_id: OwnerId,
        kind: AccountKind,
        name: String,
        initial_balance: Decimal,
    ) -> Self {
        Self {
            id,
            owner_id,
            kind,
            name,
            initial_balance,
            current_balance: initial_balance,
            total_limit: Decimal::ZERO,
            used_amount: Decimal::ZERO,
        }
    }

    pub const fn id(&self) -> AccountId {
        self.id
    }

    pub const fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    pub const fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn initial_balance(&self) -> Decimal {
        self.initial_balance
    }

    pub const fn current_balance(&self) -> Decimal {
        self.current_balance
    }

    pub const fn total_limit(&self) -> Decimal {
        self.total_limit
    }

    pub const fn used_amount(&self) -> Decimal {
        self.used_amount
    }

    /// Credit still spendable on a card. `None` on overflow.
    pub fn available_credit(&self) -> Option<Decimal> {
        self.total_limit.checked_sub(self.used_amount)
    }

    /// Contribution of the account to its owner's net worth.
    pub fn net_position(&self) -> Decimal {
        if self.kind.holds_balance() {
            self.current_balance
        } else {
            -self.used_amount
        }
    }
}

/// Descriptive fields of an account an owner may change after opening it.
///
/// `None` leaves the field untouched. `total_limit` only applies to credit cards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub total_limit: Option<Decimal>,
}
