use chrono::NaiveDate;
use color_eyre::eyre::bail;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

#[derive(Debug, Serialize, Deserialize, Copy, Clone, Hash, PartialEq, Eq, Ord, PartialOrd, parse_display::Display)]
pub struct OwnerId(pub u32);

#[derive(Debug, Serialize, Deserialize, Copy, Clone, Hash, PartialEq, Eq, Ord, PartialOrd, parse_display::Display)]
pub struct AccountId(pub u32);

#[derive(Debug, Serialize, Deserialize, Copy, Clone, Hash, PartialEq, Eq, Ord, PartialOrd, parse_display::Display)]
pub struct TransactionId(pub u32);

#[derive(Debug, Serialize, Deserialize, Copy, Clone, Hash, PartialEq, Eq, Ord, PartialOrd, parse_display::Display)]
pub struct CategoryId(pub u32);

#[derive(Debug, Serialize, Deserialize, Copy, Clone, Hash, PartialEq, Eq, parse_display::Display)]
#[serde(rename_all = "snake_case")]
#[display(style = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

/// A persisted transaction. Its effects are reflected in the referenced accounts
/// for as long as it is stored.
#[derive(Debug, Clone, PartialEq, Eq, parse_display::Display)]
#[display("tx=(id={id} owner_id={owner_id} {details})")]
pub struct Transaction {
    pub id: TransactionId,
    pub owner_id: OwnerId,
    pub details: TransactionDetails,
}

impl Transaction {
    pub const fn kind(&self) -> TransactionKind {
        self.details.kind
    }

    pub const fn amount(&self) -> PositiveAmount {
        self.details.amount
    }

    pub const fn source_account_id(&self) -> Option<AccountId> {
        self.details.source_account_id
    }

    pub const fn dest_account_id(&self) -> Option<AccountId> {
        self.details.dest_account_id
    }
}

/// The user supplied fields of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, parse_display::Display)]
#[display("{kind} amount={amount}")]
pub struct TransactionDetails {
    pub kind: TransactionKind,
    pub amount: PositiveAmount,
    pub date: NaiveDate,
    pub description: String,
    pub notes: String,
    pub category_id: Option<CategoryId>,
    pub source_account_id: Option<AccountId>,
    pub dest_account_id: Option<AccountId>,
}

impl TransactionDetails {
    pub const fn new(kind: TransactionKind, amount: PositiveAmount, date: NaiveDate) -> Self {
        Self {
            kind,
            amount,
            date,
            description: String::new(),
            notes: String::new(),
            category_id: None,
            source_account_id: None,
            dest_account_id: None,
        }
    }

    pub fn with_source(mut self, account_id: AccountId) -> Self {
        self.source_account_id = Some(account_id);
        self
    }

    pub fn with_destination(mut self, account_id: AccountId) -> Self {
        self.dest_account_id = Some(account_id);
        self
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Field values assigned onto a stored transaction by an update.
///
/// `None` leaves the field untouched. For the optional references the inner
/// `Option` is the new value, so `Some(None)` clears the reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub kind: Option<TransactionKind>,
    pub amount: Option<PositiveAmount>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub category_id: Option<Option<CategoryId>>,
    pub source_account_id: Option<Option<AccountId>>,
    pub dest_account_id: Option<Option<AccountId>>,
}

impl TransactionPatch {
    pub fn amount(amount: PositiveAmount) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(self, details: &mut TransactionDetails) {
        let Self {
            kind,
            amount,
            date,
            description,
            notes,
            category_id,
            source_account_id,
            dest_account_id,
        } = self;

        if let Some(kind) = kind {
            details.kind = kind;
        }
        if let Some(amount) = amount {
            details.amount = amount;
        }
        if let Some(date) = date {
            details.date = date;
        }
        if let Some(description) = description {
            details.description = description;
        }
        if let Some(notes) = notes {
            details.notes = notes;
        }
        if let Some(category_id) = category_id {
            details.category_id = category_id;
        }
        if let Some(source_account_id) = source_account_id {
            details.source_account_id = source_account_id;
        }
        if let Some(dest_account_id) = dest_account_id {
            details.dest_account_id = dest_account_id;
        }
    }
}

/// This permits to avoid checks on zero or negative amounts while posting transactions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, parse_display::Display)]
pub struct PositiveAmount(Decimal);

impl TryFrom<Decimal> for PositiveAmount {
    type Error = color_eyre::Report;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.is_sign_negative() || value.is_zero() {
            bail!("amount must be strictly positive value={value:?}");
        }
        Ok(Self(value))
    }
}

impl PositiveAmount {
    pub const fn as_inner(&self) -> Decimal {
        self.0
    }
}

impl<'de> Deserialize<'de> for PositiveAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let decimal = <Decimal as serde::Deserialize>::deserialize(deserializer)?;
        Self::try_from(decimal).map_err(|error| serde::de::Error::custom(error.to_string()))
    }
}
