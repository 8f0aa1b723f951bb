use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error as _;

use crate::account::AccountKind;
use crate::account::LedgerAccount;
use crate::engine::LedgerEngine;
use crate::engine::LedgerEngineError;
use crate::engine::Posted;
use crate::store::LedgerStore;
use crate::transaction::AccountId;
use crate::transaction::CategoryId;
use crate::transaction::OwnerId;
use crate::transaction::PositiveAmount;
use crate::transaction::TransactionDetails;
use crate::transaction::TransactionId;
use crate::transaction::TransactionKind;
use crate::transaction::TransactionPatch;

/// One row of an operations feed: a request to change an owner's transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Create {
        owner_id: OwnerId,
        details: TransactionDetails,
    },
    Update {
        owner_id: OwnerId,
        id: TransactionId,
        patch: TransactionPatch,
    },
    Delete {
        owner_id: OwnerId,
        id: TransactionId,
    },
}

impl Operation {
    pub const fn owner_id(&self) -> OwnerId {
        match self {
            Self::Create { owner_id, .. } | Self::Update { owner_id, .. } | Self::Delete { owner_id, .. } => {
                *owner_id
            }
        }
    }

    /// Runs the operation through `engine` against `store`.
    ///
    /// # Errors
    ///
    /// See [`LedgerEngine::create`], [`LedgerEngine::update`] and [`LedgerEngine::delete`].
    pub fn execute<S: LedgerStore>(self, engine: &LedgerEngine, store: &mut S) -> Result<Posted, LedgerEngineError> {
        match self {
            Self::Create { owner_id, details } => engine.create(store, owner_id, details),
            Self::Update { owner_id, id, patch } => engine.update(store, owner_id, id, patch),
            Self::Delete { owner_id, id } => engine.delete(store, owner_id, id),
        }
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct CsvRow {
            op: String,
            owner: OwnerId,
            tx: Option<TransactionId>,
            r#type: Option<TransactionKind>,
            amount: Option<PositiveAmount>,
            date: Option<NaiveDate>,
            category: Option<CategoryId>,
            source: Option<AccountId>,
            dest: Option<AccountId>,
            description: Option<String>,
        }

        let row = CsvRow::deserialize(deserializer)?;

        match row.op.as_str() {
            "create" => {
                let kind = row.r#type.ok_or_else(|| D::Error::missing_field("type"))?;
                let amount = row.amount.ok_or_else(|| D::Error::missing_field("amount"))?;
                let date = row.date.ok_or_else(|| D::Error::missing_field("date"))?;
                Ok(Operation::Create {
                    owner_id: row.owner,
                    details: TransactionDetails {
                        category_id: row.category,
                        source_account_id: row.source,
                        dest_account_id: row.dest,
                        description: row.description.unwrap_or_default(),
                        ..TransactionDetails::new(kind, amount, date)
                    },
                })
            }
            // Empty cells leave the stored value untouched, so a feed cannot clear a reference.
            "update" => row.tx.map_or_else(
                || Err(D::Error::missing_field("tx")),
                |id| {
                    Ok(Operation::Update {
                        owner_id: row.owner,
                        id,
                        patch: TransactionPatch {
                            kind: row.r#type,
                            amount: row.amount,
                            date: row.date,
                            description: row.description,
                            notes: None,
                            category_id: row.category.map(Some),
                            source_account_id: row.source.map(Some),
                            dest_account_id: row.dest.map(Some),
                        },
                    })
                },
            ),
            "delete" => row.tx.map_or_else(
                || Err(D::Error::missing_field("tx")),
                |id| {
                    Ok(Operation::Delete {
                        owner_id: row.owner,
                        id,
                    })
                },
            ),
            other => Err(D::Error::unknown_variant(other, &["create", "update", "delete"])),
        }
    }
}

/// One row of an accounts feed.
///
/// Bank and cash accounts start from `initial_balance`, credit cards from no debt
/// against `total_limit`. Missing amounts read as zero.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRow {
    pub id: AccountId,
    pub owner: OwnerId,
    pub kind: AccountKind,
    pub name: String,
    pub initial_balance: Option<Decimal>,
    pub total_limit: Option<Decimal>,
}

impl From<AccountRow> for LedgerAccount {
    fn from(row: AccountRow) -> Self {
        let AccountRow {
            id,
            owner,
            kind,
            name,
            initial_balance,
            total_limit,
        } = row;
        match kind {
            AccountKind::Bank => Self::bank(id, owner, name, initial_balance.unwrap_or_default()),
            AccountKind::Cash => Self::cash(id, owner, name, initial_balance.unwrap_or_default()),
            AccountKind::CreditCard => Self::credit_card(id, owner, name, total_limit.unwrap_or_default()),
        }
    }
}
