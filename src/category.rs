use color_eyre::eyre::OptionExt as _;
use serde::Deserialize;
use serde::Serialize;

use crate::transaction::CategoryId;
use crate::transaction::OwnerId;

const DEFAULT_INCOME_CATEGORIES: [&str; 6] = [
    "Salary",
    "Bonus",
    "Refund",
    "Investment Returns",
    "Gift Received",
    "Other Income",
];

const DEFAULT_EXPENSE_CATEGORIES: [&str; 12] = [
    "Food & Dining",
    "Groceries",
    "Transportation",
    "Rent",
    "Utilities",
    "Healthcare",
    "Entertainment",
    "Shopping",
    "Education",
    "Insurance",
    "Travel",
    "Other Expense",
];

#[derive(Debug, Serialize, Deserialize, Copy, Clone, Hash, PartialEq, Eq, parse_display::Display)]
#[serde(rename_all = "snake_case")]
#[display(style = "snake_case")]
pub enum CategoryKind {
    Income,
    Expense,
}

/// Descriptive grouping of transactions. Categories never affect balances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub owner_id: OwnerId,
    pub name: String,
    pub kind: CategoryKind,
    /// System categories are seeded for every owner and cannot be deleted.
    pub is_system: bool,
}

impl Category {
    pub fn new(id: CategoryId, owner_id: OwnerId, name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            id,
            owner_id,
            name: name.into(),
            kind,
            is_system: false,
        }
    }

    pub const fn is_deletable(&self) -> bool {
        !self.is_system
    }
}

/// The system categories seeded for a new owner, income first, with ids counting up from `first_id`.
///
/// # Errors
///
/// Returns an error if the ids would run past `u32::MAX`.
pub fn default_categories(owner_id: OwnerId, first_id: CategoryId) -> color_eyre::Result<Vec<Category>> {
    let income = DEFAULT_INCOME_CATEGORIES.iter().map(|name| (*name, CategoryKind::Income));
    let expense = DEFAULT_EXPENSE_CATEGORIES.iter().map(|name| (*name, CategoryKind::Expense));

    income
        .chain(expense)
        .enumerate()
        .map(|(offset, (name, kind))| -> color_eyre::Result<Category> {
            let id = u32::try_from(offset)
                .ok()
                .and_then(|offset| first_id.0.checked_add(offset))
                .ok_or_eyre(format!("category ids exhausted first_id={first_id} name={name}"))?;
            Ok(Category {
                is_system: true,
                ..Category::new(CategoryId(id), owner_id, name, kind)
            })
        })
        .collect()
}
