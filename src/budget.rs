use std::collections::BTreeMap;

use chrono::Datelike;
use chrono::NaiveDate;
use color_eyre::eyre::bail;

use crate::transaction::CategoryId;
use crate::transaction::OwnerId;
use crate::transaction::PositiveAmount;

/// A calendar month, the period budgets and monthly analytics are expressed in.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, parse_display::Display)]
#[display("{year}-{month:02}")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> color_eyre::Result<Self> {
        if !(1..=12).contains(&month) {
            bail!("month must be between 1 and 12 month={month}");
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub const fn year(self) -> i32 {
        self.year
    }

    pub const fn month(self) -> u32 {
        self.month
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        Self::of(date) == self
    }

    pub const fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, parse_display::Display)]
#[display("budget=(owner_id={owner_id} category_id={category_id} period={period} amount={amount})")]
pub struct Budget {
    pub owner_id: OwnerId,
    pub category_id: CategoryId,
    pub period: YearMonth,
    pub amount: PositiveAmount,
}

/// Monthly budgets, at most one per owner, category and month.
#[derive(Debug, Default)]
pub struct BudgetBook {
    budgets: BTreeMap<(OwnerId, YearMonth, CategoryId), PositiveAmount>,
}

impl BudgetBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the budget of a category for a month, replacing any existing amount.
    /// Returns the replaced amount.
    pub fn set(&mut self, budget: Budget) -> Option<PositiveAmount> {
        self.budgets
            .insert((budget.owner_id, budget.period, budget.category_id), budget.amount)
    }

    pub fn get(&self, owner_id: OwnerId, category_id: CategoryId, period: YearMonth) -> Option<Budget> {
        self.budgets
            .get(&(owner_id, period, category_id))
            .map(|&amount| Budget {
                owner_id,
                category_id,
                period,
                amount,
            })
    }

    pub fn remove(&mut self, owner_id: OwnerId, category_id: CategoryId, period: YearMonth) -> Option<Budget> {
        self.budgets
            .remove(&(owner_id, period, category_id))
            .map(|amount| Budget {
                owner_id,
                category_id,
                period,
                amount,
            })
    }

    /// Budgets of `owner_id` for `period`, in category id order.
    pub fn for_period(&self, owner_id: OwnerId, period: YearMonth) -> impl Iterator<Item = Budget> {
        self.budgets
            .range((owner_id, period, CategoryId(u32::MIN))..=(owner_id, period, CategoryId(u32::MAX)))
            .map(|(&(owner_id, period, category_id), &amount)| Budget {
                owner_id,
                category_id,
                period,
                amount,
            })
    }
}
