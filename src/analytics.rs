//! Aggregations over an owner's accounts and transactions.
//!
//! Every function is a pure fold over the records it is handed: callers pass the
//! accounts and transactions of a single owner, e.g. from
//! [`crate::store::MemoryStore::transactions_of`]. Sums use checked arithmetic and
//! report an overflow as [`AnalyticsError::Overflow`] instead of panicking.

use std::collections::BTreeMap;
use std::collections::HashMap;

use chrono::Datelike;
use chrono::Days;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::account::AccountKind;
use crate::account::LedgerAccount;
use crate::budget::BudgetBook;
use crate::budget::YearMonth;
use crate::category::Category;
use crate::transaction::CategoryId;
use crate::transaction::OwnerId;
use crate::transaction::Transaction;
use crate::transaction::TransactionKind;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(thiserror::Error, Debug)]
pub enum AnalyticsError {
    #[error("overflow while computing {what}")]
    Overflow { what: &'static str },
    #[error("date out of range while computing {what} date={date}")]
    DateOutOfRange { what: &'static str, date: NaiveDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySpend {
    /// Monday of the week.
    pub week_start: NaiveDate,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyFlow {
    pub period: YearMonth,
    pub income: Decimal,
    pub expense: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetStatus {
    pub category_id: CategoryId,
    /// `None` when the category is not among the supplied ones.
    pub category_name: Option<String>,
    pub budget: Decimal,
    pub spent: Decimal,
    pub percentage: Decimal,
    pub is_exceeded: bool,
}

/// Bank and cash balances minus credit card debt.
pub fn net_worth<'a>(accounts: impl IntoIterator<Item = &'a LedgerAccount>) -> Result<Decimal, AnalyticsError> {
    checked_sum(accounts.into_iter().map(LedgerAccount::net_position), "net worth")
}

/// Total amount of the transactions of `kind` dated within `period`.
pub fn monthly_total<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    kind: TransactionKind,
    period: YearMonth,
) -> Result<Decimal, AnalyticsError> {
    checked_sum(
        transactions
            .into_iter()
            .filter(|tx| tx.kind() == kind && period.contains(tx.details.date))
            .map(|tx| tx.amount().as_inner()),
        "monthly total",
    )
}

/// Expense totals of `period` keyed by category name.
///
/// Expenses without a category, or with a category not in `categories`, are left out.
pub fn expense_by_category<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    categories: &[Category],
    period: YearMonth,
) -> Result<BTreeMap<String, Decimal>, AnalyticsError> {
    let names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|category| (category.id, category.name.as_str()))
        .collect();

    let mut totals = BTreeMap::new();
    for tx in monthly_expenses(transactions, period) {
        let Some(name) = tx.details.category_id.and_then(|id| names.get(&id)) else {
            continue;
        };
        accumulate(totals.entry((*name).to_owned()).or_default(), tx, "expense by category")?;
    }
    Ok(totals)
}

/// Expense totals of `period` keyed by the kind of the account that funded them.
pub fn payment_mode_breakdown<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    accounts: impl IntoIterator<Item = &'a LedgerAccount>,
    period: YearMonth,
) -> Result<BTreeMap<AccountKind, Decimal>, AnalyticsError> {
    let kinds: HashMap<_, _> = accounts
        .into_iter()
        .map(|account| (account.id(), account.kind()))
        .collect();

    let mut totals = BTreeMap::new();
    for tx in monthly_expenses(transactions, period) {
        let Some(kind) = tx.source_account_id().and_then(|id| kinds.get(&id)) else {
            continue;
        };
        accumulate(totals.entry(*kind).or_default(), tx, "payment mode breakdown")?;
    }
    Ok(totals)
}

/// Expense totals of the last `weeks` weeks, oldest first, the last one being the
/// week containing `end`. Expenses dated after `end` are left out.
pub fn weekly_trend<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    end: NaiveDate,
    weeks: u32,
) -> Result<Vec<WeeklySpend>, AnalyticsError> {
    let current_week = week_start(end)?;
    let mut buckets = BTreeMap::new();
    for weeks_back in 0..weeks {
        let week = current_week
            .checked_sub_days(Days::new(7 * u64::from(weeks_back)))
            .ok_or(AnalyticsError::DateOutOfRange {
                what: "weekly trend",
                date: current_week,
            })?;
        buckets.insert(week, Decimal::ZERO);
    }

    for tx in transactions {
        if tx.kind() != TransactionKind::Expense || tx.details.date > end {
            continue;
        }
        if let Some(total) = buckets.get_mut(&week_start(tx.details.date)?) {
            accumulate(total, tx, "weekly trend")?;
        }
    }

    Ok(buckets
        .into_iter()
        .map(|(week_start, amount)| WeeklySpend { week_start, amount })
        .collect())
}

/// Income and expense totals of the last `months` calendar months, oldest first,
/// the last one being the month of `end`.
pub fn income_vs_expense_trend<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    end: NaiveDate,
    months: u32,
) -> Result<Vec<MonthlyFlow>, AnalyticsError> {
    let mut flows = BTreeMap::new();
    let mut period = YearMonth::of(end);
    for _ in 0..months {
        flows.insert(period, (Decimal::ZERO, Decimal::ZERO));
        period = period.previous();
    }

    for tx in transactions {
        let Some((income, expense)) = flows.get_mut(&YearMonth::of(tx.details.date)) else {
            continue;
        };
        match tx.kind() {
            TransactionKind::Income => accumulate(income, tx, "income trend")?,
            TransactionKind::Expense => accumulate(expense, tx, "expense trend")?,
            TransactionKind::Transfer => {}
        }
    }

    Ok(flows
        .into_iter()
        .map(|(period, (income, expense))| MonthlyFlow {
            period,
            income,
            expense,
        })
        .collect())
}

/// Budget against actual expenses for every budget `owner_id` set for `period`.
pub fn budget_status<'a>(
    budgets: &BudgetBook,
    owner_id: OwnerId,
    period: YearMonth,
    categories: &[Category],
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Result<Vec<BudgetStatus>, AnalyticsError> {
    let mut spent_by_category: HashMap<CategoryId, Decimal> = HashMap::new();
    for tx in monthly_expenses(transactions, period) {
        if let Some(category_id) = tx.details.category_id {
            accumulate(spent_by_category.entry(category_id).or_default(), tx, "budget status")?;
        }
    }

    budgets
        .for_period(owner_id, period)
        .map(|budget| -> Result<BudgetStatus, AnalyticsError> {
            let budget_amount = budget.amount.as_inner();
            let spent = spent_by_category
                .get(&budget.category_id)
                .copied()
                .unwrap_or_default();
            let percentage = spent
                .checked_div(budget_amount)
                .and_then(|ratio| ratio.checked_mul(HUNDRED))
                .ok_or(AnalyticsError::Overflow { what: "budget percentage" })?;

            Ok(BudgetStatus {
                category_id: budget.category_id,
                category_name: categories
                    .iter()
                    .find(|category| category.id == budget.category_id)
                    .map(|category| category.name.clone()),
                budget: budget_amount,
                spent,
                percentage,
                is_exceeded: spent > budget_amount,
            })
        })
        .collect()
}

fn monthly_expenses<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    period: YearMonth,
) -> impl Iterator<Item = &'a Transaction> {
    transactions
        .into_iter()
        .filter(move |tx| tx.kind() == TransactionKind::Expense && period.contains(tx.details.date))
}

fn week_start(date: NaiveDate) -> Result<NaiveDate, AnalyticsError> {
    let days_from_monday = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(days_from_monday))
        .ok_or(AnalyticsError::DateOutOfRange {
            what: "week start",
            date,
        })
}

fn accumulate(total: &mut Decimal, tx: &Transaction, what: &'static str) -> Result<(), AnalyticsError> {
    *total = total
        .checked_add(tx.amount().as_inner())
        .ok_or(AnalyticsError::Overflow { what })?;
    Ok(())
}

fn checked_sum(mut values: impl Iterator<Item = Decimal>, what: &'static str) -> Result<Decimal, AnalyticsError> {
    values.try_fold(Decimal::ZERO, |total, value| {
        total.checked_add(value).ok_or(AnalyticsError::Overflow { what })
    })
}
