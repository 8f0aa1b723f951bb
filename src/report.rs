use csv::Writer;
use ledgerbook::account::AccountKind;
use ledgerbook::account::LedgerAccount;
use ledgerbook::transaction::AccountId;
use ledgerbook::transaction::OwnerId;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("csv serialization error for account_id={account_id}, source_error={source:?}")]
    Csv {
        account_id: AccountId,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Write the supplied [`LedgerAccount`]'s to stdout as CSV in ascending `account_id` order,
/// amounts with two decimals.
/// Returns a [`Vec`] of [`ReportError`] representing all the errors encountered during reporting.
pub fn write_to_stdout<'a, I>(accounts: I) -> Vec<ReportError>
where
    I: IntoIterator<Item = &'a LedgerAccount>,
{
    let mut accounts: Vec<&LedgerAccount> = accounts.into_iter().collect();
    accounts.sort_unstable_by_key(|account| account.id());

    let mut writer = Writer::from_writer(std::io::stdout());
    let mut errors: Vec<ReportError> = Vec::new();

    for account in accounts {
        if let Err(source) = writer.serialize(AccountReport::from(account)) {
            errors.push(ReportError::Csv {
                account_id: account.id(),
                source,
            });
        }
    }

    if let Err(io_err) = writer.flush() {
        errors.push(ReportError::Io(io_err));
    }

    errors
}

#[derive(Serialize)]
struct AccountReport<'a> {
    account_id: AccountId,
    owner_id: OwnerId,
    kind: AccountKind,
    name: &'a str,
    current_balance: String,
    used_amount: String,
}

impl<'a> From<&'a LedgerAccount> for AccountReport<'a> {
    fn from(account: &'a LedgerAccount) -> Self {
        Self {
            account_id: account.id(),
            owner_id: account.owner_id(),
            kind: account.kind(),
            name: account.name(),
            current_balance: money(account.current_balance()),
            used_amount: money(account.used_amount()),
        }
    }
}

fn money(amount: Decimal) -> String {
    // Avoids printing `-0.00`.
    let amount = if amount.is_zero() { Decimal::ZERO } else { amount };
    format!("{amount:.2}")
}
