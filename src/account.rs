pub mod ledger_account;
pub mod ledger_account_ops;

pub use ledger_account::AccountKind;
pub use ledger_account::AccountUpdate;
pub use ledger_account::LedgerAccount;
pub use ledger_account_ops::LedgerAccountError;
pub use ledger_account_ops::charge;
pub use ledger_account_ops::credit_balance;
pub use ledger_account_ops::debit_balance;
pub use ledger_account_ops::pay_down;
pub use ledger_account_ops::update_details;
