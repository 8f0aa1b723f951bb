//! Persistence seam of the ledger.
//!
//! The engine never touches a store directly: it opens a [`UnitOfWork`] through
//! [`LedgerStore::begin`], reads and writes records through it and commits once.
//! A unit dropped without [`UnitOfWork::commit`] discards every staged write.
//! [`memory_store`] provides the in-process implementation.

pub mod memory_store;

pub use memory_store::MemoryStore;

use crate::account::LedgerAccount;
use crate::account::LedgerAccountError;
use crate::engine::AppliedPosting;
use crate::transaction::AccountId;
use crate::transaction::OwnerId;
use crate::transaction::Transaction;
use crate::transaction::TransactionDetails;
use crate::transaction::TransactionId;

pub trait LedgerStore {
    type Unit<'a>: UnitOfWork
    where
        Self: 'a;

    fn begin(&mut self) -> Self::Unit<'_>;
}

pub trait UnitOfWork {
    /// Returns `None` when no account with `id` exists.
    fn account(&self, id: AccountId) -> Result<Option<LedgerAccount>, StoreError>;

    fn save_account(&mut self, account: LedgerAccount) -> Result<(), StoreError>;

    /// Returns `None` when no transaction with `id` exists.
    fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;

    /// Persists a new transaction and returns it with its assigned id.
    fn insert_transaction(&mut self, owner_id: OwnerId, details: TransactionDetails)
    -> Result<Transaction, StoreError>;

    fn save_transaction(&mut self, transaction: Transaction) -> Result<(), StoreError>;

    /// Removes the transaction together with its recorded postings.
    fn remove_transaction(&mut self, id: TransactionId) -> Result<(), StoreError>;

    /// Postings recorded for transaction `id`, empty when none are.
    fn postings(&self, id: TransactionId) -> Result<Vec<AppliedPosting>, StoreError>;

    /// Replaces the postings recorded for an existing transaction.
    fn record_postings(&mut self, id: TransactionId, postings: Vec<AppliedPosting>) -> Result<(), StoreError>;

    fn commit(self) -> Result<(), StoreError>;
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("account already exists account_id={id}")]
    DuplicateAccount { id: AccountId },
    #[error("account not found account_id={id}")]
    AccountNotFound { id: AccountId },
    #[error("transaction not found in store id={id}")]
    TransactionNotFound { id: TransactionId },
    #[error("transaction id space exhausted")]
    TransactionIdsExhausted,
    #[error(transparent)]
    Account(#[from] LedgerAccountError),
}
