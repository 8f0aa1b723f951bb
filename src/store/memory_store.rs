use std::collections::BTreeMap;

use crate::account::AccountUpdate;
use crate::account::LedgerAccount;
use crate::engine::AppliedPosting;
use crate::store::LedgerStore;
use crate::store::StoreError;
use crate::store::UnitOfWork;
use crate::transaction::AccountId;
use crate::transaction::OwnerId;
use crate::transaction::Transaction;
use crate::transaction::TransactionDetails;
use crate::transaction::TransactionId;

/// In-process store keyed by id.
///
/// [`BTreeMap`]s keep iteration in id order, which is the order reports and
/// analytics present records in.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: BTreeMap<AccountId, LedgerAccount>,
    transactions: BTreeMap<TransactionId, Transaction>,
    postings: BTreeMap<TransactionId, Vec<AppliedPosting>>,
    last_transaction_id: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new account outside of any unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateAccount`] if the id is already taken.
    pub fn open_account(&mut self, account: LedgerAccount) -> Result<(), StoreError> {
        let id = account.id();
        if self.accounts.contains_key(&id) {
            return Err(StoreError::DuplicateAccount { id });
        }
        self.accounts.insert(id, account);
        Ok(())
    }

    /// Assigns the descriptive fields of `update` to an account outside of any unit of work.
    /// Balances are never touched.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No account with `id` exists ([`StoreError::AccountNotFound`]).
    /// - `update` sets a limit on an account that is not a credit card ([`StoreError::Account`]).
    pub fn update_account(&mut self, id: AccountId, update: AccountUpdate) -> Result<&LedgerAccount, StoreError> {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or(StoreError::AccountNotFound { id })?;
        crate::account::update_details(account, update)?;
        Ok(&*account)
    }

    /// Removes an account outside of any unit of work and returns it.
    ///
    /// Transactions referencing the account are kept with the reference cleared, and
    /// the postings they recorded on it are forgotten. Reverting such a transaction
    /// later only undoes its postings on the accounts that are still open.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AccountNotFound`] if no account with `id` exists.
    pub fn close_account(&mut self, id: AccountId) -> Result<LedgerAccount, StoreError> {
        let account = self
            .accounts
            .remove(&id)
            .ok_or(StoreError::AccountNotFound { id })?;

        for tx in self.transactions.values_mut() {
            if tx.details.source_account_id == Some(id) {
                tx.details.source_account_id = None;
            }
            if tx.details.dest_account_id == Some(id) {
                tx.details.dest_account_id = None;
            }
        }
        self.postings.retain(|_, postings| {
            postings.retain(|applied| applied.account_id != id);
            !postings.is_empty()
        });

        Ok(account)
    }

    pub fn account(&self, id: AccountId) -> Option<&LedgerAccount> {
        self.accounts.get(&id)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &LedgerAccount> {
        self.accounts.values()
    }

    pub fn accounts_of(&self, owner_id: OwnerId) -> impl Iterator<Item = &LedgerAccount> {
        self.accounts().filter(move |account| account.owner_id() == owner_id)
    }

    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.get(&id)
    }

    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.values()
    }

    pub fn transactions_of(&self, owner_id: OwnerId) -> impl Iterator<Item = &Transaction> {
        self.transactions().filter(move |tx| tx.owner_id == owner_id)
    }

    /// Postings recorded for transaction `id` when it was applied.
    pub fn postings(&self, id: TransactionId) -> &[AppliedPosting] {
        self.postings.get(&id).map(Vec::as_slice).unwrap_or_default()
    }
}

impl LedgerStore for MemoryStore {
    type Unit<'a> = MemoryUnit<'a>;

    fn begin(&mut self) -> Self::Unit<'_> {
        let last_transaction_id = self.last_transaction_id;
        MemoryUnit {
            store: self,
            accounts: BTreeMap::new(),
            transactions: BTreeMap::new(),
            postings: BTreeMap::new(),
            last_transaction_id,
        }
    }
}

/// Staged writes over a [`MemoryStore`].
///
/// Holding the store mutably for the lifetime of the unit serializes units of work.
#[derive(Debug)]
pub struct MemoryUnit<'a> {
    store: &'a mut MemoryStore,
    accounts: BTreeMap<AccountId, LedgerAccount>,
    // `None` marks a removal.
    transactions: BTreeMap<TransactionId, Option<Transaction>>,
    // An empty list clears the recorded postings.
    postings: BTreeMap<TransactionId, Vec<AppliedPosting>>,
    last_transaction_id: u32,
}

impl MemoryUnit<'_> {
    fn transaction_exists(&self, id: TransactionId) -> bool {
        match self.transactions.get(&id) {
            Some(staged) => staged.is_some(),
            None => self.store.transactions.contains_key(&id),
        }
    }
}

impl UnitOfWork for MemoryUnit<'_> {
    fn account(&self, id: AccountId) -> Result<Option<LedgerAccount>, StoreError> {
        Ok(self
            .accounts
            .get(&id)
            .or_else(|| self.store.accounts.get(&id))
            .cloned())
    }

    fn save_account(&mut self, account: LedgerAccount) -> Result<(), StoreError> {
        let id = account.id();
        if !self.store.accounts.contains_key(&id) {
            return Err(StoreError::AccountNotFound { id });
        }
        self.accounts.insert(id, account);
        Ok(())
    }

    fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let tx = match self.transactions.get(&id) {
            Some(staged) => staged.as_ref(),
            None => self.store.transactions.get(&id),
        };
        Ok(tx.cloned())
    }

    fn insert_transaction(
        &mut self,
        owner_id: OwnerId,
        details: TransactionDetails,
    ) -> Result<Transaction, StoreError> {
        let next_id = self
            .last_transaction_id
            .checked_add(1)
            .ok_or(StoreError::TransactionIdsExhausted)?;
        self.last_transaction_id = next_id;

        let tx = Transaction {
            id: TransactionId(next_id),
            owner_id,
            details,
        };
        self.transactions.insert(tx.id, Some(tx.clone()));
        Ok(tx)
    }

    fn save_transaction(&mut self, transaction: Transaction) -> Result<(), StoreError> {
        let id = transaction.id;
        if !self.transaction_exists(id) {
            return Err(StoreError::TransactionNotFound { id });
        }
        self.transactions.insert(id, Some(transaction));
        Ok(())
    }

    fn remove_transaction(&mut self, id: TransactionId) -> Result<(), StoreError> {
        if !self.transaction_exists(id) {
            return Err(StoreError::TransactionNotFound { id });
        }
        self.transactions.insert(id, None);
        self.postings.insert(id, Vec::new());
        Ok(())
    }

    fn postings(&self, id: TransactionId) -> Result<Vec<AppliedPosting>, StoreError> {
        let postings = match self.postings.get(&id) {
            Some(staged) => staged.clone(),
            None => self.store.postings.get(&id).cloned().unwrap_or_default(),
        };
        Ok(postings)
    }

    fn record_postings(&mut self, id: TransactionId, postings: Vec<AppliedPosting>) -> Result<(), StoreError> {
        if !self.transaction_exists(id) {
            return Err(StoreError::TransactionNotFound { id });
        }
        self.postings.insert(id, postings);
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        let Self {
            store,
            accounts,
            transactions,
            postings,
            last_transaction_id,
        } = self;

        store.accounts.extend(accounts);
        for (id, staged) in transactions {
            match staged {
                Some(tx) => store.transactions.insert(id, tx),
                None => store.transactions.remove(&id),
            };
        }
        for (id, staged) in postings {
            if staged.is_empty() {
                store.postings.remove(&id);
            } else {
                store.postings.insert(id, staged);
            }
        }
        store.last_transaction_id = last_transaction_id;
        Ok(())
    }
}
