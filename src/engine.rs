//! Ledger consistency engine.
//!
//! Provides [`LedgerEngine`] which keeps account balances equal to the net effect of the
//! stored [`crate::transaction::Transaction`]s as they are created, updated and deleted.
//! [`posting`] holds the table mapping transaction and account kinds to balance postings,
//! [`outcome`] reports what a posting did to each side of a transaction.

pub mod ledger_engine;
pub mod outcome;
pub mod posting;

pub use ledger_engine::LedgerEngine;
pub use ledger_engine::LedgerEngineError;
pub use ledger_engine::ReferencePolicy;
pub use outcome::Posted;
pub use outcome::PostingOutcome;
pub use outcome::SideOutcome;
pub use posting::AppliedPosting;
pub use posting::Posting;
pub use posting::Side;
