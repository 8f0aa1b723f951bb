use serde::Deserialize;
use tracing::debug;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use crate::account::LedgerAccount;
use crate::account::LedgerAccountError;
use crate::engine::outcome::Posted;
use crate::engine::outcome::PostingOutcome;
use crate::engine::outcome::SideOutcome;
use crate::engine::posting;
use crate::engine::posting::AppliedPosting;
use crate::engine::posting::Side;
use crate::store::LedgerStore;
use crate::store::StoreError;
use crate::store::UnitOfWork;
use crate::transaction::AccountId;
use crate::transaction::OwnerId;
use crate::transaction::Transaction;
use crate::transaction::TransactionDetails;
use crate::transaction::TransactionId;
use crate::transaction::TransactionPatch;

#[cfg(test)]
#[path = "tests/ledger_engine_tests.rs"]
mod ledger_engine_tests;

/// How applying a transaction treats a required side that cannot be posted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, parse_display::Display)]
#[serde(rename_all = "snake_case")]
#[display(style = "snake_case")]
pub enum ReferencePolicy {
    /// Skip the side and report it in the [`PostingOutcome`].
    #[default]
    Lenient,
    /// Fail the operation with [`LedgerEngineError::UnresolvedReference`].
    Strict,
}

pub struct LedgerEngine {
    reference_policy: ReferencePolicy,
}

impl LedgerEngine {
    pub const fn new(reference_policy: ReferencePolicy) -> Self {
        Self { reference_policy }
    }

    pub const fn reference_policy(&self) -> ReferencePolicy {
        self.reference_policy
    }

    /// Reflects a transaction that is not yet part of the balances and records the
    /// postings made so that [`LedgerEngine::revert`] can undo exactly those.
    ///
    /// Under [`ReferencePolicy::Strict`] nothing is written when a required side is skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A referenced account belongs to another owner ([`LedgerEngineError::ForeignAccount`]).
    /// - A required side cannot be posted under the strict policy ([`LedgerEngineError::UnresolvedReference`]).
    /// - A balance overflows ([`LedgerEngineError::Account`]).
    /// - The unit of work fails ([`LedgerEngineError::Store`]).
    pub fn apply<U: UnitOfWork>(&self, unit: &mut U, tx: &Transaction) -> Result<PostingOutcome, LedgerEngineError> {
        let plan = plan_postings(unit, tx)?;
        let rejected_side = match self.reference_policy {
            ReferencePolicy::Lenient => None,
            ReferencePolicy::Strict => plan.outcome.skipped().next(),
        };
        if let Some((side, outcome)) = rejected_side {
            return Err(LedgerEngineError::UnresolvedReference {
                tx_id: tx.id,
                side,
                outcome,
            });
        }
        execute(unit, tx, &plan.postings)?;
        for (side, outcome) in plan.outcome.skipped() {
            warn!(%tx, %side, %outcome, "side skipped");
        }
        unit.record_postings(tx.id, plan.postings)?;
        Ok(plan.outcome)
    }

    /// Removes the effects of a transaction by inverting the postings recorded when it
    /// was applied. Accounts that resolve only now are left untouched, and sides with
    /// nothing recorded are reported as [`SideOutcome::NotPosted`].
    ///
    /// # Errors
    ///
    /// Returns an error if a balance overflows ([`LedgerEngineError::Account`]) or
    /// the unit of work fails ([`LedgerEngineError::Store`]).
    pub fn revert<U: UnitOfWork>(&self, unit: &mut U, tx: &Transaction) -> Result<PostingOutcome, LedgerEngineError> {
        let reverted: Vec<AppliedPosting> = unit
            .postings(tx.id)?
            .into_iter()
            .map(AppliedPosting::inverse)
            .collect();
        execute(unit, tx, &reverted)?;
        unit.record_postings(tx.id, Vec::new())?;

        let outcome = PostingOutcome {
            source: reverted_side(tx, &reverted, Side::Source),
            destination: reverted_side(tx, &reverted, Side::Destination),
        };
        for (side, outcome) in outcome.skipped() {
            debug!(%tx, %side, %outcome, "side skipped on revert");
        }
        Ok(outcome)
    }

    /// Stores a new transaction and applies it in a single unit of work.
    ///
    /// # Errors
    ///
    /// See [`LedgerEngine::apply`]. On error neither the transaction nor any balance change is stored.
    #[instrument(skip_all, fields(owner_id = %owner_id, kind = %details.kind))]
    pub fn create<S: LedgerStore>(
        &self,
        store: &mut S,
        owner_id: OwnerId,
        details: TransactionDetails,
    ) -> Result<Posted, LedgerEngineError> {
        let mut unit = store.begin();
        let transaction = unit.insert_transaction(owner_id, details)?;
        let outcome = self.apply(&mut unit, &transaction)?;
        unit.commit()?;

        info!(%transaction, "transaction created");
        Ok(Posted { transaction, outcome })
    }

    /// Reverts the stored transaction, assigns `patch` onto it and applies it again,
    /// in a single unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerEngineError::TransactionNotFound`] if `owner_id` has no transaction `id`,
    /// otherwise see [`LedgerEngine::apply`]. On error the stored state is unchanged.
    #[instrument(skip_all, fields(owner_id = %owner_id, id = %id))]
    pub fn update<S: LedgerStore>(
        &self,
        store: &mut S,
        owner_id: OwnerId,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> Result<Posted, LedgerEngineError> {
        let mut unit = store.begin();
        let mut transaction = owned_transaction(&unit, owner_id, id)?;

        // Revert must see the stored values, before the patch touches them.
        self.revert(&mut unit, &transaction)?;
        patch.apply_to(&mut transaction.details);
        let outcome = self.apply(&mut unit, &transaction)?;

        unit.save_transaction(transaction.clone())?;
        unit.commit()?;

        info!(%transaction, "transaction updated");
        Ok(Posted { transaction, outcome })
    }

    /// Reverts and removes the stored transaction in a single unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerEngineError::TransactionNotFound`] if `owner_id` has no transaction `id`,
    /// otherwise see [`LedgerEngine::revert`]. On error the stored state is unchanged.
    #[instrument(skip_all, fields(owner_id = %owner_id, id = %id))]
    pub fn delete<S: LedgerStore>(
        &self,
        store: &mut S,
        owner_id: OwnerId,
        id: TransactionId,
    ) -> Result<Posted, LedgerEngineError> {
        let mut unit = store.begin();
        let transaction = owned_transaction(&unit, owner_id, id)?;
        let outcome = self.revert(&mut unit, &transaction)?;
        unit.remove_transaction(id)?;
        unit.commit()?;

        info!(%transaction, "transaction deleted");
        Ok(Posted { transaction, outcome })
    }
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::new(ReferencePolicy::default())
    }
}

struct PostingPlan {
    outcome: PostingOutcome,
    postings: Vec<AppliedPosting>,
}

enum Resolution {
    NotApplicable,
    MissingReference,
    AccountNotFound(AccountId),
    Found(LedgerAccount),
}

fn plan_postings<U: UnitOfWork>(unit: &U, tx: &Transaction) -> Result<PostingPlan, LedgerEngineError> {
    let source = resolve(unit, tx, Side::Source)?;
    let destination = resolve(unit, tx, Side::Destination)?;

    let counterpart_missing = posting::is_all_or_nothing(tx.kind())
        && [&source, &destination]
            .iter()
            .any(|resolution| !matches!(resolution, Resolution::Found(_)));

    let mut postings = Vec::with_capacity(2);
    let mut plan_side = |side: Side, resolution: Resolution| match resolution {
        Resolution::NotApplicable => SideOutcome::NotApplicable,
        Resolution::MissingReference => SideOutcome::MissingReference,
        Resolution::AccountNotFound(account_id) => SideOutcome::AccountNotFound { account_id },
        Resolution::Found(account) if counterpart_missing => SideOutcome::CounterpartUnresolved {
            account_id: account.id(),
        },
        Resolution::Found(account) => match posting::posting_for(tx.kind(), side, account.kind()) {
            Some(posting) => {
                postings.push(AppliedPosting {
                    side,
                    account_id: account.id(),
                    posting,
                    amount: tx.amount(),
                });
                SideOutcome::Posted {
                    account_id: account.id(),
                    posting,
                }
            }
            None => SideOutcome::Unmodeled {
                account_id: account.id(),
                account_kind: account.kind(),
            },
        },
    };

    let outcome = PostingOutcome {
        source: plan_side(Side::Source, source),
        destination: plan_side(Side::Destination, destination),
    };

    Ok(PostingPlan { outcome, postings })
}

fn resolve<U: UnitOfWork>(unit: &U, tx: &Transaction, side: Side) -> Result<Resolution, LedgerEngineError> {
    if !posting::requires(tx.kind(), side) {
        return Ok(Resolution::NotApplicable);
    }
    let Some(account_id) = side.account_id(tx) else {
        return Ok(Resolution::MissingReference);
    };
    let Some(account) = unit.account(account_id)? else {
        return Ok(Resolution::AccountNotFound(account_id));
    };
    if account.owner_id() != tx.owner_id {
        return Err(LedgerEngineError::ForeignAccount {
            account_id,
            owner_id: tx.owner_id,
            tx_id: tx.id,
        });
    }
    Ok(Resolution::Found(account))
}

fn execute<U: UnitOfWork>(unit: &mut U, tx: &Transaction, postings: &[AppliedPosting]) -> Result<(), LedgerEngineError> {
    for &applied in postings {
        // Read again per posting: both sides of a transfer may be the same account.
        let mut account = unit
            .account(applied.account_id)?
            .ok_or(StoreError::AccountNotFound {
                id: applied.account_id,
            })?;
        applied.post(&mut account)?;
        debug!(%tx, %applied, %account, "posted");
        unit.save_account(account)?;
    }
    Ok(())
}

fn reverted_side(tx: &Transaction, reverted: &[AppliedPosting], side: Side) -> SideOutcome {
    if let Some(applied) = reverted.iter().find(|applied| applied.side == side) {
        return SideOutcome::Posted {
            account_id: applied.account_id,
            posting: applied.posting,
        };
    }
    if posting::requires(tx.kind(), side) {
        SideOutcome::NotPosted
    } else {
        SideOutcome::NotApplicable
    }
}

fn owned_transaction<U: UnitOfWork>(
    unit: &U,
    owner_id: OwnerId,
    id: TransactionId,
) -> Result<Transaction, LedgerEngineError> {
    unit.transaction(id)?
        .filter(|tx| tx.owner_id == owner_id)
        .ok_or(LedgerEngineError::TransactionNotFound { id, owner_id })
}

#[derive(thiserror::Error, Debug)]
pub enum LedgerEngineError {
    #[error("transaction not found id={id} owner_id={owner_id}")]
    TransactionNotFound { id: TransactionId, owner_id: OwnerId },
    #[error("account_id={account_id} does not belong to owner_id={owner_id}, tx_id={tx_id}")]
    ForeignAccount {
        account_id: AccountId,
        owner_id: OwnerId,
        tx_id: TransactionId,
    },
    #[error("unresolved {side} reference tx_id={tx_id}, outcome={outcome}")]
    UnresolvedReference {
        tx_id: TransactionId,
        side: Side,
        outcome: SideOutcome,
    },
    #[error(transparent)]
    Account(#[from] LedgerAccountError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
