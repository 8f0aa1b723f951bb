use crate::account::AccountKind;
use crate::engine::posting::Posting;
use crate::engine::posting::Side;
use crate::transaction::AccountId;
use crate::transaction::Transaction;

/// What applying or reverting a transaction did to each of its sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingOutcome {
    pub source: SideOutcome,
    pub destination: SideOutcome,
}

impl PostingOutcome {
    pub const fn side(&self, side: Side) -> SideOutcome {
        match side {
            Side::Source => self.source,
            Side::Destination => self.destination,
        }
    }

    /// Sides the transaction routes money through that were left untouched.
    pub fn skipped(&self) -> impl Iterator<Item = (Side, SideOutcome)> {
        [(Side::Source, self.source), (Side::Destination, self.destination)]
            .into_iter()
            .filter(|(_, outcome)| outcome.is_skipped())
    }

    pub fn is_complete(&self) -> bool {
        self.skipped().next().is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, parse_display::Display)]
pub enum SideOutcome {
    #[display("{posting} on account_id={account_id}")]
    Posted { account_id: AccountId, posting: Posting },
    /// The transaction kind does not route money through this side.
    #[display("not applicable")]
    NotApplicable,
    #[display("missing reference")]
    MissingReference,
    #[display("account not found account_id={account_id}")]
    AccountNotFound { account_id: AccountId },
    /// The account resolved but the other side of a transfer did not.
    #[display("counterpart unresolved account_id={account_id}")]
    CounterpartUnresolved { account_id: AccountId },
    #[display("unmodeled for {account_kind} account_id={account_id}")]
    Unmodeled {
        account_id: AccountId,
        account_kind: AccountKind,
    },
    /// Reverting found nothing recorded for this side.
    #[display("not posted")]
    NotPosted,
}

impl SideOutcome {
    pub const fn is_skipped(&self) -> bool {
        !matches!(self, Self::Posted { .. } | Self::NotApplicable)
    }
}

/// A stored transaction together with the outcome of the posting that went with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posted {
    pub transaction: Transaction,
    pub outcome: PostingOutcome,
}
