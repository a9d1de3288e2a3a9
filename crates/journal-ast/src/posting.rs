use crate::{AccountName, Amount, BalanceAssertion, Cost, Tag, transaction::Status};
use journal_position::Range;
use serde::{Deserialize, Serialize};

/// How a posting participates in balancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VirtualKind {
    /// Ordinary posting
    #[default]
    None,
    /// `[account]` — virtual, but must balance
    Balanced,
    /// `(account)` — virtual, excluded from balancing
    Unbalanced,
}

/// One debit-or-credit line within a transaction.
///
/// A posting with no amount is *inferred*: its value is implied by the
/// remainder of the transaction. The balance checker permits at most one
/// inferred posting per transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub status: Status,
    pub account: AccountName,
    pub amount: Option<Amount>,
    pub cost: Option<Cost>,
    pub assertion: Option<BalanceAssertion>,
    pub virtual_kind: VirtualKind,
    /// Inline comment text, `;` stripped
    pub comment: Option<String>,
    /// Tags extracted from the inline comment
    pub tags: Vec<Tag>,
    pub range: Range,
}

impl Posting {
    /// A minimal posting on `account` with everything else defaulted.
    pub fn new(account: impl Into<AccountName>) -> Self {
        Self {
            status: Status::None,
            account: account.into(),
            amount: None,
            cost: None,
            assertion: None,
            virtual_kind: VirtualKind::None,
            comment: None,
            tags: Vec::new(),
            range: Range::default(),
        }
    }

    /// True when this posting counts toward the transaction balance.
    pub fn is_real(&self) -> bool {
        matches!(self.virtual_kind, VirtualKind::None | VirtualKind::Balanced)
    }

    /// True when the amount is omitted and must be inferred.
    pub fn is_inferred(&self) -> bool {
        self.amount.is_none()
    }
}
