//! Transaction model: one append-only ledger row.

use super::Id;
use serde::{Deserialize, Serialize};

/// The reason a ledger row was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// A debit for winning a solo or group bid.
    BidPayment,
    /// A credit from periodic token allocation.
    TokenAllocation,
    /// An 80% refund on sell-back.
    SellBackRefund,
    /// A 50% transfer from a split partner to the booking owner.
    SplitPayment,
    /// The owner's corresponding credit for a split payment.
    SplitReimbursement,
}

/// One append-only row in an agent's ledger.
///
/// `Σ Transaction.amount for agent == balance − initial_seed` is kept true
/// by construction: every balance mutation in [`crate::ledger`] appends
/// exactly one row in the same call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    id: Id,
    agent_id: Id,
    amount: i64,
    kind: TransactionKind,
    reference: Id,
    at: i64,
}

impl Transaction {
    pub fn new(agent_id: Id, amount: i64, kind: TransactionKind, reference: Id, at: i64) -> Self {
        Self { id: super::new_id(), agent_id, amount, kind, reference, at }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn agent_id(&self) -> Id {
        self.agent_id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn reference(&self) -> Id {
        self.reference
    }

    pub fn at(&self) -> i64 {
        self.at
    }
}
