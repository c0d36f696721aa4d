//! LimitOrder model: a standing buy order that fires when price crosses it.

use super::Id;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a [`LimitOrder`]. `Pending` is the only non-terminal
/// state; `Executed`/`Cancelled`/`Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitOrderStatus {
    Pending,
    Executed,
    Cancelled,
    Expired,
}

/// A standing order to buy a slot once its auction's current price falls to
/// or below `max_price`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitOrder {
    id: Id,
    agent_id: Id,
    slot_id: Id,
    max_price: f64,
    status: LimitOrderStatus,
    winning_bid_id: Option<Id>,
    expire_reason: Option<String>,
    created_at: i64,
}

impl LimitOrder {
    /// # Panics
    /// Panics if `max_price <= 0`.
    pub fn new(agent_id: Id, slot_id: Id, max_price: f64, now: i64) -> Self {
        assert!(max_price > 0.0, "max_price must be positive");
        Self {
            id: super::new_id(),
            agent_id,
            slot_id,
            max_price,
            status: LimitOrderStatus::Pending,
            winning_bid_id: None,
            expire_reason: None,
            created_at: now,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn agent_id(&self) -> Id {
        self.agent_id
    }

    pub fn slot_id(&self) -> Id {
        self.slot_id
    }

    pub fn max_price(&self) -> f64 {
        self.max_price
    }

    pub fn status(&self) -> LimitOrderStatus {
        self.status
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn winning_bid_id(&self) -> Option<Id> {
        self.winning_bid_id
    }

    pub fn expire_reason(&self) -> Option<&str> {
        self.expire_reason.as_deref()
    }

    pub(crate) fn mark_executed(&mut self, bid_id: Id) {
        self.status = LimitOrderStatus::Executed;
        self.winning_bid_id = Some(bid_id);
    }

    pub(crate) fn mark_expired(&mut self, reason: String) {
        self.status = LimitOrderStatus::Expired;
        self.expire_reason = Some(reason);
    }

    pub(crate) fn mark_cancelled(&mut self) {
        self.status = LimitOrderStatus::Cancelled;
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.status, LimitOrderStatus::Pending)
    }
}
