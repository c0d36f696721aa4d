//! Booking model: one confirmed seat on a slot for one agent.

use super::Id;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a [`Booking`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Active,
    Cancelled,
}

/// Status of an optional split-payment arrangement on a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitStatus {
    /// No split was requested for this booking.
    None,
    /// A split partner was named; awaiting their decision.
    Pending,
    /// The partner paid their half.
    Accepted,
    /// The partner declined; the original booking stands unreversed.
    Rejected,
}

/// One (agent, slot) seat created by [`crate::booking::settle`].
///
/// Immutable after creation except through the sell-back cancellation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    id: Id,
    slot_id: Id,
    agent_id: Id,
    bid_id: Id,
    status: BookingStatus,
    split_partner: Option<Id>,
    split_status: SplitStatus,
    created_at: i64,
}

impl Booking {
    pub fn new(slot_id: Id, agent_id: Id, bid_id: Id, split_partner: Option<Id>, now: i64) -> Self {
        let split_status = if split_partner.is_some() {
            SplitStatus::Pending
        } else {
            SplitStatus::None
        };
        Self {
            id: super::new_id(),
            slot_id,
            agent_id,
            bid_id,
            status: BookingStatus::Active,
            split_partner,
            split_status,
            created_at: now,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn slot_id(&self) -> Id {
        self.slot_id
    }

    pub fn agent_id(&self) -> Id {
        self.agent_id
    }

    pub fn bid_id(&self) -> Id {
        self.bid_id
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    pub fn set_status(&mut self, status: BookingStatus) {
        self.status = status;
    }

    pub fn split_partner(&self) -> Option<Id> {
        self.split_partner
    }

    pub fn split_status(&self) -> SplitStatus {
        self.split_status
    }

    pub fn set_split_status(&mut self, status: SplitStatus) {
        self.split_status = status;
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Active
    }
}
