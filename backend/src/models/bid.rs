//! Bid model: a solo or group offer on an active auction.

use super::Id;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a [`Bid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
}

/// One member's contribution to a group bid. `Σ contributions == bid.amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupBidMember {
    pub agent_id: Id,
    pub contribution: i64,
}

/// An offer placed against one [`crate::models::Auction`] by one agent (solo)
/// or several (group).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    id: Id,
    auction_id: Id,
    agent_id: Id,
    amount: i64,
    is_group: bool,
    group_members: Vec<GroupBidMember>,
    split_partner: Option<Id>,
    status: BidStatus,
    placed_at: i64,
}

impl Bid {
    /// Build a solo bid in `PENDING` status.
    ///
    /// # Panics
    /// Panics if `amount <= 0`.
    pub fn solo(auction_id: Id, agent_id: Id, amount: i64, now: i64) -> Self {
        assert!(amount > 0, "bid amount must be positive");
        Self {
            id: super::new_id(),
            auction_id,
            agent_id,
            amount,
            is_group: false,
            group_members: Vec::new(),
            split_partner: None,
            status: BidStatus::Pending,
            placed_at: now,
        }
    }

    /// Build a group bid in `PENDING` status. `agent_id` is the nominal
    /// leader (used for identity/reference purposes); settlement still
    /// creates one booking per group member per the capacity model.
    ///
    /// # Panics
    /// Panics if `members` is empty, any contribution is negative, or the
    /// contributions do not sum to `amount`.
    pub fn group(auction_id: Id, agent_id: Id, members: Vec<GroupBidMember>, now: i64) -> Self {
        assert!(!members.is_empty(), "group bid needs at least one member");
        assert!(
            members.iter().all(|m| m.contribution >= 0),
            "contributions must be non-negative"
        );
        let amount: i64 = members.iter().map(|m| m.contribution).sum();
        assert!(amount > 0, "group bid total must be positive");
        Self {
            id: super::new_id(),
            auction_id,
            agent_id,
            amount,
            is_group: true,
            group_members: members,
            split_partner: None,
            status: BidStatus::Pending,
            placed_at: now,
        }
    }

    /// Attach a split partner before submission (see [`crate::booking`]).
    pub fn with_split_partner(mut self, partner: Id) -> Self {
        self.split_partner = Some(partner);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn auction_id(&self) -> Id {
        self.auction_id
    }

    pub fn agent_id(&self) -> Id {
        self.agent_id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn is_group(&self) -> bool {
        self.is_group
    }

    pub fn group_members(&self) -> &[GroupBidMember] {
        &self.group_members
    }

    pub fn split_partner(&self) -> Option<Id> {
        self.split_partner
    }

    pub fn status(&self) -> BidStatus {
        self.status
    }

    pub fn set_status(&mut self, status: BidStatus) {
        self.status = status;
    }

    pub fn placed_at(&self) -> i64 {
        self.placed_at
    }

    /// Every participant who must be debited / booked for this bid: the sole
    /// bidder, or every group member.
    pub fn participants(&self) -> Vec<Id> {
        if self.is_group {
            self.group_members.iter().map(|m| m.agent_id).collect()
        } else {
            vec![self.agent_id]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "bid amount must be positive")]
    fn solo_rejects_nonpositive_amount() {
        Bid::solo(super::super::new_id(), super::super::new_id(), 0, 0);
    }

    #[test]
    fn group_amount_is_sum_of_contributions() {
        let a = super::super::new_id();
        let b = super::super::new_id();
        let bid = Bid::group(
            super::super::new_id(),
            a,
            vec![
                GroupBidMember { agent_id: a, contribution: 30 },
                GroupBidMember { agent_id: b, contribution: 40 },
            ],
            0,
        );
        assert_eq!(bid.amount(), 70);
        assert_eq!(bid.participants(), vec![a, b]);
    }
}
