//! Domain types.
//!
//! Every entity carries a stable [`Id`] so the [`crate::store::Store`] can
//! index it in a `BTreeMap` and iterate deterministically. Ownership between
//! entities (a slot owns its auctions, an auction owns its bids, ...) is
//! expressed through id fields, never back-pointers: the store is the
//! arena, ids are the only cross-references.

pub mod agent;
pub mod auction;
pub mod bid;
pub mod booking;
pub mod config;
pub mod limit_order;
pub mod resource;
pub mod slot;
pub mod transaction;

pub use agent::{Agent, AgentPreference, PreferenceType};
pub use auction::{Auction, AuctionParams, AuctionStatus, PricePoint};
pub use bid::{Bid, BidStatus, GroupBidMember};
pub use booking::{Booking, BookingStatus, SplitStatus};
pub use config::AdminConfig;
pub use limit_order::{LimitOrder, LimitOrderStatus};
pub use resource::Resource;
pub use slot::{SlotStatus, TimeSlot};
pub use transaction::{Transaction, TransactionKind};

/// Stable entity identifier.
pub type Id = uuid::Uuid;

/// Allocate a fresh, random entity id.
pub fn new_id() -> Id {
    uuid::Uuid::new_v4()
}
