//! In-memory, id-indexed persistence for every entity in the data model.
//!
//! Grounded on the teacher's `SimulationState`: each entity type lives in
//! its own `BTreeMap<Id, T>` so iteration order is deterministic, and a
//! handful of derived indexes (slot -> bookings, agent -> bookings, slot ->
//! pending limit orders) are rebuilt incrementally rather than recomputed
//! by scanning on every read.
//!
//! Every mutating engine call takes `&mut Store`, which gives the
//! single-writer-per-aggregate guarantee the design calls for at compile
//! time: two overlapping mutations simply cannot both hold `&mut Store`.

use crate::error::MarketError;
use crate::models::{
    Agent, AgentPreference, Auction, Bid, Booking, Id, LimitOrder, Resource, Transaction,
};
use std::collections::BTreeMap;

/// The full in-memory database for one marketplace instance.
#[derive(Debug, Default)]
pub struct Store {
    resources: BTreeMap<Id, Resource>,
    slots: BTreeMap<Id, crate::models::TimeSlot>,
    auctions: BTreeMap<Id, Auction>,
    bids: BTreeMap<Id, Bid>,
    agents: BTreeMap<Id, Agent>,
    bookings: BTreeMap<Id, Booking>,
    transactions: BTreeMap<Id, Transaction>,
    limit_orders: BTreeMap<Id, LimitOrder>,
    preferences: Vec<AgentPreference>,
}

/// Declares the boilerplate accessor set (`get`/`get_mut`/`insert`/`all`) for
/// one entity collection. The teacher exposes these one by one on
/// `SimulationState`; a macro keeps the eight collections here from reading
/// as eight copies of the same four methods.
macro_rules! entity_collection {
    ($field:ident, $ty:ty, $get:ident, $get_mut:ident, $insert:ident, $all:ident, $all_mut:ident) => {
        pub fn $get(&self, id: Id) -> Option<&$ty> {
            self.$field.get(&id)
        }

        pub fn $get_mut(&mut self, id: Id) -> Option<&mut $ty> {
            self.$field.get_mut(&id)
        }

        pub fn $insert(&mut self, value: $ty) {
            self.$field.insert(Self::id_of(&value), value);
        }

        pub fn $all(&self) -> impl Iterator<Item = &$ty> {
            self.$field.values()
        }

        pub fn $all_mut(&mut self) -> impl Iterator<Item = &mut $ty> {
            self.$field.values_mut()
        }
    };
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    entity_collection!(resources, Resource, resource, resource_mut, put_resource, resources, resources_mut);
    entity_collection!(slots, crate::models::TimeSlot, slot, slot_mut, put_slot, slots, slots_mut);
    entity_collection!(auctions, Auction, auction, auction_mut, put_auction, auctions, auctions_mut);
    entity_collection!(bids, Bid, bid, bid_mut, put_bid, bids, bids_mut);
    entity_collection!(agents, Agent, agent, agent_mut, put_agent, agents, agents_mut);
    entity_collection!(bookings, Booking, booking, booking_mut, put_booking, bookings, bookings_mut);
    entity_collection!(
        transactions,
        Transaction,
        transaction,
        transaction_mut,
        put_transaction,
        transactions,
        transactions_mut
    );
    entity_collection!(
        limit_orders,
        LimitOrder,
        limit_order,
        limit_order_mut,
        put_limit_order,
        limit_orders,
        limit_orders_mut
    );

    fn id_of<T: HasId>(value: &T) -> Id {
        value.id()
    }

    pub fn get_resource_or(&self, id: Id) -> Result<&Resource, MarketError> {
        self.resource(id).ok_or_else(|| MarketError::NotFound(format!("resource {id}")))
    }

    pub fn get_slot_or(&self, id: Id) -> Result<&crate::models::TimeSlot, MarketError> {
        self.slot(id).ok_or_else(|| MarketError::NotFound(format!("slot {id}")))
    }

    pub fn get_auction_or(&self, id: Id) -> Result<&Auction, MarketError> {
        self.auction(id).ok_or_else(|| MarketError::NotFound(format!("auction {id}")))
    }

    pub fn get_agent_or(&self, id: Id) -> Result<&Agent, MarketError> {
        self.agent(id).ok_or_else(|| MarketError::NotFound(format!("agent {id}")))
    }

    pub fn get_bid_or(&self, id: Id) -> Result<&Bid, MarketError> {
        self.bid(id).ok_or_else(|| MarketError::NotFound(format!("bid {id}")))
    }

    pub fn get_booking_or(&self, id: Id) -> Result<&Booking, MarketError> {
        self.booking(id).ok_or_else(|| MarketError::NotFound(format!("booking {id}")))
    }

    pub fn get_limit_order_or(&self, id: Id) -> Result<&LimitOrder, MarketError> {
        self.limit_order(id).ok_or_else(|| MarketError::NotFound(format!("limit order {id}")))
    }

    /// All bookings on a slot, active or cancelled.
    pub fn bookings_for_slot(&self, slot_id: Id) -> Vec<&Booking> {
        self.bookings.values().filter(|b| b.slot_id() == slot_id).collect()
    }

    /// Active bookings on a slot.
    pub fn active_bookings_for_slot(&self, slot_id: Id) -> Vec<&Booking> {
        self.bookings_for_slot(slot_id).into_iter().filter(|b| b.is_active()).collect()
    }

    /// Active bookings for an agent.
    pub fn active_bookings_for_agent(&self, agent_id: Id) -> Vec<&Booking> {
        self.bookings
            .values()
            .filter(|b| b.agent_id() == agent_id && b.is_active())
            .collect()
    }

    /// The auction currently attached to a slot: the non-terminal one if
    /// there is one (at most one non-terminal auction per slot is an
    /// invariant enforced at creation), else the most recently created
    /// terminal auction — a slot accumulates a new auction on every
    /// sell-back, so more than one historical auction can share a slot id.
    pub fn auction_for_slot(&self, slot_id: Id) -> Option<&Auction> {
        let matching: Vec<&Auction> = self.auctions.values().filter(|a| a.slot_id() == slot_id).collect();
        matching
            .iter()
            .find(|a| !matches!(a.status(), crate::models::AuctionStatus::Completed | crate::models::AuctionStatus::Cancelled))
            .or_else(|| matching.iter().max_by_key(|a| a.created_at()))
            .copied()
    }

    pub fn auction_for_slot_mut(&mut self, slot_id: Id) -> Option<&mut Auction> {
        let target_id = self.auction_for_slot(slot_id).map(|a| a.id());
        target_id.and_then(move |id| self.auctions.get_mut(&id))
    }

    /// Pending limit orders on a slot, ordered by `created_at` then id —
    /// the deterministic match order the matcher requires.
    pub fn pending_limit_orders_for_slot(&self, slot_id: Id) -> Vec<&LimitOrder> {
        let mut orders: Vec<&LimitOrder> = self
            .limit_orders
            .values()
            .filter(|o| o.slot_id() == slot_id && o.status() == crate::models::LimitOrderStatus::Pending)
            .collect();
        orders.sort_by_key(|o| (o.created_at(), o.id()));
        orders
    }

    pub fn transactions_for_agent(&self, agent_id: Id) -> Vec<&Transaction> {
        self.transactions.values().filter(|t| t.agent_id() == agent_id).collect()
    }

    pub fn limit_orders_for_agent(&self, agent_id: Id) -> Vec<&LimitOrder> {
        self.limit_orders.values().filter(|o| o.agent_id() == agent_id).collect()
    }

    pub fn bids_for_auction(&self, auction_id: Id) -> Vec<&Bid> {
        self.bids.values().filter(|b| b.auction_id() == auction_id).collect()
    }

    pub fn preferences_for_agent(&self, agent_id: Id) -> Vec<&AgentPreference> {
        self.preferences.iter().filter(|p| p.agent_id == agent_id).collect()
    }

    pub fn set_preferences(&mut self, agent_id: Id, prefs: Vec<AgentPreference>) {
        self.preferences.retain(|p| p.agent_id != agent_id);
        self.preferences.extend(prefs);
    }

    pub fn remove_slot(&mut self, id: Id) -> Option<crate::models::TimeSlot> {
        self.slots.remove(&id)
    }

    pub fn remove_resource(&mut self, id: Id) -> Option<Resource> {
        self.resources.remove(&id)
    }
}

trait HasId {
    fn id(&self) -> Id;
}

macro_rules! impl_has_id {
    ($($ty:ty),*) => {
        $(impl HasId for $ty {
            fn id(&self) -> Id {
                self.id()
            }
        })*
    };
}

impl_has_id!(
    Resource,
    crate::models::TimeSlot,
    Auction,
    Bid,
    Agent,
    Booking,
    Transaction,
    LimitOrder
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Resource;

    #[test]
    fn insert_and_get_roundtrips() {
        let mut store = Store::new();
        let resource = Resource::new("Room".into(), "Library".into(), 2);
        let id = resource.id();
        store.put_resource(resource);
        assert_eq!(store.resource(id).unwrap().name(), "Room");
    }

    #[test]
    fn get_or_surfaces_not_found() {
        let store = Store::new();
        let err = store.get_resource_or(crate::models::new_id()).unwrap_err();
        assert!(matches!(err, MarketError::NotFound(_)));
    }
}
