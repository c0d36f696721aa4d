//! Auction model: a Dutch auction attached to one TimeSlot.

use super::Id;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an [`Auction`].
///
/// State machine: `Pending -> Active -> (Completed | Cancelled)`, with no
/// reverse edges. Sell-back reopens a slot by creating a *fresh* `Active`
/// auction rather than resurrecting a `Completed` one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
}

/// One sample in an auction's price history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub at: i64,
    pub price: f64,
}

/// A Dutch auction: price descends every tick until `min_price`, then
/// rebounds upward (a scarcity signal) until a bid clears it.
///
/// `auction_type` is currently always `"dutch"` — a closed tag kept as a
/// string so a future auction kind can be added without a schema break,
/// but dispatch (see [`crate::auction`]) is an exhaustive match, not
/// string-keyed virtual dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    id: Id,
    slot_id: Id,
    auction_type: String,
    status: AuctionStatus,
    start_price: f64,
    min_price: f64,
    current_price: f64,
    price_step: f64,
    tick_interval: i64,
    created_at: i64,
    started_at: Option<i64>,
    ended_at: Option<i64>,
    price_history: Vec<PricePoint>,
}

/// Parameters needed to create a new [`Auction`].
#[derive(Debug, Clone, Copy)]
pub struct AuctionParams {
    pub start_price: f64,
    pub min_price: f64,
    pub price_step: f64,
    pub tick_interval: i64,
}

impl Auction {
    /// Create a new `PENDING` auction. Callers validate slot eligibility
    /// (AVAILABLE, no existing non-terminal auction) before calling this —
    /// see [`crate::auction::AuctionEngine::create`].
    ///
    /// # Panics
    /// Panics if `min_price > start_price`, `price_step <= 0`, or
    /// `tick_interval <= 0`.
    pub fn new(slot_id: Id, now: i64, params: AuctionParams) -> Self {
        assert!(
            params.min_price <= params.start_price,
            "min_price must not exceed start_price"
        );
        assert!(params.min_price >= 0.0, "min_price must be non-negative");
        assert!(params.price_step > 0.0, "price_step must be positive");
        assert!(params.tick_interval > 0, "tick_interval must be positive");
        Self {
            id: super::new_id(),
            slot_id,
            auction_type: "dutch".to_string(),
            status: AuctionStatus::Pending,
            start_price: params.start_price,
            min_price: params.min_price,
            current_price: params.start_price,
            price_step: params.price_step,
            tick_interval: params.tick_interval,
            created_at: now,
            started_at: None,
            ended_at: None,
            price_history: Vec::new(),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn slot_id(&self) -> Id {
        self.slot_id
    }

    pub fn auction_type(&self) -> &str {
        &self.auction_type
    }

    pub fn status(&self) -> AuctionStatus {
        self.status
    }

    pub fn set_status(&mut self, status: AuctionStatus) {
        self.status = status;
    }

    pub fn start_price(&self) -> f64 {
        self.start_price
    }

    pub fn min_price(&self) -> f64 {
        self.min_price
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    pub fn set_current_price(&mut self, price: f64) {
        self.current_price = price;
    }

    pub fn price_step(&self) -> f64 {
        self.price_step
    }

    pub fn tick_interval(&self) -> i64 {
        self.tick_interval
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn started_at(&self) -> Option<i64> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<i64> {
        self.ended_at
    }

    pub fn price_history(&self) -> &[PricePoint] {
        &self.price_history
    }

    /// Update the pricing engine's view of this auction's price band without
    /// touching its current runtime state (used by `reprice` on non-ACTIVE
    /// auctions; ACTIVE auctions keep their own clearing trajectory).
    pub fn reprice(&mut self, start_price: f64, min_price: f64, current_price: f64) {
        self.start_price = start_price;
        self.min_price = min_price;
        self.current_price = current_price;
    }

    pub(crate) fn mark_started(&mut self, now: i64) {
        self.status = AuctionStatus::Active;
        self.started_at = Some(now);
        self.push_price_point(now);
    }

    pub(crate) fn mark_ended(&mut self, now: i64) {
        self.status = AuctionStatus::Completed;
        self.ended_at = Some(now);
    }

    pub(crate) fn push_price_point(&mut self, at: i64) {
        self.price_history.push(PricePoint {
            at,
            price: self.current_price,
        });
    }

    /// The price the auction last cleared at, i.e. the final price-history
    /// sample. `None` until at least one tick/start has been recorded.
    pub fn clearing_price(&self) -> Option<f64> {
        self.price_history.last().map(|p| p.price)
    }

    /// Whether `now` is at or past the next scheduled tick, i.e. at least
    /// `tick_interval` seconds have elapsed since the last price sample.
    pub fn tick_due(&self, now: i64) -> bool {
        self.started_at.is_some() && now - self.last_sample_at() >= self.tick_interval
    }

    fn last_sample_at(&self) -> i64 {
        self.price_history.last().map(|p| p.at).unwrap_or(self.created_at)
    }
}
