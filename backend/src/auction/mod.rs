//! Auction engine: the Dutch descending-price state machine.
//!
//! Grounded on the teacher's settlement pipeline shape (validate, mutate,
//! ledger, emit) but the state machine itself (PENDING/ACTIVE/COMPLETED/
//! CANCELLED, tick-down-then-rebound) is new: the teacher has no auction.
//! `auction_type` is kept as a string tag on the model for forward schema
//! compatibility, but dispatch here is a single exhaustive match — there is
//! only ever the one `"dutch"` variant today (§9 design note).

use crate::booking;
use crate::error::{MarketError, MarketResult};
use crate::matcher;
use crate::models::{Auction, AuctionParams, AuctionStatus, Bid, GroupBidMember, Id, SlotStatus, TransactionKind};
use crate::store::Store;
use tracing::{instrument, warn};

/// Create a PENDING auction on `slot_id`. Fails if the slot is not
/// AVAILABLE or already carries a non-terminal auction.
#[instrument(skip(store, params))]
pub fn create(store: &mut Store, slot_id: Id, now: i64, params: AuctionParams) -> MarketResult<Id> {
    let slot = store.get_slot_or(slot_id)?;
    if slot.status() != SlotStatus::Available {
        return Err(MarketError::StateInvalid(format!("slot {slot_id} is not AVAILABLE")));
    }
    if let Some(existing) = store.auction_for_slot(slot_id) {
        if !matches!(existing.status(), AuctionStatus::Completed | AuctionStatus::Cancelled) {
            return Err(MarketError::StateInvalid(format!("slot {slot_id} already has an open auction")));
        }
    }
    let auction = Auction::new(slot_id, now, params);
    let auction_id = auction.id();
    store.put_auction(auction);
    Ok(auction_id)
}

/// PENDING -> ACTIVE. Marks the slot IN_AUCTION and stamps the first price
/// history sample.
#[instrument(skip(store))]
pub fn start(store: &mut Store, auction_id: Id, now: i64) -> MarketResult<()> {
    let slot_id = {
        let auction = store.get_auction_or(auction_id)?;
        if auction.status() != AuctionStatus::Pending {
            return Err(MarketError::StateInvalid(format!("auction {auction_id} is not PENDING")));
        }
        auction.slot_id()
    };
    store.auction_mut(auction_id).expect("checked above").mark_started(now);
    if let Some(slot) = store.slot_mut(slot_id) {
        slot.set_status(SlotStatus::InAuction);
    }
    Ok(())
}

/// Drop the price by one step (floored at `min_price`), or rebound upward
/// once at the floor, append a price sample, then run the limit-order
/// matcher for this slot.
#[instrument(skip(store))]
pub fn tick(store: &mut Store, auction_id: Id, now: i64) -> MarketResult<()> {
    let slot_id = {
        let auction = store.get_auction_or(auction_id)?;
        if auction.status() != AuctionStatus::Active {
            return Err(MarketError::StateInvalid(format!("auction {auction_id} is not ACTIVE")));
        }
        auction.slot_id()
    };

    {
        let auction = store.auction_mut(auction_id).expect("checked above");
        let next_price = if auction.current_price() > auction.min_price() {
            (auction.current_price() - auction.price_step()).max(auction.min_price())
        } else {
            auction.current_price() + auction.price_step()
        };
        auction.set_current_price(next_price);
        auction.push_price_point(now);
    }

    matcher::match_slot(store, slot_id, now)?;
    Ok(())
}

/// Whether `auction_id`'s next scheduled tick is due at `now`.
pub fn tick_due(store: &Store, auction_id: Id, now: i64) -> MarketResult<bool> {
    Ok(store.get_auction_or(auction_id)?.tick_due(now))
}

/// Place a solo bid. Succeeds only if `amount >= current_price` and the
/// agent can afford it; debits the agent, writes an ACCEPTED `Bid`, and
/// settles it into a booking. Any settlement rejection rolls the whole
/// transaction back and the bid is never recorded.
#[instrument(skip(store))]
pub fn place_bid(store: &mut Store, auction_id: Id, agent_id: Id, amount: i64, now: i64) -> MarketResult<Id> {
    let bid = Bid::solo(auction_id, agent_id, amount, now);
    let bid_id = admit_bid(store, bid, now)?;
    let slot_id = store.get_auction_or(auction_id)?.slot_id();
    matcher::match_slot(store, slot_id, now)?;
    Ok(bid_id)
}

/// Place a group bid. `members` must sum to `amount`; see
/// [`crate::models::Bid::group`] for the exact validation performed.
#[instrument(skip(store, members))]
pub fn place_group_bid(
    store: &mut Store,
    auction_id: Id,
    leader_id: Id,
    members: Vec<GroupBidMember>,
    now: i64,
) -> MarketResult<Id> {
    let bid = Bid::group(auction_id, leader_id, members, now);
    let bid_id = admit_bid(store, bid, now)?;
    let slot_id = store.get_auction_or(auction_id)?.slot_id();
    matcher::match_slot(store, slot_id, now)?;
    Ok(bid_id)
}

/// Shared bid-admission path for solo and group bids: validate against the
/// current price and every participant's balance, debit everyone in one
/// pass, then hand off to settlement. On any failure the debits performed
/// so far are refunded so partial state never survives a rejected bid.
///
/// `pub(crate)` so [`crate::matcher`] can synthesize a bid for a crossed
/// limit order without going back through the public entry points (which
/// also trigger a matcher pass, and a completed auction has no more bids to
/// match against anyway).
pub(crate) fn admit_bid(store: &mut Store, bid: Bid, now: i64) -> MarketResult<Id> {
    let auction_id = bid.auction_id();
    let auction = store.get_auction_or(auction_id)?;
    if auction.status() != AuctionStatus::Active {
        return Err(MarketError::StateInvalid(format!("auction {auction_id} is not ACTIVE")));
    }
    let current_price = auction.current_price();
    if (bid.amount() as f64) < current_price {
        return Err(MarketError::Validation(format!(
            "bid amount {} is below current price {current_price}",
            bid.amount()
        )));
    }

    let debits: Vec<(Id, i64)> = if bid.is_group() {
        bid.group_members().iter().map(|m| (m.agent_id, m.contribution)).collect()
    } else {
        vec![(bid.agent_id(), bid.amount())]
    };

    let bid_id = bid.id();
    let mut debited: Vec<(Id, i64)> = Vec::with_capacity(debits.len());
    for (agent_id, share) in &debits {
        match crate::ledger::debit(store, *agent_id, *share, TransactionKind::BidPayment, bid_id, now) {
            Ok(()) => debited.push((*agent_id, *share)),
            Err(err) => {
                rollback_debits(store, &debited, bid_id, now);
                return Err(err);
            }
        }
    }

    let mut bid = bid;
    bid.set_status(crate::models::BidStatus::Accepted);
    store.put_bid(bid);

    match booking::settle(store, bid_id, now) {
        Ok(()) => Ok(bid_id),
        Err(err) => {
            warn!(%bid_id, error = %err, "settlement rejected, rolling back bid");
            rollback_debits(store, &debited, bid_id, now);
            if let Some(bid) = store.bid_mut(bid_id) {
                bid.set_status(crate::models::BidStatus::Rejected);
            }
            Err(err)
        }
    }
}

fn rollback_debits(store: &mut Store, debited: &[(Id, i64)], bid_id: Id, now: i64) {
    for (agent_id, share) in debited {
        let _ = crate::ledger::credit(store, *agent_id, *share, TransactionKind::BidPayment, bid_id, now);
    }
}

/// Transition the auction owning an ACCEPTED bid to COMPLETED. Called by
/// the booking service after a successful settlement; exposed here too for
/// callers that settle out of band.
pub(crate) fn resolve(store: &mut Store, auction_id: Id, now: i64) -> MarketResult<()> {
    let auction = store.auction_mut(auction_id).ok_or_else(|| MarketError::NotFound(format!("auction {auction_id}")))?;
    auction.mark_ended(now);
    Ok(())
}
