//! Limit-order matcher: executes standing buy orders when an auction's
//! descending price crosses the order's threshold.
//!
//! Grounded on the teacher's FIFO settlement-queue draining pattern (drain
//! in a deterministic order, stop at the first hard failure that isn't a
//! per-item rejection), adapted here to a per-slot scan that tolerates
//! individual order failures by expiring them and moving on.

use crate::auction;
use crate::error::MarketResult;
use crate::models::{AuctionStatus, Bid, Id, LimitOrderStatus};
use crate::store::Store;
use tracing::{debug, instrument};

/// Scan `slot_id`'s PENDING limit orders, ascending `(created_at, id)`, and
/// execute the first whose `max_price` is at or above the slot's auction's
/// current price and whose agent can afford it. At most one order executes
/// per call, since a successful match completes the auction. Orders that
/// fail settlement (capacity, overlap, duplicate, insufficient funds) are
/// marked EXPIRED with a reason and the scan continues to the next order.
#[instrument(skip(store))]
pub fn match_slot(store: &mut Store, slot_id: Id, now: i64) -> MarketResult<()> {
    let auction_id = match store.auction_for_slot(slot_id) {
        Some(a) if a.status() == AuctionStatus::Active => a.id(),
        _ => return Ok(()),
    };

    let order_ids: Vec<Id> = store.pending_limit_orders_for_slot(slot_id).into_iter().map(|o| o.id()).collect();

    for order_id in order_ids {
        let auction = match store.auction(auction_id) {
            Some(a) if a.status() == AuctionStatus::Active => a,
            _ => break,
        };
        let current_price = auction.current_price();

        let order = match store.limit_order(order_id) {
            Some(o) if o.status() == LimitOrderStatus::Pending => o,
            _ => continue,
        };
        if order.max_price() < current_price {
            continue;
        }
        let agent_id = order.agent_id();
        let amount = current_price.ceil() as i64;

        let bid = Bid::solo(auction_id, agent_id, amount.max(1), now);
        let bid_id = bid.id();
        match auction::admit_bid(store, bid, now) {
            Ok(_) => {
                debug!(%order_id, %bid_id, "limit order executed");
                if let Some(order) = store.limit_order_mut(order_id) {
                    order.mark_executed(bid_id);
                }
            }
            Err(err) => {
                debug!(%order_id, error = %err, "limit order expired");
                if let Some(order) = store.limit_order_mut(order_id) {
                    order.mark_expired(err.to_string());
                }
            }
        }
    }
    Ok(())
}
