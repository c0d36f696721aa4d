//! Booking service: settles an ACCEPTED bid into one Booking per
//! participant, and implements sell-back and split-payment follow-on flows.
//!
//! Grounded on the teacher's `try_settle` atomic-transaction shape
//! (validate every precondition before mutating anything, roll back
//! cleanly on the first violation) generalized from a two-party transfer to
//! a multi-participant capacity/duplicate/overlap/quota check.

use crate::auction;
use crate::error::{MarketError, MarketResult};
use crate::ledger;
use crate::models::{Booking, BookingStatus, Id, SlotStatus, SplitStatus, TransactionKind};
use crate::store::Store;
use tracing::{instrument, warn};

/// Settle an ACCEPTED bid: validate duplicate/overlap/capacity/quota for
/// every participant, insert one Booking each, transition the slot, and
/// resolve the auction. Any violation rejects the whole settlement with no
/// state change — the caller (the auction engine) is responsible for
/// reversing the debits it already applied.
#[instrument(skip(store))]
pub fn settle(store: &mut Store, bid_id: Id, now: i64) -> MarketResult<()> {
    let bid = store.get_bid_or(bid_id)?.clone();
    let auction = store.get_auction_or(bid.auction_id())?.clone();
    let slot = store.get_slot_or(auction.slot_id())?.clone();
    let resource = store.get_resource_or(slot.resource_id())?.clone();

    let participants = bid.participants();
    let existing_bookings = store.active_bookings_for_slot(slot.id());

    let mut fresh_participants = Vec::with_capacity(participants.len());
    let mut seen = std::collections::HashSet::with_capacity(participants.len());
    for agent_id in &participants {
        let already_booked = existing_bookings.iter().any(|b| b.agent_id() == *agent_id);
        if !already_booked && seen.insert(*agent_id) {
            fresh_participants.push(*agent_id);
        }
    }

    for agent_id in &fresh_participants {
        let overlapping = store
            .active_bookings_for_agent(*agent_id)
            .into_iter()
            .any(|b| b.slot_id() != slot.id() && slot_starts_same_instant(store, b.slot_id(), slot.start()));
        if overlapping {
            return Err(MarketError::OverlapBooking(format!(
                "agent {agent_id} already has a booking starting at {}",
                slot.start()
            )));
        }
    }

    let total_after = existing_bookings.len() + fresh_participants.len();
    if total_after > resource.capacity() as usize {
        return Err(MarketError::CapacityExceeded(format!(
            "slot {} would exceed capacity {}",
            slot.id(),
            resource.capacity()
        )));
    }

    for agent_id in &fresh_participants {
        let agent = store.get_agent_or(*agent_id)?;
        let current_count = store.active_bookings_for_agent(*agent_id).len();
        if current_count + 1 > agent.max_bookings() as usize {
            return Err(MarketError::QuotaExceeded(format!(
                "agent {agent_id} would exceed max_bookings {}",
                agent.max_bookings()
            )));
        }
    }

    if fresh_participants.is_empty() && !participants.is_empty() {
        return Err(MarketError::DuplicateBooking(format!("bid {bid_id} has no new participants to book")));
    }

    for agent_id in &fresh_participants {
        let booking = Booking::new(slot.id(), *agent_id, bid_id, bid.split_partner(), now);
        store.put_booking(booking);
    }

    let total_bookings = store.active_bookings_for_slot(slot.id()).len();
    if total_bookings as u32 == resource.capacity() {
        if let Some(slot) = store.slot_mut(slot.id()) {
            slot.set_status(SlotStatus::Booked);
        }
    }

    auction::resolve(store, auction.id(), now)?;
    Ok(())
}

fn slot_starts_same_instant(store: &Store, slot_id: Id, start: i64) -> bool {
    store.slot(slot_id).map(|s| s.start() == start).unwrap_or(false)
}

/// Refund 80% of the winning bid amount to `owner`, cancel the booking, and
/// reopen the slot with a *fresh* ACTIVE auction at the last clearing price
/// (never resurrecting the COMPLETED one). Fails if `owner` does not own
/// the booking.
#[instrument(skip(store))]
pub fn sellback(store: &mut Store, booking_id: Id, owner_id: Id, now: i64) -> MarketResult<Id> {
    let booking = store.get_booking_or(booking_id)?.clone();
    if booking.agent_id() != owner_id {
        return Err(MarketError::StateInvalid(format!("agent {owner_id} does not own booking {booking_id}")));
    }
    if !booking.is_active() {
        return Ok(booking.bid_id());
    }

    let bid = store.get_bid_or(booking.bid_id())?.clone();
    let auction = store.get_auction_or(bid.auction_id())?.clone();
    let slot_id = booking.slot_id();

    let owner_amount = if bid.is_group() {
        bid.group_members()
            .iter()
            .find(|m| m.agent_id == owner_id)
            .map(|m| m.contribution)
            .unwrap_or(0)
    } else {
        bid.amount()
    };
    let refund = (owner_amount * 4) / 5;
    ledger::credit(store, owner_id, refund, TransactionKind::SellBackRefund, booking_id, now)?;

    store.booking_mut(booking_id).expect("checked above").set_status(BookingStatus::Cancelled);
    if let Some(slot) = store.slot_mut(slot_id) {
        slot.set_status(SlotStatus::InAuction);
    }

    // The slot was just set IN_AUCTION above, so the normal `auction::create`
    // (which requires AVAILABLE) doesn't apply here — sell-back is the one
    // path that reopens a slot without going through the catalogue/pricing
    // flow, so the fresh auction is built and started directly.
    let clearing = auction.clearing_price().unwrap_or(auction.current_price());
    let mut new_auction = crate::models::Auction::new(
        slot_id,
        now,
        crate::models::AuctionParams {
            start_price: clearing,
            min_price: auction.min_price(),
            price_step: auction.price_step(),
            tick_interval: auction.tick_interval(),
        },
    );
    new_auction.mark_started(now);
    let new_auction_id = new_auction.id();
    store.put_auction(new_auction);
    Ok(new_auction_id)
}

/// The split partner accepts: transfer 50% of the bid amount from partner
/// to the booking owner and flip `split_status` to ACCEPTED. Idempotent —
/// repeating on an already-ACCEPTED booking is a no-op.
#[instrument(skip(store))]
pub fn accept_split(store: &mut Store, booking_id: Id, partner_id: Id, now: i64) -> MarketResult<()> {
    let booking = store.get_booking_or(booking_id)?.clone();
    if booking.split_partner() != Some(partner_id) {
        return Err(MarketError::StateInvalid(format!("agent {partner_id} is not the split partner of booking {booking_id}")));
    }
    match booking.split_status() {
        SplitStatus::Accepted => return Ok(()),
        SplitStatus::Rejected => {
            return Err(MarketError::StateInvalid(format!("split for booking {booking_id} was already rejected")))
        }
        SplitStatus::None | SplitStatus::Pending => {}
    }

    let bid = store.get_bid_or(booking.bid_id())?.clone();
    let half = bid.amount() / 2;
    ledger::debit(store, partner_id, half, TransactionKind::SplitPayment, booking_id, now)?;
    ledger::credit(store, booking.agent_id(), half, TransactionKind::SplitReimbursement, booking_id, now)?;

    store.booking_mut(booking_id).expect("checked above").set_split_status(SplitStatus::Accepted);
    Ok(())
}

/// The split partner declines: flip `split_status` to REJECTED, a terminal
/// state. The original booking is left standing — nobody is reversed.
/// Idempotent on an already-REJECTED booking; fails StateInvalid if the
/// split was already ACCEPTED.
#[instrument(skip(store))]
pub fn reject_split(store: &mut Store, booking_id: Id, partner_id: Id) -> MarketResult<()> {
    let booking = store.get_booking_or(booking_id)?.clone();
    if booking.split_partner() != Some(partner_id) {
        return Err(MarketError::StateInvalid(format!("agent {partner_id} is not the split partner of booking {booking_id}")));
    }
    match booking.split_status() {
        SplitStatus::Rejected => return Ok(()),
        SplitStatus::Accepted => {
            warn!(%booking_id, "reject_split called on an already-accepted split");
            return Err(MarketError::StateInvalid(format!("split for booking {booking_id} was already accepted")));
        }
        SplitStatus::None | SplitStatus::Pending => {}
    }
    store.booking_mut(booking_id).expect("checked above").set_split_status(SplitStatus::Rejected);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Agent, AuctionParams, Resource, TimeSlot};

    fn single_capacity_slot(store: &mut Store) -> (Id, Id) {
        let resource = Resource::new("Room".into(), "Library".into(), 1);
        let resource_id = resource.id();
        store.put_resource(resource);
        let slot = TimeSlot::new(resource_id, 1_000, 2_000);
        let slot_id = slot.id();
        store.put_slot(slot);
        let auction_id = crate::auction::create(
            store,
            slot_id,
            0,
            AuctionParams { start_price: 20.0, min_price: 10.0, price_step: 5.0, tick_interval: 10 },
        )
        .unwrap();
        crate::auction::start(store, auction_id, 0).unwrap();
        (slot_id, auction_id)
    }

    #[test]
    fn settlement_books_winner_and_fills_capacity() {
        let mut store = Store::new();
        let (slot_id, auction_id) = single_capacity_slot(&mut store);
        let agent = Agent::new("A".into(), 100, 3);
        let agent_id = agent.id();
        store.put_agent(agent);

        crate::auction::place_bid(&mut store, auction_id, agent_id, 20, 1).unwrap();

        assert_eq!(store.slot(slot_id).unwrap().status(), SlotStatus::Booked);
        assert_eq!(store.active_bookings_for_slot(slot_id).len(), 1);
    }

    #[test]
    fn second_bid_on_full_slot_is_rejected_and_refunded() {
        let mut store = Store::new();
        let (slot_id, auction_id) = single_capacity_slot(&mut store);
        let winner = Agent::new("Winner".into(), 100, 3);
        let winner_id = winner.id();
        store.put_agent(winner);
        crate::auction::place_bid(&mut store, auction_id, winner_id, 20, 1).unwrap();

        // slot is booked and auction completed; any further bid must fail
        // because the auction is no longer ACTIVE.
        let loser = Agent::new("Loser".into(), 100, 3);
        let loser_id = loser.id();
        store.put_agent(loser);
        let err = crate::auction::place_bid(&mut store, auction_id, loser_id, 20, 2).unwrap_err();
        assert!(matches!(err, MarketError::StateInvalid(_)));
        assert_eq!(store.agent(loser_id).unwrap().token_balance(), 100);
        let _ = slot_id;
    }

    #[test]
    fn sellback_refunds_eighty_percent_and_reopens_a_fresh_auction() {
        let mut store = Store::new();
        let (slot_id, auction_id) = single_capacity_slot(&mut store);
        let agent = Agent::new("A".into(), 100, 3);
        let agent_id = agent.id();
        store.put_agent(agent);
        crate::auction::place_bid(&mut store, auction_id, agent_id, 20, 1).unwrap();
        let booking_id = store.active_bookings_for_slot(slot_id)[0].id();

        let new_auction_id = sellback(&mut store, booking_id, agent_id, 5).unwrap();

        assert_eq!(store.agent(agent_id).unwrap().token_balance(), 96);
        assert_eq!(store.booking(booking_id).unwrap().status(), BookingStatus::Cancelled);
        assert_ne!(new_auction_id, auction_id);
        assert_eq!(store.auction(new_auction_id).unwrap().status(), crate::models::AuctionStatus::Active);
        assert_eq!(store.auction(auction_id).unwrap().status(), crate::models::AuctionStatus::Completed);
    }

    #[test]
    fn accept_split_then_reject_split_fails_state_invalid() {
        let mut store = Store::new();
        let resource = Resource::new("Room".into(), "Library".into(), 1);
        let resource_id = resource.id();
        store.put_resource(resource);
        let slot = TimeSlot::new(resource_id, 1_000, 2_000);
        let slot_id = slot.id();
        store.put_slot(slot);
        let auction_id = crate::auction::create(
            &mut store,
            slot_id,
            0,
            AuctionParams { start_price: 20.0, min_price: 10.0, price_step: 5.0, tick_interval: 10 },
        )
        .unwrap();
        crate::auction::start(&mut store, auction_id, 0).unwrap();

        let owner = Agent::new("Owner".into(), 100, 3);
        let owner_id = owner.id();
        store.put_agent(owner);
        let partner = Agent::new("Partner".into(), 100, 3);
        let partner_id = partner.id();
        store.put_agent(partner);

        let bid = crate::models::Bid::solo(auction_id, owner_id, 20, 1).with_split_partner(partner_id);
        let bid_id = crate::auction::admit_bid(&mut store, bid, 1).unwrap();
        let booking_id = store.active_bookings_for_slot(slot_id)[0].id();
        assert_eq!(store.booking(booking_id).unwrap().split_status(), SplitStatus::Pending);
        let _ = bid_id;

        accept_split(&mut store, booking_id, partner_id, 2).unwrap();
        assert_eq!(store.booking(booking_id).unwrap().split_status(), SplitStatus::Accepted);
        assert_eq!(store.agent(owner_id).unwrap().token_balance(), 90);
        assert_eq!(store.agent(partner_id).unwrap().token_balance(), 90);

        let err = reject_split(&mut store, booking_id, partner_id).unwrap_err();
        assert!(matches!(err, MarketError::StateInvalid(_)));
    }
}
