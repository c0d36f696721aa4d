//! Scenario 1: a Dutch auction descends on schedule and clears on the first
//! bid that meets the current price.

use campus_market_core::auction;
use campus_market_core::models::{Agent, AuctionParams, AuctionStatus, Resource, TimeSlot};
use campus_market_core::Store;

fn setup(store: &mut Store) -> campus_market_core::models::Id {
    let resource = Resource::new("Study Room 201".into(), "Library".into(), 2);
    let resource_id = resource.id();
    store.put_resource(resource);
    let slot = TimeSlot::new(resource_id, 10_000, 11_800);
    let slot_id = slot.id();
    store.put_slot(slot);
    let auction_id = auction::create(
        store,
        slot_id,
        0,
        AuctionParams { start_price: 50.0, min_price: 10.0, price_step: 10.0, tick_interval: 60 },
    )
    .unwrap();
    auction::start(store, auction_id, 0).unwrap();
    auction_id
}

#[test]
fn price_descends_by_one_step_per_tick_until_the_floor() {
    let mut store = Store::new();
    let auction_id = setup(&mut store);

    auction::tick(&mut store, auction_id, 60).unwrap();
    assert_eq!(store.auction(auction_id).unwrap().current_price(), 40.0);
    auction::tick(&mut store, auction_id, 120).unwrap();
    assert_eq!(store.auction(auction_id).unwrap().current_price(), 30.0);
    auction::tick(&mut store, auction_id, 180).unwrap();
    assert_eq!(store.auction(auction_id).unwrap().current_price(), 20.0);
    auction::tick(&mut store, auction_id, 240).unwrap();
    assert_eq!(store.auction(auction_id).unwrap().current_price(), 10.0);
}

#[test]
fn price_rebounds_upward_once_it_has_held_at_the_floor() {
    let mut store = Store::new();
    let auction_id = setup(&mut store);
    for t in [60, 120, 180, 240] {
        auction::tick(&mut store, auction_id, t).unwrap();
    }
    assert_eq!(store.auction(auction_id).unwrap().current_price(), 10.0);
    auction::tick(&mut store, auction_id, 300).unwrap();
    assert_eq!(store.auction(auction_id).unwrap().current_price(), 20.0);
}

#[test]
fn a_bid_at_or_above_the_current_price_clears_the_auction() {
    let mut store = Store::new();
    let auction_id = setup(&mut store);
    auction::tick(&mut store, auction_id, 60).unwrap(); // price now 40

    let bidder = Agent::new("Bidder".into(), 100, 3);
    let bidder_id = bidder.id();
    store.put_agent(bidder);

    let bid_id = auction::place_bid(&mut store, auction_id, bidder_id, 40, 90).unwrap();

    assert_eq!(store.auction(auction_id).unwrap().status(), AuctionStatus::Completed);
    assert_eq!(store.bid(bid_id).unwrap().status(), campus_market_core::models::BidStatus::Accepted);
    assert_eq!(store.agent(bidder_id).unwrap().token_balance(), 60);
    assert_eq!(store.active_bookings_for_agent(bidder_id).len(), 1);
}

#[test]
fn ticking_a_completed_auction_is_rejected() {
    let mut store = Store::new();
    let auction_id = setup(&mut store);
    let bidder = Agent::new("Bidder".into(), 100, 3);
    let bidder_id = bidder.id();
    store.put_agent(bidder);
    auction::place_bid(&mut store, auction_id, bidder_id, 50, 10).unwrap();

    let err = auction::tick(&mut store, auction_id, 70).unwrap_err();
    assert!(matches!(err, campus_market_core::MarketError::StateInvalid(_)));
}
