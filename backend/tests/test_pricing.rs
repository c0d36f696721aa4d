//! The dynamic pricing engine: price is always inside its clamp band, a
//! reprice pass only bumps `pricing_model_version` when it actually touches
//! a slot, and an already-active auction is repriced in place rather than
//! replaced.

use campus_market_core::models::{AdminConfig, AuctionParams, AuctionStatus, Resource, TimeSlot};
use campus_market_core::rng::RngStream;
use campus_market_core::{auction, pricing};
use campus_market_core::Store;

#[test]
fn price_for_slot_never_leaves_its_clamp_band_across_a_range_of_inputs() {
    let cfg = AdminConfig::default();
    for hour in 0..24 {
        for capacity in [1, 4, 20, 100, 500] {
            for lead_days in [0, 1, 10, 30, 90] {
                let price = pricing::price_for_slot(&cfg, "Library", 3, hour, capacity, lead_days, 1.0);
                assert!((5.0..=500.0).contains(&price), "price {price} out of band");
            }
        }
    }
}

#[test]
fn reprice_with_nothing_in_horizon_leaves_the_model_version_untouched() {
    let mut store = Store::new();
    let mut cfg = AdminConfig::default();
    let mut rng = RngStream::new(1);
    let starting_version = cfg.pricing_model_version;

    pricing::reprice(&mut store, &mut cfg, &mut rng, 0, 30);

    assert_eq!(cfg.pricing_model_version, starting_version);
}

#[test]
fn reprice_skips_a_slot_that_already_cleared_to_booked() {
    let mut store = Store::new();
    let mut cfg = AdminConfig::default();
    let mut rng = RngStream::new(3);
    let resource = Resource::new("Room".into(), "Library".into(), 2);
    let resource_id = resource.id();
    store.put_resource(resource);
    let slot = TimeSlot::new(resource_id, 86_400 * 2, 86_400 * 2 + 1_800);
    let slot_id = slot.id();
    store.put_slot(slot);
    store.slot_mut(slot_id).unwrap().set_status(campus_market_core::models::SlotStatus::Booked);

    pricing::reprice(&mut store, &mut cfg, &mut rng, 0, 30);

    assert!(store.auction_for_slot(slot_id).is_none());
    assert_eq!(cfg.pricing_model_version, 0);
}

#[test]
fn reprice_adjusts_an_existing_non_terminal_auctions_band_in_place_instead_of_replacing_it() {
    let mut store = Store::new();
    let mut cfg = AdminConfig::default();
    let mut rng = RngStream::new(9);
    let resource = Resource::new("Room".into(), "Library".into(), 2);
    let resource_id = resource.id();
    store.put_resource(resource);
    let slot = TimeSlot::new(resource_id, 86_400 * 2, 86_400 * 2 + 1_800);
    let slot_id = slot.id();
    store.put_slot(slot);

    let auction_id = auction::create(
        &mut store,
        slot_id,
        0,
        AuctionParams { start_price: 9.0, min_price: 3.0, price_step: 1.0, tick_interval: 30 },
    )
    .unwrap();
    auction::start(&mut store, auction_id, 0).unwrap();

    pricing::reprice(&mut store, &mut cfg, &mut rng, 0, 30);

    assert_eq!(store.auction(auction_id).unwrap().status(), AuctionStatus::Active);
    assert_eq!(store.auctions().count(), 1);
    assert_eq!(cfg.pricing_model_version, 1);
}

#[test]
fn reprice_never_touches_a_completed_auctions_band() {
    let mut store = Store::new();
    let mut cfg = AdminConfig::default();
    let mut rng = RngStream::new(11);
    let resource = Resource::new("Room".into(), "Library".into(), 1);
    let resource_id = resource.id();
    store.put_resource(resource);
    let slot = TimeSlot::new(resource_id, 86_400 * 2, 86_400 * 2 + 1_800);
    let slot_id = slot.id();
    store.put_slot(slot);

    let auction_id = auction::create(
        &mut store,
        slot_id,
        0,
        AuctionParams { start_price: 20.0, min_price: 10.0, price_step: 5.0, tick_interval: 30 },
    )
    .unwrap();
    auction::start(&mut store, auction_id, 0).unwrap();
    let agent = campus_market_core::models::Agent::new("A".into(), 50, 3);
    let agent_id = agent.id();
    store.put_agent(agent);
    auction::place_bid(&mut store, auction_id, agent_id, 20, 1).unwrap();

    pricing::reprice(&mut store, &mut cfg, &mut rng, 0, 30);

    assert_eq!(store.auction(auction_id).unwrap().status(), AuctionStatus::Completed);
    assert_eq!(store.auction(auction_id).unwrap().current_price(), 20.0);
}

#[test]
fn reprice_is_bit_identical_for_the_same_seed() {
    let resource = Resource::new("Room".into(), "Library".into(), 4);
    let slot = TimeSlot::new(resource.id(), 86_400 * 5, 86_400 * 5 + 1_800);

    let run = || {
        let mut store = Store::new();
        let mut cfg = AdminConfig::default();
        let mut rng = RngStream::new(123);
        store.put_resource(resource.clone());
        store.put_slot(slot.clone());
        pricing::reprice(&mut store, &mut cfg, &mut rng, 0, 30);
        let auction = store.auction_for_slot(slot.id()).unwrap();
        (auction.current_price(), auction.min_price())
    };

    assert_eq!(run(), run());
}
