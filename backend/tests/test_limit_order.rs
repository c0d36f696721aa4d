//! Scenario 2: a standing limit order fires automatically once the
//! descending price crosses its threshold, without any explicit bid call.

use campus_market_core::models::{Agent, AuctionParams, AuctionStatus, LimitOrder, LimitOrderStatus, Resource, TimeSlot};
use campus_market_core::{auction, matcher};
use campus_market_core::Store;

fn setup(store: &mut Store) -> campus_market_core::models::Id {
    let resource = Resource::new("Seminar Room".into(), "Student Center".into(), 1);
    let resource_id = resource.id();
    store.put_resource(resource);
    let slot = TimeSlot::new(resource_id, 5_000, 6_800);
    let slot_id = slot.id();
    store.put_slot(slot);
    let auction_id = auction::create(
        store,
        slot_id,
        0,
        AuctionParams { start_price: 60.0, min_price: 10.0, price_step: 10.0, tick_interval: 30 },
    )
    .unwrap();
    auction::start(store, auction_id, 0).unwrap();
    slot_id
}

#[test]
fn order_fires_as_soon_as_a_tick_crosses_its_max_price() {
    let mut store = Store::new();
    let slot_id = setup(&mut store);
    let auction_id = store.auction_for_slot(slot_id).unwrap().id();

    let agent = Agent::new("Patient Bidder".into(), 100, 3);
    let agent_id = agent.id();
    store.put_agent(agent);
    let order = LimitOrder::new(agent_id, slot_id, 40.0, 0);
    let order_id = order.id();
    store.put_limit_order(order);

    // price 60 -> 50: order (max 40) does not cross yet.
    auction::tick(&mut store, auction_id, 30).unwrap();
    assert_eq!(store.limit_order(order_id).unwrap().status(), LimitOrderStatus::Pending);

    // price 50 -> 40: order crosses and fires.
    auction::tick(&mut store, auction_id, 60).unwrap();
    assert_eq!(store.limit_order(order_id).unwrap().status(), LimitOrderStatus::Executed);
    assert_eq!(store.auction(auction_id).unwrap().status(), AuctionStatus::Completed);
    assert_eq!(store.agent(agent_id).unwrap().token_balance(), 60);
}

#[test]
fn multiple_orders_fire_in_created_at_then_id_order_but_only_one_wins() {
    let mut store = Store::new();
    let slot_id = setup(&mut store);
    let auction_id = store.auction_for_slot(slot_id).unwrap().id();

    let first = Agent::new("First".into(), 100, 3);
    let first_id = first.id();
    store.put_agent(first);
    let second = Agent::new("Second".into(), 100, 3);
    let second_id = second.id();
    store.put_agent(second);

    // Both orders already cross the start price; `first` was created earlier.
    let first_order = LimitOrder::new(first_id, slot_id, 60.0, 0);
    let first_order_id = first_order.id();
    store.put_limit_order(first_order);
    let second_order = LimitOrder::new(second_id, slot_id, 60.0, 1);
    let second_order_id = second_order.id();
    store.put_limit_order(second_order);

    matcher::match_slot(&mut store, slot_id, 5).unwrap();

    assert_eq!(store.limit_order(first_order_id).unwrap().status(), LimitOrderStatus::Executed);
    assert_eq!(store.limit_order(second_order_id).unwrap().status(), LimitOrderStatus::Pending);
    assert_eq!(store.auction(auction_id).unwrap().status(), AuctionStatus::Completed);
}

#[test]
fn cancelling_a_pending_order_prevents_it_from_ever_firing() {
    let mut market = campus_market_core::Market::new(1);
    let agent_id = market.create_agent("A".into(), 100, 3);

    market
        .import_resources(
            "Building,Room Name,Capacity,Date (YYYY-MM-DD),Time (HH:MM),Status\n\
             Student Center,Seminar Room,1,2024-01-10,09:00,Available\n",
        )
        .unwrap();
    market.reprice(30);
    let auction_id = market
        .list_auctions(&campus_market_core::market::AuctionFilter::default())
        .first()
        .map(|a| a.id())
        .unwrap();
    market.start_auction(auction_id).unwrap();

    let order_id = market.create_limit_order(auction_id, 1.0, agent_id).unwrap();
    market.cancel_limit_order(order_id).unwrap();

    for _ in 0..20 {
        let _ = market.tick_auction(auction_id);
    }
    assert_eq!(market.list_limit_orders(agent_id)[0].status(), LimitOrderStatus::Cancelled);
}
