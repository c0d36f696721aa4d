//! Dynamic pricing: periodic repricing of future auctions from learned
//! demand signals and lead time.
//!
//! Grounded on the teacher's settlement-fee formula shape (a handful of
//! weighted terms clamped to a band) but the terms themselves come straight
//! from the design document's demand model, not the teacher's fee schedule.

use crate::models::{Auction, AuctionParams};
use crate::rng::RngStream;
use crate::store::Store;
use tracing::instrument;

use crate::models::AdminConfig;

/// Score a hour-of-day by closeness to 2pm when no learned popularity exists
/// for that `(weekday, hour)` key yet.
fn peak_curve(hour: u32) -> f64 {
    let distance = (hour as f64 - 14.0).abs();
    (1.0 - distance / 10.0).max(0.2)
}

/// Compute the demand-driven current price for one slot. `noise` is the
/// caller-supplied `uniform(0.95, 1.05)` draw: production embeddings pass a
/// fresh one per call, the simulator passes a seeded one so reruns with the
/// same seed reprice identically.
pub fn price_for_slot(
    config: &AdminConfig,
    location: &str,
    weekday: u32,
    hour: u32,
    capacity: u32,
    lead_days: i64,
    noise: f64,
) -> f64 {
    let loc_score = config.location_score(location);
    let hour_score = config.time_score(weekday, hour).unwrap_or_else(|| peak_curve(hour));
    let cap_score = (capacity.min(100) as f64) / 100.0;
    let lead_ratio = (lead_days.max(0) as f64 / 30.0).min(1.0);
    let w = &config.pricing_weights;
    let lead_mult = 1.0 + w.w_lead * (1.1 - lead_ratio);

    let demand = (cap_score * w.w_cap * 0.5
        + loc_score * w.w_loc * 2.0
        + hour_score * w.w_tod * 2.5
        + hour_score * w.w_dow * 1.5)
        / 5.0;

    (15.0 * w.global_mod * lead_mult * demand * noise).clamp(5.0, 500.0)
}

/// Rescans every future, non-BOOKED slot within `horizon_days` of `now` and
/// either updates its attached ACTIVE auction's price band or creates a
/// fresh PENDING one, bumping `pricing_model_version` once at the end if at
/// least one slot was touched.
///
/// `rng` supplies the per-slot noise draw; callers that need bit-identical
/// reruns (the simulator) pass the same seeded stream in the same order the
/// design document specifies: `(room, slot_index)` ascending, which here is
/// simply "iterate slots sorted by id" since the `Store` already orders a
/// `BTreeMap` that way and callers control creation order.
#[instrument(skip(store, config, rng))]
pub fn reprice(store: &mut Store, config: &mut AdminConfig, rng: &mut RngStream, now: i64, horizon_days: i64) {
    let horizon_end = now + horizon_days * 86_400;
    let mut touched = false;

    let candidate_slot_ids: Vec<_> = store
        .slots()
        .filter(|slot| {
            slot.status() != crate::models::SlotStatus::Booked && slot.start() > now && slot.start() <= horizon_end
        })
        .map(|slot| slot.id())
        .collect();

    for slot_id in candidate_slot_ids {
        let slot = match store.slot(slot_id) {
            Some(s) => s.clone(),
            None => continue,
        };
        let resource = match store.resource(slot.resource_id()) {
            Some(r) => r.clone(),
            None => continue,
        };

        let lead_days = (slot.start() - now) / 86_400;
        let noise = rng.uniform(0.95, 1.05);
        let price = price_for_slot(
            config,
            resource.location(),
            slot.weekday(),
            slot.hour(),
            resource.capacity(),
            lead_days,
            noise,
        );
        let start_price = 1.6 * price;
        let min_price = 0.4 * price;

        match store.auction_for_slot_mut(slot_id) {
            Some(auction) if auction.status() != crate::models::AuctionStatus::Completed
                && auction.status() != crate::models::AuctionStatus::Cancelled =>
            {
                auction.reprice(start_price, min_price, price);
                touched = true;
            }
            Some(_) => {}
            None => {
                let auction = Auction::new(
                    slot_id,
                    now,
                    AuctionParams {
                        start_price,
                        min_price,
                        price_step: config.dutch_defaults.price_step,
                        tick_interval: config.dutch_defaults.tick_interval_secs,
                    },
                );
                store.put_auction(auction);
                touched = true;
            }
        }
    }

    if touched {
        config.pricing_model_version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdminConfig, Resource, TimeSlot};

    fn config() -> AdminConfig {
        AdminConfig::default()
    }

    #[test]
    fn peak_curve_peaks_at_2pm() {
        assert_eq!(peak_curve(14), 1.0);
        assert!(peak_curve(8) < 1.0);
        assert!(peak_curve(2) >= 0.2);
    }

    #[test]
    fn price_is_clamped_to_band() {
        let cfg = config();
        let price = price_for_slot(&cfg, "Library", 2, 14, 4, 5, 1.0);
        assert!((5.0..=500.0).contains(&price));
    }

    #[test]
    fn reprice_creates_pending_auction_for_uncovered_slot() {
        let mut store = Store::new();
        let mut cfg = config();
        let mut rng = RngStream::new(7);
        let resource = Resource::new("Room".into(), "Library".into(), 4);
        let resource_id = resource.id();
        store.put_resource(resource);
        let slot = TimeSlot::new(resource_id, 86_400 * 3, 86_400 * 3 + 1800);
        let slot_id = slot.id();
        store.put_slot(slot);

        reprice(&mut store, &mut cfg, &mut rng, 0, 30);

        let auction = store.auction_for_slot(slot_id).expect("auction created");
        assert_eq!(auction.status(), crate::models::AuctionStatus::Pending);
        assert_eq!(cfg.pricing_model_version, 1);
    }

    #[test]
    fn reprice_is_deterministic_for_a_fixed_seed() {
        let resource = Resource::new("Room".into(), "Library".into(), 4);
        let resource_id = resource.id();
        let slot = TimeSlot::new(resource_id, 86_400 * 3, 86_400 * 3 + 1800);

        let run = || {
            let mut store = Store::new();
            let mut cfg = config();
            let mut rng = RngStream::new(42);
            store.put_resource(resource.clone());
            store.put_slot(slot.clone());
            reprice(&mut store, &mut cfg, &mut rng, 0, 30);
            store.auction_for_slot(slot.id()).unwrap().current_price()
        };

        assert_eq!(run(), run());
    }
}
