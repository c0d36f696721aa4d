//! AdminConfig: the marketplace's single piece of runtime configuration.
//!
//! There is no separate file-based config layer — this crate is embedded,
//! not a standalone service. An embedding application mutates this through
//! [`crate::market::Market::update_config`], the one admitted writer; every
//! successful write bumps `pricing_model_version` so readers can invalidate
//! caches.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weights feeding the pricing engine's demand score (§4.2).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricingWeights {
    pub w_cap: f64,
    pub w_loc: f64,
    pub w_tod: f64,
    pub w_dow: f64,
    pub w_lead: f64,
    pub global_mod: f64,
}

impl Default for PricingWeights {
    fn default() -> Self {
        Self {
            w_cap: 1.0,
            w_loc: 1.0,
            w_tod: 1.0,
            w_dow: 1.0,
            w_lead: 1.0,
            global_mod: 1.0,
        }
    }
}

/// Defaults applied to newly created Dutch auctions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DutchDefaults {
    pub price_step: f64,
    pub tick_interval_secs: i64,
}

impl Default for DutchDefaults {
    fn default() -> Self {
        Self { price_step: 5.0, tick_interval_secs: 10 }
    }
}

/// Singleton configuration record: pricing weights, Dutch defaults,
/// allocation policy, and the learned popularity maps the pricing engine
/// reads from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub pricing_weights: PricingWeights,
    pub dutch_defaults: DutchDefaults,
    pub token_allocation_amount: i64,
    pub token_allocation_frequency_days: i64,
    pub max_bookings_per_agent: u32,
    /// location -> popularity score in [0, 1]
    pub location_popularity: BTreeMap<String, f64>,
    /// "{weekday}-{hour}" -> popularity score in [0, 1]
    pub time_popularity: BTreeMap<String, f64>,
    pub pricing_model_version: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            pricing_weights: PricingWeights::default(),
            dutch_defaults: DutchDefaults::default(),
            token_allocation_amount: 100,
            token_allocation_frequency_days: 7,
            max_bookings_per_agent: 5,
            location_popularity: BTreeMap::new(),
            time_popularity: BTreeMap::new(),
            pricing_model_version: 0,
        }
    }
}

impl AdminConfig {
    /// Look up a location's learned popularity, falling back to the neutral
    /// prior of `0.5` used throughout the pricing formula.
    pub fn location_score(&self, location: &str) -> f64 {
        self.location_popularity.get(location).copied().unwrap_or(0.5)
    }

    /// Look up the learned popularity for a `(weekday, hour)` pair, if one
    /// has been observed.
    pub fn time_score(&self, weekday: u32, hour: u32) -> Option<f64> {
        self.time_popularity.get(&time_key(weekday, hour)).copied()
    }
}

/// The `"{weekday}-{hour}"` key shape used by both popularity maps.
pub fn time_key(weekday: u32, hour: u32) -> String {
    format!("{weekday}-{hour}")
}
