//! Simulation and grid-search configuration.

use serde::{Deserialize, Serialize};

/// One tier of the synthetic population (e.g. Heavy/Moderate/Light users),
/// each tier drawing its behavior parameters from its own range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    pub name: String,
    /// Fraction of the population in this tier; all tiers must sum to 1
    /// within `1e-6` (see [`SimulationConfig::agent_counts`]).
    pub share: f64,
    pub urgency_range: (f64, f64),
    pub budget_sensitivity_range: (f64, f64),
    pub base_value_range: (f64, f64),
}

/// Full configuration for one deterministic simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub num_agents: u32,
    pub num_rooms: u32,
    /// 1, 2, or 3.
    pub slots_per_room_per_day: u32,
    pub max_days: u32,
    pub token_amount: i64,
    pub token_frequency_days: i64,
    pub start_price: f64,
    pub min_price: f64,
    pub price_step: f64,
    pub high_demand_day_ranges: Vec<(u32, u32)>,
    pub agent_profiles: Vec<AgentProfile>,
    pub location_weights: Vec<f64>,
    pub time_weights: Vec<f64>,
    pub seed: u64,
}

impl SimulationConfig {
    /// Per-tier agent counts, rounding shares down to `floor(share * n)` for
    /// every tier but the last, which absorbs the remainder so counts
    /// always sum to exactly `num_agents`.
    ///
    /// # Panics
    /// Panics if `agent_profiles` is empty or shares don't sum to 1 within
    /// `1e-6`.
    pub fn agent_counts(&self) -> Vec<u32> {
        assert!(!self.agent_profiles.is_empty(), "at least one agent profile is required");
        let total_share: f64 = self.agent_profiles.iter().map(|p| p.share).sum();
        assert!(
            (total_share - 1.0).abs() < 1e-6,
            "agent profile shares must sum to 1, got {total_share}"
        );

        let mut counts = Vec::with_capacity(self.agent_profiles.len());
        let mut assigned = 0u32;
        for profile in &self.agent_profiles[..self.agent_profiles.len() - 1] {
            let count = (profile.share * self.num_agents as f64).floor() as u32;
            assigned += count;
            counts.push(count);
        }
        counts.push(self.num_agents.saturating_sub(assigned));
        counts
    }

    pub fn is_high_demand_day(&self, day: u32) -> bool {
        self.high_demand_day_ranges.iter().any(|(start, end)| day >= *start && day <= *end)
    }
}

/// Grid-search sweep configuration: a base config plus the axes to vary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSearchConfig {
    pub base_config: SimulationConfig,
    pub token_amounts: Vec<i64>,
    pub token_frequencies: Vec<i64>,
    pub num_seeds: u32,
}
