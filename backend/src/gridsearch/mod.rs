//! Grid-search driver: Cartesian sweep over token amount/frequency, with
//! per-seed averaging and ascending-by-`stability_score` ranking.
//!
//! Grounded on the teacher's `std::thread::scope` worker-pool pattern for
//! running independent simulation batches in parallel with no shared
//! mutable state beyond a progress counter and a cancellation flag.

use crate::error::MarketResult;
use crate::simulator::config::GridSearchConfig;
use crate::simulator::engine::SimulationEngine;
use crate::simulator::metrics::{self, StabilityMetrics};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::info;

/// One point in the sweep: a `(token_amount, token_frequency)` pair
/// averaged across `num_seeds` runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSearchRow {
    pub token_amount: i64,
    pub token_frequency_days: i64,
    pub metrics: StabilityMetrics,
}

/// Full sweep report: the ranked rows plus the best combo's per-day detail
/// from `seed = base_seed`, and a heatmap matrix for quick visualization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSearchReport {
    pub rows: Vec<GridSearchRow>,
    pub best: Option<GridSearchRow>,
    pub best_daily_detail: Vec<crate::simulator::engine::DailyDetail>,
    /// rows = frequencies, columns = amounts, cell = stability_score.
    pub heatmap: Vec<Vec<f64>>,
}

/// Run one `SimulationConfig` end to end via [`SimulationEngine`] and
/// return its scorecard plus per-day detail — the `run_single` operation
/// exposed on `Market` (§6), independent of the sweep machinery below.
pub fn run_single(config: &crate::simulator::config::SimulationConfig) -> MarketResult<(StabilityMetrics, Vec<crate::simulator::engine::DailyDetail>)> {
    let mut engine = SimulationEngine::new(config.clone());
    let weeks = config.max_days.div_ceil(7).max(1);
    let results = engine.simulate_semester(weeks)?;
    Ok((results.metrics, results.daily_detail))
}

/// Run one `(token_amount, token_frequency)` combo, averaged across
/// `config.num_seeds` seeded runs, also returning the `seed = base_seed`
/// run's daily detail (needed for the report's `best_daily_detail` field).
fn run_single_with_detail(
    config: &GridSearchConfig,
    token_amount: i64,
    token_frequency_days: i64,
) -> MarketResult<(GridSearchRow, Vec<crate::simulator::engine::DailyDetail>)> {
    let mut per_seed = Vec::with_capacity(config.num_seeds.max(1) as usize);
    let mut base_seed_detail = Vec::new();
    for k in 0..config.num_seeds.max(1) {
        let mut run_config = config.base_config.clone();
        run_config.token_amount = token_amount;
        run_config.token_frequency_days = token_frequency_days;
        run_config.seed = config.base_config.seed + k as u64;

        let mut engine = SimulationEngine::new(run_config);
        let weeks = config.base_config.max_days.div_ceil(7).max(1);
        let results = engine.simulate_semester(weeks)?;
        if k == 0 {
            base_seed_detail = results.daily_detail;
        }
        per_seed.push(results.metrics);
    }
    let row = GridSearchRow { token_amount, token_frequency_days, metrics: metrics::average(&per_seed) };
    Ok((row, base_seed_detail))
}

/// Run the full Cartesian sweep in parallel across combos (bounded worker
/// threads via `std::thread::scope`), reporting progress after each combo
/// and honoring `cancel` between combos. A cancelled search still returns
/// the ranking of whatever combos finished.
pub fn grid_search(
    config: &GridSearchConfig,
    cancel: &AtomicBool,
    progress: &(dyn Fn(usize, usize) + Send + Sync),
) -> MarketResult<GridSearchReport> {
    let combos: Vec<(i64, i64)> = config
        .token_amounts
        .iter()
        .flat_map(|amount| config.token_frequencies.iter().map(move |freq| (*amount, *freq)))
        .collect();
    let total = combos.len();

    let completed = AtomicUsize::new(0);
    let rows: Mutex<Vec<(GridSearchRow, Vec<crate::simulator::engine::DailyDetail>)>> = Mutex::new(Vec::new());
    let errors: Mutex<Vec<crate::error::MarketError>> = Mutex::new(Vec::new());

    let worker_count = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1).min(total.max(1));
    let chunks: Vec<Vec<(i64, i64)>> = {
        let mut out = vec![Vec::new(); worker_count.max(1)];
        for (i, combo) in combos.into_iter().enumerate() {
            out[i % worker_count.max(1)].push(combo);
        }
        out
    };

    std::thread::scope(|scope| {
        for chunk in &chunks {
            let rows = &rows;
            let errors = &errors;
            let completed = &completed;
            scope.spawn(move || {
                for (amount, freq) in chunk {
                    if cancel.load(Ordering::Relaxed) {
                        break;
                    }
                    match run_single_with_detail(config, *amount, *freq) {
                        Ok(result) => rows.lock().unwrap().push(result),
                        Err(err) => errors.lock().unwrap().push(err),
                    }
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    progress(done, total);
                }
            });
        }
    });

    if let Some(err) = errors.into_inner().unwrap().into_iter().next() {
        return Err(err);
    }

    let mut rows = rows.into_inner().unwrap();
    rows.sort_by(|a, b| {
        a.0.metrics
            .stability_score
            .partial_cmp(&b.0.metrics.stability_score)
            .unwrap()
            .then(a.0.token_amount.cmp(&b.0.token_amount))
            .then(a.0.token_frequency_days.cmp(&b.0.token_frequency_days))
    });

    let best = rows.first().map(|(row, _)| row.clone());
    let best_daily_detail = rows.first().map(|(_, detail)| detail.clone()).unwrap_or_default();

    let heatmap = config
        .token_frequencies
        .iter()
        .map(|freq| {
            config
                .token_amounts
                .iter()
                .map(|amount| {
                    rows.iter()
                        .find(|(row, _)| row.token_amount == *amount && row.token_frequency_days == *freq)
                        .map(|(row, _)| row.metrics.stability_score)
                        .unwrap_or(f64::NAN)
                })
                .collect()
        })
        .collect();

    info!(total, completed = rows.len(), "grid search finished");
    Ok(GridSearchReport { rows: rows.into_iter().map(|(row, _)| row).collect(), best, best_daily_detail, heatmap })
}

/// Run the sweep with no cancellation support and a no-op progress callback
/// — the common case for the CLI and tests.
pub fn grid_search_to_completion(config: &GridSearchConfig) -> MarketResult<GridSearchReport> {
    let cancel = AtomicBool::new(false);
    grid_search(config, &cancel, &|_, _| {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::config::{AgentProfile, SimulationConfig};

    fn base() -> SimulationConfig {
        SimulationConfig {
            num_agents: 6,
            num_rooms: 1,
            slots_per_room_per_day: 1,
            max_days: 2,
            token_amount: 50,
            token_frequency_days: 7,
            start_price: 20.0,
            min_price: 5.0,
            price_step: 5.0,
            high_demand_day_ranges: vec![],
            agent_profiles: vec![AgentProfile {
                name: "only".into(),
                share: 1.0,
                urgency_range: (0.3, 0.9),
                budget_sensitivity_range: (0.1, 0.5),
                base_value_range: (20.0, 60.0),
            }],
            location_weights: vec![1.0],
            time_weights: vec![1.0],
            seed: 3,
        }
    }

    #[test]
    fn ranks_rows_ascending_by_stability_score() {
        let config = GridSearchConfig {
            base_config: base(),
            token_amounts: vec![20, 80],
            token_frequencies: vec![3, 7],
            num_seeds: 2,
        };
        let report = grid_search_to_completion(&config).unwrap();
        assert_eq!(report.rows.len(), 4);
        for pair in report.rows.windows(2) {
            assert!(pair[0].metrics.stability_score <= pair[1].metrics.stability_score);
        }
        assert!(report.best.is_some());
        assert_eq!(report.heatmap.len(), 2);
        assert_eq!(report.heatmap[0].len(), 2);
    }

    #[test]
    fn cancellation_still_returns_partial_ranking() {
        let config = GridSearchConfig {
            base_config: base(),
            token_amounts: vec![20, 40, 60, 80],
            token_frequencies: vec![3],
            num_seeds: 1,
        };
        let cancel = AtomicBool::new(true);
        let report = grid_search(&config, &cancel, &|_, _| {}).unwrap();
        assert!(report.rows.len() <= 4);
    }
}
