//! Composite market-health metrics computed per simulation run.

use serde::{Deserialize, Serialize};

/// One run's scorecard. Lower `stability_score` is better; higher
/// `avg_satisfaction` is better.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct StabilityMetrics {
    pub access_rate: f64,
    pub preference_match_rate: f64,
    pub avg_consumer_surplus: f64,
    pub utilization_rate: f64,
    pub price_volatility: f64,
    pub gini_coefficient: f64,
    pub supply_demand_ratio: f64,
    pub stability_score: f64,
    pub avg_satisfaction: f64,
}

/// One booking's inputs to the preference-match and consumer-surplus terms.
#[derive(Debug, Clone, Copy)]
pub struct BookingOutcome {
    pub matched_location: bool,
    pub matched_time: bool,
    pub willingness_to_pay: f64,
    pub price_paid: f64,
}

/// Raw counters accumulated over one run, folded into [`StabilityMetrics`]
/// by [`compute`].
#[derive(Debug, Default)]
pub struct RunTally {
    pub num_agents: u32,
    pub slots_offered: u32,
    pub bids_attempted: u32,
    pub bookings_per_agent: Vec<u32>,
    pub outcomes: Vec<BookingOutcome>,
    pub clearing_prices: Vec<f64>,
}

/// Fold a run's raw tally into the composite scorecard per the design
/// document's exact weighted formulas.
pub fn compute(tally: &RunTally) -> StabilityMetrics {
    let agents_with_booking = tally.bookings_per_agent.iter().filter(|&&c| c > 0).count();
    let access_rate = safe_ratio(agents_with_booking as f64, tally.num_agents as f64);

    let preference_match_rate = if tally.outcomes.is_empty() {
        0.0
    } else {
        let total: f64 = tally
            .outcomes
            .iter()
            .map(|o| match (o.matched_location, o.matched_time) {
                (true, true) => 1.0,
                (true, false) | (false, true) => 0.5,
                (false, false) => 0.0,
            })
            .sum();
        total / tally.outcomes.len() as f64
    };

    let avg_consumer_surplus = if tally.outcomes.is_empty() {
        0.0
    } else {
        tally.outcomes.iter().map(|o| o.willingness_to_pay - o.price_paid).sum::<f64>() / tally.outcomes.len() as f64
    };

    let utilization_rate = safe_ratio(tally.outcomes.len() as f64, tally.slots_offered as f64);

    let price_volatility = if tally.clearing_prices.len() < 2 {
        0.0
    } else {
        let mean = tally.clearing_prices.iter().sum::<f64>() / tally.clearing_prices.len() as f64;
        if mean == 0.0 {
            0.0
        } else {
            let variance = tally.clearing_prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>()
                / tally.clearing_prices.len() as f64;
            variance.sqrt() / mean
        }
    };

    let gini_coefficient = gini(&tally.bookings_per_agent);
    let supply_demand_ratio = safe_ratio(tally.slots_offered as f64, tally.bids_attempted as f64);

    let stability_score = 4.0 * (1.0 - access_rate)
        + 2.0 * (1.0 - preference_match_rate)
        + 2.0 * gini_coefficient
        + 1.0 * (1.0 - utilization_rate)
        + 0.5 * price_volatility;

    let avg_satisfaction = 0.35 * access_rate
        + 0.25 * preference_match_rate
        + 0.20 * (1.0 - gini_coefficient)
        + 0.10 * utilization_rate
        + 0.10 * (1.0 - price_volatility).max(0.0);

    StabilityMetrics {
        access_rate,
        preference_match_rate,
        avg_consumer_surplus,
        utilization_rate,
        price_volatility,
        gini_coefficient,
        supply_demand_ratio,
        stability_score,
        avg_satisfaction,
    }
}

fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Gini coefficient of a distribution of non-negative counts, 0 = perfectly
/// equal. Computed from the sorted counts via the standard mean-absolute-
/// difference formula.
fn gini(counts: &[u32]) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    let n = counts.len() as f64;
    let mean = counts.iter().sum::<u32>() as f64 / n;
    if mean == 0.0 {
        return 0.0;
    }
    let mut sorted: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mut sum_abs_diff = 0.0;
    for (i, xi) in sorted.iter().enumerate() {
        for xj in &sorted[i + 1..] {
            sum_abs_diff += (xi - xj).abs();
        }
    }
    // Full double-sum over all ordered pairs is 2x the single-sum above.
    (2.0 * sum_abs_diff) / (n * n * mean)
}

/// Average a collection of per-seed metrics into one combo-level average,
/// the grid-search driver's per-combo reduction.
pub fn average(metrics: &[StabilityMetrics]) -> StabilityMetrics {
    if metrics.is_empty() {
        return StabilityMetrics::default();
    }
    let n = metrics.len() as f64;
    let mut sum = StabilityMetrics::default();
    for m in metrics {
        sum.access_rate += m.access_rate;
        sum.preference_match_rate += m.preference_match_rate;
        sum.avg_consumer_surplus += m.avg_consumer_surplus;
        sum.utilization_rate += m.utilization_rate;
        sum.price_volatility += m.price_volatility;
        sum.gini_coefficient += m.gini_coefficient;
        sum.supply_demand_ratio += m.supply_demand_ratio;
        sum.stability_score += m.stability_score;
        sum.avg_satisfaction += m.avg_satisfaction;
    }
    StabilityMetrics {
        access_rate: sum.access_rate / n,
        preference_match_rate: sum.preference_match_rate / n,
        avg_consumer_surplus: sum.avg_consumer_surplus / n,
        utilization_rate: sum.utilization_rate / n,
        price_volatility: sum.price_volatility / n,
        gini_coefficient: sum.gini_coefficient / n,
        supply_demand_ratio: sum.supply_demand_ratio / n,
        stability_score: sum.stability_score / n,
        avg_satisfaction: sum.avg_satisfaction / n,
    }
}
