//! Synthetic agent generation for the simulator.
//!
//! Draws, in strict agent-index order, exactly the five values the
//! determinism contract requires: preferred_time, preferred_location,
//! budget_sensitivity, urgency, base_value. No other simulator component
//! reads the RNG during generation.

use crate::models::{Agent, Id};
use crate::rng::RngStream;
use crate::simulator::config::{AgentProfile, SimulationConfig};

/// Per-agent simulation-only state that rides alongside its ledger
/// [`Agent`]: preferences and behavior parameters `should_bid` reads.
#[derive(Debug, Clone)]
pub struct SimAgent {
    pub agent_id: Id,
    pub tier: String,
    pub preferred_time: usize,
    pub preferred_location: usize,
    pub budget_sensitivity: f64,
    pub urgency: f64,
    pub base_value: f64,
    pub bookings: u32,
}

/// Generate `config.num_agents` agents: one [`Agent`] per tier count (in
/// tier order, per-tier count from [`SimulationConfig::agent_counts`]), and
/// a matching [`SimAgent`] profile drawn from that tier's ranges.
pub fn generate(config: &SimulationConfig, rng: &mut RngStream) -> Vec<(Agent, SimAgent)> {
    let counts = config.agent_counts();
    let mut generated = Vec::with_capacity(config.num_agents as usize);
    let default_weights = [1.0];
    let location_weights = if config.location_weights.is_empty() { &default_weights[..] } else { &config.location_weights[..] };
    let time_weights = if config.time_weights.is_empty() { &default_weights[..] } else { &config.time_weights[..] };

    let mut index = 0usize;
    for (profile, count) in config.agent_profiles.iter().zip(counts.iter()) {
        for _ in 0..*count {
            let agent = Agent::new(format!("agent-{index}"), config.token_amount, u32::MAX);
            let sim_agent = generate_one(profile, agent.id(), location_weights, time_weights, rng);
            generated.push((agent, sim_agent));
            index += 1;
        }
    }
    generated
}

fn generate_one(profile: &AgentProfile, agent_id: Id, location_weights: &[f64], time_weights: &[f64], rng: &mut RngStream) -> SimAgent {
    let preferred_time = rng.weighted_index(time_weights);
    let preferred_location = rng.weighted_index(location_weights);
    let budget_sensitivity = rng.uniform(profile.budget_sensitivity_range.0, profile.budget_sensitivity_range.1);
    let urgency = rng.uniform(profile.urgency_range.0, profile.urgency_range.1);
    let base_value = rng.uniform(profile.base_value_range.0, profile.base_value_range.1);

    SimAgent {
        agent_id,
        tier: profile.name.clone(),
        preferred_time,
        preferred_location,
        budget_sensitivity,
        urgency,
        base_value,
        bookings: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::config::AgentProfile;

    fn config() -> SimulationConfig {
        SimulationConfig {
            num_agents: 6,
            num_rooms: 1,
            slots_per_room_per_day: 1,
            max_days: 1,
            token_amount: 100,
            token_frequency_days: 7,
            start_price: 50.0,
            min_price: 5.0,
            price_step: 5.0,
            high_demand_day_ranges: vec![],
            agent_profiles: vec![AgentProfile {
                name: "only".into(),
                share: 1.0,
                urgency_range: (0.0, 1.0),
                budget_sensitivity_range: (0.0, 1.0),
                base_value_range: (10.0, 20.0),
            }],
            location_weights: vec![1.0, 1.0],
            time_weights: vec![1.0, 1.0, 1.0],
            seed: 5,
        }
    }

    #[test]
    fn generates_exactly_num_agents() {
        let mut rng = RngStream::new(5);
        let agents = generate(&config(), &mut rng);
        assert_eq!(agents.len(), 6);
    }

    #[test]
    fn same_seed_generates_identical_population() {
        let config = config();
        let mut rng_a = RngStream::new(5);
        let mut rng_b = RngStream::new(5);
        let a = generate(&config, &mut rng_a);
        let b = generate(&config, &mut rng_b);
        for ((_, sim_a), (_, sim_b)) in a.iter().zip(b.iter()) {
            assert_eq!(sim_a.preferred_time, sim_b.preferred_time);
            assert_eq!(sim_a.preferred_location, sim_b.preferred_location);
            assert!((sim_a.base_value - sim_b.base_value).abs() < 1e-12);
        }
    }
}
