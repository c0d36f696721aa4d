//! Per-day simulation loop: tokens, auction creation, bidding, ticking.

use crate::clock::Clock;
use crate::error::MarketResult;
use crate::models::{Agent, AuctionParams, AuctionStatus, Id, TransactionKind};
use crate::rng::RngStream;
use crate::simulator::agent::{self, SimAgent};
use crate::simulator::config::SimulationConfig;
use crate::simulator::metrics::{self, BookingOutcome, RunTally, StabilityMetrics};
use crate::store::Store;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One day's summary, reported in the grid-search/simulate CLI output.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DailyDetail {
    pub day: u32,
    pub auctions_offered: u32,
    pub bookings_made: u32,
    pub unmet_demand: u32,
}

/// The full outcome of one `simulate_semester` / `run_single` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResults {
    pub metrics: StabilityMetrics,
    pub daily_detail: Vec<DailyDetail>,
}

struct AuctionSlot {
    room: usize,
    time_index: usize,
    auction_id: Id,
}

/// Deterministic, seeded simulation of one semester's worth of auction days.
pub struct SimulationEngine {
    config: SimulationConfig,
    store: Store,
    rng: RngStream,
    clock: Clock,
    sim_agents: Vec<SimAgent>,
    room_resource_ids: Vec<Id>,
    day: u32,
    daily_detail: Vec<DailyDetail>,
    tally: RunTally,
}

impl SimulationEngine {
    /// Build a fresh engine: generates the agent population and `num_rooms`
    /// backing resources, seeded entirely from `config.seed`.
    pub fn new(config: SimulationConfig) -> Self {
        let mut store = Store::new();
        let mut rng = RngStream::new(config.seed);

        let generated = agent::generate(&config, &mut rng);
        let num_agents = generated.len() as u32;
        let mut sim_agents = Vec::with_capacity(generated.len());
        for (agent, sim_agent) in generated {
            sim_agents.push(sim_agent);
            store.put_agent(agent);
        }

        let mut room_resource_ids = Vec::with_capacity(config.num_rooms as usize);
        for room in 0..config.num_rooms {
            let resource = crate::models::Resource::new(format!("Room {room}"), format!("Location {room}"), 1);
            room_resource_ids.push(resource.id());
            store.put_resource(resource);
        }

        Self {
            tally: RunTally { num_agents, bookings_per_agent: vec![0; num_agents as usize], ..Default::default() },
            config,
            store,
            rng,
            clock: Clock::new(),
            sim_agents,
            room_resource_ids,
            day: 0,
            daily_detail: Vec::new(),
        }
    }

    pub fn advance_hour(&mut self) {
        self.clock.advance_hour();
    }

    pub fn advance_day(&mut self) {
        self.clock.advance_day();
        self.day += 1;
    }

    pub fn reset_time(&mut self) {
        self.clock.reset();
        self.day = 0;
    }

    /// Grant `token_amount` to every agent. Called automatically by
    /// `run_round` on allocation days, but exposed for manual driving too.
    pub fn allocate_tokens(&mut self) -> MarketResult<()> {
        let agent_ids: Vec<Id> = self.sim_agents.iter().map(|a| a.agent_id).collect();
        for agent_id in agent_ids {
            crate::ledger::credit(
                &mut self.store,
                agent_id,
                self.config.token_amount,
                TransactionKind::TokenAllocation,
                agent_id,
                self.clock.now(),
            )?;
        }
        Ok(())
    }

    /// Run one full day: token allocation (if due), auction creation, and
    /// the tick/bid loop until every auction is COMPLETED or the tick
    /// budget runs out.
    pub fn run_round(&mut self) -> MarketResult<DailyDetail> {
        if self.config.token_frequency_days > 0 && self.day as i64 % self.config.token_frequency_days == 0 {
            self.allocate_tokens()?;
        }

        let high_demand = self.config.is_high_demand_day(self.day);
        let slots = self.create_day_auctions()?;
        let auctions_offered = slots.len() as u32;
        self.tally.slots_offered += auctions_offered;

        let max_ticks = ((self.config.start_price - self.config.min_price) / self.config.price_step).ceil() as u32 + 4;
        let mut remaining: Vec<AuctionSlot> = slots;

        for _tick in 0..max_ticks.max(1) {
            remaining.retain(|s| {
                self.store.auction(s.auction_id).map(|a| a.status() == AuctionStatus::Active).unwrap_or(false)
            });
            if remaining.is_empty() {
                break;
            }

            let mut shuffled_agent_indices: Vec<usize> = (0..self.sim_agents.len()).collect();
            self.rng.shuffle(&mut shuffled_agent_indices);

            for agent_index in shuffled_agent_indices {
                self.try_bid_one_agent(agent_index, &remaining, high_demand)?;
            }

            remaining.retain(|s| {
                self.store.auction(s.auction_id).map(|a| a.status() == AuctionStatus::Active).unwrap_or(false)
            });
            if remaining.is_empty() {
                break;
            }
            self.advance_hour();
            for slot in &remaining {
                crate::auction::tick(&mut self.store, slot.auction_id, self.clock.now())?;
            }
        }

        let bookings_made = auctions_offered - remaining.len() as u32;
        let unmet_demand = remaining.len() as u32;
        let detail = DailyDetail { day: self.day, auctions_offered, bookings_made, unmet_demand };
        info!(day = self.day, auctions_offered, bookings_made, unmet_demand, "day complete");
        self.daily_detail.push(detail);
        self.advance_day();
        Ok(detail)
    }

    fn create_day_auctions(&mut self) -> MarketResult<Vec<AuctionSlot>> {
        let mut slots = Vec::with_capacity((self.config.num_rooms * self.config.slots_per_room_per_day) as usize);
        let day_start = self.clock.now();
        for (room, resource_id) in self.room_resource_ids.clone().into_iter().enumerate() {
            for time_index in 0..self.config.slots_per_room_per_day {
                let start = day_start + time_index as i64 * 3_600;
                let slot = crate::models::TimeSlot::new(resource_id, start, start + 1_800);
                let slot_id = slot.id();
                self.store.put_slot(slot);
                let auction_id = crate::auction::create(
                    &mut self.store,
                    slot_id,
                    day_start,
                    AuctionParams {
                        start_price: self.config.start_price,
                        min_price: self.config.min_price,
                        price_step: self.config.price_step,
                        tick_interval: 1,
                    },
                )?;
                crate::auction::start(&mut self.store, auction_id, day_start)?;
                slots.push(AuctionSlot { room, time_index: time_index as usize, auction_id });
            }
        }
        Ok(slots)
    }

    fn try_bid_one_agent(&mut self, agent_index: usize, remaining: &[AuctionSlot], high_demand: bool) -> MarketResult<()> {
        let agent_id = self.sim_agents[agent_index].agent_id;
        let balance = match self.store.agent(agent_id) {
            Some(a) => a.token_balance(),
            None => return Ok(()),
        };

        let mut sorted: Vec<&AuctionSlot> = remaining.iter().collect();
        sorted.sort_by_key(|s| (s.room, s.time_index));

        for slot in sorted {
            let auction = match self.store.auction(slot.auction_id) {
                Some(a) if a.status() == AuctionStatus::Active => a,
                _ => continue,
            };
            let current_price = auction.current_price();
            if current_price > balance as f64 {
                continue;
            }
            if self.should_bid(agent_index, slot, current_price, high_demand) {
                let wtp = self.willingness_to_pay(agent_index, slot, high_demand);
                let outcome_price = current_price;
                if crate::auction::place_bid(&mut self.store, slot.auction_id, agent_id, current_price.ceil() as i64, self.clock.now())
                    .is_ok()
                {
                    self.sim_agents[agent_index].bookings += 1;
                    self.tally.bookings_per_agent[agent_index] += 1;
                    let sim_agent = &self.sim_agents[agent_index];
                    self.tally.outcomes.push(BookingOutcome {
                        matched_location: sim_agent.preferred_location == slot.room,
                        matched_time: sim_agent.preferred_time == slot.time_index,
                        willingness_to_pay: wtp,
                        price_paid: outcome_price,
                    });
                    if let Some(auction) = self.store.auction(slot.auction_id) {
                        if let Some(clearing) = auction.clearing_price() {
                            self.tally.clearing_prices.push(clearing);
                        }
                    }
                }
                self.tally.bids_attempted += 1;
                return Ok(());
            }
        }
        Ok(())
    }

    fn willingness_to_pay(&self, agent_index: usize, slot: &AuctionSlot, high_demand: bool) -> f64 {
        let sim_agent = &self.sim_agents[agent_index];
        let loc_mult = if sim_agent.preferred_location == slot.room { 1.0 } else { 0.5 };
        let time_mult = if sim_agent.preferred_time == slot.time_index { 1.0 } else { 0.6 };
        let urg_mult = 0.7 + 0.6 * sim_agent.urgency;
        let hd_mult = if high_demand { 1.4 } else { 1.0 };
        let need_mult = (1.5 - 0.1 * sim_agent.bookings as f64).max(1.0);
        sim_agent.base_value * loc_mult * time_mult * urg_mult * hd_mult * need_mult
    }

    fn should_bid(&self, agent_index: usize, slot: &AuctionSlot, current_price: f64, high_demand: bool) -> bool {
        let sim_agent = &self.sim_agents[agent_index];
        let wtp = self.willingness_to_pay(agent_index, slot, high_demand);
        let threshold = wtp * (1.0 - 0.5 * sim_agent.budget_sensitivity);
        let balance = self.store.agent(sim_agent.agent_id).map(|a| a.token_balance()).unwrap_or(0);
        current_price <= threshold && balance as f64 >= current_price
    }

    /// Fold every tally collected so far into a final scorecard.
    pub fn results(&self) -> SimulationResults {
        SimulationResults { metrics: metrics::compute(&self.tally), daily_detail: self.daily_detail.clone() }
    }

    /// Re-seed the engine from scratch with the same config: fresh agents,
    /// fresh rooms, fresh store, day counter back to zero.
    pub fn reset_simulation(&mut self) {
        *self = Self::new(self.config.clone());
    }

    /// Run `weeks * 7` days (capped at `config.max_days`) and return the
    /// accumulated results.
    pub fn simulate_semester(&mut self, weeks: u32) -> MarketResult<SimulationResults> {
        let total_days = (weeks * 7).min(self.config.max_days);
        for _ in 0..total_days {
            self.run_round()?;
        }
        Ok(self.results())
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.store.agents()
    }
}
