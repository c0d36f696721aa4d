//! `Market`: the façade binding Store + Clock + AdminConfig + engines into
//! the plain-method operation set an embedding application calls (§6).
//!
//! Grounded on the teacher's top-level `Simulator` struct, which plays the
//! same "one object holds everything, methods are the public API" role for
//! the payment domain.

use crate::auction;
use crate::booking;
use crate::catalogue::{self, IngestReport};
use crate::clock::Clock;
use crate::error::MarketResult;
use crate::gridsearch::{self, GridSearchReport};
use crate::ledger;
use crate::matcher;
use crate::models::{
    Agent, AgentPreference, AuctionParams, AuctionStatus, Booking, GroupBidMember, Id, LimitOrder, PricePoint,
    Transaction, TransactionKind,
};
use crate::models::{AdminConfig, Auction};
use crate::pricing;
use crate::rng::RngStream;
use crate::simulator::config::SimulationConfig;
use crate::simulator::engine::{DailyDetail, SimulationEngine, SimulationResults};
use crate::store::Store;

/// Filter accepted by [`Market::list_auctions`].
#[derive(Debug, Clone, Default)]
pub struct AuctionFilter {
    pub status: Option<AuctionStatus>,
}

/// A snapshot of overall market activity, for dashboards/tests.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MarketState {
    pub total_resources: usize,
    pub total_slots: usize,
    pub active_auctions: usize,
    pub active_bookings: usize,
    pub pricing_model_version: u64,
    pub now: i64,
}

/// The marketplace facade: everything an embedding application needs, with
/// no HTTP, CLI, or storage concerns baked in.
pub struct Market {
    store: Store,
    clock: Clock,
    config: AdminConfig,
    rng: RngStream,
    simulator: Option<SimulationEngine>,
}

impl Market {
    pub fn new(seed: u64) -> Self {
        Self {
            store: Store::new(),
            clock: Clock::new(),
            config: AdminConfig::default(),
            rng: RngStream::new(seed),
            simulator: None,
        }
    }

    // ---- Admin ----------------------------------------------------------

    pub fn get_config(&self) -> &AdminConfig {
        &self.config
    }

    /// Apply a patch closure to the config and bump `pricing_model_version`.
    /// The sole admitted writer to `AdminConfig` (§7 ambient addition).
    pub fn update_config(&mut self, patch: impl FnOnce(&mut AdminConfig)) {
        patch(&mut self.config);
        self.config.pricing_model_version += 1;
    }

    pub fn import_resources(&mut self, csv: &str) -> MarketResult<IngestReport> {
        let rows = catalogue::parse_csv(csv)?;
        Ok(catalogue::import_resources(&mut self.store, &mut self.config, &rows))
    }

    /// Reset the clock and config to their canonical defaults. Does not
    /// touch the catalogue — callers that want a fully clean market should
    /// also construct a fresh `Market`.
    pub fn reset_and_reload_defaults(&mut self) {
        self.clock.reset();
        self.config = AdminConfig::default();
    }

    // ---- Market -----------------------------------------------------------

    pub fn list_auctions(&self, filter: &AuctionFilter) -> Vec<&Auction> {
        self.store
            .auctions()
            .filter(|a| filter.status.map(|s| a.status() == s).unwrap_or(true))
            .collect()
    }

    pub fn get_auction(&self, id: Id) -> MarketResult<&Auction> {
        self.store.get_auction_or(id)
    }

    pub fn start_auction(&mut self, id: Id) -> MarketResult<()> {
        auction::start(&mut self.store, id, self.clock.now())
    }

    pub fn tick_auction(&mut self, id: Id) -> MarketResult<()> {
        auction::tick(&mut self.store, id, self.clock.now())
    }

    pub fn place_bid(&mut self, auction_id: Id, agent_id: Id, amount: i64) -> MarketResult<Id> {
        auction::place_bid(&mut self.store, auction_id, agent_id, amount, self.clock.now())
    }

    pub fn place_group_bid(&mut self, auction_id: Id, leader_id: Id, members: Vec<GroupBidMember>) -> MarketResult<Id> {
        auction::place_group_bid(&mut self.store, auction_id, leader_id, members, self.clock.now())
    }

    pub fn create_limit_order(&mut self, auction_id: Id, max_price: f64, agent_id: Id) -> MarketResult<Id> {
        let slot_id = self.store.get_auction_or(auction_id)?.slot_id();
        let order = LimitOrder::new(agent_id, slot_id, max_price, self.clock.now());
        let order_id = order.id();
        self.store.put_limit_order(order);
        matcher::match_slot(&mut self.store, slot_id, self.clock.now())?;
        Ok(order_id)
    }

    pub fn cancel_limit_order(&mut self, id: Id) -> MarketResult<()> {
        let order = self.store.get_limit_order_or(id)?;
        if order.is_terminal() {
            return Err(crate::error::MarketError::StateInvalid(format!("limit order {id} is already terminal")));
        }
        self.store.limit_order_mut(id).expect("checked above").mark_cancelled();
        Ok(())
    }

    pub fn get_price_history(&self, auction_id: Id) -> MarketResult<&[PricePoint]> {
        Ok(self.store.get_auction_or(auction_id)?.price_history())
    }

    pub fn market_state(&self) -> MarketState {
        MarketState {
            total_resources: self.store.resources().count(),
            total_slots: self.store.slots().count(),
            active_auctions: self.store.auctions().filter(|a| a.status() == AuctionStatus::Active).count(),
            active_bookings: self.store.bookings().filter(|b| b.is_active()).count(),
            pricing_model_version: self.config.pricing_model_version,
            now: self.clock.now(),
        }
    }

    /// Run the pricing engine over the catalogue's horizon.
    pub fn reprice(&mut self, horizon_days: i64) {
        pricing::reprice(&mut self.store, &mut self.config, &mut self.rng, self.clock.now(), horizon_days);
    }

    // ---- Agents -----------------------------------------------------------

    pub fn create_agent(&mut self, name: String, initial_balance: i64, max_bookings: u32) -> Id {
        let agent = Agent::new(name, initial_balance, max_bookings);
        let id = agent.id();
        self.store.put_agent(agent);
        id
    }

    pub fn get_agent(&self, id: Id) -> MarketResult<&Agent> {
        self.store.get_agent_or(id)
    }

    pub fn update_agent(&mut self, id: Id, patch: impl FnOnce(&mut Agent)) -> MarketResult<()> {
        let agent = self.store.agent_mut(id).ok_or_else(|| crate::error::MarketError::NotFound(format!("agent {id}")))?;
        patch(agent);
        Ok(())
    }

    pub fn delete_agent(&mut self, id: Id) -> MarketResult<()> {
        self.store.get_agent_or(id)?;
        self.store.agent_mut(id).expect("checked above").set_active(false);
        Ok(())
    }

    /// Create `count` agents named `"{prefix}-{n}"`, optionally generating a
    /// location/time preference pair for each from `config`'s popularity
    /// maps (uniform weight `1.0` — callers refine weights after).
    pub fn bulk_create(
        &mut self,
        count: u32,
        prefix: &str,
        initial_balance: i64,
        max_bookings: u32,
        generate_preferences: bool,
    ) -> Vec<Id> {
        let mut ids = Vec::with_capacity(count as usize);
        for n in 0..count {
            let agent = Agent::new(format!("{prefix}-{n}"), initial_balance, max_bookings);
            let agent_id = agent.id();
            self.store.put_agent(agent);
            ids.push(agent_id);
            if generate_preferences {
                if let Some((location, _)) = self.config.location_popularity.iter().next() {
                    self.store.set_preferences(
                        agent_id,
                        vec![AgentPreference::new(
                            agent_id,
                            crate::models::PreferenceType::Location,
                            location.clone(),
                            1.0,
                        )],
                    );
                }
            }
        }
        ids
    }

    pub fn get_preferences(&self, agent_id: Id) -> Vec<&AgentPreference> {
        self.store.preferences_for_agent(agent_id)
    }

    pub fn set_preferences(&mut self, agent_id: Id, prefs: Vec<AgentPreference>) {
        self.store.set_preferences(agent_id, prefs);
    }

    pub fn list_bookings(&self, agent_id: Id) -> Vec<&Booking> {
        self.store.active_bookings_for_agent(agent_id)
    }

    pub fn list_transactions(&self, agent_id: Id) -> Vec<&Transaction> {
        self.store.transactions_for_agent(agent_id)
    }

    pub fn list_limit_orders(&self, agent_id: Id) -> Vec<&LimitOrder> {
        self.store.limit_orders_for_agent(agent_id)
    }

    pub fn allocate_tokens(&mut self, amount: i64) -> MarketResult<()> {
        let agent_ids: Vec<Id> = self.store.agents().map(|a| a.id()).collect();
        for agent_id in agent_ids {
            ledger::credit(&mut self.store, agent_id, amount, TransactionKind::TokenAllocation, agent_id, self.clock.now())?;
        }
        Ok(())
    }

    // ---- Booking ------------------------------------------------------

    pub fn accept_split(&mut self, booking_id: Id, partner_id: Id) -> MarketResult<()> {
        booking::accept_split(&mut self.store, booking_id, partner_id, self.clock.now())
    }

    pub fn reject_split(&mut self, booking_id: Id, partner_id: Id) -> MarketResult<()> {
        booking::reject_split(&mut self.store, booking_id, partner_id)
    }

    pub fn sell_back(&mut self, booking_id: Id, owner_id: Id) -> MarketResult<Id> {
        booking::sellback(&mut self.store, booking_id, owner_id, self.clock.now())
    }

    // ---- Simulation (wall-clock driving of this Market's own store) ----

    pub fn advance_hour(&mut self) {
        self.clock.advance_hour();
    }

    pub fn advance_day(&mut self) {
        self.clock.advance_day();
    }

    pub fn reset_time(&mut self) {
        self.clock.reset();
    }

    /// Run one scheduler pass over every ACTIVE auction whose tick is due.
    pub fn run_round(&mut self) -> MarketResult<()> {
        let due: Vec<Id> = self
            .store
            .auctions()
            .filter(|a| a.status() == AuctionStatus::Active && a.tick_due(self.clock.now()))
            .map(|a| a.id())
            .collect();
        for auction_id in due {
            auction::tick(&mut self.store, auction_id, self.clock.now())?;
        }
        Ok(())
    }

    pub fn reset_simulation(&mut self) {
        self.store = Store::new();
        self.reset_and_reload_defaults();
    }

    /// Create a new auction for `slot_id` at the given Dutch parameters and
    /// immediately start it — a convenience used by callers building their
    /// own scheduling loop on top of `Market` rather than the dedicated
    /// `SimulationEngine`.
    pub fn create_and_start_auction(&mut self, slot_id: Id, params: AuctionParams) -> MarketResult<Id> {
        let auction_id = auction::create(&mut self.store, slot_id, self.clock.now(), params)?;
        auction::start(&mut self.store, auction_id, self.clock.now())?;
        Ok(auction_id)
    }

    /// Run a self-contained deterministic simulation via [`SimulationEngine`]
    /// (independent of this `Market`'s own store), returning its scorecard.
    pub fn simulate_semester(&mut self, config: SimulationConfig, weeks: u32) -> MarketResult<SimulationResults> {
        let mut engine = SimulationEngine::new(config);
        let results = engine.simulate_semester(weeks)?;
        self.simulator = Some(engine);
        Ok(results)
    }

    pub fn simulation_results(&self) -> Option<SimulationResults> {
        self.simulator.as_ref().map(|engine| engine.results())
    }

    // ---- Grid search ----------------------------------------------------

    pub fn run_single(&self, config: &SimulationConfig) -> MarketResult<(crate::simulator::metrics::StabilityMetrics, Vec<DailyDetail>)> {
        gridsearch::run_single(config)
    }

    pub fn start_grid_search(
        &self,
        config: &crate::simulator::config::GridSearchConfig,
    ) -> MarketResult<GridSearchReport> {
        gridsearch::grid_search_to_completion(config)
    }
}
