//! Deterministic, seeded market simulator used for off-line policy search.
//!
//! Grounded on the teacher's `Simulator`/`TimeManager` pairing (a
//! self-contained state plus a stepping loop driven from outside), but the
//! stepping rules themselves (per-day tick loop, `should_bid` utility
//! model) are new — the teacher simulates payment settlement, not auctions.

pub mod agent;
pub mod config;
pub mod engine;
pub mod metrics;

pub use config::{AgentProfile, GridSearchConfig, SimulationConfig};
pub use engine::{DailyDetail, SimulationEngine, SimulationResults};
pub use metrics::StabilityMetrics;
