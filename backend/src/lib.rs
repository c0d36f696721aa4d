//! Campus Market Core - Rust Engine
//!
//! A token-economy marketplace that allocates study rooms through periodic
//! Dutch auctions, plus a deterministic offline simulator used to grid-search
//! allocation policies.
//!
//! # Architecture
//!
//! - **clock**: Logical "current time" shared by every read path.
//! - **rng**: Deterministic random number generation for the simulator.
//! - **models**: Domain types (Resource, TimeSlot, Auction, Bid, Agent, Booking, ...).
//! - **store**: In-memory, id-indexed persistence for all entities.
//! - **ledger**: Token accounting with an append-only transaction log.
//! - **catalogue**: Resource/slot lifecycle and CSV ingest.
//! - **pricing**: Periodic repricing of future auctions from demand signals.
//! - **auction**: The Dutch auction state machine.
//! - **matcher**: Standing limit orders that cross a descending price.
//! - **booking**: Settlement of winning bids into bookings, sell-back, split.
//! - **simulator**: Deterministic seeded market simulation.
//! - **gridsearch**: Parallel parameter sweep over simulator configs.
//! - **market**: Facade binding the above into the operations an embedding
//!   application (HTTP layer, CLI, test) calls.
//!
//! # Critical invariants
//!
//! 1. All money values are `i64` (cents).
//! 2. All simulator randomness is deterministic (seeded RNG, single stream).
//! 3. A slot never has two ACCEPTED bids; a resource never exceeds capacity.

pub mod auction;
pub mod booking;
pub mod catalogue;
pub mod clock;
pub mod error;
pub mod gridsearch;
pub mod ledger;
pub mod market;
pub mod matcher;
pub mod models;
pub mod pricing;
pub mod rng;
pub mod simulator;
pub mod store;

pub use clock::Clock;
pub use error::{MarketError, MarketResult};
pub use market::Market;
pub use rng::RngStream;
pub use store::Store;
