//! Deterministic random number generation.
//!
//! Uses xorshift64* for fast, deterministic random draws. CRITICAL: all
//! randomness in the pricing engine and simulator MUST go through this
//! module, and every function that draws randomness must take a `&mut
//! RngStream` rather than reaching for a process-global source.

mod xorshift;

pub use xorshift::RngStream;
