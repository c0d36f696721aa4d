//! Agent model: a market participant with a non-negative token balance.
//!
//! Unlike the overdraft-capable banks this crate's ledger idiom is grounded
//! on, agents here cannot go into debt: `debit` fails `InsufficientFunds`
//! rather than drawing on a credit line.

use super::Id;
use serde::{Deserialize, Serialize};

/// Dimension an [`AgentPreference`] is expressed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreferenceType {
    Location,
    Time,
}

/// A weighted preference an agent has for a location or time value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPreference {
    pub agent_id: Id,
    pub kind: PreferenceType,
    pub value: String,
    pub weight: f64,
}

impl AgentPreference {
    /// # Panics
    /// Panics if `weight` is outside `[0, 1]`.
    pub fn new(agent_id: Id, kind: PreferenceType, value: String, weight: f64) -> Self {
        assert!((0.0..=1.0).contains(&weight), "weight must be in [0, 1]");
        Self { agent_id, kind, value, weight }
    }
}

/// Optional behavior vector used by the simulator's rule-based bidding model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorVector {
    pub risk: f64,
    pub price_sensitivity: f64,
    pub flexibility: f64,
    pub preferred_days: Vec<u32>,
    pub preferred_hours: Vec<u32>,
}

/// A market participant.
///
/// # Example
/// ```
/// use campus_market_core::models::Agent;
///
/// let mut agent = Agent::new("ALICE".into(), 100, 3);
/// agent.debit(40).unwrap();
/// assert_eq!(agent.token_balance(), 60);
/// agent.credit(10);
/// assert_eq!(agent.token_balance(), 70);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    id: Id,
    name: String,
    token_balance: i64,
    active: bool,
    max_bookings: u32,
    behavior: Option<BehaviorVector>,
}

impl Agent {
    /// Create a new active agent with a non-negative opening balance.
    ///
    /// # Panics
    /// Panics if `initial_balance` is negative.
    pub fn new(name: String, initial_balance: i64, max_bookings: u32) -> Self {
        assert!(initial_balance >= 0, "initial_balance must be non-negative");
        Self {
            id: super::new_id(),
            name,
            token_balance: initial_balance,
            active: true,
            max_bookings,
            behavior: None,
        }
    }

    pub fn with_behavior(mut self, behavior: BehaviorVector) -> Self {
        self.behavior = Some(behavior);
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token_balance(&self) -> i64 {
        self.token_balance
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn max_bookings(&self) -> u32 {
        self.max_bookings
    }

    pub fn behavior(&self) -> Option<&BehaviorVector> {
        self.behavior.as_ref()
    }

    /// Whether the agent can afford `amount` given its current balance.
    pub fn can_pay(&self, amount: i64) -> bool {
        amount >= 0 && amount <= self.token_balance
    }

    /// Decrease the balance. Intentionally infallible-looking callers should
    /// check [`Agent::can_pay`] first; this still returns an error so a
    /// caller skipping the check fails safely rather than going negative.
    pub fn debit(&mut self, amount: i64) -> Result<(), crate::error::MarketError> {
        assert!(amount >= 0, "debit amount must be non-negative");
        if !self.can_pay(amount) {
            return Err(crate::error::MarketError::InsufficientFunds {
                required: amount,
                available: self.token_balance,
            });
        }
        self.token_balance -= amount;
        Ok(())
    }

    /// Increase the balance (refunds, token allocation, split reimbursement).
    pub fn credit(&mut self, amount: i64) {
        assert!(amount >= 0, "credit amount must be non-negative");
        self.token_balance += amount;
    }
}
