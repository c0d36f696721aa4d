//! Token accounting: balances plus an append-only transaction log.
//!
//! Grounded on the teacher's `try_settle` pattern (debit sender, credit
//! receiver, write a ledger row, all in one call) but generalized from a
//! two-party payment to the marketplace's single-agent debits/credits, and
//! restricted to non-negative balances.

use crate::error::MarketResult;
use crate::models::{Id, Transaction, TransactionKind};
use crate::store::Store;

/// Debit `agent_id` by `amount` and append a matching [`Transaction`] row,
/// or fail `InsufficientFunds` with no state change.
pub fn debit(
    store: &mut Store,
    agent_id: Id,
    amount: i64,
    kind: TransactionKind,
    reference: Id,
    now: i64,
) -> MarketResult<()> {
    let agent = store.get_agent_or(agent_id)?;
    if !agent.can_pay(amount) {
        return Err(crate::error::MarketError::InsufficientFunds {
            required: amount,
            available: agent.token_balance(),
        });
    }
    store.agent_mut(agent_id).expect("checked above").debit(amount)?;
    store.put_transaction(Transaction::new(agent_id, -amount, kind, reference, now));
    Ok(())
}

/// Credit `agent_id` by `amount` and append a matching [`Transaction`] row.
pub fn credit(
    store: &mut Store,
    agent_id: Id,
    amount: i64,
    kind: TransactionKind,
    reference: Id,
    now: i64,
) -> MarketResult<()> {
    let agent = store.get_agent_or(agent_id)?;
    let _ = agent;
    store.agent_mut(agent_id).expect("checked above").credit(amount);
    store.put_transaction(Transaction::new(agent_id, amount, kind, reference, now));
    Ok(())
}

/// Sum of an agent's transaction log, which by construction always equals
/// `balance - initial_seed` (§8's balance-conservation invariant).
pub fn ledger_sum(store: &Store, agent_id: Id) -> i64 {
    store.transactions_for_agent(agent_id).iter().map(|t| t.amount()).sum()
}
