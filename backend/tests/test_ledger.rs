//! Balance-conservation invariant: the transaction log always explains the
//! difference between an agent's current balance and its opening balance.

use campus_market_core::ledger;
use campus_market_core::models::{new_id, Agent, TransactionKind};
use campus_market_core::Store;

fn seeded_agent(store: &mut Store, opening: i64) -> campus_market_core::models::Id {
    let agent = Agent::new("A".into(), opening, 5);
    let id = agent.id();
    store.put_agent(agent);
    id
}

#[test]
fn a_sequence_of_debits_and_credits_reconciles_to_the_ledger_sum() {
    let mut store = Store::new();
    let agent_id = seeded_agent(&mut store, 200);
    let reference = new_id();

    ledger::debit(&mut store, agent_id, 50, TransactionKind::BidPayment, reference, 0).unwrap();
    ledger::credit(&mut store, agent_id, 20, TransactionKind::TokenAllocation, reference, 1).unwrap();
    ledger::debit(&mut store, agent_id, 30, TransactionKind::SplitPayment, reference, 2).unwrap();

    let balance = store.agent(agent_id).unwrap().token_balance();
    assert_eq!(balance, 140);
    assert_eq!(ledger::ledger_sum(&store, agent_id), balance - 200);
    assert_eq!(store.transactions_for_agent(agent_id).len(), 3);
}

#[test]
fn overdraft_is_rejected_and_leaves_no_transaction_row() {
    let mut store = Store::new();
    let agent_id = seeded_agent(&mut store, 10);

    let err = ledger::debit(&mut store, agent_id, 11, TransactionKind::BidPayment, new_id(), 0).unwrap_err();
    assert!(matches!(err, campus_market_core::MarketError::InsufficientFunds { required: 11, available: 10 }));
    assert_eq!(store.agent(agent_id).unwrap().token_balance(), 10);
    assert!(store.transactions_for_agent(agent_id).is_empty());
}

#[test]
fn debiting_an_unknown_agent_does_not_panic() {
    let mut store = Store::new();
    let err = ledger::debit(&mut store, new_id(), 5, TransactionKind::BidPayment, new_id(), 0).unwrap_err();
    assert!(matches!(err, campus_market_core::MarketError::NotFound(_)));
}
