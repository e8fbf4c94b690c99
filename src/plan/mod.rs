//! Single-turn planning.
//!
//! `plan` is a pure function of the snapshot, the graph, and the policy: it
//! copies the store into a working set, reserves garrison against incoming
//! threats, runs the greedy allocator, and returns the turn's orders. Nothing
//! carries over between turns.

pub mod allocate;
pub mod sink;
pub mod threat;

pub use allocate::allocate;
pub use sink::OrderSink;
pub use threat::project_threats;

use log::info;

use crate::board::{DistanceGraph, EntityStore, Order};
use crate::config::PlannerConfig;

/// The outcome of planning one turn.
#[derive(Debug, Clone)]
pub struct TurnPlan {
    /// Orders to emit, never empty (`Wait` when nothing was committed).
    pub orders: Vec<Order>,
    /// The working store after planning: adjusted garrisons plus pending troops.
    pub working: EntityStore,
    /// Cyborgs held back by threat projection.
    pub reserved: u32,
}

/// Plans one turn and keeps the working state for inspection.
pub fn plan_turn(store: &EntityStore, graph: &DistanceGraph, config: &PlannerConfig) -> TurnPlan {
    let mut working = store.clone();
    let mut sink = OrderSink::new();

    let reserved = project_threats(&mut working);
    allocate(&mut working, graph, config, &mut sink);

    let committed = sink.len();
    let orders = sink.flush();
    info!(
        "planned {} orders ({} cyborgs reserved for defence)",
        committed, reserved
    );

    TurnPlan {
        orders,
        working,
        reserved,
    }
}

/// Plans one turn and returns only the orders.
pub fn plan(store: &EntityStore, graph: &DistanceGraph, config: &PlannerConfig) -> Vec<Order> {
    plan_turn(store, graph, config).orders
}
