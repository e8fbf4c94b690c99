//! Greedy attack and upgrade allocation.
//!
//! Walks friendly factories in id order. Each one first attacks every
//! unclaimed, reachable, affordable target (in id order), then spends what is
//! left on a production upgrade. Commits are strictly sequential: a factory's
//! garrison is reduced as soon as an order is committed, and each attack
//! claims its target through a pending troop so later factories skip it.

use log::debug;

use crate::board::{DistanceGraph, EntityStore, FactoryId, Owner, Troop};
use crate::config::PlannerConfig;

use super::sink::OrderSink;

/// Runs the allocation pass over a threat-adjusted working store.
///
/// Friendly garrisons in `store` are reduced as orders are committed, and a
/// pending troop is inserted for every attack.
pub fn allocate(
    store: &mut EntityStore,
    graph: &DistanceGraph,
    config: &PlannerConfig,
    sink: &mut OrderSink,
) {
    let friendly: Vec<FactoryId> = store.factories_owned_by(Owner::Me).map(|f| f.id).collect();
    let targets: Vec<FactoryId> = store
        .factories_not_owned_by(Owner::Me)
        .filter(|f| f.production >= config.min_target_production)
        .map(|f| f.id)
        .collect();

    for &source in &friendly {
        attack_from(source, &targets, store, graph, config, sink);
        upgrade(source, store, config, sink);
    }
}

fn attack_from(
    source: FactoryId,
    targets: &[FactoryId],
    store: &mut EntityStore,
    graph: &DistanceGraph,
    config: &PlannerConfig,
    sink: &mut OrderSink,
) {
    let mut launched = 0;

    for &target in targets {
        if config.max_attacks_per_factory.is_some_and(|cap| launched >= cap) {
            break;
        }
        if is_claimed(store, target) {
            continue;
        }
        let Some(distance) = graph.distance(source, target) else {
            continue;
        };

        let projected = store
            .factory(target)
            .cyborgs_after_turns(distance.saturating_add(config.arrival_lookahead));
        let required = projected.saturating_add(config.capture_margin);

        let garrison = store.factory(source).cyborgs;
        if required > garrison {
            continue;
        }

        store.factory_mut(source).withdraw(required);
        sink.attack(source, target, required);
        store.push_troop(Troop::pending(source, target, required, distance));
        launched += 1;
        debug!(
            "attack: {} -> {} with {} (distance {}, garrison {} -> {})",
            source,
            target,
            required,
            distance,
            garrison,
            garrison - required
        );
    }
}

fn upgrade(source: FactoryId, store: &mut EntityStore, config: &PlannerConfig, sink: &mut OrderSink) {
    let factory = store.factory_mut(source);
    if !factory.can_upgrade(config.max_production) || factory.cyborgs < config.upgrade_cost {
        return;
    }
    factory.withdraw(config.upgrade_cost);
    sink.inc(source);
    debug!(
        "upgrade: factory {} to production {}, garrison left {}",
        source,
        factory.production + 1,
        factory.cyborgs
    );
}

/// A target is claimed once any friendly troop, real or pending, is headed there.
fn is_claimed(store: &EntityStore, target: FactoryId) -> bool {
    store.troops_owned_by(Owner::Me).any(|t| t.target == target)
}
