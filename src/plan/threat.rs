//! Defensive reservation against incoming enemy troops.
//!
//! Before any attack is planned, each friendly factory under attack holds
//! back whatever its own production will not cover by the time the enemy
//! troop lands. Threats are applied one after another in snapshot order, so
//! a second troop against the same factory sees the garrison already reduced
//! by the first.

use log::debug;

use crate::board::{EntityStore, Owner, Troop};

/// Reserves garrison on friendly factories targeted by enemy troops.
///
/// Returns the total number of cyborgs held back.
pub fn project_threats(store: &mut EntityStore) -> u32 {
    let threats: Vec<Troop> = store.troops_owned_by(Owner::Enemy).copied().collect();
    let mut reserved: u32 = 0;

    for troop in &threats {
        let factory = store.factory_mut(troop.target);
        if factory.owner != Owner::Me {
            continue;
        }

        let generated = factory.cyborgs_after_turns(troop.remaining_turns);
        if generated >= troop.cyborgs {
            continue;
        }

        let shortfall = troop.cyborgs - generated;
        let before = factory.cyborgs;
        factory.withdraw(shortfall);
        reserved = reserved.saturating_add(before - factory.cyborgs);
        debug!(
            "threat: troop {} ({} cyborgs, {} turns) on factory {}: reserve {}, garrison {} -> {}",
            troop.id, troop.cyborgs, troop.remaining_turns, factory.id, shortfall, before, factory.cyborgs
        );
    }

    reserved
}
