//! Board representation and game-state types.
//!
//! Contains the entity model, the per-turn entity store, the factory
//! distance graph, and the order type.

pub mod entity;
pub mod graph;
pub mod order;
pub mod store;

pub use entity::{
    Bomb, Entity, EntityError, EntityId, EntityKind, EntityRecord, Factory, FactoryId, Owner,
    Troop, MAX_PRODUCTION, PENDING_TROOP_ID,
};
pub use graph::{DistanceGraph, GraphError, Link};
pub use order::Order;
pub use store::EntityStore;
