//! Engine state management.
//!
//! Holds the distance graph for the current game, the per-turn entity store,
//! and the planner policy, and runs one planning pass per turn.

use std::io::{self, Write};

use log::{debug, info};
use thiserror::Error;

use crate::board::{DistanceGraph, EntityError, EntityKind, EntityRecord, EntityStore, GraphError, Order};
use crate::config::{ConfigError, PlannerConfig};
use crate::plan::plan;
use crate::protocol::input::{InitialInput, InputError};
use crate::protocol::output::write_orders;

/// Any failure the engine can report to the game loop.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("invalid map: {0}")]
    Graph(#[from] GraphError),

    #[error("invalid snapshot: {0}")]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write orders: {0}")]
    Output(#[from] io::Error),
}

/// The decision engine for one game.
#[derive(Debug)]
pub struct Engine {
    graph: DistanceGraph,
    store: EntityStore,
    config: PlannerConfig,
    turn: u32,
}

impl Engine {
    /// Builds the engine from the map description.
    pub fn new(initial: &InitialInput, config: PlannerConfig) -> Result<Self, EngineError> {
        let graph = DistanceGraph::new(initial.factory_count, &initial.links)?;
        info!(
            "map loaded: {} factories, {} links",
            initial.factory_count,
            initial.links.len()
        );
        Ok(Engine {
            store: EntityStore::with_factory_capacity(graph.factory_count()),
            graph,
            config,
            turn: 0,
        })
    }

    pub fn graph(&self) -> &DistanceGraph {
        &self.graph
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Number of turns planned so far.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Overrides one planner option by name.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), EngineError> {
        self.config.set_option(name, value)?;
        Ok(())
    }

    /// Rebuilds the store from a snapshot and plans the turn.
    pub fn handle_turn(&mut self, records: &[EntityRecord]) -> Result<Vec<Order>, EngineError> {
        self.store.rebuild(records)?;
        self.turn += 1;
        debug!(
            "turn {}: {} factories, {} troops, {} bombs",
            self.turn,
            self.store.len(EntityKind::Factory),
            self.store.len(EntityKind::Troop),
            self.store.len(EntityKind::Bomb)
        );
        Ok(plan(&self.store, &self.graph, &self.config))
    }

    /// Plans the turn and writes the resulting command line to `out`.
    pub fn play_turn<W: Write>(&mut self, records: &[EntityRecord], out: &mut W) -> Result<(), EngineError> {
        let orders = self.handle_turn(records)?;
        write_orders(out, &orders)?;
        Ok(())
    }
}
