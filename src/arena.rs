//! Self-play arena.
//!
//! Simulates complete games between two bots on randomly generated,
//! point-symmetric maps. Each bot only sees the per-turn snapshot in the
//! same record shape the referee sends, with ownership relative to itself.
//! Used to regression-test the planner and to tune its constants.
//!
//! Turn resolution:
//! 1. troops in flight advance one turn, sabotage timers tick down;
//! 2. both players' orders execute (moves clamp to the available garrison,
//!    upgrades need the full cost);
//! 3. active owned factories produce;
//! 4. troops that arrived fight: opposing arrivals cancel first, then the
//!    survivors reinforce or assault the garrison, taking the factory if the
//!    garrison is exceeded.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Instant;

use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{
    DistanceGraph, EntityError, EntityRecord, EntityStore, FactoryId, Link, Order, Owner,
    MAX_PRODUCTION,
};
use crate::config::PlannerConfig;
use crate::engine::{Engine, EngineError};
use crate::protocol::input::InitialInput;

/// Map width in simulator units.
const MAP_WIDTH: f64 = 16000.0;
/// Map height in simulator units.
const MAP_HEIGHT: f64 = 6500.0;
/// Minimum spacing between generated factories.
const MIN_SPACING: f64 = 1800.0;
/// Simulator units covered by a troop in one turn.
const UNITS_PER_TURN: f64 = 800.0;
/// Cost of a production upgrade on the simulated board.
const UPGRADE_COST: u32 = 10;

/// Errors raised while running arena games.
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("arena worker thread panicked")]
    WorkerPanicked,
}

/// One of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::One, Side::Two];

    pub const fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }
}

/// Which decision procedure controls a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BotKind {
    /// The greedy planner, driven through `Engine`.
    Greedy,
    /// Random moves from random owned factories.
    Random,
    /// Always waits.
    Idle,
}

impl BotKind {
    pub const fn name(self) -> &'static str {
        match self {
            BotKind::Greedy => "greedy",
            BotKind::Random => "random",
            BotKind::Idle => "idle",
        }
    }

    pub fn from_name(s: &str) -> Option<BotKind> {
        match s {
            "greedy" => Some(BotKind::Greedy),
            "random" => Some(BotKind::Random),
            "idle" => Some(BotKind::Idle),
            _ => None,
        }
    }
}

/// Configuration for a batch of arena games.
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Turn limit; the side with more cyborgs wins when it is reached.
    pub max_turns: u32,
    /// Smallest map size (rounded up to an odd count).
    pub min_factories: usize,
    /// Largest map size (rounded down to an odd count).
    pub max_factories: usize,
    /// Number of parallel threads.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Suppress per-game progress logging.
    pub quiet: bool,
    pub player_one: BotKind,
    pub player_two: BotKind,
    /// Policy used by greedy bots.
    pub planner: PlannerConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        ArenaConfig {
            num_games: 10,
            max_turns: 200,
            min_factories: 7,
            max_factories: 15,
            threads: 4,
            seed: 0,
            quiet: false,
            player_one: BotKind::Greedy,
            player_two: BotKind::Random,
            planner: PlannerConfig::default(),
        }
    }
}

/// A factory on the simulated board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaFactory {
    pub owner: Option<Side>,
    pub cyborgs: u32,
    pub production: u8,
    pub disabled: u32,
}

/// A troop on the simulated board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaTroop {
    pub id: i32,
    pub owner: Side,
    pub source: FactoryId,
    pub target: FactoryId,
    pub cyborgs: u32,
    pub remaining_turns: u32,
}

/// A generated map: starting factories plus the full link list.
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaMap {
    pub factories: Vec<ArenaFactory>,
    pub links: Vec<Link>,
}

impl ArenaMap {
    /// The map description as the referee would send it.
    pub fn initial_input(&self) -> InitialInput {
        InitialInput {
            factory_count: self.factories.len(),
            links: self.links.clone(),
        }
    }
}

/// Generates a point-symmetric map.
///
/// Factory 0 is a neutral, non-producing centre. The rest come in mirrored
/// pairs `(2k-1, 2k)` with equal production and garrison; player one starts
/// on factory 1 and player two on factory 2. Every pair of factories is linked.
pub fn generate_map(rng: &mut SmallRng, min_factories: usize, max_factories: usize) -> ArenaMap {
    let count = odd_count(rng, min_factories, max_factories);
    let centre = (MAP_WIDTH / 2.0, MAP_HEIGHT / 2.0);
    let mut positions = vec![centre];
    let mut factories = vec![ArenaFactory {
        owner: None,
        cyborgs: 0,
        production: 0,
        disabled: 0,
    }];

    while positions.len() < count {
        let mut point = random_point(rng);
        for _ in 0..100 {
            if positions.iter().all(|p| spacing(*p, point) >= MIN_SPACING)
                && spacing(point, mirror(point)) >= MIN_SPACING
            {
                break;
            }
            point = random_point(rng);
        }
        positions.push(point);
        positions.push(mirror(point));

        let first_pair = factories.len() == 1;
        let (owners, production, cyborgs) = if first_pair {
            ([Some(Side::One), Some(Side::Two)], rng.gen_range(1..=MAX_PRODUCTION), rng.gen_range(15..=30))
        } else {
            ([None, None], rng.gen_range(0..=MAX_PRODUCTION), rng.gen_range(0..=10))
        };
        for owner in owners {
            factories.push(ArenaFactory {
                owner,
                cyborgs,
                production,
                disabled: 0,
            });
        }
    }

    let mut links = Vec::with_capacity(count * (count - 1) / 2);
    for a in 0..count {
        for b in a + 1..count {
            let turns = ((spacing(positions[a], positions[b]) - 1200.0) / UNITS_PER_TURN).round();
            links.push(Link::new(a, b, turns.max(1.0) as u32));
        }
    }

    ArenaMap { factories, links }
}

fn odd_count(rng: &mut SmallRng, min: usize, max: usize) -> usize {
    let min = (min.max(3)) | 1;
    let max = if max % 2 == 0 { max.saturating_sub(1) } else { max };
    if max <= min {
        return min;
    }
    let pairs = rng.gen_range((min - 1) / 2..=(max - 1) / 2);
    pairs * 2 + 1
}

fn random_point(rng: &mut SmallRng) -> (f64, f64) {
    (rng.gen_range(0.0..MAP_WIDTH), rng.gen_range(0.0..MAP_HEIGHT))
}

fn mirror((x, y): (f64, f64)) -> (f64, f64) {
    (MAP_WIDTH - x, MAP_HEIGHT - y)
}

fn spacing(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// The full simulated game state.
#[derive(Debug, Clone)]
pub struct GameState {
    factories: Vec<ArenaFactory>,
    troops: Vec<ArenaTroop>,
    graph: DistanceGraph,
    next_troop_id: i32,
    turn: u32,
}

impl GameState {
    /// Sets up a game on `map`.
    pub fn new(map: &ArenaMap) -> Result<Self, EngineError> {
        let graph = DistanceGraph::new(map.factories.len(), &map.links)?;
        Ok(GameState {
            factories: map.factories.clone(),
            troops: Vec::new(),
            graph,
            next_troop_id: 0,
            turn: 0,
        })
    }

    pub fn graph(&self) -> &DistanceGraph {
        &self.graph
    }

    pub fn factories(&self) -> &[ArenaFactory] {
        &self.factories
    }

    pub fn troops(&self) -> &[ArenaTroop] {
        &self.troops
    }

    /// Turns resolved so far.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// The snapshot `side` would receive, with ownership relative to it.
    pub fn snapshot(&self, side: Side) -> Vec<EntityRecord> {
        let relative = |owner: Option<Side>| match owner {
            Some(s) if s == side => Owner::Me,
            Some(_) => Owner::Enemy,
            None => Owner::Neutral,
        };

        let mut records = Vec::with_capacity(self.factories.len() + self.troops.len());
        for (id, f) in self.factories.iter().enumerate() {
            records.push(EntityRecord::factory(
                id,
                relative(f.owner),
                f.cyborgs,
                f.production,
                f.disabled,
            ));
        }
        for t in &self.troops {
            records.push(EntityRecord::troop(
                t.id,
                relative(Some(t.owner)),
                t.source,
                t.target,
                t.cyborgs,
                t.remaining_turns,
            ));
        }
        records
    }

    /// Resolves one turn with both players' orders.
    pub fn step(&mut self, one: &[Order], two: &[Order]) {
        for troop in &mut self.troops {
            troop.remaining_turns = troop.remaining_turns.saturating_sub(1);
        }
        for factory in &mut self.factories {
            factory.disabled = factory.disabled.saturating_sub(1);
        }

        self.execute(Side::One, one);
        self.execute(Side::Two, two);

        // Neutral factories never produce on the simulated board.
        for factory in &mut self.factories {
            if factory.owner.is_some() && factory.disabled == 0 {
                factory.cyborgs += u32::from(factory.production);
            }
        }

        self.resolve_battles();
        self.turn += 1;
    }

    fn execute(&mut self, side: Side, orders: &[Order]) {
        for order in orders {
            match *order {
                Order::Move {
                    source,
                    target,
                    cyborgs,
                } => self.launch(side, source, target, cyborgs),
                Order::Inc { factory } => {
                    let Some(f) = self.factories.get_mut(factory) else { continue };
                    if f.owner == Some(side) && f.production < MAX_PRODUCTION && f.cyborgs >= UPGRADE_COST {
                        f.cyborgs -= UPGRADE_COST;
                        f.production += 1;
                    }
                }
                Order::Wait => {}
            }
        }
    }

    fn launch(&mut self, side: Side, source: FactoryId, target: FactoryId, cyborgs: u32) {
        if source >= self.factories.len() || target >= self.factories.len() {
            return;
        }
        let Some(distance) = self.graph.distance(source, target) else {
            return;
        };
        let factory = &mut self.factories[source];
        if factory.owner != Some(side) {
            return;
        }
        let sent = cyborgs.min(factory.cyborgs);
        if sent == 0 {
            return;
        }
        factory.cyborgs -= sent;
        self.troops.push(ArenaTroop {
            id: self.next_troop_id,
            owner: side,
            source,
            target,
            cyborgs: sent,
            remaining_turns: distance,
        });
        self.next_troop_id += 1;
    }

    fn resolve_battles(&mut self) {
        let mut arrivals = vec![[0u32; 2]; self.factories.len()];
        self.troops.retain(|t| {
            if t.remaining_turns == 0 {
                arrivals[t.target][t.owner.index()] += t.cyborgs;
                false
            } else {
                true
            }
        });

        for (factory, [one, two]) in self.factories.iter_mut().zip(arrivals) {
            let (side, units) = match one.cmp(&two) {
                std::cmp::Ordering::Greater => (Side::One, one - two),
                std::cmp::Ordering::Less => (Side::Two, two - one),
                std::cmp::Ordering::Equal => continue,
            };
            if factory.owner == Some(side) {
                factory.cyborgs += units;
            } else if units > factory.cyborgs {
                factory.owner = Some(side);
                factory.cyborgs = units - factory.cyborgs;
            } else {
                factory.cyborgs -= units;
            }
        }
    }

    /// Cyborgs held by `side`, in factories and in flight.
    pub fn total_cyborgs(&self, side: Side) -> u32 {
        let home: u32 = self
            .factories
            .iter()
            .filter(|f| f.owner == Some(side))
            .map(|f| f.cyborgs)
            .sum();
        let flying: u32 = self.troops.iter().filter(|t| t.owner == side).map(|t| t.cyborgs).sum();
        home + flying
    }

    /// Factories held by `side`.
    pub fn factory_count(&self, side: Side) -> usize {
        self.factories.iter().filter(|f| f.owner == Some(side)).count()
    }

    /// A side with no factories and no troops has lost.
    pub fn is_eliminated(&self, side: Side) -> bool {
        self.factory_count(side) == 0 && !self.troops.iter().any(|t| t.owner == side)
    }

    /// Returns true once a side is eliminated or the turn limit is reached.
    pub fn is_over(&self, max_turns: u32) -> bool {
        self.turn >= max_turns || Side::BOTH.iter().any(|s| self.is_eliminated(*s))
    }

    /// The winner by elimination, otherwise by cyborg count. `None` is a draw.
    pub fn winner(&self) -> Option<Side> {
        match (self.is_eliminated(Side::One), self.is_eliminated(Side::Two)) {
            (true, false) => return Some(Side::Two),
            (false, true) => return Some(Side::One),
            (true, true) => return None,
            (false, false) => {}
        }
        let one = self.total_cyborgs(Side::One);
        let two = self.total_cyborgs(Side::Two);
        match one.cmp(&two) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// A bot instance for one side of one game.
enum Bot {
    Greedy(Box<Engine>),
    Random(SmallRng),
    Idle,
}

impl Bot {
    fn new(kind: BotKind, map: &ArenaMap, planner: &PlannerConfig, seed: u64) -> Result<Bot, EngineError> {
        Ok(match kind {
            BotKind::Greedy => Bot::Greedy(Box::new(Engine::new(&map.initial_input(), planner.clone())?)),
            BotKind::Random => Bot::Random(SmallRng::seed_from_u64(seed)),
            BotKind::Idle => Bot::Idle,
        })
    }

    fn orders(&mut self, records: &[EntityRecord], graph: &DistanceGraph) -> Result<Vec<Order>, EngineError> {
        match self {
            Bot::Greedy(engine) => engine.handle_turn(records),
            Bot::Random(rng) => Ok(random_orders(records, graph, rng)?),
            Bot::Idle => Ok(vec![Order::Wait]),
        }
    }
}

/// Sends a random share of each owned factory's garrison at a random target,
/// from about half of the owned factories.
pub fn random_orders(
    records: &[EntityRecord],
    graph: &DistanceGraph,
    rng: &mut impl Rng,
) -> Result<Vec<Order>, EntityError> {
    let mut store = EntityStore::new();
    store.rebuild(records)?;

    let targets: Vec<FactoryId> = store.factories_not_owned_by(Owner::Me).map(|f| f.id).collect();
    let mut orders = Vec::new();
    if targets.is_empty() {
        return Ok(orders);
    }

    for factory in store.factories_owned_by(Owner::Me) {
        if factory.cyborgs == 0 || !rng.gen_bool(0.5) {
            continue;
        }
        let target = targets[rng.gen_range(0..targets.len())];
        if !graph.is_reachable(factory.id, target) {
            continue;
        }
        orders.push(Order::Move {
            source: factory.id,
            target,
            cyborgs: rng.gen_range(1..=factory.cyborgs),
        });
    }
    Ok(orders)
}

/// A completed arena game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: usize,
    /// Seed that reproduces this game.
    pub seed: u64,
    pub factory_count: usize,
    pub player_one: BotKind,
    pub player_two: BotKind,
    pub turns: u32,
    pub winner: Option<Side>,
    pub final_factories: [usize; 2],
    pub final_cyborgs: [u32; 2],
    /// Non-wait orders issued by each side over the game.
    pub orders_issued: [usize; 2],
}

fn game_seed(config: &ArenaConfig, game_id: usize) -> u64 {
    if config.seed != 0 {
        config.seed.wrapping_add(game_id as u64)
    } else {
        rand::random()
    }
}

/// Plays one game from an explicit seed.
pub fn play_seeded_game(config: &ArenaConfig, game_id: usize, seed: u64) -> Result<GameRecord, EngineError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let map = generate_map(&mut rng, config.min_factories, config.max_factories);
    let mut state = GameState::new(&map)?;
    let mut bots = [
        Bot::new(config.player_one, &map, &config.planner, rng.gen())?,
        Bot::new(config.player_two, &map, &config.planner, rng.gen())?,
    ];
    let mut issued = [0usize; 2];

    while !state.is_over(config.max_turns) {
        let mut orders: [Vec<Order>; 2] = Default::default();
        for side in Side::BOTH {
            let records = state.snapshot(side);
            let chosen = bots[side.index()].orders(&records, state.graph())?;
            issued[side.index()] += chosen.iter().filter(|o| **o != Order::Wait).count();
            orders[side.index()] = chosen;
        }
        state.step(&orders[0], &orders[1]);
    }

    Ok(GameRecord {
        game_id,
        seed,
        factory_count: map.factories.len(),
        player_one: config.player_one,
        player_two: config.player_two,
        turns: state.turn(),
        winner: state.winner(),
        final_factories: [state.factory_count(Side::One), state.factory_count(Side::Two)],
        final_cyborgs: [state.total_cyborgs(Side::One), state.total_cyborgs(Side::Two)],
        orders_issued: issued,
    })
}

/// Plays one game, deriving its seed from the config.
pub fn play_game(config: &ArenaConfig, game_id: usize) -> Result<GameRecord, EngineError> {
    play_seeded_game(config, game_id, game_seed(config, game_id))
}

/// Runs all configured games and returns their records in completion order.
pub fn run_arena(config: &ArenaConfig) -> Result<Vec<GameRecord>, ArenaError> {
    let mut games = Vec::with_capacity(config.num_games);
    run_arena_with_callback(config, |game| games.push(game))?;
    Ok(games)
}

/// Runs all configured games, handing each record to `on_game` as it completes.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
pub fn run_arena_with_callback<F>(config: &ArenaConfig, on_game: F) -> Result<(), ArenaError>
where
    F: FnMut(GameRecord),
{
    if config.threads > 1 {
        run_parallel(config, on_game)
    } else {
        run_sequential(config, on_game)
    }
}

fn run_sequential<F>(config: &ArenaConfig, mut on_game: F) -> Result<(), ArenaError>
where
    F: FnMut(GameRecord),
{
    for i in 0..config.num_games {
        let start = Instant::now();
        let game = play_game(config, i)?;
        if !config.quiet {
            log_game(&game, i + 1, config.num_games, start);
        }
        on_game(game);
    }
    Ok(())
}

/// Plays games on a rayon pool; records come back over a channel so the
/// callback always runs on the calling thread.
fn run_parallel<F>(config: &ArenaConfig, mut on_game: F) -> Result<(), ArenaError>
where
    F: FnMut(GameRecord),
{
    use rayon::prelude::*;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;
    let (tx, rx) = mpsc::channel::<Result<GameRecord, EngineError>>();
    let completed = AtomicUsize::new(0);

    let config_clone = config.clone();
    let handle = std::thread::spawn(move || {
        pool.install(|| {
            (0..config_clone.num_games)
                .into_par_iter()
                .for_each_with(tx, |tx, i| {
                    let start = Instant::now();
                    let result = play_game(&config_clone, i);
                    if let (Ok(game), false) = (&result, config_clone.quiet) {
                        let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        log_game(game, n, config_clone.num_games, start);
                    }
                    // The receiver only goes away if the caller already failed.
                    let _ = tx.send(result);
                });
        });
    });

    let mut first_error = None;
    for result in rx {
        match result {
            Ok(game) => on_game(game),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    handle.join().map_err(|_| ArenaError::WorkerPanicked)?;
    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn log_game(game: &GameRecord, n: usize, total: usize, start: Instant) {
    let outcome = match game.winner {
        Some(side) => format!("{} ({:?}) wins", winner_kind(game, side).name(), side),
        None => "draw".to_string(),
    };
    info!(
        "game {}/{}: {} after {} turns ({:.2}s, seed {})",
        n,
        total,
        outcome,
        game.turns,
        start.elapsed().as_secs_f64(),
        game.seed
    );
}

fn winner_kind(game: &GameRecord, side: Side) -> BotKind {
    match side {
        Side::One => game.player_one,
        Side::Two => game.player_two,
    }
}

/// Aggregate results over a batch of games.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArenaSummary {
    pub games: usize,
    pub wins: [usize; 2],
    pub draws: usize,
    pub average_turns: f64,
}

/// Tallies wins, draws, and game length.
pub fn summarize(games: &[GameRecord]) -> ArenaSummary {
    let mut summary = ArenaSummary {
        games: games.len(),
        ..ArenaSummary::default()
    };
    for game in games {
        match game.winner {
            Some(side) => summary.wins[side.index()] += 1,
            None => summary.draws += 1,
        }
    }
    if !games.is_empty() {
        let turns: u64 = games.iter().map(|g| u64::from(g.turns)).sum();
        summary.average_turns = turns as f64 / games.len() as f64;
    }
    summary
}

/// Writes game records as JSON lines.
pub fn write_jsonl<W: std::io::Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory(owner: Option<Side>, cyborgs: u32, production: u8) -> ArenaFactory {
        ArenaFactory {
            owner,
            cyborgs,
            production,
            disabled: 0,
        }
    }

    /// Three factories on a line, one turn apart: One at 1, Two at 2.
    fn small_map(one: u32, two: u32) -> ArenaMap {
        ArenaMap {
            factories: vec![
                factory(None, 2, 1),
                factory(Some(Side::One), one, 1),
                factory(Some(Side::Two), two, 1),
            ],
            links: vec![Link::new(0, 1, 1), Link::new(0, 2, 1), Link::new(1, 2, 2)],
        }
    }

    fn mv(source: FactoryId, target: FactoryId, cyborgs: u32) -> Order {
        Order::Move {
            source,
            target,
            cyborgs,
        }
    }

    #[test]
    fn generated_map_is_symmetric() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..20 {
            let map = generate_map(&mut rng, 7, 15);
            let n = map.factories.len();
            assert!(n % 2 == 1 && (7..=15).contains(&n), "count {}", n);
            assert_eq!(map.links.len(), n * (n - 1) / 2);
            assert_eq!(map.factories[0].production, 0);
            assert_eq!(map.factories[1].owner, Some(Side::One));
            assert_eq!(map.factories[2].owner, Some(Side::Two));
            for k in (1..n).step_by(2) {
                assert_eq!(map.factories[k].production, map.factories[k + 1].production);
                assert_eq!(map.factories[k].cyborgs, map.factories[k + 1].cyborgs);
            }
            assert!(map.links.iter().all(|l| l.distance >= 1));
        }
    }

    #[test]
    fn odd_count_respects_bounds() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(odd_count(&mut rng, 7, 7), 7);
        assert_eq!(odd_count(&mut rng, 8, 8), 9);
        for _ in 0..50 {
            let n = odd_count(&mut rng, 6, 12);
            assert!(n % 2 == 1 && (7..=11).contains(&n));
        }
    }

    #[test]
    fn snapshot_is_relative_to_side() {
        let state = GameState::new(&small_map(10, 10)).unwrap();
        let one = state.snapshot(Side::One);
        let two = state.snapshot(Side::Two);
        assert_eq!(one[1].args[0], Owner::Me.wire_code());
        assert_eq!(one[2].args[0], Owner::Enemy.wire_code());
        assert_eq!(two[1].args[0], Owner::Enemy.wire_code());
        assert_eq!(two[2].args[0], Owner::Me.wire_code());
        assert_eq!(one[0].args[0], Owner::Neutral.wire_code());
    }

    #[test]
    fn move_clamps_to_garrison_and_produces() {
        let mut state = GameState::new(&small_map(10, 10)).unwrap();
        state.step(&[mv(1, 2, 50)], &[]);
        let troop = state.troops()[0];
        assert_eq!(troop.cyborgs, 10);
        assert_eq!(troop.remaining_turns, 2);
        // Emptied, then produced one.
        assert_eq!(state.factories()[1].cyborgs, 1);
        assert_eq!(state.factories()[2].cyborgs, 11);
        // Neutrals do not produce.
        assert_eq!(state.factories()[0].cyborgs, 2);
    }

    #[test]
    fn moves_from_foreign_factories_are_ignored() {
        let mut state = GameState::new(&small_map(10, 10)).unwrap();
        state.step(&[mv(2, 0, 5), mv(0, 1, 1)], &[]);
        assert!(state.troops().is_empty());
    }

    #[test]
    fn troop_captures_neutral() {
        let mut state = GameState::new(&small_map(10, 10)).unwrap();
        state.step(&[mv(1, 0, 5)], &[]);
        assert_eq!(state.factories()[0].owner, None);
        state.step(&[], &[]);
        assert_eq!(state.factories()[0].owner, Some(Side::One));
        assert_eq!(state.factories()[0].cyborgs, 3);
        assert!(state.troops().is_empty());
    }

    #[test]
    fn equal_assault_leaves_garrison_empty() {
        let mut state = GameState::new(&small_map(10, 10)).unwrap();
        state.step(&[mv(1, 0, 2)], &[]);
        state.step(&[], &[]);
        assert_eq!(state.factories()[0].owner, None);
        assert_eq!(state.factories()[0].cyborgs, 0);
    }

    #[test]
    fn opposing_arrivals_cancel_first() {
        let mut state = GameState::new(&small_map(10, 10)).unwrap();
        state.step(&[mv(1, 0, 7)], &[mv(2, 0, 4)]);
        state.step(&[], &[]);
        // 7 - 4 = 3 survivors against a garrison of 2.
        assert_eq!(state.factories()[0].owner, Some(Side::One));
        assert_eq!(state.factories()[0].cyborgs, 1);
    }

    #[test]
    fn reinforcement_adds_to_garrison() {
        let mut state = GameState::new(&small_map(10, 10)).unwrap();
        state.factories[0].owner = Some(Side::One);
        state.step(&[mv(1, 0, 4)], &[]);
        state.step(&[], &[]);
        // 2 + 1 + 1 production + 4 arrived.
        assert_eq!(state.factories()[0].cyborgs, 8);
    }

    #[test]
    fn upgrade_requires_full_cost() {
        let mut state = GameState::new(&small_map(10, 9)).unwrap();
        state.step(&[Order::Inc { factory: 1 }], &[Order::Inc { factory: 2 }]);
        assert_eq!(state.factories()[1].production, 2);
        assert_eq!(state.factories()[1].cyborgs, 2);
        assert_eq!(state.factories()[2].production, 1);
        assert_eq!(state.factories()[2].cyborgs, 10);
    }

    #[test]
    fn disabled_factory_does_not_produce() {
        let mut state = GameState::new(&small_map(10, 10)).unwrap();
        state.factories[1].disabled = 3;
        state.step(&[], &[]);
        assert_eq!(state.factories()[1].disabled, 2);
        assert_eq!(state.factories()[1].cyborgs, 10);
    }

    #[test]
    fn elimination_decides_winner() {
        let mut state = GameState::new(&small_map(30, 1)).unwrap();
        state.step(&[mv(1, 2, 30)], &[]);
        state.step(&[], &[]);
        assert!(!state.is_over(200));
        state.step(&[], &[]);
        assert_eq!(state.factories()[2].owner, Some(Side::One));
        assert_eq!(state.factories()[2].cyborgs, 26);
        assert!(state.is_eliminated(Side::Two));
        assert!(state.is_over(200));
        assert_eq!(state.winner(), Some(Side::One));
    }

    #[test]
    fn turn_limit_decides_by_cyborgs() {
        let mut state = GameState::new(&small_map(12, 10)).unwrap();
        state.step(&[], &[]);
        assert!(state.is_over(1));
        assert!(!state.is_over(2));
        assert_eq!(state.winner(), Some(Side::One));
    }

    #[test]
    fn greedy_beats_idle_on_small_map() {
        let map = small_map(30, 5);
        let mut state = GameState::new(&map).unwrap();
        let mut greedy = Bot::new(BotKind::Greedy, &map, &PlannerConfig::default(), 0).unwrap();
        let mut idle = Bot::new(BotKind::Idle, &map, &PlannerConfig::default(), 0).unwrap();
        while !state.is_over(50) {
            let one = greedy.orders(&state.snapshot(Side::One), state.graph()).unwrap();
            let two = idle.orders(&state.snapshot(Side::Two), state.graph()).unwrap();
            state.step(&one, &two);
        }
        assert_eq!(state.winner(), Some(Side::One));
    }

    #[test]
    fn random_orders_only_use_owned_factories() {
        let state = GameState::new(&small_map(10, 10)).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..50 {
            let orders = random_orders(&state.snapshot(Side::One), state.graph(), &mut rng).unwrap();
            for order in orders {
                let Order::Move { source, cyborgs, .. } = order else {
                    panic!("random bot only moves");
                };
                assert_eq!(source, 1);
                assert!((1..=10).contains(&cyborgs));
            }
        }
    }

    #[test]
    fn seeded_games_are_reproducible() {
        let config = ArenaConfig {
            max_turns: 60,
            ..ArenaConfig::default()
        };
        let a = play_seeded_game(&config, 0, 42).unwrap();
        let b = play_seeded_game(&config, 0, 42).unwrap();
        assert_eq!(a, b);
        assert!(a.turns <= 60);
    }

    #[test]
    fn summary_counts_outcomes() {
        let base = GameRecord {
            game_id: 0,
            seed: 1,
            factory_count: 7,
            player_one: BotKind::Greedy,
            player_two: BotKind::Random,
            turns: 10,
            winner: Some(Side::One),
            final_factories: [7, 0],
            final_cyborgs: [100, 0],
            orders_issued: [5, 5],
        };
        let games = vec![
            base.clone(),
            GameRecord { winner: None, turns: 20, ..base.clone() },
            GameRecord { winner: Some(Side::Two), turns: 30, ..base },
        ];
        let s = summarize(&games);
        assert_eq!(s.games, 3);
        assert_eq!(s.wins, [1, 1]);
        assert_eq!(s.draws, 1);
        assert!((s.average_turns - 20.0).abs() < 1e-9);
    }

    #[test]
    fn jsonl_has_one_line_per_game() {
        let config = ArenaConfig {
            max_turns: 20,
            ..ArenaConfig::default()
        };
        let games = vec![
            play_seeded_game(&config, 0, 5).unwrap(),
            play_seeded_game(&config, 1, 6).unwrap(),
        ];
        let mut out = Vec::new();
        write_jsonl(&games, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: GameRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed, games[1]);
    }
}
