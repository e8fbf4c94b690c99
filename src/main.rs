//! cellwar -- a greedy decision engine for the factory-capture game.
//!
//! Reads the map and per-turn snapshots from stdin and writes one command
//! line per turn to stdout. Diagnostics go to stderr through `env_logger`
//! (set `RUST_LOG=debug` to see every committed order).

use std::io::{self, BufWriter};
use std::process::ExitCode;

use log::{error, info};

use cellwar::config::PlannerConfig;
use cellwar::engine::{Engine, EngineError};
use cellwar::protocol::input::TurnReader;

/// Runs the read-plan-emit loop until the referee closes stdin.
fn run() -> Result<(), EngineError> {
    let config = PlannerConfig::from_env()?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut reader = TurnReader::new(stdin.lock());

    let initial = reader.read_initial()?;
    let mut engine = Engine::new(&initial, config)?;

    while let Some(records) = reader.read_turn()? {
        engine.play_turn(&records, &mut out)?;
    }

    info!("input closed after {} turns", engine.turn());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
