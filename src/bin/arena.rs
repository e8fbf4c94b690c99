//! Self-play arena CLI.
//!
//! Pits two bots against each other on generated maps and writes one JSON
//! record per game.
//!
//! Usage:
//!   cargo run --release --bin arena -- [OPTIONS]
//!
//! Options:
//!   --games N         Number of games to play (default: 10)
//!   --max-turns N     Turn limit per game (default: 200)
//!   --min-factories N Smallest map (default: 7)
//!   --max-factories N Largest map (default: 15)
//!   --one BOT         Bot for player one: greedy, random, idle (default: greedy)
//!   --two BOT         Bot for player two (default: random)
//!   --config FILE     Planner config JSON for greedy bots
//!   --threads N       Number of parallel threads (default: 4)
//!   --seed N          Random seed, 0 for entropy (default: 0)
//!   --output FILE     Output file path (default: stdout)
//!   --quiet           Suppress progress and summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Instant;

use log::error;

use cellwar::arena::{self, ArenaConfig, BotKind};
use cellwar::config::PlannerConfig;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let mut config = ArenaConfig::default();
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let parsed = match flag {
            "--games" => value(&args, &mut i).map(|v| config.num_games = v),
            "--max-turns" => value(&args, &mut i).map(|v| config.max_turns = v),
            "--min-factories" => value(&args, &mut i).map(|v| config.min_factories = v),
            "--max-factories" => value(&args, &mut i).map(|v| config.max_factories = v),
            "--threads" => value(&args, &mut i).map(|v| config.threads = v),
            "--seed" => value(&args, &mut i).map(|v| config.seed = v),
            "--one" => bot(&args, &mut i).map(|b| config.player_one = b),
            "--two" => bot(&args, &mut i).map(|b| config.player_two = b),
            "--config" => raw(&args, &mut i).and_then(|path| {
                PlannerConfig::from_path(Path::new(path))
                    .map(|planner| config.planner = planner)
                    .map_err(|e| e.to_string())
            }),
            "--output" => raw(&args, &mut i).map(|path| output_path = Some(path.to_string())),
            "--quiet" => {
                config.quiet = true;
                Ok(())
            }
            "--help" | "-h" => {
                print_usage();
                return ExitCode::SUCCESS;
            }
            other => Err(format!("unknown argument: {}", other)),
        };
        if let Err(msg) = parsed {
            eprintln!("{}: {}", flag, msg);
            print_usage();
            return ExitCode::FAILURE;
        }
        i += 1;
    }

    if !config.quiet {
        eprintln!(
            "Arena: {} games, {} vs {}, {}-{} factories, {} turns max, {} threads",
            config.num_games,
            config.player_one.name(),
            config.player_two.name(),
            config.min_factories,
            config.max_factories,
            config.max_turns,
            config.threads
        );
    }

    let start = Instant::now();
    let games = match arena::run_arena(&config) {
        Ok(games) => games,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let elapsed = start.elapsed();

    if !config.quiet {
        let summary = arena::summarize(&games);
        eprintln!("Completed {} games in {:.1}s", summary.games, elapsed.as_secs_f64());
        eprintln!(
            "  {} (one): {} wins, {} (two): {} wins, {} draws, {:.1} turns avg",
            config.player_one.name(),
            summary.wins[0],
            config.player_two.name(),
            summary.wins[1],
            summary.draws,
            summary.average_turns
        );
    }

    let written = match &output_path {
        Some(path) => File::create(path).and_then(|file| arena::write_jsonl(&games, &mut BufWriter::new(file))),
        None => arena::write_jsonl(&games, &mut BufWriter::new(io::stdout().lock())),
    };
    if let Err(e) = written {
        error!("failed to write output: {}", e);
        return ExitCode::FAILURE;
    }
    if let (Some(path), false) = (&output_path, config.quiet) {
        eprintln!("Wrote {} games to {}", games.len(), path);
    }
    ExitCode::SUCCESS
}

fn raw<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i).map(String::as_str).ok_or_else(|| "missing value".to_string())
}

fn value<T: FromStr>(args: &[String], i: &mut usize) -> Result<T, String> {
    let s = raw(args, i)?;
    s.parse().map_err(|_| format!("invalid value '{}'", s))
}

fn bot(args: &[String], i: &mut usize) -> Result<BotKind, String> {
    let s = raw(args, i)?;
    BotKind::from_name(s).ok_or_else(|| format!("unknown bot '{}'", s))
}

fn print_usage() {
    eprintln!("Usage: arena [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N          Number of games to play (default: 10)");
    eprintln!("  --max-turns N      Turn limit per game (default: 200)");
    eprintln!("  --min-factories N  Smallest map (default: 7)");
    eprintln!("  --max-factories N  Largest map (default: 15)");
    eprintln!("  --one BOT          Player one: greedy, random, idle (default: greedy)");
    eprintln!("  --two BOT          Player two: greedy, random, idle (default: random)");
    eprintln!("  --config FILE      Planner config JSON for greedy bots");
    eprintln!("  --threads N        Number of parallel threads (default: 4)");
    eprintln!("  --seed N           Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE      Output file path (default: stdout)");
    eprintln!("  --quiet            Suppress progress and summary output");
    eprintln!("  --help             Show this help");
}
