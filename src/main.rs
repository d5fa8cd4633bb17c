//! Conquest -- command-line driver for the adjudication engine.
//!
//! Loads a map, a saved game and one phase's orders from JSON files,
//! resolves the phase and prints the `TurnResult` as JSON on stdout.
//! Logs go to stderr; set `RUST_LOG` to change the level.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use conquest::board::{Map, MapError, UnitId};
use conquest::config::{ConfigError, EngineConfig};
use conquest::engine::{Engine, EngineError};
use conquest::protocol::{GameSnapshot, PhaseOrders, SnapshotError};

/// Simultaneous-order adjudication for territory-conquest games
#[derive(Parser, Debug)]
#[command(name = "conquest", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the current phase of a saved game
    Resolve {
        /// Map definition (JSON)
        #[arg(long)]
        map: PathBuf,

        /// Saved game snapshot (JSON)
        #[arg(long)]
        state: PathBuf,

        /// Orders for the current phase (JSON)
        #[arg(long)]
        orders: Option<PathBuf>,

        /// Engine configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the resulting snapshot here
        #[arg(long)]
        save: Option<PathBuf>,

        /// Pretty-print the result
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a map definition and print a summary
    CheckMap {
        /// Map definition (JSON)
        map: PathBuf,
    },

    /// List the legal move targets of a unit
    Moves {
        #[arg(long)]
        map: PathBuf,

        #[arg(long)]
        state: PathBuf,

        #[arg(long)]
        unit: u32,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },

    #[error("{path}: {source}")]
    Map { path: PathBuf, source: MapError },

    #[error("{path}: {source}")]
    Snapshot { path: PathBuf, source: SnapshotError },

    #[error("{path}: {source}")]
    Config { path: PathBuf, source: ConfigError },

    #[error("{path}: {source}")]
    Orders { path: PathBuf, source: serde_json::Error },

    #[error("no unit {0} in the game")]
    UnknownUnit(UnitId),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })
}

fn load_map(path: &Path) -> Result<Map, CliError> {
    Map::from_json(&read(path)?).map_err(|source| CliError::Map {
        path: path.to_owned(),
        source,
    })
}

fn load_snapshot(path: &Path) -> Result<GameSnapshot, CliError> {
    GameSnapshot::from_json(&read(path)?).map_err(|source| CliError::Snapshot {
        path: path.to_owned(),
        source,
    })
}

fn load_engine(map: &Path, state: &Path, config: EngineConfig) -> Result<Engine, CliError> {
    let map = load_map(map)?;
    let snapshot = load_snapshot(state)?;
    Engine::from_snapshot(map, &snapshot, config).map_err(|e| match e {
        EngineError::Snapshot(source) => CliError::Snapshot {
            path: state.to_owned(),
            source,
        },
        other => CliError::Engine(other),
    })
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Resolve {
            map,
            state,
            orders,
            config,
            save,
            pretty,
        } => {
            let config = match config {
                Some(path) => EngineConfig::from_json(&read(&path)?).map_err(|source| CliError::Config { path, source })?,
                None => EngineConfig::default(),
            };
            let orders = match orders {
                Some(path) => PhaseOrders::from_json(&read(&path)?).map_err(|source| CliError::Orders { path, source })?,
                None => PhaseOrders::default(),
            };

            let mut engine = load_engine(&map, &state, config)?;
            let result = engine.submit(orders)?;
            let json = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{json}");

            if let Some(path) = save {
                let snapshot = engine.snapshot().to_json_pretty()?;
                fs::write(&path, snapshot).map_err(|source| CliError::Write { path, source })?;
            }
        }
        Command::CheckMap { map } => {
            let map = load_map(&map)?;
            let water = map.territories().filter(|t| t.is_water).count();
            let air_bases = map.territories().filter(|t| t.is_air_base).count();
            println!(
                "{} territories ({} land, {} water), {} supply centers, {} air bases",
                map.len(),
                map.len() - water,
                water,
                map.supply_center_count(),
                air_bases
            );
        }
        Command::Moves { map, state, unit } => {
            let engine = load_engine(&map, &state, EngineConfig::default())?;
            let unit = UnitId(unit);
            if engine.state().unit(unit).is_none() {
                return Err(CliError::UnknownUnit(unit));
            }
            for target in engine.legal_moves(unit) {
                println!("{}", engine.map().name(target).unwrap_or("?"));
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("conquest=info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
