use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use trick_play::boards::chess::ChessBoard;
use trick_play::config::RunConfig;
use trick_play::random::{CustomNumberGenerator, RandomGenerator, StandardRandomGenerator};
use trick_play::report::ConsoleReporter;
use trick_play::selfplay::{GameEnd, SelfPlay};
use trick_play::uci::UciEngine;

mod cli;

use crate::cli::Args;

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn play<K: RandomGenerator>(engine: UciEngine, config: &RunConfig, random: K) -> Result<()> {
    let mut selfplay: SelfPlay<ChessBoard, UciEngine, K> = SelfPlay::builder(engine)
        .with_policy(config.policy.clone())
        .with_match(config.match_.clone())
        .with_random_generator(random)
        .build();

    let ends = selfplay.run(&mut ConsoleReporter::stdout())?;
    let capped = ends
        .iter()
        .filter(|end| matches!(end, GameEnd::CappedAtMoveLimit(_)))
        .count();
    info!(games = ends.len(), capped, "all games complete");

    selfplay.into_oracle().quit();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    args.validate()?;

    init_tracing(&args.log_level)?;
    info!(log_level = %args.log_level, "Tracing initialized");

    let config = args.run_config()?;
    info!(
        engine = %config.engine.path.display(),
        games = config.match_.games,
        "Starting self-play"
    );

    let engine = UciEngine::start(config.engine.clone())?;
    if let Some(name) = engine.name() {
        info!(engine = name, "Engine started");
    }

    let result = match args.seed() {
        Some(seed) => play(engine, &config, CustomNumberGenerator::new(seed)),
        None => play(engine, &config, StandardRandomGenerator),
    };

    match result {
        Ok(()) => {
            info!("Self-play completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Self-play failed: {}", e);
            Err(e)
        }
    }
}
