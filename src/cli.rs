//! Command line of the `trick-play` binary.
//!
//! Values given on the command line win over `TRICKPLAY_*` environment variables, which win
//! over the configuration file.

use anyhow::{Result, anyhow};
use clap::Parser;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use trick_play::config::RunConfig;

fn default_log_level() -> String {
    std::env::var("TRICKPLAY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

fn env_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[derive(Parser, Debug, Clone)]
#[command(name = "trick-play")]
#[command(about = "Self-play games where one side hunts for trick moves")]
#[command(
    long_about = "Plays games between a trick-seeking side and a UCI engine's own choices.
The trick side prefers moves that leave the opponent a single non-losing reply.
Every finished game is printed as PGN."
)]
pub struct Args {
    /// TOML configuration file (env: TRICKPLAY_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path of the UCI engine executable (env: TRICKPLAY_ENGINE)
    #[arg(long)]
    pub engine: Option<PathBuf>,

    /// Number of games to play (env: TRICKPLAY_GAMES)
    #[arg(long)]
    pub games: Option<u32>,

    /// Log level when RUST_LOG is not set: trace, debug, info, warn, error
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Seed for the randomized baseline, for reproducible runs (env: TRICKPLAY_SEED)
    #[arg(long)]
    pub seed: Option<i64>,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }
        if self.games == Some(0) {
            return Err(anyhow!("games must be greater than 0"));
        }
        Ok(())
    }

    pub fn seed(&self) -> Option<i64> {
        self.seed.or_else(|| env_var("TRICKPLAY_SEED"))
    }

    /// Loads the configuration file, if any, and applies environment and command line
    /// overrides on top.
    pub fn run_config(&self) -> Result<RunConfig> {
        let path = self.config.clone().or_else(|| env_var("TRICKPLAY_CONFIG"));
        let mut config = match path {
            Some(path) => RunConfig::load_from_path(&path)?,
            None => RunConfig::default(),
        };

        if let Some(engine) = self.engine.clone().or_else(|| env_var("TRICKPLAY_ENGINE")) {
            config.engine.path = engine;
        }
        if let Some(games) = self.games.or_else(|| env_var("TRICKPLAY_GAMES")) {
            config.match_.games = games;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("trick-play").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn command_line_overrides_defaults() {
        let args = parse(&["--engine", "/opt/sf", "--games", "2", "--log-level", "debug"]);

        assert!(args.validate().is_ok());
        let config = args.run_config().unwrap();
        assert_eq!(config.engine.path, PathBuf::from("/opt/sf"));
        assert_eq!(config.match_.games, 2);
    }

    #[test]
    fn rejects_unknown_log_level() {
        let args = parse(&["--log-level", "loud"]);

        let err = args.validate().unwrap_err();
        assert!(err.to_string().contains("log level"));
    }

    #[test]
    fn rejects_zero_games() {
        let args = parse(&["--games", "0"]);

        assert!(args.validate().is_err());
    }
}
