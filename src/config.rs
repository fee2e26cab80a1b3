//! Tunable parameters of a self-play run.
//!
//! Every threshold and search depth the reward shaping depends on lives in [`TrickPolicy`].
//! A run is configured from a TOML file with one table per section:
//!
//! ```toml
//! [policy]
//! trick_threshold = 0.5
//! move_cap = 50
//!
//! [engine]
//! path = "/usr/local/bin/stockfish"
//! call_timeout_secs = 60
//!
//! [match]
//! games = 5
//! ```
//!
//! Missing keys fall back to the defaults below.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Reward shaping and move selection parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrickPolicy {
    /// Search depth (plies) used to score every opponent reply when counting robust replies.
    pub reply_depth: u32,
    /// Search depth (plies) used for the evaluation after a candidate move.
    pub reward_depth: u32,
    /// Search depth (plies) of the baseline selector.
    pub select_depth: u32,
    /// Number of principal variations the baseline selector asks for.
    pub select_lines: usize,
    /// Search depth (plies) of the oracle's own move and of the move-cap evaluation.
    pub play_depth: u32,
    /// A move is a trick only if its reward is strictly above this.
    pub trick_threshold: f64,
    /// Replies scoring at or below this many centipawns count as losing.
    pub losing_threshold: i32,
    /// The trick bonus is only granted while the evaluation after the move is below this
    /// (centipawns, opponent's perspective).
    pub trick_eval_ceiling: i32,
    /// Reward added when the opponent is left with exactly one non-losing reply.
    pub trick_bonus: f64,
    /// Centipawn value a forced mate is collapsed to.
    pub mate_score: i32,
    /// Number of full moves (trick move + baseline reply) after which a game is stopped.
    pub move_cap: u32,
    /// Evaluations strictly inside `(-draw_margin, draw_margin)` are called a draw at the cap.
    pub draw_margin: i32,
    /// Probability of the baseline selector picking a random line among its top lines
    /// instead of the best one.
    pub baseline_randomness: f64,
}

impl Default for TrickPolicy {
    fn default() -> Self {
        TrickPolicy {
            reply_depth: 10,
            reward_depth: 10,
            select_depth: 5,
            select_lines: 5,
            play_depth: 10,
            trick_threshold: 0.5,
            losing_threshold: -200,
            trick_eval_ceiling: 400,
            trick_bonus: 1.0,
            mate_score: 10_000,
            move_cap: 50,
            draw_margin: 100,
            baseline_randomness: 0.0,
        }
    }
}

impl TrickPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reply_depth == 0 || self.reward_depth == 0 || self.select_depth == 0 {
            return Err(ConfigError::Invalid(
                "search depths must be greater than 0".into(),
            ));
        }
        if self.play_depth == 0 {
            return Err(ConfigError::Invalid(
                "play_depth must be greater than 0".into(),
            ));
        }
        if self.select_lines == 0 {
            return Err(ConfigError::Invalid(
                "select_lines must be greater than 0".into(),
            ));
        }
        if self.move_cap == 0 {
            return Err(ConfigError::Invalid(
                "move_cap must be greater than 0".into(),
            ));
        }
        if self.draw_margin < 0 {
            return Err(ConfigError::Invalid(
                "draw_margin cannot be negative".into(),
            ));
        }
        if self.mate_score <= 0 {
            return Err(ConfigError::Invalid(
                "mate_score must be greater than 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.baseline_randomness) {
            return Err(ConfigError::Invalid(format!(
                "baseline_randomness must be within [0, 1], got {}",
                self.baseline_randomness
            )));
        }
        if !self.trick_threshold.is_finite() || !self.trick_bonus.is_finite() {
            return Err(ConfigError::Invalid(
                "trick_threshold and trick_bonus must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// How to start and talk to the engine process backing the oracle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Path of the UCI engine executable.
    pub path: PathBuf,
    /// Extra arguments passed to the executable.
    pub args: Vec<String>,
    /// UCI options sent with `setoption` after the handshake (e.g. `Threads`, `Hash`).
    pub options: BTreeMap<String, String>,
    /// Upper bound for a single request, including the handshake.
    pub call_timeout_secs: u64,
    /// How often a failed request is retried with a fresh engine process.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on every further retry.
    pub retry_backoff_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            path: PathBuf::from("stockfish"),
            args: Vec::new(),
            options: BTreeMap::new(),
            call_timeout_secs: 60,
            max_retries: 3,
            retry_backoff_ms: 500,
        }
    }
}

impl EngineConfig {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        EngineConfig {
            path: path.into(),
            ..EngineConfig::default()
        }
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(factor))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("engine path cannot be empty".into()));
        }
        if self.call_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "call_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Game count and header labels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    /// Number of independent games to play.
    pub games: u32,
    /// Event header, the game number is appended.
    pub event: String,
    pub site: String,
    /// Name of the trick-seeking side (moves first).
    pub white: String,
    /// Name of the baseline side.
    pub black: String,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            games: 5,
            event: "Trick Stockfish Training Game".into(),
            site: "Self-Play".into(),
            white: "Trick Stockfish".into(),
            black: "Stockfish".into(),
        }
    }
}

/// Everything a run needs, as read from a TOML file.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub policy: TrickPolicy,
    pub engine: EngineConfig,
    #[serde(rename = "match")]
    pub match_: MatchConfig,
}

impl RunConfig {
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content, path)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;
        self.engine.validate()?;
        if self.match_.games == 0 {
            return Err(ConfigError::Invalid("games must be greater than 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let policy = TrickPolicy::default();
        assert_eq!(policy.reply_depth, 10);
        assert_eq!(policy.reward_depth, 10);
        assert_eq!(policy.select_depth, 5);
        assert_eq!(policy.select_lines, 5);
        assert_eq!(policy.play_depth, 10);
        assert!((policy.trick_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(policy.losing_threshold, -200);
        assert_eq!(policy.trick_eval_ceiling, 400);
        assert_eq!(policy.mate_score, 10_000);
        assert_eq!(policy.move_cap, 50);
        assert_eq!(policy.draw_margin, 100);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let content = r#"
            [policy]
            trick_threshold = 0.8
            move_cap = 20

            [engine]
            path = "/opt/stockfish"
            options = { Threads = "4", Hash = "256" }

            [match]
            games = 2
        "#;

        let config = RunConfig::from_toml(content, Path::new("test.toml")).unwrap();
        assert!((config.policy.trick_threshold - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.policy.move_cap, 20);
        assert_eq!(config.policy.losing_threshold, -200);
        assert_eq!(config.engine.path, PathBuf::from("/opt/stockfish"));
        assert_eq!(config.engine.options.get("Threads").map(String::as_str), Some("4"));
        assert_eq!(config.engine.call_timeout_secs, 60);
        assert_eq!(config.match_.games, 2);
        assert_eq!(config.match_.white, "Trick Stockfish");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = RunConfig::from_toml("[policy]\ntrick_treshold = 1.0\n", Path::new("x.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("x.toml"));
    }

    #[test]
    fn test_validate_rejects_zero_move_cap() {
        let policy = TrickPolicy {
            move_cap: 0,
            ..TrickPolicy::default()
        };
        let err = policy.validate().unwrap_err();
        assert!(err.to_string().contains("move_cap"));
    }

    #[test]
    fn test_validate_rejects_bad_randomness() {
        let policy = TrickPolicy {
            baseline_randomness: 1.5,
            ..TrickPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_games() {
        let mut config = RunConfig::default();
        config.match_.games = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("games"));
    }

    #[test]
    fn test_retry_delay_doubles() {
        let engine = EngineConfig {
            retry_backoff_ms: 100,
            ..EngineConfig::default()
        };
        assert_eq!(engine.retry_delay(1), Duration::from_millis(100));
        assert_eq!(engine.retry_delay(2), Duration::from_millis(200));
        assert_eq!(engine.retry_delay(3), Duration::from_millis(400));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let err = RunConfig::load_from_path(Path::new("/nonexistent/trick-play.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
