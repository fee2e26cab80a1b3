//! Self-play driver that hunts for trick moves.
//!
//! One side looks for moves that leave the opponent with exactly one reply that does not
//! lose, the other side plays the evaluation oracle's own choice. Every candidate is scored by
//! playing it, counting the opponent's non-losing replies and asking the oracle for the
//! evaluation afterwards. Finished games are handed to a reporter as PGN.
//!
//! The rules of the game come from a [`board::Board`] implementation, the evaluations from an
//! [`oracle::Oracle`], typically a UCI engine such as Stockfish.
//!
//! # Example
//!
//! ```rust,no_run
//! use trick_play::boards::chess::ChessBoard;
//! use trick_play::config::{EngineConfig, TrickPolicy};
//! use trick_play::random::StandardRandomGenerator;
//! use trick_play::report::ConsoleReporter;
//! use trick_play::selfplay::SelfPlay;
//! use trick_play::uci::UciEngine;
//!
//! let engine = UciEngine::start(EngineConfig::with_path("stockfish")).unwrap();
//!
//! let mut selfplay: SelfPlay<ChessBoard, _, StandardRandomGenerator> =
//!     SelfPlay::builder(engine)
//!         .with_policy(TrickPolicy::default())
//!         .build();
//!
//! selfplay.run(&mut ConsoleReporter::stdout()).unwrap();
//! ```

/// Contains the `Board` trait and related enums that define the interface for a game.
pub mod board;
/// Contains ready-made implementations of the `Board` trait.
pub mod boards;
/// Tunables of the trick policy, the engine and the match, loaded from TOML.
pub mod config;
/// The crate-level error type.
pub mod error;
/// Headers and moves of a played game, with PGN output.
pub mod game_record;
/// The evaluation oracle interface.
pub mod oracle;
/// Contains traits and implementations for random number generation.
pub mod random;
/// Reporting of finished games.
pub mod report;
/// Reply robustness and the trick reward.
pub mod reward;
/// The trick and baseline move selectors.
pub mod selector;
/// The self-play driver.
pub mod selfplay;
/// A UCI engine used as the evaluation oracle.
pub mod uci;

#[cfg(test)]
mod testing;

pub use error::Error;
