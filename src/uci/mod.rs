//! Talking to UCI chess engines such as Stockfish.

use crate::board::Board;
use crate::boards::chess::ChessBoard;

pub mod engine;
pub mod parse;

pub use engine::UciEngine;

/// A board an engine can be pointed at through the UCI `position` command.
pub trait UciBoard: Board {
    /// Arguments of the `position` command, e.g. `startpos moves e2e4 e7e5`.
    fn uci_position(&self) -> String;

    /// The legal move written as `text` in UCI notation, if any.
    fn parse_uci_move(&self, text: &str) -> Option<Self::Move>;
}

impl UciBoard for ChessBoard {
    fn uci_position(&self) -> String {
        ChessBoard::uci_position(self)
    }

    fn parse_uci_move(&self, text: &str) -> Option<Self::Move> {
        ChessBoard::parse_uci_move(self, text)
    }
}
