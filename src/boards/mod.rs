//! Contains ready-made implementations of the `Board` trait.

/// Standard chess, backed by `shakmaty`.
pub mod chess;
/// A `Board` implementation for the game of Tic-Tac-Toe.
pub mod tic_tac_toe;
