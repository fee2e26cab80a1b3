//! The evaluation oracle: an external analysis capability that scores positions and ranks
//! candidate moves.

use crate::board::Board;
use std::time::Duration;
use thiserror::Error;

/// A score as reported by the oracle, relative to the side to move.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Score {
    /// Centipawns, positive when the side to move is better.
    Centipawns(i32),
    /// Forced mate in the given number of moves. Positive when the side to move mates,
    /// zero or negative when it gets mated.
    Mate(i32),
}

/// The result of analysing a single position.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub struct Evaluation {
    /// `None` when the oracle produced no numeric score at all.
    pub score: Option<Score>,
}

impl Evaluation {
    pub fn centipawns(cp: i32) -> Self {
        Evaluation {
            score: Some(Score::Centipawns(cp)),
        }
    }

    pub fn mate(moves: i32) -> Self {
        Evaluation {
            score: Some(Score::Mate(moves)),
        }
    }

    pub fn unknown() -> Self {
        Evaluation { score: None }
    }

    /// Collapses the evaluation into a single centipawn number.
    ///
    /// Mates map to `+mate_score` for the side to move and `-mate_score` against it, a missing
    /// score maps to 0.
    pub fn to_centipawns(&self, mate_score: i32) -> i32 {
        match self.score {
            Some(Score::Centipawns(cp)) => cp,
            Some(Score::Mate(moves)) if moves > 0 => mate_score,
            Some(Score::Mate(_)) => -mate_score,
            None => 0,
        }
    }
}

/// One ranked principal variation.
#[derive(Debug, Clone, PartialEq)]
pub struct Line<M> {
    /// 1-based rank, 1 being the oracle's preferred line.
    pub rank: usize,
    pub evaluation: Evaluation,
    /// The moves of the variation. Never empty.
    pub moves: Vec<M>,
}

impl<M> Line<M> {
    pub fn first_move(&self) -> Option<&M> {
        self.moves.first()
    }
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
    #[error("oracle did not answer within {0:?}")]
    Timeout(Duration),
    #[error("oracle io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("oracle protocol error: {0}")]
    Protocol(String),
    #[error("oracle suggested illegal move '{0}'")]
    IllegalMove(String),
    #[error("oracle still failing after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<OracleError>,
    },
}

impl OracleError {
    /// Whether restarting the oracle session could plausibly fix this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OracleError::Unavailable(_) | OracleError::Timeout(_) | OracleError::Io(_)
        )
    }
}

/// A position-evaluation oracle for boards of type `B`.
///
/// Calls are blocking and strictly sequential: the board is borrowed for the duration of the
/// call and must not change until it returns.
pub trait Oracle<B: Board> {
    /// Scores the position at a fixed search depth, relative to the side to move.
    fn analyse(&mut self, board: &B, depth: u32) -> Result<Evaluation, OracleError>;

    /// Returns up to `lines` ranked principal variations, best first. Empty when the position
    /// has nothing to search.
    fn analyse_multipv(
        &mut self,
        board: &B,
        depth: u32,
        lines: usize,
    ) -> Result<Vec<Line<B::Move>>, OracleError>;

    /// The move the oracle itself would play, or `None` if it offers none.
    fn play(&mut self, board: &B, depth: u32) -> Result<Option<B::Move>, OracleError>;
}

impl<B: Board, O: Oracle<B> + ?Sized> Oracle<B> for &mut O {
    fn analyse(&mut self, board: &B, depth: u32) -> Result<Evaluation, OracleError> {
        (**self).analyse(board, depth)
    }

    fn analyse_multipv(
        &mut self,
        board: &B,
        depth: u32,
        lines: usize,
    ) -> Result<Vec<Line<B::Move>>, OracleError> {
        (**self).analyse_multipv(board, depth, lines)
    }

    fn play(&mut self, board: &B, depth: u32) -> Result<Option<B::Move>, OracleError> {
        (**self).play(board, depth)
    }
}
