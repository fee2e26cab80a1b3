//! Reward shaping: how strongly a candidate move traps the opponent.

use crate::board::{Board, Pushed};
use crate::config::TrickPolicy;
use crate::oracle::{Oracle, OracleError};
use tracing::trace;

/// How many of the side to move's replies avoid a losing evaluation.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Robustness {
    /// Number of legal replies that were examined.
    pub replies: usize,
    /// Replies scoring strictly above the losing threshold. Always `<= replies`.
    pub non_losing: usize,
}

impl Robustness {
    /// No legal reply exists at all (mate or stalemate), as opposed to "every reply loses".
    pub fn has_no_replies(&self) -> bool {
        self.replies == 0
    }

    /// Exactly one reply keeps the side to move out of a losing position.
    pub fn is_only_move(&self) -> bool {
        self.non_losing == 1
    }
}

/// Plays every legal reply on `board`, scores it at `policy.reply_depth` and counts the replies
/// whose evaluation, seen from the side to move after the reply, is strictly above
/// `policy.losing_threshold`.
///
/// One oracle call per legal reply. The board is left exactly as it was passed in.
pub fn count_non_losing_replies<B, O>(
    board: &mut B,
    oracle: &mut O,
    policy: &TrickPolicy,
) -> Result<Robustness, OracleError>
where
    B: Board,
    O: Oracle<B> + ?Sized,
{
    let replies = board.get_available_moves();
    let mut non_losing = 0;

    for reply in &replies {
        let after = Pushed::new(board, reply);
        let score = oracle
            .analyse(&after, policy.reply_depth)?
            .to_centipawns(policy.mate_score);
        trace!(reply = ?reply, score, "scored reply");
        if score > policy.losing_threshold {
            non_losing += 1;
        }
    }

    Ok(Robustness {
        replies: replies.len(),
        non_losing,
    })
}

/// Scalar reward of playing `candidate` on `board` for the side to move.
///
/// The evaluation after the move is taken from the opponent's point of view, so it is negated:
/// `-eval / 100`. A bonus of `policy.trick_bonus` is added when the opponent is left with
/// exactly one non-losing reply and the position is not already decided
/// (`eval < policy.trick_eval_ceiling`).
pub fn compute_reward<B, O>(
    board: &mut B,
    candidate: &B::Move,
    oracle: &mut O,
    policy: &TrickPolicy,
) -> Result<f64, OracleError>
where
    B: Board,
    O: Oracle<B> + ?Sized,
{
    let mut after = Pushed::new(board, candidate);
    let robustness = count_non_losing_replies(&mut *after, oracle, policy)?;
    let eval_after = oracle
        .analyse(&after, policy.reward_depth)?
        .to_centipawns(policy.mate_score);

    let trick_bonus = if eval_after < policy.trick_eval_ceiling && robustness.is_only_move() {
        policy.trick_bonus
    } else {
        0.0
    };
    let base_reward = -(eval_after as f64) / 100.0;

    Ok(base_reward + trick_bonus)
}
