//! The two move-selection policies of a self-play game.

use crate::board::Board;
use crate::config::TrickPolicy;
use crate::oracle::{Oracle, OracleError};
use crate::random::RandomGenerator;
use crate::reward::compute_reward;
use indexmap::IndexMap;
use std::hash::Hash;
use tracing::debug;

/// Rewards of every candidate at one decision point, in legal-move order.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardRecord<M: Hash + Eq> {
    rewards: IndexMap<M, f64>,
}

impl<M: Hash + Eq> Default for RewardRecord<M> {
    fn default() -> Self {
        RewardRecord {
            rewards: IndexMap::new(),
        }
    }
}

impl<M: Hash + Eq> RewardRecord<M> {
    pub fn insert(&mut self, b_move: M, reward: f64) {
        self.rewards.insert(b_move, reward);
    }

    pub fn get(&self, b_move: &M) -> Option<f64> {
        self.rewards.get(b_move).copied()
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&M, f64)> {
        self.rewards.iter().map(|(m, r)| (m, *r))
    }

    /// The highest reward strictly above `threshold`. On ties the earliest move wins.
    pub fn best_above(&self, threshold: f64) -> Option<(&M, f64)> {
        let mut best: Option<(&M, f64)> = None;
        for (b_move, reward) in self.iter() {
            if reward <= threshold {
                continue;
            }
            match best {
                Some((_, best_reward)) if reward <= best_reward => {}
                _ => best = Some((b_move, reward)),
            }
        }
        best
    }
}

/// Scores every legal move for the side to move.
pub fn reward_record<B, O>(
    board: &mut B,
    oracle: &mut O,
    policy: &TrickPolicy,
) -> Result<RewardRecord<B::Move>, OracleError>
where
    B: Board,
    O: Oracle<B> + ?Sized,
{
    let mut record = RewardRecord::default();
    for candidate in board.get_available_moves() {
        let reward = compute_reward(board, &candidate, oracle, policy)?;
        debug!(candidate = %board.move_to_text(&candidate), reward, "candidate reward");
        record.insert(candidate, reward);
    }
    Ok(record)
}

/// Picks the legal move with the highest reward above `policy.trick_threshold`, together with
/// its reward. `None` when no move qualifies.
pub fn select_trick_move<B, O>(
    board: &mut B,
    oracle: &mut O,
    policy: &TrickPolicy,
) -> Result<Option<(B::Move, f64)>, OracleError>
where
    B: Board,
    O: Oracle<B> + ?Sized,
{
    let record = reward_record(board, oracle, policy)?;
    Ok(record
        .best_above(policy.trick_threshold)
        .map(|(b_move, reward)| (b_move.clone(), reward)))
}

/// The oracle's own preference among its top `policy.select_lines` lines.
///
/// With probability `policy.baseline_randomness` the first move of a uniformly chosen line is
/// returned instead of the best one. `None` when there is nothing to play.
pub fn select_baseline_move<B, O, K>(
    board: &B,
    oracle: &mut O,
    policy: &TrickPolicy,
    random: &mut K,
) -> Result<Option<B::Move>, OracleError>
where
    B: Board,
    O: Oracle<B> + ?Sized,
    K: RandomGenerator,
{
    let legal_moves = board.get_available_moves();
    if legal_moves.is_empty() {
        return Ok(None);
    }

    let lines = oracle.analyse_multipv(board, policy.select_depth, policy.select_lines)?;
    let explore = policy.baseline_randomness > 0.0
        && !lines.is_empty()
        && random.next_unit() < policy.baseline_randomness;
    let line = if explore {
        random.get_random_from_slice(&lines)
    } else {
        lines.iter().min_by_key(|line| line.rank)
    };

    match line.and_then(|line| line.first_move()) {
        Some(b_move) => ensure_legal(board, &legal_moves, b_move.clone()).map(Some),
        None => Ok(None),
    }
}

/// Rejects a move the oracle suggested that the rules do not allow.
pub(crate) fn ensure_legal<B: Board>(
    board: &B,
    legal_moves: &[B::Move],
    b_move: B::Move,
) -> Result<B::Move, OracleError> {
    if legal_moves.contains(&b_move) {
        Ok(b_move)
    } else {
        Err(OracleError::IllegalMove(board.move_to_text(&b_move)))
    }
}
