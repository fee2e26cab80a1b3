use crate::board::{Board, Player};
use crate::config::{MatchConfig, TrickPolicy};
use crate::error::Error;
use crate::game_record::{GameRecord, Headers};
use crate::oracle::{Oracle, OracleError};
use crate::random::{RandomGenerator, StandardRandomGenerator};
use crate::report::Reporter;
use crate::selector::{ensure_legal, select_baseline_move, select_trick_move};
use std::fmt::{Display, Formatter};
use tracing::{debug, info, warn};

/// Verdict of a game that was stopped at the move cap, judged by the oracle's evaluation from
/// the first player's point of view.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum CappedOutcome {
    Draw,
    FirstWins,
    SecondWins,
}

impl CappedOutcome {
    /// Classifies an evaluation (centipawns, first player's perspective).
    pub fn classify(eval: i32, draw_margin: i32) -> CappedOutcome {
        if eval <= -draw_margin {
            CappedOutcome::SecondWins
        } else if eval >= draw_margin {
            CappedOutcome::FirstWins
        } else {
            CappedOutcome::Draw
        }
    }
}

impl Display for CappedOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CappedOutcome::Draw => "Draw!",
            CappedOutcome::FirstWins => "White wins!",
            CappedOutcome::SecondWins => "Black wins!",
        };
        f.write_str(s)
    }
}

/// Why a game stopped.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum GameEnd {
    /// The rules ended the game (or left nothing to play).
    Terminal,
    /// The move cap was reached, even if the last reply also ended the game.
    CappedAtMoveLimit(CappedOutcome),
    /// The oracle offered no move although the rules still allowed some.
    OracleResigned,
}

/// A finished game as handed to a [`Reporter`].
#[derive(Debug, Clone)]
pub struct FinishedGame<B: Board> {
    pub record: GameRecord<B::Move>,
    /// The position the game started from.
    pub start: B,
    /// The final position.
    pub board: B,
    pub end: GameEnd,
}

impl<B: Board> FinishedGame<B> {
    pub fn to_pgn(&self) -> String {
        self.record.to_pgn(self.start.clone())
    }
}

/// Plays games between the trick-seeking side (always the first player) and the oracle's
/// baseline play (the second player).
///
/// One oracle session is used for all games. It is dropped, and so shut down, together with
/// the driver.
pub struct SelfPlay<B: Board, O: Oracle<B>, K: RandomGenerator> {
    start: B,
    oracle: O,
    policy: TrickPolicy,
    match_config: MatchConfig,
    random: K,
}

/// A builder for creating instances of `SelfPlay`.
pub struct SelfPlayBuilder<B: Board, O: Oracle<B>, K: RandomGenerator> {
    start: B,
    oracle: O,
    policy: TrickPolicy,
    match_config: MatchConfig,
    random_generator: K,
}

impl<B: Board, O: Oracle<B>, K: RandomGenerator> SelfPlayBuilder<B, O, K> {
    pub fn new(oracle: O) -> Self {
        Self {
            start: B::default(),
            oracle,
            policy: TrickPolicy::default(),
            match_config: MatchConfig::default(),
            random_generator: K::default(),
        }
    }

    /// Sets the position every game starts from. Defaults to `B::default()`.
    pub fn with_start(mut self, board: B) -> Self {
        self.start = board;
        self
    }

    pub fn with_policy(mut self, policy: TrickPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_match(mut self, match_config: MatchConfig) -> Self {
        self.match_config = match_config;
        self
    }

    /// Sets the random number generator used by the randomized baseline.
    pub fn with_random_generator(mut self, rg: K) -> Self {
        self.random_generator = rg;
        self
    }

    pub fn build(self) -> SelfPlay<B, O, K> {
        SelfPlay {
            start: self.start,
            oracle: self.oracle,
            policy: self.policy,
            match_config: self.match_config,
            random: self.random_generator,
        }
    }
}

impl<B: Board, O: Oracle<B>> SelfPlay<B, O, StandardRandomGenerator> {
    /// A driver with default policy and match settings.
    pub fn new(oracle: O) -> Self {
        SelfPlayBuilder::new(oracle).build()
    }
}

impl<B: Board, O: Oracle<B>, K: RandomGenerator> SelfPlay<B, O, K> {
    pub fn builder(oracle: O) -> SelfPlayBuilder<B, O, K> {
        SelfPlayBuilder::new(oracle)
    }

    pub fn policy(&self) -> &TrickPolicy {
        &self.policy
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Gives the oracle back, e.g. to shut it down explicitly.
    pub fn into_oracle(self) -> O {
        self.oracle
    }

    /// Plays `match_config.games` games in sequence and hands each one to `reporter`.
    ///
    /// The first oracle or reporter failure aborts the run.
    pub fn run<R: Reporter<B>>(&mut self, reporter: &mut R) -> Result<Vec<GameEnd>, Error> {
        let mut ends = Vec::with_capacity(self.match_config.games as usize);
        for round in 1..=self.match_config.games {
            let game = self.play_game(round)?;
            reporter.report(&game)?;
            ends.push(game.end);
        }
        Ok(ends)
    }

    /// Plays one game from the starting position. `round` only labels the record.
    pub fn play_game(&mut self, round: u32) -> Result<FinishedGame<B>, OracleError> {
        let mut board = self.start.clone();
        let mut record = GameRecord::new(Headers::for_round(&self.match_config, round));
        let mut full_moves = 0;
        info!(round, "starting game");

        let end = loop {
            if board.is_game_over() {
                break GameEnd::Terminal;
            }

            let trick_move = match select_trick_move(&mut board, &mut self.oracle, &self.policy)? {
                Some((b_move, reward)) => {
                    debug!(round, b_move = %board.move_to_text(&b_move), reward, "playing trick move");
                    b_move
                }
                None => match self.oracle.play(&board, self.policy.play_depth)? {
                    Some(b_move) => ensure_legal(&board, &board.get_available_moves(), b_move)?,
                    None => break self.no_move_offered(&board, round),
                },
            };
            board.perform_move(&trick_move);
            record.push(trick_move);

            if board.is_game_over() {
                break GameEnd::Terminal;
            }

            let baseline =
                select_baseline_move(&board, &mut self.oracle, &self.policy, &mut self.random)?;
            match baseline {
                Some(b_move) => {
                    board.perform_move(&b_move);
                    record.push(b_move);
                }
                None => break self.no_move_offered(&board, round),
            }
            full_moves += 1;

            if full_moves >= self.policy.move_cap {
                let eval = self
                    .oracle
                    .analyse(&board, self.policy.play_depth)?
                    .to_centipawns(self.policy.mate_score);
                let first_player_eval = match board.get_current_player() {
                    Player::First => eval,
                    Player::Second => -eval,
                };
                let outcome = CappedOutcome::classify(first_player_eval, self.policy.draw_margin);
                info!(round, eval = first_player_eval, %outcome, "move cap reached");
                break GameEnd::CappedAtMoveLimit(outcome);
            }
            if board.is_game_over() {
                break GameEnd::Terminal;
            }
        };

        if let GameEnd::CappedAtMoveLimit(outcome) = end {
            record.set_note(outcome);
        }
        record.set_result(board.get_result());
        info!(round, result = %record.headers.result, moves = record.len(), "game complete");

        Ok(FinishedGame {
            record,
            start: self.start.clone(),
            board,
            end,
        })
    }

    fn no_move_offered(&self, board: &B, round: u32) -> GameEnd {
        if board.get_available_moves().is_empty() {
            GameEnd::Terminal
        } else {
            warn!(round, position = %board.get_hash(), "oracle offered no move in a live position");
            GameEnd::OracleResigned
        }
    }
}
