//! Scripted collaborators for unit tests: a game tree keyed by move path and oracles that
//! answer from tables instead of searching.

use crate::board::{Board, GameResult, Player};
use crate::oracle::{Evaluation, Line, Oracle, OracleError};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Debug, Default)]
struct Script {
    children: HashMap<String, Vec<String>>,
    results: HashMap<String, GameResult>,
    fallback: Vec<String>,
}

/// A board whose legal moves are looked up by the path of moves played so far
/// (`""` for the root, `"a x"` after `a` then `x`).
///
/// Paths without an entry use the fallback moves, so an endless game is a board with a
/// fallback and no nodes. A path without moves ends the game with its scripted result,
/// a draw unless set otherwise.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBoard {
    script: Rc<Script>,
    history: Vec<String>,
}

pub struct ScriptedBoardBuilder {
    script: Script,
}

impl ScriptedBoardBuilder {
    pub fn node(mut self, path: &str, moves: &[&str]) -> Self {
        self.script.children.insert(
            path.to_string(),
            moves.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    pub fn result(mut self, path: &str, result: GameResult) -> Self {
        self.script.results.insert(path.to_string(), result);
        self
    }

    pub fn fallback(mut self, moves: &[&str]) -> Self {
        self.script.fallback = moves.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn build(self) -> ScriptedBoard {
        ScriptedBoard {
            script: Rc::new(self.script),
            history: Vec::new(),
        }
    }
}

impl ScriptedBoard {
    pub fn builder() -> ScriptedBoardBuilder {
        ScriptedBoardBuilder {
            script: Script::default(),
        }
    }

    pub fn path(&self) -> String {
        self.history.join(" ")
    }

    fn children(&self) -> &[String] {
        self.script
            .children
            .get(&self.path())
            .unwrap_or(&self.script.fallback)
    }
}

impl Board for ScriptedBoard {
    type Move = String;

    fn get_current_player(&self) -> Player {
        if self.history.len() % 2 == 0 {
            Player::First
        } else {
            Player::Second
        }
    }

    fn get_result(&self) -> GameResult {
        if !self.children().is_empty() {
            return GameResult::InProgress;
        }
        self.script
            .results
            .get(&self.path())
            .copied()
            .unwrap_or(GameResult::Draw)
    }

    fn get_available_moves(&self) -> Vec<Self::Move> {
        self.children().to_vec()
    }

    fn perform_move(&mut self, b_move: &Self::Move) {
        assert!(
            self.children().contains(b_move),
            "illegal scripted move {} after '{}'",
            b_move,
            self.path()
        );
        self.history.push(b_move.clone());
    }

    fn undo_move(&mut self) -> Self::Move {
        self.history
            .pop()
            .expect("undo_move called on a board without moves")
    }

    fn get_hash(&self) -> u128 {
        let mut hasher = DefaultHasher::new();
        self.history.hash(&mut hasher);
        hasher.finish() as u128
    }

    fn move_to_text(&self, b_move: &Self::Move) -> String {
        b_move.clone()
    }
}

impl Display for ScriptedBoard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.path())
    }
}

/// Answers by the board's move path. Unscripted positions evaluate to the default evaluation,
/// rank the legal moves in order and play the first one.
pub struct ScriptedOracle {
    evals: HashMap<String, Evaluation>,
    lines: HashMap<String, Vec<Line<String>>>,
    plays: HashMap<String, Option<String>>,
    default_eval: Evaluation,
    failing_at: Option<String>,
    calls: usize,
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        ScriptedOracle {
            evals: HashMap::new(),
            lines: HashMap::new(),
            plays: HashMap::new(),
            default_eval: Evaluation::centipawns(0),
            failing_at: None,
            calls: 0,
        }
    }
}

impl ScriptedOracle {
    pub fn with_eval(mut self, path: &str, evaluation: Evaluation) -> Self {
        self.evals.insert(path.to_string(), evaluation);
        self
    }

    pub fn with_default_eval(mut self, evaluation: Evaluation) -> Self {
        self.default_eval = evaluation;
        self
    }

    /// Ranked lines for `path`, each given as `(centipawns, first move)`.
    pub fn with_lines(mut self, path: &str, lines: &[(i32, &str)]) -> Self {
        let lines = lines
            .iter()
            .enumerate()
            .map(|(i, (cp, m))| Line {
                rank: i + 1,
                evaluation: Evaluation::centipawns(*cp),
                moves: vec![m.to_string()],
            })
            .collect();
        self.lines.insert(path.to_string(), lines);
        self
    }

    pub fn with_play(mut self, path: &str, b_move: Option<&str>) -> Self {
        self.plays
            .insert(path.to_string(), b_move.map(str::to_string));
        self
    }

    /// Every request on `path` fails as if the engine had died.
    pub fn failing_at(mut self, path: &str) -> Self {
        self.failing_at = Some(path.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    fn begin(&mut self, board: &ScriptedBoard) -> Result<String, OracleError> {
        self.calls += 1;
        let path = board.path();
        if self.failing_at.as_deref() == Some(path.as_str()) {
            return Err(OracleError::Unavailable(format!("scripted failure at '{path}'")));
        }
        Ok(path)
    }
}

impl Oracle<ScriptedBoard> for ScriptedOracle {
    fn analyse(&mut self, board: &ScriptedBoard, _depth: u32) -> Result<Evaluation, OracleError> {
        let path = self.begin(board)?;
        Ok(self.evals.get(&path).copied().unwrap_or(self.default_eval))
    }

    fn analyse_multipv(
        &mut self,
        board: &ScriptedBoard,
        _depth: u32,
        lines: usize,
    ) -> Result<Vec<Line<String>>, OracleError> {
        let path = self.begin(board)?;
        if let Some(scripted) = self.lines.get(&path) {
            return Ok(scripted.iter().take(lines).cloned().collect());
        }
        Ok(ranked_in_order(board, lines, self.default_eval))
    }

    fn play(&mut self, board: &ScriptedBoard, _depth: u32) -> Result<Option<String>, OracleError> {
        let path = self.begin(board)?;
        match self.plays.get(&path) {
            Some(b_move) => Ok(b_move.clone()),
            None => Ok(board.get_available_moves().into_iter().next()),
        }
    }
}

/// Evaluates every position as dead equal and always prefers the first legal move.
#[derive(Debug, Default)]
pub struct FlatOracle {
    calls: usize,
}

impl FlatOracle {
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl<B: Board> Oracle<B> for FlatOracle {
    fn analyse(&mut self, _board: &B, _depth: u32) -> Result<Evaluation, OracleError> {
        self.calls += 1;
        Ok(Evaluation::centipawns(0))
    }

    fn analyse_multipv(
        &mut self,
        board: &B,
        _depth: u32,
        lines: usize,
    ) -> Result<Vec<Line<B::Move>>, OracleError> {
        self.calls += 1;
        Ok(ranked_in_order(board, lines, Evaluation::centipawns(0)))
    }

    fn play(&mut self, board: &B, _depth: u32) -> Result<Option<B::Move>, OracleError> {
        self.calls += 1;
        Ok(board.get_available_moves().into_iter().next())
    }
}

fn ranked_in_order<B: Board>(board: &B, lines: usize, evaluation: Evaluation) -> Vec<Line<B::Move>> {
    board
        .get_available_moves()
        .into_iter()
        .take(lines)
        .enumerate()
        .map(|(i, m)| Line {
            rank: i + 1,
            evaluation,
            moves: vec![m],
        })
        .collect()
}
