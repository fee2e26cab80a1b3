use crate::board::{Board, GameResult};
use crate::config::MatchConfig;
use crate::selfplay::CappedOutcome;
use std::fmt::Write;

const PGN_LINE_WIDTH: usize = 80;

/// The seven-tag roster of a recorded game.
#[derive(Debug, Clone, PartialEq)]
pub struct Headers {
    pub event: String,
    pub site: String,
    /// `YYYY.MM.DD`
    pub date: String,
    pub round: u32,
    pub white: String,
    pub black: String,
    pub result: String,
}

impl Headers {
    /// Headers for game number `round` of a match, dated today.
    pub fn for_round(config: &MatchConfig, round: u32) -> Self {
        Headers {
            event: format!("{} {}", config.event, round),
            site: config.site.clone(),
            date: chrono::Local::now().format("%Y.%m.%d").to_string(),
            round,
            white: config.white.clone(),
            black: config.black.clone(),
            result: GameResult::InProgress.to_string(),
        }
    }

    fn tags(&self) -> [(&'static str, String); 7] {
        [
            ("Event", self.event.clone()),
            ("Site", self.site.clone()),
            ("Date", self.date.clone()),
            ("Round", self.round.to_string()),
            ("White", self.white.clone()),
            ("Black", self.black.clone()),
            ("Result", self.result.clone()),
        ]
    }
}

/// Moves of one game in the order they were played.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord<M> {
    pub headers: Headers,
    moves: Vec<M>,
    note: Option<CappedOutcome>,
}

impl<M: Clone> GameRecord<M> {
    pub fn new(headers: Headers) -> Self {
        GameRecord {
            headers,
            moves: Vec::new(),
            note: None,
        }
    }

    pub fn push(&mut self, b_move: M) {
        self.moves.push(b_move);
    }

    pub fn moves(&self) -> &[M] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn set_result(&mut self, result: GameResult) {
        self.headers.result = result.to_string();
    }

    /// The verdict given when the game was stopped at the move cap.
    pub fn note(&self) -> Option<CappedOutcome> {
        self.note
    }

    pub fn set_note(&mut self, note: CappedOutcome) {
        self.note = Some(note);
    }

    /// Replays the recorded moves from the starting position `start`.
    pub fn replay<B: Board<Move = M>>(&self, start: B) -> B {
        let mut board = start;
        for b_move in &self.moves {
            board.perform_move(b_move);
        }
        board
    }

    /// Renders the game as PGN: tag pairs, then numbered SAN movetext ending in the result.
    pub fn to_pgn<B: Board<Move = M>>(&self, start: B) -> String {
        let mut pgn = String::new();
        for (tag, value) in self.headers.tags() {
            let _ = writeln!(pgn, "[{} \"{}\"]", tag, value.replace('"', "\\\""));
        }
        pgn.push('\n');

        let mut board = start;
        let mut tokens = Vec::with_capacity(self.moves.len() * 3 / 2 + 1);
        for (ply, b_move) in self.moves.iter().enumerate() {
            if ply % 2 == 0 {
                tokens.push(format!("{}.", ply / 2 + 1));
            }
            tokens.push(board.move_to_san(b_move));
            board.perform_move(b_move);
        }
        tokens.push(self.headers.result.clone());

        let mut line_len = 0;
        for token in tokens {
            if line_len > 0 && line_len + 1 + token.len() > PGN_LINE_WIDTH {
                pgn.push('\n');
                line_len = 0;
            } else if line_len > 0 {
                pgn.push(' ');
                line_len += 1;
            }
            line_len += token.len();
            pgn.push_str(&token);
        }
        pgn.push('\n');
        pgn
    }
}
