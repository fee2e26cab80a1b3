use crate::board::{Board, GameResult, Player};
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::zobrist::Zobrist128;
use shakmaty::{Chess, Color, EnPassantMode, KnownOutcome, Move, Outcome, Position};
use std::fmt::{Display, Formatter};

/// Halfmove clock value at which the 75-move rule ends the game.
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;
const FIVEFOLD_REPETITION: usize = 5;

/// Standard chess from the initial position.
///
/// Wraps a `shakmaty` position and keeps the previous positions on a stack, so `undo_move`
/// restores the exact prior state. Besides checkmate, stalemate and insufficient material,
/// the game ends on the 75-move rule and on fivefold repetition.
#[derive(Debug, Clone, Default)]
pub struct ChessBoard {
    pos: Chess,
    history: Vec<(Chess, Move)>,
    seen: Vec<u128>,
}

impl ChessBoard {
    /// The underlying `shakmaty` position.
    pub fn position(&self) -> &Chess {
        &self.pos
    }

    /// FEN of the current position.
    pub fn fen(&self) -> String {
        Fen::from_position(&self.pos, EnPassantMode::Legal).to_string()
    }

    /// Moves played since the initial position, oldest first.
    pub fn moves(&self) -> impl Iterator<Item = &Move> {
        self.history.iter().map(|(_, m)| m)
    }

    /// Looks up a move given in UCI notation (`e2e4`, `e7e8q`), if it is legal here.
    pub fn parse_uci_move(&self, text: &str) -> Option<Move> {
        let uci: UciMove = text.parse().ok()?;
        uci.to_move(&self.pos).ok()
    }

    /// The UCI `position` command arguments that reproduce this board, including the move
    /// history so the engine can see repetitions.
    pub fn uci_position(&self) -> String {
        let mut command = String::from("startpos");
        if !self.history.is_empty() {
            command.push_str(" moves");
            for m in self.moves() {
                command.push(' ');
                command.push_str(&UciMove::from_standard(*m).to_string());
            }
        }
        command
    }

    fn repetitions(&self) -> usize {
        let current = self.get_hash();
        1 + self.seen.iter().filter(|&&h| h == current).count()
    }
}

fn player_of(color: Color) -> Player {
    match color {
        Color::White => Player::First,
        Color::Black => Player::Second,
    }
}

impl Board for ChessBoard {
    type Move = Move;

    fn get_current_player(&self) -> Player {
        player_of(self.pos.turn())
    }

    fn get_result(&self) -> GameResult {
        match self.pos.outcome() {
            Outcome::Known(KnownOutcome::Decisive { winner }) => {
                return GameResult::won_by(player_of(winner));
            }
            Outcome::Known(KnownOutcome::Draw) => return GameResult::Draw,
            Outcome::Unknown => {}
        }

        if self.pos.halfmoves() >= SEVENTY_FIVE_MOVE_PLIES
            || self.repetitions() >= FIVEFOLD_REPETITION
        {
            GameResult::Draw
        } else {
            GameResult::InProgress
        }
    }

    fn get_available_moves(&self) -> Vec<Self::Move> {
        self.pos.legal_moves().into_iter().collect()
    }

    fn perform_move(&mut self, b_move: &Self::Move) {
        assert!(
            self.pos.is_legal(*b_move),
            "illegal chess move {} in {}",
            b_move,
            self.fen()
        );
        let previous = self.pos.clone();
        self.seen.push(self.get_hash());
        self.pos.play_unchecked(*b_move);
        self.history.push((previous, *b_move));
    }

    fn undo_move(&mut self) -> Self::Move {
        let (previous, b_move) = self
            .history
            .pop()
            .expect("undo_move called on a board without moves");
        self.seen.pop();
        self.pos = previous;
        b_move
    }

    fn get_hash(&self) -> u128 {
        self.pos
            .zobrist_hash::<Zobrist128>(EnPassantMode::Legal)
            .0
    }

    fn move_to_text(&self, b_move: &Self::Move) -> String {
        UciMove::from_standard(*b_move).to_string()
    }

    fn move_to_san(&self, b_move: &Self::Move) -> String {
        SanPlus::from_move(self.pos.clone(), *b_move).to_string()
    }
}

impl Display for ChessBoard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.pos.board())
    }
}
