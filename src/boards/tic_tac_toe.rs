use crate::board::{Board, GameResult, Player};
use std::fmt::{Display, Formatter};

/// An implementation of the `Board` trait for the game of Tic-Tac-Toe.
///
/// The board is represented by a 9-element array, where each element corresponds to a cell.
/// A move is represented by a `u8` from 0 to 8.
#[derive(Debug, Clone)]
pub struct TicTacToeBoard {
    current_player: Player,
    field: [Option<Player>; 9],
    history: Vec<u8>,
    result: GameResult,
}

impl Default for TicTacToeBoard {
    /// Creates a new, empty Tic-Tac-Toe board with the first player ('X') to move.
    fn default() -> Self {
        Self {
            current_player: Player::First,
            field: [None; 9],
            history: Vec::with_capacity(9),
            result: GameResult::InProgress,
        }
    }
}

impl TicTacToeBoard {
    const LINES: [[usize; 3]; 8] = [
        [0, 1, 2],
        [3, 4, 5],
        [6, 7, 8],
        [0, 3, 6],
        [1, 4, 7],
        [2, 5, 8],
        [0, 4, 8],
        [2, 4, 6],
    ];

    fn compute_result(&self) -> GameResult {
        for [a, b, c] in Self::LINES {
            if let Some(player) = self.field[a] {
                if self.field[b] == Some(player) && self.field[c] == Some(player) {
                    return GameResult::won_by(player);
                }
            }
        }

        if self.field.iter().any(|x| x.is_none()) {
            GameResult::InProgress
        } else {
            GameResult::Draw
        }
    }
}

impl Board for TicTacToeBoard {
    type Move = u8;

    fn get_current_player(&self) -> Player {
        self.current_player
    }

    fn get_result(&self) -> GameResult {
        self.result
    }

    fn get_available_moves(&self) -> Vec<Self::Move> {
        if self.result != GameResult::InProgress {
            return Vec::new();
        }

        self.field
            .iter()
            .enumerate()
            .filter(|(_, x)| x.is_none())
            .map(|(i, _)| i as u8)
            .collect()
    }

    fn perform_move(&mut self, b_move: &Self::Move) {
        let cell = *b_move as usize;
        assert!(
            cell < 9 && self.field[cell].is_none() && self.result == GameResult::InProgress,
            "illegal tic-tac-toe move {}",
            b_move
        );
        self.field[cell] = Some(self.current_player);
        self.history.push(*b_move);
        self.current_player = self.current_player.other();
        self.result = self.compute_result();
    }

    fn undo_move(&mut self) -> Self::Move {
        let b_move = self
            .history
            .pop()
            .expect("undo_move called on a board without moves");
        self.field[b_move as usize] = None;
        self.current_player = self.current_player.other();
        self.result = self.compute_result();
        b_move
    }

    fn get_hash(&self) -> u128 {
        let mut hash = 0;
        for (i, &cell) in self.field.iter().enumerate() {
            let cell_value = match cell {
                None => 0,
                Some(Player::First) => 1,
                Some(Player::Second) => 2,
            };
            hash += cell_value * 3u128.pow(i as u32);
        }
        hash
    }

    fn move_to_text(&self, b_move: &Self::Move) -> String {
        b_move.to_string()
    }
}

impl Display for TicTacToeBoard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in self.field.chunks(3) {
            let cells: Vec<&str> = row
                .iter()
                .map(|cell| match cell {
                    None => ".",
                    Some(Player::First) => "X",
                    Some(Player::Second) => "O",
                })
                .collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}
