use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;
use std::ops::{Deref, DerefMut};

/// The rules collaborator: the authoritative game state that the self-play driver mutates.
///
/// Implementations own legal-move generation and terminal detection. The driver and the
/// reward function only ever mutate a board through [`Board::perform_move`] and
/// [`Board::undo_move`], always strictly paired (see [`Pushed`]).
pub trait Board: Default + Clone {
    /// The type representing a move in the game. Moves are used as map keys, so they need
    /// equality and hashing.
    type Move: Clone + Eq + Hash + Debug;

    /// Returns the player whose turn it is to make a move.
    fn get_current_player(&self) -> Player;

    /// Returns the result of the game, [`GameResult::InProgress`] while it is still running.
    fn get_result(&self) -> GameResult;

    /// Returns a list of all legal moves available from the current state, in a stable order.
    fn get_available_moves(&self) -> Vec<Self::Move>;

    /// Applies a given move to the board, pushing it onto the move stack.
    ///
    /// Panics if the move is not legal in the current position.
    fn perform_move(&mut self, b_move: &Self::Move);

    /// Takes back the last performed move and returns it.
    ///
    /// Panics if no move has been performed.
    fn undo_move(&mut self) -> Self::Move;

    /// Returns a hash value for the current board state.
    fn get_hash(&self) -> u128;

    /// Returns a short, position-independent notation for a move (e.g. `e2e4`).
    fn move_to_text(&self, b_move: &Self::Move) -> String;

    /// Returns the notation used in game records. Defaults to [`Board::move_to_text`].
    fn move_to_san(&self, b_move: &Self::Move) -> String {
        self.move_to_text(b_move)
    }

    /// Whether the rules declare the game over.
    fn is_game_over(&self) -> bool {
        self.get_result() != GameResult::InProgress
    }
}

/// The two sides of the game. `First` moves first (White in chess).
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Player {
    First = 1,
    Second = 2,
}

impl Player {
    pub fn other(self) -> Player {
        match self {
            Player::First => Player::Second,
            Player::Second => Player::First,
        }
    }
}

/// The result of a game as reported by the rules collaborator.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum GameResult {
    /// The game is still ongoing.
    InProgress,
    /// The first player has won.
    FirstWins,
    /// The second player has won.
    SecondWins,
    /// The game has ended in a draw.
    Draw,
}

impl GameResult {
    pub fn won_by(player: Player) -> GameResult {
        match player {
            Player::First => GameResult::FirstWins,
            Player::Second => GameResult::SecondWins,
        }
    }
}

impl Display for GameResult {
    /// Formats the result the way game records spell it: `1-0`, `0-1`, `1/2-1/2` or `*`.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GameResult::InProgress => "*",
            GameResult::FirstWins => "1-0",
            GameResult::SecondWins => "0-1",
            GameResult::Draw => "1/2-1/2",
        };
        f.write_str(s)
    }
}

/// A move that has been pushed onto a board and is popped again when the guard is dropped.
///
/// All "apply a hypothetical move, analyse, take it back" code goes through this guard, so the
/// board is restored on every exit path, including `?` early returns.
pub struct Pushed<'a, B: Board> {
    board: &'a mut B,
}

impl<'a, B: Board> Pushed<'a, B> {
    pub fn new(board: &'a mut B, b_move: &B::Move) -> Self {
        board.perform_move(b_move);
        Pushed { board }
    }
}

impl<B: Board> Deref for Pushed<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.board
    }
}

impl<B: Board> DerefMut for Pushed<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.board
    }
}

impl<B: Board> Drop for Pushed<'_, B> {
    fn drop(&mut self) {
        self.board.undo_move();
    }
}

#[cfg(test)]
mod tests {
    use crate::board::{Board, GameResult, Player, Pushed};
    use crate::boards::tic_tac_toe::TicTacToeBoard;

    #[test]
    fn pushed_guard_restores_board() {
        // arrange
        let mut board = TicTacToeBoard::default();
        let before = board.get_hash();

        // act
        {
            let pushed = Pushed::new(&mut board, &4);
            assert_ne!(pushed.get_hash(), before);
            assert_eq!(pushed.get_current_player(), Player::Second);
        }

        // assert
        assert_eq!(board.get_hash(), before);
        assert_eq!(board.get_current_player(), Player::First);
    }

    #[test]
    fn pushed_guard_restores_board_on_early_return() {
        fn fails(board: &mut TicTacToeBoard) -> Result<(), ()> {
            let mut pushed = Pushed::new(board, &0);
            let _inner = Pushed::new(&mut *pushed, &1);
            Err(())
        }

        let mut board = TicTacToeBoard::default();
        let before = board.get_hash();
        assert!(fails(&mut board).is_err());
        assert_eq!(board.get_hash(), before);
        assert_eq!(board.get_available_moves().len(), 9);
    }

    #[test]
    fn result_strings() {
        assert_eq!(GameResult::InProgress.to_string(), "*");
        assert_eq!(GameResult::won_by(Player::First).to_string(), "1-0");
        assert_eq!(GameResult::won_by(Player::Second).to_string(), "0-1");
        assert_eq!(GameResult::Draw.to_string(), "1/2-1/2");
    }
}
