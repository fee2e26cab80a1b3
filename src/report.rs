use crate::board::Board;
use crate::selfplay::FinishedGame;
use std::fmt::Display;
use std::io::{self, Write};

/// Receives every finished game of a run.
pub trait Reporter<B: Board> {
    fn report(&mut self, game: &FinishedGame<B>) -> io::Result<()>;
}

/// Prints the capped-outcome verdict, the result line, the final position and the PGN.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        ConsoleReporter { out: io::stdout() }
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        ConsoleReporter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<B: Board + Display, W: Write> Reporter<B> for ConsoleReporter<W> {
    fn report(&mut self, game: &FinishedGame<B>) -> io::Result<()> {
        if let Some(note) = game.record.note() {
            writeln!(self.out, "{note}")?;
        }
        writeln!(
            self.out,
            "\nGame {} complete. Final Result: {}",
            game.record.headers.round, game.record.headers.result
        )?;
        writeln!(self.out, "Final Board Position:\n{}", game.board)?;
        writeln!(self.out, "\nPGN of the game:\n{}", game.to_pgn())?;
        self.out.flush()
    }
}
