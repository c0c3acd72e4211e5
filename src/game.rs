use crate::board::{Board, Player, NUM_CELLS};
use crate::engine::Engine;
use log::{info, warn};
use std::fmt;
use std::io::{BufRead, Error, ErrorKind, Write};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    HumanWins,
    AiWins,
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HumanWins => write!(f, "You win!"),
            Self::AiWins => write!(f, "AI wins!"),
            Self::Draw => write!(f, "It's a draw!"),
        }
    }
}

/// A human against the engine on one board.
pub struct Game {
    board: Board,
    engine: Engine,
    use_pruning: bool,
    turn: Player,
}

impl Game {
    pub fn new(engine: Engine, use_pruning: bool, first: Player) -> Self {
        Self {
            board: Board::new(),
            engine,
            use_pruning,
            turn: first,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn human(&self) -> Player {
        self.engine.player().opponent()
    }

    /// Alternate turns until someone wins or the board fills up.
    ///
    /// Human moves are read one per line from `input`; everything the player
    /// sees goes to `output`.
    pub fn play<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<Outcome, Error> {
        write!(output, "{}", self.board)?;
        loop {
            let mover = self.turn;
            if mover == self.human() {
                self.handle_human_move(input, output)?;
            } else {
                self.make_engine_move(output)?;
            }
            write!(output, "{}", self.board)?;

            if let Some(outcome) = self.check_game_over(mover) {
                info!("Game over: {:?}", outcome);
                writeln!(output, "{}", outcome)?;
                return Ok(outcome);
            }
            self.turn = mover.opponent();
        }
    }

    fn handle_human_move<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> Result<(), Error> {
        let human = self.human();
        loop {
            write!(output, "Enter your move (0-8): ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Err(Error::new(ErrorKind::UnexpectedEof, "Input closed before the game ended"));
            }

            let idx = match parse_move(line.trim()) {
                Ok(idx) => idx,
                Err(e) => {
                    warn!("Rejected input: {}", e);
                    writeln!(output, "{}", e)?;
                    continue;
                }
            };
            if self.board.make_move(idx, human) {
                info!("Human ({}) played {}", human, idx);
                return Ok(());
            }
            writeln!(output, "Cell {} is already taken.", idx)?;
        }
    }

    fn make_engine_move<W: Write>(&mut self, output: &mut W) -> Result<(), Error> {
        writeln!(output, "AI is thinking...")?;
        let selected = self
            .engine
            .best_move(&mut self.board, self.use_pruning)
            .ok_or_else(|| Error::new(ErrorKind::Other, "No move available"))?;

        let placed = self.board.make_move(selected, self.engine.player());
        debug_assert!(placed);
        writeln!(
            output,
            "AI chose position {} (time: {:.4} seconds)",
            selected,
            self.engine.elapsed().as_secs_f64()
        )?;
        Ok(())
    }

    fn check_game_over(&self, mover: Player) -> Option<Outcome> {
        if self.board.winner(mover) {
            if mover == self.human() {
                Some(Outcome::HumanWins)
            } else {
                Some(Outcome::AiWins)
            }
        } else if self.board.is_full() {
            Some(Outcome::Draw)
        } else {
            None
        }
    }
}

fn parse_move(s: &str) -> Result<usize, Error> {
    let idx: usize = s.parse().map_err(|e| {
        Error::new(ErrorKind::InvalidInput, format!("Invalid move {:?}: {}", s, e))
    })?;
    if idx >= NUM_CELLS {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!("Move {} is out of range 0-{}", idx, NUM_CELLS - 1),
        ));
    }
    Ok(idx)
}
