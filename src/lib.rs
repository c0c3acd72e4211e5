pub mod board;
pub mod engine;
pub mod game;

pub use crate::board::{Board, Cell, Player, NUM_CELLS, WIN_CONDITIONS};
pub use crate::engine::Engine;
pub use crate::game::{Game, Outcome};
