use bitvec::{prelude::*, slice::IterOnes};
use lazy_static::lazy_static;
use std::fmt;
use std::io::{Error, ErrorKind};
use std::str::FromStr;

const SIZE: usize = 3;
pub const NUM_CELLS: usize = SIZE * SIZE;
pub type BitBoard = BitArr!(for NUM_CELLS, in u16, Lsb0);
// bit i is cell i, row-major from the top left corner
// the 7 padding bits of the u16 are never set

pub trait BitArrCells {
    fn empty() -> Self;
    fn from_cells(indices: &[usize]) -> Self;
    fn iter_set_cells(&self) -> IterOnes<'_, u16, Lsb0>;
}

impl BitArrCells for BitBoard {
    fn empty() -> Self {
        bitarr!(u16, Lsb0; 0; NUM_CELLS)
    }

    fn from_cells(indices: &[usize]) -> Self {
        let mut squares = BitBoard::empty();
        for &idx in indices {
            squares.set(idx, true);
        }
        squares
    }

    fn iter_set_cells(&self) -> IterOnes<'_, u16, Lsb0> {
        self[..NUM_CELLS].iter_ones()
    }
}

/// Rows, columns, then the two diagonals.
pub const WIN_CONDITIONS: [[usize; 3]; 8] = [
    [0, 1, 2], [3, 4, 5], [6, 7, 8],
    [0, 3, 6], [1, 4, 7], [2, 5, 8],
    [0, 4, 8], [2, 4, 6],
];

lazy_static! {
    static ref WIN_MASKS: Vec<BitBoard> = WIN_CONDITIONS
        .iter()
        .map(|condition| BitBoard::from_cells(condition))
        .collect();
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Player {
    X,
    O,
}

impl Player {
    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Cell::from(*self).to_char())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Self::Empty => ' ',
            Self::X => 'X',
            Self::O => 'O',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '.' | '_' => Some(Self::Empty),
            'x' | 'X' => Some(Self::X),
            'o' | 'O' => Some(Self::O),
            _ => None,
        }
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::X => Self::X,
            Player::O => Self::O,
        }
    }
}

/// A 3x3 board, one bitboard per player.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    x_squares: BitBoard,
    o_squares: BitBoard,
}

impl Board {
    pub fn new() -> Self {
        Self {
            x_squares: BitBoard::empty(),
            o_squares: BitBoard::empty(),
        }
    }

    pub fn from_cells(cells: [Cell; NUM_CELLS]) -> Self {
        let mut board = Self::new();
        for (idx, cell) in cells.into_iter().enumerate() {
            match cell {
                Cell::X => board.x_squares.set(idx, true),
                Cell::O => board.o_squares.set(idx, true),
                Cell::Empty => {}
            }
        }
        board
    }

    fn player_squares(&self, player: Player) -> BitBoard {
        match player {
            Player::X => self.x_squares,
            Player::O => self.o_squares,
        }
    }

    fn player_squares_mut(&mut self, player: Player) -> &mut BitBoard {
        match player {
            Player::X => &mut self.x_squares,
            Player::O => &mut self.o_squares,
        }
    }

    fn empty_squares(&self) -> BitBoard {
        !(self.x_squares | self.o_squares)
    }

    /// # Panics
    /// Panics if the index >= 9.
    pub fn cell(&self, index: usize) -> Cell {
        assert!(index < NUM_CELLS);
        if self.x_squares[index] {
            Cell::X
        } else if self.o_squares[index] {
            Cell::O
        } else {
            Cell::Empty
        }
    }

    pub fn cells(&self) -> [Cell; NUM_CELLS] {
        std::array::from_fn(|idx| self.cell(idx))
    }

    /// Indices of the empty cells, in ascending order.
    pub fn available_moves(&self) -> Vec<usize> {
        self.empty_squares().iter_set_cells().collect()
    }

    /// Place `player` on the cell at `index` if it is empty.
    ///
    /// Returns `false` and leaves the board untouched if the cell is taken.
    ///
    /// # Panics
    /// Panics if the index >= 9.
    pub fn make_move(&mut self, index: usize, player: Player) -> bool {
        if self.cell(index) != Cell::Empty {
            return false;
        }
        self.player_squares_mut(player).set(index, true);
        true
    }

    pub fn retract_move(&mut self, index: usize) {
        assert!(index < NUM_CELLS);
        self.x_squares.set(index, false);
        self.o_squares.set(index, false);
    }

    pub fn winner(&self, player: Player) -> bool {
        let squares = self.player_squares(player);
        WIN_MASKS.iter().any(|win_mask| *win_mask & squares == *win_mask)
    }

    /// Does not check for wins.
    pub fn is_full(&self) -> bool {
        (self.x_squares | self.o_squares).count_ones() == NUM_CELLS
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..SIZE {
            write!(f, "|")?;
            for col in 0..SIZE {
                write!(f, " {} |", self.cell(row * SIZE + col).to_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = Error;

    /// Parse 9 cells of `X`/`x`, `O`/`o` and `.`/`_` (empty). Whitespace is skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = [Cell::Empty; NUM_CELLS];
        let mut len = 0;
        for c in s.chars().filter(|c| !c.is_whitespace()) {
            let cell = Cell::from_char(c).ok_or_else(|| {
                Error::new(ErrorKind::InvalidInput, format!("Invalid cell: {:?}", c))
            })?;
            if len < NUM_CELLS {
                cells[len] = cell;
            }
            len += 1;
        }
        if len != NUM_CELLS {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Expected {} cells, got {}", NUM_CELLS, len),
            ));
        }
        Ok(Self::from_cells(cells))
    }
}
