//! Per-turn occupancy snapshot of the board.
//!
//! The grid is built once from a validated [`Board`] and never mutated afterwards. Cells are
//! stored row-major, so `(x, y)` lives at `y * width + x`.

use std::fmt;

use crate::engine::{Board, Coord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Empty = 0,
    Occupied = 1,
    Head = 2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HazardGrid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl HazardGrid {
    /// Plot every snake body as [`Cell::Occupied`], then stamp our own head as [`Cell::Head`].
    pub fn build(board: &Board) -> Self {
        let (width, height) = (board.width(), board.height());
        // Board::new caps both sides, so these casts and products stay small.
        let mut cells = vec![Cell::Empty; width as usize * height as usize];
        let idx = |c: Coord| c.y as usize * width as usize + c.x as usize;

        for snake in board.snakes() {
            for &segment in snake.body() {
                cells[idx(segment)] = Cell::Occupied;
            }
        }
        cells[idx(board.you().head())] = Cell::Head;

        HazardGrid {
            width,
            height,
            cells,
        }
    }

    #[inline]
    pub fn contains(&self, c: Coord) -> bool {
        c.x >= 0 && c.x < self.width && c.y >= 0 && c.y < self.height
    }

    /// `None` for coordinates off the board.
    #[inline]
    pub fn get(&self, c: Coord) -> Option<Cell> {
        if self.contains(c) {
            Some(self.cells[c.y as usize * self.width as usize + c.x as usize])
        } else {
            None
        }
    }

    /// Off-board cells are never occupied; the wall check owns those.
    #[inline]
    pub fn is_occupied(&self, c: Coord) -> bool {
        self.get(c) == Some(Cell::Occupied)
    }
}

impl fmt::Display for HazardGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width as usize) {
            for cell in row {
                write!(f, "{}", *cell as u8)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
