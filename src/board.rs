use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::types::{BOARD_SIZE, Color, Perspective, Piece, Position};

const BOARD_WIDTH: usize = BOARD_SIZE as usize;
const NUM_SQUARES: usize = BOARD_WIDTH * BOARD_WIDTH;
/// Rows holding each side's men at the start, inclusive.
const WHITE_HOME_ROWS: std::ops::RangeInclusive<u8> = 0..=2;
const RED_HOME_ROWS: std::ops::RangeInclusive<u8> = 5..=7;
pub const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

static STARTING_LAYOUT: Lazy<Board> = Lazy::new(Board::standard_layout);

/// One cell of the grid. Light squares are never playable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Square {
    pub playable: bool,
    pub piece: Option<Piece>,
}

/// 8x8 checkerboard in canonical orientation (WHITE home rows 0..=2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    squares: [[Square; BOARD_WIDTH]; BOARD_WIDTH],
}

impl Board {
    /// Creates the standard starting layout: 12 white men on the dark squares
    /// of rows 0-2, 12 red men on rows 5-7.
    pub fn new() -> Self {
        *STARTING_LAYOUT
    }

    /// A board with every dark square playable and no pieces.
    pub fn empty() -> Self {
        let mut squares = [[Square::default(); BOARD_WIDTH]; BOARD_WIDTH];
        for (row, cells) in squares.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                cell.playable = (row + col) % 2 == 1;
            }
        }
        Self { squares }
    }

    fn standard_layout() -> Self {
        let mut board = Self::empty();
        for row in 0..BOARD_SIZE {
            let color = if WHITE_HOME_ROWS.contains(&row) {
                Color::White
            } else if RED_HOME_ROWS.contains(&row) {
                Color::Red
            } else {
                continue;
            };
            for col in 0..BOARD_SIZE {
                board.place(Position::new(row, col), Piece::single(color));
            }
        }
        board
    }

    pub fn square(&self, pos: Position) -> &Square {
        &self.squares[pos.row as usize][pos.col as usize]
    }

    fn square_mut(&mut self, pos: Position) -> &mut Square {
        &mut self.squares[pos.row as usize][pos.col as usize]
    }

    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.square(pos).piece
    }

    /// True for a playable square with nothing on it.
    pub fn is_vacant(&self, pos: Position) -> bool {
        let square = self.square(pos);
        square.playable && square.piece.is_none()
    }

    /// Puts a piece on a vacant playable square.
    /// Light or occupied squares are left untouched and `false` is returned.
    pub fn place(&mut self, pos: Position, piece: Piece) -> bool {
        if !self.is_vacant(pos) {
            return false;
        }
        self.square_mut(pos).piece = Some(piece);
        true
    }

    pub fn remove(&mut self, pos: Position) -> Option<Piece> {
        self.square_mut(pos).piece.take()
    }

    /// Crowns the piece on `pos`. Returns whether a single was promoted.
    pub fn promote(&mut self, pos: Position) -> bool {
        match self.square_mut(pos).piece.as_mut() {
            Some(piece) if !piece.is_king() => {
                piece.promote();
                true
            }
            _ => false,
        }
    }

    /// Returns `(red_count, white_count)`.
    pub fn count(&self) -> (u8, u8) {
        self.squares
            .iter()
            .flatten()
            .filter_map(|square| square.piece)
            .fold((0, 0), |(red, white), piece| match piece.color {
                Color::Red => (red + 1, white),
                Color::White => (red, white + 1),
            })
    }

    /// Every piece of `color`, in row-major order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Position, Piece)> + '_ {
        (0..BOARD_SIZE)
            .flat_map(|row| (0..BOARD_SIZE).map(move |col| Position::new(row, col)))
            .filter_map(move |pos| match self.piece_at(pos) {
                Some(piece) if piece.color == color => Some((pos, piece)),
                _ => None,
            })
    }

    /// Converts board to `[u8; 64]`, row-major, using `Piece::code` (0 = no piece).
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        let mut cells = [0u8; NUM_SQUARES];
        for (cell, square) in cells.iter_mut().zip(self.squares.iter().flatten()) {
            *cell = square.piece.map_or(0, |piece| piece.code());
        }
        cells
    }

    /// CRC32 of `to_array`, for cheap change detection.
    pub fn fingerprint(&self) -> u32 {
        crc32fast::hash(&self.to_array())
    }

    /// Walks the rows in the order a player with `perspective` sees them.
    /// Nothing is copied; each call starts a fresh walk.
    pub fn traverse(&self, perspective: Perspective) -> Rows<'_> {
        Rows {
            board: self,
            perspective,
            next: 0,
        }
    }

    /// Owned snapshot of `traverse`, for handing to a renderer.
    pub fn view(&self, perspective: Perspective) -> BoardView {
        BoardView {
            perspective,
            rows: self
                .traverse(perspective)
                .map(|row| RowSnapshot {
                    index: row.index,
                    squares: row.squares().copied().collect(),
                })
                .collect(),
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

fn oriented(perspective: Perspective, step: usize) -> usize {
    match perspective {
        Perspective::RedBottom => step,
        Perspective::WhiteBottom => BOARD_WIDTH - 1 - step,
    }
}

/// Row iterator returned by `Board::traverse`.
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    board: &'a Board,
    perspective: Perspective,
    next: usize,
}

impl<'a> Iterator for Rows<'a> {
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= BOARD_WIDTH {
            return None;
        }
        let index = oriented(self.perspective, self.next);
        self.next += 1;
        Some(Row {
            index: index as u8,
            cells: &self.board.squares[index],
            perspective: self.perspective,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = BOARD_WIDTH - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Rows<'_> {}

/// A borrowed row; `index` is the canonical row number.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub index: u8,
    cells: &'a [Square; BOARD_WIDTH],
    perspective: Perspective,
}

impl<'a> Row<'a> {
    pub fn squares(&self) -> Squares<'a> {
        Squares {
            cells: self.cells,
            perspective: self.perspective,
            next: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Squares<'a> {
    cells: &'a [Square; BOARD_WIDTH],
    perspective: Perspective,
    next: usize,
}

impl<'a> Iterator for Squares<'a> {
    type Item = &'a Square;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= BOARD_WIDTH {
            return None;
        }
        let col = oriented(self.perspective, self.next);
        self.next += 1;
        Some(&self.cells[col])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = BOARD_WIDTH - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Squares<'_> {}

/// Rows of squares in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    pub perspective: Perspective,
    pub rows: Vec<RowSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowSnapshot {
    pub index: u8,
    pub squares: Vec<Square>,
}
