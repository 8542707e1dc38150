use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CheckersError;

/// Number of rows (and columns) on a checkerboard.
pub const BOARD_SIZE: u8 = 8;

/// Side of a player. RED moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    White,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::Red => Color::White,
            Color::White => Color::Red,
        }
    }

    /// Row step toward the opponent's home row.
    pub fn forward(self) -> i8 {
        match self {
            Color::Red => -1,
            Color::White => 1,
        }
    }

    /// Row on which a single of this color is crowned.
    pub fn crowning_row(self) -> u8 {
        match self {
            Color::Red => 0,
            Color::White => BOARD_SIZE - 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "red"),
            Color::White => write!(f, "white"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Single,
    King,
}

/// A checker. Only ever changes by promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    pub fn single(color: Color) -> Self {
        Self::new(color, PieceKind::Single)
    }

    pub fn king(color: Color) -> Self {
        Self::new(color, PieceKind::King)
    }

    pub fn is_king(&self) -> bool {
        self.kind == PieceKind::King
    }

    pub fn promote(&mut self) {
        self.kind = PieceKind::King;
    }

    /// Cell code used by `Board::to_array`:
    /// 1=red single, 2=red king, 3=white single, 4=white king.
    pub fn code(&self) -> u8 {
        match (self.color, self.kind) {
            (Color::Red, PieceKind::Single) => 1,
            (Color::Red, PieceKind::King) => 2,
            (Color::White, PieceKind::Single) => 3,
            (Color::White, PieceKind::King) => 4,
        }
    }
}

/// A board coordinate. Row 0 is WHITE's home row.
///
/// Deserializing checks bounds, so an off-board coordinate never gets past
/// the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

#[derive(Deserialize)]
struct RawPosition {
    row: u8,
    col: u8,
}

impl TryFrom<RawPosition> for Position {
    type Error = CheckersError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Position::try_new(raw.row, raw.col).ok_or(CheckersError::InvalidGeometry)
    }
}

impl Position {
    /// Panics when the coordinate is off the board.
    pub fn new(row: u8, col: u8) -> Self {
        assert!(
            row < BOARD_SIZE && col < BOARD_SIZE,
            "position ({row}, {col}) is off the board"
        );
        Self { row, col }
    }

    pub fn try_new(row: u8, col: u8) -> Option<Self> {
        (row < BOARD_SIZE && col < BOARD_SIZE).then_some(Self { row, col })
    }

    /// Returns the coordinate shifted by the given deltas if it stays on the board.
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Self> {
        let row = self.row as i8 + d_row;
        let col = self.col as i8 + d_col;
        if (0..BOARD_SIZE as i8).contains(&row) && (0..BOARD_SIZE as i8).contains(&col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Dark squares are the only playable ones.
    pub fn is_dark(&self) -> bool {
        (self.row + self.col) % 2 == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub start: Position,
    pub end: Position,
}

impl Move {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn row_delta(&self) -> i8 {
        self.end.row as i8 - self.start.row as i8
    }

    pub fn col_delta(&self) -> i8 {
        self.end.col as i8 - self.start.col as i8
    }

    /// A move spanning two rows is treated as a jump attempt.
    pub fn is_jump(&self) -> bool {
        self.row_delta().abs() == 2
    }

    /// The square passed over by a two-square move.
    pub fn midpoint(&self) -> Option<Position> {
        let (d_row, d_col) = (self.row_delta(), self.col_delta());
        if d_row % 2 != 0 || d_col % 2 != 0 {
            return None;
        }
        self.start.offset(d_row / 2, d_col / 2)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}

/// Opaque player identity, assigned by whoever pairs players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

/// Traversal order for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Perspective {
    /// Rows and columns in storage order; red's home rows come last.
    #[default]
    RedBottom,
    /// Rows and columns reversed.
    WhiteBottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewMode {
    Play,
    Spectator,
}

/// Public game state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    /// Canonical cells, row-major; see `Piece::code`.
    pub board: Vec<u8>,
    pub active_color: Color,
    pub red_count: u8,
    pub white_count: u8,
    pub is_game_over: bool,
    pub winner: Option<Color>,
    /// Moves queued for the current turn, oldest first.
    pub pending: Vec<Move>,
    pub fingerprint: u32,
}

/// Final result after game over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub winner: Option<Color>,
    pub red_count: u8,
    pub white_count: u8,
}

/// `{over, winner}` answer for `is_over` queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub over: bool,
    pub winner: Option<Color>,
}

/// Reply shape for propose/undo at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub accepted: bool,
    pub reason: Option<&'static str>,
}

impl Verdict {
    pub fn from_result<T>(result: &Result<T, CheckersError>) -> Self {
        match result {
            Ok(_) => Self {
                accepted: true,
                reason: None,
            },
            Err(err) => Self {
                accepted: false,
                reason: Some(err.code()),
            },
        }
    }
}
