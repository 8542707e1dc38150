use wasm_bindgen::prelude::*;

pub mod board;
pub mod center;
pub mod error;
pub mod game;
pub mod pending;
pub mod rules;
pub mod types;
pub mod validator;
pub mod wasm;

pub use board::{Board, BoardView, Square};
pub use center::{GameCenter, GameId};
pub use error::{CheckersError, CheckersResult};
pub use game::Game;
pub use pending::{ChainKind, PendingMoves};
pub use rules::Rules;
pub use types::{
    Color, GameResult, GameState, Move, Outcome, Perspective, Piece, PieceKind, PlayerId,
    Position, Verdict, ViewMode,
};
pub use validator::MoveValidator;

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
