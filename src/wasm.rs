//! `wasm-bindgen` surface over a single in-memory game.
//!
//! Raw coordinates from JS are checked here; anything off the board is
//! answered with `invalid-geometry` instead of reaching the engine.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::error::CheckersError;
use crate::game::Game;
use crate::types::{Move, Perspective, PlayerId, Position, Verdict};

const RED_SEAT: PlayerId = PlayerId(1);
const WHITE_SEAT: PlayerId = PlayerId(2);

#[wasm_bindgen]
pub struct WasmGame {
    game: Game,
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            game: Game::new(RED_SEAT, WHITE_SEAT),
        }
    }

    /// Returns `{ accepted, reason }`.
    pub fn propose_move(
        &mut self,
        start_row: u8,
        start_col: u8,
        end_row: u8,
        end_col: u8,
    ) -> Result<JsValue, JsValue> {
        to_js(&self.propose(start_row, start_col, end_row, end_col))
    }

    /// Returns `{ accepted, reason }`.
    pub fn undo_last(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.undo())
    }

    pub fn commit_turn(&mut self) -> bool {
        self.game.commit()
    }

    pub fn is_over(&mut self) -> bool {
        self.game.is_over()
    }

    /// `"red"`, `"white"`, or `undefined` while the game runs.
    pub fn winner(&self) -> Option<String> {
        self.game.winner().map(|color| color.to_string())
    }

    pub fn active_color(&self) -> String {
        self.game.active_color().to_string()
    }

    pub fn reload(&mut self) {
        self.game.reload();
    }

    /// Acknowledges and clears the turn-changed flag.
    pub fn take_turn_changed(&mut self) -> bool {
        self.game.take_turn_changed()
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.game.to_game_state())
    }

    pub fn board_view(&self, white_bottom: bool) -> Result<JsValue, JsValue> {
        let perspective = if white_bottom {
            Perspective::WhiteBottom
        } else {
            Perspective::RedBottom
        };
        to_js(&self.game.board_view(perspective))
    }
}

impl WasmGame {
    fn propose(&mut self, start_row: u8, start_col: u8, end_row: u8, end_col: u8) -> Verdict {
        let result = match (
            Position::try_new(start_row, start_col),
            Position::try_new(end_row, end_col),
        ) {
            (Some(start), Some(end)) => self.game.propose_move(Move::new(start, end)),
            _ => Err(CheckersError::InvalidGeometry),
        };
        Verdict::from_result(&result)
    }

    fn undo(&mut self) -> Verdict {
        Verdict::from_result(&self.game.undo_last())
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(JsValue::from)
}
