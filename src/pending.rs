use serde::Serialize;

use crate::types::{Move, Position};

/// Shape of the turn being built, fixed by its first move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ChainKind {
    #[default]
    None,
    Single,
    Jump,
}

/// Moves queued for the current turn, not yet applied to the board.
///
/// Callers validate a move before appending it; the queue only keeps the
/// chain kind and the per-turn capture record in step with its contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingMoves {
    moves: Vec<Move>,
    chain: ChainKind,
    captured: Vec<Position>,
}

impl PendingMoves {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, mv: Move) {
        if self.moves.is_empty() {
            self.chain = if mv.is_jump() {
                ChainKind::Jump
            } else {
                ChainKind::Single
            };
        }
        if let Some(jumped) = captured_by(&mv) {
            self.captured.push(jumped);
        }
        self.moves.push(mv);
    }

    /// Undoes the most recent append.
    pub fn pop_last(&mut self) -> Option<Move> {
        let mv = self.moves.pop()?;
        if captured_by(&mv).is_some() {
            self.captured.pop();
        }
        if self.moves.is_empty() {
            self.chain = ChainKind::None;
        }
        Some(mv)
    }

    /// Whether a move spanning `attempted_row_delta` rows can no longer join
    /// this turn. A single step closes the turn; a jump chain only takes jumps.
    pub fn is_complete(&self, attempted_row_delta: i8) -> bool {
        match self.chain {
            ChainKind::None => false,
            ChainKind::Single => true,
            ChainKind::Jump => attempted_row_delta.abs() != 2,
        }
    }

    pub fn chain(&self) -> ChainKind {
        self.chain
    }

    /// Where the moving piece stood before this turn.
    pub fn first_start(&self) -> Option<Position> {
        self.moves.first().map(|mv| mv.start)
    }

    /// Where the moving piece stands now.
    pub fn last_end(&self) -> Option<Position> {
        self.moves.last().map(|mv| mv.end)
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn is_captured(&self, pos: Position) -> bool {
        self.captured.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Empties the queue and hands back its moves in order.
    pub fn take(&mut self) -> Vec<Move> {
        self.chain = ChainKind::None;
        self.captured.clear();
        std::mem::take(&mut self.moves)
    }

    pub fn clear(&mut self) {
        self.take();
    }
}

fn captured_by(mv: &Move) -> Option<Position> {
    if mv.is_jump() { mv.midpoint() } else { None }
}
