//! Move legality.
//!
//! The validator is stateless apart from its `Rules`. A candidate is judged
//! against the committed board with the turn's queued moves laid over it:
//! the moving piece stands where its last queued move ended, and pieces it
//! has jumped stay on the board (blocking landings) until commit.

use std::collections::HashSet;

use crate::board::{Board, DIAGONALS};
use crate::error::{CheckersError, CheckersResult};
use crate::pending::{ChainKind, PendingMoves};
use crate::rules::Rules;
use crate::types::{Color, Move, Piece, Position};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveValidator {
    rules: Rules,
}

impl MoveValidator {
    pub fn new(rules: Rules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    /// Decides whether `mv` may be queued for `active`. `Ok` means the caller
    /// can append it to `pending`.
    pub fn validate(
        &self,
        board: &Board,
        active: Color,
        pending: &PendingMoves,
        mv: Move,
    ) -> CheckersResult<()> {
        let turn = turn_board(board, pending);
        let forced = if self.rules.forced_jumps {
            forced_landings(&turn, active, pending)
        } else {
            HashSet::new()
        };

        if pending.is_complete(mv.row_delta()) {
            // A jump chain that can still jump has not ended; it just refused a step.
            if pending.chain() == ChainKind::Jump && !forced.is_empty() {
                return Err(CheckersError::ForcedJumpAvailable);
            }
            return Err(CheckersError::TooManyMoves);
        }

        if !forced.is_empty() && !mv.is_jump() {
            return Err(CheckersError::ForcedJumpAvailable);
        }

        if let Some(at) = pending.last_end()
            && mv.start != at
        {
            return Err(CheckersError::InvalidGeometry);
        }

        let piece = turn
            .piece_at(mv.start)
            .filter(|piece| piece.color == active)
            .ok_or(CheckersError::NotYourPiece)?;

        check_geometry(&turn, pending, piece, mv)
    }

    /// Landing squares of every jump `active` could make right now.
    pub fn forced_jumps(
        &self,
        board: &Board,
        active: Color,
        pending: &PendingMoves,
    ) -> HashSet<Position> {
        forced_landings(&turn_board(board, pending), active, pending)
    }
}

/// The committed board with the in-progress chain's piece moved to where it
/// currently stands.
fn turn_board(board: &Board, pending: &PendingMoves) -> Board {
    let mut turn = *board;
    if let (Some(from), Some(to)) = (pending.first_start(), pending.last_end())
        && from != to
        && let Some(piece) = turn.remove(from)
    {
        turn.place(to, piece);
    }
    turn
}

fn forced_landings(turn: &Board, active: Color, pending: &PendingMoves) -> HashSet<Position> {
    let movers: Vec<(Position, Piece)> = match pending.chain() {
        ChainKind::None => turn.pieces(active).collect(),
        ChainKind::Jump => pending
            .last_end()
            .and_then(|at| turn.piece_at(at).map(|piece| (at, piece)))
            .into_iter()
            .collect(),
        ChainKind::Single => Vec::new(),
    };

    movers
        .into_iter()
        .flat_map(|(from, piece)| jump_landings(turn, pending, from, piece))
        .collect()
}

/// Squares `piece` on `from` can reach by a capture.
fn jump_landings(
    turn: &Board,
    pending: &PendingMoves,
    from: Position,
    piece: Piece,
) -> Vec<Position> {
    DIAGONALS
        .iter()
        .filter(|(d_row, _)| piece.is_king() || *d_row == piece.color.forward())
        .filter_map(|&(d_row, d_col)| {
            let jumped = from.offset(d_row, d_col)?;
            let landing = from.offset(2 * d_row, 2 * d_col)?;
            let victim = turn.piece_at(jumped)?;
            (victim.color != piece.color
                && !pending.is_captured(jumped)
                && turn.is_vacant(landing))
            .then_some(landing)
        })
        .collect()
}

fn check_geometry(
    turn: &Board,
    pending: &PendingMoves,
    piece: Piece,
    mv: Move,
) -> CheckersResult<()> {
    let (d_row, d_col) = (mv.row_delta(), mv.col_delta());
    if d_row == 0 || d_row.abs() > 2 || d_col.abs() != d_row.abs() {
        return Err(CheckersError::InvalidGeometry);
    }

    if d_row.abs() == 2 {
        let jumped = mv.midpoint().ok_or(CheckersError::InvalidGeometry)?;
        if pending.is_captured(jumped) {
            return Err(CheckersError::SquareAlreadyJumped);
        }
        match turn.piece_at(jumped) {
            Some(victim) if victim.color != piece.color => {}
            _ => return Err(CheckersError::InvalidGeometry),
        }
    }

    if !turn.is_vacant(mv.end) {
        return Err(CheckersError::InvalidGeometry);
    }
    if !piece.is_king() && d_row.signum() != piece.color.forward() {
        return Err(CheckersError::InvalidGeometry);
    }

    Ok(())
}
