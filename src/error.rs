//! Error types for the rules engine.
//!
//! Every rule violation is reported as a value; callers map `code()` to
//! whatever text they show a player.

use thiserror::Error;

/// Reasons an operation on a game can be refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckersError {
    /// Move shape is impossible for the piece (too far, wrong direction, non-diagonal)
    #[error("That is not a valid move.")]
    InvalidGeometry,

    /// A jump is available and must be taken
    #[error("There is a jump move available. You must take it!")]
    ForcedJumpAvailable,

    /// The jumped square was already captured earlier this turn
    #[error("This piece has already been jumped.")]
    SquareAlreadyJumped,

    /// The turn's move chain is already complete
    #[error("You cannot move any more spaces.")]
    TooManyMoves,

    /// Undo requested with nothing queued
    #[error("There are no moves to undo!")]
    NothingToUndo,

    /// The start square holds no piece of the side to move
    #[error("There is no piece of yours on that square.")]
    NotYourPiece,

    #[error("The game is already over.")]
    GameOver,

    #[error("Player is not seated in this game.")]
    NotAParticipant,

    /// Handle refers to a game the registry no longer tracks
    #[error("Game {id} no longer exists.")]
    NoSuchGame { id: u64 },
}

impl CheckersError {
    /// Stable reason code for the boundary.
    pub fn code(&self) -> &'static str {
        match self {
            CheckersError::InvalidGeometry => "invalid-geometry",
            CheckersError::ForcedJumpAvailable => "forced-jump-available",
            CheckersError::SquareAlreadyJumped => "square-already-jumped",
            CheckersError::TooManyMoves => "too-many-moves",
            CheckersError::NothingToUndo => "nothing-to-undo",
            CheckersError::NotYourPiece => "not-your-piece",
            CheckersError::GameOver => "game-over",
            CheckersError::NotAParticipant => "not-a-participant",
            CheckersError::NoSuchGame { .. } => "no-such-game",
        }
    }
}

/// Result type alias for engine operations
pub type CheckersResult<T> = Result<T, CheckersError>;
