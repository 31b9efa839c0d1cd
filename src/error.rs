//! Error types shared by the board, notation and search layers.

use thiserror::Error;

/// Errors produced by the engine core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// Position text (FEN or a `position` command) could not be parsed
    #[error("cannot parse position `{input}`: {reason}")]
    Parse { input: String, reason: String },

    /// The requested move is not legal in the current position
    #[error("illegal move `{0}`")]
    IllegalMove(String),

    /// A move does not fit the board it was applied to
    #[error("invalid move {mv}: {reason}")]
    InvalidMove { mv: String, reason: &'static str },

    /// `undo_move` was called with an empty history
    #[error("no move to undo")]
    EmptyHistory,

    /// Search depth must be at least one ply
    #[error("search depth must be positive")]
    ZeroDepth,
}

impl ChessError {
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        ChessError::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for engine operations
pub type ChessResult<T> = Result<T, ChessError>;
