//! PGN error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PgnError {
    /// Non-fatal: the header line is skipped and parsing continues.
    #[error("Malformed header on line {line}: {text}")]
    HeaderMalformed { line: usize, text: String },

    /// `ply` is the move number label, e.g. `12.` or `12...`.
    #[error("Illegal move {ply} {san}: {reason}")]
    IllegalMove {
        san: String,
        ply: String,
        reason: String,
    },

    #[error("Invalid move token '{token}' at offset {offset}")]
    InvalidMoveToken { token: String, offset: usize },

    /// `$` not followed by a code in `0..=65535`.
    #[error("Invalid NAG '{token}' at offset {offset}")]
    InvalidNag { token: String, offset: usize },

    #[error("Unterminated comment starting at offset {offset}")]
    UnterminatedComment { offset: usize },

    #[error("Unterminated variation starting at offset {offset}")]
    UnterminatedVariation { offset: usize },

    #[error("Unmatched ')' at offset {offset}")]
    UnmatchedVariationClose { offset: usize },

    #[error("Variation at offset {offset} has no move to branch from")]
    VariationWithoutMove { offset: usize },

    #[error("Variation nesting exceeds limit of {limit}")]
    RecursionLimitExceeded { limit: usize },

    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Unexpected token '{token}' at offset {offset}")]
    UnexpectedToken { token: String, offset: usize },

    #[error("Replay failed: {0}")]
    Replay(String),
}

impl PgnError {
    /// True for errors that only cause a header line to be skipped.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PgnError::HeaderMalformed { .. })
    }
}
