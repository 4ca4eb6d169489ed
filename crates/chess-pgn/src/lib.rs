//! PGN move trees.
//!
//! Parses Portable Game Notation into an owned tree of moves, comments, NAGs
//! and nested variations, and writes it back out. Legality is delegated to a
//! `RulesEngine` (shakmaty by default). Raw-text helpers for validation,
//! cleanup and multi-game files work without building a tree.

pub mod annotations;
pub mod error;
pub mod export;
pub mod headers;
pub mod lexer;
pub mod metadata;
pub mod nag;
pub mod optimize;
pub mod parser;
pub mod rules;
pub mod split;
pub mod tree;
pub mod validate;

pub use error::PgnError;
pub use export::{export_game, export_movetext, ExportOptions};
pub use headers::{extract_header, extract_headers, HeaderSection};
pub use metadata::PgnMetadata;
pub use optimize::{checksum, optimize, strip_annotations};
pub use parser::{parse_game, parse_game_with, ParseOptions, DEFAULT_MAX_DEPTH};
pub use rules::{RulesEngine, ShakmatyEngine};
pub use split::{parse_games, parse_multiple, split_games};
pub use tree::{
    Annotation, Color, Comment, CommentPosition, Evaluation, GameResult, MoveNode, PgnGame,
    Variation,
};
pub use validate::{validate, ValidationReport};
