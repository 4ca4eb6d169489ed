//! Full-replay validation of raw PGN text.

use serde::{Deserialize, Serialize};
use shakmaty::san::San;

use crate::error::PgnError;
use crate::headers::extract_headers;
use crate::lexer::{tokenize, TokenKind};
use crate::rules::{RulesEngine, ShakmatyEngine};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    /// At most one message: validation stops at the first failure.
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn ok() -> Self {
        Self { valid: true, errors: Vec::new() }
    }

    fn failed(error: PgnError) -> Self {
        Self {
            valid: false,
            errors: vec![error.to_string()],
        }
    }
}

pub fn validate(pgn: &str) -> ValidationReport {
    validate_with::<ShakmatyEngine>(pgn)
}

pub fn validate_with<E: RulesEngine>(pgn: &str) -> ValidationReport {
    match check_structure(pgn).and_then(|_| E::load_pgn(pgn)) {
        Ok(_) => ValidationReport::ok(),
        Err(e) => ValidationReport::failed(e),
    }
}

/// Balanced comments/variations and syntactically valid move tokens.
fn check_structure(pgn: &str) -> Result<(), PgnError> {
    let section = extract_headers(pgn);
    let movetext = section.movetext(pgn);
    let mut open: Vec<usize> = Vec::new();

    for token in tokenize(movetext)? {
        match token.kind {
            TokenKind::OpenVariation => open.push(token.offset),
            TokenKind::CloseVariation => {
                open.pop()
                    .ok_or(PgnError::UnmatchedVariationClose { offset: token.offset })?;
            }
            TokenKind::San(san) => {
                if san.trim_end_matches(['+', '#']).parse::<San>().is_err() {
                    return Err(PgnError::InvalidMoveToken {
                        token: san,
                        offset: token.offset,
                    });
                }
            }
            _ => {}
        }
    }

    match open.first() {
        Some(offset) => Err(PgnError::UnterminatedVariation { offset: *offset }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_game() {
        let report = validate("[Event \"x\"]\n\n1. e4 e5 2. Nf3 Nc6 (2... d6) 3. Bb5 1-0");
        assert_eq!(report, ValidationReport { valid: true, errors: vec![] });
    }

    #[test]
    fn test_variations_do_not_leak_into_mainline() {
        assert!(validate("1. e4 e5 (1... c5) 2. Nf3 *").valid);
        assert!(validate("1. e4 (1. d4 d5 (1... Nf6 2. c4)) 1... e5 2. Nf3 *").valid);
    }

    #[test]
    fn test_setup_zero_agrees_with_parser() {
        let pgn = "[SetUp \"0\"]\n[FEN \"4k3/8/8/8/8/8/4P3/4K3 w - - 0 1\"]\n\n1. d4 d5 *";
        assert!(crate::parser::parse_game(pgn).is_ok());
        assert!(validate(pgn).valid);
    }

    #[test]
    fn test_invalid_square() {
        let report = validate("1. e4 e9");
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("e9"));
    }

    #[test]
    fn test_illegal_move_fails_fast() {
        let report = validate("1. e4 e5 2. Ke3 Ke6 3. Kf5");
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_unbalanced_structure() {
        assert!(!validate("1. e4 (1. d4 e5").valid);
        assert!(!validate("1. e4 {open e5").valid);
        assert!(!validate("1. e4 ) e5").valid);
    }
}
