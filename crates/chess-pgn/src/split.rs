//! Multi-game files: split a concatenated blob and parse each game on its own.

use tracing::{debug, warn};

use crate::error::PgnError;
use crate::parser::{parse_game_with, ParseOptions};
use crate::rules::{RulesEngine, ShakmatyEngine};
use crate::tree::PgnGame;

/// Split on a blank line immediately followed by an `[Event` header.
/// Segments are trimmed; whitespace-only segments are dropped.
pub fn split_games(blob: &str) -> Vec<&str> {
    let mut games = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    let mut prev_blank = false;

    for line in blob.split_inclusive('\n') {
        let trimmed = line.trim();
        if prev_blank && trimmed.starts_with("[Event ") {
            push_segment(&mut games, &blob[start..offset]);
            start = offset;
        }
        prev_blank = trimmed.is_empty();
        offset += line.len();
    }
    push_segment(&mut games, &blob[start..]);

    games
}

fn push_segment<'a>(games: &mut Vec<&'a str>, segment: &'a str) {
    let segment = segment.trim();
    if !segment.is_empty() {
        games.push(segment);
    }
}

/// One result per game, in file order.
pub fn parse_games(blob: &str) -> Vec<Result<PgnGame, PgnError>> {
    parse_games_with::<ShakmatyEngine>(blob, &ParseOptions::default())
}

pub fn parse_games_with<E: RulesEngine>(
    blob: &str,
    options: &ParseOptions,
) -> Vec<Result<PgnGame, PgnError>> {
    let segments = split_games(blob);
    debug!("Split {} games from {} bytes", segments.len(), blob.len());
    segments
        .into_iter()
        .map(|segment| parse_game_with::<E>(segment, options))
        .collect()
}

/// Successfully parsed games only. Each failure is logged and skipped so
/// one bad game never aborts the batch.
pub fn parse_multiple(blob: &str) -> Vec<PgnGame> {
    parse_games(blob)
        .into_iter()
        .enumerate()
        .filter_map(|(index, result)| match result {
            Ok(game) => Some(game),
            Err(e) => {
                warn!(game = index, "Skipping unparseable game: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_GAMES: &str = "[Event \"First\"]\n[Result \"1-0\"]\n\n1. e4 e5 1-0\n\n\
                             [Event \"Second\"]\n[Result \"0-1\"]\n\n1. d4 d5 0-1\n";

    #[test]
    fn test_split_two_games() {
        let games = split_games(TWO_GAMES);
        assert_eq!(games.len(), 2);
        assert!(games[0].starts_with("[Event \"First\"]"));
        assert!(games[0].ends_with("1-0"));
        assert!(games[1].starts_with("[Event \"Second\"]"));
    }

    #[test]
    fn test_event_without_blank_line_does_not_split() {
        let blob = "1. e4 {see [Event \"x\"]} e5 *\n[Event \"not a new game\"]\n";
        assert_eq!(split_games(blob).len(), 1);
    }

    #[test]
    fn test_crlf_blob() {
        let blob = TWO_GAMES.replace('\n', "\r\n");
        assert_eq!(split_games(&blob).len(), 2);
    }

    #[test]
    fn test_empty_blob() {
        assert!(split_games("  \n\n").is_empty());
        assert!(parse_multiple("").is_empty());
    }

    #[test]
    fn test_bad_game_does_not_abort_batch() {
        let blob = "[Event \"Good\"]\n\n1. e4 e5 *\n\n\
                    [Event \"Bad\"]\n\n1. e4 e4 *\n\n\
                    [Event \"Also good\"]\n\n1. c4 *\n";
        let results = parse_games(blob);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(PgnError::IllegalMove { .. })));
        assert!(results[2].is_ok());

        let games = parse_multiple(blob);
        assert_eq!(games.len(), 2);
        assert_eq!(games[1].metadata.event.as_deref(), Some("Also good"));
    }
}
