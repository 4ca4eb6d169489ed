//! Move tree builder: recursive descent over movetext tokens.
//!
//! Structure only. Every move is handed to the rules engine, which supplies
//! canonical SAN and the side/move number; a variation replays from the
//! position before the move it replaces.

use tracing::debug;

use crate::annotations::{attach_comment, CommandExtraction};
use crate::error::PgnError;
use crate::headers::extract_headers;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::rules::{RulesEngine, ShakmatyEngine};
use crate::tree::{CommentPosition, GameResult, MoveNode, PgnGame, Variation};

/// Variation nesting allowed before parsing gives up.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub max_depth: usize,
    pub extraction: CommandExtraction,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            extraction: CommandExtraction::default(),
        }
    }
}

/// Parse one game with default options and the shakmaty rules engine.
pub fn parse_game(pgn: &str) -> Result<PgnGame, PgnError> {
    parse_game_with::<ShakmatyEngine>(pgn, &ParseOptions::default())
}

/// Parse one game. Any structural or legality error aborts the whole game.
pub fn parse_game_with<E: RulesEngine>(pgn: &str, options: &ParseOptions) -> Result<PgnGame, PgnError> {
    let headers = extract_headers(pgn);
    let movetext = headers.movetext(pgn);
    let metadata = headers.metadata;

    let starting_fen = metadata.setup_fen().map(str::to_string);
    let engine = match starting_fen.as_deref() {
        Some(fen) => E::from_fen(fen)?,
        None => E::default(),
    };

    let tokens = tokenize(movetext)?;
    let mut builder = TreeBuilder {
        tokens: &tokens,
        next: 0,
        options,
    };

    let mut game = PgnGame::new();
    game.start_number = engine.fullmove_number();
    game.start_color = engine.turn();
    game.starting_fen = starting_fen;

    let line = builder.parse_line(engine, 0, 0)?;
    game.mainline = line.moves;
    game.comments = line.pending;
    game.result = line
        .result
        .or_else(|| metadata.result.as_deref().and_then(GameResult::from_token))
        .unwrap_or_default();
    game.metadata = metadata;

    Ok(game)
}

struct ParsedLine {
    moves: Vec<MoveNode>,
    /// Comments that never found a move to attach to.
    pending: Vec<String>,
    result: Option<GameResult>,
}

struct TreeBuilder<'a> {
    tokens: &'a [Token],
    next: usize,
    options: &'a ParseOptions,
}

impl<'a> TreeBuilder<'a> {
    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.next)?;
        self.next += 1;
        Some(token)
    }

    /// Parse one line until its closing `)` (depth > 0), a result token or
    /// the end of input (depth 0).
    fn parse_line<E: RulesEngine>(
        &mut self,
        mut engine: E,
        depth: usize,
        open_offset: usize,
    ) -> Result<ParsedLine, PgnError> {
        let extraction = self.options.extraction;
        let mut moves: Vec<MoveNode> = Vec::new();
        let mut before_last: Option<E> = None;
        let mut pending: Vec<String> = Vec::new();

        while let Some(token) = self.advance() {
            match &token.kind {
                TokenKind::MoveNumber(_) => {}
                TokenKind::San(san) => {
                    let before = engine.clone();
                    let number = engine.fullmove_number();
                    let color = engine.turn();
                    let canonical = engine.play_san(san)?;

                    let mut node = MoveNode::new(canonical, number, color);
                    for raw in pending.drain(..) {
                        attach_comment(&mut node, &raw, CommentPosition::Before, extraction);
                    }
                    moves.push(node);
                    before_last = Some(before);
                }
                TokenKind::Nag(code) => match moves.last_mut() {
                    Some(node) => node.add_nag(*code),
                    None => debug!(offset = token.offset, "Ignoring NAG ${} with no move", code),
                },
                TokenKind::Comment(text) => match moves.last_mut() {
                    Some(node) => attach_comment(node, text, CommentPosition::After, extraction),
                    None => pending.push(text.clone()),
                },
                TokenKind::OpenVariation => {
                    let (Some(node), Some(before)) = (moves.last_mut(), before_last.as_ref()) else {
                        return Err(PgnError::VariationWithoutMove { offset: token.offset });
                    };
                    if depth + 1 > self.options.max_depth {
                        return Err(PgnError::RecursionLimitExceeded {
                            limit: self.options.max_depth,
                        });
                    }
                    let branch = self.parse_line(before.clone(), depth + 1, token.offset)?;
                    if branch.moves.is_empty() {
                        debug!(offset = token.offset, "Dropping empty variation");
                        for raw in &branch.pending {
                            attach_comment(node, raw, CommentPosition::After, extraction);
                        }
                    } else {
                        node.variations.push(Variation { moves: branch.moves });
                    }
                }
                TokenKind::CloseVariation => {
                    if depth == 0 {
                        return Err(PgnError::UnmatchedVariationClose { offset: token.offset });
                    }
                    return Ok(ParsedLine { moves, pending, result: None });
                }
                TokenKind::Result(result) => {
                    if depth > 0 {
                        return Err(PgnError::UnexpectedToken {
                            token: result.as_str().to_string(),
                            offset: token.offset,
                        });
                    }
                    return Ok(ParsedLine {
                        moves,
                        pending,
                        result: Some(*result),
                    });
                }
            }
        }

        if depth > 0 {
            return Err(PgnError::UnterminatedVariation { offset: open_offset });
        }
        Ok(ParsedLine { moves, pending, result: None })
    }
}
