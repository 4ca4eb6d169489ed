//! Rules-engine boundary.
//!
//! The move-tree code never judges legality itself; it asks a `RulesEngine`
//! for canonical SAN and the side to move. `ShakmatyEngine` is the shipped
//! implementation.

use std::ops::ControlFlow;

use pgn_reader::{RawTag, Reader, SanPlus, Skip, Visitor};
use shakmaty::{
    fen::Fen, san::San, uci::UciMove, CastlingMode, Chess, EnPassantMode, Move, Position,
};

use crate::error::PgnError;
use crate::metadata::PgnMetadata;
use crate::tree::{ply_label, Color};

/// `Default` is the standard starting position.
pub trait RulesEngine: Clone + Default {
    /// Side to move in the current position.
    fn turn(&self) -> Color;

    /// Full-move number of the current position.
    fn fullmove_number(&self) -> u32;

    /// Play a SAN move, returning its canonical SAN (with check suffix).
    fn play_san(&mut self, san: &str) -> Result<String, PgnError>;

    /// Play a move given by squares (`"e2"`, `"e4"`) and optional promotion
    /// piece letter, returning its canonical SAN.
    fn play_coords(&mut self, from: &str, to: &str, promotion: Option<char>) -> Result<String, PgnError>;

    /// Canonical SAN of every move played so far.
    fn history(&self) -> &[String];

    /// FEN of the current position.
    fn fen(&self) -> String;

    fn from_fen(fen: &str) -> Result<Self, PgnError>;

    /// Replay a whole PGN game's mainline, failing on the first illegal move.
    fn load_pgn(pgn: &str) -> Result<Self, PgnError>;

    fn ply_label(&self) -> String {
        ply_label(self.fullmove_number(), self.turn())
    }
}

/// `RulesEngine` backed by shakmaty's `Chess` position.
#[derive(Debug, Clone, Default)]
pub struct ShakmatyEngine {
    pos: Chess,
    history: Vec<String>,
}

impl ShakmatyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> &Chess {
        &self.pos
    }

    fn illegal(&self, san: &str, reason: impl Into<String>) -> PgnError {
        PgnError::IllegalMove {
            san: san.to_string(),
            ply: self.ply_label(),
            reason: reason.into(),
        }
    }

    fn play_parsed(&mut self, san: &San, raw: &str) -> Result<String, PgnError> {
        let mv = san.to_move(&self.pos).map_err(|e| self.illegal(raw, e.to_string()))?;
        Ok(self.push(mv))
    }

    fn push(&mut self, mv: Move) -> String {
        let san = San::from_move(&self.pos, mv.clone());
        self.pos.play_unchecked(mv);

        let suffix = if self.pos.is_checkmate() {
            "#"
        } else if self.pos.is_check() {
            "+"
        } else {
            ""
        };
        let text = format!("{}{}", san, suffix);
        self.history.push(text.clone());
        text
    }
}

impl RulesEngine for ShakmatyEngine {
    fn turn(&self) -> Color {
        match self.pos.turn() {
            shakmaty::Color::White => Color::White,
            shakmaty::Color::Black => Color::Black,
        }
    }

    fn fullmove_number(&self) -> u32 {
        self.pos.fullmoves().get()
    }

    fn play_san(&mut self, san: &str) -> Result<String, PgnError> {
        let parsed: San = san
            .trim_end_matches(['+', '#'])
            .parse()
            .map_err(|e| self.illegal(san, format!("invalid SAN: {}", e)))?;
        self.play_parsed(&parsed, san)
    }

    fn play_coords(&mut self, from: &str, to: &str, promotion: Option<char>) -> Result<String, PgnError> {
        let uci_str = match promotion {
            Some(piece) => format!("{}{}{}", from, to, piece.to_ascii_lowercase()),
            None => format!("{}{}", from, to),
        };
        let uci_move: UciMove = uci_str
            .parse()
            .map_err(|e| self.illegal(&uci_str, format!("invalid move: {}", e)))?;
        let mv = uci_move
            .to_move(&self.pos)
            .map_err(|e| self.illegal(&uci_str, e.to_string()))?;
        Ok(self.push(mv))
    }

    fn history(&self) -> &[String] {
        &self.history
    }

    fn fen(&self) -> String {
        Fen::from_position(&self.pos, EnPassantMode::Legal).to_string()
    }

    fn from_fen(fen: &str) -> Result<Self, PgnError> {
        let invalid = |reason: String| PgnError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };
        let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{}", e)))?;
        let pos: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            pos,
            history: Vec::new(),
        })
    }

    fn load_pgn(pgn: &str) -> Result<Self, PgnError> {
        let mut reader = Reader::new(pgn.as_bytes());
        match reader.read_game(&mut MainlineReplay) {
            Ok(Some(outcome)) => outcome,
            Ok(None) => Ok(Self::default()),
            Err(e) => Err(PgnError::Replay(e.to_string())),
        }
    }
}

/// Replays a game's mainline through shakmaty, stopping at the first
/// illegal move. Variations are skipped.
struct MainlineReplay;

impl Visitor for MainlineReplay {
    type Tags = PgnMetadata;
    type Movetext = ShakmatyEngine;
    type Output = Result<ShakmatyEngine, PgnError>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(PgnMetadata::new())
    }

    fn tag(&mut self, tags: &mut Self::Tags, name: &[u8], value: RawTag<'_>) -> ControlFlow<Self::Output> {
        let name = String::from_utf8_lossy(name);
        tags.set(&name, value.decode_utf8_lossy().into_owned());
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        // Same SetUp/FEN rule as the tree parser.
        match tags.setup_fen() {
            Some(fen) => match ShakmatyEngine::from_fen(fen) {
                Ok(engine) => ControlFlow::Continue(engine),
                Err(e) => ControlFlow::Break(Err(e)),
            },
            None => ControlFlow::Continue(ShakmatyEngine::default()),
        }
    }

    fn begin_variation(&mut self, _engine: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true)) // stay in the mainline
    }

    fn san(&mut self, engine: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        let raw = san_plus.to_string();
        match engine.play_parsed(&san_plus.san, &raw) {
            Ok(_) => ControlFlow::Continue(()),
            Err(e) => ControlFlow::Break(Err(e)),
        }
    }

    fn end_game(&mut self, engine: Self::Movetext) -> Self::Output {
        Ok(engine)
    }
}
