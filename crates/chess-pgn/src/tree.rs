//! Move tree: a game's mainline plus recursive variations.
//!
//! Every node owns the variations that branch off it and every variation owns
//! its nodes, so the whole tree is plain owned data.

use serde::{Deserialize, Serialize};

use crate::metadata::PgnMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn other(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

/// Number/color of the ply after `(number, color)`.
pub fn next_ply(number: u32, color: Color) -> (u32, Color) {
    match color {
        Color::White => (number, Color::Black),
        Color::Black => (number + 1, Color::White),
    }
}

/// Move number label as written before a move: `12.` or `12...`.
pub fn ply_label(number: u32, color: Color) -> String {
    match color {
        Color::White => format!("{}.", number),
        Color::Black => format!("{}...", number),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameResult {
    #[serde(rename = "1-0")]
    WhiteWins,
    #[serde(rename = "0-1")]
    BlackWins,
    #[serde(rename = "1/2-1/2")]
    Draw,
    #[default]
    #[serde(rename = "*")]
    Unknown,
}

impl GameResult {
    pub fn from_token(token: &str) -> Option<GameResult> {
        match token {
            "1-0" => Some(GameResult::WhiteWins),
            "0-1" => Some(GameResult::BlackWins),
            "1/2-1/2" | "½-½" => Some(GameResult::Draw),
            "*" => Some(GameResult::Unknown),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Unknown => "*",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentPosition {
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub position: CommentPosition,
}

/// Engine evaluation from White's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "value")]
pub enum Evaluation {
    Centipawn(i32),
    /// Mate in n; negative when Black mates.
    Mate(i32),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub comments: Vec<Comment>,
    pub nags: Vec<u16>,
    pub evaluation: Option<Evaluation>,
    /// Remaining clock time in seconds.
    pub clock: Option<f64>,
}

impl Annotation {
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty() && self.nags.is_empty() && self.evaluation.is_none() && self.clock.is_none()
    }

    pub fn comments_at(&self, position: CommentPosition) -> impl Iterator<Item = &str> {
        self.comments
            .iter()
            .filter(move |c| c.position == position)
            .map(|c| c.text.as_str())
    }
}

/// One ply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveNode {
    pub san: String,
    pub color: Color,
    /// Shared by a white move and the black reply.
    pub move_number: u32,
    pub annotation: Annotation,
    /// Alternatives to this ply, in the order they were added.
    pub variations: Vec<Variation>,
}

impl MoveNode {
    pub fn new(san: impl Into<String>, move_number: u32, color: Color) -> Self {
        Self {
            san: san.into(),
            color,
            move_number,
            annotation: Annotation::default(),
            variations: Vec::new(),
        }
    }

    pub fn add_comment(&mut self, text: impl Into<String>, position: CommentPosition) {
        self.annotation.comments.push(Comment { text: text.into(), position });
    }

    pub fn add_nag(&mut self, code: u16) {
        self.annotation.nags.push(code);
    }

    /// Start a new variation replacing this ply; its first move takes this
    /// node's number and color.
    pub fn add_variation(&mut self, san: impl Into<String>) -> &mut Variation {
        let first = MoveNode::new(san, self.move_number, self.color);
        self.variations.push(Variation { moves: vec![first] });
        let last = self.variations.len() - 1;
        &mut self.variations[last]
    }

    pub fn label(&self) -> String {
        ply_label(self.move_number, self.color)
    }
}

/// An alternate line branching at the node that owns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    pub moves: Vec<MoveNode>,
}

impl Variation {
    /// Append a move after the last one. An empty variation numbers from
    /// `1.` White; start lines with `MoveNode::add_variation` instead.
    pub fn add_move(&mut self, san: impl Into<String>) -> &mut MoveNode {
        let (number, color) = match self.moves.last() {
            Some(last) => next_ply(last.move_number, last.color),
            None => (1, Color::White),
        };
        push_node(&mut self.moves, MoveNode::new(san, number, color))
    }

    pub fn sans(&self) -> Vec<&str> {
        self.moves.iter().map(|m| m.san.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Deepest nesting below this line (0 for a flat line).
    pub fn depth(&self) -> usize {
        line_depth(&self.moves)
    }
}

fn push_node(line: &mut Vec<MoveNode>, node: MoveNode) -> &mut MoveNode {
    line.push(node);
    let last = line.len() - 1;
    &mut line[last]
}

fn line_depth(line: &[MoveNode]) -> usize {
    line.iter()
        .flat_map(|node| node.variations.iter())
        .map(|v| 1 + v.depth())
        .max()
        .unwrap_or(0)
}

fn count_nodes(line: &[MoveNode]) -> usize {
    line.iter()
        .map(|node| 1 + node.variations.iter().map(|v| count_nodes(&v.moves)).sum::<usize>())
        .sum()
}

/// A parsed game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PgnGame {
    pub metadata: PgnMetadata,
    /// FEN of the set-up starting position, if not the standard one.
    pub starting_fen: Option<String>,
    /// Number and color of the first mainline ply.
    pub start_number: u32,
    pub start_color: Color,
    pub mainline: Vec<MoveNode>,
    /// Comments with no move to attach to (e.g. a game with no moves).
    pub comments: Vec<String>,
    pub result: GameResult,
}

impl Default for PgnGame {
    fn default() -> Self {
        Self::new()
    }
}

impl PgnGame {
    pub fn new() -> Self {
        Self {
            metadata: PgnMetadata::default(),
            starting_fen: None,
            start_number: 1,
            start_color: Color::White,
            mainline: Vec::new(),
            comments: Vec::new(),
            result: GameResult::Unknown,
        }
    }

    /// Append a move to the mainline. Legality is the caller's concern.
    pub fn add_move(&mut self, san: impl Into<String>) -> &mut MoveNode {
        let (number, color) = match self.mainline.last() {
            Some(last) => next_ply(last.move_number, last.color),
            None => (self.start_number, self.start_color),
        };
        push_node(&mut self.mainline, MoveNode::new(san, number, color))
    }

    /// Comment after the last mainline move, or a game comment when there are
    /// no moves yet.
    pub fn add_comment(&mut self, text: impl Into<String>) {
        match self.mainline.last_mut() {
            Some(node) => node.add_comment(text, CommentPosition::After),
            None => self.comments.push(text.into()),
        }
    }

    /// Drop all moves and comments, keeping headers and starting position.
    pub fn reset(&mut self) {
        self.mainline.clear();
        self.comments.clear();
        self.result = GameResult::Unknown;
    }

    pub fn mainline_sans(&self) -> Vec<&str> {
        self.mainline.iter().map(|m| m.san.as_str()).collect()
    }

    pub fn ply_count(&self) -> usize {
        self.mainline.len()
    }

    /// Every node in the tree, variations included.
    pub fn node_count(&self) -> usize {
        count_nodes(&self.mainline)
    }

    pub fn variation_depth(&self) -> usize {
        line_depth(&self.mainline)
    }

    /// Result from the movetext, falling back to the `Result` header.
    pub fn effective_result(&self) -> GameResult {
        if self.result != GameResult::Unknown {
            return self.result;
        }
        self.metadata
            .result
            .as_deref()
            .and_then(GameResult::from_token)
            .unwrap_or(GameResult::Unknown)
    }
}
