//! PGN export. Total: every tree produces re-parseable text.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::annotations::{format_clock, format_evaluation};
use crate::headers::escape;
use crate::metadata::UNKNOWN_TAG_VALUE;
use crate::nag;
use crate::tree::{Annotation, Color, CommentPosition, MoveNode, PgnGame, Variation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    pub include_variations: bool,
    pub include_comments: bool,
    pub include_nags: bool,
    pub include_evaluations: bool,
    pub include_clock: bool,
    /// Wrap between tokens once a line would exceed this width; 0 disables wrapping.
    pub max_line_length: usize,
    /// Put each variation on its own line, two spaces per nesting level.
    pub indent_variations: bool,
    /// Longest variation first (stable for equal lengths).
    pub sort_variations: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_variations: true,
            include_comments: true,
            include_nags: true,
            include_evaluations: true,
            include_clock: true,
            max_line_length: 80,
            indent_variations: false,
            sort_variations: false,
        }
    }
}

impl ExportOptions {
    /// Mainline moves only, no annotations.
    pub fn compact() -> Self {
        Self {
            include_variations: false,
            include_comments: false,
            include_nags: false,
            include_evaluations: false,
            include_clock: false,
            ..Self::default()
        }
    }
}

/// Headers, a blank line, then movetext terminated by the result token.
pub fn export_game(game: &PgnGame, options: &ExportOptions) -> String {
    let mut out = String::new();
    write_headers(&mut out, game);
    out.push('\n');
    out.push_str(&export_movetext(game, options));
    out.push('\n');
    out
}

fn write_headers(out: &mut String, game: &PgnGame) {
    for (name, value) in game.metadata.required() {
        let value = match (name, value) {
            (_, Some(value)) => value,
            ("Result", None) => game.result.as_str(),
            (_, None) => UNKNOWN_TAG_VALUE,
        };
        push_tag(out, name, value);
    }

    if let Some(fen) = game.starting_fen.as_deref() {
        if game.metadata.get("FEN").is_none() {
            push_tag(out, "SetUp", "1");
            push_tag(out, "FEN", fen);
        }
    }

    for (name, value) in &game.metadata.extra {
        push_tag(out, name, value);
    }
}

fn push_tag(out: &mut String, name: &str, value: &str) {
    out.push_str(&format!("[{} \"{}\"]\n", name, escape(value)));
}

/// Movetext only, ending with the result token.
pub fn export_movetext(game: &PgnGame, options: &ExportOptions) -> String {
    let mut writer = MovetextWriter::new(options);

    if options.include_comments {
        for comment in &game.comments {
            writer.comment(comment);
        }
    }
    writer.write_line(&game.mainline, 0);
    writer.token(game.result.as_str());

    writer.out
}

struct MovetextWriter<'a> {
    options: &'a ExportOptions,
    out: String,
    line_len: usize,
    line_has_content: bool,
    indent: usize,
    /// Opening parens written as a prefix of the next token.
    pending_open: usize,
    /// Next token starts a fresh line (indented variations).
    break_pending: bool,
}

impl<'a> MovetextWriter<'a> {
    fn new(options: &'a ExportOptions) -> Self {
        Self {
            options,
            out: String::new(),
            line_len: 0,
            line_has_content: false,
            indent: 0,
            pending_open: 0,
            break_pending: false,
        }
    }

    fn newline(&mut self) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        self.out.push_str(&" ".repeat(self.indent));
        self.line_len = self.indent;
        self.line_has_content = false;
    }

    fn overflows(&self, width: usize) -> bool {
        let max = self.options.max_line_length;
        max > 0 && self.line_len + width > max
    }

    fn token(&mut self, text: &str) {
        let text = format!("{}{}", "(".repeat(self.pending_open), text);
        self.pending_open = 0;
        let width = text.chars().count();
        if self.break_pending {
            self.break_pending = false;
            self.newline();
        } else if self.line_has_content {
            if self.overflows(1 + width) {
                self.newline();
            } else {
                self.out.push(' ');
                self.line_len += 1;
            }
        }
        self.out.push_str(&text);
        self.line_len += width;
        self.line_has_content = true;
    }

    /// Close a variation right after its last token, or on a fresh line when
    /// that would overflow.
    fn close(&mut self) {
        if self.line_has_content && self.overflows(1) {
            self.newline();
        }
        self.out.push(')');
        self.line_len += 1;
        self.line_has_content = true;
    }

    fn comment(&mut self, text: &str) {
        let text = text.replace('}', "");
        self.token(&format!("{{{}}}", text.trim()));
    }

    fn write_line(&mut self, line: &[MoveNode], depth: usize) {
        let mut need_number = true;

        for node in line {
            let annotation = &node.annotation;

            if self.options.include_comments {
                for text in annotation.comments_at(CommentPosition::Before) {
                    self.comment(text);
                    need_number = true;
                }
            }

            let mut text = if node.color == Color::White || need_number {
                format!("{} {}", node.label(), node.san)
            } else {
                node.san.clone()
            };
            if self.options.include_nags {
                for code in &annotation.nags {
                    text.push_str(&nag::export_suffix(*code));
                }
            }
            self.token(&text);
            need_number = false;

            if let Some(commands) = self.command_text(annotation) {
                self.token(&format!("{{{}}}", commands));
                need_number = true;
            }
            if self.options.include_comments {
                for text in annotation.comments_at(CommentPosition::After) {
                    self.comment(text);
                    need_number = true;
                }
            }

            if self.options.include_variations && node.variations.iter().any(|v| !v.is_empty()) {
                let mut variations: Vec<&Variation> =
                    node.variations.iter().filter(|v| !v.is_empty()).collect();
                if self.options.sort_variations {
                    variations.sort_by_key(|v| Reverse(v.len()));
                }
                for variation in variations {
                    self.write_variation(variation, depth + 1);
                }
                need_number = true;
            }
        }
    }

    fn write_variation(&mut self, variation: &Variation, depth: usize) {
        if self.options.indent_variations {
            self.indent = depth * 2;
            self.break_pending = true;
        }
        self.pending_open += 1;
        self.write_line(&variation.moves, depth);
        self.close();
        if self.options.indent_variations {
            self.indent = (depth - 1) * 2;
            self.break_pending = true;
        }
    }

    fn command_text(&self, annotation: &Annotation) -> Option<String> {
        let mut commands = Vec::new();
        if self.options.include_evaluations {
            if let Some(evaluation) = annotation.evaluation {
                commands.push(format!("[%eval {}]", format_evaluation(evaluation)));
            }
        }
        if self.options.include_clock {
            if let Some(clock) = annotation.clock {
                commands.push(format!("[%clk {}]", format_clock(clock)));
            }
        }
        if commands.is_empty() {
            None
        } else {
            Some(commands.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_game;
    use crate::tree::Evaluation;

    fn unwrapped() -> ExportOptions {
        ExportOptions { max_line_length: 0, ..ExportOptions::default() }
    }

    #[test]
    fn test_headers_always_complete_and_ordered() {
        let mut game = PgnGame::new();
        game.metadata.set("ECO", "B20");
        game.metadata.set("White", "Alice");
        game.add_move("e4");
        let pgn = export_game(&game, &ExportOptions::default());
        assert_eq!(
            pgn,
            "[Event \"?\"]\n[Site \"?\"]\n[Date \"?\"]\n[Round \"?\"]\n[White \"Alice\"]\n\
             [Black \"?\"]\n[Result \"*\"]\n[ECO \"B20\"]\n\n1. e4 *\n"
        );
    }

    #[test]
    fn test_nag_export() {
        let game = parse_game("1. e4 $1 e5 $255 *").unwrap();
        assert_eq!(export_movetext(&game, &unwrapped()), "1. e4! e5 $255 *");
    }

    #[test]
    fn test_black_ellipsis_after_interruptions() {
        let game = parse_game("1. e4 {best by test} e5 2. Nf3 (2. f4 exf4) Nc6 *").unwrap();
        assert_eq!(
            export_movetext(&game, &unwrapped()),
            "1. e4 {best by test} 1... e5 2. Nf3 (2. f4 exf4) 2... Nc6 *"
        );
    }

    #[test]
    fn test_variation_starting_with_black() {
        let game = parse_game("1. e4 e5 (1... c5 2. Nf3) 2. Nf3 1-0").unwrap();
        assert_eq!(
            export_movetext(&game, &unwrapped()),
            "1. e4 e5 (1... c5 2. Nf3) 2. Nf3 1-0"
        );
    }

    #[test]
    fn test_compact_drops_annotations_and_variations() {
        let game = parse_game("1. e4! {good} (1. d4) e5 {[%eval 0.2]} *").unwrap();
        assert_eq!(export_movetext(&game, &ExportOptions::compact()), "1. e4 e5 *");
    }

    #[test]
    fn test_eval_and_clock_exported_as_commands() {
        let mut game = PgnGame::new();
        let node = game.add_move("e4");
        node.annotation.evaluation = Some(Evaluation::Centipawn(35));
        node.annotation.clock = Some(300.0);
        assert_eq!(
            export_movetext(&game, &unwrapped()),
            "1. e4 {[%eval 0.35] [%clk 0:05:00]} *"
        );
        let no_clock = ExportOptions { include_clock: false, ..unwrapped() };
        assert_eq!(export_movetext(&game, &no_clock), "1. e4 {[%eval 0.35]} *");
    }

    #[test]
    fn test_wraps_only_between_tokens() {
        let game = parse_game("1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Ba4 Nf6 5. O-O Be7 *").unwrap();
        let options = ExportOptions { max_line_length: 20, ..ExportOptions::default() };
        let text = export_movetext(&game, &options);
        for line in text.lines() {
            assert!(line.len() <= 20, "line too long: {:?}", line);
        }
        assert_eq!(text.split_whitespace().collect::<Vec<_>>().join(" "),
            "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Ba4 Nf6 5. O-O Be7 *");
    }

    #[test]
    fn test_wrapping_counts_variation_parens() {
        let game = parse_game(
            "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Ba4 (4. Bxc6 dxc6 (4... bxc6)) 4... Nf6 5. O-O *",
        )
        .unwrap();
        for max_line_length in 12..=40 {
            let options = ExportOptions { max_line_length, ..ExportOptions::default() };
            let text = export_movetext(&game, &options);
            for line in text.lines() {
                assert!(
                    line.chars().count() <= max_line_length,
                    "limit {}: line too long: {:?}",
                    max_line_length,
                    line
                );
            }
            assert_eq!(parse_game(&text).unwrap(), game, "limit {}", max_line_length);
        }
    }

    #[test]
    fn test_indented_variations() {
        let game = parse_game("1. e4 (1. d4 d5 (1... Nf6)) e5 *").unwrap();
        let options = ExportOptions { indent_variations: true, ..unwrapped() };
        assert_eq!(
            export_movetext(&game, &options),
            "1. e4\n  (1. d4 d5\n    (1... Nf6))\n1... e5 *"
        );
    }

    #[test]
    fn test_sort_variations_longest_first() {
        let game = parse_game("1. e4 (1. d4) (1. c4 e5 2. Nc3) e5 *").unwrap();
        let options = ExportOptions { sort_variations: true, ..unwrapped() };
        assert_eq!(
            export_movetext(&game, &options),
            "1. e4 (1. c4 e5 2. Nc3) (1. d4) 1... e5 *"
        );
    }

    #[test]
    fn test_comment_braces_are_sanitized() {
        let mut game = PgnGame::new();
        game.add_move("e4");
        game.add_comment("a } b");
        assert_eq!(export_movetext(&game, &unwrapped()), "1. e4 {a  b} *");
    }

    #[test]
    fn test_setup_fen_emitted_for_built_games() {
        let mut game = PgnGame::new();
        game.starting_fen = Some("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1".to_string());
        let pgn = export_game(&game, &ExportOptions::default());
        assert!(pgn.contains("[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/4P3/4K3 w - - 0 1\"]\n"));
    }
}
