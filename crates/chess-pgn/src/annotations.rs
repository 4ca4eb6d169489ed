//! Annotation collection: comments, NAGs and the `[%eval]` / `[%clk]`
//! commands embedded in comments.

use std::sync::LazyLock;

use regex::Regex;

use crate::tree::{CommentPosition, Evaluation, MoveNode};

static EVAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[%eval\s+([^\]\s]+)\s*\]").expect("valid regex"));
static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[%clk\s+([^\]\s]+)\s*\]").expect("valid regex"));

/// Which embedded commands are lifted out of comment text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandExtraction {
    pub evaluations: bool,
    pub clock: bool,
}

impl Default for CommandExtraction {
    fn default() -> Self {
        Self { evaluations: true, clock: true }
    }
}

/// A comment with its recognised commands removed.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentCommands {
    pub text: String,
    pub evaluation: Option<Evaluation>,
    pub clock: Option<f64>,
}

pub fn extract_commands(comment: &str, extraction: CommandExtraction) -> CommentCommands {
    let mut text = comment.to_string();
    let mut evaluation = None;
    let mut clock = None;

    if extraction.evaluations {
        if let Some((value, range)) = first_command(&EVAL_RE, &text, parse_evaluation) {
            evaluation = Some(value);
            text.replace_range(range, " ");
        }
    }
    if extraction.clock {
        if let Some((value, range)) = first_command(&CLOCK_RE, &text, parse_clock) {
            clock = Some(value);
            text.replace_range(range, " ");
        }
    }

    CommentCommands {
        text: collapse_whitespace(&text),
        evaluation,
        clock,
    }
}

fn first_command<T>(
    re: &Regex,
    text: &str,
    parse: fn(&str) -> Option<T>,
) -> Option<(T, std::ops::Range<usize>)> {
    re.captures_iter(text).find_map(|cap| {
        let whole = cap.get(0)?;
        parse(&cap[1]).map(|value| (value, whole.range()))
    })
}

/// `#-3`, `0.35` (pawns), `35` (centipawns); a trailing `,depth` is ignored.
pub fn parse_evaluation(raw: &str) -> Option<Evaluation> {
    let value = raw.split(',').next()?.trim();
    if let Some(mate) = value.strip_prefix('#') {
        return mate.parse().ok().map(Evaluation::Mate);
    }
    if value.contains('.') {
        let pawns: f64 = value.parse().ok()?;
        if !pawns.is_finite() {
            return None;
        }
        return Some(Evaluation::Centipawn((pawns * 100.0).round() as i32));
    }
    value.parse().ok().map(Evaluation::Centipawn)
}

/// `H:MM:SS`, `H:MM:SS.f` or `MM:SS`, in seconds.
pub fn parse_clock(raw: &str) -> Option<f64> {
    let parts: Vec<&str> = raw.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?, s.parse::<f64>().ok()?),
        [m, s] => (0, m.parse::<u32>().ok()?, s.parse::<f64>().ok()?),
        _ => return None,
    };
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + seconds)
}

pub fn format_evaluation(evaluation: Evaluation) -> String {
    match evaluation {
        Evaluation::Centipawn(cp) => format!("{:.2}", f64::from(cp) / 100.0),
        Evaluation::Mate(n) => format!("#{}", n),
    }
}

pub fn format_clock(seconds: f64) -> String {
    let tenths = (seconds.max(0.0) * 10.0).round() as u64;
    let whole = tenths / 10;
    let (h, m, s) = (whole / 3600, (whole % 3600) / 60, whole % 60);
    match tenths % 10 {
        0 => format!("{}:{:02}:{:02}", h, m, s),
        frac => format!("{}:{:02}:{:02}.{}", h, m, s, frac),
    }
}

/// Attach a raw comment to a node, lifting embedded commands into the
/// structured fields. A comment left empty is dropped.
pub fn attach_comment(
    node: &mut MoveNode,
    raw: &str,
    position: CommentPosition,
    extraction: CommandExtraction,
) {
    let commands = extract_commands(raw, extraction);
    if let Some(evaluation) = commands.evaluation {
        node.annotation.evaluation = Some(evaluation);
    }
    if let Some(clock) = commands.clock {
        node.annotation.clock = Some(clock);
    }
    if !commands.text.is_empty() {
        node.add_comment(commands.text, position);
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Color;

    #[test]
    fn test_extract_eval_and_clock() {
        let out = extract_commands("[%eval 0.35] [%clk 1:02:03] solid", CommandExtraction::default());
        assert_eq!(out.evaluation, Some(Evaluation::Centipawn(35)));
        assert_eq!(out.clock, Some(3723.0));
        assert_eq!(out.text, "solid");
    }

    #[test]
    fn test_extraction_disabled_leaves_text() {
        let off = CommandExtraction { evaluations: false, clock: false };
        let out = extract_commands("[%eval #-3]", off);
        assert_eq!(out.evaluation, None);
        assert_eq!(out.text, "[%eval #-3]");
    }

    #[test]
    fn test_parse_evaluation_forms() {
        assert_eq!(parse_evaluation("#-3"), Some(Evaluation::Mate(-3)));
        assert_eq!(parse_evaluation("#4"), Some(Evaluation::Mate(4)));
        assert_eq!(parse_evaluation("-1.2"), Some(Evaluation::Centipawn(-120)));
        assert_eq!(parse_evaluation("35"), Some(Evaluation::Centipawn(35)));
        assert_eq!(parse_evaluation("0.17,24"), Some(Evaluation::Centipawn(17)));
        assert_eq!(parse_evaluation("abc"), None);
    }

    #[test]
    fn test_unparsable_command_stays_in_text() {
        let out = extract_commands("[%eval ??] ok", CommandExtraction::default());
        assert_eq!(out.evaluation, None);
        assert_eq!(out.text, "[%eval ??] ok");
    }

    #[test]
    fn test_clock_formatting() {
        assert!((parse_clock("0:02:59.9").unwrap() - 179.9).abs() < 1e-9);
        assert_eq!(parse_clock("5:00"), Some(300.0));
        assert_eq!(parse_clock("x"), None);
        assert_eq!(format_clock(179.9), "0:02:59.9");
        assert_eq!(format_clock(3723.0), "1:02:03");
    }

    #[test]
    fn test_evaluation_formatting_reparses() {
        for eval in [Evaluation::Centipawn(-120), Evaluation::Centipawn(7), Evaluation::Mate(-2)] {
            assert_eq!(parse_evaluation(&format_evaluation(eval)), Some(eval));
        }
    }

    #[test]
    fn test_attach_comment_drops_empty_remainder() {
        let mut node = MoveNode::new("e4", 1, Color::White);
        attach_comment(&mut node, "[%clk 0:03:00]", CommentPosition::After, CommandExtraction::default());
        assert!(node.annotation.comments.is_empty());
        assert_eq!(node.annotation.clock, Some(180.0));
    }
}
