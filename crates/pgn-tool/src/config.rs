use std::env;

use chess_pgn::annotations::CommandExtraction;
use chess_pgn::{ExportOptions, ParseOptions, DEFAULT_MAX_DEPTH};

#[derive(Clone, Debug)]
pub struct ToolConfig {
    pub parse: ParseOptions,
    pub export: ExportOptions,
}

impl ToolConfig {
    pub fn from_env() -> Self {
        let defaults = ExportOptions::default();
        let export = ExportOptions {
            include_variations: flag("PGN_INCLUDE_VARIATIONS", defaults.include_variations),
            include_comments: flag("PGN_INCLUDE_COMMENTS", defaults.include_comments),
            include_nags: flag("PGN_INCLUDE_NAGS", defaults.include_nags),
            include_evaluations: flag("PGN_INCLUDE_EVALUATIONS", defaults.include_evaluations),
            include_clock: flag("PGN_INCLUDE_CLOCK", defaults.include_clock),
            max_line_length: env::var("PGN_MAX_LINE_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_line_length),
            indent_variations: flag("PGN_INDENT_VARIATIONS", defaults.indent_variations),
            sort_variations: flag("PGN_SORT_VARIATIONS", defaults.sort_variations),
        };

        // Commands left in comments when their export is switched off.
        let parse = ParseOptions {
            max_depth: env::var("PGN_MAX_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_DEPTH),
            extraction: CommandExtraction {
                evaluations: export.include_evaluations,
                clock: export.include_clock,
            },
        };

        Self { parse, export }
    }
}

fn flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
