//! Header section extraction: `[Key "Value"]` tag pairs ahead of the movetext.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::PgnError;
use crate::metadata::PgnMetadata;

static TAG_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[\s*([A-Za-z0-9_+#=:-]+)\s+"((?:[^"\\]|\\.)*)"\s*\]"#).expect("valid regex")
});

/// Result of scanning the header section of one game.
#[derive(Debug, Clone, Default)]
pub struct HeaderSection {
    pub metadata: PgnMetadata,
    /// Byte offset where the movetext starts.
    pub movetext_offset: usize,
    /// Header lines that held no readable tag pair.
    pub skipped: Vec<PgnError>,
}

impl HeaderSection {
    pub fn movetext<'a>(&self, pgn: &'a str) -> &'a str {
        &pgn[self.movetext_offset..]
    }
}

/// Scan the leading `[`-lines of a game. Scanning stops at the first
/// non-blank line that doesn't start with `[`.
pub fn extract_headers(pgn: &str) -> HeaderSection {
    let mut section = HeaderSection::default();
    let mut offset = 0;

    for (index, raw_line) in pgn.split_inclusive('\n').enumerate() {
        let line = raw_line.trim();
        if !line.is_empty() && !line.starts_with('[') {
            break;
        }
        offset += raw_line.len();
        if line.is_empty() {
            continue;
        }

        let mut found = false;
        for cap in TAG_PAIR_RE.captures_iter(line) {
            found = true;
            section.metadata.set(&cap[1], unescape(&cap[2]));
        }
        if !found {
            debug!(line = index + 1, "Skipping malformed header: {}", line);
            section.skipped.push(PgnError::HeaderMalformed {
                line: index + 1,
                text: line.to_string(),
            });
        }
    }

    section.movetext_offset = offset;
    section
}

/// Read a single tag's value straight from PGN text.
pub fn extract_header(pgn: &str, header_name: &str) -> Option<String> {
    extract_headers(pgn)
        .metadata
        .get(header_name)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Escape a tag value for export.
pub fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
