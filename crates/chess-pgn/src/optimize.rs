//! Text-level PGN cleanup that doesn't need a move tree.
//!
//! Both passes are single scans with explicit comment/variation state, so
//! braces and parentheses nest correctly where a regex would not.

use crate::headers::extract_headers;
use crate::nag;

/// Normalize line breaks, put one header per line, collapse whitespace,
/// rewrite `;` comments as brace comments and drop empty `{}` blocks.
/// Idempotent.
pub fn optimize(pgn: &str) -> String {
    let normalized = normalize_line_breaks(pgn);
    let section = extract_headers(&normalized);
    let words = movetext_words(section.movetext(&normalized));
    assemble(header_lines(&normalized[..section.movetext_offset]), words)
}

/// Mainline-only, annotation-free copy: comments, NAGs and variations
/// (however deeply nested) are removed. Headers and the result token stay.
pub fn strip_annotations(pgn: &str) -> String {
    let normalized = normalize_line_breaks(pgn);
    let section = extract_headers(&normalized);
    let movetext = section.movetext(&normalized);

    let mut kept: Vec<String> = Vec::new();
    let mut seen_move = false;
    for word in mainline_words(movetext) {
        if nag::parse_dollar(&word).is_some() || nag::code_for(&word).is_some() {
            continue;
        }
        match split_move_number(&word) {
            Some((_, true, rest)) if seen_move => {
                if !rest.is_empty() {
                    kept.push(strip_suffix(rest).to_string());
                }
            }
            Some((_, _, rest)) => {
                seen_move |= !rest.is_empty();
                kept.push(strip_suffix(&word).to_string());
            }
            None => {
                seen_move = true;
                kept.push(strip_suffix(&word).to_string());
            }
        }
    }

    assemble(header_lines(&normalized[..section.movetext_offset]), kept)
}

/// Order-sensitive rolling hash for cheap equality and dedup checks. Not
/// cryptographic.
pub fn checksum(text: &str) -> u32 {
    text.chars()
        .fold(0u32, |hash, c| hash.wrapping_mul(31).wrapping_add(c as u32))
}

fn normalize_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn header_lines(section: &str) -> Vec<&str> {
    section
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn assemble(headers: Vec<&str>, words: Vec<String>) -> String {
    let mut out = headers.join("\n");
    if !out.is_empty() && !words.is_empty() {
        out.push_str("\n\n");
    }
    out.push_str(&words.join(" "));
    out
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-separated movetext words with each comment kept as one word.
/// A `%` line is an escape when only whitespace precedes it, or when it
/// would open the output movetext.
fn movetext_words(movetext: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut line_start = true;
    let mut chars = movetext.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                flush(&mut current, &mut words);
                line_start = true;
                continue;
            }
            c if c.is_whitespace() => {
                flush(&mut current, &mut words);
                continue;
            }
            '%' if current.is_empty() && (line_start || words.is_empty()) => {
                skip_line(&mut chars);
                line_start = true;
                continue;
            }
            '{' => {
                flush(&mut current, &mut words);
                let mut body = String::new();
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '}' {
                        closed = true;
                        break;
                    }
                    body.push(next);
                }
                let body = collapse(&body);
                if closed {
                    if !body.is_empty() {
                        words.push(format!("{{{}}}", body));
                    }
                } else {
                    words.push(format!("{{{}", body));
                }
            }
            ';' => {
                flush(&mut current, &mut words);
                let body = collapse(&skip_line(&mut chars).replace('}', ""));
                if !body.is_empty() {
                    words.push(format!("{{{}}}", body));
                }
                line_start = true;
                continue;
            }
            _ => current.push(c),
        }
        line_start = false;
    }
    flush(&mut current, &mut words);
    words
}

/// Words at variation depth 0, outside comments.
fn mainline_words(movetext: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut line_start = true;
    let mut chars = movetext.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                flush(&mut current, &mut words);
                line_start = true;
                continue;
            }
            '%' if line_start && current.is_empty() => {
                skip_line(&mut chars);
                line_start = true;
                continue;
            }
            '{' => {
                flush(&mut current, &mut words);
                for next in chars.by_ref() {
                    if next == '}' {
                        break;
                    }
                }
            }
            ';' => {
                flush(&mut current, &mut words);
                skip_line(&mut chars);
                line_start = true;
                continue;
            }
            '(' => {
                flush(&mut current, &mut words);
                depth += 1;
            }
            ')' => {
                flush(&mut current, &mut words);
                depth = depth.saturating_sub(1);
            }
            c if c.is_whitespace() => {
                flush(&mut current, &mut words);
                continue;
            }
            _ if depth > 0 => {}
            '$' => {
                flush(&mut current, &mut words);
                current.push(c);
            }
            _ => current.push(c),
        }
        line_start = false;
    }
    flush(&mut current, &mut words);
    words
}

fn flush(current: &mut String, words: &mut Vec<String>) {
    if !current.is_empty() {
        words.push(std::mem::take(current));
    }
}

fn skip_line(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut skipped = String::new();
    while let Some(&next) = chars.peek() {
        if next == '\n' {
            break;
        }
        skipped.push(next);
        chars.next();
    }
    skipped
}

/// `"12..."` -> `(12, true, "")`, `"3.e4"` -> `(3, false, "e4")`.
fn split_move_number(word: &str) -> Option<(u32, bool, &str)> {
    let digits = word.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = &word[digits..];
    let dots = rest.bytes().take_while(|b| *b == b'.').count();
    if dots == 0 {
        return None;
    }
    let number = word[..digits].parse().ok()?;
    Some((number, dots >= 3, &rest[dots..]))
}

fn strip_suffix(word: &str) -> &str {
    match split_move_number(word) {
        Some(_) if word.ends_with('.') => word,
        _ => word.trim_end_matches(['!', '?']),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_annotations_example() {
        let stripped = strip_annotations("1. e4 {good move} e5 (1...c5 2. Nf3) 2. Nf3 $1");
        assert_eq!(stripped, "1. e4 e5 2. Nf3");
    }

    #[test]
    fn test_strip_nested_variations_and_tricky_comments() {
        let pgn = "[Event \"x\"]\n\n1. e4 {see (a) and {b} (1. d4 (1. c4 {) tricky}) d5) 1... e5!? 2. Nf3$14 += 1-0";
        assert_eq!(strip_annotations(pgn), "[Event \"x\"]\n\n1. e4 e5 2. Nf3 1-0");
    }

    #[test]
    fn test_indented_escape_lines_are_dropped() {
        assert_eq!(strip_annotations("1. e4\n  %engine dump\ne5 *"), "1. e4 e5 *");
        assert_eq!(optimize("1. e4\n\t%engine dump\ne5 *"), "1. e4 e5 *");
    }

    #[test]
    fn test_optimize_collapses_and_drops_empty_comments() {
        let pgn = "[Event \"x\"]\r\n  [Site \"y\"]\r\n\r\n1. e4   {}  e5\r\n{  keep\n this }\t2. Nf3 ; tail note\n*";
        assert_eq!(
            optimize(pgn),
            "[Event \"x\"]\n[Site \"y\"]\n\n1. e4 e5 {keep this} 2. Nf3 {tail note} *"
        );
    }

    #[test]
    fn test_optimize_is_idempotent() {
        let samples = [
            "1. e4 {} e5 ; note\n 2. Nf3 *",
            "[Event \"a\"]\n\n\n1.e4   (1. d4 {x  y}) e5\n%escape\n1-0",
            "{unterminated   comment",
            "[Event \"x\"]\n  %not an escape here e4? 1. e4 *",
            "{} %stray 1. e4 *",
            "1. e4 e5\n   %escaped line\n2. Nf3 *",
            "",
        ];
        for sample in samples {
            let once = optimize(sample);
            assert_eq!(optimize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_checksum() {
        assert_eq!(checksum("1. e4 e5"), checksum("1. e4 e5"));
        assert_ne!(checksum("1. e4 e5"), checksum("1. e5 e4"));
        assert_ne!(checksum("ab"), checksum("ba"));
        assert_eq!(checksum(""), 0);
    }
}
