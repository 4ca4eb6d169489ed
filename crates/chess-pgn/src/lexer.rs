//! Movetext tokenizer.
//!
//! Comments are lexed as single tokens, so parentheses inside `{...}` never
//! reach the variation logic.

use crate::error::PgnError;
use crate::nag;
use crate::tree::GameResult;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    MoveNumber(u32),
    San(String),
    Nag(u16),
    Comment(String),
    OpenVariation,
    CloseVariation,
    Result(GameResult),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset into the movetext.
    pub offset: usize,
}

const WORD_DELIMITERS: &[char] = &['{', '}', '(', ')', ';', '$'];

pub fn tokenize(text: &str) -> Result<Vec<Token>, PgnError> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut line_start = true;

    while let Some(c) = text[pos..].chars().next() {
        let start = pos;
        match c {
            '\n' => {
                line_start = true;
                pos += 1;
                continue;
            }
            c if c.is_whitespace() => {
                pos += c.len_utf8();
                continue;
            }
            // Escape line
            '%' if line_start => {
                pos = line_end(text, pos);
                continue;
            }
            '{' => {
                let close = text[pos + 1..]
                    .find('}')
                    .ok_or(PgnError::UnterminatedComment { offset: start })?;
                let body = &text[pos + 1..pos + 1 + close];
                tokens.push(Token {
                    kind: TokenKind::Comment(body.trim().to_string()),
                    offset: start,
                });
                pos += close + 2;
            }
            ';' => {
                let end = line_end(text, pos);
                tokens.push(Token {
                    kind: TokenKind::Comment(text[pos + 1..end].trim().to_string()),
                    offset: start,
                });
                pos = end;
            }
            '(' => {
                tokens.push(Token { kind: TokenKind::OpenVariation, offset: start });
                pos += 1;
            }
            ')' => {
                tokens.push(Token { kind: TokenKind::CloseVariation, offset: start });
                pos += 1;
            }
            '}' => {
                return Err(PgnError::UnexpectedToken { token: "}".to_string(), offset: start });
            }
            '$' => {
                let end = word_end(text, pos + 1);
                let word = &text[pos..end];
                let code = nag::parse_dollar(word).ok_or_else(|| PgnError::InvalidNag {
                    token: word.to_string(),
                    offset: start,
                })?;
                tokens.push(Token { kind: TokenKind::Nag(code), offset: start });
                pos = end;
            }
            _ => {
                let end = word_end(text, pos);
                classify_word(&text[pos..end], start, &mut tokens);
                pos = end;
            }
        }
        line_start = false;
    }

    Ok(tokens)
}

fn line_end(text: &str, from: usize) -> usize {
    text[from..].find('\n').map_or(text.len(), |i| from + i)
}

fn word_end(text: &str, from: usize) -> usize {
    text[from..]
        .find(|c: char| c.is_whitespace() || WORD_DELIMITERS.contains(&c))
        .map_or(text.len(), |i| from + i)
}

fn classify_word(word: &str, offset: usize, tokens: &mut Vec<Token>) {
    if let Some(result) = GameResult::from_token(word) {
        tokens.push(Token { kind: TokenKind::Result(result), offset });
        return;
    }

    // Move number, possibly glued to the move: "12.", "12...", "12.e4"
    let digits = word.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        let rest = &word[digits..];
        let dots = rest.bytes().take_while(|b| *b == b'.').count();
        if dots > 0 || rest.is_empty() {
            let number = word[..digits].parse().unwrap_or(u32::MAX);
            tokens.push(Token { kind: TokenKind::MoveNumber(number), offset });
            let remainder = &rest[dots..];
            if !remainder.is_empty() {
                classify_word(remainder, offset + digits + dots, tokens);
            }
            return;
        }
    }

    if let Some(code) = nag::code_for(word) {
        tokens.push(Token { kind: TokenKind::Nag(code), offset });
        return;
    }

    let (san, suffix) = nag::split_suffix(word);
    tokens.push(Token { kind: TokenKind::San(normalize_castling(san)), offset });
    if let Some(code) = suffix {
        tokens.push(Token { kind: TokenKind::Nag(code), offset: offset + san.len() });
    }
}

/// Zero-based castling ("0-0-0") is common in hand-typed PGN.
fn normalize_castling(san: &str) -> String {
    if san.starts_with("0-0") {
        san.replace('0', "O")
    } else {
        san.to_string()
    }
}
