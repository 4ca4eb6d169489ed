//! Numeric Annotation Glyphs.
//!
//! A fixed, read-only table shared by every parse. The first symbol listed
//! for a code is its canonical rendering; later ones are accepted aliases.

/// (code, symbol, description)
pub const NAG_TABLE: &[(u16, &str, &str)] = &[
    (1, "!", "good move"),
    (2, "?", "mistake"),
    (3, "!!", "brilliant move"),
    (4, "??", "blunder"),
    (5, "!?", "interesting move"),
    (6, "?!", "dubious move"),
    (7, "□", "forced move"),
    (10, "=", "equal position"),
    (13, "∞", "unclear position"),
    (14, "⩲", "white is slightly better"),
    (14, "+=", "white is slightly better"),
    (15, "⩱", "black is slightly better"),
    (15, "=+", "black is slightly better"),
    (16, "±", "white is moderately better"),
    (16, "+/-", "white is moderately better"),
    (17, "∓", "black is moderately better"),
    (17, "-/+", "black is moderately better"),
    (18, "+-", "white is winning"),
    (19, "-+", "black is winning"),
    (22, "⨀", "zugzwang"),
    (32, "⟳", "development advantage"),
    (36, "→", "initiative"),
    (40, "↑", "attack"),
    (132, "⇆", "counterplay"),
    (138, "⊕", "time trouble"),
    (146, "N", "novelty"),
];

/// Codes that render glued to the move they annotate (`e4!?`).
pub const MOVE_ASSESSMENTS: std::ops::RangeInclusive<u16> = 1..=6;

/// Canonical symbol for a code, if the table knows it.
pub fn symbol_for(code: u16) -> Option<&'static str> {
    NAG_TABLE
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, symbol, _)| *symbol)
}

/// Code for a symbol (canonical or alias).
pub fn code_for(symbol: &str) -> Option<u16> {
    NAG_TABLE
        .iter()
        .find(|(_, s, _)| *s == symbol)
        .map(|(code, _, _)| *code)
}

pub fn description_for(code: u16) -> Option<&'static str> {
    NAG_TABLE
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, _, description)| *description)
}

/// Parse `$<digits>`. Codes outside the table are kept as-is.
pub fn parse_dollar(token: &str) -> Option<u16> {
    let digits = token.strip_prefix('$')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Split a glued `!`/`?` suffix off a move token: `"Nf3!?"` -> `("Nf3", Some(5))`.
/// An unknown suffix combination (e.g. `"!!!"`) is left on the move.
pub fn split_suffix(token: &str) -> (&str, Option<u16>) {
    let cut = token.trim_end_matches(['!', '?']).len();
    if cut == token.len() || cut == 0 {
        return (token, None);
    }
    match code_for(&token[cut..]) {
        Some(code) => (&token[..cut], Some(code)),
        None => (token, None),
    }
}

/// How a code is written after a move on export: glued symbol for move
/// assessments, ` $n` for everything else.
pub fn export_suffix(code: u16) -> String {
    match symbol_for(code) {
        Some(symbol) if MOVE_ASSESSMENTS.contains(&code) => symbol.to_string(),
        _ => format!(" ${}", code),
    }
}
