use serde::{Deserialize, Serialize};

/// Seven Tag Roster, in export order.
pub const REQUIRED_TAGS: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

/// Placeholder written for a required tag with no value.
pub const UNKNOWN_TAG_VALUE: &str = "?";

/// Game headers: the seven required tags as fields, everything else kept in
/// encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PgnMetadata {
    pub event: Option<String>,
    pub site: Option<String>,
    pub date: Option<String>,
    pub round: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>, // "1-0", "0-1", "1/2-1/2", "*"
    pub extra: Vec<(String, String)>,
}

impl PgnMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    fn required_slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        let slot = match name.to_ascii_lowercase().as_str() {
            "event" => &mut self.event,
            "site" => &mut self.site,
            "date" => &mut self.date,
            "round" => &mut self.round,
            "white" => &mut self.white,
            "black" => &mut self.black,
            "result" => &mut self.result,
            _ => return None,
        };
        Some(slot)
    }

    /// Set a tag. Known names are matched case-insensitively; a repeated
    /// extension tag keeps its first position and takes the new value.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.required_slot(name) {
            *slot = Some(value);
            return;
        }
        match self
            .extra
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value,
            None => self.extra.push((name.to_string(), value)),
        }
    }

    /// Case-insensitive lookup over required and extension tags.
    pub fn get(&self, name: &str) -> Option<&str> {
        let required = match name.to_ascii_lowercase().as_str() {
            "event" => &self.event,
            "site" => &self.site,
            "date" => &self.date,
            "round" => &self.round,
            "white" => &self.white,
            "black" => &self.black,
            "result" => &self.result,
            _ => {
                return self
                    .extra
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value.as_str());
            }
        };
        required.as_deref()
    }

    /// Required tags in roster order (absent ones as `None`).
    pub fn required(&self) -> [(&'static str, Option<&str>); 7] {
        [
            (REQUIRED_TAGS[0], self.event.as_deref()),
            (REQUIRED_TAGS[1], self.site.as_deref()),
            (REQUIRED_TAGS[2], self.date.as_deref()),
            (REQUIRED_TAGS[3], self.round.as_deref()),
            (REQUIRED_TAGS[4], self.white.as_deref()),
            (REQUIRED_TAGS[5], self.black.as_deref()),
            (REQUIRED_TAGS[6], self.result.as_deref()),
        ]
    }

    /// Value of the `FEN` tag when `SetUp` isn't explicitly `0`.
    pub fn setup_fen(&self) -> Option<&str> {
        if self.get("SetUp") == Some("0") {
            return None;
        }
        self.get("FEN").filter(|fen| !fen.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.required().iter().all(|(_, value)| value.is_none()) && self.extra.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_maps_known_tags_case_insensitively() {
        let mut meta = PgnMetadata::new();
        meta.set("white", "Carlsen");
        meta.set("BLACK", "Nepo");
        assert_eq!(meta.white.as_deref(), Some("Carlsen"));
        assert_eq!(meta.get("Black"), Some("Nepo"));
        assert!(meta.extra.is_empty());
    }

    #[test]
    fn test_extension_tags_keep_order_and_last_value_wins() {
        let mut meta = PgnMetadata::new();
        meta.set("WhiteElo", "2800");
        meta.set("ECO", "C65");
        meta.set("whiteelo", "2830");
        assert_eq!(
            meta.extra,
            vec![
                ("WhiteElo".to_string(), "2830".to_string()),
                ("ECO".to_string(), "C65".to_string()),
            ]
        );
        assert_eq!(meta.get("WHITEELO"), Some("2830"));
    }

    #[test]
    fn test_setup_fen() {
        let mut meta = PgnMetadata::new();
        assert_eq!(meta.setup_fen(), None);
        meta.set("FEN", "8/8/8/8/8/8/8/K6k w - - 0 1");
        assert!(meta.setup_fen().is_some());
        meta.set("SetUp", "0");
        assert_eq!(meta.setup_fen(), None);
    }
}
