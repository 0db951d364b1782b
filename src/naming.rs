//! `NNN-Label` filename convention for gallery pictures.
//!
//! Files in `gallery/` carry an optional numeric prefix that orders them and a
//! label that captions them:
//!
//! - `010-Grand-Lobby.jpg` → number 10, caption "Grand Lobby"
//! - `120-Level-12-Courtyard.jpg` → number 120, caption "Level 12 Courtyard"
//! - `lobby-draft.jpg` → no number: not shown

/// Result of parsing a file stem like `010-Grand-Lobby`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Number prefix if present (e.g., `10` from `010-Grand-Lobby`)
    pub number: Option<u32>,
    /// Raw name part after `NNN-`, dashes preserved. Empty if number-only.
    /// For unnumbered entries, this is the full input.
    pub name: String,
    /// Caption: name with dashes converted to spaces.
    pub label: String,
}

/// Parse a stem following the `NNN-name` convention.
///
/// - `"010-Grand-Lobby"` → number=Some(10), name="Grand-Lobby", label="Grand Lobby"
/// - `"001"` → number=Some(1), name="", label=""
/// - `"lobby-draft"` → number=None, name="lobby-draft", label="lobby draft"
pub fn parse_entry_name(name: &str) -> ParsedName {
    if let Some((prefix, raw)) = name.split_once('-')
        && let Ok(num) = prefix.parse::<u32>()
    {
        return ParsedName {
            number: Some(num),
            name: raw.to_string(),
            label: raw.replace('-', " "),
        };
    }
    if let Ok(num) = name.parse::<u32>() {
        return ParsedName {
            number: Some(num),
            name: String::new(),
            label: String::new(),
        };
    }
    ParsedName {
        number: None,
        name: name.to_string(),
        label: name.replace('-', " "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_multi_word_label() {
        let p = parse_entry_name("010-Grand-Lobby");
        assert_eq!(p.number, Some(10));
        assert_eq!(p.name, "Grand-Lobby");
        assert_eq!(p.label, "Grand Lobby");
    }

    #[test]
    fn digits_inside_label_are_kept() {
        let p = parse_entry_name("120-Level-12-Courtyard");
        assert_eq!(p.number, Some(120));
        assert_eq!(p.label, "Level 12 Courtyard");
    }

    #[test]
    fn number_only() {
        let p = parse_entry_name("001");
        assert_eq!(p.number, Some(1));
        assert_eq!(p.label, "");
        let p = parse_entry_name("001-");
        assert_eq!(p.number, Some(1));
        assert_eq!(p.name, "");
    }

    #[test]
    fn unnumbered_keeps_full_name() {
        let p = parse_entry_name("lobby-draft");
        assert_eq!(p.number, None);
        assert_eq!(p.name, "lobby-draft");
        assert_eq!(p.label, "lobby draft");
    }

    #[test]
    fn non_numeric_prefix_is_not_a_number() {
        let p = parse_entry_name("L12-Garden");
        assert_eq!(p.number, None);
    }

    #[test]
    fn zero_prefix() {
        let p = parse_entry_name("000-Street-View");
        assert_eq!(p.number, Some(0));
        assert_eq!(p.label, "Street View");
    }
}
