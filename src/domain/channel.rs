use serde::{Deserialize, Serialize};

/// The canonical channel id prefix. Every stable channel id is this
/// prefix followed by 22 characters of `[A-Za-z0-9_-]`, 24 in total.
pub const CHANNEL_ID_PREFIX: &str = "UC";
pub const CHANNEL_ID_LEN: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Stable channel id. Immutable once assigned.
    pub id: String,
    /// User-facing handle the channel was added under. Not stable.
    pub handle: String,
    pub name: String,
    /// Avatar URL. Empty until enrichment finds one.
    #[serde(default)]
    pub thumbnail: String,
}

impl Channel {
    pub fn new(id: String, handle: String, name: String, thumbnail: String) -> Self {
        Self {
            id,
            handle,
            name,
            thumbnail,
        }
    }

    /// Whether a string already has the canonical channel id shape.
    pub fn is_canonical_id(s: &str) -> bool {
        s.len() == CHANNEL_ID_LEN
            && s.starts_with(CHANNEL_ID_PREFIX)
            && s[CHANNEL_ID_PREFIX.len()..]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_id_accepted() {
        assert!(Channel::is_canonical_id("UCXuqSBlHAE6Xw-yeJA0Tunw"));
        assert!(Channel::is_canonical_id("UC______________________"));
    }

    #[test]
    fn test_canonical_id_wrong_length() {
        assert!(!Channel::is_canonical_id("UCXuqSBlHAE6Xw-yeJA0Tun"));
        assert!(!Channel::is_canonical_id("UCXuqSBlHAE6Xw-yeJA0Tunww"));
        assert!(!Channel::is_canonical_id(""));
    }

    #[test]
    fn test_canonical_id_wrong_prefix() {
        assert!(!Channel::is_canonical_id("UDXuqSBlHAE6Xw-yeJA0Tunw"));
        assert!(!Channel::is_canonical_id("ucXuqSBlHAE6Xw-yeJA0Tunw"));
    }

    #[test]
    fn test_canonical_id_bad_characters() {
        assert!(!Channel::is_canonical_id("UCXuqSBlHAE6Xw yeJA0Tunw"));
        assert!(!Channel::is_canonical_id("UCXuqSBlHAE6Xw/yeJA0Tunw"));
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let ch = Channel::new("UCXuqSBlHAE6Xw-yeJA0Tunw".into(), "h".into(), "".into(), "".into());
        assert_eq!(ch.display_name(), "UCXuqSBlHAE6Xw-yeJA0Tunw");
    }
}
