//! Per-key secret visibility

use keydeck_types::KeyId;
use std::collections::HashSet;

/// Number of leading characters shown while a secret is masked
pub const VISIBLE_PREFIX_CHARS: usize = 10;

/// Mask appended after the visible prefix, independent of secret length
pub const SECRET_MASK: &str = "•••••••••••••••••";

/// Set of keys whose secret is currently revealed
#[derive(Debug, Clone, Default)]
pub struct KeyVisibility {
    revealed: HashSet<KeyId>,
}

impl KeyVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the state of one key; returns whether it is now revealed
    pub fn toggle(&mut self, id: KeyId) -> bool {
        if self.revealed.remove(&id) {
            false
        } else {
            self.revealed.insert(id);
            true
        }
    }

    pub fn is_revealed(&self, id: &KeyId) -> bool {
        self.revealed.contains(id)
    }

    /// Forget a key entirely
    pub fn forget(&mut self, id: &KeyId) {
        self.revealed.remove(id);
    }

    pub fn len(&self) -> usize {
        self.revealed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty()
    }

    /// Text to show for `secret` given the key's current state
    pub fn display(&self, id: &KeyId, secret: &str) -> String {
        if self.is_revealed(id) {
            secret.to_string()
        } else {
            mask_secret(secret)
        }
    }
}

/// First ten characters followed by the fixed mask.
///
/// Secrets shorter than the prefix are shown whole, then the mask.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(VISIBLE_PREFIX_CHARS).collect();
    format!("{}{}", visible, SECRET_MASK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_toggle_round_trip() {
        let mut visibility = KeyVisibility::new();
        let id = Uuid::new_v4();

        assert!(visibility.toggle(id));
        assert!(visibility.is_revealed(&id));
        assert!(!visibility.toggle(id));
        assert!(!visibility.is_revealed(&id));
    }

    #[test]
    fn test_masked_display() {
        let visibility = KeyVisibility::new();
        let id = Uuid::new_v4();

        let shown = visibility.display(&id, "tvly-prod-abcdefghijklm");
        assert_eq!(shown, format!("tvly-prod-{}", SECRET_MASK));
        assert_eq!(SECRET_MASK.chars().count(), 17);
    }

    #[test]
    fn test_short_secret_is_shown_whole_before_mask() {
        assert_eq!(mask_secret("abc"), format!("abc{}", SECRET_MASK));
        assert_eq!(mask_secret(""), SECRET_MASK);
    }

    #[test]
    fn test_mask_counts_characters_not_bytes() {
        let shown = mask_secret("ééééééééééé");
        assert_eq!(shown, format!("éééééééééé{}", SECRET_MASK));
    }

    #[test]
    fn test_forget() {
        let mut visibility = KeyVisibility::new();
        let id = Uuid::new_v4();
        visibility.toggle(id);
        visibility.forget(&id);
        assert!(visibility.is_empty());
    }
}
