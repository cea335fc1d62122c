//! Keyboard shortcuts.
//!
//! | Chord | Action |
//! |-------|--------|
//! | Ctrl/Cmd + Enter | generate |
//! | Ctrl/Cmd + D | download (only while the download button is shown) |

use serde::Deserialize;

/// A key press as reported by the page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyChord {
    /// `KeyboardEvent.key` value, e.g. `"Enter"` or `"d"`
    pub key: String,
    pub ctrl_key: bool,
    pub meta_key: bool,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl_key = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta_key = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Generate,
    Download,
}

/// Map a chord to its shortcut. Without Ctrl or Cmd nothing matches.
pub fn shortcut_for(chord: &KeyChord) -> Option<Shortcut> {
    if !(chord.ctrl_key || chord.meta_key) {
        return None;
    }
    match chord.key.as_str() {
        "Enter" => Some(Shortcut::Generate),
        "d" => Some(Shortcut::Download),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_required() {
        assert_eq!(shortcut_for(&KeyChord::new("Enter")), None);
        assert_eq!(shortcut_for(&KeyChord::new("d")), None);
    }

    #[test]
    fn test_ctrl_and_cmd() {
        assert_eq!(
            shortcut_for(&KeyChord::new("Enter").ctrl()),
            Some(Shortcut::Generate)
        );
        assert_eq!(
            shortcut_for(&KeyChord::new("Enter").meta()),
            Some(Shortcut::Generate)
        );
        assert_eq!(
            shortcut_for(&KeyChord::new("d").meta()),
            Some(Shortcut::Download)
        );
        assert_eq!(shortcut_for(&KeyChord::new("x").ctrl()), None);
    }

    #[test]
    fn test_deserialize_from_page() {
        let chord: KeyChord =
            serde_json::from_str(r#"{ "key": "d", "ctrlKey": true }"#).unwrap();
        assert_eq!(shortcut_for(&chord), Some(Shortcut::Download));
    }
}
