//! Active display state and the finger-count → text mapping.

use std::collections::BTreeMap;

use hand_gesture::GestureSample;

/// Status shown before the first detection result arrives.
pub const INITIAL_STATUS: &str = "Initializing...";

/// Text shown at startup.
pub const INITIAL_TEXT: &str = "HELLO";

// ════════════════════════════════════════════════════════════════════════════
// TextMap
// ════════════════════════════════════════════════════════════════════════════

/// Which word a given count of raised fingers selects.
///
/// Counts without an entry leave the current text untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextMap {
    words: BTreeMap<u8, String>,
}

impl Default for TextMap {
    fn default() -> Self {
        let mut words = BTreeMap::new();
        words.insert(1, "HELLO".to_string());
        words.insert(2, "FUTURE".to_string());
        words.insert(3, "WORLD".to_string());
        TextMap { words }
    }
}

impl TextMap {
    pub fn empty() -> Self { TextMap { words: BTreeMap::new() } }

    pub fn get(&self, fingers: u8) -> Option<&str> {
        self.words.get(&fingers).map(String::as_str)
    }

    pub fn set(&mut self, fingers: u8, text: impl Into<String>) {
        self.words.insert(fingers, text.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> {
        self.words.iter().map(|(&n, w)| (n, w.as_str()))
    }
}

/// Parse a `N=TEXT` word binding, e.g. `2=FUTURE`.
pub fn parse_word(s: &str) -> Result<(u8, String), String> {
    let (count, text) = s.split_once('=')
        .ok_or_else(|| format!("expected N=TEXT, got {:?}", s))?;
    let count: u8 = count.trim().parse()
        .map_err(|_| format!("finger count must be 0-4, got {:?}", count))?;
    if count > 4 {
        return Err(format!("finger count must be 0-4, got {}", count));
    }
    Ok((count, text.to_string()))
}

// ════════════════════════════════════════════════════════════════════════════
// ActiveState
// ════════════════════════════════════════════════════════════════════════════

/// What the scene currently shows and what the hand last looked like.
///
/// Written by detection results, read by the per-tick update and the UI.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveState {
    pub text:           String,
    pub finger_count:   u8,
    pub grip_strength:  f32,
    pub status:         String,
}

impl Default for ActiveState {
    fn default() -> Self { ActiveState::new(INITIAL_TEXT) }
}

impl ActiveState {
    pub fn new(initial_text: &str) -> Self {
        ActiveState {
            text:          initial_text.to_string(),
            finger_count:  0,
            grip_strength: 0.0,
            status:        INITIAL_STATUS.to_string(),
        }
    }

    /// Fold one gesture sample in. Returns true when the displayed text
    /// changed.
    ///
    /// Finger count, grip and status always follow the sample; the text only
    /// moves when the count has a mapping and that mapping differs from what
    /// is already shown.
    pub fn apply(&mut self, sample: &GestureSample, words: &TextMap) -> bool {
        self.finger_count  = sample.finger_count;
        self.grip_strength = sample.grip_strength;
        self.status.clone_from(&sample.status_text);

        match words.get(sample.finger_count) {
            Some(word) if word != self.text => {
                self.text = word.to_string();
                true
            }
            _ => false,
        }
    }

    /// Lines for the on-screen overlay.
    pub fn overlay_lines(&self) -> Vec<String> {
        vec![
            format!("Fingers: {}", self.finger_count),
            format!("Grip: {:.2}", self.grip_strength),
            format!("Text: {}", self.text),
            self.status.clone(),
        ]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
