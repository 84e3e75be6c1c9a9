//! Match window derived from the current input.

/// Number of trailing tokens prefix keys are matched against.
pub const WINDOW_TOKENS: usize = 2;

/// Immutable view of the input a prediction runs against.
///
/// Rebuilt on every text change, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionContext {
    pub raw_text: String,
    /// Last (up to) two whitespace-separated tokens, original case.
    pub trailing_tokens: Vec<String>,
    /// Same tokens, case-folded.
    pub lowercase_trailing_tokens: Vec<String>,
}

impl PredictionContext {
    pub fn from_text(text: &str) -> Self {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let start = tokens.len().saturating_sub(WINDOW_TOKENS);
        let trailing_tokens: Vec<String> = tokens[start..].iter().map(|t| t.to_string()).collect();
        let lowercase_trailing_tokens = trailing_tokens.iter().map(|t| t.to_lowercase()).collect();
        Self {
            raw_text: text.to_string(),
            trailing_tokens,
            lowercase_trailing_tokens,
        }
    }

    /// True when the input has no visible characters.
    pub fn is_blank(&self) -> bool {
        self.raw_text.trim().is_empty()
    }

    /// Case-folded trailing tokens joined by a single space.
    pub fn window(&self) -> String {
        self.lowercase_trailing_tokens.join(" ")
    }

    /// Case-folded full input, used for substring matches.
    pub fn lowercase_text(&self) -> String {
        self.raw_text.to_lowercase()
    }
}
