use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical key of the catch-all category.
pub const FALLBACK_KEY: &str = "other";

/// Display name of the catch-all category.
pub const FALLBACK_DISPLAY_NAME: &str = "Other";

/// Interned category identity: the trimmed, lowercased form of a display
/// name. Empty input maps to the catch-all key.
///
/// Keys are derived once when a category enters the account and compared
/// byte-for-byte afterwards, so "Saving", " saving " and "SAVING" all
/// address the same balance bucket. The account keeps the key-to-display
/// registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryKey(String);

impl CategoryKey {
    pub fn new(display: &str) -> Self {
        let normalized = display.trim().to_lowercase();
        if normalized.is_empty() {
            Self::fallback()
        } else {
            CategoryKey(normalized)
        }
    }

    /// The catch-all category key.
    pub fn fallback() -> Self {
        CategoryKey(FALLBACK_KEY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cleans a raw category name for display: keeps letters, digits, and
/// spaces, collapses whitespace runs, and falls back to "Category" when
/// nothing survives.
pub fn sanitize_display_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_space = false;
    for c in raw.chars() {
        if c.is_alphanumeric() {
            out.push(c);
            last_space = false;
        } else if c.is_whitespace() && !out.is_empty() && !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    let trimmed = out.trim_end();
    if trimmed.is_empty() {
        "Category".to_string()
    } else {
        trimmed.to_string()
    }
}
