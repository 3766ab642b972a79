use serde::Serialize;

/// A validated three-line body plus its attribution.
///
/// Only the extractor builds these; callers get them read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentRecord {
    body: String,
    attribution: String,
}

impl ContentRecord {
    pub(crate) fn new(body: String, attribution: String) -> Self {
        Self { body, attribution }
    }

    /// The three lines joined by `\n`.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.body.lines()
    }

    pub fn attribution(&self) -> &str {
        &self.attribution
    }

    pub fn has_known_attribution(&self) -> bool {
        self.attribution != crate::extract::UNKNOWN_ATTRIBUTION
    }
}
