// Pattern-based extraction of the two text fields from a raw response body

use crate::error::ExtractError;
use crate::record::ContentRecord;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Longest line accepted in either the body or the attribution.
pub const MAX_LINE_LENGTH: usize = 45;

/// Attribution used when the author field is absent or unusable.
pub const UNKNOWN_ATTRIBUTION: &str = "unknown";

const LINE_COUNT: usize = 3;
const LINE_DELIMITER: char = '/';

static DEFAULT_EXTRACTOR: LazyLock<Extractor> = LazyLock::new(Extractor::default);

/// Extract a record using the default `title` / `author` field labels.
pub fn extract(raw: &str) -> Result<ContentRecord, ExtractError> {
    DEFAULT_EXTRACTOR.extract(raw)
}

/// Pulls a primary content field and an attribution field out of a loosely
/// structured text blob.
///
/// The primary field is mandatory and must split on `/` into exactly three
/// non-empty lines. The attribution is best effort and degrades to
/// [`UNKNOWN_ATTRIBUTION`].
#[derive(Debug, Clone)]
pub struct Extractor {
    primary_field: String,
    primary_pattern: Regex,
    attribution_pattern: Regex,
    max_line_length: usize,
}

impl Extractor {
    pub fn new(primary_field: &str, attribution_field: &str) -> Self {
        Self {
            primary_field: primary_field.to_string(),
            primary_pattern: field_pattern(primary_field, "+"),
            attribution_pattern: field_pattern(attribution_field, "*"),
            max_line_length: MAX_LINE_LENGTH,
        }
    }

    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    pub fn extract(&self, raw: &str) -> Result<ContentRecord, ExtractError> {
        let body = self.extract_body(raw)?;
        let attribution = self.extract_attribution(raw);
        Ok(ContentRecord::new(body, attribution))
    }

    fn extract_body(&self, raw: &str) -> Result<String, ExtractError> {
        let Some(captured) = self
            .primary_pattern
            .captures(raw)
            .and_then(|caps| caps.get(1))
        else {
            warn!("Could not extract '{}' from downloaded content", self.primary_field);
            return Err(ExtractError::MissingPrimaryField(self.primary_field.clone()));
        };

        let segments: Vec<&str> = captured.as_str().split(LINE_DELIMITER).collect();
        if segments.len() != LINE_COUNT {
            warn!("Text has {} segments, expected {}", segments.len(), LINE_COUNT);
            return Err(ExtractError::LineCountMismatch {
                found: segments.len(),
            });
        }

        let lines: Vec<&str> = segments.iter().map(|s| s.trim()).collect();
        if lines.iter().any(|l| l.is_empty()) {
            let found = lines.iter().filter(|l| !l.is_empty()).count();
            warn!("Text has an empty line, only {} usable", found);
            return Err(ExtractError::LineCountMismatch { found });
        }

        for (idx, line) in lines.iter().enumerate() {
            let length = line.chars().count();
            if length > self.max_line_length {
                warn!(
                    "Line {} exceeded {} characters ({})",
                    idx + 1,
                    self.max_line_length,
                    length
                );
                return Err(ExtractError::LineTooLong {
                    line: idx + 1,
                    length,
                    max: self.max_line_length,
                });
            }
        }

        Ok(lines.join("\n"))
    }

    fn extract_attribution(&self, raw: &str) -> String {
        let Some(captured) = self
            .attribution_pattern
            .captures(raw)
            .and_then(|caps| caps.get(1))
        else {
            debug!("No attribution in downloaded content");
            return UNKNOWN_ATTRIBUTION.to_string();
        };

        let attribution = captured.as_str().trim();
        if attribution.is_empty() {
            debug!("Attribution is blank");
            return UNKNOWN_ATTRIBUTION.to_string();
        }
        if attribution.chars().count() > self.max_line_length {
            warn!("Attribution exceeded {} characters", self.max_line_length);
            return UNKNOWN_ATTRIBUTION.to_string();
        }

        attribution.to_string()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new("title", "author")
    }
}

// `"<name>"` followed by a colon and a quoted value; nested or escaped quotes
// end the capture early.
fn field_pattern(name: &str, repetition: &str) -> Regex {
    let pattern = format!(r#""{}"\s*:\s*"([^"]{})""#, regex::escape(name), repetition);
    Regex::new(&pattern).expect("escaped field pattern is valid")
}
