//! Output data types for extraction.
//!
//! Everything here is transient: constructed per extraction call and handed
//! to the caller. All types derive `Serialize`/`Deserialize` so the service
//! layer can persist them as flat files.

use serde::{Deserialize, Serialize};

/// Maximum length of a container content preview, in characters.
pub(crate) const PREVIEW_LEN: usize = 200;

/// A content-bearing region (div/section/article/main/p) discovered during
/// a tracked walk or CJK candidate scan.
///
/// Identity is the `(element_type, id, classes)` triple; two descriptors
/// with equal keys are collapsed to one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerDescriptor {
    /// Lowercase tag name of the element (e.g. "div", "section").
    pub element_type: String,

    /// The element's `id` attribute, if non-empty.
    pub id: Option<String>,

    /// The element's space-joined class list, if non-empty.
    pub classes: Option<String>,

    /// Character length of the text this container contributed.
    pub content_length: usize,

    /// First 200 characters of the container text, ellipsized with "..."
    /// when truncated.
    pub content_preview: String,

    /// CJK character density as a percentage rounded to one decimal.
    /// Only present on descriptors produced by the CJK candidate scan.
    pub chinese_percentage: Option<f64>,
}

impl ContainerDescriptor {
    /// The structural identity key used for duplicate suppression.
    #[must_use]
    pub fn key(&self) -> (String, Option<String>, Option<String>) {
        (self.element_type.clone(), self.id.clone(), self.classes.clone())
    }
}

/// Build an ellipsized preview from container text.
pub(crate) fn make_preview(text: &str) -> String {
    let trimmed = text.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() > PREVIEW_LEN {
        let head: String = chars[..PREVIEW_LEN].iter().collect();
        format!("{}...", head.trim_end())
    } else {
        trimmed.to_string()
    }
}

/// Result of a structural content walk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedContent {
    /// Markdown-flavored text. Idempotent under re-cleaning.
    pub text: String,

    /// Ordered container descriptors, present only when tracking was
    /// requested.
    pub containers: Option<Vec<ContainerDescriptor>>,
}

/// Metadata derived from a page.
///
/// String fields are trimmed; empty strings are normalized to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Page title. Synthesized as "Scraped from {url}" when nothing better
    /// is found.
    pub title: String,

    /// Author name, if any source matched.
    pub author: Option<String>,

    /// Meta description, if present.
    pub description: Option<String>,

    /// ISO 639-1 primary language subtag. Defaults to "en".
    pub language: String,
}

impl Default for PageMetadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: None,
            description: None,
            language: "en".to_string(),
        }
    }
}

/// A discovered chapter link on an index-style page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterLink {
    /// Visible link text (non-empty).
    pub name: String,

    /// Absolute, same-domain URL.
    pub url: String,

    /// 0-based position after final ordering.
    pub order: usize,
}

/// Combined output of a full page scrape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// Extracted content as markdown-flavored text.
    pub content: String,

    /// Page metadata.
    pub metadata: PageMetadata,

    /// Ordered container list, when tracking was requested.
    pub containers: Option<Vec<ContainerDescriptor>>,

    /// Ordered chapter links, when link discovery was requested
    /// (hybrid mode).
    pub links: Option<Vec<ChapterLink>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_short_text_is_verbatim() {
        assert_eq!(make_preview("  hello world  "), "hello world");
    }

    #[test]
    fn preview_long_text_is_ellipsized() {
        let text = "x".repeat(300);
        let preview = make_preview(&text);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), PREVIEW_LEN + 3);
    }

    #[test]
    fn preview_counts_chars_not_bytes() {
        let text = "漢".repeat(250);
        let preview = make_preview(&text);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), PREVIEW_LEN + 3);
    }

    #[test]
    fn scrape_result_serializes_to_json() {
        let result = ScrapeResult {
            content: "# Chapter 1\n\nText.".to_string(),
            metadata: PageMetadata {
                title: "Chapter 1".to_string(),
                ..PageMetadata::default()
            },
            containers: None,
            links: Some(vec![ChapterLink {
                name: "Chapter 1".to_string(),
                url: "https://example.com/ch-1".to_string(),
                order: 0,
            }]),
        };
        let json = serde_json::to_string(&result).unwrap_or_default();
        assert!(json.contains("\"title\":\"Chapter 1\""));
        assert!(json.contains("\"order\":0"));
    }

    #[test]
    fn descriptor_key_is_structural() {
        let a = ContainerDescriptor {
            element_type: "div".to_string(),
            id: Some("main".to_string()),
            classes: None,
            content_length: 10,
            content_preview: "aaa".to_string(),
            chinese_percentage: None,
        };
        let b = ContainerDescriptor {
            content_length: 99,
            content_preview: "bbb".to_string(),
            ..a.clone()
        };
        assert_eq!(a.key(), b.key());
    }
}
