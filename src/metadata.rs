//! Page metadata heuristics.
//!
//! Title, author, description, and language are each resolved through a
//! small priority chain of meta tags and DOM fallbacks. Language detection
//! failures are swallowed and default to "en"; they are never surfaced.

use dom_query::{Document, Selection};
use whatlang::Lang;

use crate::result::PageMetadata;
use crate::walk;

/// Author sources, most specific first. Meta selectors read `content`;
/// the rest read element text.
const AUTHOR_META_SELECTORS: &[&str] = &[
    "meta[name=\"author\"]",
    "meta[property=\"article:author\"]",
    "meta[name=\"article:author\"]",
];

const AUTHOR_DOM_SELECTORS: &[&str] = &[".author", ".post-author", "[rel=\"author\"]"];

/// Extract page metadata from raw HTML.
///
/// `url` is only used to synthesize a title when nothing better is found.
/// All string fields are trimmed and empty results normalized to absent.
///
/// # Example
///
/// ```rust
/// use readscrape::extract_metadata;
///
/// let html = r#"<html lang="en"><head><title>My Page</title>
/// <meta name="author" content="Jane Doe"></head><body></body></html>"#;
/// let meta = extract_metadata(html, "https://example.com/p");
/// assert_eq!(meta.title, "My Page");
/// assert_eq!(meta.author.as_deref(), Some("Jane Doe"));
/// assert_eq!(meta.language, "en");
/// ```
#[must_use]
pub fn extract_metadata(html: &str, url: &str) -> PageMetadata {
    let doc = Document::from(html);

    let title = extract_title(&doc).unwrap_or_else(|| format!("Scraped from {url}"));
    let author = extract_author(&doc);
    let description = extract_description(&doc);
    let language = extract_language(&doc, html);

    PageMetadata {
        title,
        author,
        description,
        language,
    }
}

/// Title priority: `og:title` content, `<title>` text, first `<h1>` text.
fn extract_title(doc: &Document) -> Option<String> {
    meta_content(doc, "meta[property=\"og:title\"]")
        .or_else(|| selection_text(&doc.select_single("title")))
        .or_else(|| selection_text(&doc.select_single("h1")))
}

fn extract_author(doc: &Document) -> Option<String> {
    for selector in AUTHOR_META_SELECTORS {
        if let Some(content) = meta_content(doc, selector) {
            return Some(content);
        }
    }
    for selector in AUTHOR_DOM_SELECTORS {
        if let Some(text) = selection_text(&doc.select_single(selector)) {
            return Some(text);
        }
    }
    None
}

fn extract_description(doc: &Document) -> Option<String> {
    meta_content(doc, "meta[name=\"description\"]")
        .or_else(|| meta_content(doc, "meta[property=\"og:description\"]"))
}

/// Language priority: `html[lang]`, language meta tags, statistical
/// detection on the extracted content, default "en".
fn extract_language(doc: &Document, html: &str) -> String {
    if let Some(lang) = attr_value(&doc.select_single("html"), "lang") {
        if let Some(primary) = primary_subtag(&lang) {
            return primary;
        }
    }

    for selector in [
        "meta[http-equiv=\"content-language\"]",
        "meta[name=\"language\"]",
    ] {
        if let Some(content) = meta_content(doc, selector) {
            if let Some(primary) = primary_subtag(&content) {
                return primary;
            }
        }
    }

    detect_language_from_content(html).unwrap_or_else(|| "en".to_string())
}

/// Run statistical detection on the first 1,000 characters of the
/// normal-path extracted content.
fn detect_language_from_content(html: &str) -> Option<String> {
    let content = walk::extract_content(html, false);
    if content.text.is_empty() {
        return None;
    }

    let sample: String = content.text.chars().take(1000).collect();
    let info = whatlang::detect(&sample)?;
    iso639_1(info.lang()).map(str::to_string)
}

/// Map whatlang's ISO 639-3 identifiers down to 639-1 primary subtags.
/// Unmapped languages fall back to the "en" default upstream.
fn iso639_1(lang: Lang) -> Option<&'static str> {
    let code = match lang {
        Lang::Eng => "en",
        Lang::Cmn => "zh",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Nld => "nl",
        Lang::Swe => "sv",
        Lang::Pol => "pl",
        Lang::Tur => "tr",
        Lang::Ara => "ar",
        Lang::Heb => "he",
        Lang::Hin => "hi",
        Lang::Ben => "bn",
        Lang::Vie => "vi",
        Lang::Tha => "th",
        Lang::Ind => "id",
        Lang::Ell => "el",
        Lang::Ces => "cs",
        Lang::Ron => "ro",
        Lang::Hun => "hu",
        Lang::Fin => "fi",
        Lang::Dan => "da",
        Lang::Nob => "no",
        Lang::Pes => "fa",
        _ => return None,
    };
    Some(code)
}

/// Text before the first `-` of a language tag, trimmed; `None` if empty.
fn primary_subtag(tag: &str) -> Option<String> {
    let primary = tag.split('-').next().unwrap_or("").trim();
    if primary.is_empty() {
        None
    } else {
        Some(primary.to_string())
    }
}

fn meta_content(doc: &Document, selector: &str) -> Option<String> {
    attr_value(&doc.select_single(selector), "content")
}

fn attr_value(sel: &Selection, name: &str) -> Option<String> {
    if !sel.exists() {
        return None;
    }
    sel.attr(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn selection_text(sel: &Selection) -> Option<String> {
    if !sel.exists() {
        return None;
    }
    let text = sel.text().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
