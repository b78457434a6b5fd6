//! # readscrape
//!
//! Web content extraction and chapter-link discovery for reading-oriented
//! scrapers.
//!
//! This library fetches pages with browser-like headers, converts the main
//! content region to markdown-ish structured text, extracts page metadata,
//! and discovers ordered chapter-link lists on index pages. It is tuned for
//! serialized fiction sites, including Chinese-language ones, where the
//! main text is one large CJK-dense container.
//!
//! ## Quick Start
//!
//! ```rust
//! use readscrape::{discover_chapter_links, extract_content, extract_metadata};
//!
//! let html = r#"<html><head><title>Chapter 1</title></head>
//! <body><article><h1>Chapter 1</h1><p>It begins.</p></article></body></html>"#;
//!
//! let content = extract_content(html, false);
//! assert!(content.text.contains("# Chapter 1"));
//!
//! let metadata = extract_metadata(html, "https://example.com/ch-1");
//! assert_eq!(metadata.title, "Chapter 1");
//!
//! let links = discover_chapter_links(html, "https://example.com/ch-1")?;
//! assert!(links.is_empty());
//! # Ok::<(), readscrape::Error>(())
//! ```
//!
//! Fetching goes through [`Scraper`], which owns the HTTP client:
//!
//! ```rust,no_run
//! use readscrape::{FetchConfig, ScrapeOptions, Scraper};
//!
//! let scraper = Scraper::new(FetchConfig::default())?;
//! let result = scraper.scrape_page("https://example.com/book/ch-1", &ScrapeOptions::default())?;
//! println!("{}", result.content);
//! # Ok::<(), readscrape::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Structural extraction**: headings, lists, tables, and emphasis
//!   survive as markdown markers instead of being flattened to plain text
//! - **Container tracking**: report the container regions content came
//!   from, then re-extract from a caller-chosen subset
//! - **Chinese mode**: pick the walk root by CJK ideograph density
//! - **Chapter discovery**: a staged pipeline turns index pages into
//!   ordered chapter lists
//! - **Polite fetching**: retries with backoff, cookie reuse, size limits

mod error;
mod options;
mod result;

/// Character encoding sniffing and body decoding.
pub mod encoding;

/// HTTP fetching with retries and size guards.
pub mod fetch;

/// HTML-to-structured-text walking.
pub mod walk;

/// CJK-majority container selection.
pub mod chinese;

/// Page metadata heuristics.
pub mod metadata;

/// Chapter-link discovery pipeline.
pub mod links;

/// URL helpers shared by fetching and link discovery.
pub mod urls;

pub use error::{Error, Result};
pub use fetch::PageFetcher;
pub use links::{discover_chapter_links, SequentialPattern};
pub use metadata::extract_metadata;
pub use options::{
    FetchConfig, ScrapeOptions, DEFAULT_BACKOFF_SECS, DEFAULT_MAX_SIZE_MB,
    DEFAULT_RETRY_ATTEMPTS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
pub use result::{
    ChapterLink, ContainerDescriptor, ExtractedContent, PageMetadata, ScrapeResult,
};
pub use walk::{clean_text, extract_content, extract_selected_containers};

use log::debug;

/// High-level scraper tying fetching, extraction, metadata, and link
/// discovery together.
///
/// One instance holds one HTTP client; fetches through it share cookies
/// and connection pools.
pub struct Scraper {
    fetcher: PageFetcher,
}

impl Scraper {
    /// Build a scraper with the given fetch configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Client`] if the HTTP client cannot be constructed.
    pub fn new(config: FetchConfig) -> Result<Self> {
        Ok(Self {
            fetcher: PageFetcher::new(config)?,
        })
    }

    /// Fetch a page and extract its content, metadata, and optionally its
    /// containers and chapter links.
    ///
    /// With `selected_containers` set, content is re-extracted from just
    /// those entries of the tracked container list; the full list is still
    /// reported.
    ///
    /// # Errors
    ///
    /// Fetch errors pass through unchanged. Extraction that produces no
    /// text returns [`Error::NoContent`]; an empty selected-container
    /// re-extraction returns [`Error::NoSelectedContent`].
    pub fn scrape_page(&self, url: &str, options: &ScrapeOptions) -> Result<ScrapeResult> {
        let html = self.fetcher.fetch(url)?;
        debug!("fetched {} bytes of HTML from {url}", html.len());

        let track = options.track_containers || options.selected_containers.is_some();
        let extracted = if options.chinese_mode {
            chinese::extract_chinese_content(&html, track)
        } else {
            walk::extract_content(&html, track)
        };

        if extracted.text.is_empty() {
            return Err(Error::NoContent);
        }

        let containers = extracted.containers;
        let content = match (&options.selected_containers, &containers) {
            (Some(selected), Some(list)) => {
                extract_selected_containers(&html, list, selected)?
            }
            _ => extracted.text,
        };

        let metadata = extract_metadata(&html, url);

        let links = if options.discover_links {
            Some(discover_chapter_links(&html, url)?)
        } else {
            None
        };

        Ok(ScrapeResult {
            content,
            metadata,
            containers,
            links,
        })
    }

    /// Fetch an index page and discover its chapter links.
    ///
    /// # Errors
    ///
    /// Fetch errors pass through unchanged.
    pub fn discover_chapters(&self, url: &str) -> Result<Vec<ChapterLink>> {
        let html = self.fetcher.fetch(url)?;
        discover_chapter_links(&html, url)
    }
}
