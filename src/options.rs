//! Configuration for fetching and extraction.
//!
//! Fetch settings are an explicit value handed to [`crate::PageFetcher`]'s
//! constructor rather than ambient process state. Extraction settings use
//! struct-update syntax over `Default`.

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default maximum content size in megabytes.
pub const DEFAULT_MAX_SIZE_MB: u64 = 50;

/// Default number of fetch attempts (initial plus retries).
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default backoff delays in seconds before each retry.
pub const DEFAULT_BACKOFF_SECS: [u64; 2] = [2, 4];

/// Browser-like User-Agent used when none is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration for the page fetcher, fixed at construction.
///
/// # Example
///
/// ```rust
/// use readscrape::FetchConfig;
///
/// let config = FetchConfig {
///     timeout_secs: 10,
///     max_size_mb: 5,
///     ..FetchConfig::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-attempt request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum content size in megabytes, enforced both on the
    /// `Content-Length` header and on the decoded text.
    pub max_size_mb: u64,

    /// Total number of attempts for retryable failures. Minimum 1.
    pub retry_attempts: u32,

    /// Sleep in seconds before each retry. If shorter than
    /// `retry_attempts - 1`, the backoff doubles past the last entry.
    pub backoff_secs: Vec<u64>,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_size_mb: DEFAULT_MAX_SIZE_MB,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            backoff_secs: DEFAULT_BACKOFF_SECS.to_vec(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    /// Configured size limit in bytes.
    #[must_use]
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb * 1024 * 1024
    }

    /// Backoff delay in seconds for the retry following `attempt`
    /// (0-based attempt index of the failed attempt).
    #[must_use]
    pub fn backoff_for(&self, attempt: usize) -> u64 {
        if let Some(secs) = self.backoff_secs.get(attempt) {
            return *secs;
        }
        // Past the configured table: double the last entry per extra step.
        let last = self.backoff_secs.last().copied().unwrap_or(2);
        let extra = attempt.saturating_sub(self.backoff_secs.len().saturating_sub(1)) as u32;
        last.saturating_mul(2u64.saturating_pow(extra.min(6)))
    }
}

/// Options for a single scrape or extraction call.
///
/// # Example
///
/// ```rust
/// use readscrape::ScrapeOptions;
///
/// let options = ScrapeOptions {
///     track_containers: true,
///     chinese_mode: true,
///     ..ScrapeOptions::default()
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    /// Report the container regions the walk passed through.
    pub track_containers: bool,

    /// Select the walk root by CJK ideograph density instead of the
    /// generic selector list.
    pub chinese_mode: bool,

    /// Restrict re-extraction to these indices into a previously reported
    /// container list. Requires `track_containers`.
    pub selected_containers: Option<Vec<usize>>,

    /// Also run chapter-link discovery on the page (hybrid mode: the page
    /// is both an index and a content source).
    pub discover_links: bool,
}
