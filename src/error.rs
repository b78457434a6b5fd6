//! Error types for readscrape.
//!
//! Fetch failures and extraction failures share one taxonomy so that batch
//! callers can treat every page as independently failable: a single bad URL
//! returns an `Err` without poisoning anything else.

/// Error type for fetch and extraction operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Terminal HTTP failure: a 4xx client status (other than 429) that
    /// retrying cannot fix.
    #[error("request failed with status {status} for {url}")]
    ClientStatus {
        /// The HTTP status code returned by the server.
        status: u16,
        /// The URL that was requested.
        url: String,
    },

    /// All retry attempts were exhausted on a retryable failure
    /// (timeout, transport error, 429, or 5xx).
    #[error("{message} (after {attempts} attempts)")]
    RetriesExhausted {
        /// Description of the last failure observed.
        message: String,
        /// Total number of attempts made.
        attempts: u32,
    },

    /// The `Content-Length` header exceeded the configured limit,
    /// rejected before downloading the body.
    #[error("content too large: {size_mb:.2}MB exceeds {limit_mb}MB limit")]
    ContentTooLarge {
        /// Advertised size in megabytes.
        size_mb: f64,
        /// Configured limit in megabytes.
        limit_mb: u64,
    },

    /// The decoded UTF-8 text exceeded the configured limit.
    #[error("content exceeds {limit_mb}MB size limit after decoding")]
    DecodedTooLarge {
        /// Configured limit in megabytes.
        limit_mb: u64,
    },

    /// The request URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failed to construct the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    /// No extractable content was found at the chosen walk root.
    #[error("no content found on page")]
    NoContent,

    /// Re-extraction from the caller's selected containers yielded nothing.
    #[error("no content found in selected containers")]
    NoSelectedContent,
}

/// Result type alias for fetch and extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_exhausted_names_attempt_count() {
        let err = Error::RetriesExhausted {
            message: "request timed out".to_string(),
            attempts: 3,
        };
        assert!(err.to_string().contains("after 3 attempts"));
    }

    #[test]
    fn content_too_large_names_size_in_mb() {
        let err = Error::ContentTooLarge {
            size_mb: 104_857_601.0 / (1024.0 * 1024.0),
            limit_mb: 50,
        };
        let msg = err.to_string();
        assert!(msg.contains("100.00MB"));
        assert!(msg.contains("50MB"));
    }
}
