//! HTTP page fetching with retries, backoff, and size guards.
//!
//! One fetcher instance wraps one [`reqwest::blocking::Client`] with a
//! cookie store, so repeated fetches against the same site reuse
//! connections and session cookies.

use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, REFERER,
    UPGRADE_INSECURE_REQUESTS,
};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use std::thread;
use std::time::Duration;
use url::Url;

use crate::encoding;
use crate::error::{Error, Result};
use crate::options::FetchConfig;
use crate::urls;

const MAX_REDIRECTS: usize = 10;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Fetches pages over HTTP with browser-like headers, bounded retries,
/// and size limits.
pub struct PageFetcher {
    client: Client,
    config: FetchConfig,
}

impl PageFetcher {
    /// Build a fetcher from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Client`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,\
                 image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(
            UPGRADE_INSECURE_REQUESTS,
            HeaderValue::from_static("1"),
        );
        headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("document"));
        headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("navigate"));
        headers.insert("Sec-Fetch-Site", HeaderValue::from_static("none"));
        headers.insert("Sec-Fetch-User", HeaderValue::from_static("?1"));

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(Error::Client)?;

        Ok(Self { client, config })
    }

    /// The configuration this fetcher was built with.
    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch a page and return its decoded text.
    ///
    /// Retryable failures (timeouts, transport errors, 429, 5xx) are
    /// retried up to the configured attempt count with backoff sleeps in
    /// between; retries carry a `Referer` of the site root. Any other 4xx
    /// is terminal on the first sighting.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if `url` does not parse.
    /// - [`Error::ClientStatus`] on a terminal 4xx.
    /// - [`Error::ContentTooLarge`] when the `Content-Length` header
    ///   exceeds the limit, before the body is downloaded.
    /// - [`Error::DecodedTooLarge`] when the decoded text exceeds it.
    /// - [`Error::RetriesExhausted`] when every attempt failed retryably.
    pub fn fetch(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url)?;
        let attempts = self.config.retry_attempts.max(1);
        let mut last_failure = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                let secs = self.config.backoff_for(attempt as usize - 1);
                debug!("retrying {url} in {secs}s (attempt {} of {attempts})", attempt + 1);
                thread::sleep(Duration::from_secs(secs));
            }

            let mut request = self.client.get(parsed.clone());
            if attempt > 0 {
                request = request.header(REFERER, urls::domain_root(&parsed));
            }

            let response = match request.send() {
                Ok(response) => response,
                Err(e) => {
                    last_failure = describe_transport_error(&e);
                    debug!("fetch of {url} failed: {last_failure}");
                    continue;
                }
            };

            let status = response.status();
            if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
                return Err(Error::ClientStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            if !status.is_success() {
                last_failure = format!("server returned status {}", status.as_u16());
                debug!("fetch of {url} failed: {last_failure}");
                continue;
            }

            if let Some(length) = response.content_length() {
                if length > self.config.max_size_bytes() {
                    return Err(Error::ContentTooLarge {
                        size_mb: length as f64 / BYTES_PER_MB,
                        limit_mb: self.config.max_size_mb,
                    });
                }
            }

            let charset = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .and_then(charset_param);

            let body = match response.bytes() {
                Ok(body) => body,
                Err(e) => {
                    last_failure = describe_transport_error(&e);
                    debug!("reading body of {url} failed: {last_failure}");
                    continue;
                }
            };

            let text = encoding::decode_body(&body, charset.as_deref());
            if text.len() as u64 > self.config.max_size_bytes() {
                return Err(Error::DecodedTooLarge {
                    limit_mb: self.config.max_size_mb,
                });
            }

            return Ok(text);
        }

        warn!("giving up on {url} after {attempts} attempts: {last_failure}");
        Err(Error::RetriesExhausted {
            message: last_failure,
            attempts,
        })
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else {
        format!("request failed: {e}")
    }
}

/// The `charset` parameter of a `Content-Type` header value, if present.
fn charset_param(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .skip(1)
        .map(str::trim)
        .find_map(|param| {
            let (key, value) = param.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("charset") {
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            } else {
                None
            }
        })
}
