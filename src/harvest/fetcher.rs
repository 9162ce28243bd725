//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests for article pages
//! - Bounded retry with jittered sleeps between attempts

use crate::config::{FetchConfig, SourceConfig};
use encoding_rs::{Encoding, UTF_8};
use rand::Rng;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// How many times to try a request and how long to wait in between
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Lower bound of the sleep between attempts
    pub min_delay: Duration,

    /// Upper bound of the sleep between attempts
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Builds the policy described by the `[fetch]` configuration table
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            min_delay: Duration::from_millis(config.min_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }

    /// A policy that retries without sleeping
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Draws the next sleep uniformly from `[min_delay, max_delay]`
    pub fn next_delay(&self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        rand::thread_rng().gen_range(self.min_delay..=self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

/// A successful response
#[derive(Debug)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,

    /// Response body, exactly as received
    pub body: Vec<u8>,

    /// Charset declared in the `Content-Type` header, if any
    pub charset: Option<String>,
}

impl FetchedPage {
    /// The body decoded as text
    ///
    /// Uses the declared charset, UTF-8 when none is declared or the label is
    /// unknown. A byte order mark overrides the declaration and malformed
    /// sequences become U+FFFD, so decoding never fails.
    pub fn text(&self) -> Cow<'_, str> {
        decode_body(&self.body, self.charset.as_deref())
    }
}

/// Decodes a response body the way a browser would for the given charset label
pub fn decode_body<'a>(body: &'a [u8], charset: Option<&str>) -> Cow<'a, str> {
    let encoding = charset
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(body);
    text
}

/// Extracts the `charset` parameter from a `Content-Type` value
fn content_type_charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

/// Why a single attempt did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// The server answered with a non-success status
    Status(u16),

    /// No usable response (connect error, timeout, truncated body)
    Transport(String),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Status(code) => write!(f, "status={}", code),
            AttemptFailure::Transport(error) => write!(f, "error={}", error),
        }
    }
}

/// Failure after every attempt has been used up
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetch failed ({}) after {} attempts: {}", status_label(.last_status), .attempts, .url)]
    Exhausted {
        url: String,
        attempts: u32,
        /// Last status observed, `None` when no attempt got a response
        last_status: Option<u16>,
        failures: Vec<AttemptFailure>,
    },
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "no response".to_string(),
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The article source configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &SourceConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL, retrying any non-success outcome
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Return immediately |
/// | Any other status | Retry after a jittered sleep |
/// | Network error / timeout | Retry after a jittered sleep |
/// | Attempts used up | `FetchError::Exhausted` with the last status seen |
///
/// There is no sleep after the final attempt. `on_failure` is called as soon
/// as an attempt fails, before the sleep that follows it.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `policy` - Attempt bound and delay distribution
/// * `on_failure` - Observer for each failed attempt
pub async fn fetch_page<F>(
    client: &Client,
    url: &str,
    policy: &RetryPolicy,
    mut on_failure: F,
) -> Result<FetchedPage, FetchError>
where
    F: FnMut(&AttemptFailure),
{
    let attempts = policy.max_attempts.max(1);
    let mut failures = Vec::new();
    let mut last_status = None;

    for attempt in 1..=attempts {
        let failure = match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    let charset = response
                        .headers()
                        .get(CONTENT_TYPE)
                        .and_then(|value| value.to_str().ok())
                        .and_then(content_type_charset);
                    match response.bytes().await {
                        Ok(body) => {
                            tracing::debug!("Fetched {} ({} bytes)", url, body.len());
                            return Ok(FetchedPage {
                                status: status.as_u16(),
                                body: body.to_vec(),
                                charset,
                            });
                        }
                        Err(e) => {
                            last_status = Some(status.as_u16());
                            AttemptFailure::Transport(e.to_string())
                        }
                    }
                } else {
                    last_status = Some(status.as_u16());
                    AttemptFailure::Status(status.as_u16())
                }
            }
            Err(e) => AttemptFailure::Transport(classify_error(&e)),
        };

        tracing::warn!(
            "Attempt {}/{} for {} failed: {}",
            attempt,
            attempts,
            url,
            failure
        );
        on_failure(&failure);
        failures.push(failure);

        if attempt < attempts {
            tokio::time::sleep(policy.next_delay()).await;
        }
    }

    Err(FetchError::Exhausted {
        url: url.to_string(),
        attempts,
        last_status,
        failures,
    })
}

/// Short description of a transport error
fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        "connection refused".to_string()
    } else {
        error.to_string()
    }
}
