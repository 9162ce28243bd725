//! Batch runner - per-article pipeline orchestration
//!
//! This module drives the harvest of an identifier list:
//! - Normalizing identifiers and skipping unrecognized ones
//! - Fetching, extracting, formatting and persisting each article in turn
//! - Isolating failures so one bad article never stops the batch
//! - Writing the operational log

use crate::config::Config;
use crate::harvest::extractor::extract_record;
use crate::harvest::fetcher::{build_http_client, fetch_page, RetryPolicy};
use crate::ident::{article_url, normalize_identifier};
use crate::output::{format_record, ArtifactWriter, OperationLog};
use crate::{HarvestError, IdentifierError};
use reqwest::Client;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// What happened to each identifier of a batch
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Identifiers whose artifacts were all written
    pub succeeded: Vec<String>,

    /// Identifiers that failed, with the failure detail
    pub failed: Vec<(String, String)>,

    /// Inputs rejected before any request was made
    pub skipped: Vec<String>,
}

impl RunSummary {
    /// Number of identifiers that reached the fetch stage
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Sequential harvester
///
/// Owns the HTTP client, the artifact writer (and with it the single handle
/// on the record log) and the operational log.
pub struct Runner {
    config: Config,
    client: Client,
    policy: RetryPolicy,
    cooldown: Duration,
    writer: ArtifactWriter,
    oplog: OperationLog,
}

impl Runner {
    /// Creates a runner, creating the output directories as needed
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Runner)` - Client built and logs opened
    /// * `Err(HarvestError)` - Failed to build the client or open an output file
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.source)?;
        let writer = ArtifactWriter::open(&config.output)?;
        let oplog = OperationLog::open(&config.output.operation_log_path())?;

        Ok(Self {
            policy: RetryPolicy::from_config(&config.fetch),
            cooldown: Duration::from_millis(config.fetch.failure_cooldown_ms),
            config,
            client,
            writer,
            oplog,
        })
    }

    /// Replaces the retry policy derived from the configuration
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the pause taken after a failed article
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Harvests every identifier in order, one at a time
    ///
    /// Blank entries are ignored. Entries that do not normalize to a
    /// recognized identifier are reported and skipped without a request.
    /// Failures are logged and the batch moves on after the cooldown.
    pub async fn run<S: AsRef<str>>(&mut self, ids: &[S]) -> RunSummary {
        let mut summary = RunSummary::default();

        for raw in ids {
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                continue;
            }

            let id = match normalize_identifier(raw, &self.config.source.id_prefix) {
                Ok(id) => id,
                Err(e) => {
                    self.report_skip(raw, &e);
                    summary.skipped.push(raw.to_string());
                    continue;
                }
            };

            let started = Instant::now();
            match self.process(&id).await {
                Ok((path, words)) => {
                    let ms = started.elapsed().as_millis();
                    self.oplog.success(&id, ms, words);
                    tracing::info!("Harvested {} in {}ms ({} words)", id, ms, words);
                    println!("✓ {} → {}", id, path.display());
                    summary.succeeded.push(id);
                }
                Err(e) => {
                    let ms = started.elapsed().as_millis();
                    let detail = e.to_string();
                    self.oplog.failure(&id, ms, &detail);
                    tracing::error!("Failed {} after {}ms: {}", id, ms, detail);
                    println!("✗ {} ERROR: {}", id, detail);
                    summary.failed.push((id, detail));

                    if !self.cooldown.is_zero() {
                        tokio::time::sleep(self.cooldown).await;
                    }
                }
            }
        }

        tracing::info!(
            "Batch finished: {} succeeded, {} failed, {} skipped",
            summary.succeeded.len(),
            summary.failed.len(),
            summary.skipped.len()
        );

        summary
    }

    /// Runs fetch → extract → format → persist for one identifier
    ///
    /// Returns the text artifact path and the body word count.
    async fn process(&mut self, id: &str) -> Result<(PathBuf, usize), HarvestError> {
        let url = article_url(&self.config.source, id);
        tracing::debug!("Fetching {}", url);

        let oplog = &mut self.oplog;
        let page = fetch_page(&self.client, &url, &self.policy, |failure| {
            oplog.warn(&url, &failure.to_string())
        })
        .await?;

        let record = extract_record(&page.text(), &url, id)?;
        tracing::debug!(
            "Extracted {}: title={:?}, {} authors, {} body words",
            id,
            record.title,
            record.authors.len(),
            record.body_word_count
        );

        let text = format_record(&record, self.config.output.wrap_width);
        self.writer.persist(id, &page.body, &text, &record)?;

        Ok((self.writer.text_path(id), record.body_word_count))
    }

    fn report_skip(&mut self, raw: &str, error: &IdentifierError) {
        tracing::warn!("Skipping '{}': {}", raw, error);
        self.oplog.skip(raw, &error.to_string());
        println!("? skip {}", raw);
    }
}

/// Runs a complete batch with the given configuration
///
/// # Example
///
/// ```no_run
/// use pmc_harvest::config::load_config;
/// use pmc_harvest::harvest::run_batch;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let summary = run_batch(config, &["PMC1234567"]).await?;
/// println!("{} harvested", summary.succeeded.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_batch<S: AsRef<str>>(config: Config, ids: &[S]) -> Result<RunSummary, HarvestError> {
    let mut runner = Runner::new(config)?;
    Ok(runner.run(ids).await)
}
