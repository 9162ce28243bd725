use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for pmc-harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where articles are fetched from and how the client identifies itself
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Article URL with an `{id}` placeholder
    #[serde(rename = "url-template")]
    pub url_template: String,

    /// Prefix every accepted identifier must start with
    #[serde(rename = "id-prefix")]
    pub id_prefix: String,

    /// Value of the User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url_template: "https://pmc.ncbi.nlm.nih.gov/articles/{id}/".to_string(),
            id_prefix: "PMC".to_string(),
            user_agent: format!(
                "pmc-harvest/{} (+https://github.com/pmc-harvest/pmc-harvest)",
                env!("CARGO_PKG_VERSION")
            ),
            timeout_secs: 30,
        }
    }
}

/// Retry and cooldown behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Attempts per article before giving up
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Lower bound of the jittered sleep between attempts (milliseconds)
    #[serde(rename = "min-delay-ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the jittered sleep between attempts (milliseconds)
    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,

    /// Pause after an article fails, before the next one (milliseconds)
    #[serde(rename = "failure-cooldown-ms")]
    pub failure_cooldown_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay_ms: 800,
            max_delay_ms: 1600,
            failure_cooldown_ms: 1200,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding raw/, parsed/, jsonl/ and logs/
    pub root: PathBuf,

    /// Column width of the wrapped text artifacts
    #[serde(rename = "wrap-width")]
    pub wrap_width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("science"),
            wrap_width: 120,
        }
    }
}

impl OutputConfig {
    /// Directory of raw markup artifacts
    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("raw")
    }

    /// Directory of wrapped text artifacts
    pub fn parsed_dir(&self) -> PathBuf {
        self.root.join("parsed")
    }

    /// The append-only JSON record log
    pub fn record_log_path(&self) -> PathBuf {
        self.root.join("jsonl").join("pmc_catalog.v1.jsonl")
    }

    /// The operational log
    pub fn operation_log_path(&self) -> PathBuf {
        self.root.join("logs").join("pmc_pull.log")
    }

    /// The CSV summary written by the indexer
    pub fn index_path(&self) -> PathBuf {
        self.root.join("science_index.csv")
    }
}
