use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CSV_PATH: &str = "nova_arxiv_csv.csv";
pub const DEFAULT_ARXIV_API_BASE: &str = "http://export.arxiv.org";
pub const DEFAULT_ARXIV_SOURCE_BASE: &str = "https://arxiv.org";
pub const DEFAULT_TRANSLATE_BASE: &str = "https://translate.googleapis.com";
pub const DEFAULT_TARGET_LANGUAGE: &str = "ko";
const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Process-wide settings, built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct Config {
    /// CSV table holding one row per processed paper
    pub csv_path: PathBuf,
    /// Base URL of the arXiv Atom query API
    pub arxiv_api_base: String,
    /// Base URL serving `/e-print/{id}` source archives
    pub arxiv_source_base: String,
    /// Base URL of the translation endpoint
    pub translate_base: String,
    /// Language code translations are produced in
    pub target_language: String,
    /// Upper bound on retries against remote APIs
    pub api_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            arxiv_api_base: DEFAULT_ARXIV_API_BASE.to_string(),
            arxiv_source_base: DEFAULT_ARXIV_SOURCE_BASE.to_string(),
            translate_base: DEFAULT_TRANSLATE_BASE.to_string(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            api_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Build the configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_timeout = env::var("API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.api_timeout);

        Self {
            csv_path: env::var("NOVA_CSV_PATH").map(PathBuf::from).unwrap_or(defaults.csv_path),
            arxiv_api_base: env::var("ARXIV_API_BASE_URL").unwrap_or(defaults.arxiv_api_base),
            arxiv_source_base: env::var("ARXIV_BASE_URL").unwrap_or(defaults.arxiv_source_base),
            translate_base: env::var("TRANSLATE_BASE_URL").unwrap_or(defaults.translate_base),
            target_language: env::var("NOVA_TARGET_LANGUAGE").unwrap_or(defaults.target_language),
            api_timeout,
        }
    }

    /// Point every remote endpoint at one base URL (used against local mock servers).
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        self.arxiv_api_base = base.clone();
        self.arxiv_source_base = base.clone();
        self.translate_base = base;
        self
    }
}
