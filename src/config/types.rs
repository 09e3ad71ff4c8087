use serde::Deserialize;

/// Main configuration structure for Linkscout
///
/// Every section is optional; missing keys fall back to the defaults below,
/// so an empty file (or no file at all) yields a usable configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ordered list of seed URLs
    pub seeds: Vec<String>,
    pub crawler: CrawlerConfig,
    pub retry: RetryConfig,
    pub keywords: KeywordConfig,
    pub scorer: ScorerConfig,
    pub output: OutputConfig,
    #[serde(rename = "test-mode")]
    pub test_mode: TestModeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seeds: vec![
                "https://www.a2gov.org/".to_string(),
                "https://bozeman.net/".to_string(),
                "https://asu.edu/".to_string(),
                "https://boerneisd.net/".to_string(),
            ],
            crawler: CrawlerConfig::default(),
            retry: RetryConfig::default(),
            keywords: KeywordConfig::default(),
            scorer: ScorerConfig::default(),
            output: OutputConfig::default(),
            test_mode: TestModeConfig::default(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from seed URLs (seeds are depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of pages written per run; `None` means uncapped
    #[serde(rename = "max-pages")]
    pub max_pages: Option<u32>,

    /// Links beyond this count on one page are ignored
    #[serde(rename = "max-links-per-page")]
    pub max_links_per_page: usize,

    /// Per-request HTTP timeout
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// User-Agent header sent with every page request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: Some(10),
            max_links_per_page: 300,
            request_timeout_secs: 20,
            user_agent: format!(
                "Mozilla/5.0 (compatible; linkscout/{})",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

/// Fetch retry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts on the original URL, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt (milliseconds); doubles each time
    #[serde(rename = "base-delay-ms")]
    pub base_delay_ms: u64,

    /// Ceiling for any single backoff delay (milliseconds)
    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,

    /// Whether to try the `www.`-toggled host after a timeout or DNS failure
    #[serde(rename = "toggle-www")]
    pub toggle_www: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2_000,
            max_delay_ms: 30_000,
            toggle_www: true,
        }
    }
}

/// Keyword sets for tier assignment
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub high: Vec<String>,
    pub medium: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            high: [
                "Contact",
                "ACFR",
                "Budget",
                "Financial Report",
                "Annual Report",
                "Fiscal Year",
                "Financial Statement",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            medium: ["Finance", "Director", "Department", ".pdf", "Staff", "Treasury"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

/// Which relevancy scorer backs the keyword classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ScorerKind {
    /// Keyword-only scoring, no network
    #[serde(rename = "keyword")]
    Keyword,

    /// OpenAI-compatible chat-completions endpoint
    #[serde(rename = "openai")]
    OpenAi,

    /// Google Gemini, several links per request
    #[serde(rename = "gemini")]
    Gemini,
}

/// Relevancy scorer configuration
///
/// `endpoint`, `model` and `api-key-env` describe the OpenAI-compatible
/// backend; the Gemini backend reads its own `[scorer.gemini]` table. The
/// remaining keys apply to whichever LLM backend is selected.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub kind: ScorerKind,

    /// Base URL of the OpenAI-compatible API
    pub endpoint: String,

    pub model: String,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    pub gemini: GeminiConfig,

    pub temperature: f32,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Upper bound on scorer calls per minute
    #[serde(rename = "calls-per-minute")]
    pub calls_per_minute: u32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            kind: ScorerKind::Keyword,
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            gemini: GeminiConfig::default(),
            temperature: 0.3,
            timeout_secs: 30,
            calls_per_minute: 15,
        }
    }
}

/// Gemini backend settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Base URL of the Generative Language API
    pub endpoint: String,

    pub model: String,

    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Links rated per request
    #[serde(rename = "batch-size")]
    pub batch_size: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            batch_size: 5,
        }
    }
}

impl ScorerConfig {
    /// Model name of the selected backend, `None` for keyword scoring
    pub fn active_model(&self) -> Option<&str> {
        match self.kind {
            ScorerKind::Keyword => None,
            ScorerKind::OpenAi => Some(&self.model),
            ScorerKind::Gemini => Some(&self.gemini.model),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "linkscout.db".to_string(),
        }
    }
}

/// Small fixed crawl used to verify the pipeline quickly
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TestModeConfig {
    pub seeds: Vec<String>,

    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    #[serde(rename = "max-links-per-page")]
    pub max_links_per_page: usize,
}

impl Default for TestModeConfig {
    fn default() -> Self {
        Self {
            seeds: vec!["https://www.austintexas.gov/austin-city-council".to_string()],
            max_depth: 1,
            max_pages: 1,
            max_links_per_page: 200,
        }
    }
}
