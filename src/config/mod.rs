use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub transport: TransportConfig,
    pub news: NewsConfig,
    pub schedule: ScheduleConfig,
    pub server: ServerConfig,
}

/// Plain-fetch and render-path settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    pub timeout_secs: u64,

    /// Try the headless render path first when a renderer is available.
    pub prefer_rendered: bool,

    /// Upper bound for the rendered page to settle after navigation.
    pub render_settle_secs: u64,

    /// Upper bound for the content selectors to show up once settled.
    pub render_selector_wait_secs: u64,

    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

/// Baseball news feed settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NewsConfig {
    pub url: String,
    /// Origin prepended to root-relative links and images.
    pub origin: String,
    pub source_label: String,
    pub feed_limit: usize,
    pub digest_limit: usize,
    pub title_max_len: usize,
    pub dedup_key_len: usize,
    pub min_title_len: usize,
}

/// KBO schedule settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub url: String,
}

/// HTTP serving settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            prefer_rendered: true,
            render_settle_secs: 30,
            render_selector_wait_secs: 5,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
                .to_string(),
            accept_language: "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            url: "https://m.sports.naver.com/kbaseball/news".to_string(),
            origin: "https://m.sports.naver.com".to_string(),
            source_label: "네이버 스포츠".to_string(),
            feed_limit: 10,
            digest_limit: 5,
            title_max_len: 200,
            dedup_key_len: 80,
            min_title_len: 5,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            url: "https://www.koreabaseball.com/Schedule/Schedule.aspx".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn render_settle(&self) -> Duration {
        Duration::from_secs(self.render_settle_secs)
    }

    pub fn render_selector_wait(&self) -> Duration {
        Duration::from_secs(self.render_selector_wait_secs)
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("SPORTS").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|e| {
            warn!("Invalid configuration ({}), using defaults", e);
            AppConfig::default()
        });
        Ok(app_cfg)
    }
}
