use crate::config::TransportConfig;
use crate::errors::TransportError;
use crate::scraper::render::{RenderWait, Renderer};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-call fetch options.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    /// Sent on top of the browser-like defaults.
    pub headers: Vec<(String, String)>,
    pub prefer_rendered: bool,
    pub render_wait: RenderWait,
}

impl FetchOptions {
    pub fn from_config(config: &TransportConfig, selectors: &'static [&'static str]) -> Self {
        Self {
            timeout: config.timeout(),
            headers: Vec::new(),
            prefer_rendered: config.prefer_rendered,
            render_wait: RenderWait {
                settle: config.render_settle(),
                selector_wait: config.render_selector_wait(),
                selectors,
            },
        }
    }
}

/// Markup plus which path produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub body: String,
    pub rendered: bool,
}

// ── Plain HTTP ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&config.user_agent)?);
        headers.insert(ACCEPT, header_value(&config.accept)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .gzip(true)
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { inner })
    }

    /// Single GET, no retries. Body is decoded as UTF-8 whatever the declared charset.
    pub async fn get_text(&self, url: &str, opts: &FetchOptions) -> Result<String, TransportError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let mut req = self.inner.get(parsed).timeout(opts.timeout);
        for (name, value) in &opts.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::InvalidHeader(e.to_string()))?;
            req = req.header(name, header_value(value)?);
        }

        debug!("GET {}", url);
        let resp = req.send().await?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(TransportError::Status(status.as_u16()));
        }

        let bytes = resp.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn header_value(value: &str) -> Result<HeaderValue, TransportError> {
    HeaderValue::from_str(value).map_err(|e| TransportError::InvalidHeader(e.to_string()))
}

// ── Transport: rendered path with plain fallback ──────────────────────────────

/// Callers get either a body or one terminal error, never both paths' noise.
#[derive(Clone)]
pub struct Transport {
    http: HttpClient,
    renderer: Arc<dyn Renderer>,
}

impl Transport {
    pub fn new(http: HttpClient, renderer: Arc<dyn Renderer>) -> Self {
        Self { http, renderer }
    }

    pub fn renderer_name(&self) -> &'static str {
        self.renderer.name()
    }

    pub async fn fetch(&self, url: &str, opts: &FetchOptions) -> Result<Fetched, TransportError> {
        if opts.prefer_rendered && self.renderer.is_available() {
            match self.renderer.render(url, &opts.render_wait).await {
                Ok(body) if !body.trim().is_empty() => {
                    info!("Rendered {} via {} ({} bytes)", url, self.renderer.name(), body.len());
                    return Ok(Fetched { body, rendered: true });
                }
                Ok(_) => warn!("Renderer returned empty markup for {}, falling back", url),
                Err(e) => warn!("Render failed for {}: {}, falling back", url, e),
            }
        }

        match self.http.get_text(url, opts).await {
            Ok(body) => {
                info!("Fetched {} ({} bytes)", url, body.len());
                Ok(Fetched { body, rendered: false })
            }
            Err(e) => {
                warn!("Fetch failed for {}: {}", url, e);
                Err(e)
            }
        }
    }
}
