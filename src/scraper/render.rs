use crate::config::TransportConfig;
use crate::errors::TransportError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Bounds and readiness hints for one rendered navigation.
#[derive(Debug, Clone)]
#[cfg_attr(not(feature = "render"), allow(dead_code))]
pub struct RenderWait {
    pub settle: Duration,
    pub selector_wait: Duration,
    /// Any of these appearing means the content has been rendered.
    pub selectors: &'static [&'static str],
}

// ── Renderer capability ───────────────────────────────────────────────────────

/// Headless-browser capability. Absence is a reduced-capability path, not an error.
#[async_trait]
pub trait Renderer: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool;

    /// Navigate to `url` and return the rendered markup.
    async fn render(&self, url: &str, wait: &RenderWait) -> Result<String, TransportError>;
}

/// Selected when no browser backend is compiled in or rendering is disabled.
#[derive(Debug, Default)]
pub struct UnavailableRenderer;

#[async_trait]
impl Renderer for UnavailableRenderer {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn render(&self, _url: &str, _wait: &RenderWait) -> Result<String, TransportError> {
        Err(TransportError::RenderUnavailable)
    }
}

/// Pick the renderer once at startup.
pub fn select_renderer(config: &TransportConfig) -> Arc<dyn Renderer> {
    if !config.prefer_rendered {
        return Arc::new(UnavailableRenderer);
    }
    browser_backend(config)
}

#[cfg(feature = "render")]
fn browser_backend(config: &TransportConfig) -> Arc<dyn Renderer> {
    Arc::new(headless::HeadlessRenderer::new(config))
}

#[cfg(not(feature = "render"))]
fn browser_backend(_config: &TransportConfig) -> Arc<dyn Renderer> {
    tracing::debug!("Built without the `render` feature; plain fetch only");
    Arc::new(UnavailableRenderer)
}

// ── headless_chrome backend ───────────────────────────────────────────────────

#[cfg(feature = "render")]
pub mod headless {
    use super::{RenderWait, Renderer};
    use crate::config::TransportConfig;
    use crate::errors::TransportError;
    use async_trait::async_trait;
    use headless_chrome::{Browser, LaunchOptions};
    use std::sync::{Arc, Mutex};
    use tracing::debug;

    /// (url, status) of every response the tab received, in arrival order.
    type Responses = Arc<Mutex<Vec<(String, u16)>>>;

    pub struct HeadlessRenderer {
        user_agent: String,
        accept_language: String,
    }

    impl HeadlessRenderer {
        pub fn new(config: &TransportConfig) -> Self {
            Self {
                user_agent: config.user_agent.clone(),
                accept_language: config.accept_language.clone(),
            }
        }
    }

    fn render_err(e: impl std::fmt::Display) -> TransportError {
        TransportError::Render(e.to_string())
    }

    fn render_blocking(
        url: &str,
        wait: &RenderWait,
        user_agent: &str,
        accept_language: &str,
    ) -> Result<String, TransportError> {
        let browser = Browser::new(LaunchOptions {
            headless: true,
            window_size: Some((1920, 1080)),
            idle_browser_timeout: wait.settle + wait.selector_wait,
            ..Default::default()
        })
        .map_err(render_err)?;

        let tab = browser.new_tab().map_err(render_err)?;
        tab.set_default_timeout(wait.settle);
        tab.set_user_agent(user_agent, Some(accept_language), None)
            .map_err(render_err)?;

        let responses: Responses = Arc::default();
        let sink = Arc::clone(&responses);
        tab.register_response_handling(
            "document-status",
            Box::new(move |params, _body| {
                if let Ok(mut seen) = sink.lock() {
                    seen.push((params.response.url.clone(), params.response.status as u16));
                }
            }),
        )
        .map_err(render_err)?;

        tab.navigate_to(url).map_err(render_err)?;
        tab.wait_until_navigated().map_err(render_err)?;

        let final_url = tab.get_url();
        if let Ok(seen) = responses.lock() {
            ensure_document_ok(&seen, url, &final_url)?;
        }

        // Not fatal: read whatever is there once the wait runs out
        let selector = wait.selectors.join(", ");
        if let Err(e) = tab.wait_for_element_with_custom_timeout(&selector, wait.selector_wait) {
            debug!("Content selectors not seen on {}: {}", url, e);
        }

        tab.get_content().map_err(render_err)
    }

    /// The main document is the last response for the landed URL (or the
    /// requested one when nothing matched the landed URL). Anything but 200 fails.
    pub(super) fn ensure_document_ok(
        responses: &[(String, u16)],
        requested: &str,
        landed: &str,
    ) -> Result<(), TransportError> {
        let status = [landed, requested].iter().find_map(|target| {
            responses
                .iter()
                .rev()
                .find(|(u, _)| u.trim_end_matches('/') == target.trim_end_matches('/'))
                .map(|(_, status)| *status)
        });
        match status {
            Some(200) | None => Ok(()),
            Some(code) => Err(TransportError::Status(code)),
        }
    }

    #[async_trait]
    impl Renderer for HeadlessRenderer {
        fn name(&self) -> &'static str {
            "headless_chrome"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn render(&self, url: &str, wait: &RenderWait) -> Result<String, TransportError> {
            let url = url.to_string();
            let wait = wait.clone();
            let user_agent = self.user_agent.clone();
            let accept_language = self.accept_language.clone();

            tokio::task::spawn_blocking(move || {
                render_blocking(&url, &wait, &user_agent, &accept_language)
            })
            .await
            .map_err(render_err)?
        }
    }
}
