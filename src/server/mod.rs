use crate::models::{NewsEnvelope, ScheduleEnvelope};
use crate::pipeline::Pipeline;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

type Shared = State<Arc<Pipeline>>;

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .route("/api/naver-baseball-articles", get(articles))
        .route("/api/naver-baseball-digest", get(digest))
        .route("/api/kbo-schedule", get(kbo_schedule))
        .with_state(pipeline)
}

pub async fn serve(pipeline: Arc<Pipeline>, bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(pipeline))
        .await
        .context("HTTP server error")
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn banner() -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/naver-baseball-articles",
            "/api/naver-baseball-digest",
            "/api/kbo-schedule",
        ],
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn articles(State(pipeline): Shared) -> Json<NewsEnvelope> {
    let limit = pipeline.config().news.feed_limit;
    Json(pipeline.news(limit).await)
}

async fn digest(State(pipeline): Shared) -> Json<NewsEnvelope> {
    let limit = pipeline.config().news.digest_limit;
    Json(pipeline.news(limit).await)
}

async fn kbo_schedule(State(pipeline): Shared) -> Json<ScheduleEnvelope> {
    Json(pipeline.schedule().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, NewsConfig, TransportConfig};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn spawn_app(config: AppConfig) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(Arc::new(Pipeline::new(config).unwrap()));
        tokio::spawn(async move { axum::serve(listener, app).await });
        format!("http://{}", addr)
    }

    async fn get_json(url: &str) -> (u16, Value) {
        let resp = reqwest::get(url).await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    fn news_site_config(site: &MockServer) -> AppConfig {
        AppConfig {
            transport: TransportConfig { prefer_rendered: false, ..TransportConfig::default() },
            news: NewsConfig {
                url: format!("{}/kbaseball/news", site.uri()),
                origin: site.uri(),
                ..NewsConfig::default()
            },
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_health_and_banner() {
        let site = MockServer::start().await;
        let base = spawn_app(news_site_config(&site)).await;

        let (status, body) = get_json(&format!("{}/health", base)).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");

        let (_, body) = get_json(&base).await;
        assert_eq!(body["service"], "sports_scraper");
    }

    #[tokio::test]
    async fn test_feed_and_digest_caps() {
        let site = MockServer::start().await;
        let items: String = (1..=8)
            .map(|i| format!(r#"<a href="/kbaseball/news/{i}">KBO 오늘의 소식 {i}번</a>"#))
            .collect();
        Mock::given(method("GET"))
            .and(path("/kbaseball/news"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("<div>{}</div>", items)))
            .mount(&site)
            .await;
        let base = spawn_app(news_site_config(&site)).await;

        let (_, feed) = get_json(&format!("{}/api/naver-baseball-articles", base)).await;
        assert_eq!(feed["success"], true);
        assert_eq!(feed["count"], 8);
        assert!(feed["debug"].is_null());

        let (_, digest) = get_json(&format!("{}/api/naver-baseball-digest", base)).await;
        assert_eq!(digest["count"], 5);
        assert_eq!(digest["articles"][0]["source"], "네이버 스포츠");
    }

    #[tokio::test]
    async fn test_failure_still_answers_200() {
        let site = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&site)
            .await;
        let mut config = news_site_config(&site);
        config.schedule.url = format!("{}/Schedule/Schedule.aspx", site.uri());
        let base = spawn_app(config).await;

        let (status, body) = get_json(&format!("{}/api/kbo-schedule", base)).await;
        assert_eq!(status, 200);
        assert_eq!(body["success"], false);
        assert_eq!(body["count"], 0);
        assert!(body["error"].as_str().unwrap().starts_with("failed to reach"));
    }
}
