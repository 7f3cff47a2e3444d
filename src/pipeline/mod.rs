//! Pipeline orchestrator: fetch → parse → extract → assemble.
//!
//! Every scrape is one stateless invocation ending in an envelope. Transport
//! and parse failures are folded into a `success: false` envelope here and
//! never escape to the caller.
//!
//! The fetch is the only async step. Parsing and extraction run synchronously
//! on the fetched markup, so the parsed document never lives across an await.

pub mod assembler;

use crate::config::AppConfig;
use crate::errors::{ScrapeError, ScrapeResult};
use crate::models::{NewsDiagnostics, NewsEnvelope, ScheduleDiagnostics, ScheduleEnvelope};
use crate::scraper::cleaner::{parse_kbo_date, truncate};
use crate::scraper::dom::Document;
use crate::scraper::http_client::{FetchOptions, HttpClient, Transport};
use crate::scraper::news::{self, ArticleContext, ArticleStrategy};
use crate::scraper::render::select_renderer;
use crate::scraper::schedule::{self, ContainerLocator, ScheduleExtraction};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

const HTML_SAMPLE_LEN: usize = 500;

pub struct Pipeline {
    config: AppConfig,
    transport: Transport,
    strategies: Vec<Box<dyn ArticleStrategy>>,
    locators: Vec<Box<dyn ContainerLocator>>,
}

/// Both scrape kinds from one `run_all`. `None` means the task itself died.
#[derive(Debug, Serialize)]
pub struct Combined {
    pub news: Option<NewsEnvelope>,
    pub schedule: Option<ScheduleEnvelope>,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Result<Self> {
        let http = HttpClient::new(&config.transport).context("Failed to build HTTP client")?;
        let transport = Transport::new(http, select_renderer(&config.transport));
        info!("Renderer: {}", transport.renderer_name());
        Ok(Self::with_transport(config, transport))
    }

    pub fn with_transport(config: AppConfig, transport: Transport) -> Self {
        Self {
            config,
            transport,
            strategies: news::default_strategies(),
            locators: schedule::default_locators(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    // ── News ──────────────────────────────────────────────────────────────────

    pub async fn news(&self, limit: usize) -> NewsEnvelope {
        let url = &self.config.news.url;
        let today = Local::now().date_naive();
        let opts = FetchOptions::from_config(&self.config.transport, news::WAIT_SELECTORS);

        let result = match self.transport.fetch(url, &opts).await {
            Ok(fetched) => self.news_from_markup(&fetched.body, fetched.rendered, limit, today),
            Err(e) => Err(ScrapeError::from(e)),
        };

        result.unwrap_or_else(|e| {
            warn!("News scrape failed: {}", e);
            assembler::news_failure(&e, &site_of(url), today)
        })
    }

    pub fn news_from_markup(
        &self,
        markup: &str,
        rendered: bool,
        limit: usize,
        today: NaiveDate,
    ) -> ScrapeResult<NewsEnvelope> {
        let cfg = &self.config.news;
        let doc = Document::parse(markup)?;
        let ctx = ArticleContext {
            origin: cfg.origin.clone(),
            source_label: cfg.source_label.clone(),
            title_max_len: cfg.title_max_len,
            min_title_len: cfg.min_title_len,
        };

        let total_links_found = doc.find_all("a", true).len();
        let (candidates, tally) = news::extract_articles(&doc, &self.strategies, &ctx);
        info!(
            "{} links, {} article candidates, {} skipped",
            total_links_found, tally.candidates, tally.skipped
        );

        let articles = assembler::dedup_articles(candidates, cfg.dedup_key_len, limit);
        let diagnostics = NewsDiagnostics {
            html_length: doc.html_length(),
            total_links_found,
            articles_found: tally.candidates,
            unique_articles: articles.len(),
            skipped: tally.skipped,
            renderer_used: rendered,
        };

        Ok(assembler::news_envelope(articles, today, diagnostics))
    }

    // ── Schedule ──────────────────────────────────────────────────────────────

    pub async fn schedule(&self) -> ScheduleEnvelope {
        let url = &self.config.schedule.url;
        let opts = FetchOptions::from_config(&self.config.transport, schedule::WAIT_SELECTORS);

        let result = match self.transport.fetch(url, &opts).await {
            Ok(fetched) => self.schedule_from_markup(&fetched.body, parse_kbo_date),
            Err(e) => Err(ScrapeError::from(e)),
        };

        result.unwrap_or_else(|e| {
            warn!("Schedule scrape failed: {}", e);
            assembler::schedule_failure(&e, &site_of(url))
        })
    }

    /// `parse_date` resolves row date text; live scrapes use [`parse_kbo_date`].
    pub fn schedule_from_markup(
        &self,
        markup: &str,
        parse_date: impl Fn(&str) -> Option<NaiveDate>,
    ) -> ScrapeResult<ScheduleEnvelope> {
        let doc = Document::parse(markup)?;
        let extraction = schedule::extract_games(&doc, &self.locators, parse_date);
        let diagnostics = schedule_diagnostics(&doc, markup, &extraction);
        let games = assembler::dedup_games(extraction.games);
        Ok(assembler::schedule_envelope(games, diagnostics))
    }

    // ── Both ──────────────────────────────────────────────────────────────────

    /// Feed-capped news and the schedule as two independent tasks.
    pub async fn run_all(self: Arc<Self>) -> Combined {
        let news = {
            let pipeline = Arc::clone(&self);
            tokio::spawn(async move {
                let limit = pipeline.config.news.feed_limit;
                pipeline.news(limit).await
            })
        };
        let schedule = {
            let pipeline = Arc::clone(&self);
            tokio::spawn(async move { pipeline.schedule().await })
        };

        let news = news
            .await
            .inspect_err(|e| error!("Task panic for news: {}", e))
            .ok();
        let schedule = schedule
            .await
            .inspect_err(|e| error!("Task panic for schedule: {}", e))
            .ok();

        Combined { news, schedule }
    }
}

fn schedule_diagnostics(
    doc: &Document,
    markup: &str,
    extraction: &ScheduleExtraction,
) -> ScheduleDiagnostics {
    let mut diag = ScheduleDiagnostics {
        html_length: doc.html_length(),
        found_table: extraction.container.is_some(),
        table_name: extraction.container.as_ref().map(|c| c.tag.clone()),
        locator: extraction.container.as_ref().map(|c| c.locator.to_string()),
        rows_found: extraction.rows_found,
        parsing_attempts: extraction.parsing_attempts,
        skipped: extraction.skipped,
        first_row_cells: extraction.first_row_cells,
        first_row_text: extraction.first_row_text.clone(),
        ..Default::default()
    };

    if extraction.container.is_none() {
        let tables = doc.find_all("table", false);
        let first = tables.first();
        diag.html_sample = Some(truncate(markup, HTML_SAMPLE_LEN));
        diag.total_tables_found = Some(tables.len());
        diag.first_table_id = first.map(|t| t.value().id().unwrap_or("no-id").to_string());
        diag.first_table_class = first.map(|t| t.value().classes().map(str::to_string).collect());
    }

    diag
}

/// Host of `url` for error messages; the raw string when it does not parse.
fn site_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}
