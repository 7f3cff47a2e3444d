//! Article extraction: independent heuristics whose results are unioned.
//!
//! * [`LinkScan`] walks every anchor and keeps the ones pointing at article paths.
//! * [`ContainerScan`] walks list-item style containers and takes their first
//!   article anchor.

use crate::errors::SkipReason;
use crate::models::Article;
use crate::scraper::cleaner::{absolutize_url, is_absolute_http, truncate};
use crate::scraper::dom::{self, ClassPattern, Document};
use once_cell::sync::Lazy;
use scraper::ElementRef;
use tracing::debug;

/// Path fragments that mark an href as an article link (case-sensitive).
pub const ARTICLE_PATHS: &[&str] = &[
    "sports.news",
    "news.naver",
    "/kbaseball/news/",
    "sports.naver.com/news",
];

/// Selectors a rendered page should show once the news list is in place.
pub const WAIT_SELECTORS: &[&str] = &[
    r#"a[href*="sports.news"]"#,
    r#"a[href*="news.naver"]"#,
    ".news_item",
    ".article_item",
];

static TITLE: Lazy<ClassPattern> =
    Lazy::new(|| ClassPattern::new("title|headline|tit|text|subject").unwrap());
static DATE: Lazy<ClassPattern> =
    Lazy::new(|| ClassPattern::new("date|time|info|date_time").unwrap());
static CONTAINER: Lazy<ClassPattern> =
    Lazy::new(|| ClassPattern::new("news_item|article_item|list_item|news_list").unwrap());

const IMAGE_ATTRS: [&str; 3] = ["src", "data-src", "data-lazy-src"];

// ── Context / tally ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ArticleContext {
    pub origin: String,
    pub source_label: String,
    pub title_max_len: usize,
    pub min_title_len: usize,
}

/// Counters shared by every strategy of one scrape.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tally {
    pub candidates: usize,
    pub skipped: usize,
}

impl Tally {
    fn skip(&mut self, strategy: &str, reason: SkipReason) {
        debug!("{}: skipped ({})", strategy, reason);
        self.skipped += 1;
    }
}

// ── Strategy seam ─────────────────────────────────────────────────────────────

pub trait ArticleStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, doc: &Document, ctx: &ArticleContext, tally: &mut Tally) -> Vec<Article>;
}

pub fn default_strategies() -> Vec<Box<dyn ArticleStrategy>> {
    vec![Box::new(LinkScan), Box::new(ContainerScan)]
}

/// Run every strategy in order and concatenate what they found.
pub fn extract_articles(
    doc: &Document,
    strategies: &[Box<dyn ArticleStrategy>],
    ctx: &ArticleContext,
) -> (Vec<Article>, Tally) {
    let mut tally = Tally::default();
    let mut articles = Vec::new();

    for strategy in strategies {
        let found = strategy.extract(doc, ctx, &mut tally);
        debug!("{}: {} candidates", strategy.name(), found.len());
        articles.extend(found);
    }

    tally.candidates = articles.len();
    (articles, tally)
}

pub struct LinkScan;

impl ArticleStrategy for LinkScan {
    fn name(&self) -> &'static str {
        "link-scan"
    }

    fn extract(&self, doc: &Document, ctx: &ArticleContext, tally: &mut Tally) -> Vec<Article> {
        let mut out = Vec::new();
        for anchor in doc.find_all("a", true) {
            match build_article(anchor, anchor, ctx) {
                Ok(article) => out.push(article),
                Err(reason) => tally.skip(self.name(), reason),
            }
        }
        out
    }
}

pub struct ContainerScan;

impl ArticleStrategy for ContainerScan {
    fn name(&self) -> &'static str {
        "container-scan"
    }

    fn extract(&self, doc: &Document, ctx: &ArticleContext, tally: &mut Tally) -> Vec<Article> {
        let mut out = Vec::new();
        for container in doc.find_all_by_class_pattern(&[], &CONTAINER) {
            let built = dom::find_anchor_in(container)
                .ok_or(SkipReason::MissingAnchor)
                .and_then(|anchor| build_article(container, anchor, ctx));
            match built {
                Ok(article) => out.push(article),
                Err(reason) => tally.skip(self.name(), reason),
            }
        }
        out
    }
}

// ── Shared field extraction ───────────────────────────────────────────────────

fn is_article_href(href: &str) -> bool {
    ARTICLE_PATHS.iter().any(|p| href.contains(p))
}

/// `scope` is where title/image/date are searched; `anchor` supplies the link.
fn build_article(
    scope: ElementRef<'_>,
    anchor: ElementRef<'_>,
    ctx: &ArticleContext,
) -> Result<Article, SkipReason> {
    let href = anchor.value().attr("href").ok_or(SkipReason::MissingAnchor)?;
    if !is_article_href(href) {
        return Err(SkipReason::OutsideAllowList);
    }

    let title = match dom::find_in(scope, &[], Some(&*TITLE)) {
        Some(el) => dom::text_of(el),
        None => dom::text_of(anchor),
    };
    if title.chars().count() < ctx.min_title_len {
        return Err(SkipReason::ShortTitle);
    }

    let link = absolutize_url(href, &ctx.origin);
    if !is_absolute_http(&link) {
        return Err(SkipReason::UnresolvableLink);
    }

    let image = dom::find_in(scope, &["img"], None)
        .and_then(|img| IMAGE_ATTRS.iter().find_map(|a| dom::attr_non_empty(&img, a)))
        .map(|src| absolutize_url(src, &ctx.origin))
        .unwrap_or_default();

    let published_text = dom::find_in(scope, &[], Some(&*DATE))
        .map(dom::text_of)
        .unwrap_or_default();

    Ok(Article {
        title: truncate(&title, ctx.title_max_len),
        link,
        image,
        published_text,
        source: ctx.source_label.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ArticleContext {
        ArticleContext {
            origin: "https://m.sports.naver.com".into(),
            source_label: "네이버 스포츠".into(),
            title_max_len: 200,
            min_title_len: 5,
        }
    }

    fn run(html: &str, strategy: &dyn ArticleStrategy) -> (Vec<Article>, Tally) {
        let doc = Document::parse(html).unwrap();
        let mut tally = Tally::default();
        let out = strategy.extract(&doc, &ctx(), &mut tally);
        (out, tally)
    }

    #[test]
    fn test_link_scan_uses_title_element() {
        let html = r#"
            <a href="/kbaseball/news/article/001">
              <img data-src="//imgnews.pstatic.net/a.jpg">
              <strong class="NewsItem_title">LG 트윈스, 스프링캠프 출국</strong>
              <span class="NewsItem_date">3시간 전</span>
            </a>"#;
        let (out, tally) = run(html, &LinkScan);

        assert_eq!(tally.skipped, 0);
        assert_eq!(out.len(), 1);
        let a = &out[0];
        assert_eq!(a.title, "LG 트윈스, 스프링캠프 출국");
        assert_eq!(a.link, "https://m.sports.naver.com/kbaseball/news/article/001");
        assert_eq!(a.image, "https://imgnews.pstatic.net/a.jpg");
        assert_eq!(a.published_text, "3시간 전");
        assert_eq!(a.source, "네이버 스포츠");
    }

    #[test]
    fn test_link_scan_falls_back_to_anchor_text() {
        let html = r#"<a href="https://sports.news.naver.com/news?oid=1">KIA 새 외국인 투수 영입</a>"#;
        let (out, _) = run(html, &LinkScan);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "KIA 새 외국인 투수 영입");
        assert_eq!(out[0].image, "");
        assert_eq!(out[0].published_text, "");
    }

    #[test]
    fn test_link_scan_rejects_navigation_noise() {
        let html = r#"
            <a href="/kbaseball/news/">홈</a>
            <a href="/kbaseball/schedule">일정 및 결과 보기</a>
            <a href="/kbaseball/news/1">ok</a>"#;
        let (out, tally) = run(html, &LinkScan);
        assert!(out.is_empty());
        assert_eq!(tally.skipped, 3);
    }

    #[test]
    fn test_allow_list_is_case_sensitive() {
        let html = r#"<a href="/KBASEBALL/NEWS/1">대문자 경로 기사 제목</a>"#;
        let (out, _) = run(html, &LinkScan);
        assert!(out.is_empty());
    }

    #[test]
    fn test_image_attribute_priority() {
        let html = r#"
            <a href="/kbaseball/news/1"><img src="" data-src="/lazy.jpg" data-lazy-src="/later.jpg">첫 번째 기사 제목</a>
            <a href="/kbaseball/news/2"><img data-lazy-src="/later.jpg">두 번째 기사 제목</a>
            <a href="/kbaseball/news/3"><img src="https://cdn/x.png" data-src="/lazy.jpg">세 번째 기사 제목</a>"#;
        let (out, _) = run(html, &LinkScan);
        let images: Vec<&str> = out.iter().map(|a| a.image.as_str()).collect();
        assert_eq!(
            images,
            vec![
                "https://m.sports.naver.com/lazy.jpg",
                "https://m.sports.naver.com/later.jpg",
                "https://cdn/x.png",
            ]
        );
    }

    #[test]
    fn test_title_is_truncated() {
        let long = "가".repeat(250);
        let html = format!(r#"<a href="/kbaseball/news/1"><span class="title">{}</span></a>"#, long);
        let (out, _) = run(&html, &LinkScan);
        assert_eq!(out[0].title.chars().count(), 200);
    }

    #[test]
    fn test_container_scan_scopes_title_to_container() {
        let html = r#"
            <ul>
              <li class="news_item">
                <div class="thumb"><img src="/t.jpg"></div>
                <a href="https://n.news.naver.com/article/109/1">원문 보기</a>
                <p class="headline">두산, 새 시즌 주장 발표</p>
                <em class="info">2025.01.27.</em>
              </li>
              <li class="news_item"><span>광고</span></li>
            </ul>"#;
        let (out, tally) = run(html, &ContainerScan);

        assert_eq!(out.len(), 1);
        assert_eq!(tally.skipped, 1);
        assert_eq!(out[0].title, "두산, 새 시즌 주장 발표");
        assert_eq!(out[0].link, "https://n.news.naver.com/article/109/1");
        assert_eq!(out[0].image, "https://m.sports.naver.com/t.jpg");
        assert_eq!(out[0].published_text, "2025.01.27.");
    }

    #[test]
    fn test_container_scan_falls_back_to_anchor_text() {
        let html = r#"
            <div class="article_item">
              <a href="https://sports.news.naver.com/news?oid=2">NC 다이노스 홈 개막전 매진</a>
              <span class="date">1일 전</span>
            </div>"#;
        let (out, tally) = run(html, &ContainerScan);

        assert_eq!(tally.skipped, 0);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "NC 다이노스 홈 개막전 매진");
        assert_eq!(out[0].published_text, "1일 전");
    }

    #[test]
    fn test_strategies_are_additive() {
        let html = r#"
            <div class="news_list">
              <a href="/kbaseball/news/7"><span class="title">한화, 류현진 복귀 첫 등판</span></a>
            </div>"#;
        let doc = Document::parse(html).unwrap();
        let (out, tally) = extract_articles(&doc, &default_strategies(), &ctx());

        // once from the anchor walk, once from the container walk
        assert_eq!(out.len(), 2);
        assert_eq!(tally.candidates, 2);
        assert!(out.iter().all(|a| a.link.starts_with("https://")));
    }
}
