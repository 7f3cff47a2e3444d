//! Parsed page plus the handful of query primitives every strategy uses.
//!
//! Class patterns follow the usual soup semantics: a pattern matches an
//! element when it is found (case-insensitively, anywhere) in any single
//! token of the element's `class` attribute.

use crate::errors::{ScrapeError, ScrapeResult};
use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html};

// ── Class patterns ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ClassPattern(Regex);

impl ClassPattern {
    /// `alternatives` is a `|`-separated list, e.g. `"title|headline"`.
    pub fn new(alternatives: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(alternatives)
            .case_insensitive(true)
            .build()
            .map(Self)
    }

    pub fn matches_class(&self, el: &ElementRef<'_>) -> bool {
        el.value().classes().any(|c| self.0.is_match(c))
    }

    pub fn matches_id(&self, el: &ElementRef<'_>) -> bool {
        el.value().id().is_some_and(|id| self.0.is_match(id))
    }
}

// ── Document ──────────────────────────────────────────────────────────────────

/// One parsed page. Lives only for the extraction phase of a single scrape.
pub struct Document {
    html: Html,
    html_length: usize,
}

impl Document {
    /// Best-effort parse; only empty or tag-less input is rejected.
    pub fn parse(markup: &str) -> ScrapeResult<Self> {
        if markup.trim().is_empty() {
            return Err(ScrapeError::Parse("empty document".into()));
        }
        if !markup.contains('<') {
            return Err(ScrapeError::Parse("no markup found in response".into()));
        }

        Ok(Self {
            html: Html::parse_document(markup),
            html_length: markup.chars().count(),
        })
    }

    /// Length of the raw markup in characters.
    pub fn html_length(&self) -> usize {
        self.html_length
    }

    /// Every element in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html.tree.root().descendants().filter_map(ElementRef::wrap)
    }

    /// All `tag` elements; with `href_required`, only those carrying an href.
    pub fn find_all(&self, tag: &str, href_required: bool) -> Vec<ElementRef<'_>> {
        self.elements()
            .filter(|el| el.value().name().eq_ignore_ascii_case(tag))
            .filter(|el| !href_required || el.value().attr("href").is_some())
            .collect()
    }

    /// First element among `tags` (empty = any tag) whose class matches.
    pub fn find_first(&self, tags: &[&str], pattern: &ClassPattern) -> Option<ElementRef<'_>> {
        self.elements()
            .find(|el| tag_in(el, tags) && pattern.matches_class(el))
    }

    /// First element among `tags` whose id matches.
    pub fn find_first_by_id(&self, tags: &[&str], pattern: &ClassPattern) -> Option<ElementRef<'_>> {
        self.elements().find(|el| tag_in(el, tags) && pattern.matches_id(el))
    }

    pub fn find_all_by_class_pattern(
        &self,
        tags: &[&str],
        pattern: &ClassPattern,
    ) -> Vec<ElementRef<'_>> {
        self.elements()
            .filter(|el| tag_in(el, tags) && pattern.matches_class(el))
            .collect()
    }
}

// ── Scoped queries ────────────────────────────────────────────────────────────

fn tag_in(el: &ElementRef<'_>, tags: &[&str]) -> bool {
    tags.is_empty() || tags.iter().any(|t| el.value().name().eq_ignore_ascii_case(t))
}

/// Elements strictly below `scope`, in document order.
pub fn descendants<'a>(scope: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    scope.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// First descendant among `tags` (empty = any), optionally class-filtered.
pub fn find_in<'a>(
    scope: ElementRef<'a>,
    tags: &[&str],
    pattern: Option<&ClassPattern>,
) -> Option<ElementRef<'a>> {
    descendants(scope).find(|el| tag_in(el, tags) && pattern.is_none_or(|p| p.matches_class(el)))
}

pub fn find_all_in<'a>(
    scope: ElementRef<'a>,
    tags: &[&str],
    pattern: Option<&ClassPattern>,
) -> Vec<ElementRef<'a>> {
    descendants(scope)
        .filter(|el| tag_in(el, tags) && pattern.is_none_or(|p| p.matches_class(el)))
        .collect()
}

/// First descendant anchor carrying an href.
pub fn find_anchor_in(scope: ElementRef<'_>) -> Option<ElementRef<'_>> {
    descendants(scope).find(|el| el.value().name() == "a" && el.value().attr("href").is_some())
}

/// Text of every node below `el`, each piece trimmed, empty pieces dropped.
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).filter(|t| !t.is_empty()).collect()
}

/// Attribute value, treating an empty/blank value as missing.
pub fn attr_non_empty<'a>(el: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name).map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(p: &str) -> ClassPattern {
        ClassPattern::new(p).unwrap()
    }

    #[test]
    fn test_parse_rejects_empty_and_plain_text() {
        assert!(matches!(Document::parse(""), Err(ScrapeError::Parse(_))));
        assert!(matches!(Document::parse("  \n "), Err(ScrapeError::Parse(_))));
        assert!(matches!(Document::parse("just words"), Err(ScrapeError::Parse(_))));
    }

    #[test]
    fn test_parse_tolerates_malformed_html() {
        let doc = Document::parse("<div class=news><a href='/x'>one</a><p>two<table><tr><td>3").unwrap();
        assert_eq!(doc.find_all("a", true).len(), 1);
        assert_eq!(doc.find_all("td", false).len(), 1);
    }

    #[test]
    fn test_html_length_counts_chars() {
        let doc = Document::parse("<p>야구</p>").unwrap();
        assert_eq!(doc.html_length(), 9);
    }

    #[test]
    fn test_find_all_href_required() {
        let doc = Document::parse("<a href='/a'>a</a><a name='x'>b</a><a href=''>c</a>").unwrap();
        assert_eq!(doc.find_all("a", false).len(), 3);
        assert_eq!(doc.find_all("a", true).len(), 2);
    }

    #[test]
    fn test_class_pattern_matches_any_token_case_insensitive() {
        let doc = Document::parse(
            r#"<ul><li class="foo NewsItem_wrap">x</li><li class="bar">y</li></ul>"#,
        )
        .unwrap();
        let found = doc.find_all_by_class_pattern(&[], &pattern("news_item|newsitem"));
        assert_eq!(found.len(), 1);
        assert_eq!(text_of(found[0]), "x");
    }

    #[test]
    fn test_find_first_respects_tags_and_order() {
        let doc = Document::parse(
            r#"<div class="schedule-box">d</div><table class="tbl-schedule"><tr><td>t</td></tr></table>"#,
        )
        .unwrap();
        let p = pattern("schedule");
        assert_eq!(doc.find_first(&["table"], &p).unwrap().value().name(), "table");
        assert_eq!(doc.find_first(&[], &p).unwrap().value().name(), "div");
    }

    #[test]
    fn test_find_first_by_id() {
        let doc = Document::parse(r#"<div id="gameSchedule">x</div>"#).unwrap();
        assert!(doc.find_first_by_id(&["div"], &pattern("schedule")).is_some());
        assert!(doc.find_first_by_id(&["table"], &pattern("schedule")).is_none());
    }

    #[test]
    fn test_scoped_queries_exclude_scope() {
        let doc = Document::parse(
            r#"<div class="title"><span class="title">inner</span></div>"#,
        )
        .unwrap();
        let outer = doc.find_first(&["div"], &pattern("title")).unwrap();
        let inner = find_in(outer, &[], Some(&pattern("title"))).unwrap();
        assert_eq!(inner.value().name(), "span");
    }

    #[test]
    fn test_text_of_strips_pieces() {
        let doc = Document::parse("<p>  LG  <b> vs </b>\n KIA </p>").unwrap();
        let p = doc.find_all("p", false)[0];
        assert_eq!(text_of(p), "LGvsKIA");
    }
}
