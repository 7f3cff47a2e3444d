use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

// "2025.01.27", "01.27(월)", "1.5"; weekday suffix is ignored
static KBO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:(\d{4})\.)?(\d{1,2})\.(\d{1,2})").unwrap());

// "LG vs KIA", "두산 VS 롯데", "삼성 대 한화"; the separator never sits inside a word
static TEAMS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([가-힣A-Za-z\s]+?)(?:\s+(?:vs|VS|대)\s+|\b(?:vs|VS)\b)([가-힣A-Za-z\s]+)").unwrap()
});

// ── URLs ──────────────────────────────────────────────────────────────────────

/// Make an extracted href/src absolute against the site origin.
/// "//img.x/a.png" → "https://img.x/a.png" | "/p/1" → "{origin}/p/1"
pub fn absolutize_url(raw: &str, origin: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if raw.starts_with("//") {
        return format!("https:{}", raw);
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return raw.to_string();
    }

    let origin = origin.trim_end_matches('/');
    if raw.starts_with('/') {
        format!("{}{}", origin, raw)
    } else {
        format!("{}/{}", origin, raw)
    }
}

/// True when `link` parses as an absolute http(s) URL.
pub fn is_absolute_http(link: &str) -> bool {
    url::Url::parse(link)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

// ── Text ──────────────────────────────────────────────────────────────────────

/// Cap `text` at `max_len` characters (not bytes).
pub fn truncate(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

// ── Dates ─────────────────────────────────────────────────────────────────────

/// Parse a KBO-style date; month/day-only text lands in the current year.
pub fn parse_kbo_date(text: &str) -> Option<NaiveDate> {
    parse_kbo_date_in_year(text, Local::now().year())
}

/// Same as [`parse_kbo_date`] with an explicit fallback year.
/// Impossible dates ("13.40", "02.30") yield `None`.
pub fn parse_kbo_date_in_year(text: &str, default_year: i32) -> Option<NaiveDate> {
    let caps = KBO_DATE.captures(text)?;
    let year = match caps.get(1) {
        Some(y) => y.as_str().parse().ok()?,
        None => default_year,
    };
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

// ── Teams ─────────────────────────────────────────────────────────────────────

/// Split "<home> vs <away>" into trimmed names; ("", "") when no separator.
pub fn split_teams(text: &str) -> (String, String) {
    match TEAMS.captures(text) {
        Some(caps) => {
            let home = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            let away = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
            (home.to_string(), away.to_string())
        }
        None => (String::new(), String::new()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
