use crate::errors::ScrapeError;
use crate::models::{
    Article, Game, NewsDiagnostics, NewsEnvelope, ScheduleDiagnostics, ScheduleEnvelope,
};
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::info;

const NO_ARTICLES: &str = "no articles found; the page structure may have changed";
const NO_GAMES: &str = "no games found; the schedule page structure may have changed";

// ── Dedup ─────────────────────────────────────────────────────────────────────

/// Keep the first article per title prefix (first `key_len` chars of the
/// trimmed title), then cap at `limit`. Order of first sight is preserved.
pub fn dedup_articles(articles: Vec<Article>, key_len: usize, limit: usize) -> Vec<Article> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|a| seen.insert(a.title.trim().chars().take(key_len).collect::<String>()))
        .take(limit)
        .collect()
}

/// One game per date, start time and pairing, so doubleheaders stay two games.
/// Rows without teams fall back to their raw match text.
pub fn dedup_games(games: Vec<Game>) -> Vec<Game> {
    let mut seen = HashSet::new();
    games
        .into_iter()
        .filter(|g| {
            let pairing = if g.home.is_empty() && g.away.is_empty() {
                g.match_text.clone()
            } else {
                format!("{}|{}", g.home, g.away)
            };
            seen.insert((g.date, g.time_text.clone(), pairing))
        })
        .collect()
}

// ── Envelopes ─────────────────────────────────────────────────────────────────

pub fn news_envelope(
    articles: Vec<Article>,
    today: NaiveDate,
    diagnostics: NewsDiagnostics,
) -> NewsEnvelope {
    let empty = articles.is_empty();
    info!("News envelope: {} articles", articles.len());
    NewsEnvelope {
        success: !empty,
        count: articles.len(),
        articles,
        date: today.format("%Y-%m-%d").to_string(),
        debug: empty.then_some(diagnostics),
        error: empty.then(|| NO_ARTICLES.to_string()),
    }
}

pub fn news_failure(err: &ScrapeError, site: &str, today: NaiveDate) -> NewsEnvelope {
    NewsEnvelope {
        success: false,
        articles: Vec::new(),
        count: 0,
        date: today.format("%Y-%m-%d").to_string(),
        debug: None,
        error: Some(error_message(err, site)),
    }
}

pub fn schedule_envelope(games: Vec<Game>, diagnostics: ScheduleDiagnostics) -> ScheduleEnvelope {
    let empty = games.is_empty();
    info!("Schedule envelope: {} games", games.len());
    ScheduleEnvelope {
        success: !empty,
        count: games.len(),
        games,
        debug: empty.then_some(diagnostics),
        error: empty.then(|| NO_GAMES.to_string()),
    }
}

pub fn schedule_failure(err: &ScrapeError, site: &str) -> ScheduleEnvelope {
    ScheduleEnvelope {
        success: false,
        games: Vec::new(),
        count: 0,
        debug: None,
        error: Some(error_message(err, site)),
    }
}

fn error_message(err: &ScrapeError, site: &str) -> String {
    match err {
        ScrapeError::Transport(e) => format!("failed to reach {}: {}", site, e),
        ScrapeError::Parse(cause) => format!("scraping error: {}", cause),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransportError;

    fn article(title: &str, n: u32) -> Article {
        Article {
            title: title.into(),
            link: format!("https://m.sports.naver.com/kbaseball/news/{}", n),
            image: String::new(),
            published_text: String::new(),
            source: "네이버 스포츠".into(),
        }
    }

    fn game(day: u32, home: &str, away: &str, match_text: &str) -> Game {
        Game {
            date: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
            date_text: format!("04.{:02}", day),
            time_text: "18:30".into(),
            match_text: match_text.into(),
            stadium: String::new(),
            home: home.into(),
            away: away.into(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 27).unwrap()
    }

    #[test]
    fn test_dedup_by_title_prefix_keeps_first_seen() {
        let long = "가".repeat(80);
        let input = vec![
            article(&format!("{}A", long), 1),
            article("  LG 트윈스 우승  ", 2),
            article(&format!("{}B", long), 3),
            article("LG 트윈스 우승", 4),
        ];
        let out = dedup_articles(input, 80, 10);
        let links: Vec<_> = out.iter().map(|a| a.link.rsplit('/').next().unwrap()).collect();
        assert_eq!(links, vec!["1", "2"]);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let input = vec![
            article("두산 베어스 전지훈련", 1),
            article("두산 베어스 전지훈련", 2),
            article("SSG 랜더스 신인 계약", 3),
        ];
        let once = dedup_articles(input, 80, 10);
        let twice = dedup_articles(once.clone(), 80, 10);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn test_limit_applies_after_dedup() {
        let input: Vec<_> = (0..12).map(|i| article(&format!("기사 제목 {}", i), i)).collect();
        assert_eq!(dedup_articles(input.clone(), 80, 10).len(), 10);
        assert_eq!(dedup_articles(input, 80, 5).len(), 5);
    }

    #[test]
    fn test_dedup_games_by_date_and_teams() {
        let input = vec![
            game(1, "LG", "KIA", "LG vs KIA"),
            game(1, "LG", "KIA", "LG VS KIA"),
            game(2, "LG", "KIA", "LG vs KIA"),
            game(1, "", "", "우천 취소"),
            game(1, "", "", "미정"),
        ];
        assert_eq!(dedup_games(input).len(), 4);
    }

    #[test]
    fn test_doubleheader_survives_dedup() {
        let first = Game { time_text: "14:00".into(), ..game(5, "LG", "두산", "LG vs 두산") };
        let second = Game { time_text: "18:30".into(), ..game(5, "LG", "두산", "LG vs 두산") };
        let out = dedup_games(vec![first.clone(), second.clone(), first.clone()]);
        assert_eq!(out, vec![first, second]);
    }

    #[test]
    fn test_debug_only_when_empty() {
        let diag = NewsDiagnostics { html_length: 10, ..Default::default() };

        let full = news_envelope(vec![article("한화 이글스 개막전", 1)], today(), diag.clone());
        assert!(full.success);
        assert_eq!(full.count, 1);
        assert!(full.debug.is_none());
        assert!(full.error.is_none());
        assert_eq!(full.date, "2025-01-27");

        let empty = news_envelope(Vec::new(), today(), diag);
        assert!(!empty.success);
        assert_eq!(empty.count, 0);
        assert_eq!(empty.debug.unwrap().html_length, 10);
        assert!(empty.error.unwrap().contains("structure may have changed"));
    }

    #[test]
    fn test_schedule_envelope_counts() {
        let env = schedule_envelope(vec![game(3, "KT", "NC", "KT vs NC")], ScheduleDiagnostics::default());
        assert!(env.success);
        assert_eq!(env.count, env.games.len());
        assert!(env.debug.is_none());
    }

    #[test]
    fn test_failure_messages() {
        let err = ScrapeError::Transport(TransportError::Status(503));
        let env = news_failure(&err, "m.sports.naver.com", today());
        assert!(!env.success);
        assert_eq!(env.error.as_deref(), Some("failed to reach m.sports.naver.com: HTTP 503"));

        let err = ScrapeError::Parse("empty document".into());
        let env = schedule_failure(&err, "www.koreabaseball.com");
        assert_eq!(env.count, 0);
        assert_eq!(env.error.as_deref(), Some("scraping error: empty document"));
    }
}
