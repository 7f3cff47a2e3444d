//! Schedule extraction.
//!
//! A container is located by an ordered list of [`ContainerLocator`]s (first
//! hit wins), then every row below it becomes a candidate game. Tables are
//! read by column position, anything else by class-named fields.

use crate::errors::SkipReason;
use crate::models::Game;
use crate::scraper::cleaner::{split_teams, truncate};
use crate::scraper::dom::{self, ClassPattern, Document};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::ElementRef;
use tracing::{debug, info};

/// Selectors a rendered page should show once the schedule is in place.
pub const WAIT_SELECTORS: &[&str] = &[
    "table",
    ".schedule",
    r#"[class*="schedule"]"#,
    r#"[id*="schedule"]"#,
];

const SCHEDULE_TABLE_ID: &str = "scheduleTable";

static SCHEDULE: Lazy<ClassPattern> = Lazy::new(|| ClassPattern::new("schedule").unwrap());
static SCHEDULE_LIST: Lazy<ClassPattern> =
    Lazy::new(|| ClassPattern::new("schedule|game|match").unwrap());
static ROW: Lazy<ClassPattern> = Lazy::new(|| ClassPattern::new("game|match|schedule").unwrap());

static FIELD_DATE: Lazy<ClassPattern> = Lazy::new(|| ClassPattern::new("date").unwrap());
static FIELD_TIME: Lazy<ClassPattern> = Lazy::new(|| ClassPattern::new("time").unwrap());
static FIELD_MATCH: Lazy<ClassPattern> = Lazy::new(|| ClassPattern::new("game|match|vs").unwrap());
static FIELD_STADIUM: Lazy<ClassPattern> =
    Lazy::new(|| ClassPattern::new("stadium|venue").unwrap());

// ── Container locators ────────────────────────────────────────────────────────

pub trait ContainerLocator: Send + Sync {
    fn name(&self) -> &'static str;

    fn locate<'a>(&self, doc: &'a Document) -> Option<ElementRef<'a>>;
}

enum Criterion {
    ExactId(&'static str),
    Class(&'static Lazy<ClassPattern>),
    IdPattern(&'static Lazy<ClassPattern>),
    Any,
}

/// "First `tag` satisfying `criterion`".
pub struct TagLocator {
    name: &'static str,
    tag: &'static str,
    criterion: Criterion,
}

impl ContainerLocator for TagLocator {
    fn name(&self) -> &'static str {
        self.name
    }

    fn locate<'a>(&self, doc: &'a Document) -> Option<ElementRef<'a>> {
        let tags = [self.tag];
        match self.criterion {
            Criterion::ExactId(id) => doc
                .elements()
                .find(|el| el.value().name() == self.tag && el.value().id() == Some(id)),
            Criterion::Class(pattern) => doc.find_first(&tags, pattern),
            Criterion::IdPattern(pattern) => doc.find_first_by_id(&tags, pattern),
            Criterion::Any => doc.find_all(self.tag, false).into_iter().next(),
        }
    }
}

/// Tried in this order; appending a locator is how a new site layout is supported.
pub fn default_locators() -> Vec<Box<dyn ContainerLocator>> {
    let locator = |name, tag, criterion| -> Box<dyn ContainerLocator> {
        Box::new(TagLocator { name, tag, criterion })
    };
    vec![
        locator("table#scheduleTable", "table", Criterion::ExactId(SCHEDULE_TABLE_ID)),
        locator("table.schedule", "table", Criterion::Class(&SCHEDULE)),
        locator("div.schedule", "div", Criterion::Class(&SCHEDULE)),
        locator("div#schedule", "div", Criterion::IdPattern(&SCHEDULE)),
        locator("first table", "table", Criterion::Any),
        locator("first tbody", "tbody", Criterion::Any),
        locator("ul.schedule", "ul", Criterion::Class(&SCHEDULE_LIST)),
    ]
}

// ── Extraction ────────────────────────────────────────────────────────────────

/// Which container won, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub locator: &'static str,
    pub tag: String,
}

/// Everything the assembler needs: games plus the counters behind them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleExtraction {
    pub games: Vec<Game>,
    pub container: Option<ContainerInfo>,
    pub rows_found: usize,
    pub parsing_attempts: usize,
    pub skipped: usize,
    pub first_row_cells: Option<usize>,
    pub first_row_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RawRow {
    date_text: String,
    time_text: String,
    match_text: String,
    stadium: String,
}

/// `parse_date` turns a row's date text into a calendar date; `None` drops the row.
pub fn extract_games(
    doc: &Document,
    locators: &[Box<dyn ContainerLocator>],
    parse_date: impl Fn(&str) -> Option<NaiveDate>,
) -> ScheduleExtraction {
    let mut out = ScheduleExtraction::default();

    let Some((locator, container)) = locators
        .iter()
        .find_map(|l| l.locate(doc).map(|el| (l.name(), el)))
    else {
        info!("No schedule container found");
        return out;
    };

    let tag = container.value().name().to_string();
    info!("Schedule container: {} (<{}>)", locator, tag);

    let rows: Vec<Result<RawRow, SkipReason>> = match tag.as_str() {
        // html5ever always nests tbody in a table, so a tbody hit is read the same way
        "table" | "tbody" => {
            let trs = dom::find_all_in(container, &["tr"], None);
            out.rows_found = trs.len();
            if let Some(first) = trs.get(1) {
                out.first_row_cells = Some(dom::find_all_in(*first, &["td", "th"], None).len());
                out.first_row_text = Some(truncate(&dom::text_of(*first), 100));
            }
            // first row is the header
            trs.into_iter().skip(1).map(table_row).collect()
        }
        _ => {
            let items = dom::find_all_in(container, &["div", "li"], Some(&*ROW));
            out.rows_found = items.len();
            items.into_iter().map(classed_row).map(Ok).collect()
        }
    };

    out.container = Some(ContainerInfo { locator, tag });
    out.parsing_attempts = rows.len();

    for row in rows {
        match row.and_then(|r| game_from_row(r, &parse_date)) {
            Ok(game) => out.games.push(game),
            Err(reason) => {
                debug!("schedule row skipped ({})", reason);
                out.skipped += 1;
            }
        }
    }

    info!("{} games from {} rows ({} skipped)", out.games.len(), out.parsing_attempts, out.skipped);
    out
}

/// Column 0 date, 1 time, 2 match, last (when ≥4 cells) stadium.
fn table_row(tr: ElementRef<'_>) -> Result<RawRow, SkipReason> {
    let cells: Vec<String> = dom::find_all_in(tr, &["td", "th"], None)
        .into_iter()
        .map(dom::text_of)
        .collect();
    if cells.len() < 2 {
        return Err(SkipReason::TooFewCells);
    }

    Ok(RawRow {
        date_text: cells[0].clone(),
        time_text: cells[1].clone(),
        match_text: cells.get(2).cloned().unwrap_or_default(),
        stadium: if cells.len() > 3 {
            cells.last().cloned().unwrap_or_default()
        } else {
            String::new()
        },
    })
}

fn classed_row(row: ElementRef<'_>) -> RawRow {
    let field = |pattern: &ClassPattern| {
        dom::find_in(row, &[], Some(pattern))
            .map(dom::text_of)
            .unwrap_or_default()
    };

    RawRow {
        date_text: field(&*FIELD_DATE),
        time_text: field(&*FIELD_TIME),
        match_text: field(&*FIELD_MATCH),
        stadium: field(&*FIELD_STADIUM),
    }
}

/// The date is the only hard gate; missing teams still yield a game.
fn game_from_row(
    raw: RawRow,
    parse_date: impl Fn(&str) -> Option<NaiveDate>,
) -> Result<Game, SkipReason> {
    if raw.date_text.is_empty() {
        return Err(SkipReason::MissingDate);
    }
    let date = parse_date(&raw.date_text).ok_or(SkipReason::InvalidDate)?;
    let (home, away) = split_teams(&raw.match_text);

    Ok(Game {
        date,
        date_text: raw.date_text,
        time_text: raw.time_text,
        match_text: raw.match_text,
        stadium: raw.stadium,
        home,
        away,
    })
}
