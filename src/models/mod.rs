use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

// ── Article ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub image: String,           // empty when the item has no picture
    #[serde(rename = "date")]
    pub published_text: String,  // "3시간 전", "2025.01.27." …
    pub source: String,
}

// ── Game ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub date: NaiveDate,
    pub date_text: String,
    pub time_text: String,
    pub match_text: String,
    pub stadium: String,
    pub home: String,
    pub away: String,
}

/// Wire shape keeps the legacy duplicated `time`/`timeText`, `play`/`playText` keys.
impl Serialize for Game {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Game", 9)?;
        s.serialize_field("date", &self.date)?;
        s.serialize_field("dateText", &self.date_text)?;
        s.serialize_field("time", &self.time_text)?;
        s.serialize_field("timeText", &self.time_text)?;
        s.serialize_field("play", &self.match_text)?;
        s.serialize_field("playText", &self.match_text)?;
        s.serialize_field("stadium", &self.stadium)?;
        s.serialize_field("home", &self.home)?;
        s.serialize_field("away", &self.away)?;
        s.end()
    }
}

// ── Diagnostics ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct NewsDiagnostics {
    pub html_length: usize,
    pub total_links_found: usize,
    pub articles_found: usize,
    pub unique_articles: usize,
    pub skipped: usize,
    pub renderer_used: bool,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ScheduleDiagnostics {
    pub html_length: usize,
    pub found_table: bool,
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
    pub rows_found: usize,
    pub parsing_attempts: usize,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_row_cells: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_row_text: Option<String>,
    // Only filled when no container was located at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_sample: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tables_found: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_table_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_table_class: Option<Vec<String>>,
}

// ── Envelopes ─────────────────────────────────────────────────────────────────

/// JSON body of the news endpoints. `success` is exactly `!articles.is_empty()`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewsEnvelope {
    pub success: bool,
    pub articles: Vec<Article>,
    pub count: usize,
    pub date: String,
    pub debug: Option<NewsDiagnostics>,
    pub error: Option<String>,
}

/// JSON body of the schedule endpoint. `success` is exactly `!games.is_empty()`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScheduleEnvelope {
    pub success: bool,
    pub games: Vec<Game>,
    pub count: usize,
    pub debug: Option<ScheduleDiagnostics>,
    pub error: Option<String>,
}
