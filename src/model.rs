use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    #[default]
    Book,
    Blog,
    Article,
    Paper,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::Book, Kind::Blog, Kind::Article, Kind::Paper];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Book => "book",
            Kind::Blog => "blog",
            Kind::Article => "article",
            Kind::Paper => "paper",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn untitled() -> String {
    "Untitled".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingItem {
    #[serde(default = "untitled")]
    pub title: String,
    #[serde(default)]
    pub last_page: u64,
    #[serde(default)]
    pub kind: Kind,
}

impl ReadingItem {
    pub fn new(title: impl Into<String>, last_page: u64, kind: Kind) -> Self {
        Self {
            title: title.into(),
            last_page,
            kind,
        }
    }

    /// One line as shown in the reminder and the editor list.
    pub fn display_line(&self) -> String {
        format!("{}  —  page {}  ({})", self.title, self.last_page, self.kind)
    }
}

/// The whole persisted state. Saved wholesale after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub active: Vec<ReadingItem>,
    // Kept as the stored JSON value so an odd timestamp (wrong type or bad
    // text) never turns the whole file into a corruption reset; parsed on use.
    #[serde(default)]
    next_popup_not_before: Option<Value>,
}

impl Document {
    pub fn seeded() -> Self {
        Self {
            active: vec![
                ReadingItem::new("Preacher Man", 0, Kind::Book),
                ReadingItem::new("Farnam Street", 0, Kind::Blog),
                ReadingItem::new("Example Article: Notes on Learning", 0, Kind::Article),
            ],
            next_popup_not_before: None,
        }
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        let raw = self.next_popup_not_before.as_ref()?;
        let parsed = match raw {
            Value::String(text) => parse_utc_timestamp(text),
            _ => None,
        };
        if parsed.is_none() {
            log::warn!("Ignoring unparseable snooze timestamp: {}", raw);
        }
        parsed
    }

    pub fn raw_not_before(&self) -> Option<&Value> {
        self.next_popup_not_before.as_ref()
    }

    pub fn set_not_before(&mut self, at: Option<DateTime<Utc>>) {
        self.next_popup_not_before = at.map(|at| Value::String(format_utc_timestamp(at)));
    }

    /// Position of the first item whose title matches exactly.
    pub fn position_of(&self, title: &str) -> Option<usize> {
        self.active.iter().position(|item| item.title == title)
    }

    /// Records a page for `title`: updates the first exact match, or appends
    /// a new book when nothing matches. Returns the affected position.
    pub fn log_page(&mut self, title: &str, page: u64) -> usize {
        match self.position_of(title) {
            Some(idx) => {
                self.active[idx].last_page = page;
                idx
            }
            None => {
                self.active.push(ReadingItem::new(title, page, Kind::Book));
                self.active.len() - 1
            }
        }
    }
}

pub fn format_utc_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_utc_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let stripped = raw.strip_suffix('Z').unwrap_or(raw);
    if let Ok(dt) = DateTime::parse_from_rfc3339(stripped) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(stripped, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
