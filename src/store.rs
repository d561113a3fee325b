use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::Movie;
use crate::error::StoreError;

/// Calendar date used as the store key, written as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The key `days` after this one.
    pub fn plus_days(&self, days: u64) -> Option<Self> {
        self.0.checked_add_days(Days::new(days)).map(Self)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map(Self)
    }
}

impl TryFrom<String> for DateKey {
    type Error = chrono::ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

/// Movies per ingested date.
///
/// An absent key means the date was never ingested; an empty list means it
/// was ingested (or failed) and has no showings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleStore {
    days: BTreeMap<DateKey, Vec<Movie>>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: DateKey, movies: Vec<Movie>) {
        self.days.insert(date, movies);
    }

    pub fn get(&self, date: &DateKey) -> Option<&[Movie]> {
        self.days.get(date).map(Vec::as_slice)
    }

    pub fn contains(&self, date: &DateKey) -> bool {
        self.days.contains_key(date)
    }

    /// Stored dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = &DateKey> {
        self.days.keys()
    }

    pub fn first_date(&self) -> Option<DateKey> {
        self.days.keys().next().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateKey, &[Movie])> {
        self.days.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Write the whole store to `path` in one step: the document goes to a
    /// temporary file next to `path` which is then renamed over it.
    pub fn persist(&self, path: &Path) -> Result<(), StoreError> {
        let json = self.to_json()?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;
        debug!(path = %path.display(), dates = self.len(), "store written");
        Ok(())
    }
}
