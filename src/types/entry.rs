//! Reading log entry as persisted in storage

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Highest star rating an entry can carry
pub const MAX_RATING: u8 = 5;

/// Title shown for entries saved without one
pub const UNTITLED: &str = "Untitled";

/// One recorded blog read.
///
/// Decoding is lenient: stored records written by older versions (or by
/// hand) may lack fields, carry nulls, or hold out-of-range ratings. Missing
/// strings become empty, bad ratings become 0, and fields this type does not
/// know about are kept in `extra` so a re-save writes them back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Entry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub author: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub website: String,
    /// 0 = unrated, otherwise 1..=5
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: u8,
    /// ISO-8601 instant, kept verbatim; see [`Entry::timestamp`]
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    /// Build a candidate entry stamped with `now`.
    pub fn capture(
        url: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        website: impl Into<String>,
        rating: u8,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            author: author.into(),
            website: website.into(),
            rating: rating.min(MAX_RATING),
            date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            extra: Map::new(),
        }
    }

    /// Parsed `date`, or `None` when the stored string is not RFC 3339.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.date.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Calendar day of `date` in the given timezone.
    /// Ensures day grouping matches the viewer's calendar, not UTC.
    pub fn local_date<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDate> {
        self.timestamp()
            .map(|ts| ts.with_timezone(tz).date_naive())
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }

    /// Rating as filled/empty stars, e.g. `★★★☆☆`
    pub fn stars(&self) -> String {
        let filled = self.rating.min(MAX_RATING) as usize;
        format!(
            "{}{}",
            "★".repeat(filled),
            "☆".repeat(MAX_RATING as usize - filled)
        )
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_rating<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(match raw {
        Some(r) if r.is_finite() && r > 0.0 => r.trunc().min(MAX_RATING as f64) as u8,
        _ => 0,
    })
}
