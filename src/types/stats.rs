//! Derived statistics types. Recomputed on every call, never persisted.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use super::{Entry, ReadlogError, MAX_RATING};

/// Headline numbers for the stats page
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct Summary {
    pub total_count: usize,
    pub unique_author_count: usize,
    pub unique_website_count: usize,
    /// Precise mean of positive ratings; 0 when nothing is rated
    pub average_rating: f64,
}

/// Heatmap intensity tier, scaled against the busiest day in the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum Intensity {
    /// No entries that day
    None,
    Low,
    Medium,
    High,
    /// Busiest tier
    Max,
}

impl Intensity {
    /// `ceil(count * 4 / max_count)` clamped to 0..=4.
    /// A zero count is always `None`; `max_count` is treated as at least 1.
    pub fn from_count(count: usize, max_count: usize) -> Self {
        if count == 0 {
            return Self::None;
        }
        let max_count = max_count.max(1);
        let level = (count * 4).div_ceil(max_count).min(4);
        match level {
            0 | 1 => Self::Low,
            2 => Self::Medium,
            3 => Self::High,
            _ => Self::Max,
        }
    }

    pub fn level(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Max => 4,
        }
    }

    /// Shade character for text rendering
    pub fn to_char(self) -> char {
        match self {
            Self::None => '·',
            Self::Low => '░',
            Self::Medium => '▒',
            Self::High => '▓',
            Self::Max => '█',
        }
    }
}

impl From<Intensity> for u8 {
    fn from(intensity: Intensity) -> Self {
        intensity.level()
    }
}

/// One calendar cell
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub count: usize,
    #[serde(rename = "level")]
    pub intensity: Intensity,
    /// Entries read that day, in stored order
    pub entries: Vec<Entry>,
}

/// Dense 366-day activity window ending today
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActivityCalendar {
    /// Oldest day first
    pub buckets: Vec<DayBucket>,
    /// Busiest day's count, floored at 1
    pub max_count: usize,
    /// Weekday of the first bucket (0 = Sunday); blank cells before it in a
    /// 7-column grid
    pub leading_blank_days: u32,
}

/// Field an entry collection can be rolled up by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupField {
    Author,
    Website,
}

impl GroupField {
    pub fn value(self, entry: &Entry) -> &str {
        match self {
            Self::Author => &entry.author,
            Self::Website => &entry.website,
        }
    }

    /// Heading for the group drawer
    pub fn title(self) -> &'static str {
        match self {
            Self::Author => "Authors",
            Self::Website => "Websites",
        }
    }
}

/// Filled, half and empty star counts for an average rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StarRating {
    pub full: u8,
    pub half: u8,
    pub empty: u8,
}

impl StarRating {
    /// Half-star rounding: the fractional part earns a half star when it
    /// lies in `[0.25, 0.75)`. Below 0.25 it is dropped; from 0.75 up it
    /// rounds to the next full star.
    pub fn from_average(average: f64) -> Self {
        let average = if average.is_finite() {
            average.clamp(0.0, MAX_RATING as f64)
        } else {
            0.0
        };
        let floor = average.floor();
        let fraction = average - floor;
        let half = u8::from((0.25..0.75).contains(&fraction));
        let full = (if fraction >= 0.75 { floor + 1.0 } else { floor }) as u8;
        Self {
            full,
            half,
            empty: MAX_RATING - full - half,
        }
    }
}

impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            "★".repeat(self.full as usize),
            "⯨".repeat(self.half as usize),
            "☆".repeat(self.empty as usize)
        )
    }
}

/// Rollup for one author or website
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupAggregate {
    /// Trimmed value as typed (case preserved)
    pub name: String,
    pub count: usize,
    /// Mean over all member entries, unrated ones counted as 0
    pub average_rating: f64,
    /// Members sorted by rating descending, stable on ties
    pub entries: Vec<Entry>,
}

impl GroupAggregate {
    pub fn stars(&self) -> StarRating {
        StarRating::from_average(self.average_rating)
    }
}

/// Display order for the entry list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    DateDesc,
    DateAsc,
    RatingDesc,
    RatingAsc,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DateDesc => "date-desc",
            Self::DateAsc => "date-asc",
            Self::RatingDesc => "rating-desc",
            Self::RatingAsc => "rating-asc",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ReadlogError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "date-desc" => Ok(Self::DateDesc),
            "date-asc" => Ok(Self::DateAsc),
            "rating-desc" => Ok(Self::RatingDesc),
            "rating-asc" => Ok(Self::RatingAsc),
            other => Err(ReadlogError::Validation(format!(
                "unknown sort key '{}' (expected date-desc, date-asc, rating-desc or rating-asc)",
                other
            ))),
        }
    }
}
