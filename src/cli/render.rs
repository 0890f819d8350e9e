//! Plain-text rendering of stats page views

use std::fmt::Write;

use chrono::TimeZone;

use crate::types::{ActivityCalendar, DayBucket, Entry, GroupAggregate, GroupField, Summary};

pub const EMPTY_LOG: &str = "No blog entries yet. Start tracking your reading!";
pub const NO_MATCHES: &str = "No matching entries found.";
pub const EMPTY_DAY: &str = "No blogs";

const DAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const LABEL_WIDTH: usize = 4; // "Mon "

pub fn render_summary(summary: &Summary) -> String {
    format!(
        "Total blogs:      {}\nUnique authors:   {}\nUnique websites:  {}\nAverage rating:   {:.1}\n",
        summary.total_count,
        summary.unique_author_count,
        summary.unique_website_count,
        summary.average_rating
    )
}

/// Seven weekday rows, one column per week, oldest week on the left.
pub fn render_calendar(calendar: &ActivityCalendar) -> String {
    let lead = calendar.leading_blank_days as usize;
    let weeks = (lead + calendar.buckets.len()).div_ceil(7);
    let mut grid = vec![vec![' '; weeks]; 7];

    for (index, bucket) in calendar.buckets.iter().enumerate() {
        let slot = lead + index;
        grid[slot % 7][slot / 7] = bucket.intensity.to_char();
    }

    let mut out = String::new();
    for (label, row) in DAY_LABELS.iter().zip(&grid) {
        let cells: String = row.iter().collect();
        let _ = writeln!(out, "{:<width$}{}", label, cells.trim_end(), width = LABEL_WIDTH);
    }
    let _ = writeln!(out, "{:<width$}Less · ░ ▒ ▓ █ More", "", width = LABEL_WIDTH);
    out
}

/// Detail for one calendar cell: date header, then what was read.
pub fn render_day(bucket: &DayBucket) -> String {
    let mut out = format!("{}\n", bucket.date.format("%Y-%m-%d"));
    if bucket.entries.is_empty() {
        let _ = writeln!(out, "  {}", EMPTY_DAY);
        return out;
    }
    for entry in &bucket.entries {
        let _ = write!(out, "  - {}", entry.display_title());
        if !entry.author.is_empty() {
            let _ = write!(out, " — {}", entry.author);
        }
        if entry.rating > 0 {
            let _ = write!(out, " {}", entry.stars());
        }
        let _ = writeln!(out, " <{}>", entry.url);
    }
    out
}

/// Entry cards: title and stars, byline, read date in `tz`.
pub fn render_entry_list<Tz: TimeZone>(entries: &[Entry], tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if entries.is_empty() {
        return format!("{}\n", NO_MATCHES);
    }

    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{}  {}", entry.display_title(), entry.stars());
        let _ = writeln!(out, "  {}", entry.url);
        let byline = byline(entry);
        if !byline.is_empty() {
            let _ = writeln!(out, "  {}", byline);
        }
        if let Some(ts) = entry.timestamp() {
            let _ = writeln!(out, "  {}", ts.with_timezone(tz).format("%b %-d, %Y"));
        }
        out.push('\n');
    }
    out
}

/// Drawer listing: `NAME (COUNT) STARS` then members.
pub fn render_groups(field: GroupField, groups: &[GroupAggregate]) -> String {
    let mut out = format!("{}\n", field.title());
    for group in groups {
        let _ = write!(out, "\n{} ({})", group.name, group.count);
        if group.average_rating > 0.0 {
            let _ = write!(out, " {}", group.stars());
        }
        out.push('\n');
        for entry in &group.entries {
            let _ = write!(out, "  - {}", entry.display_title());
            if entry.rating > 0 {
                let _ = write!(out, " {}", entry.stars());
            }
            out.push('\n');
        }
    }
    out
}

fn byline(entry: &Entry) -> String {
    match (entry.author.is_empty(), entry.website.is_empty()) {
        (false, false) => format!("by {} on {}", entry.author, entry.website),
        (false, true) => format!("by {}", entry.author),
        (true, false) => format!("on {}", entry.website),
        (true, true) => String::new(),
    }
}
