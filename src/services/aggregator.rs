//! Aggregator service for computing reading statistics

use crate::types::{
    ActivityCalendar, DayBucket, Entry, GroupAggregate, GroupField, Intensity, Summary,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use std::collections::{BTreeMap, HashSet};

/// Days before today covered by the activity calendar (window is this + 1)
pub const CALENDAR_LOOKBACK_DAYS: i64 = 365;

/// Aggregator for computing reading statistics.
///
/// Every method is a pure function of the snapshot it is given.
pub struct StatsAggregator;

/// Running totals for one author/website while grouping
#[derive(Default)]
struct GroupAccumulator<'a> {
    entries: Vec<&'a Entry>,
    rating_sum: u64,
}

impl StatsAggregator {
    /// Headline totals. Uniqueness is case-insensitive on trimmed values.
    pub fn summarize(entries: &[Entry]) -> Summary {
        if entries.is_empty() {
            return Summary::default();
        }

        let mut authors: HashSet<String> = HashSet::new();
        let mut websites: HashSet<String> = HashSet::new();
        let mut rating_sum: u64 = 0;
        let mut rated: u64 = 0;

        for entry in entries {
            if let Some(key) = identity_key(&entry.author) {
                authors.insert(key);
            }
            if let Some(key) = identity_key(&entry.website) {
                websites.insert(key);
            }
            if entry.rating > 0 {
                rating_sum += entry.rating as u64;
                rated += 1;
            }
        }

        Summary {
            total_count: entries.len(),
            unique_author_count: authors.len(),
            unique_website_count: websites.len(),
            average_rating: if rated == 0 {
                0.0
            } else {
                rating_sum as f64 / rated as f64
            },
        }
    }

    /// Dense calendar of the 366 days ending on `now`'s calendar day.
    ///
    /// Entries are placed on their day in `now`'s timezone. Entries outside
    /// the window, or without a parsable date, are left out.
    pub fn build_calendar<Tz: TimeZone>(entries: &[Entry], now: &DateTime<Tz>) -> ActivityCalendar {
        let tz = now.timezone();
        let today = now.date_naive();
        let start = today - Duration::days(CALENDAR_LOOKBACK_DAYS);

        let mut buckets: Vec<DayBucket> = (0..=CALENDAR_LOOKBACK_DAYS)
            .map(|offset| DayBucket {
                date: start + Duration::days(offset),
                count: 0,
                intensity: Intensity::None,
                entries: Vec::new(),
            })
            .collect();

        for entry in entries {
            let Some(index) = entry
                .local_date(&tz)
                .and_then(|date| window_index(start, today, date))
            else {
                continue;
            };
            let bucket = &mut buckets[index];
            bucket.count += 1;
            bucket.entries.push(entry.clone());
        }

        let max_count = buckets.iter().map(|b| b.count).max().unwrap_or(0).max(1);
        for bucket in &mut buckets {
            bucket.intensity = Intensity::from_count(bucket.count, max_count);
        }

        ActivityCalendar {
            buckets,
            max_count,
            leading_blank_days: start.weekday().num_days_from_sunday(),
        }
    }

    /// Roll entries up by author or website.
    ///
    /// Keys are trimmed but keep their case, so "Ann" and "ann" are separate
    /// rows here while `summarize` counts them as one author. Sorted by
    /// count descending, then name ascending.
    pub fn group_by(entries: &[Entry], field: GroupField) -> Vec<GroupAggregate> {
        let mut groups: BTreeMap<&str, GroupAccumulator<'_>> = BTreeMap::new();

        for entry in entries {
            let name = field.value(entry).trim();
            if name.is_empty() {
                continue;
            }
            let group = groups.entry(name).or_default();
            group.entries.push(entry);
            group.rating_sum += entry.rating as u64;
        }

        let mut result: Vec<GroupAggregate> = groups
            .into_iter()
            .map(|(name, group)| {
                let count = group.entries.len();
                let mut members: Vec<Entry> = group.entries.into_iter().cloned().collect();
                members.sort_by(|a, b| b.rating.cmp(&a.rating));
                GroupAggregate {
                    name: name.to_string(),
                    count,
                    average_rating: group.rating_sum as f64 / count as f64,
                    entries: members,
                }
            })
            .collect();

        result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        result
    }
}

/// Case-folded identity used for uniqueness counts; `None` when blank
fn identity_key(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn window_index(start: NaiveDate, end: NaiveDate, date: NaiveDate) -> Option<usize> {
    if date < start || date > end {
        return None;
    }
    usize::try_from((date - start).num_days()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn make_entry(url: &str, author: &str, website: &str, rating: u8, date: &str) -> Entry {
        Entry {
            url: url.to_string(),
            title: format!("Post {}", url),
            author: author.to_string(),
            website: website.to_string(),
            rating,
            date: date.to_string(),
            ..Default::default()
        }
    }

    fn rated(url: &str, rating: u8) -> Entry {
        make_entry(url, "", "", rating, "2024-06-01T12:00:00.000Z")
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 18, 0, 0).unwrap()
    }

    fn bucket_for(calendar: &ActivityCalendar, y: i32, m: u32, d: u32) -> &DayBucket {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        calendar.buckets.iter().find(|b| b.date == date).unwrap()
    }

    // ========== summarize() tests ==========

    #[test]
    fn test_summarize_empty() {
        let summary = StatsAggregator::summarize(&[]);
        assert_eq!(summary, Summary::default());
        assert_eq!(summary.average_rating, 0.0);
    }

    #[test]
    fn test_summarize_total_count() {
        let entries = vec![rated("a", 0), rated("b", 0), rated("c", 4)];
        assert_eq!(StatsAggregator::summarize(&entries).total_count, 3);
    }

    #[test]
    fn test_summarize_average_ignores_unrated() {
        let entries = vec![rated("a", 3), rated("b", 0), rated("c", 5)];
        let summary = StatsAggregator::summarize(&entries);
        assert!((summary.average_rating - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summarize_average_all_unrated_is_zero() {
        let entries = vec![rated("a", 0), rated("b", 0)];
        let summary = StatsAggregator::summarize(&entries);
        assert_eq!(summary.average_rating, 0.0);
        assert!(!summary.average_rating.is_nan());
    }

    #[test]
    fn test_summarize_unique_counts_case_insensitive() {
        let entries = vec![
            make_entry("a", "Ann", "a.dev", 0, ""),
            make_entry("b", " ann ", "A.DEV", 0, ""),
            make_entry("c", "Bob", "b.dev", 0, ""),
            make_entry("d", "   ", "", 0, ""),
        ];
        let summary = StatsAggregator::summarize(&entries);
        assert_eq!(summary.total_count, 4);
        assert_eq!(summary.unique_author_count, 2);
        assert_eq!(summary.unique_website_count, 2);
    }

    // ========== build_calendar() tests ==========

    #[test]
    fn test_calendar_always_366_buckets() {
        let empty = StatsAggregator::build_calendar(&[], &now());
        assert_eq!(empty.buckets.len(), 366);

        let entries = vec![
            make_entry("a", "", "", 1, "2024-06-15T08:00:00Z"),
            make_entry("b", "", "", 1, "2020-01-01T08:00:00Z"),
        ];
        let calendar = StatsAggregator::build_calendar(&entries, &now());
        assert_eq!(calendar.buckets.len(), 366);
    }

    #[test]
    fn test_calendar_window_bounds() {
        let calendar = StatsAggregator::build_calendar(&[], &now());
        assert_eq!(
            calendar.buckets.first().unwrap().date,
            NaiveDate::from_ymd_opt(2023, 6, 16).unwrap()
        );
        assert_eq!(
            calendar.buckets.last().unwrap().date,
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
        );
        // 2023-06-16 was a Friday
        assert_eq!(calendar.leading_blank_days, 5);
    }

    #[test]
    fn test_calendar_empty_floors_max_count() {
        let calendar = StatsAggregator::build_calendar(&[], &now());
        assert_eq!(calendar.max_count, 1);
        assert!(calendar
            .buckets
            .iter()
            .all(|b| b.count == 0 && b.intensity == Intensity::None));
    }

    #[test]
    fn test_calendar_counts_and_levels() {
        let entries = vec![
            make_entry("a", "", "", 1, "2024-06-14T08:00:00Z"),
            make_entry("b", "", "", 1, "2024-06-14T09:00:00Z"),
            make_entry("c", "", "", 1, "2024-06-14T10:00:00Z"),
            make_entry("d", "", "", 1, "2024-06-14T11:00:00Z"),
            make_entry("e", "", "", 1, "2024-06-10T11:00:00Z"),
        ];
        let calendar = StatsAggregator::build_calendar(&entries, &now());

        assert_eq!(calendar.max_count, 4);
        let busy = bucket_for(&calendar, 2024, 6, 14);
        assert_eq!(busy.count, 4);
        assert_eq!(busy.intensity, Intensity::Max);
        assert_eq!(busy.entries.len(), 4);
        assert_eq!(busy.entries[0].url, "a");

        let quiet = bucket_for(&calendar, 2024, 6, 10);
        assert_eq!(quiet.count, 1);
        assert_eq!(quiet.intensity, Intensity::Low);

        let none = bucket_for(&calendar, 2024, 6, 11);
        assert_eq!(none.count, 0);
        assert_eq!(none.intensity.level(), 0);
    }

    #[test]
    fn test_calendar_level_invariants() {
        let entries = vec![
            make_entry("a", "", "", 1, "2024-06-14T08:00:00Z"),
            make_entry("b", "", "", 1, "2024-06-14T09:00:00Z"),
            make_entry("c", "", "", 1, "2024-06-14T10:00:00Z"),
            make_entry("d", "", "", 1, "2024-05-01T10:00:00Z"),
        ];
        let calendar = StatsAggregator::build_calendar(&entries, &now());
        for bucket in &calendar.buckets {
            if bucket.count == 0 {
                assert_eq!(bucket.intensity.level(), 0);
            }
            if bucket.count == calendar.max_count {
                assert_eq!(bucket.intensity.level(), 4);
            }
        }
    }

    #[test]
    fn test_calendar_excludes_outside_window() {
        let entries = vec![
            // day before the window starts
            make_entry("old", "", "", 1, "2023-06-15T12:00:00Z"),
            // first day of the window
            make_entry("first", "", "", 1, "2023-06-16T00:00:00Z"),
            // tomorrow
            make_entry("future", "", "", 1, "2024-06-16T01:00:00Z"),
        ];
        let calendar = StatsAggregator::build_calendar(&entries, &now());
        let placed: usize = calendar.buckets.iter().map(|b| b.count).sum();
        assert_eq!(placed, 1);
        assert_eq!(calendar.buckets[0].entries[0].url, "first");
    }

    #[test]
    fn test_calendar_skips_unparsable_dates() {
        let entries = vec![
            make_entry("bad", "", "", 1, "not a date"),
            make_entry("missing", "", "", 1, ""),
            make_entry("ok", "", "", 1, "2024-06-15T01:00:00Z"),
        ];
        let calendar = StatsAggregator::build_calendar(&entries, &now());
        let placed: usize = calendar.buckets.iter().map(|b| b.count).sum();
        assert_eq!(placed, 1);
        // still counted in totals
        assert_eq!(StatsAggregator::summarize(&entries).total_count, 3);
    }

    #[test]
    fn test_calendar_uses_now_timezone() {
        // 23:30 UTC on the 14th is already the 15th in UTC+9
        let entries = vec![make_entry("a", "", "", 1, "2024-06-14T23:30:00Z")];
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let now_tokyo = tokyo.with_ymd_and_hms(2024, 6, 15, 20, 0, 0).unwrap();

        let calendar = StatsAggregator::build_calendar(&entries, &now_tokyo);
        assert_eq!(bucket_for(&calendar, 2024, 6, 15).count, 1);
        assert_eq!(bucket_for(&calendar, 2024, 6, 14).count, 0);
    }

    // ========== group_by() tests ==========

    #[test]
    fn test_group_by_empty() {
        assert!(StatsAggregator::group_by(&[], GroupField::Author).is_empty());
    }

    #[test]
    fn test_group_by_skips_blank_values() {
        let entries = vec![
            make_entry("a", "", "a.dev", 3, ""),
            make_entry("b", "  ", "a.dev", 3, ""),
            make_entry("c", "Ann", "", 3, ""),
        ];
        let authors = StatsAggregator::group_by(&entries, GroupField::Author);
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].name, "Ann");

        let websites = StatsAggregator::group_by(&entries, GroupField::Website);
        assert_eq!(websites.len(), 1);
        assert_eq!(websites[0].count, 2);
    }

    #[test]
    fn test_group_by_preserves_case_and_trims() {
        let entries = vec![
            make_entry("a", "Ann", "", 0, ""),
            make_entry("b", " Ann ", "", 0, ""),
            make_entry("c", "ann", "", 0, ""),
        ];
        let groups = StatsAggregator::group_by(&entries, GroupField::Author);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Ann");
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[1].name, "ann");
    }

    #[test]
    fn test_group_by_sorted_by_count_then_name() {
        let entries = vec![
            make_entry("1", "Zed", "", 0, ""),
            make_entry("2", "Bob", "", 0, ""),
            make_entry("3", "Amy", "", 0, ""),
            make_entry("4", "Zed", "", 0, ""),
            make_entry("5", "Bob", "", 0, ""),
            make_entry("6", "Cat", "", 0, ""),
        ];
        let groups = StatsAggregator::group_by(&entries, GroupField::Author);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Zed", "Amy", "Cat"]);

        for pair in groups.windows(2) {
            assert!(
                pair[0].count > pair[1].count
                    || (pair[0].count == pair[1].count && pair[0].name <= pair[1].name)
            );
        }
    }

    #[test]
    fn test_group_by_average_counts_unrated_as_zero() {
        let entries = vec![
            make_entry("a", "Ann", "", 4, ""),
            make_entry("b", "Ann", "", 0, ""),
            make_entry("c", "Ann", "", 5, ""),
        ];
        let groups = StatsAggregator::group_by(&entries, GroupField::Author);
        assert!((groups[0].average_rating - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_group_by_members_sorted_by_rating_stable() {
        let entries = vec![
            make_entry("a", "Ann", "", 2, ""),
            make_entry("b", "Ann", "", 5, ""),
            make_entry("c", "Ann", "", 2, ""),
            make_entry("d", "Ann", "", 4, ""),
        ];
        let groups = StatsAggregator::group_by(&entries, GroupField::Author);
        let urls: Vec<&str> = groups[0].entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_group_stars_use_half_star_rule() {
        let entries = vec![
            make_entry("a", "Ann", "", 3, ""),
            make_entry("b", "Ann", "", 4, ""),
        ];
        let groups = StatsAggregator::group_by(&entries, GroupField::Author);
        let stars = groups[0].stars();
        assert_eq!((stars.full, stars.half, stars.empty), (3, 1, 1));
    }
}
