pub mod render;

use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::services::{
    website_from_url, BackgroundService, EntryRepository, EntryStore, FileKeyValueStore,
    ListProjector, StatsAggregator,
};
use crate::types::{ActivityCalendar, Entry, GroupField, SortKey, Summary};

/// Log the blogs you read and see your reading stats
#[derive(Parser)]
#[command(name = "readlog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding storage.json (default: ~/.readlog)
    #[arg(long, global = true, env = "READLOG_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the store if it does not exist yet
    Init,

    /// Save a blog post (re-saving a URL replaces it)
    Add {
        /// Page URL
        url: String,

        #[arg(long, default_value = "")]
        title: String,

        #[arg(long, default_value = "")]
        author: String,

        /// Defaults to the URL's hostname without "www."
        #[arg(long)]
        website: Option<String>,

        /// 0 = unrated
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=5))]
        rating: u8,
    },

    /// Show summary totals and the activity calendar
    Stats {
        /// Also list what was read on this day (YYYY-MM-DD)
        #[arg(long)]
        day: Option<NaiveDate>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List entries, optionally filtered and sorted
    List {
        /// Case-insensitive match on title, author or website
        #[arg(long, default_value = "")]
        search: String,

        /// date-desc, date-asc, rating-desc or rating-asc
        #[arg(long, default_value_t = SortKey::DateDesc)]
        sort: SortKey,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Entries grouped by author
    Authors {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Entries grouped by website
    Websites {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct StatsReport<'a> {
    summary: &'a Summary,
    calendar: &'a ActivityCalendar,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let backend = match self.data_dir {
            Some(dir) => FileKeyValueStore::with_data_dir(dir),
            None => FileKeyValueStore::new()?,
        };
        let store_path = backend.store_path();
        let service = BackgroundService::new(EntryStore::new(backend));

        match self.command {
            Commands::Init => {
                service.on_installed().await?;
                println!("Store ready at {}", store_path.display());
                Ok(())
            }
            Commands::Add {
                url,
                title,
                author,
                website,
                rating,
            } => {
                let website = website.unwrap_or_else(|| website_from_url(&url));
                let candidate = Entry::capture(url, title, author, website, rating, Utc::now());
                let outcome = EntryRepository::record(service.store(), candidate)
                    .await
                    .with_context(|| format!("saving to {}", store_path.display()))?;
                println!("{}", outcome.message());
                Ok(())
            }
            command => {
                let entries = service.spawn().entries().await?;
                show(command, &entries)
            }
        }
    }
}

fn show(command: Commands, entries: &[Entry]) -> anyhow::Result<()> {
    match command {
        Commands::Stats { day, json } => {
            let summary = StatsAggregator::summarize(entries);
            let calendar = StatsAggregator::build_calendar(entries, &Local::now());
            if json {
                let report = StatsReport {
                    summary: &summary,
                    calendar: &calendar,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }
            if entries.is_empty() {
                println!("{}", render::EMPTY_LOG);
                return Ok(());
            }
            print!("{}", render::render_summary(&summary));
            println!();
            print!("{}", render::render_calendar(&calendar));
            if let Some(day) = day {
                println!();
                match calendar.buckets.iter().find(|b| b.date == day) {
                    Some(bucket) => print!("{}", render::render_day(bucket)),
                    None => println!("{} is outside the last year", day),
                }
            }
        }
        Commands::List { search, sort, json } => {
            let projected = ListProjector::project(entries, &search, sort);
            if json {
                println!("{}", serde_json::to_string_pretty(&projected)?);
            } else if entries.is_empty() {
                println!("{}", render::EMPTY_LOG);
            } else {
                print!("{}", render::render_entry_list(&projected, &Local));
            }
        }
        Commands::Authors { json } => show_groups(entries, GroupField::Author, json)?,
        Commands::Websites { json } => show_groups(entries, GroupField::Website, json)?,
        Commands::Init | Commands::Add { .. } => {}
    }
    Ok(())
}

fn show_groups(entries: &[Entry], field: GroupField, json: bool) -> anyhow::Result<()> {
    let groups = StatsAggregator::group_by(entries, field);
    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else {
        print!("{}", render::render_groups(field, &groups));
    }
    Ok(())
}
