//! readlog: a personal blog reading log.
//!
//! Entries (URL, title, author, site, star rating, timestamp) are kept in a
//! single key-value blob. Everything shown on the stats page is derived from
//! a fresh snapshot on every call: headline summary, a 366-day activity
//! calendar, per-author/per-website rollups, and the searchable entry list.

pub mod cli;
pub mod services;
pub mod types;
