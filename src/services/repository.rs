//! Upsert-by-URL over the entry collection

use crate::services::storage::{EntryStore, KeyValueStore};
use crate::types::{Entry, ReadlogError, Result};
use tracing::info;

/// Whether an upsert replaced an existing record or appended a new one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

impl UpsertOutcome {
    /// Confirmation shown after saving
    pub fn message(self) -> &'static str {
        match self {
            Self::Inserted => "Blog saved!",
            Self::Updated => "Blog updated!",
        }
    }
}

/// Keeps at most one entry per URL.
pub struct EntryRepository;

impl EntryRepository {
    /// Reject candidates that cannot be stored.
    pub fn validate(candidate: &Entry) -> Result<()> {
        if candidate.url.is_empty() {
            return Err(ReadlogError::Validation("URL is required".into()));
        }
        Ok(())
    }

    /// Return a new collection with `candidate` in it.
    ///
    /// An entry with the exact same URL (case-sensitive, no normalization)
    /// is replaced in place, keeping its index; otherwise the candidate is
    /// appended.
    pub fn upsert(entries: &[Entry], candidate: Entry) -> Result<(Vec<Entry>, UpsertOutcome)> {
        Self::validate(&candidate)?;

        let mut updated = entries.to_vec();
        let outcome = match updated.iter().position(|e| e.url == candidate.url) {
            Some(index) => {
                updated[index] = candidate;
                UpsertOutcome::Updated
            }
            None => {
                updated.push(candidate);
                UpsertOutcome::Inserted
            }
        };
        Ok((updated, outcome))
    }

    /// Validate, load, upsert and save.
    ///
    /// Not atomic: a concurrent `record` between this call's load and save
    /// is silently overwritten.
    pub async fn record<K: KeyValueStore>(
        store: &EntryStore<K>,
        candidate: Entry,
    ) -> Result<UpsertOutcome> {
        Self::validate(&candidate)?;

        let current = store.load().await?;
        let url = candidate.url.clone();
        let (updated, outcome) = Self::upsert(&current, candidate)?;
        store.save(&updated).await?;

        info!(url = %url, ?outcome, total = updated.len(), "entry recorded");
        Ok(outcome)
    }
}
