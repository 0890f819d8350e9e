//! Services for storage, aggregation and list projection

pub mod aggregator;
pub mod background;
pub mod projector;
pub mod repository;
pub mod storage;
pub mod website;

pub use aggregator::StatsAggregator;
pub use background::{BackgroundHandle, BackgroundService, Request, Response};
pub use projector::ListProjector;
pub use repository::{EntryRepository, UpsertOutcome};
pub use storage::{EntryStore, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use website::website_from_url;
