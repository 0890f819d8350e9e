//! Type definitions for readlog

mod entry;
mod error;
mod stats;

pub use entry::*;
pub use error::*;
pub use stats::*;
