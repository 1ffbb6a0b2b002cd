//! Collector module - the collection engine and its session driver
//!
//! - `CollectionEngine` runs the paginated, quota-aware fetch loop and hands
//!   out records one at a time
//! - `CollectionSession` resumes from the sink's newest record and forwards
//!   every record of a run to the sink

mod engine;
mod session;

pub use engine::{CollectOptions, Collection, CollectionEngine, RunCounters, PROGRESS_INTERVAL};
pub use session::{CollectionSession, RunSummary, DEFAULT_SINCE_ID};
