//! State module for tracking collection progress
//!
//! # Components
//!
//! - `EngineState`: the phase a collection run is in (idle, checking quota,
//!   fetching, emitting, done, failed)

mod engine_state;

pub use engine_state::EngineState;
