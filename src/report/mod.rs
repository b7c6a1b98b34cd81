//! Dashboard artifacts derived from one briefing run.

pub mod alerts;
pub mod map;
pub mod writer;

pub use writer::write_artifacts;
