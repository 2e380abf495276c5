//! State module for tracking extraction progress
//!
//! # Components
//!
//! - `BatchState`: the persisted snapshot of a batch run
//! - `OutputRow`: one extracted (sitemap, page) pair
//! - `JobStatus`: the lifecycle phase derived from a snapshot

mod batch_state;

pub use batch_state::{BatchState, JobStatus, OutputRow, CSV_HEADER};
