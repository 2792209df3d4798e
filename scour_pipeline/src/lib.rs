#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! The resumable deletion pipeline.
//!
//! Control flow: enumerate every conversation the user belongs to, skip the
//! ones already checkpointed, scan each remaining one's history, delete the
//! user's own messages, and checkpoint the conversation once it is verifiably
//! clean. One conversation at a time, one request in flight at a time.
//!
//! A conversation-scoped failure is converted into a reported result at this
//! boundary and never aborts the run; only enumeration (and checkpoint load,
//! which happens before the pipeline is built) is fatal.

mod enumerate;
mod pipeline;
mod scan;

pub use enumerate::list_all_conversations;
pub use pipeline::{Pipeline, PipelineConfig, ProcessResult, RunSummary};
pub use scan::HistoryScanner;
