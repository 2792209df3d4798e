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

//! Slack Web API client with rate-limit-aware retries.
//!
//! # Key pieces
//! - [`SlackClient`]: reqwest-backed implementation of `scour_core::SlackApi`
//! - [`retry`]: the shared retry/backoff decorator every call runs through
//! - [`api`]: typed response envelopes for the consumed endpoints

pub mod api;
mod client;
pub mod retry;

pub use client::{PAGE_LIMIT, SlackClient};
pub use retry::{BackoffPolicy, CallError, RetryState};
