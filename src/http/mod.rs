//! HTTP retrieval module
//!
//! Fetches one page of an entity listing from the upstream API.
//!
//! # Features
//!
//! - **Authenticated GET**: authorization, client id, language and encoding headers
//! - **Failure classification**: every error is tagged retryable or not before it is returned
//! - **Typed decoding**: response bodies decode into `PageResponse<T>`
//! - **`PageFetcher` seam**: the sync engine depends on the trait, not on reqwest

mod client;
mod fetcher;

pub use client::{HttpClient, DEFAULT_USER_AGENT};
pub use fetcher::PageFetcher;
