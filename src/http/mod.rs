//! HTTP client used by the `api` commands and the test-suite runner.

pub mod client;

pub use client::{ApiClient, ApiRequest, ApiResponse, HttpMethod};
