//! Integration tests for the extraction pipeline
//!
//! These tests use wiremock to stand in for the relay proxies and exercise
//! fetching, resolution and the batch job end-to-end.

mod common;
mod fetch_tests;
mod job_tests;
