//! Integration tests for Linkscout
//!
//! These tests run the crawler end-to-end against wiremock servers and a
//! SQLite database in a temporary directory.

mod common;
mod config_tests;
mod crawl_tests;
mod scorer_tests;
