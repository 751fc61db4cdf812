//! Integration test suite.
//!
//! Runs the full HTTP stack against an in-memory SQLite database and the
//! in-process key-value store; no external services are needed.
//!
//! Run with: cargo test --test integration

mod test_helpers;

mod test_account;
mod test_library_api;
mod test_library_service;
mod test_store_failures;
