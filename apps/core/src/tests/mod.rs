//! Test Module
//!
//! Cross-module tests for the Welcome Book backend.
//!
//! ## Test Categories
//! - `brain_tests`: normalization, stopwords, similarity and intent resolution
//! - `database_tests`: question log persistence
//! - `actor_tests`: question recorder behavior with mock stores
//! - `server_tests`: HTTP handlers
//! - `integration_tests`: chat sessions wired to the recorder and SQLite

pub mod database_tests;
pub mod server_tests;
