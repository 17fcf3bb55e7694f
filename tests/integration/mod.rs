//! Integration test suite for depwright
//!
//! End-to-end tests of the install pipeline and the command line. Network access is
//! never needed: installs go through a fixture-backed fetcher and CLI runs use
//! `--dry-run` or read-only commands.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: `configure`, `preset` and `status` through the built binary
//! - **install**: strategies, ledger updates and failure handling

mod cli;
mod common;
mod install;
