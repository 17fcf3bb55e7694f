//! User configuration.
//!
//! Only the global config file lives here. Project metadata is part of
//! [`crate::registry`] and presets of [`crate::preset`].

pub mod global;

pub use global::{GitHubOverrides, GlobalConfig, read_token_file};
