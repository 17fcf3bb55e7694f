//! Core types shared by every depwright module
//!
//! - [`error`] holds [`DepwrightError`], its [`ErrorKind`] classification and the
//!   [`ErrorContext`] wrapper the CLI uses to print failures with suggestions.
//! - [`platform`] identifies the host [`Platform`] and the [`Target`] directory that
//!   dependencies are installed for.

pub mod error;
pub mod platform;

pub use error::{DepwrightError, ErrorContext, ErrorKind, user_friendly_error};
pub use platform::{Platform, Target};
