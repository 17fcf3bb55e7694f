//! Error handling for depwright
//!
//! Every failure the bootstrapper can hit is described by a [`DepwrightError`] variant.
//! Functions throughout the crate return [`anyhow::Result`] and raise these variants
//! inside it, so callers that need to branch on the failure downcast to
//! [`DepwrightError`] and inspect [`DepwrightError::kind`].
//!
//! At the top level, [`user_friendly_error`] converts whatever error escaped into an
//! [`ErrorContext`] carrying details and an actionable suggestion, which the CLI
//! prints with terminal colors before exiting with status 1.
//!
//! # Error kinds
//!
//! | Kind | Raised by |
//! |------|-----------|
//! | [`ErrorKind::Usage`] | missing or unknown presets, invalid arguments |
//! | [`ErrorKind::Process`] | external tools that fail, cannot launch, or are missing |
//! | [`ErrorKind::Network`] | downloads, GitHub API lookups, checksum mismatches |
//! | [`ErrorKind::Archive`] | zip / tar extraction |
//! | [`ErrorKind::FileSystem`] | copies, removals, directory creation |
//! | [`ErrorKind::Configuration`] | project metadata, the dependency graph, verification |

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Broad classification of a [`DepwrightError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The command line was incomplete or referenced something that does not exist.
    Usage,
    /// An external program failed or could not be started.
    Process,
    /// A download or API request failed.
    Network,
    /// A downloaded archive could not be read or unpacked.
    Archive,
    /// A filesystem operation failed.
    FileSystem,
    /// Project metadata or the dependency graph is invalid.
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Usage => "usage",
            Self::Process => "process",
            Self::Network => "network",
            Self::Archive => "archive",
            Self::FileSystem => "filesystem",
            Self::Configuration => "configuration",
        };
        f.write_str(name)
    }
}

/// The error type for depwright operations.
#[derive(Error, Debug)]
pub enum DepwrightError {
    /// `preset` was run without `--preset` or `--show-presets`
    #[error("No preset specified")]
    MissingPreset,

    /// The requested preset is not defined in any preset file
    #[error("Preset '{name}' not found")]
    PresetNotFound {
        /// Preset name as given on the command line or in a mixin list
        name: String,
    },

    /// A preset file could not be parsed
    #[error("Invalid preset file {file}: {reason}")]
    PresetParseError {
        /// Path of the preset file
        file: String,
        /// Parser message
        reason: String,
    },

    /// An argument value is unusable
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong
        message: String,
    },

    /// An external program exited unsuccessfully
    #[error("Command failed{}: {command}", status.map(|code| format!(" with exit code {code}")).unwrap_or_default())]
    ProcessFailed {
        /// The quoted command line
        command: String,
        /// Exit code, absent when terminated by a signal or timed out
        status: Option<i32>,
        /// Captured standard error, empty when output was inherited
        stderr: String,
    },

    /// An external program could not be started
    #[error("Failed to launch '{program}': {reason}")]
    ProcessLaunchFailed {
        /// Program name or path
        program: String,
        /// Operating system error
        reason: String,
    },

    /// A required build tool is not on PATH
    #[error("Required tool '{tool}' was not found on PATH")]
    ToolNotFound {
        /// Tool name, e.g. `cmake`
        tool: String,
    },

    /// A network request could not be completed
    #[error("Network error while fetching {url}: {reason}")]
    NetworkError {
        /// Requested URL
        url: String,
        /// Transport error message
        reason: String,
    },

    /// A server answered with a non-success status
    #[error("Request to {url} failed with HTTP status {status}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// A GitHub release does not carry the requested asset
    #[error("Release asset '{asset}' not found in {repository} at {tag}")]
    AssetNotFound {
        /// `owner/repo`
        repository: String,
        /// Release tag
        tag: String,
        /// Asset file name
        asset: String,
    },

    /// A downloaded file does not match its declared checksum
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Downloaded file
        path: String,
        /// Declared SHA-256
        expected: String,
        /// Computed SHA-256
        actual: String,
    },

    /// An archive could not be unpacked
    #[error("Failed to extract archive {path}: {reason}")]
    ArchiveError {
        /// Archive path
        path: String,
        /// Decoder message
        reason: String,
    },

    /// A filesystem operation failed
    #[error("File system error during {operation} on {path}: {reason}")]
    FileSystemError {
        /// Operation name, e.g. `copy`
        operation: String,
        /// Path involved
        path: String,
        /// Operating system error
        reason: String,
    },

    /// Generic configuration problem
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// The project metadata file is missing or malformed
    #[error("Invalid project file {path}: {reason}")]
    ProjectFileError {
        /// Path of the metadata file
        path: String,
        /// What went wrong
        reason: String,
    },

    /// Two registry entries share a key
    #[error("Dependency '{key}' is declared more than once")]
    DuplicateDependency {
        /// The repeated key
        key: String,
    },

    /// A dependency names a prerequisite the registry does not contain
    #[error("Dependency '{dependency}' requires unknown dependency '{prerequisite}'")]
    UnknownPrerequisite {
        /// Dependent key
        dependency: String,
        /// Missing prerequisite key
        prerequisite: String,
    },

    /// The prerequisite graph contains a cycle
    #[error("Circular dependency detected: {chain}")]
    CircularDependency {
        /// Keys along the cycle joined by arrows
        chain: String,
    },

    /// Library files are still missing after a successful install step
    #[error("Installing '{dependency}' did not produce any of its library files")]
    InstallVerificationFailed {
        /// Dependency key
        dependency: String,
    },

    /// I/O error not attributed to a specific operation
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Anything else
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl DepwrightError {
    /// Returns the broad category this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingPreset
            | Self::PresetNotFound { .. }
            | Self::PresetParseError { .. }
            | Self::InvalidArgument { .. }
            | Self::Other { .. } => ErrorKind::Usage,
            Self::ProcessFailed { .. }
            | Self::ProcessLaunchFailed { .. }
            | Self::ToolNotFound { .. } => ErrorKind::Process,
            Self::NetworkError { .. }
            | Self::HttpStatus { .. }
            | Self::AssetNotFound { .. }
            | Self::ChecksumMismatch { .. } => ErrorKind::Network,
            Self::ArchiveError { .. } => ErrorKind::Archive,
            Self::FileSystemError { .. } | Self::IoError(_) => ErrorKind::FileSystem,
            Self::ConfigError { .. }
            | Self::ProjectFileError { .. }
            | Self::DuplicateDependency { .. }
            | Self::UnknownPrerequisite { .. }
            | Self::CircularDependency { .. }
            | Self::InstallVerificationFailed { .. } => ErrorKind::Configuration,
        }
    }

    /// Shorthand for a [`DepwrightError::FileSystemError`].
    pub fn filesystem(
        operation: impl Into<String>,
        path: impl AsRef<std::path::Path>,
        reason: impl fmt::Display,
    ) -> Self {
        Self::FileSystemError {
            operation: operation.into(),
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl Clone for DepwrightError {
    fn clone(&self) -> Self {
        match self {
            Self::MissingPreset => Self::MissingPreset,
            Self::PresetNotFound { name } => Self::PresetNotFound { name: name.clone() },
            Self::PresetParseError { file, reason } => Self::PresetParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::InvalidArgument { message } => Self::InvalidArgument {
                message: message.clone(),
            },
            Self::ProcessFailed {
                command,
                status,
                stderr,
            } => Self::ProcessFailed {
                command: command.clone(),
                status: *status,
                stderr: stderr.clone(),
            },
            Self::ProcessLaunchFailed { program, reason } => Self::ProcessLaunchFailed {
                program: program.clone(),
                reason: reason.clone(),
            },
            Self::ToolNotFound { tool } => Self::ToolNotFound { tool: tool.clone() },
            Self::NetworkError { url, reason } => Self::NetworkError {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::HttpStatus { url, status } => Self::HttpStatus {
                url: url.clone(),
                status: *status,
            },
            Self::AssetNotFound {
                repository,
                tag,
                asset,
            } => Self::AssetNotFound {
                repository: repository.clone(),
                tag: tag.clone(),
                asset: asset.clone(),
            },
            Self::ChecksumMismatch {
                path,
                expected,
                actual,
            } => Self::ChecksumMismatch {
                path: path.clone(),
                expected: expected.clone(),
                actual: actual.clone(),
            },
            Self::ArchiveError { path, reason } => Self::ArchiveError {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::FileSystemError {
                operation,
                path,
                reason,
            } => Self::FileSystemError {
                operation: operation.clone(),
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::ConfigError { message } => Self::ConfigError {
                message: message.clone(),
            },
            Self::ProjectFileError { path, reason } => Self::ProjectFileError {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::DuplicateDependency { key } => Self::DuplicateDependency { key: key.clone() },
            Self::UnknownPrerequisite {
                dependency,
                prerequisite,
            } => Self::UnknownPrerequisite {
                dependency: dependency.clone(),
                prerequisite: prerequisite.clone(),
            },
            Self::CircularDependency { chain } => Self::CircularDependency {
                chain: chain.clone(),
            },
            Self::InstallVerificationFailed { dependency } => Self::InstallVerificationFailed {
                dependency: dependency.clone(),
            },
            // io::Error is not Clone, keep its kind and message
            Self::IoError(e) => Self::IoError(std::io::Error::new(e.kind(), e.to_string())),
            Self::Other { message } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// An error paired with optional details and a suggestion for the user.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: DepwrightError,
    /// What the user can do about it
    pub suggestion: Option<String>,
    /// Extra explanation of the failure
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wraps an error without details or suggestion.
    #[must_use]
    pub const fn new(error: DepwrightError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Adds an actionable suggestion, shown in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Adds details, shown in yellow.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prints the error to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Converts any error into an [`ErrorContext`] suitable for CLI display.
///
/// Known [`DepwrightError`] variants get tailored suggestions. Bare I/O errors are
/// classified by their kind. Everything else keeps its full `anyhow` context chain
/// as the message.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(depwright_error) = error.downcast_ref::<DepwrightError>() {
        let mut context = create_error_context(depwright_error.clone());
        // Keep the outer context messages added with `.context(...)`
        let chain: Vec<String> = error
            .chain()
            .take_while(|cause| cause.downcast_ref::<DepwrightError>().is_none())
            .map(ToString::to_string)
            .collect();
        if context.details.is_none() && !chain.is_empty() {
            context.details = Some(chain.join(": "));
        }
        return context;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                ErrorContext::new(DepwrightError::IoError(std::io::Error::new(
                    io_error.kind(),
                    io_error.to_string(),
                )))
                .with_suggestion("Check the ownership and permissions of the build directory")
            }
            std::io::ErrorKind::NotFound => ErrorContext::new(DepwrightError::IoError(
                std::io::Error::new(io_error.kind(), io_error.to_string()),
            ))
            .with_suggestion("Check that the file or directory exists and the path is correct"),
            _ => ErrorContext::new(DepwrightError::IoError(std::io::Error::new(
                io_error.kind(),
                io_error.to_string(),
            ))),
        };
    }

    ErrorContext::new(DepwrightError::Other {
        message: format!("{error:#}"),
    })
}

fn create_error_context(error: DepwrightError) -> ErrorContext {
    match &error {
        DepwrightError::MissingPreset => ErrorContext::new(error)
            .with_suggestion("Pass --preset <NAME>, or --show-presets to list the available presets"),
        DepwrightError::PresetNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'depwright preset --show-presets' to list the available presets"),
        DepwrightError::ProcessFailed { stderr, .. } => {
            let stderr = stderr.trim().to_string();
            let context = ErrorContext::new(error)
                .with_suggestion("Re-run with --verbose to see every command as it runs");
            if stderr.is_empty() {
                context
            } else {
                context.with_details(stderr)
            }
        }
        DepwrightError::ToolNotFound { tool } => {
            let suggestion = format!(
                "Install {tool} with your package manager (e.g. 'brew install {tool}', 'apt install {tool}') and make sure it is on PATH"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }
        DepwrightError::NetworkError { .. } | DepwrightError::HttpStatus { .. } => {
            ErrorContext::new(error).with_suggestion(
                "Check your internet connection. GitHub rate limits anonymous requests, pass --auth-token or --auth-token-file",
            )
        }
        DepwrightError::AssetNotFound { .. } => ErrorContext::new(error).with_suggestion(
            "Check the 'asset_name' and 'version' of the dependency against the release page",
        ),
        DepwrightError::ChecksumMismatch { .. } => ErrorContext::new(error)
            .with_suggestion("Update the 'sha256' of the dependency if the upstream archive changed"),
        DepwrightError::CircularDependency { .. } => ErrorContext::new(error)
            .with_suggestion("Remove one of the 'requires' entries that form the cycle"),
        DepwrightError::UnknownPrerequisite { prerequisite, .. } => {
            let suggestion =
                format!("Declare '{prerequisite}' in the project file or fix the 'requires' entry");
            ErrorContext::new(error).with_suggestion(suggestion)
        }
        DepwrightError::ProjectFileError { .. } => ErrorContext::new(error)
            .with_suggestion("Check the project file path (--project-file) and its JSON syntax"),
        DepwrightError::InstallVerificationFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Check the 'library_files' of the dependency against what its install step produces"),
        _ => ErrorContext::new(error),
    }
}
