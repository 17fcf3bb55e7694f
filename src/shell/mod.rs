//! Dry-run aware execution of every state-changing operation.
//!
//! A [`Shell`] is created once per run and threaded through the install context.
//! Each operation is announced as a shell-quoted `+ command` line before it happens:
//!
//! - in **dry-run** mode the line is printed to stdout and nothing else happens;
//! - in **echo** mode the line is printed to stderr and the operation runs;
//! - otherwise the operation runs silently (the line still goes to the debug log).
//!
//! Announced lines are also appended to an in-memory trace, which is how tests
//! check what a dry run would have done.
//!
//! ```rust,no_run
//! use depwright::shell::{Shell, ToolCommand};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let shell = Shell::new(true, false);
//! shell.makedirs("build/linux-x86_64/dependencies".as_ref())?;
//! shell.run(ToolCommand::new("cmake").arg("--version")).await?;
//! assert_eq!(shell.trace().len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod command;

pub use command::{CommandOutput, ToolCommand};

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::core::DepwrightError;
use crate::fetch::archive;
use crate::utils;

/// Quotes one argument for display in a POSIX shell.
pub fn quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%^".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Quotes and joins a full command line.
pub fn quote_command<S: AsRef<str>>(argv: &[S]) -> String {
    argv.iter().map(|arg| quote(arg.as_ref())).collect::<Vec<_>>().join(" ")
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Executes, or pretends to execute, filesystem operations and external commands.
#[derive(Debug, Clone, Default)]
pub struct Shell {
    dry_run: bool,
    echo: bool,
    trace: Arc<Mutex<Vec<String>>>,
}

impl Shell {
    /// Creates a shell. `dry_run` implies announcing every operation.
    #[must_use]
    pub fn new(dry_run: bool, echo: bool) -> Self {
        Self {
            dry_run,
            echo,
            trace: Arc::default(),
        }
    }

    /// Whether operations are only printed.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Every command announced so far, in order.
    #[must_use]
    pub fn trace(&self) -> Vec<String> {
        self.trace.lock().map(|trace| trace.clone()).unwrap_or_default()
    }

    /// Records and prints a command line.
    pub fn announce<S: AsRef<str>>(&self, argv: &[S]) {
        self.announce_line(quote_command(argv));
    }

    fn announce_line(&self, line: String) {
        tracing::debug!(target: "shell", "+ {}", line);
        if self.dry_run {
            println!("+ {line}");
        } else if self.echo {
            eprintln!("+ {line}");
        }
        if let Ok(mut trace) = self.trace.lock() {
            trace.push(line);
        }
    }

    /// `mkdir -p`
    pub fn makedirs(&self, path: &Path) -> Result<()> {
        self.announce(&["mkdir", "-p", &display(path)]);
        if self.dry_run {
            return Ok(());
        }
        utils::ensure_dir(path)
    }

    /// `rm -rf` on a directory; missing directories are ignored.
    pub fn rmtree(&self, path: &Path) -> Result<()> {
        self.announce(&["rm", "-rf", &display(path)]);
        if self.dry_run {
            return Ok(());
        }
        utils::fs::remove_dir_all(path)
            .map_err(|e| DepwrightError::filesystem("remove directory", path, format!("{e:#}")).into())
    }

    /// `rm -f` on a file; missing files are ignored.
    pub fn rm(&self, path: &Path) -> Result<()> {
        self.announce(&["rm", "-f", &display(path)]);
        if self.dry_run {
            return Ok(());
        }
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DepwrightError::filesystem("remove file", path, e).into()),
        }
    }

    /// `cp -p` of a single file to an explicit destination path.
    pub fn copy(&self, source: &Path, dest: &Path) -> Result<()> {
        self.announce(&["cp", "-p", &display(source), &display(dest)]);
        if self.dry_run {
            return Ok(());
        }
        fs::copy(source, dest)
            .map(|_| ())
            .map_err(|e| DepwrightError::filesystem("copy", source, e).into())
    }

    /// `cp -R` of a directory tree; `dest` receives the contents of `source`.
    pub fn copytree(&self, source: &Path, dest: &Path) -> Result<()> {
        self.announce(&["cp", "-R", &display(source), &display(dest)]);
        if self.dry_run {
            return Ok(());
        }
        utils::copy_dir(source, dest)
            .map_err(|e| DepwrightError::filesystem("copy directory", source, format!("{e:#}")).into())
    }

    /// Unpacks a `.zip`, `.tar.gz`, `.tgz` or `.tar` archive into `dest`.
    pub async fn extract(&self, archive_path: &Path, dest: &Path) -> Result<()> {
        if archive::is_zip(archive_path) {
            self.announce(&["unzip", "-q", "-o", &display(archive_path), "-d", &display(dest)]);
        } else {
            self.announce(&["tar", "-xf", &display(archive_path), "-C", &display(dest)]);
        }
        if self.dry_run {
            return Ok(());
        }
        archive::extract(archive_path, dest).await
    }

    /// Runs an external command, or only announces it in dry-run mode.
    pub async fn run(&self, command: ToolCommand) -> Result<CommandOutput> {
        self.announce_line(command.display());
        if self.dry_run {
            return Ok(CommandOutput::default());
        }
        command.execute().await
    }
}
