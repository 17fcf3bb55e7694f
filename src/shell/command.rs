//! Builder for external tool invocations (cmake, ninja, make, git, ...).
//!
//! [`ToolCommand`] collects the program and arguments of one invocation. It never decides about dry-run on its own: commands
//! are handed to [`Shell::run`](super::Shell::run), which announces them and only
//! calls [`ToolCommand::execute`] when the shell is live.

use anyhow::Result;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::core::DepwrightError;

/// A single external command.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: OsString,
    args: Vec<String>,
    capture_output: bool,
    context: Option<String>,
}

/// Output of a command run with captured output.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl ToolCommand {
    /// Creates a command for `program`, capturing its output by default.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            capture_output: true,
            context: None,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends a path argument.
    pub fn path_arg(self, path: impl AsRef<Path>) -> Self {
        let rendered = path.as_ref().display().to_string();
        self.arg(rendered)
    }

    /// Streams the child's output to the terminal instead of capturing it.
    pub const fn inherit_stdio(mut self) -> Self {
        self.capture_output = false;
        self
    }

    /// Labels the command in debug logs, usually with the dependency key.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Program followed by its arguments, as strings.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.to_string_lossy().into_owned());
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Shell-quoted command line, e.g. `cmake -G Ninja '-DCMAKE_INSTALL_PREFIX=/a b'`.
    pub fn display(&self) -> String {
        super::quote_command(&self.argv())
    }

    /// Spawns the command and waits for it.
    ///
    /// Fails with [`DepwrightError::ProcessLaunchFailed`] when the program cannot be
    /// started and [`DepwrightError::ProcessFailed`] on a non-zero exit.
    pub async fn execute(self) -> Result<CommandOutput> {
        let rendered = self.display();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        match &self.context {
            Some(ctx) => tracing::debug!(target: "shell", "({}) Executing command: {}", ctx, rendered),
            None => tracing::debug!(target: "shell", "Executing command: {}", rendered),
        }

        if self.capture_output {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        }
        cmd.kill_on_drop(true);

        let output = cmd.output().await.map_err(|e| DepwrightError::ProcessLaunchFailed {
            program: self.program.to_string_lossy().into_owned(),
            reason: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            tracing::debug!(
                target: "shell",
                "Command failed with exit code: {:?}",
                output.status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "shell", "Error: {}", stderr);
            }
            return Err(DepwrightError::ProcessFailed {
                command: rendered,
                status: output.status.code(),
                stderr,
            }
            .into());
        }

        Ok(CommandOutput { stdout, stderr })
    }
}
