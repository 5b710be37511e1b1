//! Running external tools in captured or streaming mode.
//!
//! Captured mode collects stdout/stderr for the caller to inspect and never
//! touches the console. Streaming mode inherits the console so long-running
//! tools (`go test`, `az login`) show their output live.

use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::Result;
use tracing::{debug, instrument, warn};

use crate::error::ToolError;

/// An external program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured child process output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    /// `None` when the child was terminated by a signal.
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
            code: Some(code),
        }
    }

    /// Stdout followed by stderr, trimmed. Mirrors what `cmd 2>&1` would print.
    pub fn combined(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (true, _) => stderr.to_string(),
            (false, true) => stdout.to_string(),
            (false, false) => format!("{stdout}\n{stderr}"),
        }
    }

    /// Turn a non-zero exit into a [`ToolError::Failed`] carrying the raw output.
    pub fn check(self, command: &ToolCommand) -> Result<Self, ToolError> {
        if self.success {
            return Ok(self);
        }
        Err(ToolError::Failed {
            command: command.to_string(),
            code: self.code,
            output: self.combined(),
        })
    }
}

/// Seam between task bodies and the processes they launch.
pub trait ToolRunner {
    /// Run `command` and return its output, whatever the exit status.
    fn capture(&self, command: &ToolCommand) -> Result<CommandOutput>;

    /// Run `command` with output passed through to the console.
    fn stream(&self, command: &ToolCommand) -> Result<()>;

    /// Run `command` in captured mode and fail on a non-zero exit.
    fn capture_checked(&self, command: &ToolCommand) -> Result<CommandOutput> {
        let output = self.capture(command)?;
        Ok(output.check(command)?)
    }
}

/// Runs commands as real child processes inside `workdir`.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    workdir: PathBuf,
}

impl SystemRunner {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    fn command(&self, command: &ToolCommand) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args).current_dir(&self.workdir);
        cmd
    }
}

impl ToolRunner for SystemRunner {
    #[instrument(skip_all, fields(command = %command))]
    fn capture(&self, command: &ToolCommand) -> Result<CommandOutput> {
        debug!("running captured");
        let output = self
            .command(command)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ToolError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let captured = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
            code: output.status.code(),
        };
        debug!(exit_code = ?captured.code, "command finished");
        Ok(captured)
    }

    #[instrument(skip_all, fields(command = %command))]
    fn stream(&self, command: &ToolCommand) -> Result<()> {
        debug!("running streamed");
        let status = self
            .command(command)
            .status()
            .map_err(|source| ToolError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if !status.success() {
            warn!(exit_code = ?status.code(), "command failed");
            return Err(ToolError::Exited {
                command: command.to_string(),
                code: status.code(),
            }
            .into());
        }
        debug!("command finished");
        Ok(())
    }
}
