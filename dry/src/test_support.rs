//! Test-only helpers: a scripted [`ToolRunner`] and scratch workspaces.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use crate::error::ToolError;
use crate::io::process::{CommandOutput, ToolCommand, ToolRunner};

/// How a command was launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Captured,
    Streamed,
}

/// One recorded launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub mode: Mode,
    pub command: ToolCommand,
}

/// Tool runner that answers from a script instead of spawning processes.
///
/// Responses are keyed by a prefix of the rendered command line. When several
/// responses share a prefix they are consumed in order and the last one
/// repeats. Unscripted commands succeed with empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    script: RefCell<Vec<(String, CommandOutput)>>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, prefix: &str, output: CommandOutput) -> Self {
        self.script.borrow_mut().push((prefix.to_string(), output));
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Rendered command lines, in launch order.
    pub fn commands(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|call| call.command.to_string())
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.commands()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .count()
    }

    pub fn ran(&self, prefix: &str) -> bool {
        self.count(prefix) > 0
    }

    pub fn streamed(&self, prefix: &str) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|call| call.mode == Mode::Streamed && call.command.to_string().starts_with(prefix))
    }

    fn respond(&self, mode: Mode, command: &ToolCommand) -> CommandOutput {
        self.calls.borrow_mut().push(Invocation {
            mode,
            command: command.clone(),
        });

        let line = command.to_string();
        let mut script = self.script.borrow_mut();
        let matching: Vec<usize> = script
            .iter()
            .enumerate()
            .filter(|(_, (prefix, _))| line.starts_with(prefix.as_str()))
            .map(|(idx, _)| idx)
            .collect();
        match matching.as_slice() {
            [] => CommandOutput::ok(""),
            [only] => script[*only].1.clone(),
            [first, ..] => script.remove(*first).1,
        }
    }
}

impl ToolRunner for ScriptedRunner {
    fn capture(&self, command: &ToolCommand) -> Result<CommandOutput> {
        Ok(self.respond(Mode::Captured, command))
    }

    fn stream(&self, command: &ToolCommand) -> Result<()> {
        let output = self.respond(Mode::Streamed, command);
        if output.success {
            return Ok(());
        }
        Err(ToolError::Exited {
            command: command.to_string(),
            code: output.code,
        }
        .into())
    }
}

/// Scratch workspace rooted in a temporary directory.
#[derive(Debug)]
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create an empty file (and its parents) at `rel`.
    pub fn touch(&self, rel: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, "")?;
        Ok(path)
    }

    pub fn mkdir(&self, rel: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    pub fn write(&self, rel: &str, contents: &str) -> Result<PathBuf> {
        let path = self.touch(rel)?;
        fs::write(&path, contents)?;
        Ok(path)
    }
}
