//! Task bodies: clean, format, sandbox login/selection and the test drivers.
//!
//! [`Tasks`] binds the workspace, configuration, environment snapshot and tool
//! runner together and implements [`TaskSet`], so every prerequisite goes
//! through the [`TaskGraph`] and runs at most once per invocation.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::{SecondsFormat, Utc};
use tracing::{debug, instrument};

use crate::core::artifacts::coverage_file_name;
use crate::core::graph::{TaskGraph, TaskSet};
use crate::core::types::{Suite, TaskName};
use crate::error::SandboxError;
use crate::io::config::DryConfig;
use crate::io::env::TaskEnv;
use crate::io::process::{ToolCommand, ToolRunner};
use crate::io::sandbox::Sandbox;
use crate::io::sweeper;

/// Everything a task body needs for one invocation.
#[derive(Debug)]
pub struct Tasks<R> {
    root: PathBuf,
    config: DryConfig,
    env: TaskEnv,
    runner: R,
    verbose: bool,
}

impl<R: ToolRunner> Tasks<R> {
    pub fn new(root: impl Into<PathBuf>, config: DryConfig, env: TaskEnv, runner: R) -> Self {
        Self {
            root: root.into(),
            config,
            env,
            runner,
            verbose: false,
        }
    }

    /// Pass `-v` to `go test`.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run `task` and its prerequisites with a fresh invocation record.
    ///
    /// Returns the tasks that ran, in completion order.
    pub fn run(&mut self, task: TaskName) -> Result<Vec<TaskName>> {
        let mut graph = TaskGraph::new();
        graph.run(self, task)?;
        Ok(graph.history().to_vec())
    }

    fn sandbox(&self) -> Sandbox<'_, R> {
        Sandbox::new(
            &self.runner,
            &self.config.tools.cloud_cli,
            self.config.sandbox.interactive_login(),
        )
    }

    fn tool(&self, program: &str) -> ToolCommand {
        ToolCommand::new(program)
    }

    /// Whether the Go test suite exists. A missing suite means "nothing to do".
    fn test_dir_exists(&self) -> Result<bool> {
        let path = self.root.join(&self.config.test_dir);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => Ok(true),
            Ok(_) => Err(anyhow!(
                "'{}' exists but is not a directory",
                self.config.test_package()
            )),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                println!(
                    "Test directory '{}' does not exist.",
                    self.config.test_package()
                );
                Ok(false)
            }
            Err(err) => Err(err).with_context(|| {
                format!(
                    "error checking for '{}' sub-directory",
                    self.config.test_package()
                )
            }),
        }
    }

    /// Clean, format and authenticate before any test run.
    fn prepare(&mut self, graph: &mut TaskGraph<TaskName>) -> Result<()> {
        graph.require(self, TaskName::Clean)?;
        graph.require(self, TaskName::Format)?;
        graph.require(self, TaskName::SelectSandbox)
    }

    #[instrument(skip_all, fields(root = %self.root.display()))]
    fn clean(&self) -> Result<()> {
        println!("Cleaning...");
        let report = sweeper::clean(&self.root)?;
        debug!(removed = report.removed.len(), "workspace cleaned");
        Ok(())
    }

    fn format(&self) -> Result<()> {
        println!("Formatting...");
        self.runner
            .stream(&self.tool(&self.config.tools.formatter).args(["fmt", "."]))?;
        if !self.test_dir_exists()? {
            return Ok(());
        }
        self.runner.stream(
            &self
                .tool(&self.config.tools.test_tool)
                .args(["fmt".to_string(), self.config.test_package()]),
        )
    }

    fn login_sandbox(&self) -> Result<()> {
        self.sandbox().login()
    }

    fn select_sandbox(&mut self, graph: &mut TaskGraph<TaskName>) -> Result<()> {
        if self.env.has_service_principal() {
            println!("We can access the sandbox using the provided environment variables.");
            return Ok(());
        }
        let target = self
            .config
            .sandbox
            .account_name
            .clone()
            .ok_or(SandboxError::NotConfigured)?;

        graph.require(self, TaskName::LoginSandbox)?;
        self.sandbox().select(&target)?;
        Ok(())
    }

    #[instrument(skip_all, fields(suite = suite.label()))]
    fn test(&mut self, graph: &mut TaskGraph<TaskName>, suite: Suite) -> Result<()> {
        if !self.test_dir_exists()? {
            return Ok(());
        }
        self.prepare(graph)?;

        let mut args = vec!["test".to_string(), "-failfast".to_string()];
        let default_target = match suite {
            Suite::Unit => &self.config.unit_target,
            Suite::Integration => {
                args.push("-timeout".to_string());
                args.push(self.config.integration_timeout.clone());
                &self.config.integration_target
            }
        };
        let target = self
            .env
            .target_override(suite)
            .unwrap_or(default_target)
            .to_string();
        args.push(self.config.test_package());
        args.push("-run".to_string());
        args.push(target);
        if self.verbose {
            args.push("-v".to_string());
        }

        println!(
            "Running {} tests... (args: {})",
            suite.label(),
            args.join(" ")
        );
        self.runner
            .stream(&self.tool(&self.config.tools.test_tool).args(args))
    }

    fn cover(&mut self, graph: &mut TaskGraph<TaskName>) -> Result<()> {
        if !self.test_dir_exists()? {
            return Ok(());
        }
        self.prepare(graph)?;

        println!("Running tests and generating coverage report...");
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let cover_file = coverage_file_name(&stamp);
        let test_tool = &self.config.tools.test_tool;

        let run = self.tool(test_tool).args([
            "test".to_string(),
            self.config.test_package(),
            format!("-coverprofile={cover_file}"),
        ]);
        self.runner
            .stream(&run)
            .with_context(|| format!("error running '{run}'"))?;

        self.runner.stream(
            &self
                .tool(test_tool)
                .args(["tool".to_string(), "cover".to_string(), format!("-html={cover_file}")]),
        )
    }
}

impl<R: ToolRunner> TaskSet for Tasks<R> {
    type Task = TaskName;

    fn execute(&mut self, task: TaskName, graph: &mut TaskGraph<TaskName>) -> Result<()> {
        debug!(%task, "running task");
        match task {
            TaskName::Full => {
                graph.require(self, TaskName::Unit)?;
                graph.require(self, TaskName::Integration)
            }
            TaskName::Clean => self.clean(),
            TaskName::Format => self.format(),
            TaskName::Unit => self.test(graph, Suite::Unit),
            TaskName::Integration => self.test(graph, Suite::Integration),
            TaskName::Cover => self.cover(graph),
            TaskName::SelectSandbox => self.select_sandbox(graph),
            TaskName::LoginSandbox => self.login_sandbox(),
        }
    }
}
