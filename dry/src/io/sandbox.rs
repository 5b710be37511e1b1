//! Azure CLI adapter for logging in to and selecting the sandbox subscription.
//!
//! All decisions are made on the CLI's JSON output (`--output json`); the only
//! text matched is the "please log in" message, which the CLI prints as a plain
//! error.

use anyhow::Result;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::core::account::{
    Account, is_login_required, parse_account, parse_account_list, select_sandbox,
};
use crate::error::{SandboxError, ToolError};
use crate::io::process::{ToolCommand, ToolRunner};

/// What `az account show` says about the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// Logged in with an enabled default account.
    Active(Account),
    /// Logged in, but the default account is not enabled.
    Inactive(Account),
    /// No session; the CLI asked for `az login`.
    LoginRequired,
}

/// Sandbox operations against one cloud CLI executable.
#[derive(Debug)]
pub struct Sandbox<'a, R> {
    runner: &'a R,
    cli: &'a str,
    interactive_login: bool,
}

impl<'a, R: ToolRunner> Sandbox<'a, R> {
    pub fn new(runner: &'a R, cli: &'a str, interactive_login: bool) -> Self {
        Self {
            runner,
            cli,
            interactive_login,
        }
    }

    fn cli(&self) -> ToolCommand {
        ToolCommand::new(self.cli)
    }

    /// Ask the CLI for the current account.
    #[instrument(skip_all)]
    pub fn probe(&self) -> Result<Session> {
        let cmd = self.cli().args(["account", "show", "--output", "json"]);
        let output = self.runner.capture(&cmd)?;

        if !output.success && is_login_required(&output.combined()) {
            debug!("cloud CLI has no session");
            return Ok(Session::LoginRequired);
        }
        let output = output.check(&cmd)?;

        let account = parse_account(&output.stdout).map_err(|err| ToolError::Unrecognized {
            command: cmd.to_string(),
            detail: err.to_string(),
        })?;
        debug!(account = %account.name, state = ?account.state, "cloud CLI session");
        if account.state.is_none() {
            return Err(ToolError::Unrecognized {
                command: cmd.to_string(),
                detail: "missing state".to_string(),
            }
            .into());
        }
        if account.is_enabled() {
            Ok(Session::Active(account))
        } else {
            Ok(Session::Inactive(account))
        }
    }

    /// Make sure the CLI holds an enabled session, logging in interactively if
    /// none exists.
    #[instrument(skip_all)]
    pub fn login(&self) -> Result<()> {
        match self.probe()? {
            Session::Active(_) => {
                println!("The Azure CLI shows that we are already logged in.");
                return Ok(());
            }
            Session::Inactive(account) => {
                warn!(account = %account.name, state = ?account.state, "default account is not enabled");
                return Err(SandboxError::UnableToLogIn.into());
            }
            Session::LoginRequired => {}
        }

        if !self.interactive_login {
            warn!("no cloud CLI session and interactive login is disabled");
            return Err(SandboxError::UnableToLogIn.into());
        }

        println!("Logging in to the sandbox...");
        self.runner.stream(&self.cli().arg("login"))?;

        match self.probe()? {
            Session::Active(account) => {
                info!(account = %account.name, "logged in");
                Ok(())
            }
            _ => Err(SandboxError::UnableToLogIn.into()),
        }
    }

    /// Find the subscription whose name contains `target` and make it the
    /// CLI's active subscription. Assumes a session exists.
    #[instrument(skip_all, fields(account_name = target))]
    pub fn select(&self, target: &str) -> Result<Uuid> {
        println!("Looking up sandbox subscription...");
        let cmd = self.cli().args(["account", "list", "--output", "json"]);
        let output = self.runner.capture_checked(&cmd)?;
        let accounts =
            parse_account_list(&output.stdout).map_err(|err| ToolError::Unrecognized {
                command: cmd.to_string(),
                detail: err.to_string(),
            })?;

        let id = select_sandbox(&accounts, target)?;

        println!("Selecting sandbox subscription...");
        self.runner.capture_checked(
            &self
                .cli()
                .args(["account", "set"])
                .arg(format!("--subscription={id}")),
        )?;
        info!(subscription = %id, "sandbox subscription selected");
        Ok(id)
    }
}
