//! Task runner configuration stored in `dry.toml` at the workspace root.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Default config file name, resolved against the workspace root.
pub const CONFIG_FILE: &str = "dry.toml";

/// Task runner configuration (TOML).
///
/// Every field is optional in the file; missing fields keep the defaults that
/// match a stock Terraform module with Go tests under `test/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DryConfig {
    /// Directory holding the Go test suite, relative to the workspace root.
    pub test_dir: String,

    /// `-run` filter for unit tests when `MAGE_TARGET_UT` is unset.
    pub unit_target: String,

    /// `-run` filter for integration tests when `MAGE_TARGET_IT` is unset.
    pub integration_target: String,

    /// `-timeout` passed to `go test` for integration runs.
    pub integration_timeout: String,

    pub tools: ToolsConfig,
    pub sandbox: SandboxConfig,
}

/// Executables used by the tasks. Override to pin versions or wrappers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolsConfig {
    pub cloud_cli: String,
    pub formatter: String,
    pub test_tool: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SandboxConfig {
    /// Substring identifying the sandbox subscription by name.
    pub account_name: Option<String>,

    /// Run `az login` when no session exists. Disable for unattended runs.
    pub interactive_login: Option<bool>,
}

impl SandboxConfig {
    pub fn interactive_login(&self) -> bool {
        self.interactive_login.unwrap_or(true)
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            cloud_cli: "az".to_string(),
            formatter: "terraform".to_string(),
            test_tool: "go".to_string(),
        }
    }
}

impl Default for DryConfig {
    fn default() -> Self {
        Self {
            test_dir: "test".to_string(),
            unit_target: "^TestUT_".to_string(),
            integration_target: "^TestIT_".to_string(),
            integration_timeout: "60m".to_string(),
            tools: ToolsConfig::default(),
            sandbox: SandboxConfig::default(),
        }
    }
}

impl DryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.test_dir.trim().is_empty() {
            return Err(anyhow!("test_dir must not be empty"));
        }
        if Path::new(&self.test_dir).is_absolute() {
            return Err(anyhow!("test_dir must be relative to the workspace root"));
        }
        if self.integration_timeout.trim().is_empty() {
            return Err(anyhow!("integration_timeout must not be empty"));
        }
        for (key, value) in [
            ("tools.cloud_cli", &self.tools.cloud_cli),
            ("tools.formatter", &self.tools.formatter),
            ("tools.test_tool", &self.tools.test_tool),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("{key} must not be empty"));
            }
        }
        if let Some(name) = &self.sandbox.account_name
            && name.trim().is_empty()
        {
            return Err(anyhow!("sandbox.account_name must not be blank when set"));
        }
        Ok(())
    }

    /// Test directory as passed to `go`, e.g. `./test/`.
    pub fn test_package(&self) -> String {
        format!("./{}/", self.test_dir.trim_matches('/'))
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `DryConfig::default()`.
pub fn load_config(path: &Path) -> Result<DryConfig> {
    if !path.exists() {
        let cfg = DryConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: DryConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid {}", path.display()))?;
    Ok(cfg)
}
