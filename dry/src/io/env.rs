//! Snapshot of the environment variables the tasks consult.
//!
//! Tasks never read the process environment directly; `main` snapshots it once
//! and tests build their own [`TaskEnv`] without touching global state.

use std::collections::BTreeMap;

use crate::core::types::Suite;

/// Service principal variables honoured by the Terraform azurerm provider.
pub const SERVICE_PRINCIPAL_VARS: [&str; 4] = [
    "ARM_CLIENT_ID",
    "ARM_CLIENT_SECRET",
    "ARM_SUBSCRIPTION_ID",
    "ARM_TENANT_ID",
];

/// Overrides for the `go test -run` filter.
pub const UNIT_TARGET_VAR: &str = "MAGE_TARGET_UT";
pub const INTEGRATION_TARGET_VAR: &str = "MAGE_TARGET_IT";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEnv {
    vars: BTreeMap<String, String>,
}

impl TaskEnv {
    /// Capture the variables `dry` cares about from the current process.
    pub fn from_process() -> Self {
        let vars = SERVICE_PRINCIPAL_VARS
            .iter()
            .chain(&[UNIT_TARGET_VAR, INTEGRATION_TARGET_VAR])
            .filter_map(|key| {
                std::env::var_os(key)
                    .map(|value| (key.to_string(), value.to_string_lossy().into_owned()))
            })
            .collect();
        Self { vars }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// True when all four `ARM_*` variables are present (values are not checked).
    pub fn has_service_principal(&self) -> bool {
        SERVICE_PRINCIPAL_VARS
            .iter()
            .all(|key| self.vars.contains_key(*key))
    }

    /// Test filter override for `suite`, if one was exported.
    pub fn target_override(&self, suite: Suite) -> Option<&str> {
        match suite {
            Suite::Unit => self.get(UNIT_TARGET_VAR),
            Suite::Integration => self.get(INTEGRATION_TARGET_VAR),
        }
    }
}
