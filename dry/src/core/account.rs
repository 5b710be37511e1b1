//! Interpretation of the cloud CLI's JSON account output.

use serde::Deserialize;
use uuid::Uuid;

use crate::error::SandboxError;

/// `state` reported for an account the CLI can use.
pub const ENABLED_STATE: &str = "Enabled";

/// Fragment of the message the CLI prints when no session exists.
const LOGIN_REQUIRED_MARKER: &str = "Please run 'az login'";

/// One entry of `az account show` / `az account list` output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
}

impl Account {
    pub fn is_enabled(&self) -> bool {
        self.state.as_deref() == Some(ENABLED_STATE)
    }
}

/// Parse `az account show --output json`.
pub fn parse_account(raw: &str) -> serde_json::Result<Account> {
    serde_json::from_str(raw)
}

/// Parse `az account list --output json`.
pub fn parse_account_list(raw: &str) -> serde_json::Result<Vec<Account>> {
    serde_json::from_str(raw)
}

/// True if the CLI's error output says the caller must log in first.
pub fn is_login_required(output: &str) -> bool {
    output.lines().any(|line| {
        let line = line.trim();
        let line = line.strip_prefix("ERROR:").unwrap_or(line).trim_start();
        line.starts_with(LOGIN_REQUIRED_MARKER)
    })
}

/// Pick the single account whose name contains `target` and return its id.
///
/// Zero or several matches are errors, as is an id that does not parse as a UUID.
pub fn select_sandbox(accounts: &[Account], target: &str) -> Result<Uuid, SandboxError> {
    let matches: Vec<&Account> = accounts
        .iter()
        .filter(|account| account.name.contains(target))
        .collect();

    let account = match matches.as_slice() {
        [] => {
            return Err(SandboxError::NoMatch {
                target: target.to_string(),
            });
        }
        [account] => *account,
        many => {
            return Err(SandboxError::Ambiguous {
                target: target.to_string(),
                matches: many.iter().map(|a| a.name.clone()).collect(),
            });
        }
    };

    let id = account.id.trim();
    Uuid::try_parse(id).map_err(|source| SandboxError::MalformedId {
        id: id.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &str = r#"[
        {"id": "6f1c1f3e-2b7a-4d0e-9a51-0c6b2f1f0a01", "name": "Team Sandbox", "state": "Enabled"},
        {"id": "0d0e8c9a-77a8-4c8a-b3f5-4a9d3c1e2b02", "name": "Production", "state": "Enabled"},
        {"id": "a1b2c3d4-0000-4000-8000-000000000003", "name": "Shared Sandbox", "state": "Disabled"}
    ]"#;

    #[test]
    fn show_output_with_enabled_state_is_enabled() {
        let raw = r#"{"id": "x", "name": "Team Sandbox", "state": "Enabled", "isDefault": true}"#;
        let account = parse_account(raw).expect("parse");
        assert!(account.is_enabled());
    }

    #[test]
    fn show_output_without_state_has_no_state() {
        let account = parse_account(r#"{"id": "x", "name": "n"}"#).expect("parse");
        assert_eq!(account.state, None);
        assert!(!account.is_enabled());
    }

    #[test]
    fn login_required_matches_cli_message() {
        assert!(is_login_required(
            "ERROR: Please run 'az login' to setup account.\n"
        ));
        assert!(is_login_required(
            "WARNING: something\nPlease run 'az login' to setup account."
        ));
        assert!(!is_login_required("ERROR: network unreachable"));
    }

    #[test]
    fn login_required_found_below_an_unrelated_first_line() {
        let output = "ERROR: AADSTS700082: The refresh token has expired.\n\
                      Please run 'az login' to setup account.";
        assert!(is_login_required(output));
    }

    #[test]
    fn selects_single_match() {
        let accounts = parse_account_list(LIST).expect("parse");
        let id = select_sandbox(&accounts, "Team").expect("select");
        assert_eq!(id.to_string(), "6f1c1f3e-2b7a-4d0e-9a51-0c6b2f1f0a01");
    }

    #[test]
    fn zero_matches_fail() {
        let accounts = parse_account_list(LIST).expect("parse");
        let err = select_sandbox(&accounts, "Staging").expect_err("no match");
        assert!(matches!(err, SandboxError::NoMatch { .. }));
    }

    #[test]
    fn multiple_matches_fail_instead_of_picking_one() {
        let accounts = parse_account_list(LIST).expect("parse");
        let err = select_sandbox(&accounts, "Sandbox").expect_err("ambiguous");
        match err {
            SandboxError::Ambiguous { matches, .. } => {
                assert_eq!(matches, vec!["Team Sandbox", "Shared Sandbox"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_id_fails() {
        let accounts = vec![Account {
            id: "not-a-guid".to_string(),
            name: "Sandbox".to_string(),
            state: None,
        }];
        let err = select_sandbox(&accounts, "Sandbox").expect_err("malformed");
        assert!(matches!(err, SandboxError::MalformedId { .. }));
    }
}
