//! Typed failures raised at the external-tool and sandbox seams.
//!
//! Task bodies carry these inside `anyhow::Error`, so callers that need to
//! branch on the kind can `downcast_ref` while everyone else just prints them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start '{command}'")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' failed with {}:\n{output}", describe_code(*code))]
    Failed {
        command: String,
        code: Option<i32>,
        output: String,
    },

    #[error("'{command}' failed with {}", describe_code(*code))]
    Exited { command: String, code: Option<i32> },

    #[error("unrecognized response from '{command}': {detail}")]
    Unrecognized { command: String, detail: String },
}

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("unable to log in to the sandbox")]
    UnableToLogIn,

    #[error("sandbox.account_name is not configured in dry.toml")]
    NotConfigured,

    #[error("no subscription name contains '{target}'")]
    NoMatch { target: String },

    #[error("{} subscriptions match '{target}': {}", matches.len(), matches.join(", "))]
    Ambiguous { target: String, matches: Vec<String> },

    #[error("sandbox subscription id '{id}' is not a valid UUID")]
    MalformedId {
        id: String,
        #[source]
        source: uuid::Error,
    },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
