//! Task identities shared by the CLI and the task bodies.

use std::fmt;

/// Every task `dry` knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskName {
    /// Unit then integration tests.
    Full,
    Clean,
    Format,
    Unit,
    Integration,
    Cover,
    SelectSandbox,
    LoginSandbox,
}

impl TaskName {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskName::Full => "full",
            TaskName::Clean => "clean",
            TaskName::Format => "format",
            TaskName::Unit => "unit",
            TaskName::Integration => "integration",
            TaskName::Cover => "cover",
            TaskName::SelectSandbox => "select-sandbox",
            TaskName::LoginSandbox => "login-sandbox",
        }
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two `go test` flavours driven by the test tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suite {
    Unit,
    Integration,
}

impl Suite {
    pub fn label(self) -> &'static str {
        match self {
            Suite::Unit => "unit",
            Suite::Integration => "integration",
        }
    }
}
