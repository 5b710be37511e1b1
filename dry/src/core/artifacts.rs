//! Classification of workspace entries left behind by Terraform and Go tooling.

/// Directory holding vendored third-party code. Never scanned.
pub const VENDOR_DIR: &str = "vendor";
/// Per-module provider and module cache written by `terraform init`.
pub const TERRAFORM_CACHE_DIR: &str = ".terraform";

const TRANSIENT_FILES: [&str; 3] = [
    "terraform.tfstate",
    "terraform.tfplan",
    "terraform.tfstate.backup",
];

const COVERAGE_PREFIX: &str = "coverage.";
const COVERAGE_SUFFIX: &str = ".out";

/// What the sweeper should do with a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepAction {
    /// Leave the entry alone and continue walking.
    Keep,
    /// Leave the directory alone and do not descend into it.
    SkipDir,
    /// Remove the directory with everything below it.
    RemoveDir,
    /// Remove the file.
    RemoveFile,
}

/// Decide what to do with an entry named `name`.
pub fn classify(name: &str, is_dir: bool) -> SweepAction {
    if is_dir {
        return match name {
            VENDOR_DIR => SweepAction::SkipDir,
            TERRAFORM_CACHE_DIR => SweepAction::RemoveDir,
            _ => SweepAction::Keep,
        };
    }
    if TRANSIENT_FILES.contains(&name) || is_coverage_file(name) {
        SweepAction::RemoveFile
    } else {
        SweepAction::Keep
    }
}

/// True for names like `coverage.2024-01-01T00:00:00Z.out`.
pub fn is_coverage_file(name: &str) -> bool {
    name.starts_with(COVERAGE_PREFIX) && name.ends_with(COVERAGE_SUFFIX)
}

/// Coverage profile name for a run started at `timestamp` (RFC 3339).
pub fn coverage_file_name(timestamp: &str) -> String {
    format!("{COVERAGE_PREFIX}{timestamp}{COVERAGE_SUFFIX}")
}
