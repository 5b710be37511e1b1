//! Removal of transient Terraform and coverage artifacts from a workspace.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::core::artifacts::{SweepAction, classify};

/// Paths removed by one [`clean`] pass, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub removed: Vec<PathBuf>,
}

/// Walk `root` and delete every transient artifact below it.
///
/// `vendor` directories are never entered and `.terraform` caches are removed
/// whole. The root itself is never removed. Walk and permission errors abort
/// the pass; an artifact that disappears before it can be removed is ignored.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn clean(root: &Path) -> Result<CleanReport> {
    let mut report = CleanReport::default();
    let mut walker = WalkDir::new(root).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.with_context(|| format!("walk {}", root.display()))?;
        if entry.depth() == 0 {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        let is_dir = entry.file_type().is_dir();
        let removed = match classify(&name, is_dir) {
            SweepAction::Keep => false,
            SweepAction::SkipDir => {
                debug!(path = %entry.path().display(), "skipping directory");
                walker.skip_current_dir();
                false
            }
            SweepAction::RemoveDir => {
                walker.skip_current_dir();
                remove(entry.path(), true)?
            }
            SweepAction::RemoveFile => remove(entry.path(), false)?,
        };

        if removed {
            let shown = entry.path().strip_prefix(root).unwrap_or(entry.path());
            println!("Removed '{}'", shown.display());
            report.removed.push(entry.path().to_path_buf());
        }
    }

    debug!(removed = report.removed.len(), "clean finished");
    Ok(report)
}

fn remove(path: &Path, is_dir: bool) -> Result<bool> {
    let result = if is_dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err).with_context(|| format!("remove {}", path.display())),
    }
}
