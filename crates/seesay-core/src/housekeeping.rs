//! Removal of generated files past the retention window.
//!
//! Best effort: each deletion stands alone, failures are logged and
//! counted, and the scan always covers every entry.

use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};
use walkdir::WalkDir;

/// Outcome of one cleanup pass over a directory.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    /// Files deleted
    pub removed: usize,
    /// Files that were old enough but could not be deleted
    pub failed: usize,
}

impl std::ops::AddAssign for CleanupReport {
    fn add_assign(&mut self, other: Self) {
        self.removed += other.removed;
        self.failed += other.failed;
    }
}

/// Delete regular files directly inside `dir` whose age is at least `max_age`.
pub fn cleanup_old_files(dir: &Path, max_age: Duration) -> CleanupReport {
    cleanup_older_than(dir, max_age, SystemTime::now())
}

/// [`cleanup_old_files`] with an explicit reference time.
pub fn cleanup_older_than(dir: &Path, max_age: Duration, now: SystemTime) -> CleanupReport {
    cleanup_with(dir, max_age, now, |path| std::fs::remove_file(path))
}

fn cleanup_with(
    dir: &Path,
    max_age: Duration,
    now: SystemTime,
    remove: impl Fn(&Path) -> io::Result<()>,
) -> CleanupReport {
    let mut report = CleanupReport::default();
    if !dir.is_dir() {
        tracing::debug!("Cleanup skipped, {} is not a directory", dir.display());
        return report;
    }

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        let modified = match entry.metadata().ok().and_then(|m| m.modified().ok()) {
            Some(modified) => modified,
            None => {
                tracing::warn!("Cannot read modification time of {}", path.display());
                continue;
            }
        };
        // Files stamped in the future count as brand new
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age < max_age {
            continue;
        }

        match remove(path) {
            Ok(()) => {
                tracing::info!("Cleaned up old file: {}", path.display());
                report.removed += 1;
            }
            Err(e) => {
                tracing::error!("Error cleaning up file {}: {e}", path.display());
                report.failed += 1;
            }
        }
    }

    report
}
