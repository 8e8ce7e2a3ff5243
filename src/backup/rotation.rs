//! Keep the newest N archives of each source, delete the rest.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

use super::archive::{archive_source, list_archives};

/// What a rotation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationOutcome {
    /// Archives still present, newest first.
    pub kept: Vec<PathBuf>,
    /// Archives deleted, newest first.
    pub removed: Vec<PathBuf>,
}

/// Delete archives with `prefix` in `dest` beyond the `max_backups` newest
/// of each source.
///
/// The source is read back from the archive name, so backups of different
/// directories sharing a destination never evict each other. Names without
/// a timestamp share one pool.
///
/// Creation and pruning are separate steps: a crash between them can
/// leave more than `max_backups` archives until the next rotation.
pub fn rotate(dest: &Path, prefix: &str, max_backups: usize) -> Result<RotationOutcome> {
    let archives = list_archives(dest, prefix)?;
    let mut outcome = RotationOutcome::default();
    let mut per_source: HashMap<String, usize> = HashMap::new();

    for archive in archives {
        let name = archive.file_name();
        let source = archive_source(&name, prefix).unwrap_or_default().to_string();
        let seen = per_source.entry(source).or_default();
        *seen += 1;
        if *seen <= max_backups {
            outcome.kept.push(archive.path);
        } else {
            tracing::info!("Removing old backup {}", archive.path.display());
            fs::remove_file(&archive.path)?;
            outcome.removed.push(archive.path);
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    /// Write `count` archives whose mtimes increase with their index.
    fn seed(dir: &Path, count: usize) -> Vec<PathBuf> {
        let base = SystemTime::now() - Duration::from_secs(10_000);
        (0..count)
            .map(|i| {
                let path = dir.join(format!("backup_site_2024010{}_000000.tar.gz", i));
                fs::write(&path, "x").unwrap();
                let file = fs::File::options().write(true).open(&path).unwrap();
                file.set_modified(base + Duration::from_secs(i as u64 * 60))
                    .unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn under_limit_keeps_everything() {
        let temp = TempDir::new().unwrap();
        seed(temp.path(), 3);

        let outcome = rotate(temp.path(), "backup", 5).unwrap();

        assert_eq!(outcome.kept.len(), 3);
        assert!(outcome.removed.is_empty());
    }

    #[test]
    fn new_backup_over_limit_removes_only_oldest() {
        let temp = TempDir::new().unwrap();
        let existing = seed(temp.path(), 5);

        // The sixth, newest archive.
        let newest = temp.path().join("backup_site_20240201_000000.tar.gz");
        fs::write(&newest, "x").unwrap();

        let outcome = rotate(temp.path(), "backup", 5).unwrap();

        assert_eq!(outcome.removed, vec![existing[0].clone()]);
        assert_eq!(outcome.kept.len(), 5);
        assert_eq!(outcome.kept[0], newest);
        assert!(newest.exists());
        assert!(!existing[0].exists());
    }

    #[test]
    fn repeated_rotation_stabilizes_at_limit() {
        let temp = TempDir::new().unwrap();
        seed(temp.path(), 9);

        let first = rotate(temp.path(), "backup", 5).unwrap();
        let second = rotate(temp.path(), "backup", 5).unwrap();

        assert_eq!(first.removed.len(), 4);
        assert_eq!(second.kept.len(), 5);
        assert!(second.removed.is_empty());
    }

    #[test]
    fn ignores_foreign_files() {
        let temp = TempDir::new().unwrap();
        seed(temp.path(), 6);
        fs::write(temp.path().join("important.tar.gz"), "keep me").unwrap();

        rotate(temp.path(), "backup", 5).unwrap();

        assert!(temp.path().join("important.tar.gz").exists());
    }

    #[test]
    fn sources_rotate_independently() {
        let temp = TempDir::new().unwrap();
        let docs = temp.path().join("backup_docs_20231201_000000.tar.gz");
        fs::write(&docs, "x").unwrap();
        let file = fs::File::options().write(true).open(&docs).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(50_000))
            .unwrap();
        let sites = seed(temp.path(), 6);

        let outcome = rotate(temp.path(), "backup", 5).unwrap();

        assert_eq!(outcome.removed, vec![sites[0].clone()]);
        assert_eq!(outcome.kept.len(), 6);
        assert!(docs.exists());
    }

    #[test]
    fn zero_limit_removes_all() {
        let temp = TempDir::new().unwrap();
        seed(temp.path(), 2);

        let outcome = rotate(temp.path(), "backup", 0).unwrap();

        assert!(outcome.kept.is_empty());
        assert_eq!(outcome.removed.len(), 2);
    }
}
