//! Archive naming, creation, listing and restore.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use regex::Regex;

use crate::error::{OpsError, Result};
use crate::shell::{Invocation, ToolRunner};

/// Extension every archive carries.
pub const ARCHIVE_EXTENSION: &str = ".tar.gz";

/// A backup archive found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInfo {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

impl ArchiveInfo {
    /// File name without directory.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Label used for `source` inside archive names.
///
/// Characters outside `[A-Za-z0-9._-]` become `_`; the filesystem root is
/// called `root`.
pub fn source_label(source: &Path) -> String {
    let base = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if base.is_empty() {
        return "root".to_string();
    }
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<prefix>_<source>_<YYYYmmdd_HHMMSS>.tar.gz`
pub fn archive_name(prefix: &str, source: &Path, timestamp: DateTime<Local>) -> String {
    format!(
        "{}_{}_{}{}",
        prefix,
        source_label(source),
        timestamp.format("%Y%m%d_%H%M%S"),
        ARCHIVE_EXTENSION
    )
}

/// Whether `file_name` is an archive produced with `prefix`.
pub fn is_archive_name(file_name: &str, prefix: &str) -> bool {
    file_name.starts_with(&format!("{}_", prefix)) && file_name.ends_with(ARCHIVE_EXTENSION)
}

fn stamped_stem() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+)_\d{8}_\d{6}(?:_\d+)?$").expect("static regex"))
}

/// Source label of an archive named by [`archive_name`], if `file_name` is one.
///
/// A `_N` suffix added for same-second backups is accepted.
pub fn archive_source<'a>(file_name: &'a str, prefix: &str) -> Option<&'a str> {
    let stem = file_name
        .strip_prefix(prefix)?
        .strip_prefix('_')?
        .strip_suffix(ARCHIVE_EXTENSION)?;
    stamped_stem()
        .captures(stem)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Pick a path in `dest` that does not exist yet.
///
/// Two backups of the same source within one second get `_2`, `_3`, ...
/// appended before the extension.
fn unique_archive_path(dest: &Path, name: &str) -> PathBuf {
    let candidate = dest.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let stem = name.trim_end_matches(ARCHIVE_EXTENSION);
    (2..)
        .map(|n| dest.join(format!("{}_{}{}", stem, n, ARCHIVE_EXTENSION)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Archive `source` into `dest`, returning the new archive's path.
///
/// # Errors
///
/// `Precondition` if the source does not exist; `CommandFailed` with tar's
/// own diagnostic if tar fails (the partial archive is removed).
pub fn create_archive(
    runner: &dyn ToolRunner,
    source: &Path,
    dest: &Path,
    prefix: &str,
    timestamp: DateTime<Local>,
) -> Result<PathBuf> {
    if !source.exists() {
        return Err(OpsError::Precondition {
            path: source.to_path_buf(),
            message: "Backup source does not exist".to_string(),
        });
    }

    fs::create_dir_all(dest)?;

    let source = fs::canonicalize(source)?;
    let archive = unique_archive_path(dest, &archive_name(prefix, &source, timestamp));

    let parent = source
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"));
    let member = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string());

    let invocation = Invocation::new("tar")
        .arg("-czf")
        .arg(archive.display().to_string())
        .arg("-C")
        .arg(parent.display().to_string())
        .arg(member);

    let result = runner
        .run(&invocation)
        .and_then(|out| out.into_result(&invocation));

    if let Err(e) = result {
        let _ = fs::remove_file(&archive);
        return Err(e);
    }

    tracing::debug!("Created archive {}", archive.display());
    Ok(archive)
}

/// Extract `archive` into `target`, creating the target directory.
pub fn restore_archive(runner: &dyn ToolRunner, archive: &Path, target: &Path) -> Result<()> {
    if !archive.is_file() {
        return Err(OpsError::Precondition {
            path: archive.to_path_buf(),
            message: "Backup archive not found".to_string(),
        });
    }

    fs::create_dir_all(target)?;

    let invocation = Invocation::new("tar")
        .arg("-xzf")
        .arg(archive.display().to_string())
        .arg("-C")
        .arg(target.display().to_string());

    runner.run(&invocation)?.into_result(&invocation)?;
    Ok(())
}

/// Archives with `prefix` in `dest`, newest first.
///
/// Ordered by modification time, then by name so archives written within
/// the same clock tick still sort deterministically. A missing directory
/// has no archives.
pub fn list_archives(dest: &Path, prefix: &str) -> Result<Vec<ArchiveInfo>> {
    if !dest.is_dir() {
        return Ok(Vec::new());
    }

    let mut archives = Vec::new();
    for entry in fs::read_dir(dest)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !is_archive_name(&name, prefix) {
            continue;
        }
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        archives.push(ArchiveInfo {
            path: entry.path(),
            size: meta.len(),
            modified: meta.modified()?,
        });
    }

    archives.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| b.path.cmp(&a.path))
    });
    Ok(archives)
}
