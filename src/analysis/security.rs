//! Local security checks: file permissions, login accounts, sshd settings.

use std::path::{Path, PathBuf};

/// Why a path was flagged by [`scan_permissions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionIssue {
    WorldWritable,
    SetUid,
    SetGid,
}

impl PermissionIssue {
    pub fn label(&self) -> &'static str {
        match self {
            Self::WorldWritable => "world-writable",
            Self::SetUid => "setuid",
            Self::SetGid => "setgid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionFinding {
    pub path: PathBuf,
    pub mode: u32,
    pub issue: PermissionIssue,
}

/// Issues implied by a unix mode. Sticky world-writable dirs (like /tmp) are fine.
pub fn mode_issues(mode: u32, is_dir: bool) -> Vec<PermissionIssue> {
    let mut issues = Vec::new();
    let sticky = mode & 0o1000 != 0;
    if mode & 0o002 != 0 && !(is_dir && sticky) {
        issues.push(PermissionIssue::WorldWritable);
    }
    if !is_dir && mode & 0o4000 != 0 {
        issues.push(PermissionIssue::SetUid);
    }
    if !is_dir && mode & 0o2000 != 0 {
        issues.push(PermissionIssue::SetGid);
    }
    issues
}

/// Walk `root` and report risky permission bits. Unreadable entries are skipped.
#[cfg(unix)]
pub fn scan_permissions(root: &Path) -> Vec<PermissionFinding> {
    use std::os::unix::fs::PermissionsExt;
    use walkdir::WalkDir;

    let mut findings = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!("Skipping unreadable entry: {}", err);
                continue;
            }
        };
        if entry.path_is_symlink() {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let mode = metadata.permissions().mode() & 0o7777;
        for issue in mode_issues(mode, metadata.is_dir()) {
            findings.push(PermissionFinding {
                path: entry.path().to_path_buf(),
                mode,
                issue,
            });
        }
    }
    findings
}

#[cfg(not(unix))]
pub fn scan_permissions(_root: &Path) -> Vec<PermissionFinding> {
    Vec::new()
}

/// One `/etc/passwd` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub uid: u32,
    pub home: String,
    pub shell: String,
}

impl Account {
    pub fn can_login(&self) -> bool {
        !(self.shell.is_empty()
            || self.shell.ends_with("/nologin")
            || self.shell.ends_with("/false")
            || self.shell == "/bin/sync")
    }

    pub fn is_root_equivalent(&self) -> bool {
        self.uid == 0
    }
}

/// Parse passwd-format content; malformed lines are ignored.
pub fn parse_passwd(content: &str) -> Vec<Account> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(':').collect();
            if fields.len() < 7 {
                return None;
            }
            Some(Account {
                name: fields[0].to_string(),
                uid: fields[2].parse().ok()?,
                home: fields[5].to_string(),
                shell: fields[6].to_string(),
            })
        })
        .collect()
}

/// Verdict for one sshd setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshFinding {
    pub key: &'static str,
    /// `None` when the key is absent and the compiled-in default applies.
    pub value: Option<String>,
    pub ok: bool,
    pub advice: &'static str,
}

/// Keys audited, the value considered safe, and what to do otherwise.
const SSH_CHECKS: &[(&str, &str, &str)] = &[
    ("PermitRootLogin", "no", "Disable direct root login"),
    ("PasswordAuthentication", "no", "Use key-based authentication"),
    ("Protocol", "2", "Only allow SSH protocol 2"),
    ("X11Forwarding", "no", "Disable X11 forwarding"),
];

/// Audit `sshd_config` content. First occurrence of a key wins, like sshd.
pub fn audit_sshd_config(content: &str) -> Vec<SshFinding> {
    let lookup = |key: &str| -> Option<String> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with('#'))
            // Settings after a Match block are conditional.
            .take_while(|line| !line.to_lowercase().starts_with("match "))
            .find_map(|line| {
                let mut parts = line.split_whitespace();
                let name = parts.next()?;
                if name.eq_ignore_ascii_case(key) {
                    Some(parts.collect::<Vec<_>>().join(" "))
                } else {
                    None
                }
            })
    };

    SSH_CHECKS
        .iter()
        .map(|&(key, safe, advice)| {
            let value = lookup(key);
            // Modern sshd defaults: root login prohibit-password, protocol 2 only,
            // password auth on, X11 off.
            let ok = match (&value, key) {
                (Some(v), "PermitRootLogin") => {
                    v.eq_ignore_ascii_case(safe) || v.eq_ignore_ascii_case("prohibit-password")
                }
                (Some(v), _) => v.eq_ignore_ascii_case(safe),
                (None, "PermitRootLogin" | "Protocol" | "X11Forwarding") => true,
                (None, _) => false,
            };
            SshFinding {
                key,
                value,
                ok,
                advice,
            }
        })
        .collect()
}
