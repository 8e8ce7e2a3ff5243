//! In-process analysis of logs, text files and local system state.
//!
//! These helpers replace the grep/awk/sed pipelines a shell tool would use.
//! They are pure over `&str` so commands read the file once and tests need
//! no fixtures.

pub mod logs;
pub mod security;
pub mod system;
pub mod text;

use std::fs;
use std::path::Path;

use crate::error::{OpsError, Result};

/// Read a whole text file the user named on the command line.
///
/// A missing file is a precondition failure rather than an IO error.
pub fn read_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(OpsError::Precondition {
            path: path.to_path_buf(),
            message: "File not found".to_string(),
        });
    }
    if path.is_dir() {
        return Err(OpsError::Precondition {
            path: path.to_path_buf(),
            message: "Expected a file, found a directory".to_string(),
        });
    }
    Ok(fs::read_to_string(path)?)
}
