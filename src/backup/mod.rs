//! Timestamped tar.gz backups with count-based rotation.
//!
//! Archives are named `<prefix>_<source>_<YYYYmmdd_HHMMSS>.tar.gz`. After
//! each new archive, [`rotate`] keeps the newest `max_backups` of every
//! source by modification time and deletes the rest.

pub mod archive;
pub mod rotation;

pub use archive::{
    archive_name, archive_source, create_archive, is_archive_name, list_archives, restore_archive,
    source_label, ArchiveInfo, ARCHIVE_EXTENSION,
};
pub use rotation::{rotate, RotationOutcome};
