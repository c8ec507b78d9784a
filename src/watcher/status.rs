// src/watcher/status.rs

//! Pre-flight classification of watch targets.

use std::fs;
use std::path::Path;

/// What a prospective watch target is on disk.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum PathStatus {
    /// Nothing usable at the path. Classification failures (permissions,
    /// over-long names) collapse into this from the engine's point of view.
    NonExisting,

    /// A regular file.
    RegularFile,

    /// A directory.
    Directory,

    /// Exists, but is a symlink, socket, device or other special entry.
    Other,
}

/// Classify `path` without following symlinks.
pub(super) fn path_status(path: &Path) -> PathStatus {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_file() => PathStatus::RegularFile,
        Ok(metadata) if metadata.is_dir() => PathStatus::Directory,
        Ok(_) => PathStatus::Other,
        Err(_) => PathStatus::NonExisting,
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::os::unix::fs::symlink;

    use crate::test;

    use super::{path_status, PathStatus};

    #[test]
    fn classifies_files_directories_and_absences() -> test::Result {
        let tempdir = tempfile::tempdir()?;

        let file_path = tempdir.path().join("a.txt");
        File::create(&file_path)?;

        assert_eq!(path_status(tempdir.path()), PathStatus::Directory);
        assert_eq!(path_status(&file_path), PathStatus::RegularFile);
        assert_eq!(
            path_status(&tempdir.path().join("missing")),
            PathStatus::NonExisting
        );

        Ok(())
    }

    #[test]
    fn symlinks_are_not_followed() -> test::Result {
        let tempdir = tempfile::tempdir()?;

        let target = tempdir.path().join("target");
        File::create(&target)?;
        let link = tempdir.path().join("link");
        symlink(&target, &link)?;

        assert_eq!(path_status(&link), PathStatus::Other);

        Ok(())
    }
}
