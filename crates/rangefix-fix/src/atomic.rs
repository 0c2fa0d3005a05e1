// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Crash-safe file replacement.
//!
//! New content goes to `<name>.new.<random>` next to the target and is
//! renamed over it once fully written and synced. Until the rename the
//! target is untouched; if anything fails the temporary file is removed.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Random characters `tempfile` appends after the prefix.
const RANDOM_LEN: usize = 6;

/// Replace the contents of `path` with `contents`, keeping its permissions.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    write_atomic_with(path, |file| file.write_all(contents))
}

/// Like [`write_atomic`], with the content produced by `write`.
pub fn write_atomic_with(
    path: &Path,
    write: impl FnOnce(&mut fs::File) -> io::Result<()>,
) -> io::Result<()> {
    let parent = parent_dir(path);
    let prefix = temp_prefix(path)?;

    // Dropping `tmp` on an early return deletes the temporary file.
    let mut tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .rand_bytes(RANDOM_LEN)
        .tempfile_in(parent)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;

    match fs::metadata(path) {
        Ok(meta) => fs::set_permissions(tmp.path(), meta.permissions())?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }

    tmp.persist(path).map_err(|err| err.error)?;
    sync_dir_best_effort(parent);
    Ok(())
}

/// Delete temporaries for `path` left behind by an interrupted write.
/// Returns how many were removed.
pub fn remove_stale_temp_files(path: &Path) -> io::Result<usize> {
    let prefix = temp_prefix(path)?;
    let prefix = prefix.to_string_lossy();
    let mut removed = 0;

    for entry in fs::read_dir(parent_dir(path))? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let is_stale = name
            .strip_prefix(&*prefix)
            .is_some_and(|rest| rest.len() == RANDOM_LEN && rest.chars().all(|c| c.is_ascii_alphanumeric()));
        if !is_stale || !entry.file_type()?.is_file() {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => {
                tracing::debug!(path = %entry.path().display(), "removed stale temporary file");
                removed += 1;
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
    }
    Ok(removed)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn temp_prefix(path: &Path) -> io::Result<OsString> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let mut prefix = name.to_os_string();
    prefix.push(".new.");
    Ok(prefix)
}

fn sync_dir_best_effort(dir: &Path) {
    #[cfg(unix)]
    {
        if let Err(err) = fs::File::open(dir).and_then(|dir| dir.sync_all()) {
            tracing::debug!(dir = %dir.display(), error = %err, "failed to sync directory");
        }
    }

    #[cfg(not(unix))]
    let _ = dir;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.go");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(entries(dir.path()), vec!["main.go"]);
    }

    #[test]
    fn failed_write_leaves_target_and_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.go");
        fs::write(&path, "old").unwrap();

        let err = write_atomic_with(&path, |file| {
            file.write_all(b"half")?;
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        })
        .unwrap_err();

        assert_eq!(err.to_string(), "disk full");
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert_eq!(entries(dir.path()), vec!["main.go"]);
    }

    #[cfg(unix)]
    #[test]
    fn permissions_kept() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.go");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&path, b"new").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn stale_temps_removed_others_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.go");
        fs::write(&path, "x").unwrap();
        fs::write(dir.path().join("a.go.new.Ab12cD"), "crashed").unwrap();
        fs::write(dir.path().join("a.go.new.toolongname"), "keep").unwrap();
        fs::write(dir.path().join("b.go.new.Ab12cD"), "other file").unwrap();

        assert_eq!(remove_stale_temp_files(&path).unwrap(), 1);
        assert_eq!(
            entries(dir.path()),
            vec!["a.go", "a.go.new.toolongname", "b.go.new.Ab12cD"]
        );
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone").join("a.go");
        assert!(write_atomic(&path, b"x").is_err());
    }
}
