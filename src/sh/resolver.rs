//! Locating the file to run for a command name.
//!
//! A name containing `/` is checked as given. Anything else is looked up in the
//! search path, directory by directory. The first existing candidate decides the
//! outcome: a directory or a file without execute permission ends the search
//! with an error instead of moving on to later directories. POSIX shells keep
//! scanning in that case; this shell deliberately does not.

use crate::sh::error::ResolveError;
use log::debug;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub fn resolve(name: &str, search_paths: &[PathBuf], cwd: &Path) -> Result<PathBuf, ResolveError> {
    if name.is_empty() {
        return Err(ResolveError::NotFound);
    }

    if name.contains('/') {
        let path = cwd.join(name);
        if probe(&path)? {
            return Ok(path);
        }
        return Err(ResolveError::NotFound);
    }

    for dir in search_paths {
        let base = if dir.as_os_str().is_empty() {
            cwd.to_path_buf()
        } else {
            cwd.join(dir)
        };
        let candidate = base.join(name);
        if probe(&candidate)? {
            debug!("resolved {} to {}", name, candidate.display());
            return Ok(candidate);
        }
    }

    debug!("{} not found in {} search directories", name, search_paths.len());
    Err(ResolveError::NotFound)
}

/// `Ok(false)` when nothing exists at `path`; an error when something exists
/// but cannot be run.
fn probe(path: &Path) -> Result<bool, ResolveError> {
    let Ok(meta) = fs::metadata(path) else {
        return Ok(false);
    };
    if meta.is_dir() {
        debug!("{} is a directory", path.display());
        return Err(ResolveError::IsDirectory);
    }
    if meta.permissions().mode() & 0o111 == 0 {
        debug!("{} is not executable", path.display());
        return Err(ResolveError::PermissionDenied);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sh::testutil::TempDir;

    #[test]
    fn test_found_in_later_directory() {
        let tmp = TempDir::new("resolve-later");
        std::fs::create_dir_all(tmp.join("usr/bin")).unwrap();
        let tool = tmp.write_file("bin/tool", "#!/bin/sh\n", 0o755);

        let paths = vec![tmp.join("usr/bin"), tmp.join("bin")];
        assert_eq!(resolve("tool", &paths, tmp.path()), Ok(tool));
    }

    #[test]
    fn test_first_match_wins() {
        let tmp = TempDir::new("resolve-first");
        let first = tmp.write_file("a/tool", "", 0o755);
        tmp.write_file("b/tool", "", 0o755);

        let paths = vec![tmp.join("a"), tmp.join("b")];
        assert_eq!(resolve("tool", &paths, tmp.path()), Ok(first));
    }

    #[test]
    fn test_not_executable_is_permission_denied() {
        let tmp = TempDir::new("resolve-denied");
        tmp.write_file("bin/data", "", 0o644);

        let paths = vec![tmp.join("bin")];
        assert_eq!(resolve("data", &paths, tmp.path()), Err(ResolveError::PermissionDenied));
    }

    #[test]
    fn test_permission_denied_stops_the_search() {
        let tmp = TempDir::new("resolve-stop");
        tmp.write_file("a/tool", "", 0o644);
        tmp.write_file("b/tool", "", 0o755);

        let paths = vec![tmp.join("a"), tmp.join("b")];
        assert_eq!(resolve("tool", &paths, tmp.path()), Err(ResolveError::PermissionDenied));
    }

    #[test]
    fn test_directory_in_path_stops_the_search() {
        let tmp = TempDir::new("resolve-dir-in-path");
        std::fs::create_dir_all(tmp.join("a/tool")).unwrap();
        tmp.write_file("b/tool", "", 0o755);

        let paths = vec![tmp.join("a"), tmp.join("b")];
        assert_eq!(resolve("tool", &paths, tmp.path()), Err(ResolveError::IsDirectory));
    }

    #[test]
    fn test_explicit_paths() {
        let tmp = TempDir::new("resolve-explicit");
        let script = tmp.write_file("run.sh", "#!/bin/sh\n", 0o755);
        tmp.write_file("notes.txt", "", 0o644);

        let dir = tmp.path().to_string_lossy().into_owned();
        assert_eq!(resolve(&dir, &[], Path::new("/")), Err(ResolveError::IsDirectory));
        assert_eq!(resolve("./run.sh", &[], tmp.path()), Ok(tmp.path().join("./run.sh")));
        assert_eq!(resolve(&script.to_string_lossy(), &[], Path::new("/")), Ok(script));
        assert_eq!(resolve("./notes.txt", &[], tmp.path()), Err(ResolveError::PermissionDenied));
        assert_eq!(resolve("./missing", &[], tmp.path()), Err(ResolveError::NotFound));
    }

    #[test]
    fn test_not_found() {
        let tmp = TempDir::new("resolve-missing");
        let paths = vec![tmp.join("nowhere"), tmp.path().to_path_buf()];
        assert_eq!(resolve("nonexistentcmd123", &paths, tmp.path()), Err(ResolveError::NotFound));
        assert_eq!(resolve("", &paths, tmp.path()), Err(ResolveError::NotFound));
    }

    #[test]
    fn test_empty_entry_means_cwd() {
        let tmp = TempDir::new("resolve-cwd");
        let tool = tmp.write_file("tool", "", 0o700);
        assert_eq!(resolve("tool", &[PathBuf::new()], tmp.path()), Ok(tool));
    }
}
