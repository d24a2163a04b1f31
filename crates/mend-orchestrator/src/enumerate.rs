//! Source file enumeration

use mend_core::Result;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Relative paths of every file under `root` whose name ends with
/// `extension`, in traversal order. Nothing is excluded: hidden and vendored
/// directories are walked like any other.
///
/// Symlinks are not followed into directories, but a link to a file (or a
/// dangling link) counts as a file. Unreadable entries below the root are
/// logged and skipped; an unreadable root is an error.
pub fn list_source_files(root: &Path, extension: &str) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
            Err(e) => return Err(std::io::Error::from(e).into()),
        };
        if !is_file_like(&entry) {
            continue;
        }
        if !entry.file_name().to_string_lossy().ends_with(extension) {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(relative.to_string_lossy().into_owned());
        }
    }

    tracing::debug!(
        "Found {} {} files under {}",
        files.len(),
        extension,
        root.display()
    );
    Ok(files)
}

fn is_file_like(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_symlink() {
        return !std::fs::metadata(entry.path())
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
    }
    file_type.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_only_matching_extension() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("a.py"), "").unwrap();
        fs::write(temp.path().join("b.py"), "").unwrap();
        fs::write(temp.path().join("README.md"), "").unwrap();
        fs::write(temp.path().join("sub/c.py"), "").unwrap();

        let files: HashSet<String> = list_source_files(temp.path(), ".py")
            .unwrap()
            .into_iter()
            .collect();

        let expected: HashSet<String> = ["a.py", "b.py", "sub/c.py"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn test_hidden_directories_are_walked() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".venv/lib")).unwrap();
        fs::write(temp.path().join(".venv/lib/site.py"), "").unwrap();

        let files = list_source_files(temp.path(), ".py").unwrap();
        assert_eq!(files, vec![".venv/lib/site.py".to_string()]);
    }

    #[test]
    fn test_directory_named_like_source_is_skipped() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("pkg.py")).unwrap();

        assert!(list_source_files(temp.path(), ".py").unwrap().is_empty());
    }

    #[test]
    fn test_configurable_extension() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("main.rs"), "").unwrap();
        fs::write(temp.path().join("main.py"), "").unwrap();

        let files = list_source_files(temp.path(), ".rs").unwrap();
        assert_eq!(files, vec!["main.rs".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_file_is_listed() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("real.py"), "x = 1\n").unwrap();
        symlink(temp.path().join("real.py"), temp.path().join("link.py")).unwrap();

        let files: HashSet<String> = list_source_files(temp.path(), ".py")
            .unwrap()
            .into_iter()
            .collect();
        let expected: HashSet<String> = ["real.py", "link.py"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(files, expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_not_a_file() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("pkg")).unwrap();
        fs::write(temp.path().join("pkg/mod.py"), "").unwrap();
        symlink(temp.path().join("pkg"), temp.path().join("alias.py")).unwrap();

        let files = list_source_files(temp.path(), ".py").unwrap();
        assert_eq!(files, vec!["pkg/mod.py".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.py"), "").unwrap();
        let locked = temp.path().join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let result = list_source_files(temp.path(), ".py");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(result.unwrap().contains(&"a.py".to_string()));
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(list_source_files(&temp.path().join("nope"), ".py").is_err());
    }
}
