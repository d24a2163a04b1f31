//! Workspace management: the one place repository names become paths

use chrono::Utc;
use mend_core::{MendError, Result, WorkspaceConfig};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

const BACKUP_STAMP: &str = "%Y%m%dT%H%M%S%.3fZ";

/// Derive a repository name from its URL: the last `/`-separated segment,
/// taken verbatim (`https://host/org/app.git` becomes `app.git`).
pub fn repo_name_from_url(url: &str) -> Result<String> {
    let name = url.trim().rsplit('/').next().unwrap_or_default();
    validate_repo_name(name)?;
    Ok(name.to_string())
}

/// A repository name must be exactly one normal path component.
fn validate_repo_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );

    if name.is_empty() || !single_normal || name.contains(|c| c == '/' || c == '\\') {
        return Err(MendError::InvalidInput(format!(
            "invalid repository name: {:?}",
            name
        )));
    }
    Ok(())
}

/// Validate a file path supplied by a caller: relative, no `..`.
pub fn validate_file_path(path: &str) -> Result<PathBuf> {
    let path = Path::new(path);

    if path.as_os_str().is_empty() {
        return Err(MendError::InvalidInput("empty file path".to_string()));
    }

    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(MendError::InvalidInput(format!(
                    "Path traversal not allowed: {}",
                    path.display()
                )));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(MendError::InvalidInput(format!(
                    "Absolute paths not allowed: {}",
                    path.display()
                )));
            }
        }
    }

    Ok(path.to_path_buf())
}

/// Maps repository names to checkout directories under a base directory
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    base_dir: PathBuf,
    backup_dir: Option<PathBuf>,
    backup_keep: usize,
}

impl WorkspaceManager {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            backup_dir: None,
            backup_keep: 0,
        }
    }

    /// Move replaced checkouts into `backup_dir` instead of deleting them
    pub fn with_backup_dir(mut self, backup_dir: Option<PathBuf>) -> Self {
        self.backup_dir = backup_dir;
        self
    }

    /// Keep at most `keep` backups per repository name (0 keeps all)
    pub fn with_backup_keep(mut self, keep: usize) -> Self {
        self.backup_keep = keep;
        self
    }

    pub fn from_config(config: &WorkspaceConfig) -> Self {
        let backup_dir = config
            .backup_on_reclone
            .then(|| config.backup_dir.clone());
        Self::new(config.base_dir.clone())
            .with_backup_dir(backup_dir)
            .with_backup_keep(config.backup_keep)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path for a repository name. Does not check existence.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        validate_repo_name(name)?;
        Ok(self.base_dir.join(name))
    }

    /// Path of an existing checkout, or `NotFound`
    pub async fn resolve_existing(&self, name: &str) -> Result<PathBuf> {
        let path = self.resolve(name)?;
        if is_dir(&path).await {
            Ok(path)
        } else {
            Err(MendError::NotFound("Repository not found".to_string()))
        }
    }

    /// Absolute path of an existing file inside an existing checkout
    pub async fn resolve_file(&self, name: &str, file_path: &str) -> Result<PathBuf> {
        let repo = self.resolve_existing(name).await?;
        let relative = validate_file_path(file_path)?;
        let path = repo.join(relative);

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(MendError::NotFound("File not found".to_string())),
        }
    }

    /// Clear the checkout location for `name` and return it.
    ///
    /// An existing checkout is moved to the backup directory when one is
    /// configured, otherwise removed recursively.
    pub async fn prepare_for_clone(&self, name: &str) -> Result<PathBuf> {
        let path = self.resolve(name)?;
        tokio::fs::create_dir_all(&self.base_dir).await?;

        let existing = match tokio::fs::symlink_metadata(&path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(path),
            Err(e) => return Err(e.into()),
        };

        match &self.backup_dir {
            Some(backup_dir) => {
                tokio::fs::create_dir_all(backup_dir).await?;
                let stamp = Utc::now().format(BACKUP_STAMP);
                let target = backup_dir.join(format!("{}-{}", name, stamp));
                info!("Moving existing checkout {} to {}", path.display(), target.display());
                tokio::fs::rename(&path, &target).await?;
                self.prune_backups(backup_dir, name).await;
            }
            None if existing.is_dir() => {
                info!("Removing existing checkout {}", path.display());
                tokio::fs::remove_dir_all(&path).await?;
            }
            None => {
                info!("Removing stale file at {}", path.display());
                tokio::fs::remove_file(&path).await?;
            }
        }

        Ok(path)
    }

    /// Delete all but the newest `backup_keep` backups of `name`. Failures
    /// are logged; the clone goes ahead regardless.
    async fn prune_backups(&self, backup_dir: &Path, name: &str) {
        if self.backup_keep == 0 {
            return;
        }

        let mut backups = match backup_names(backup_dir, name).await {
            Ok(backups) => backups,
            Err(e) => {
                warn!("Could not list backups in {}: {}", backup_dir.display(), e);
                return;
            }
        };
        if backups.len() <= self.backup_keep {
            return;
        }

        // Fixed-width UTC stamps sort chronologically
        backups.sort();
        let excess = backups.len() - self.backup_keep;
        for old in &backups[..excess] {
            let path = backup_dir.join(old);
            debug!("Pruning backup {}", path.display());
            if let Err(e) = tokio::fs::remove_dir_all(&path).await {
                warn!("Could not remove backup {}: {}", path.display(), e);
            }
        }
    }

    /// Names of the directories directly under the base directory, sorted.
    /// A missing base directory holds no repositories.
    pub async fn list_repositories(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Workspace {} does not exist yet", self.base_dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut repos = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !is_dir(&entry.path()).await {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                repos.push(name);
            }
        }

        repos.sort();
        Ok(repos)
    }
}

/// Entries of `backup_dir` that are backups of exactly `name`
async fn backup_names(backup_dir: &Path, name: &str) -> std::io::Result<Vec<String>> {
    let prefix = format!("{}-", name);
    let mut entries = tokio::fs::read_dir(backup_dir).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let Ok(file_name) = entry.file_name().into_string() else {
            continue;
        };
        let is_backup = file_name
            .strip_prefix(&prefix)
            .is_some_and(is_backup_stamp);
        if is_backup {
            names.push(file_name);
        }
    }

    Ok(names)
}

/// Matches `BACKUP_STAMP` output, e.g. `20260101T120000.123Z`
fn is_backup_stamp(stamp: &str) -> bool {
    let bytes = stamp.as_bytes();
    bytes.len() == 20
        && bytes.iter().enumerate().all(|(i, b)| match i {
            8 => *b == b'T',
            15 => *b == b'.',
            19 => *b == b'Z',
            _ => b.is_ascii_digit(),
        })
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_repo_name_from_url() {
        assert_eq!(
            repo_name_from_url("https://github.com/acme/widgets").unwrap(),
            "widgets"
        );
        assert_eq!(
            repo_name_from_url("https://github.com/acme/widgets.git").unwrap(),
            "widgets.git"
        );
        assert_eq!(repo_name_from_url("git@github.com:acme/tool").unwrap(), "tool");
    }

    #[test]
    fn test_repo_name_rejects_empty_and_dots() {
        assert!(repo_name_from_url("https://github.com/acme/widgets/").is_err());
        assert!(repo_name_from_url("").is_err());
        assert!(repo_name_from_url("https://example.com/..").is_err());
        assert!(repo_name_from_url("https://example.com/.").is_err());
    }

    #[test]
    fn test_validate_file_path() {
        assert_eq!(
            validate_file_path("sub/c.py").unwrap(),
            PathBuf::from("sub/c.py")
        );
        assert!(validate_file_path("../escape.py").is_err());
        assert!(validate_file_path("sub/../../escape.py").is_err());
        assert!(validate_file_path("/etc/passwd").is_err());
        assert!(validate_file_path("").is_err());
    }

    #[test]
    fn test_resolve_rejects_nested_names() {
        let ws = WorkspaceManager::new("/w");
        assert_eq!(ws.resolve("demo").unwrap(), PathBuf::from("/w/demo"));
        assert!(matches!(ws.resolve("a/b"), Err(MendError::InvalidInput(_))));
        assert!(matches!(ws.resolve(".."), Err(MendError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_resolve_existing_missing_repo() {
        let temp = TempDir::new().unwrap();
        let ws = WorkspaceManager::new(temp.path());
        let err = ws.resolve_existing("ghost").await.unwrap_err();
        assert!(matches!(err, MendError::NotFound(ref msg) if msg == "Repository not found"));
    }

    #[tokio::test]
    async fn test_resolve_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("demo/sub")).unwrap();
        fs::write(temp.path().join("demo/sub/c.py"), "x = 1\n").unwrap();
        let ws = WorkspaceManager::new(temp.path());

        let path = ws.resolve_file("demo", "sub/c.py").await.unwrap();
        assert_eq!(path, temp.path().join("demo/sub/c.py"));

        let err = ws.resolve_file("demo", "missing.py").await.unwrap_err();
        assert!(matches!(err, MendError::NotFound(ref msg) if msg == "File not found"));

        // Directories are not files
        let err = ws.resolve_file("demo", "sub").await.unwrap_err();
        assert!(matches!(err, MendError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_prepare_for_clone_removes_existing() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("repos");
        fs::create_dir_all(base.join("demo")).unwrap();
        fs::write(base.join("demo/old.py"), "old").unwrap();

        let ws = WorkspaceManager::new(&base);
        let path = ws.prepare_for_clone("demo").await.unwrap();

        assert_eq!(path, base.join("demo"));
        assert!(!path.exists());
        assert!(base.exists());
    }

    #[tokio::test]
    async fn test_prepare_for_clone_moves_to_backup() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("repos");
        let backups = temp.path().join("repos.bak");
        fs::create_dir_all(base.join("demo")).unwrap();
        fs::write(base.join("demo/old.py"), "old").unwrap();

        let ws = WorkspaceManager::new(&base).with_backup_dir(Some(backups.clone()));
        let path = ws.prepare_for_clone("demo").await.unwrap();
        assert!(!path.exists());

        let backed_up: Vec<_> = fs::read_dir(&backups)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(backed_up.len(), 1);
        assert!(backed_up[0]
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("demo-"));
        assert_eq!(fs::read_to_string(backed_up[0].join("old.py")).unwrap(), "old");
    }

    #[test]
    fn test_backup_stamp_shape() {
        let stamp = Utc::now().format(BACKUP_STAMP).to_string();
        assert!(is_backup_stamp(&stamp));
        assert!(!is_backup_stamp("extra-20200101T000000.000Z"));
        assert!(!is_backup_stamp("20200101T000000Z"));
    }

    #[tokio::test]
    async fn test_backups_are_capped_per_name() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("repos");
        let backups = temp.path().join("repos.bak");
        // Another repository whose name shares the prefix
        fs::create_dir_all(backups.join("demo-extra-20200101T000000.000Z")).unwrap();

        let ws = WorkspaceManager::new(&base)
            .with_backup_dir(Some(backups.clone()))
            .with_backup_keep(2);

        for round in 0..4 {
            fs::create_dir_all(base.join("demo")).unwrap();
            fs::write(base.join("demo/round.txt"), round.to_string()).unwrap();
            ws.prepare_for_clone("demo").await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let mut kept: Vec<String> = backup_names(&backups, "demo").await.unwrap();
        kept.sort();
        assert_eq!(kept.len(), 2);
        let rounds: Vec<String> = kept
            .iter()
            .map(|name| fs::read_to_string(backups.join(name).join("round.txt")).unwrap())
            .collect();
        assert_eq!(rounds, vec!["2".to_string(), "3".to_string()]);

        assert!(backups.join("demo-extra-20200101T000000.000Z").exists());
    }

    #[tokio::test]
    async fn test_prepare_for_clone_creates_base_dir() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("fresh");
        let ws = WorkspaceManager::new(&base);

        ws.prepare_for_clone("demo").await.unwrap();
        assert!(base.is_dir());
    }

    #[tokio::test]
    async fn test_list_repositories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("beta")).unwrap();
        fs::create_dir_all(temp.path().join("alpha")).unwrap();
        fs::write(temp.path().join("notes.txt"), "not a repo").unwrap();
        let ws = WorkspaceManager::new(temp.path());

        let first = ws.list_repositories().await.unwrap();
        assert_eq!(first, vec!["alpha".to_string(), "beta".to_string()]);

        let second = ws.list_repositories().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_list_repositories_missing_base() {
        let temp = TempDir::new().unwrap();
        let ws = WorkspaceManager::new(temp.path().join("nope"));
        assert!(ws.list_repositories().await.unwrap().is_empty());
    }

    #[test]
    fn test_from_config_backup_toggle() {
        let mut config = WorkspaceConfig::default();
        assert!(WorkspaceManager::from_config(&config).backup_dir.is_some());

        assert_eq!(WorkspaceManager::from_config(&config).backup_keep, 5);

        config.backup_on_reclone = false;
        assert!(WorkspaceManager::from_config(&config).backup_dir.is_none());
    }
}
