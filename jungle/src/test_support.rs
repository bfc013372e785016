//! Test-only helpers for building jungles on disk.

use std::fs::{self, File, FileTimes};
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::version::Version;
use crate::io::config::JungleConfig;
use crate::jungle::Jungle;

const DAY: Duration = Duration::from_secs(86_400);

/// Parse a version literal.
pub fn v(s: &str) -> Version {
    s.parse().expect("valid version literal")
}

/// A jungle in a temporary directory, removed on drop.
pub struct TestJungle {
    dir: TempDir,
}

impl TestJungle {
    /// Create `release/` containing one directory per version name.
    pub fn with_versions(names: &[&str]) -> Result<Self> {
        let dir = tempfile::tempdir().context("create tempdir")?;
        fs::create_dir(dir.path().join("release")).context("create release dir")?;
        let fixture = Self { dir };
        for name in names {
            fixture.add_version(name)?;
        }
        Ok(fixture)
    }

    /// Like [`TestJungle::with_versions`], then initialise `current` at head.
    pub fn initialised(names: &[&str]) -> Result<Self> {
        let fixture = Self::with_versions(names)?;
        fixture.jungle().init().context("init jungle")?;
        Ok(fixture)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Open the jungle with default settings.
    pub fn jungle(&self) -> Jungle {
        Jungle::with_config(self.path(), JungleConfig::default()).expect("open test jungle")
    }

    pub fn add_version(&self, name: &str) -> Result<PathBuf> {
        self.add_entry(name)
    }

    /// Create an arbitrary directory under `release/`.
    pub fn add_entry(&self, name: &str) -> Result<PathBuf> {
        let path = self.path().join("release").join(name);
        fs::create_dir_all(&path).with_context(|| format!("create {}", path.display()))?;
        Ok(path)
    }

    /// Write a file at `relative`, creating parent directories.
    pub fn add_file(&self, relative: &str) -> Result<PathBuf> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&path, relative).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Backdate a release's modification time by `days` whole days (plus an hour of slack).
    pub fn age_version(&self, name: &str, days: u32) -> Result<()> {
        let path = self.path().join("release").join(name);
        let mtime = SystemTime::now() - DAY * days - Duration::from_secs(3_600);
        let dir = File::open(&path).with_context(|| format!("open {}", path.display()))?;
        dir.set_times(FileTimes::new().set_modified(mtime).set_accessed(mtime))
            .with_context(|| format!("set times on {}", path.display()))
    }

    /// Point `current` at an arbitrary target, bypassing validation.
    pub fn link_current(&self, target: &str) -> Result<()> {
        let link = self.path().join("current");
        if fs::symlink_metadata(&link).is_ok() {
            fs::remove_file(&link).context("remove current")?;
        }
        symlink(target, &link).with_context(|| format!("link current -> {target}"))
    }
}
