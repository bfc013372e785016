//! The jungle engine.
//!
//! A [`Jungle`] wraps one managed directory. Every call re-reads the layout
//! from disk; nothing about `release/` or `current` is cached between calls,
//! because deployment tooling and operators may change either at any time.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::core::version::Version;
use crate::error::{JungleError, Result};
use crate::io::config::{JungleConfig, load_config};
use crate::io::paths::JunglePaths;
use crate::io::{pointer, releases};

/// Log at `info` when the jungle is verbose, `debug` otherwise.
macro_rules! announce {
    ($jungle:expr, $($arg:tt)+) => {
        if $jungle.config().verbose {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}
pub(crate) use announce;

/// Whether the active version is the newest one deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Current,
    Degraded,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Current => "current",
            Status::Degraded => "degraded",
        })
    }
}

#[derive(Debug, Clone)]
pub struct Jungle {
    paths: JunglePaths,
    config: JungleConfig,
}

impl Jungle {
    /// Open the jungle at `root`, reading `jungle.toml` if present.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        check_root(&root)?;
        let paths = JunglePaths::new(root);
        let config = load_config(&paths.config_path)?;
        Ok(Self { paths, config })
    }

    /// Open the jungle at `root` with explicit settings, ignoring `jungle.toml`.
    pub fn with_config(root: impl Into<PathBuf>, config: JungleConfig) -> Result<Self> {
        let root = root.into();
        check_root(&root)?;
        config.validate().map_err(|message| JungleError::Config {
            path: root.clone(),
            message,
        })?;
        Ok(Self {
            paths: JunglePaths::new(root),
            config,
        })
    }

    pub fn paths(&self) -> &JunglePaths {
        &self.paths
    }

    pub fn root(&self) -> &Path {
        &self.paths.root
    }

    pub fn config(&self) -> &JungleConfig {
        &self.config
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.config.verbose = verbose;
    }

    /// All deployed versions, ascending.
    pub fn versions(&self) -> Result<Vec<Version>> {
        releases::list_versions(&self.paths.release_dir)
    }

    /// True if `release/<version>` exists as a directory.
    pub fn exists(&self, version: &Version) -> bool {
        self.release_path(version).is_dir()
    }

    pub fn release_path(&self, version: &Version) -> PathBuf {
        self.paths.release(version)
    }

    /// Highest deployed version.
    pub fn head(&self) -> Result<Version> {
        self.versions()?
            .pop()
            .ok_or_else(|| self.empty_version_set())
    }

    /// Lowest deployed version.
    pub fn oldest(&self) -> Result<Version> {
        self.versions()?
            .into_iter()
            .next()
            .ok_or_else(|| self.empty_version_set())
    }

    /// Validate `current` from disk and return the version it points at.
    pub fn check_current(&self) -> Result<Version> {
        pointer::read_current(&self.paths)
    }

    /// The active version. Alias for [`Jungle::check_current`].
    pub fn current(&self) -> Result<Version> {
        self.check_current()
    }

    /// Create `current`, pointing at the highest version present.
    #[instrument(skip_all, fields(root = %self.paths.root.display()))]
    pub fn init(&self) -> Result<Version> {
        if !self.paths.release_dir.is_dir() {
            return Err(JungleError::NoReleaseDir {
                path: self.paths.release_dir.clone(),
            });
        }
        if pointer::current_exists(&self.paths)? {
            return Err(JungleError::AlreadyInitialized {
                path: self.paths.current_link.clone(),
            });
        }
        let head = self.head()?;
        pointer::swap_current(&self.paths, &head)?;
        announce!(self, version = %head, "initialised jungle");
        Ok(head)
    }

    /// Point `current` at `version`. Setting the active version again is a no-op swap.
    #[instrument(skip_all, fields(version = %version))]
    pub fn set(&self, version: &Version) -> Result<Version> {
        let previous = self.check_current()?;
        if !self.exists(version) {
            return Err(JungleError::UnknownVersion {
                version: version.to_string(),
            });
        }
        pointer::swap_current(&self.paths, version)?;
        announce!(self, from = %previous, to = %version, "current repointed");
        Ok(version.clone())
    }

    /// Point `current` at the highest version.
    pub fn upgrade(&self) -> Result<Version> {
        self.check_current()?;
        let head = self.head()?;
        self.set(&head)
    }

    /// Point `current` at the second-highest version, or just report it on a dry run.
    ///
    /// This always targets head-minus-one by version order, not whatever was
    /// active before the last upgrade.
    pub fn degrade(&self, dry_run: bool) -> Result<Version> {
        self.check_current()?;
        let versions = self.versions()?;
        let candidate = match versions.len() {
            0 | 1 => {
                return Err(JungleError::InsufficientVersions {
                    found: versions.len(),
                });
            }
            n => versions[n - 2].clone(),
        };
        if dry_run {
            debug!(candidate = %candidate, "degrade dry run");
            return Ok(candidate);
        }
        self.set(&candidate)
    }

    pub fn status(&self) -> Result<Status> {
        let current = self.check_current()?;
        let head = self.head()?;
        Ok(if current == head {
            Status::Current
        } else {
            Status::Degraded
        })
    }

    /// Remove `release/<version>`. The active version can never be deleted.
    #[instrument(skip_all, fields(version = %version))]
    pub fn delete(&self, version: &Version) -> Result<()> {
        let current = self.check_current()?;
        if !self.exists(version) {
            return Err(JungleError::UnknownVersion {
                version: version.to_string(),
            });
        }
        if *version == current {
            return Err(JungleError::CannotDeleteCurrent {
                version: current,
            });
        }
        releases::remove_release(&self.release_path(version))?;
        announce!(self, version = %version, "deleted version");
        Ok(())
    }

    fn empty_version_set(&self) -> JungleError {
        JungleError::EmptyVersionSet {
            path: self.paths.release_dir.clone(),
        }
    }
}

fn check_root(root: &Path) -> Result<()> {
    let reason = if !root.exists() {
        "no such directory"
    } else if !root.is_dir() {
        "not a directory"
    } else {
        return Ok(());
    };
    Err(JungleError::InvalidJungleRoot {
        path: root.to_path_buf(),
        reason,
    })
}
