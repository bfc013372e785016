//! Canonical paths within a jungle.

use std::path::{Path, PathBuf};

use crate::core::version::Version;

pub const RELEASE_DIR: &str = "release";
pub const CURRENT_LINK: &str = "current";
pub const STAGING_LINK: &str = "current.new";
pub const CONFIG_FILE: &str = "jungle.toml";

/// All canonical paths for a jungle root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JunglePaths {
    pub root: PathBuf,
    pub release_dir: PathBuf,
    pub current_link: PathBuf,
    pub staging_link: PathBuf,
    pub config_path: PathBuf,
}

impl JunglePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            release_dir: root.join(RELEASE_DIR),
            current_link: root.join(CURRENT_LINK),
            staging_link: root.join(STAGING_LINK),
            config_path: root.join(CONFIG_FILE),
            root,
        }
    }

    /// Absolute location of a release directory.
    pub fn release(&self, version: &Version) -> PathBuf {
        self.release_dir.join(version.to_string())
    }
}

/// Relative symlink target stored in `current`, e.g. `release/1.2`.
pub fn link_target(version: &Version) -> PathBuf {
    Path::new(RELEASE_DIR).join(version.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_hang_off_the_root() {
        let paths = JunglePaths::new("/srv/app");
        assert_eq!(paths.release_dir, Path::new("/srv/app/release"));
        assert_eq!(paths.current_link, Path::new("/srv/app/current"));
        assert_eq!(paths.staging_link, Path::new("/srv/app/current.new"));
        assert_eq!(paths.config_path, Path::new("/srv/app/jungle.toml"));

        let version: Version = "1.3b1".parse().expect("version");
        assert_eq!(paths.release(&version), Path::new("/srv/app/release/1.3b1"));
    }

    #[test]
    fn link_target_is_relative() {
        let version: Version = "2.0".parse().expect("version");
        let target = link_target(&version);
        assert!(target.is_relative());
        assert_eq!(target, Path::new("release/2.0"));
    }
}
