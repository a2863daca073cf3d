//! Package discovery
//!
//! A package is a directory holding a manifest and the payload to link.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, SkipReason};
use crate::manifest::Manifest;

/// A package directory and its parsed manifest
#[derive(Debug, Clone)]
pub struct Package {
    name: String,
    root: PathBuf,
    manifest: Manifest,
}

impl Package {
    /// Open the package rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, Error> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::UnknownPackage(root.display().to_string()));
        }

        let root = fs::canonicalize(&root)?;
        let manifest = Manifest::load(&root)?;
        let name = match &manifest.name {
            Some(name) => name.clone(),
            None => root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| root.display().to_string()),
        };

        Ok(Self {
            name,
            root,
            manifest,
        })
    }

    /// Resolve a package identifier relative to `base_dir`.
    pub fn find(base_dir: &Path, id: &str) -> Result<Self, Error> {
        let root = base_dir.join(id);
        if !root.is_dir() {
            return Err(Error::UnknownPackage(id.to_string()));
        }
        Self::open(root)
    }

    /// Every immediate subdirectory of `base_dir` that has a manifest,
    /// ordered by directory name.
    pub fn discover(base_dir: &Path) -> Result<Vec<Self>, Error> {
        let mut dirs: Vec<PathBuf> = fs::read_dir(base_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir() && Manifest::path_in(path).is_file())
            .collect();
        dirs.sort();

        dirs.into_iter().map(Self::open).collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Check platform and PATH requirements for the running host.
    pub fn check_support(&self) -> Result<(), SkipReason> {
        self.check_support_with(std::env::consts::OS, |exe| which::which(exe).is_ok())
    }

    /// Same as [`Package::check_support`] with the host facts supplied.
    pub fn check_support_with(
        &self,
        platform: &str,
        on_path: impl Fn(&str) -> bool,
    ) -> Result<(), SkipReason> {
        let platforms = &self.manifest.platforms;
        if !platforms.is_empty() && !platforms.iter().any(|p| p == platform) {
            return Err(SkipReason::UnsupportedPlatform(platform.to_string()));
        }

        if let Some(missing) = self
            .manifest
            .requires_on_path
            .iter()
            .find(|exe| !on_path(exe))
        {
            return Err(SkipReason::MissingExecutable(missing.clone()));
        }

        Ok(())
    }
}
