//! Package manifest parsing
//!
//! Every package carries a `dotlink.json` describing where its files go and
//! which of them to leave out or rename on the way.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::vars::{HOME_TOKEN, Variables};

/// Manifest file name expected at the root of each package
pub const MANIFEST_FILE_NAME: &str = "dotlink.json";

/// Resolved target directory of a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDir {
    pub path: PathBuf,
    /// Missing beforehand and created (only planned in dry-run mode)
    pub created: bool,
}

/// Declarative package configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Display name (defaults to the package directory name)
    #[serde(default)]
    pub name: Option<String>,

    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,

    /// Candidate target directories, first existing one wins
    #[serde(default = "default_target_dir")]
    pub target_dir: Vec<String>,

    /// Create the first target directory when none exists
    #[serde(default)]
    pub create_target_dir_if_needed: bool,

    /// Executables that must be resolvable on PATH
    #[serde(default)]
    pub requires_on_path: Vec<String>,

    /// Supported platforms (empty means all)
    #[serde(default)]
    pub platforms: Vec<String>,

    /// Glob templates for files that only belong on one host
    #[serde(default)]
    pub host_specific_files: Vec<String>,

    /// Glob patterns never linked
    #[serde(default)]
    pub ignored_files: Vec<String>,

    /// Ordered substring replacements applied to path segments
    #[serde(default, deserialize_with = "ordered_renames")]
    pub renames: Vec<(String, String)>,
}

fn default_target_dir() -> Vec<String> {
    vec![HOME_TOKEN.to_string()]
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            target_dir: default_target_dir(),
            create_target_dir_if_needed: false,
            requires_on_path: Vec::new(),
            platforms: Vec::new(),
            host_specific_files: Vec::new(),
            ignored_files: Vec::new(),
            renames: Vec::new(),
        }
    }
}

/// Keep the declaration order of the `renames` object.
fn ordered_renames<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
    map.into_iter()
        .map(|(from, to)| match to {
            serde_json::Value::String(to) => Ok((from, to)),
            other => Err(de::Error::custom(format!(
                "rename for '{from}' must be a string, got {other}"
            ))),
        })
        .collect()
}

impl Manifest {
    /// Path of the manifest inside a package directory
    pub fn path_in(package_dir: &Path) -> PathBuf {
        package_dir.join(MANIFEST_FILE_NAME)
    }

    /// Load the manifest of the package rooted at `package_dir`
    pub fn load(package_dir: &Path) -> Result<Self, Error> {
        let path = Self::path_in(package_dir);
        if !path.is_file() {
            return Err(Error::MissingManifest { path });
        }

        let content = fs::read_to_string(&path)?;
        Self::parse(&content).map_err(|source| Error::InvalidManifest { path, source })
    }

    /// Parse manifest JSON text
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Resolve the directory links are placed in.
    ///
    /// Templates are tried in order and the first existing directory wins.
    /// When none exists and creation is requested, the first template is
    /// created regardless of the others.
    pub fn find_target_dir(
        &self,
        vars: &Variables,
        package: &str,
        dry_run: bool,
    ) -> Result<TargetDir, Error> {
        let resolved: Vec<PathBuf> = self
            .target_dir
            .iter()
            .map(|template| PathBuf::from(vars.substitute(template)))
            .collect();

        if let Some(found) = resolved.iter().find(|path| path.is_dir()) {
            tracing::debug!(package, target = %found.display(), "Resolved target directory");
            return Ok(TargetDir {
                path: found.clone(),
                created: false,
            });
        }

        if self.create_target_dir_if_needed
            && let Some(first) = resolved.first()
        {
            if !dry_run {
                fs::create_dir_all(first)?;
            }
            tracing::info!(
                package,
                target = %first.display(),
                dry_run,
                "Creating target directory"
            );
            return Ok(TargetDir {
                path: first.clone(),
                created: true,
            });
        }

        Err(Error::TargetDirNotFound {
            package: package.to_string(),
            candidates: resolved
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
        })
    }
}
