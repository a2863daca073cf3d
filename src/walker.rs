//! Link candidate discovery
//!
//! Walks a package tree in lock-step with the target directory. A source
//! entry is descended into only when the target already holds a real,
//! non-repository directory at the same place; everything else becomes a
//! single link candidate, so whole directories are linked when possible.

use anyhow::{Context, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::filters::Renamer;
use crate::manifest::MANIFEST_FILE_NAME;

/// Names never linked, checked after renaming
pub const RESERVED_NAMES: &[&str] = &[MANIFEST_FILE_NAME, ".git", ".DS_Store"];

/// Entry marking a target directory as a repository checkout
const VCS_MARKER: &str = ".git";

/// A proposed link from a package file to its place in the target tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCandidate {
    pub source: PathBuf,
    pub target: PathBuf,
}

#[derive(Debug, Clone)]
struct Frame {
    entries: std::vec::IntoIter<PathBuf>,
    target_dir: PathBuf,
}

/// Lazy iterator over link candidates.
///
/// Cloning before iteration yields an independent walk over the same tree.
#[derive(Debug, Clone)]
pub struct LinkCandidates<'a> {
    renamer: &'a Renamer,
    root: Option<(PathBuf, PathBuf)>,
    stack: Vec<Frame>,
}

/// Enumerate (source, target) pairs for the package rooted at `source_root`.
pub fn find_link_candidates<'a>(
    source_root: &Path,
    target_dir: &Path,
    renamer: &'a Renamer,
) -> LinkCandidates<'a> {
    LinkCandidates {
        renamer,
        root: Some((source_root.to_path_buf(), target_dir.to_path_buf())),
        stack: Vec::new(),
    }
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| {
            entry
                .map(|e| e.into_path())
                .with_context(|| format!("Failed to read directory: {}", dir.display()))
        })
        .collect()
}

pub fn is_reserved(name: &OsStr) -> bool {
    RESERVED_NAMES.iter().any(|reserved| name == *reserved)
}

fn should_descend(source: &Path, target: &Path) -> bool {
    let is_real_dir = target
        .symlink_metadata()
        .is_ok_and(|meta| meta.is_dir() && !meta.file_type().is_symlink());

    is_real_dir && source.is_dir() && !target.join(VCS_MARKER).exists()
}

impl LinkCandidates<'_> {
    fn push_dir(&mut self, source_dir: &Path, target_dir: PathBuf) -> Result<()> {
        let entries = list_dir(source_dir)?;
        self.stack.push(Frame {
            entries: entries.into_iter(),
            target_dir,
        });
        Ok(())
    }

    fn renamed(&self, source: &Path) -> Option<OsString> {
        let name = source.file_name()?;
        Some(match name.to_str() {
            Some(utf8) => OsString::from(self.renamer.apply(utf8)),
            None => name.to_os_string(),
        })
    }
}

impl Iterator for LinkCandidates<'_> {
    type Item = Result<LinkCandidate>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((source_root, target_dir)) = self.root.take()
            && let Err(e) = self.push_dir(&source_root, target_dir)
        {
            return Some(Err(e));
        }

        loop {
            let frame = self.stack.last_mut()?;
            let Some(source) = frame.entries.next() else {
                self.stack.pop();
                continue;
            };
            let target_dir = frame.target_dir.clone();

            let Some(name) = self.renamed(&source) else {
                continue;
            };
            if is_reserved(&name) {
                tracing::debug!(source = %source.display(), "Skipping reserved name");
                continue;
            }

            let target = target_dir.join(&name);
            if should_descend(&source, &target) {
                if let Err(e) = self.push_dir(&source, target) {
                    return Some(Err(e));
                }
                continue;
            }

            return Some(Ok(LinkCandidate { source, target }));
        }
    }
}
