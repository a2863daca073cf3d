//! Ignore and rename rules
//!
//! Both are derived from manifest patterns once per operation. The ignore set
//! holds concrete source paths, never patterns.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::manifest::Manifest;
use crate::vars::{HOSTNAME_TOKEN, Variables};

/// File-name suffix that keeps a host-specific match out of the ignore set
pub const PRIVATE_SUFFIX: &str = ".private";

/// Expand `pattern` relative to `base` into the set of matching paths.
pub fn expand_glob(base: &Path, pattern: &str) -> Result<BTreeSet<PathBuf>, Error> {
    let escaped_base = glob::Pattern::escape(&base.to_string_lossy());
    let full = Path::new(&escaped_base).join(pattern);
    let full = full.to_string_lossy();

    let paths = glob::glob(&full).map_err(|source| Error::Glob {
        pattern: pattern.to_string(),
        source,
    })?;

    // Unreadable entries cannot be linked anyway
    Ok(paths.filter_map(|entry| entry.ok()).collect())
}

fn has_private_suffix(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(PRIVATE_SUFFIX))
}

/// Source paths excluded from linking
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    paths: BTreeSet<PathBuf>,
}

impl IgnoreSet {
    /// Build the ignore set for the package rooted at `root`.
    pub fn build(root: &Path, manifest: &Manifest, vars: &Variables) -> Result<Self, Error> {
        let mut paths = BTreeSet::new();

        for template in &manifest.host_specific_files {
            let include = root.join(vars.substitute(template));
            let wildcard = vars.substitute(&template.replace(HOSTNAME_TOKEN, "*"));

            for matched in expand_glob(root, &wildcard)? {
                if matched == include || has_private_suffix(&matched) {
                    continue;
                }
                tracing::debug!(path = %matched.display(), "Ignoring host-specific file");
                paths.insert(matched);
            }
        }

        for pattern in &manifest.ignored_files {
            let matches = expand_glob(root, &vars.substitute(pattern))?;
            tracing::debug!(pattern = %pattern, count = matches.len(), "Ignoring files");
            paths.extend(matches);
        }

        Ok(Self { paths })
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths.iter()
    }
}

/// Path segment renaming derived from the manifest `renames` table
#[derive(Debug, Clone, Default)]
pub struct Renamer {
    rules: Vec<(String, String)>,
}

impl Renamer {
    pub fn new(rules: Vec<(String, String)>) -> Self {
        Self { rules }
    }

    /// Resolve variables on both sides of every rule.
    pub fn from_manifest(manifest: &Manifest, vars: &Variables) -> Self {
        let rules = manifest
            .renames
            .iter()
            .map(|(from, to)| (vars.substitute(from), vars.substitute(to)))
            .filter(|(from, _)| !from.is_empty())
            .collect();
        Self::new(rules)
    }

    /// Apply every rule in order; later rules see earlier output.
    pub fn apply(&self, name: &str) -> String {
        self.rules
            .iter()
            .fold(name.to_string(), |acc, (from, to)| acc.replace(from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    fn vars() -> Variables {
        Variables::new("/home/alice", "laptop")
    }

    #[test]
    fn test_expand_glob() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("a.md"));
        touch(&root.join("b.md"));
        touch(&root.join("c.txt"));

        let matches = expand_glob(root, "*.md").unwrap();
        assert_eq!(
            matches.into_iter().collect::<Vec<_>>(),
            vec![root.join("a.md"), root.join("b.md")]
        );
    }

    #[test]
    fn test_expand_glob_escapes_base() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("odd[dir]");
        touch(&root.join("x.conf"));

        let matches = expand_glob(&root, "*.conf").unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_expand_glob_invalid_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let err = expand_glob(temp_dir.path(), "[").unwrap_err();
        assert!(matches!(err, Error::Glob { .. }));
    }

    #[test]
    fn test_ignore_set_host_specific() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("hosts/laptop.conf"));
        touch(&root.join("hosts/desktop.conf"));
        touch(&root.join("hosts/server.conf"));

        let manifest = Manifest {
            host_specific_files: vec!["hosts/{{hostname}}.conf".into()],
            ..Default::default()
        };

        let ignore = IgnoreSet::build(root, &manifest, &vars()).unwrap();
        assert_eq!(ignore.len(), 2);
        assert!(ignore.contains(&root.join("hosts/desktop.conf")));
        assert!(ignore.contains(&root.join("hosts/server.conf")));
        assert!(!ignore.contains(&root.join("hosts/laptop.conf")));
    }

    #[test]
    fn test_ignore_set_private_override() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("gitconfig.laptop"));
        touch(&root.join("gitconfig.work"));
        touch(&root.join("gitconfig.private"));

        let manifest = Manifest {
            host_specific_files: vec!["gitconfig.{{hostname}}".into()],
            ..Default::default()
        };

        let ignore = IgnoreSet::build(root, &manifest, &vars()).unwrap();
        assert!(ignore.contains(&root.join("gitconfig.work")));
        assert!(!ignore.contains(&root.join("gitconfig.private")));
        assert!(!ignore.contains(&root.join("gitconfig.laptop")));
    }

    #[test]
    fn test_ignore_set_ignored_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("README.md"));
        touch(&root.join("docs/notes.md"));
        touch(&root.join("vimrc"));

        let manifest = Manifest {
            ignored_files: vec!["*.md".into(), "docs".into()],
            ..Default::default()
        };

        let ignore = IgnoreSet::build(root, &manifest, &vars()).unwrap();
        assert!(ignore.contains(&root.join("README.md")));
        assert!(ignore.contains(&root.join("docs")));
        assert!(!ignore.contains(&root.join("docs/notes.md")));
        assert!(!ignore.contains(&root.join("vimrc")));
    }

    #[test]
    fn test_ignore_set_empty_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let ignore = IgnoreSet::build(temp_dir.path(), &Manifest::default(), &vars()).unwrap();
        assert!(ignore.is_empty());
        assert_eq!(ignore.iter().count(), 0);
    }

    #[test]
    fn test_renamer_applies_in_order() {
        let renamer = Renamer::new(vec![
            ("dot-".into(), ".".into()),
            (".vim".into(), ".nvim".into()),
        ]);

        assert_eq!(renamer.apply("dot-vimrc"), ".nvimrc");
        assert_eq!(renamer.apply("plain"), "plain");
    }

    #[test]
    fn test_renamer_replaces_every_occurrence() {
        let renamer = Renamer::new(vec![("_".into(), "-".into())]);
        assert_eq!(renamer.apply("a_b_c"), "a-b-c");
    }

    #[test]
    fn test_renamer_resolves_variables() {
        let manifest = Manifest {
            renames: vec![("{{hostname}}".into(), "local".into())],
            ..Default::default()
        };

        let renamer = Renamer::from_manifest(&manifest, &vars());
        assert_eq!(renamer.apply("config.laptop"), "config.local");
        assert_eq!(renamer.apply("config.work"), "config.work");
    }
}
