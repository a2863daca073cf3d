//! Symbolic link reconciliation
//!
//! Compares the link candidates of a package against the target directory
//! and installs or removes symlinks, resolving conflicts with pre-existing
//! content along the way.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::filters::{IgnoreSet, Renamer};
use crate::fs as actions;
use crate::package::Package;
use crate::prompt::Prompter;
use crate::vars::Variables;
use crate::walker::{LinkCandidate, LinkCandidates, find_link_candidates};

const BACKUP_SUFFIX: &str = ".backup";

/// How to treat a target path already occupied by something else
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConflictStrategy {
    /// Rename the existing entry to `<name>.backup`, then link
    Backup,
    /// Delete the existing entry, then link
    Overwrite,
    /// Leave the existing entry alone
    Skip,
}

impl ConflictStrategy {
    const ALL: [Self; 3] = [Self::Backup, Self::Overwrite, Self::Skip];
    const CHOICES: [&'static str; 3] = ["backup", "overwrite", "skip"];
    const DEFAULT_INDEX: usize = 2;
}

/// Options for install and uninstall runs
#[derive(Debug, Default, Clone)]
pub struct SyncOptions {
    /// Show what would be done without making changes
    pub dry_run: bool,
    /// Show detailed output
    pub verbose: bool,
    /// Resolve every conflict this way instead of prompting
    pub on_conflict: Option<ConflictStrategy>,
}

/// How a conflict was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    BackedUp,
    Overwritten,
    Skipped,
}

/// What happened to a single link candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new symlink was created
    Linked,
    /// The target already pointed at the source
    AlreadyLinked,
    /// The source is in the ignore set
    Ignored,
    /// The target was occupied
    Resolved(Resolution),
    /// The package's symlink was removed
    Unlinked,
    /// The target exists but is not this package's symlink
    NotOwned,
    /// Nothing exists at the target
    Absent,
    /// An I/O error occurred; see the log
    Failed,
}

/// Outcome of one candidate
#[derive(Debug, Clone)]
pub struct LinkReport {
    pub candidate: LinkCandidate,
    pub outcome: Outcome,
}

/// Result of an install or uninstall run
#[derive(Debug, Default)]
pub struct SyncResult {
    pub created: usize,
    pub already_linked: usize,
    pub ignored: usize,
    pub backed_up: usize,
    pub overwritten: usize,
    pub skipped: usize,
    pub removed: usize,
    pub not_owned: usize,
    pub errors: usize,
    pub reports: Vec<LinkReport>,
}

impl SyncResult {
    fn record(&mut self, candidate: LinkCandidate, outcome: Outcome) {
        match outcome {
            Outcome::Linked => self.created += 1,
            Outcome::AlreadyLinked => self.already_linked += 1,
            Outcome::Ignored => self.ignored += 1,
            Outcome::Resolved(Resolution::BackedUp) => self.backed_up += 1,
            Outcome::Resolved(Resolution::Overwritten) => self.overwritten += 1,
            Outcome::Resolved(Resolution::Skipped) => self.skipped += 1,
            Outcome::Unlinked => self.removed += 1,
            Outcome::NotOwned => self.not_owned += 1,
            Outcome::Absent => {}
            Outcome::Failed => self.errors += 1,
        }
        self.reports.push(LinkReport { candidate, outcome });
    }

    /// Number of candidates whose target was changed
    pub fn changed(&self) -> usize {
        self.created + self.backed_up + self.overwritten + self.removed
    }

    /// Fold another result into this one
    pub fn merge(&mut self, other: SyncResult) {
        self.created += other.created;
        self.already_linked += other.already_linked;
        self.ignored += other.ignored;
        self.backed_up += other.backed_up;
        self.overwritten += other.overwritten;
        self.skipped += other.skipped;
        self.removed += other.removed;
        self.not_owned += other.not_owned;
        self.errors += other.errors;
        self.reports.extend(other.reports);
    }
}

/// Current state of a candidate's target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Linked,
    Missing,
    Conflict,
    Ignored,
}

/// One line of `status` output
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub source: PathBuf,
    pub target: PathBuf,
    pub state: LinkState,
}

/// Reconciles one package against its target directory
#[derive(Debug)]
pub struct Linker<'a> {
    package: &'a Package,
    target_dir: PathBuf,
    created_target_dir: bool,
    ignore: IgnoreSet,
    renamer: Renamer,
    options: SyncOptions,
}

impl<'a> Linker<'a> {
    /// Resolve the target directory, ignore set and renamer for `package`.
    pub fn new(
        package: &'a Package,
        vars: &Variables,
        options: SyncOptions,
    ) -> Result<Self, Error> {
        let manifest = package.manifest();
        let resolved = manifest.find_target_dir(vars, package.name(), options.dry_run)?;
        let target_dir = resolved.path;
        let ignore = IgnoreSet::build(package.root(), manifest, vars)?;
        let renamer = Renamer::from_manifest(manifest, vars);

        tracing::debug!(
            package = package.name(),
            target = %target_dir.display(),
            ignored = ignore.len(),
            "Prepared linker"
        );

        Ok(Self {
            package,
            target_dir,
            created_target_dir: resolved.created,
            ignore,
            renamer,
            options,
        })
    }

    pub fn package(&self) -> &Package {
        self.package
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Whether the target directory had to be created (or would be, in dry-run mode)
    pub fn created_target_dir(&self) -> bool {
        self.created_target_dir
    }

    pub fn ignore_set(&self) -> &IgnoreSet {
        &self.ignore
    }

    /// Fresh walk over the package's link candidates
    pub fn candidates(&self) -> LinkCandidates<'_> {
        find_link_candidates(self.package.root(), &self.target_dir, &self.renamer)
    }

    /// Link every candidate into the target directory.
    pub fn install(&self, prompter: &mut Prompter) -> Result<SyncResult> {
        let mut result = SyncResult::default();

        for candidate in self.candidates() {
            let candidate = match candidate {
                Ok(candidate) => candidate,
                Err(e) => {
                    walk_failed(&mut result, &e);
                    continue;
                }
            };

            let outcome = if self.ignore.contains(&candidate.source) {
                tracing::info!(source = %candidate.source.display(), "Ignored");
                if self.options.verbose {
                    println!(
                        "  {} Ignored: {}",
                        "○".dimmed(),
                        candidate.source.display()
                    );
                }
                Outcome::Ignored
            } else {
                self.install_candidate(&candidate, prompter)
                    .unwrap_or_else(|e| {
                        tracing::error!(
                            target = %candidate.target.display(),
                            error = %e,
                            "Error installing link"
                        );
                        println!("  {} {:#}", "✘".red(), e);
                        Outcome::Failed
                    })
            };

            result.record(candidate, outcome);
        }

        Ok(result)
    }

    fn install_candidate(
        &self,
        candidate: &LinkCandidate,
        prompter: &mut Prompter,
    ) -> Result<Outcome> {
        let LinkCandidate { source, target } = candidate;
        let dry_run = self.options.dry_run;

        match link_state(source, target) {
            LinkState::Linked => {
                if self.options.verbose {
                    println!("  {} Already linked: {}", "✔".green(), target.display());
                }
                Ok(Outcome::AlreadyLinked)
            }
            LinkState::Missing | LinkState::Ignored => {
                actions::symlink(source, target, dry_run)?;
                Ok(Outcome::Linked)
            }
            LinkState::Conflict => {
                let resolution = match self.conflict_strategy(target, prompter)? {
                    ConflictStrategy::Backup => {
                        let backup = backup_path(target);
                        if backup.symlink_metadata().is_ok() {
                            anyhow::bail!(
                                "Backup already exists, leaving {} untouched: {}",
                                target.display(),
                                backup.display()
                            );
                        }
                        actions::move_path(target, &backup, dry_run)?;
                        actions::symlink(source, target, dry_run)?;
                        Resolution::BackedUp
                    }
                    ConflictStrategy::Overwrite => {
                        actions::remove(target, dry_run)?;
                        actions::symlink(source, target, dry_run)?;
                        Resolution::Overwritten
                    }
                    ConflictStrategy::Skip => {
                        println!("  {} Skipped existing: {}", "!".yellow(), target.display());
                        Resolution::Skipped
                    }
                };
                Ok(Outcome::Resolved(resolution))
            }
        }
    }

    fn conflict_strategy(
        &self,
        target: &Path,
        prompter: &mut Prompter,
    ) -> Result<ConflictStrategy> {
        if let Some(strategy) = self.options.on_conflict {
            return Ok(strategy);
        }

        let message = format!("{} already exists", target.display());
        let idx = prompter
            .choose(
                &message,
                &ConflictStrategy::CHOICES,
                ConflictStrategy::DEFAULT_INDEX,
            )
            .with_context(|| format!("Failed to resolve conflict at {}", target.display()))?;
        Ok(ConflictStrategy::ALL[idx])
    }

    /// Remove every symlink this package owns in the target directory.
    pub fn uninstall(&self) -> Result<SyncResult> {
        let mut result = SyncResult::default();

        for candidate in self.candidates() {
            let candidate = match candidate {
                Ok(candidate) => candidate,
                Err(e) => {
                    walk_failed(&mut result, &e);
                    continue;
                }
            };
            let target = &candidate.target;

            let outcome = match link_state(&candidate.source, target) {
                LinkState::Linked => match actions::remove(target, self.options.dry_run) {
                    Ok(()) => Outcome::Unlinked,
                    Err(e) => {
                        tracing::error!(target = %target.display(), error = %e, "Error removing link");
                        println!("  {} {:#}", "✘".red(), e);
                        Outcome::Failed
                    }
                },
                LinkState::Conflict => {
                    println!(
                        "  {} Not managed by {}: {}",
                        "!".yellow(),
                        self.package.name(),
                        target.display()
                    );
                    Outcome::NotOwned
                }
                LinkState::Missing | LinkState::Ignored => Outcome::Absent,
            };

            result.record(candidate, outcome);
        }

        Ok(result)
    }

    /// Report the state of every candidate without changing anything.
    pub fn status(&self) -> Result<Vec<StatusEntry>> {
        self.candidates()
            .map(|candidate| {
                let LinkCandidate { source, target } = candidate?;
                let state = if self.ignore.contains(&source) {
                    LinkState::Ignored
                } else {
                    link_state(&source, &target)
                };
                Ok(StatusEntry {
                    source,
                    target,
                    state,
                })
            })
            .collect()
    }
}

/// Classify `target` relative to `source`; never returns `Ignored`.
pub fn link_state(source: &Path, target: &Path) -> LinkState {
    match target.symlink_metadata() {
        Err(_) => LinkState::Missing,
        Ok(meta) if meta.file_type().is_symlink() && points_to(target, source) => {
            LinkState::Linked
        }
        Ok(_) => LinkState::Conflict,
    }
}

fn points_to(link: &Path, source: &Path) -> bool {
    // Exact match first: the source may itself be a dangling symlink
    if fs::read_link(link).is_ok_and(|dest| dest == source) {
        return true;
    }
    match (fs::canonicalize(link), fs::canonicalize(source)) {
        (Ok(resolved), Ok(expected)) => resolved == expected,
        _ => false,
    }
}

/// A directory of the package could not be read; its entries are skipped.
fn walk_failed(result: &mut SyncResult, e: &anyhow::Error) {
    tracing::error!(error = %e, "Error walking package");
    println!("  {} {:#}", "✘".red(), e);
    result.errors += 1;
}

fn backup_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}
