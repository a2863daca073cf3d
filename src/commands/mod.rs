//! Command implementations shared by the CLI.

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use dotlink::{Linker, Package, Prompter, SyncResult, Variables};

pub mod install;
pub mod list;
pub mod status;
pub mod uninstall;

/// Settings common to every command
pub struct Context {
    pub base_dir: PathBuf,
    pub vars: Variables,
    pub dry_run: bool,
    pub verbose: bool,
}

/// Packages a command operates on
pub struct Selection {
    pub packages: Vec<Package>,
    /// No identifiers were given, so every package was picked up
    pub bulk: bool,
}

/// Resolve package identifiers, or discover every package when none are given.
pub fn select_packages(ctx: &Context, ids: &[String]) -> Result<Selection> {
    if ids.is_empty() {
        let packages = Package::discover(&ctx.base_dir)?;
        return Ok(Selection {
            packages,
            bulk: true,
        });
    }

    let packages = ids
        .iter()
        .map(|id| Package::find(&ctx.base_dir, id))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Selection {
        packages,
        bulk: false,
    })
}

/// Ask before touching every package at once.
pub fn confirm_bulk(selection: &Selection, verb: &str, prompter: &mut Prompter) -> Result<bool> {
    if !selection.bulk {
        return Ok(true);
    }

    let names: Vec<&str> = selection.packages.iter().map(Package::name).collect();
    println!("Packages: {}", names.join(", ").cyan());
    prompter.confirm(&format!("{} all {} packages?", verb, names.len()))
}

/// Platform and PATH gating, applied only to bulk runs.
pub fn is_supported(package: &Package) -> bool {
    match package.check_support() {
        Ok(()) => true,
        Err(reason) => {
            tracing::warn!(package = package.name(), %reason, "Skipping package");
            println!(
                "\n{} Skipping {}: {}",
                "!".yellow(),
                package.name().bold(),
                reason
            );
            false
        }
    }
}

pub fn print_package_header(package: &Package) {
    let desc = match &package.manifest().description {
        Some(desc) if !desc.is_empty() => format!(" - {desc}"),
        _ => String::new(),
    };
    println!("\n{}{}", package.name().bold(), desc.dimmed());
}

pub fn print_target_dir(ctx: &Context, linker: &Linker) {
    let target = linker.target_dir().display();
    if linker.created_target_dir() {
        if ctx.dry_run {
            println!("  {} Would create directory: {}", "→".cyan(), target);
        } else {
            println!("  {} Created directory: {}", "✔".green(), target);
        }
    } else if ctx.verbose {
        println!("  Target: {}", target.to_string().dimmed());
    }
}

pub fn print_no_packages(ctx: &Context) {
    println!(
        "{} No packages found in {}",
        "!".yellow(),
        ctx.base_dir.display()
    );
}

pub fn count(value: usize) -> colored::ColoredString {
    if value > 0 {
        value.to_string().normal()
    } else {
        value.to_string().dimmed()
    }
}

pub fn errors(result: &SyncResult) -> colored::ColoredString {
    if result.errors > 0 {
        result.errors.to_string().red()
    } else {
        result.errors.to_string().dimmed()
    }
}
