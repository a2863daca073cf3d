use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use dotlink::linker::{LinkState, StatusEntry};
use dotlink::{Linker, SyncOptions};

use super::{Context, print_no_packages, select_packages};

#[derive(Serialize)]
struct PackageStatus {
    package: String,
    target_dir: String,
    entries: Vec<StatusEntry>,
}

pub fn run(ctx: &Context, ids: &[String], json: bool) -> Result<()> {
    let selection = select_packages(ctx, ids)?;
    if selection.packages.is_empty() && !json {
        print_no_packages(ctx);
        return Ok(());
    }

    // Status never changes anything, including creating target directories.
    let options = SyncOptions {
        dry_run: true,
        ..Default::default()
    };

    let mut report = Vec::new();
    for package in &selection.packages {
        let linker = Linker::new(package, &ctx.vars, options.clone())?;
        report.push(PackageStatus {
            package: package.name().to_string(),
            target_dir: linker.target_dir().display().to_string(),
            entries: linker.status()?,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut problems = 0usize;
    for status in &report {
        println!("\n{} {}", status.package.bold(), status.target_dir.dimmed());
        for entry in &status.entries {
            let target = entry.target.display();
            match entry.state {
                LinkState::Linked => println!("  {} OK: {}", "✔".green(), target),
                LinkState::Missing => println!("  {} Missing: {}", "!".yellow(), target),
                LinkState::Conflict => {
                    println!("  {} Conflict: {}", "✗".red(), target);
                    problems += 1;
                }
                LinkState::Ignored => {
                    println!("  {} Ignored: {}", "○".dimmed(), entry.source.display())
                }
            }
        }
    }

    if problems > 0 {
        println!("\nStatus: {} conflicts found", problems);
    } else {
        println!("\nStatus: No conflicts");
    }

    Ok(())
}
