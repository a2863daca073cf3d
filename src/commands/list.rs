use anyhow::Result;
use colored::Colorize;

use dotlink::Package;

use super::{Context, print_no_packages};

pub fn run(ctx: &Context) -> Result<()> {
    let packages = Package::discover(&ctx.base_dir)?;
    if packages.is_empty() {
        print_no_packages(ctx);
        return Ok(());
    }

    for package in &packages {
        let desc = package
            .manifest()
            .description
            .as_deref()
            .map(|d| format!(" - {d}"))
            .unwrap_or_default();

        match package.check_support() {
            Ok(()) => println!("{} {}{}", "✔".green(), package.name().bold(), desc.dimmed()),
            Err(reason) => println!(
                "{} {}{} ({})",
                "○".dimmed(),
                package.name().bold(),
                desc.dimmed(),
                reason.to_string().yellow()
            ),
        }
    }

    Ok(())
}
