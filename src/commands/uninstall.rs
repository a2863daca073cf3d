use anyhow::Result;
use colored::Colorize;

use dotlink::{Linker, Prompter, SyncOptions, SyncResult};

use super::{
    Context, confirm_bulk, count, errors, is_supported, print_no_packages, print_package_header,
    print_target_dir, select_packages,
};

pub fn run(ctx: &Context, ids: &[String], prompter: &mut Prompter) -> Result<()> {
    let selection = select_packages(ctx, ids)?;
    if selection.packages.is_empty() {
        print_no_packages(ctx);
        return Ok(());
    }

    if !confirm_bulk(&selection, "Uninstall", prompter)? {
        println!("Cancelled");
        return Ok(());
    }

    if ctx.dry_run {
        println!("{}", "Running in dry-run mode".cyan());
    }

    let options = SyncOptions {
        dry_run: ctx.dry_run,
        verbose: ctx.verbose,
        ..Default::default()
    };

    let mut total = SyncResult::default();

    for package in &selection.packages {
        if selection.bulk && !is_supported(package) {
            continue;
        }

        print_package_header(package);
        let linker = Linker::new(package, &ctx.vars, options.clone())?;
        print_target_dir(ctx, &linker);
        total.merge(linker.uninstall()?);
    }

    println!("\n{}", "✨ Uninstall complete!".green().bold());
    println!(
        "  Removed: {}, Not managed: {}, Errors: {}",
        total.removed.to_string().green(),
        count(total.not_owned),
        errors(&total)
    );

    Ok(())
}
