use anyhow::Result;
use colored::Colorize;

use dotlink::{ConflictStrategy, Linker, Prompter, SyncOptions, SyncResult};

use super::{
    Context, confirm_bulk, count, errors, is_supported, print_no_packages, print_package_header,
    print_target_dir, select_packages,
};

pub fn run(
    ctx: &Context,
    ids: &[String],
    on_conflict: Option<ConflictStrategy>,
    prompter: &mut Prompter,
) -> Result<()> {
    let selection = select_packages(ctx, ids)?;
    if selection.packages.is_empty() {
        print_no_packages(ctx);
        return Ok(());
    }

    if !confirm_bulk(&selection, "Install", prompter)? {
        println!("Cancelled");
        return Ok(());
    }

    if ctx.dry_run {
        println!("{}", "Running in dry-run mode".cyan());
    }

    let options = SyncOptions {
        dry_run: ctx.dry_run,
        verbose: ctx.verbose,
        on_conflict,
    };

    let mut total = SyncResult::default();
    let mut skipped_packages = 0;

    for package in &selection.packages {
        if selection.bulk && !is_supported(package) {
            skipped_packages += 1;
            continue;
        }

        print_package_header(package);
        let linker = Linker::new(package, &ctx.vars, options.clone())?;
        print_target_dir(ctx, &linker);
        total.merge(linker.install(prompter)?);
    }

    println!("\n{}", "✨ Install complete!".green().bold());
    println!(
        "  Linked: {}, Already linked: {}, Backed up: {}, Overwritten: {}, Skipped: {}, Ignored: {}, Errors: {}",
        total.created.to_string().green(),
        count(total.already_linked),
        count(total.backed_up),
        count(total.overwritten),
        count(total.skipped),
        count(total.ignored),
        errors(&total)
    );
    if skipped_packages > 0 {
        println!("  Packages skipped: {}", skipped_packages.to_string().yellow());
    }

    Ok(())
}
