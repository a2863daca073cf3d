//! File system actions.
//!
//! The only mutating operations the linker performs. Each one takes a
//! `dry_run` flag: when set, the action is reported and nothing changes.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

/// Copy a file, or a directory recursively.
pub fn copy(src: &Path, dst: &Path, dry_run: bool) -> Result<()> {
    if dry_run {
        println!(
            "  {} Would copy: {} -> {}",
            "→".cyan(),
            src.display(),
            dst.display()
        );
        return Ok(());
    }

    copy_entry(src, dst)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))?;
    println!(
        "  {} Copied: {} -> {}",
        "✔".green(),
        src.display(),
        dst.display()
    );
    Ok(())
}

/// Move `src` to `dst`, falling back to copy and delete across filesystems.
pub fn move_path(src: &Path, dst: &Path, dry_run: bool) -> Result<()> {
    if dry_run {
        println!(
            "  {} Would move: {} -> {}",
            "→".cyan(),
            src.display(),
            dst.display()
        );
        return Ok(());
    }

    if let Err(e) = fs::rename(src, dst) {
        tracing::debug!(error = %e, "Rename failed, falling back to copy");
        copy_entry(src, dst)
            .with_context(|| format!("Failed to move {} to {}", src.display(), dst.display()))?;
        remove_entry(src).with_context(|| format!("Failed to remove {}", src.display()))?;
    }

    println!(
        "  {} Moved: {} -> {}",
        "✔".green(),
        src.display(),
        dst.display()
    );
    Ok(())
}

/// Create a symlink at `link` pointing to `source`.
pub fn symlink(source: &Path, link: &Path, dry_run: bool) -> Result<()> {
    if dry_run {
        println!(
            "  {} Would link: {} -> {}",
            "→".cyan(),
            link.display(),
            source.display()
        );
        return Ok(());
    }

    create_symlink(source, link)
        .with_context(|| format!("Failed to create symlink: {}", link.display()))?;
    println!(
        "  {} Linked: {} -> {}",
        "✔".green(),
        link.display(),
        source.display()
    );
    Ok(())
}

/// Remove a file, symlink or directory tree.
pub fn remove(path: &Path, dry_run: bool) -> Result<()> {
    if dry_run {
        println!("  {} Would remove: {}", "→".cyan(), path.display());
        return Ok(());
    }

    remove_entry(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    println!("  {} Removed: {}", "✔".green(), path.display());
    Ok(())
}

fn create_symlink(source: &Path, link: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(source, link)
    }

    #[cfg(windows)]
    {
        if source.is_dir() {
            std::os::windows::fs::symlink_dir(source, link)
        } else {
            std::os::windows::fs::symlink_file(source, link)
        }
    }
}

fn remove_entry(path: &Path) -> std::io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.file_type().is_symlink() {
        #[cfg(windows)]
        {
            // Directory symlinks are directories to the Windows API.
            if fs::metadata(path).is_ok_and(|m| m.is_dir()) {
                return fs::remove_dir(path);
            }
        }
        fs::remove_file(path)
    } else if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

fn copy_entry(src: &Path, dst: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(src)?;
    if meta.file_type().is_symlink() {
        create_symlink(&fs::read_link(src)?, dst)?;
    } else if meta.is_dir() {
        copy_dir_all(src, dst)?;
    } else {
        fs::copy(src, dst)?;
    }
    Ok(())
}

/// Copy a directory recursively, preserving symbolic links.
fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    // Guard against infinite recursion if dst is inside src.
    let src_canon = fs::canonicalize(src)?;
    if let Some(parent) = dst.parent()
        && let Ok(parent_canon) = fs::canonicalize(parent)
        && parent_canon.starts_with(&src_canon)
    {
        anyhow::bail!(
            "Cannot copy directory into itself: {} is inside {}",
            dst.display(),
            src_canon.display()
        );
    }

    if !dst.exists() {
        fs::create_dir_all(dst)?;
    }

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        copy_entry(&entry.path(), &dst.join(entry.file_name()))?;
    }
    Ok(())
}
