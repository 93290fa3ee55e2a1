use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::layout::{Layout, IMAGES_DIR, RAW_LOG_FILE};
use crate::slug::RepoSlug;

fn move_path(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to)
        .with_context(|| format!("Failed to move {} to {}", from.display(), to.display()))?;
    info!(from = %from.display(), to = %to.display(), "moved");
    Ok(())
}

/// Fail when the archive directory for `slug` already exists
pub fn ensure_target_free(layout: &Layout, slug: &RepoSlug) -> Result<PathBuf> {
    let target = layout.archive_dir(&slug.archive_name());
    if target.exists() {
        bail!(
            "Archive directory already exists: {} (move it away and run again)",
            target.display()
        );
    }
    Ok(target)
}

/// Gather the working directories into `<owner>-<repo>/`.
///
/// Images land in `<owner>-<repo>/images` and the audit log next to the
/// documents. Only call this after a complete fetch: until then the working
/// locations are what a re-run resumes from.
pub fn finalize(layout: &Layout, slug: &RepoSlug) -> Result<PathBuf> {
    let markdown_dir = layout.markdown_dir();
    let target = ensure_target_free(layout, slug)?;

    if !markdown_dir.is_dir() {
        bail!("Nothing to archive: {} is missing", markdown_dir.display());
    }

    let nested_images = markdown_dir.join(IMAGES_DIR);
    if nested_images.exists() {
        bail!("{} already exists", nested_images.display());
    }

    let images_dir = layout.images_dir();
    if images_dir.exists() {
        move_path(&images_dir, &nested_images)?;
    }

    let raw_log = layout.raw_log_path();
    if raw_log.exists() {
        move_path(&raw_log, &markdown_dir.join(RAW_LOG_FILE))?;
    }

    move_path(&markdown_dir, &target)?;
    Ok(target)
}
