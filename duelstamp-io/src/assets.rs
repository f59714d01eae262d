//! Loads the reference images the classifiers run against: the
//! character-select marker and the per-side galleries of name-label
//! images. Gallery files carry a side prefix and the displayed name,
//! e.g. `hq1_Gustav.png`; prefix and extension are stripped to obtain
//! the label.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use opencv::core::Mat;
use opencv::imgcodecs;
use opencv::prelude::*;

/// Reads a single reference template as grayscale.
pub fn load_reference(path: &Path) -> Result<Mat> {
    let img = imgcodecs::imread(&path.to_string_lossy(), imgcodecs::IMREAD_GRAYSCALE)
        .with_context(|| format!("reading `{}`", path.display()))?;
    if img.empty() {
        return Err(anyhow!("`{}` is not a readable image", path.display()));
    }
    Ok(img)
}

/// Reads every `.png` in `dir` as a grayscale template labeled by its file
/// name with `prefix` and the extension stripped. Entries are sorted by
/// label so gallery scans are deterministic across platforms.
pub fn load_name_gallery(dir: &Path, prefix: &str) -> Result<Vec<(String, Mat)>> {
    let mut entries = Vec::new();
    let listing =
        std::fs::read_dir(dir).with_context(|| format!("listing `{}`", dir.display()))?;
    for entry in listing {
        let path = entry?.path();
        if path.extension().map_or(true, |ext| ext != "png") {
            continue;
        }
        let img = imgcodecs::imread(&path.to_string_lossy(), imgcodecs::IMREAD_GRAYSCALE)?;
        if img.empty() {
            tracing::warn!(file = %path.display(), "skipping unreadable gallery image");
            continue;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = stem.strip_prefix(prefix).unwrap_or(&stem).to_string();
        entries.push((name, img));
    }
    if entries.is_empty() {
        return Err(anyhow!("no name images found in `{}`", dir.display()));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}
