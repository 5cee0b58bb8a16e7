pub mod export;
pub mod ingest;
pub mod labels;
pub mod split;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

/// File extensions accepted when scanning for sample images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Conventional archive file names, kept for drop-in compatibility with
/// tooling that expects the historical layout.
pub const TRAIN_IMAGES_NAME: &str = "train-images.idx3-ubyte";
pub const TRAIN_LABELS_NAME: &str = "train-labels.idx1-ubyte";
pub const TEST_IMAGES_NAME: &str = "t10k-images.idx3-ubyte";
pub const TEST_LABELS_NAME: &str = "t10k-labels.idx1-ubyte";

pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// List the image files directly inside `dir`, sorted by path.
///
/// Sorting keeps scan order stable across platforms, so seeded shuffles
/// are reproducible.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image_path(path))
        .collect();
    paths.sort();

    Ok(paths)
}

/// Find class subdirectories of `root`: directories whose name is a bare
/// decimal number, which doubles as the class id. Returned sorted by id.
pub fn class_dirs(root: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let entries = fs::read_dir(root)
        .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", root.display(), e))?;

    let mut dirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let name = match path.file_name().and_then(|s| s.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        if let Ok(class_id) = name.parse::<u32>() {
            dirs.push((class_id, path));
        }
    }
    dirs.sort_by_key(|&(class_id, _)| class_id);

    Ok(dirs)
}
