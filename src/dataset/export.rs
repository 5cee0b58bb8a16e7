use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::idx;

/// Shape and class distribution of an archive pair
#[derive(Debug, Clone)]
pub struct DatasetInfo {
    pub count: usize,
    pub rows: u32,
    pub cols: u32,
    /// Per-class sample counts sorted by class id, empty when no label
    /// file was supplied
    pub class_counts: Vec<(u8, usize)>,
}

/// Summarize an image archive, optionally cross-checked against its label
/// archive.
pub fn inspect(images_path: &Path, labels_path: Option<&Path>) -> Result<DatasetInfo> {
    let (images, class_counts) = match labels_path {
        Some(labels_path) => {
            let (images, labels) = idx::read_pair(images_path, labels_path)?;

            let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
            for label in &labels {
                *counts.entry(*label).or_insert(0) += 1;
            }

            (images, counts.into_iter().collect())
        }
        None => (idx::read_images(images_path)?, Vec::new()),
    };

    Ok(DatasetInfo {
        count: images.len(),
        rows: images.rows(),
        cols: images.cols(),
        class_counts,
    })
}

/// Export samples from an archive pair as PNG files named
/// `<label>_<index>.png`, up to `limit` of them.
///
/// Returns the number of files written.
pub fn unpack(
    images_path: &Path,
    labels_path: &Path,
    out_dir: &Path,
    limit: Option<usize>,
) -> Result<usize> {
    let (images, labels) = idx::read_pair(images_path, labels_path)?;

    fs::create_dir_all(out_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", out_dir.display(), e))?;

    let count = match limit {
        Some(limit) => images.len().min(limit),
        None => images.len(),
    };

    for index in 0..count {
        let img = images
            .to_gray_image(index)
            .ok_or_else(|| anyhow::anyhow!("Sample {} is out of range", index))?;

        let path = out_dir.join(format!("{}_{:05}.png", labels[index], index));
        img.save(&path)
            .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", path.display(), e))?;
    }

    Ok(count)
}
