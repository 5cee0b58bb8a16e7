use std::fs;
use std::path::Path;

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::dataset::list_images;
use crate::models::BatchSummary;

/// Settings for the train/val split
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Fraction of pairs assigned to the training set
    pub train_fraction: f64,
    /// Seed for the assignment shuffle
    pub seed: u64,
    pub verbose: bool,
}

impl SplitOptions {
    pub fn new() -> Self {
        Self {
            train_fraction: 0.8,
            seed: 42,
            verbose: false,
        }
    }
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a split run
#[derive(Debug, Clone, Copy)]
pub struct SplitReport {
    pub summary: BatchSummary,
    pub train: usize,
    pub val: usize,
}

/// Shuffle the image/label pairs under `input_dir` and copy them into
/// `out_dir/{images,labels}/{train,val}`.
///
/// The shuffle is seeded, so the same inputs and seed always produce the
/// same assignment. An image without a matching label file is reported
/// and counted as a failure, and neither file is copied.
pub fn split(input_dir: &Path, out_dir: &Path, options: &SplitOptions) -> Result<SplitReport> {
    if !(0.0..=1.0).contains(&options.train_fraction) {
        return Err(anyhow::anyhow!(
            "Train fraction must be between 0 and 1, got {}",
            options.train_fraction
        ));
    }

    let images_dir = input_dir.join("images");
    let labels_dir = input_dir.join("labels");
    if !images_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Images directory not found: {}",
            images_dir.display()
        ));
    }
    if !labels_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Labels directory not found: {}",
            labels_dir.display()
        ));
    }

    let mut paths = list_images(&images_dir)?;
    if paths.is_empty() {
        return Err(anyhow::anyhow!(
            "No images found in {}",
            images_dir.display()
        ));
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    paths.shuffle(&mut rng);

    let train_count = (paths.len() as f64 * options.train_fraction) as usize;

    let train_images = out_dir.join("images").join("train");
    let val_images = out_dir.join("images").join("val");
    let train_labels = out_dir.join("labels").join("train");
    let val_labels = out_dir.join("labels").join("val");
    for dir in [&train_images, &val_images, &train_labels, &val_labels] {
        fs::create_dir_all(dir)
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", dir.display(), e))?;
    }

    let mut summary = BatchSummary::default();
    let mut train = 0usize;
    let mut val = 0usize;

    for (index, path) in paths.iter().enumerate() {
        let (dest_images, dest_labels, tally) = if index < train_count {
            (&train_images, &train_labels, &mut train)
        } else {
            (&val_images, &val_labels, &mut val)
        };

        match copy_pair(path, &labels_dir, dest_images, dest_labels) {
            Ok(()) => {
                *tally += 1;
                summary.record_success();
            }
            Err(e) => {
                eprintln!("Warning: skipping {}: {}", path.display(), e);
                summary.record_failure();
            }
        }
    }

    if options.verbose {
        println!(
            "Split {} pairs: {} train, {} val",
            summary.succeeded, train, val
        );
    }

    Ok(SplitReport {
        summary,
        train,
        val,
    })
}

fn copy_pair(
    image_path: &Path,
    labels_dir: &Path,
    dest_images: &Path,
    dest_labels: &Path,
) -> Result<()> {
    let stem = image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow::anyhow!("Unusable file name: {}", image_path.display()))?;
    let file_name = image_path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow::anyhow!("Unusable file name: {}", image_path.display()))?;

    let label_path = labels_dir.join(format!("{}.txt", stem));
    if !label_path.is_file() {
        return Err(anyhow::anyhow!(
            "Missing label file {}",
            label_path.display()
        ));
    }

    // A failed pair leaves no partial state: the label goes first and is
    // removed again when the image copy fails.
    let dest_label = dest_labels.join(format!("{}.txt", stem));
    fs::copy(&label_path, &dest_label)
        .map_err(|e| anyhow::anyhow!("Failed to copy {}: {}", label_path.display(), e))?;
    if let Err(e) = fs::copy(image_path, dest_images.join(file_name)) {
        let _ = fs::remove_file(&dest_label);
        return Err(anyhow::anyhow!(
            "Failed to copy {}: {}",
            image_path.display(),
            e
        ));
    }

    Ok(())
}
