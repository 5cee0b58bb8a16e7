use std::fs;
use std::path::Path;

use anyhow::Result;
use image::ImageReader;
use image::imageops::FilterType;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::dataset::{
    TEST_IMAGES_NAME, TEST_LABELS_NAME, TRAIN_IMAGES_NAME, TRAIN_LABELS_NAME, class_dirs,
    list_images,
};
use crate::error::FormatError;
use crate::idx::{self, IdxImages};
use crate::models::BatchSummary;

/// Settings for packing a directory tree of images into IDX archives
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Row count every sample is resized to
    pub rows: u32,
    /// Column count every sample is resized to
    pub cols: u32,
    /// Fraction of samples held out into the test pair
    pub test_fraction: f64,
    /// Seed for the held-out shuffle
    pub seed: u64,
    pub verbose: bool,
}

impl PackOptions {
    pub fn new() -> Self {
        Self {
            rows: 28,
            cols: 28,
            test_fraction: 0.0,
            seed: 42,
            verbose: false,
        }
    }
}

impl Default for PackOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a pack run
#[derive(Debug, Clone, Copy)]
pub struct PackReport {
    pub summary: BatchSummary,
    pub train_count: usize,
    pub test_count: usize,
}

/// Pack every readable image under `input_dir`'s class directories into
/// IDX archives in `out_dir`.
///
/// Unreadable images are reported and skipped rather than aborting the
/// run. With a non-zero test fraction the samples are shuffled with the
/// seeded generator before the split, so the held-out set is stable for a
/// given seed.
pub fn pack(input_dir: &Path, out_dir: &Path, options: &PackOptions) -> Result<PackReport> {
    if !(0.0..=1.0).contains(&options.test_fraction) {
        return Err(anyhow::anyhow!(
            "Test fraction must be between 0 and 1, got {}",
            options.test_fraction
        ));
    }

    let classes = class_dirs(input_dir)?;
    if classes.is_empty() {
        return Err(anyhow::anyhow!(
            "No class directories found in {}",
            input_dir.display()
        ));
    }

    let mut summary = BatchSummary::default();
    let mut samples: Vec<(u8, Vec<u8>)> = Vec::new();

    for (class_id, class_dir) in &classes {
        let label = u8::try_from(*class_id).map_err(|_| {
            anyhow::anyhow!("Class id {} does not fit an IDX label byte", class_id)
        })?;

        let paths = list_images(class_dir)?;
        if options.verbose {
            println!("Class {}: {} images", label, paths.len());
        }

        for path in paths {
            match load_sample(&path, options.rows, options.cols) {
                Ok(pixels) => {
                    samples.push((label, pixels));
                    summary.record_success();
                }
                Err(e) => {
                    eprintln!("Warning: skipping {}: {}", path.display(), e);
                    summary.record_failure();
                }
            }
        }
    }

    if options.test_fraction > 0.0 {
        let mut rng = StdRng::seed_from_u64(options.seed);
        samples.shuffle(&mut rng);
    }

    let test_count = (samples.len() as f64 * options.test_fraction) as usize;
    let train_count = samples.len() - test_count;
    let (train, test) = samples.split_at(train_count);

    fs::create_dir_all(out_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", out_dir.display(), e))?;

    let (train_images, train_labels) = build_set(train, options.rows, options.cols)?;
    idx::write_images(&out_dir.join(TRAIN_IMAGES_NAME), &train_images)?;
    idx::write_labels(&out_dir.join(TRAIN_LABELS_NAME), &train_labels)?;

    if !test.is_empty() {
        let (test_images, test_labels) = build_set(test, options.rows, options.cols)?;
        idx::write_images(&out_dir.join(TEST_IMAGES_NAME), &test_images)?;
        idx::write_labels(&out_dir.join(TEST_LABELS_NAME), &test_labels)?;
    }

    if options.verbose {
        println!(
            "Packed {} images ({} train, {} test)",
            samples.len(),
            train_count,
            test.len()
        );
    }

    Ok(PackReport {
        summary,
        train_count,
        test_count: test.len(),
    })
}

/// Load one sample: decode, resize to the archive shape, flatten to
/// grayscale bytes in row-major order.
fn load_sample(path: &Path, rows: u32, cols: u32) -> Result<Vec<u8>> {
    let img = ImageReader::open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", path.display(), e))?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode {}: {}", path.display(), e))?;

    let resized = img.resize_exact(cols, rows, FilterType::Lanczos3);
    Ok(resized.to_luma8().into_raw())
}

fn build_set(samples: &[(u8, Vec<u8>)], rows: u32, cols: u32) -> Result<(IdxImages, Vec<u8>)> {
    let mut data = Vec::with_capacity(samples.len() * rows as usize * cols as usize);
    let mut labels = Vec::with_capacity(samples.len());
    for (label, pixels) in samples {
        labels.push(*label);
        data.extend_from_slice(pixels);
    }

    let count = u32::try_from(samples.len()).map_err(|_| FormatError::Oversize {
        count: samples.len(),
    })?;
    let images = IdxImages::new(count, rows, cols, data)?;

    Ok((images, labels))
}
