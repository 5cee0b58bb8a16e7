use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use image::ImageReader;

use crate::dataset::{class_dirs, list_images};
use crate::detect::{DigitDetector, preprocessing};
use crate::models::BatchSummary;
use crate::pipeline::StagePipeline;
use crate::yolo::{self, YoloLabel};

/// Settings for annotation generation
#[derive(Debug, Clone)]
pub struct LabelOptions {
    pub detector: DigitDetector,
    /// When set, preprocessing output for the first image is dumped under
    /// this directory
    pub debug_out: Option<PathBuf>,
}

impl LabelOptions {
    pub fn new() -> Self {
        Self {
            detector: DigitDetector::new(),
            debug_out: None,
        }
    }
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Annotate every image under `input_dir`'s class directories.
///
/// Each image with a detected digit is copied into `out_dir/images` and a
/// one-line annotation written to `out_dir/labels`, both named
/// `<class>_<stem>`. Images with no detectable digit, or that fail to
/// decode, are reported and counted as failures.
pub fn generate_labels(
    input_dir: &Path,
    out_dir: &Path,
    options: &LabelOptions,
) -> Result<BatchSummary> {
    let classes = class_dirs(input_dir)?;
    if classes.is_empty() {
        return Err(anyhow::anyhow!(
            "No class directories found in {}",
            input_dir.display()
        ));
    }

    let images_dir = out_dir.join("images");
    let labels_dir = out_dir.join("labels");
    fs::create_dir_all(&images_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", images_dir.display(), e))?;
    fs::create_dir_all(&labels_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", labels_dir.display(), e))?;

    let pipeline = options.detector.build_pipeline();
    let mut debug_dir = options.debug_out.clone();
    let mut summary = BatchSummary::default();

    for (class_id, class_dir) in &classes {
        let paths = list_images(class_dir)?;
        if options.detector.verbose {
            println!("Class {}: labelling {} images", class_id, paths.len());
        }

        for path in paths {
            // The first image runs through a debug-dumping pipeline when
            // requested, the rest reuse the plain one.
            let result = match debug_dir.take() {
                Some(dir) => {
                    let debug_pipeline = options.detector.build_pipeline().with_debug(dir)?;
                    label_one(&path, *class_id, options, &debug_pipeline, &images_dir, &labels_dir)
                }
                None => label_one(&path, *class_id, options, &pipeline, &images_dir, &labels_dir),
            };

            match result {
                Ok(()) => summary.record_success(),
                Err(e) => {
                    eprintln!("Warning: skipping {}: {}", path.display(), e);
                    summary.record_failure();
                }
            }
        }
    }

    Ok(summary)
}

fn label_one(
    path: &Path,
    class_id: u32,
    options: &LabelOptions,
    pipeline: &StagePipeline,
    images_dir: &Path,
    labels_dir: &Path,
) -> Result<()> {
    let img = ImageReader::open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", path.display(), e))?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode {}: {}", path.display(), e))?;
    let gray = preprocessing::to_grayscale(&img);

    let bbox = match options.detector.find_box_with(&gray, pipeline)? {
        Some(bbox) => bbox,
        None => return Err(anyhow::anyhow!("No digit found")),
    };

    let label = YoloLabel::from_box(class_id, &bbox, gray.width(), gray.height())?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow::anyhow!("Unusable file name: {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("png");

    let image_dest = images_dir.join(format!("{}_{}.{}", class_id, stem, ext));
    fs::copy(path, &image_dest)
        .map_err(|e| anyhow::anyhow!("Failed to copy {}: {}", path.display(), e))?;

    let label_dest = labels_dir.join(format!("{}_{}.txt", class_id, stem));
    yolo::write_labels(&label_dest, &[label])?;

    Ok(())
}
