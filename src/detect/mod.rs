pub mod preprocessing;
pub mod regions;
pub mod stages;

use anyhow::Result;
use image::GrayImage;

use crate::models::BoundingBox;
use crate::pipeline::StagePipeline;

/// Main digit localization orchestrator
///
/// Binarizes a grayscale scan with inverted Otsu thresholding, cleans the
/// mask with morphology, and returns the bounding box of the largest
/// connected component. Boxes below the noise floor are discarded.
#[derive(Debug, Clone)]
pub struct DigitDetector {
    pub blur_sigma: f32,
    pub morph_radius: u8,
    /// Components with a bounding box smaller than this are treated as noise
    pub min_box_area: u64,
    pub verbose: bool,
}

impl DigitDetector {
    pub fn new() -> Self {
        Self {
            blur_sigma: 1.1,
            morph_radius: 1,
            min_box_area: 200,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Build the standard preprocessing chain for this detector's parameters.
    pub fn build_pipeline(&self) -> StagePipeline {
        use crate::detect::stages::*;

        StagePipeline::new()
            .with_verbose(self.verbose)
            .add_stage(Box::new(BlurStage {
                sigma: self.blur_sigma,
            }))
            .add_stage(Box::new(OtsuInvertStage))
            .add_stage(Box::new(OpenStage {
                radius: self.morph_radius,
            }))
            .add_stage(Box::new(DilateStage {
                radius: self.morph_radius,
            }))
    }

    /// Locate the dominant dark shape in a grayscale image.
    ///
    /// Returns `None` when the image contains no foreground, or when the
    /// largest component is too small to be a digit.
    pub fn find_box(&self, gray: &GrayImage) -> Result<Option<BoundingBox>> {
        let pipeline = self.build_pipeline();
        self.find_box_with(gray, &pipeline)
    }

    /// Like [`find_box`](Self::find_box), but runs a caller-supplied
    /// pipeline so debug output can be captured for a chosen image.
    pub fn find_box_with(
        &self,
        gray: &GrayImage,
        pipeline: &StagePipeline,
    ) -> Result<Option<BoundingBox>> {
        let binary = pipeline.run(gray.clone())?;

        let all_regions = regions::find_regions(&binary);

        if self.verbose {
            println!("Found {} connected components", all_regions.len());
        }

        let largest = match regions::largest_region(all_regions) {
            Some(region) => region,
            None => {
                if self.verbose {
                    println!("No foreground found");
                }
                return Ok(None);
            }
        };

        let bbox = largest.bounding_box();

        if bbox.area() < self.min_box_area {
            if self.verbose {
                println!(
                    "Largest component {}x{} is below the noise floor, skipping",
                    bbox.width, bbox.height
                );
            }
            return Ok(None);
        }

        if self.verbose {
            let (cx, cy) = bbox.center();
            println!(
                "Digit box: x={} y={} w={} h={} center=({},{}) ({} px)",
                bbox.x, bbox.y, bbox.width, bbox.height, cx, cy, largest.pixel_count
            );
        }

        Ok(Some(bbox))
    }
}

impl Default for DigitDetector {
    fn default() -> Self {
        Self::new()
    }
}
