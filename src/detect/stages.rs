use anyhow::Result;
use image::GrayImage;

use crate::detect::preprocessing;
use crate::pipeline::{ImageStage, StageContext};

/// Apply Gaussian blur
pub struct BlurStage {
    pub sigma: f32,
}

impl ImageStage for BlurStage {
    fn apply(&self, img: GrayImage, _context: &StageContext) -> Result<GrayImage> {
        Ok(preprocessing::apply_blur(&img, self.sigma))
    }

    fn name(&self) -> &str {
        "Gaussian Blur"
    }
}

/// Inverted Otsu binarization
pub struct OtsuInvertStage;

impl ImageStage for OtsuInvertStage {
    fn apply(&self, img: GrayImage, _context: &StageContext) -> Result<GrayImage> {
        Ok(preprocessing::otsu_binarize_inverted(&img))
    }

    fn name(&self) -> &str {
        "Otsu Threshold"
    }
}

/// Morphological opening to drop speckle noise
pub struct OpenStage {
    pub radius: u8,
}

impl ImageStage for OpenStage {
    fn apply(&self, img: GrayImage, _context: &StageContext) -> Result<GrayImage> {
        Ok(preprocessing::morph_open(&img, self.radius))
    }

    fn name(&self) -> &str {
        "Morphological Opening"
    }
}

/// Dilation to reconnect broken strokes
pub struct DilateStage {
    pub radius: u8,
}

impl ImageStage for DilateStage {
    fn apply(&self, img: GrayImage, _context: &StageContext) -> Result<GrayImage> {
        Ok(preprocessing::morph_dilate(&img, self.radius))
    }

    fn name(&self) -> &str {
        "Dilation"
    }
}
