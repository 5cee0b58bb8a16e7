use image::{DynamicImage, GrayImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{dilate, open};

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Apply Gaussian blur to reduce noise
pub fn apply_blur(img: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(img, sigma)
}

/// Binarize with Otsu's threshold, inverted: dark glyph pixels on a light
/// background become white foreground.
pub fn otsu_binarize_inverted(img: &GrayImage) -> GrayImage {
    let level = otsu_level(img);
    threshold(img, level, ThresholdType::BinaryInverted)
}

/// Morphological opening with a (2r+1)x(2r+1) square element; clears
/// speckle noise smaller than the element.
pub fn morph_open(img: &GrayImage, radius: u8) -> GrayImage {
    open(img, Norm::LInf, radius)
}

/// Morphological dilation with the same element; thickens thin strokes so
/// broken glyph parts reconnect into one component.
pub fn morph_dilate(img: &GrayImage, radius: u8) -> GrayImage {
    dilate(img, Norm::LInf, radius)
}
