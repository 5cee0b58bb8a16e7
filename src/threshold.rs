use image::{GrayImage, Luma};
use imageproc::stats::histogram;

/// Intensity histogram of a grayscale image (256 bins).
pub fn intensity_histogram(img: &GrayImage) -> [u32; 256] {
    histogram(img).channels[0]
}

/// Find the lowest intensity level whose "at least this bright" population
/// reaches `target` pixels.
///
/// Walks the histogram from 255 downwards and returns the first level at
/// which the cumulative count reaches the target. Returns 0 when the image
/// has fewer than `target` pixels in total, so the mask keeps everything.
pub fn brightest_level(hist: &[u32; 256], target: u64) -> u8 {
    let mut cumulative: u64 = 0;
    for level in (0..=255u8).rev() {
        cumulative += u64::from(hist[level as usize]);
        if cumulative >= target {
            return level;
        }
    }
    0
}

/// Binarize an image against a level: pixels at or above it become white,
/// the rest black.
///
/// The compare is inclusive so that the mask produced from
/// [`brightest_level`] keeps at least `target` pixels whenever the image
/// has that many.
pub fn apply_level(img: &GrayImage, level: u8) -> GrayImage {
    let mut mask = GrayImage::from_pixel(img.width(), img.height(), Luma([0u8]));

    for (x, y, pixel) in img.enumerate_pixels() {
        if pixel[0] >= level {
            mask.put_pixel(x, y, Luma([255u8]));
        }
    }

    mask
}

/// Number of non-black pixels in a mask.
pub fn count_white(mask: &GrayImage) -> u64 {
    mask.pixels().filter(|p| p[0] > 0).count() as u64
}

/// Keep the `count` brightest pixels of an image as a white-on-black mask.
///
/// Returns the mask together with the intensity level that was selected.
pub fn select_brightest(img: &GrayImage, count: u64) -> (GrayImage, u8) {
    let hist = intensity_histogram(img);
    let level = brightest_level(&hist, count);
    (apply_level(img, level), level)
}
