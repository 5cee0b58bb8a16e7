//! Integration tests for brightest-pixel selection.
//!
//! Tests cover:
//! - Histogram-driven level selection
//! - The inclusive mask keeping at least the requested count
//! - Degenerate targets: zero, and more pixels than the image has

mod common;

use common::*;
use digitprep::threshold;

#[test]
fn test_selects_exactly_the_brightest_pixels() {
    // One pixel per intensity, so counts are exact
    let img = gradient_image(256, 1);

    let hist = threshold::intensity_histogram(&img);
    assert_eq!(threshold::brightest_level(&hist, 10), 246);

    let (mask, level) = threshold::select_brightest(&img, 10);
    assert_eq!(level, 246);
    assert_eq!(threshold::count_white(&mask), 10);

    // The kept pixels are the ten brightest columns
    for x in 0..256u32 {
        let expected = if x >= 246 { 255 } else { 0 };
        assert_eq!(mask.get_pixel(x, 0)[0], expected, "column {}", x);
    }
}

#[test]
fn test_level_is_inclusive() {
    let img = gradient_image(256, 1);
    let mask = threshold::apply_level(&img, 200);

    // Pixels at exactly the level survive
    assert_eq!(mask.get_pixel(200, 0)[0], 255);
    assert_eq!(mask.get_pixel(199, 0)[0], 0);
    assert_eq!(threshold::count_white(&mask), 56);
}

#[test]
fn test_ties_keep_more_than_requested() {
    // Uniform image: the cut level ties every pixel, all are kept
    let img = blank_image(10, 10);

    let (mask, level) = threshold::select_brightest(&img, 5);
    assert_eq!(level, 240);
    assert_eq!(threshold::count_white(&mask), 100);
}

#[test]
fn test_small_image_keeps_everything() {
    let img = gradient_image(16, 1);

    let hist = threshold::intensity_histogram(&img);
    assert_eq!(threshold::brightest_level(&hist, 1000), 0);

    let (mask, _) = threshold::select_brightest(&img, 1000);
    assert_eq!(threshold::count_white(&mask), 16);
}

#[test]
fn test_zero_target_selects_top_bin() {
    let img = gradient_image(256, 1);
    let hist = threshold::intensity_histogram(&img);
    assert_eq!(threshold::brightest_level(&hist, 0), 255);
}

#[test]
fn test_histogram_counts_every_pixel() {
    let img = gradient_image(64, 4);

    let hist = threshold::intensity_histogram(&img);
    let total: u64 = hist.iter().map(|&n| u64::from(n)).sum();
    assert_eq!(total, 64 * 4);
    // Four rows of the same gradient: four pixels per column intensity
    assert_eq!(hist[0], 4);
    assert_eq!(hist[63], 4);
    assert_eq!(hist[64], 0);
}
