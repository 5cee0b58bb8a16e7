use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use std::collections::HashMap;

use crate::models::Region;

/// Find connected foreground components in a binary image.
pub fn find_regions(binary: &GrayImage) -> Vec<Region> {
    // Label connected components (white pixels = foreground)
    let labeled = connected_components(binary, Connectivity::Eight, Luma([0u8]));

    // Fold labeled pixels into per-component extents and counts
    let mut regions: HashMap<u32, (u32, u32, u32, u32, u32)> = HashMap::new();

    for (x, y, label) in labeled.enumerate_pixels() {
        let label_val = label[0];
        if label_val == 0 {
            continue; // Skip background
        }

        regions
            .entry(label_val)
            .and_modify(|(min_x, min_y, max_x, max_y, count)| {
                *min_x = (*min_x).min(x);
                *min_y = (*min_y).min(y);
                *max_x = (*max_x).max(x);
                *max_y = (*max_y).max(y);
                *count += 1;
            })
            .or_insert((x, y, x, y, 1));
    }

    regions
        .into_iter()
        .map(|(label, (min_x, min_y, max_x, max_y, count))| Region {
            label,
            min_x,
            min_y,
            max_x,
            max_y,
            pixel_count: count,
        })
        .collect()
}

/// The component with the most foreground pixels, if any.
pub fn largest_region(regions: Vec<Region>) -> Option<Region> {
    regions.into_iter().max_by_key(|r| r.area())
}
