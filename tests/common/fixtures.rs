use image::{GrayImage, ImageBuffer, Luma};
use std::fs;
use tempfile::TempDir;

/// Creates a light canvas with a dark rectangle at the given position,
/// standing in for a photographed digit.
pub fn digit_image(width: u32, height: u32, x0: u32, y0: u32, w: u32, h: u32) -> GrayImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        if x >= x0 && x < x0 + w && y >= y0 && y < y0 + h {
            Luma([20u8])
        } else {
            Luma([240u8])
        }
    })
}

/// Uniform light canvas with nothing on it.
pub fn blank_image(width: u32, height: u32) -> GrayImage {
    ImageBuffer::from_pixel(width, height, Luma([240u8]))
}

/// Horizontal gradient: column x has intensity x modulo 256.
pub fn gradient_image(width: u32, height: u32) -> GrayImage {
    ImageBuffer::from_fn(width, height, |x, _| Luma([(x % 256) as u8]))
}

/// Raw IDX image-file bytes with the given header fields and payload.
pub fn idx_image_bytes(magic: u32, count: u32, rows: u32, cols: u32, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&magic.to_be_bytes());
    bytes.extend_from_slice(&count.to_be_bytes());
    bytes.extend_from_slice(&rows.to_be_bytes());
    bytes.extend_from_slice(&cols.to_be_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

/// Raw IDX label-file bytes with the given header fields and payload.
pub fn idx_label_bytes(magic: u32, count: u32, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&magic.to_be_bytes());
    bytes.extend_from_slice(&count.to_be_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

/// Creates a temp directory with numeric class subdirectories, each holding
/// `count` synthetic digit photos named `img00.png`, `img01.png`, ...
pub fn class_tree(classes: &[(u32, usize)]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp directory");
    for (class_id, count) in classes {
        let class_dir = dir.path().join(class_id.to_string());
        fs::create_dir(&class_dir).expect("Failed to create class directory");
        for i in 0..*count {
            let img = digit_image(100, 100, 20 + (i as u32 % 10), 25, 40, 50);
            img.save(class_dir.join(format!("img{:02}.png", i)))
                .expect("Failed to save test image");
        }
    }
    dir
}
