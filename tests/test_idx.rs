//! Integration tests for the IDX binary codec.
//!
//! Tests cover:
//! - Decoding well-formed image and label buffers
//! - Header validation: magic numbers, truncation, exact payload length
//! - Encoding layout and file round-trips
//! - Pair loading with mismatched counts

mod common;

use common::*;
use digitprep::error::FormatError;
use digitprep::idx::{self, IMAGE_MAGIC, IdxImages, LABEL_MAGIC};

#[test]
fn test_decode_images() -> anyhow::Result<()> {
    // Two 2x2 samples, pixels 0..8 in row-major order
    let bytes = idx_image_bytes(IMAGE_MAGIC, 2, 2, 2, &[0, 1, 2, 3, 4, 5, 6, 7]);

    let images = idx::decode_images(&bytes)?;

    assert_eq!(images.len(), 2);
    assert_eq!(images.rows(), 2);
    assert_eq!(images.cols(), 2);
    assert_eq!(images.image(0), Some(&[0u8, 1, 2, 3][..]));
    assert_eq!(images.image(1), Some(&[4u8, 5, 6, 7][..]));
    assert_eq!(images.image(2), None);

    Ok(())
}

#[test]
fn test_decode_labels() -> anyhow::Result<()> {
    let bytes = idx_label_bytes(LABEL_MAGIC, 3, &[7, 0, 9]);
    let labels = idx::decode_labels(&bytes)?;
    assert_eq!(labels, vec![7, 0, 9]);
    Ok(())
}

#[test]
fn test_images_iterator_yields_samples_in_order() -> anyhow::Result<()> {
    let payload = [0u8, 1, 2, 3, 4, 5, 6, 7];
    let bytes = idx_image_bytes(IMAGE_MAGIC, 2, 2, 2, &payload);
    let images = idx::decode_images(&bytes)?;

    let samples: Vec<&[u8]> = images.images().collect();
    assert_eq!(samples, vec![&[0u8, 1, 2, 3][..], &[4u8, 5, 6, 7][..]]);

    // The iterator walks the same flat payload the accessor exposes
    assert_eq!(images.data(), &payload[..]);

    Ok(())
}

#[test]
fn test_bad_magic_rejected() {
    // A label magic in an image file must not decode
    let bytes = idx_image_bytes(LABEL_MAGIC, 1, 2, 2, &[0; 4]);
    let err = idx::decode_images(&bytes).unwrap_err();
    assert_eq!(
        err,
        FormatError::BadMagic {
            expected: 2051,
            found: 2049
        }
    );

    let bytes = idx_label_bytes(IMAGE_MAGIC, 1, &[0]);
    let err = idx::decode_labels(&bytes).unwrap_err();
    assert_eq!(
        err,
        FormatError::BadMagic {
            expected: 2049,
            found: 2051
        }
    );
}

#[test]
fn test_truncated_header_rejected() {
    let err = idx::decode_images(&[0, 0, 8]).unwrap_err();
    assert_eq!(
        err,
        FormatError::Truncated {
            expected: 16,
            found: 3
        }
    );

    let err = idx::decode_labels(&[]).unwrap_err();
    assert_eq!(
        err,
        FormatError::Truncated {
            expected: 8,
            found: 0
        }
    );
}

#[test]
fn test_payload_length_must_match_exactly() {
    // One byte short
    let bytes = idx_image_bytes(IMAGE_MAGIC, 2, 2, 2, &[0; 7]);
    let err = idx::decode_images(&bytes).unwrap_err();
    assert_eq!(
        err,
        FormatError::PayloadMismatch {
            expected: 8,
            found: 7
        }
    );

    // Trailing bytes are rejected too
    let bytes = idx_image_bytes(IMAGE_MAGIC, 2, 2, 2, &[0; 9]);
    let err = idx::decode_images(&bytes).unwrap_err();
    assert_eq!(
        err,
        FormatError::PayloadMismatch {
            expected: 8,
            found: 9
        }
    );

    let bytes = idx_label_bytes(LABEL_MAGIC, 4, &[1, 2, 3]);
    let err = idx::decode_labels(&bytes).unwrap_err();
    assert_eq!(
        err,
        FormatError::PayloadMismatch {
            expected: 4,
            found: 3
        }
    );
}

#[test]
fn test_zero_dimension_buffers_decode() -> anyhow::Result<()> {
    let bytes = idx_image_bytes(IMAGE_MAGIC, 0, 28, 28, &[]);
    let images = idx::decode_images(&bytes)?;
    assert!(images.is_empty());

    // Zero rows/cols with a non-zero count is degenerate but well-formed
    let bytes = idx_image_bytes(IMAGE_MAGIC, 3, 0, 0, &[]);
    let images = idx::decode_images(&bytes)?;
    assert_eq!(images.len(), 3);
    assert_eq!(images.pixels_per_image(), 0);
    let empty: &[u8] = &[];
    assert_eq!(images.image(1), Some(empty));

    Ok(())
}

#[test]
fn test_encode_layout() -> anyhow::Result<()> {
    let images = IdxImages::new(2, 2, 2, vec![0, 1, 2, 3, 4, 5, 6, 7])?;
    let bytes = idx::encode_images(&images);
    assert_eq!(
        bytes,
        idx_image_bytes(IMAGE_MAGIC, 2, 2, 2, &[0, 1, 2, 3, 4, 5, 6, 7])
    );

    let labels = idx::encode_labels(&[7, 1])?;
    assert_eq!(labels, idx_label_bytes(LABEL_MAGIC, 2, &[7, 1]));

    Ok(())
}

#[test]
fn test_file_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let images_path = dir.path().join("train-images.idx3-ubyte");
    let labels_path = dir.path().join("train-labels.idx1-ubyte");

    let samples = vec![digit_image(28, 28, 5, 5, 10, 14), blank_image(28, 28)];
    let images = IdxImages::from_gray_images(&samples)?;
    idx::write_images(&images_path, &images)?;
    idx::write_labels(&labels_path, &[3, 8])?;

    let (reloaded, labels) = idx::read_pair(&images_path, &labels_path)?;
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.rows(), 28);
    assert_eq!(reloaded.cols(), 28);
    assert_eq!(labels, vec![3, 8]);

    let first = reloaded.to_gray_image(0).expect("first sample");
    assert_eq!(first.as_raw(), samples[0].as_raw());

    Ok(())
}

#[test]
fn test_read_pair_count_mismatch() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let images_path = dir.path().join("images.idx3-ubyte");
    let labels_path = dir.path().join("labels.idx1-ubyte");

    let images = IdxImages::new(2, 2, 2, vec![0; 8])?;
    idx::write_images(&images_path, &images)?;
    idx::write_labels(&labels_path, &[1, 2, 3])?;

    let err = idx::read_pair(&images_path, &labels_path).unwrap_err();
    assert!(err.to_string().contains("2 images but 3 labels"));

    Ok(())
}

#[test]
fn test_mismatched_sample_sizes_rejected() {
    let samples = vec![blank_image(28, 28), blank_image(28, 27)];
    let err = IdxImages::from_gray_images(&samples).unwrap_err();
    assert!(matches!(err, FormatError::PayloadMismatch { .. }));
}

#[test]
fn test_dimension_overflow_rejected() {
    let err = IdxImages::new(u32::MAX, u32::MAX, u32::MAX, Vec::new()).unwrap_err();
    assert_eq!(
        err,
        FormatError::DimensionsOverflow {
            count: u32::MAX,
            rows: u32::MAX,
            cols: u32::MAX
        }
    );
}
