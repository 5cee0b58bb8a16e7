//! Codec for the IDX binary container used to distribute MNIST-style
//! datasets.
//!
//! Image files (`*.idx3-ubyte`) carry a 16-byte header of four big-endian
//! u32 fields (magic 2051, image count, rows, cols) followed by
//! `count * rows * cols` row-major u8 pixels. Label files (`*.idx1-ubyte`)
//! carry magic 2049 and a count, followed by `count` u8 class values.
//!
//! Decoding is all-or-nothing: a wrong magic number or a payload that does
//! not exactly match the header-declared size rejects the whole buffer.

use std::fs;
use std::path::Path;

use anyhow::Result;
use image::GrayImage;

use crate::error::FormatError;

/// Magic number opening an IDX image file.
pub const IMAGE_MAGIC: u32 = 2051;
/// Magic number opening an IDX label file.
pub const LABEL_MAGIC: u32 = 2049;

const IMAGE_HEADER_LEN: usize = 16;
const LABEL_HEADER_LEN: usize = 8;

/// An owned set of equally sized grayscale images, as stored in an IDX
/// image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdxImages {
    count: u32,
    rows: u32,
    cols: u32,
    data: Vec<u8>,
}

impl IdxImages {
    /// Wraps a flat pixel buffer, verifying it holds exactly
    /// `count * rows * cols` bytes.
    pub fn new(count: u32, rows: u32, cols: u32, data: Vec<u8>) -> Result<Self, FormatError> {
        let expected = payload_len(count, rows, cols)?;
        if data.len() != expected {
            return Err(FormatError::PayloadMismatch {
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            count,
            rows,
            cols,
            data,
        })
    }

    /// Builds a set from grayscale images, which must all share one size.
    pub fn from_gray_images(images: &[GrayImage]) -> Result<Self, FormatError> {
        let count =
            u32::try_from(images.len()).map_err(|_| FormatError::Oversize { count: images.len() })?;
        let (cols, rows) = images.first().map(|img| img.dimensions()).unwrap_or((0, 0));

        let expected = payload_len(count, rows, cols)?;
        let mut data = Vec::with_capacity(expected);
        for img in images {
            if img.dimensions() != (cols, rows) {
                return Err(FormatError::PayloadMismatch {
                    expected: rows as usize * cols as usize,
                    found: img.as_raw().len(),
                });
            }
            data.extend_from_slice(img.as_raw());
        }

        Ok(Self {
            count,
            rows,
            cols,
            data,
        })
    }

    /// Number of images in the set.
    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Image height in pixels.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Image width in pixels.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Bytes per image.
    pub fn pixels_per_image(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Row-major pixels of one image.
    pub fn image(&self, index: usize) -> Option<&[u8]> {
        if index >= self.len() {
            return None;
        }
        let stride = self.pixels_per_image();
        let start = index * stride;
        Some(&self.data[start..start + stride])
    }

    /// Iterates over the images in index order.
    pub fn images(&self) -> impl Iterator<Item = &[u8]> {
        let stride = self.pixels_per_image();
        (0..self.len()).map(move |i| &self.data[i * stride..i * stride + stride])
    }

    /// Copies one image out as a `GrayImage`.
    pub fn to_gray_image(&self, index: usize) -> Option<GrayImage> {
        let pixels = self.image(index)?;
        GrayImage::from_raw(self.cols, self.rows, pixels.to_vec())
    }

    /// The flat pixel payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Decodes an IDX image buffer.
///
/// Fails with [`FormatError::BadMagic`] when the magic number is not 2051
/// and [`FormatError::PayloadMismatch`] when the byte count after the header
/// differs from `count * rows * cols` in either direction.
pub fn decode_images(bytes: &[u8]) -> Result<IdxImages, FormatError> {
    if bytes.len() < IMAGE_HEADER_LEN {
        return Err(FormatError::Truncated {
            expected: IMAGE_HEADER_LEN,
            found: bytes.len(),
        });
    }
    let magic = be_u32(bytes, 0);
    if magic != IMAGE_MAGIC {
        return Err(FormatError::BadMagic {
            expected: IMAGE_MAGIC,
            found: magic,
        });
    }
    let count = be_u32(bytes, 4);
    let rows = be_u32(bytes, 8);
    let cols = be_u32(bytes, 12);

    let expected = payload_len(count, rows, cols)?;
    let payload = &bytes[IMAGE_HEADER_LEN..];
    if payload.len() != expected {
        return Err(FormatError::PayloadMismatch {
            expected,
            found: payload.len(),
        });
    }

    Ok(IdxImages {
        count,
        rows,
        cols,
        data: payload.to_vec(),
    })
}

/// Decodes an IDX label buffer into raw class values.
pub fn decode_labels(bytes: &[u8]) -> Result<Vec<u8>, FormatError> {
    if bytes.len() < LABEL_HEADER_LEN {
        return Err(FormatError::Truncated {
            expected: LABEL_HEADER_LEN,
            found: bytes.len(),
        });
    }
    let magic = be_u32(bytes, 0);
    if magic != LABEL_MAGIC {
        return Err(FormatError::BadMagic {
            expected: LABEL_MAGIC,
            found: magic,
        });
    }
    let count = be_u32(bytes, 4) as usize;

    let payload = &bytes[LABEL_HEADER_LEN..];
    if payload.len() != count {
        return Err(FormatError::PayloadMismatch {
            expected: count,
            found: payload.len(),
        });
    }

    Ok(payload.to_vec())
}

/// Encodes an image set, header first, payload in index order.
pub fn encode_images(images: &IdxImages) -> Vec<u8> {
    let mut out = Vec::with_capacity(IMAGE_HEADER_LEN + images.data.len());
    out.extend_from_slice(&IMAGE_MAGIC.to_be_bytes());
    out.extend_from_slice(&images.count.to_be_bytes());
    out.extend_from_slice(&images.rows.to_be_bytes());
    out.extend_from_slice(&images.cols.to_be_bytes());
    out.extend_from_slice(&images.data);
    out
}

/// Encodes raw labels. Fails only when the count overflows the header field.
pub fn encode_labels(labels: &[u8]) -> Result<Vec<u8>, FormatError> {
    let count =
        u32::try_from(labels.len()).map_err(|_| FormatError::Oversize { count: labels.len() })?;
    let mut out = Vec::with_capacity(LABEL_HEADER_LEN + labels.len());
    out.extend_from_slice(&LABEL_MAGIC.to_be_bytes());
    out.extend_from_slice(&count.to_be_bytes());
    out.extend_from_slice(labels);
    Ok(out)
}

/// Reads and decodes an IDX image file.
pub fn read_images(path: &Path) -> Result<IdxImages> {
    let bytes = fs::read(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    decode_images(&bytes)
        .map_err(|e| anyhow::anyhow!("Invalid IDX image file {}: {}", path.display(), e))
}

/// Reads and decodes an IDX label file.
pub fn read_labels(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    decode_labels(&bytes)
        .map_err(|e| anyhow::anyhow!("Invalid IDX label file {}: {}", path.display(), e))
}

/// Reads an image/label pair and enforces that their counts agree.
///
/// The two files carry independent counts; every consumer in this crate
/// indexes labels by image position, so a mismatch is rejected here rather
/// than surfacing as an out-of-bounds panic later.
pub fn read_pair(images_path: &Path, labels_path: &Path) -> Result<(IdxImages, Vec<u8>)> {
    let images = read_images(images_path)?;
    let labels = read_labels(labels_path)?;
    if images.len() != labels.len() {
        return Err(FormatError::PairCountMismatch {
            images: images.count,
            labels: labels.len() as u32,
        }
        .into());
    }
    Ok((images, labels))
}

/// Encodes and writes an IDX image file.
pub fn write_images(path: &Path, images: &IdxImages) -> Result<()> {
    fs::write(path, encode_images(images))
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))
}

/// Encodes and writes an IDX label file.
pub fn write_labels(path: &Path, labels: &[u8]) -> Result<()> {
    let bytes = encode_labels(labels)?;
    fs::write(path, bytes)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))
}

fn payload_len(count: u32, rows: u32, cols: u32) -> Result<usize, FormatError> {
    (count as usize)
        .checked_mul(rows as usize)
        .and_then(|n| n.checked_mul(cols as usize))
        .ok_or(FormatError::DimensionsOverflow { count, rows, cols })
}

fn be_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
