//! YOLO plain-text annotation format: one line per object, space-separated
//! `class_id center_x center_y width height`, geometry normalized to [0, 1]
//! relative to the image dimensions, six decimal places.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::error::LabelError;
use crate::models::BoundingBox;

/// One YOLO annotation with normalized geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloLabel {
    pub class_id: u32,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl YoloLabel {
    /// Normalizes a pixel box against the image dimensions.
    ///
    /// Rejects zero-sized images and boxes that extend past the image, so a
    /// successful result always has all four fields in [0, 1].
    pub fn from_box(
        class_id: u32,
        bbox: &BoundingBox,
        img_width: u32,
        img_height: u32,
    ) -> Result<Self, LabelError> {
        if img_width == 0 || img_height == 0 {
            return Err(LabelError::EmptyImage);
        }
        let inside = bbox
            .x
            .checked_add(bbox.width)
            .is_some_and(|right| right <= img_width)
            && bbox
                .y
                .checked_add(bbox.height)
                .is_some_and(|bottom| bottom <= img_height);
        if !inside {
            return Err(LabelError::OutOfBounds {
                x: bbox.x,
                y: bbox.y,
                width: bbox.width,
                height: bbox.height,
                img_width,
                img_height,
            });
        }

        let iw = img_width as f64;
        let ih = img_height as f64;
        Ok(Self {
            class_id,
            cx: (bbox.x as f64 + bbox.width as f64 / 2.0) / iw,
            cy: (bbox.y as f64 + bbox.height as f64 / 2.0) / ih,
            w: bbox.width as f64 / iw,
            h: bbox.height as f64 / ih,
        })
    }

    /// Parses one annotation line.
    pub fn parse_line(line: &str) -> Result<Self, LabelError> {
        let malformed = || LabelError::MalformedLine {
            line: line.to_string(),
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(malformed());
        }
        let class_id: u32 = fields[0].parse().map_err(|_| malformed())?;

        let names = ["cx", "cy", "w", "h"];
        let mut geometry = [0.0f64; 4];
        for (i, field) in fields[1..].iter().enumerate() {
            let value: f64 = field.parse().map_err(|_| malformed())?;
            if !(0.0..=1.0).contains(&value) {
                return Err(LabelError::ValueOutOfRange {
                    field: names[i],
                    value,
                });
            }
            geometry[i] = value;
        }

        Ok(Self {
            class_id,
            cx: geometry[0],
            cy: geometry[1],
            w: geometry[2],
            h: geometry[3],
        })
    }

    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for YoloLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.cx, self.cy, self.w, self.h
        )
    }
}

/// Writes a label file: one annotation per line, newline terminated.
pub fn write_labels(path: &Path, labels: &[YoloLabel]) -> Result<()> {
    let mut out = String::new();
    for label in labels {
        out.push_str(&label.to_line());
        out.push('\n');
    }
    fs::write(path, out)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))
}

/// Reads a label file, skipping blank lines.
pub fn read_labels(path: &Path) -> Result<Vec<YoloLabel>> {
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let mut labels = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let label = YoloLabel::parse_line(line)
            .map_err(|e| anyhow::anyhow!("Invalid label in {}: {}", path.display(), e))?;
        labels.push(label);
    }
    Ok(labels)
}
