use std::fmt;

/// Axis-aligned box in pixel coordinates of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Area in pixels of the box itself (not of its contents).
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Center coordinates, rounded down.
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// One connected foreground component found in a binary image.
#[derive(Debug, Clone)]
pub struct Region {
    pub label: u32,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub pixel_count: u32,
}

impl Region {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Foreground pixels inside the component.
    pub fn area(&self) -> u32 {
        self.pixel_count
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            x: self.min_x,
            y: self.min_y,
            width: self.width(),
            height: self.height(),
        }
    }
}

/// Success/failure counters for a batch run.
///
/// Batch tools report each failed item as it happens, keep going, and print
/// these totals at the end; a failure never aborts the remaining items.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} succeeded, {} failed", self.succeeded, self.failed)
    }
}
