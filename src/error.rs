use thiserror::Error;

// Error types for the codec and transport layers. Batch tooling wraps these
// in anyhow at the call site; the enums stay small and value-carrying so
// tests can match on exact failures.

/// Errors raised by the IDX binary codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("IDX header truncated: need at least {expected} bytes, got {found}")]
    Truncated { expected: usize, found: usize },
    #[error("bad IDX magic number: expected {expected}, found {found}")]
    BadMagic { expected: u32, found: u32 },
    #[error("IDX payload length mismatch: header declares {expected} bytes, found {found}")]
    PayloadMismatch { expected: usize, found: usize },
    #[error("image/label pair mismatch: {images} images but {labels} labels")]
    PairCountMismatch { images: u32, labels: u32 },
    #[error("dimensions {count}x{rows}x{cols} overflow the addressable payload size")]
    DimensionsOverflow { count: u32, rows: u32, cols: u32 },
    #[error("item count {count} does not fit a 32-bit IDX header field")]
    Oversize { count: usize },
}

/// Errors raised when parsing C byte-array source back into bytes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArrayError {
    #[error("no array initializer found in source")]
    MissingArray,
    #[error("invalid byte literal in array: {token:?}")]
    InvalidByte { token: String },
    #[error("no length constant found in source")]
    MissingLength,
    #[error("length constant declares {declared} bytes but array holds {actual}")]
    LengthMismatch { declared: usize, actual: usize },
}

/// Errors raised by YOLO label construction and parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LabelError {
    #[error("image has zero width or height")]
    EmptyImage,
    #[error(
        "box at ({x}, {y}) sized {width}x{height} does not fit inside a {img_width}x{img_height} image"
    )]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        img_width: u32,
        img_height: u32,
    },
    #[error("malformed label line: {line:?}")]
    MalformedLine { line: String },
    #[error("label field {field} out of range: {value}")]
    ValueOutOfRange { field: &'static str, value: f64 },
}

/// Errors raised by the serial frame exchange.
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("failed to open serial port: {0}")]
    Open(#[from] serialport::Error),
    #[error("serial I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("short response: expected {expected} bytes, received {received}")]
    ShortResponse { expected: usize, received: usize },
}
