use std::io::{self, Read, Write};
use std::time::Duration;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use serialport::SerialPort;

use crate::error::LinkError;

pub const DEFAULT_BAUD: u32 = 115_200;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_FRAME_WIDTH: u32 = 64;
pub const DEFAULT_FRAME_HEIGHT: u32 = 64;

/// Open a serial port for frame exchange.
pub fn open_port(
    path: &str,
    baud: u32,
    timeout: Duration,
) -> Result<Box<dyn SerialPort>, LinkError> {
    let port = serialport::new(path, baud).timeout(timeout).open()?;
    Ok(port)
}

/// Send a frame and read back a response of the same length.
///
/// The device is expected to echo one processed frame per received frame.
/// Reading stops at end-of-stream or timeout, and a response shorter than
/// the frame is an error carrying both counts.
pub fn exchange<P: Read + Write>(port: &mut P, frame: &[u8]) -> Result<Vec<u8>, LinkError> {
    port.write_all(frame)?;
    port.flush()?;

    let mut response = vec![0u8; frame.len()];
    let mut received = 0;

    while received < response.len() {
        match port.read(&mut response[received..]) {
            Ok(0) => break,
            Ok(n) => received += n,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(LinkError::Io(e)),
        }
    }

    if received < response.len() {
        return Err(LinkError::ShortResponse {
            expected: response.len(),
            received,
        });
    }

    Ok(response)
}

/// Flatten an image into a grayscale frame of the given shape, row-major.
pub fn image_to_frame(img: &DynamicImage, width: u32, height: u32) -> Vec<u8> {
    img.resize_exact(width, height, FilterType::Lanczos3)
        .to_luma8()
        .into_raw()
}

/// Reassemble a received frame into an image. Returns `None` when the
/// byte count does not match the shape.
pub fn frame_to_image(frame: &[u8], width: u32, height: u32) -> Option<GrayImage> {
    if frame.len() as u64 != u64::from(width) * u64::from(height) {
        return None;
    }
    GrayImage::from_raw(width, height, frame.to_vec())
}
