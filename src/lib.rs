pub mod carray;
pub mod dataset;
pub mod detect;
pub mod error;
pub mod idx;
pub mod link;
pub mod models;
pub mod pipeline;
pub mod threshold;
pub mod yolo;

pub use detect::DigitDetector;
pub use error::{ArrayError, FormatError, LabelError, LinkError};
pub use models::{BatchSummary, BoundingBox, Region};
pub use pipeline::{DebugConfig, ImageStage, StageContext, StagePipeline};
pub use yolo::YoloLabel;
