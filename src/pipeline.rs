use std::path::PathBuf;

use anyhow::Result;
use image::GrayImage;

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
    /// Whether debug mode is enabled
    pub enabled: bool,
}

/// Context available to all pipeline stages
#[derive(Clone, Debug, Default)]
pub struct StageContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

/// A grayscale-to-grayscale transform in a preprocessing chain.
pub trait ImageStage: Send + Sync {
    /// Process the image and return the transformed result.
    fn apply(&self, img: GrayImage, context: &StageContext) -> Result<GrayImage>;

    /// Human-readable name (verbose output and debug directory names).
    fn name(&self) -> &str;
}

/// Composable linear pipeline of image stages.
///
/// With debug mode enabled, the input and every stage output are saved as
/// PNGs under step-numbered directories, so a run can be inspected offline.
pub struct StagePipeline {
    stages: Vec<Box<dyn ImageStage>>,
    context: StageContext,
}

impl StagePipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            context: StageContext {
                verbose: false,
                debug: None,
            },
        }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig {
            output_dir,
            enabled: true,
        });

        Ok(self)
    }

    /// Add a processing stage to the pipeline
    pub fn add_stage(mut self, stage: Box<dyn ImageStage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Run the stages in order on an input image.
    pub fn run(&self, input: GrayImage) -> Result<GrayImage> {
        self.save_debug_output("00_input", &input)?;

        let mut img = input;
        for (stage_idx, stage) in self.stages.iter().enumerate() {
            if self.context.verbose {
                println!("Running stage: {}", stage.name());
            }

            img = stage.apply(img, &self.context)?;

            let dir_name = format!(
                "{:02}_{}",
                stage_idx + 1,
                stage.name().to_lowercase().replace(" ", "_")
            );
            self.save_debug_output(&dir_name, &img)?;
        }

        Ok(img)
    }

    fn save_debug_output(&self, dir_name: &str, img: &GrayImage) -> Result<()> {
        if let Some(debug_config) = &self.context.debug {
            if !debug_config.enabled {
                return Ok(());
            }

            let stage_dir = debug_config.output_dir.join(dir_name);
            std::fs::create_dir_all(&stage_dir)?;

            let output_path = stage_dir.join("01.png");
            img.save(&output_path)
                .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;

            if self.context.verbose {
                println!("  Debug: saved {}/01.png", dir_name);
            }
        }

        Ok(())
    }
}

impl Default for StagePipeline {
    fn default() -> Self {
        Self::new()
    }
}
