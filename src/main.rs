use clap::{Args, Parser, Subcommand};
use image::ImageReader;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use digitprep::DigitDetector;
use digitprep::carray::{self, CArray};
use digitprep::dataset::export::{self, DatasetInfo};
use digitprep::dataset::ingest::{self, PackOptions};
use digitprep::dataset::labels::{self, LabelOptions};
use digitprep::dataset::split::{self, SplitOptions};
use digitprep::link;
use digitprep::threshold;

#[derive(Parser)]
#[command(name = "digitprep")]
#[command(about = "Prepare handwritten digit datasets for embedded classifiers")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Pack class directories of images into IDX archives
    Pack(PackArgs),
    /// Export archive samples back to PNG files
    Unpack(UnpackArgs),
    /// Summarize an archive, optionally with its labels
    Info(InfoArgs),
    /// Generate YOLO annotations for photographed digits
    Labels(LabelsArgs),
    /// Split an annotated dataset into train and val sets
    Split(SplitArgs),
    /// Render a binary model file as a C byte array
    Embed(EmbedArgs),
    /// Check a generated C array against its source binary
    Verify(VerifyArgs),
    /// Keep only the brightest pixels of an image
    Threshold(ThresholdArgs),
    /// Exchange one image frame with a device over a serial port
    Send(SendArgs),
}

#[derive(Args)]
struct PackArgs {
    /// Directory of numeric class subdirectories
    #[arg(value_name = "DIR")]
    input_dir: PathBuf,

    /// Output directory for the archives
    #[arg(long, value_name = "DIR", default_value = "MNIST-dataset")]
    out_dir: PathBuf,

    /// Sample height in pixels
    #[arg(long, default_value_t = 28)]
    rows: u32,

    /// Sample width in pixels
    #[arg(long, default_value_t = 28)]
    cols: u32,

    /// Fraction of samples held out as the test set
    #[arg(long, default_value_t = 0.0)]
    test_fraction: f64,

    /// Shuffle seed for the held-out split
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Args)]
struct UnpackArgs {
    /// Image archive
    #[arg(value_name = "IMAGES")]
    images: PathBuf,

    /// Label archive
    #[arg(value_name = "LABELS")]
    labels: PathBuf,

    /// Output directory for PNG files
    #[arg(long, value_name = "DIR", default_value = "samples")]
    out_dir: PathBuf,

    /// Export at most this many samples
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args)]
struct InfoArgs {
    /// Image archive
    #[arg(value_name = "IMAGES")]
    images: PathBuf,

    /// Label archive, for a per-class histogram
    #[arg(long, value_name = "LABELS")]
    labels: Option<PathBuf>,
}

#[derive(Args)]
struct LabelsArgs {
    /// Directory of numeric class subdirectories
    #[arg(value_name = "DIR")]
    input_dir: PathBuf,

    /// Output directory for the images/ and labels/ trees
    #[arg(long, value_name = "DIR", default_value = "dataset_yolo")]
    out_dir: PathBuf,

    /// Gaussian blur strength before thresholding
    #[arg(long, default_value_t = 1.1)]
    blur_sigma: f32,

    /// Radius of the morphological cleanup kernel
    #[arg(long, default_value_t = 1)]
    morph_radius: u8,

    /// Discard boxes covering fewer pixels than this
    #[arg(long, default_value_t = 200)]
    min_box_area: u64,

    /// Save preprocessing outputs for the first image to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

#[derive(Args)]
struct SplitArgs {
    /// Dataset directory holding images/ and labels/
    #[arg(value_name = "DIR")]
    input_dir: PathBuf,

    /// Output directory for the split tree
    #[arg(long, value_name = "DIR", default_value = "yolo_data")]
    out_dir: PathBuf,

    /// Fraction of pairs assigned to the training set
    #[arg(long, default_value_t = 0.8)]
    train_fraction: f64,

    /// Shuffle seed for the assignment
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Args)]
struct EmbedArgs {
    /// Binary model file
    #[arg(value_name = "MODEL")]
    model: PathBuf,

    /// C identifier for the generated array
    #[arg(long, default_value = "g_model_data")]
    name: String,

    /// Output directory for the header/source pair
    #[arg(long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Payload bytes per source line
    #[arg(long, default_value_t = carray::DEFAULT_BYTES_PER_LINE)]
    bytes_per_line: usize,
}

#[derive(Args)]
struct VerifyArgs {
    /// Generated C source file
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Binary model file to compare against
    #[arg(value_name = "MODEL")]
    model: PathBuf,
}

#[derive(Args)]
struct ThresholdArgs {
    /// Input image
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Number of brightest pixels to keep
    #[arg(long, default_value_t = 1000)]
    count: u64,

    /// Where to save the mask
    #[arg(long, value_name = "FILE", default_value = "threshold.png")]
    out: PathBuf,
}

#[derive(Args)]
struct SendArgs {
    /// Input image
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Serial port device path
    #[arg(long, value_name = "PORT")]
    port: String,

    /// Baud rate
    #[arg(long, default_value_t = link::DEFAULT_BAUD)]
    baud: u32,

    /// Read timeout in seconds
    #[arg(long, default_value_t = link::DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Frame width sent to the device
    #[arg(long, default_value_t = link::DEFAULT_FRAME_WIDTH)]
    width: u32,

    /// Frame height sent to the device
    #[arg(long, default_value_t = link::DEFAULT_FRAME_HEIGHT)]
    height: u32,

    /// Where to save the returned frame
    #[arg(long, value_name = "FILE", default_value = "response.png")]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Pack(args) => run_pack(args, cli.verbose),
        Command::Unpack(args) => run_unpack(args),
        Command::Info(args) => run_info(args),
        Command::Labels(args) => run_labels(args, cli.verbose),
        Command::Split(args) => run_split(args, cli.verbose),
        Command::Embed(args) => run_embed(args, cli.verbose),
        Command::Verify(args) => run_verify(args),
        Command::Threshold(args) => run_threshold(args, cli.verbose),
        Command::Send(args) => run_send(args, cli.verbose),
    }
}

fn run_pack(args: PackArgs, verbose: bool) -> anyhow::Result<()> {
    let options = PackOptions {
        rows: args.rows,
        cols: args.cols,
        test_fraction: args.test_fraction,
        seed: args.seed,
        verbose,
    };

    let report = ingest::pack(&args.input_dir, &args.out_dir, &options)?;

    println!(
        "Wrote {} train and {} test samples to {}",
        report.train_count,
        report.test_count,
        args.out_dir.display()
    );
    println!("{}", report.summary);

    Ok(())
}

fn run_unpack(args: UnpackArgs) -> anyhow::Result<()> {
    let written = export::unpack(&args.images, &args.labels, &args.out_dir, args.limit)?;
    println!("Exported {} samples to {}", written, args.out_dir.display());
    Ok(())
}

fn run_info(args: InfoArgs) -> anyhow::Result<()> {
    let DatasetInfo {
        count,
        rows,
        cols,
        class_counts,
    } = export::inspect(&args.images, args.labels.as_deref())?;

    println!("Samples: {}", count);
    println!("Shape:   {}x{}", rows, cols);
    if !class_counts.is_empty() {
        println!("Classes:");
        for (label, n) in &class_counts {
            println!("  {}: {}", label, n);
        }
    }

    Ok(())
}

fn run_labels(args: LabelsArgs, verbose: bool) -> anyhow::Result<()> {
    let options = LabelOptions {
        detector: DigitDetector {
            blur_sigma: args.blur_sigma,
            morph_radius: args.morph_radius,
            min_box_area: args.min_box_area,
            verbose,
        },
        debug_out: args.debug_out,
    };

    let summary = labels::generate_labels(&args.input_dir, &args.out_dir, &options)?;

    println!("Annotated dataset written to {}", args.out_dir.display());
    println!("{}", summary);

    Ok(())
}

fn run_split(args: SplitArgs, verbose: bool) -> anyhow::Result<()> {
    let options = SplitOptions {
        train_fraction: args.train_fraction,
        seed: args.seed,
        verbose,
    };

    let report = split::split(&args.input_dir, &args.out_dir, &options)?;

    println!("Train: {}  Val: {}", report.train, report.val);
    println!("{}", report.summary);

    Ok(())
}

fn run_embed(args: EmbedArgs, verbose: bool) -> anyhow::Result<()> {
    let bytes = fs::read(&args.model)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.model.display(), e))?;

    if verbose {
        println!("Model size: {} bytes", bytes.len());
    }

    let array = CArray::new(&args.name).with_bytes_per_line(args.bytes_per_line);

    fs::create_dir_all(&args.out_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", args.out_dir.display(), e))?;

    let header_path = args.out_dir.join(format!("{}.h", array.name()));
    let source_path = args.out_dir.join(format!("{}.c", array.name()));
    fs::write(&header_path, array.header())
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", header_path.display(), e))?;
    fs::write(&source_path, array.source(&bytes))
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", source_path.display(), e))?;

    println!("Wrote {} and {}", header_path.display(), source_path.display());

    Ok(())
}

fn run_verify(args: VerifyArgs) -> anyhow::Result<()> {
    let source = fs::read_to_string(&args.source)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.source.display(), e))?;
    let model = fs::read(&args.model)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.model.display(), e))?;

    let bytes = carray::parse_verified(&source)?;

    if bytes.len() != model.len() {
        return Err(anyhow::anyhow!(
            "Length mismatch: array has {} bytes, {} has {}",
            bytes.len(),
            args.model.display(),
            model.len()
        ));
    }
    if bytes != model {
        return Err(anyhow::anyhow!(
            "Array bytes differ from {}",
            args.model.display()
        ));
    }

    println!(
        "OK: {} matches {} ({} bytes)",
        args.source.display(),
        args.model.display(),
        model.len()
    );

    Ok(())
}

fn run_threshold(args: ThresholdArgs, verbose: bool) -> anyhow::Result<()> {
    let img = ImageReader::open(&args.image)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    let gray = img.to_luma8();

    if verbose {
        println!("Image loaded: {}x{}", gray.width(), gray.height());
    }

    let (mask, level) = threshold::select_brightest(&gray, args.count);
    let kept = threshold::count_white(&mask);
    println!("Selected level {} keeping {} pixels", level, kept);

    mask.save(&args.out)
        .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", args.out.display(), e))?;
    println!("Mask written to {}", args.out.display());

    Ok(())
}

fn run_send(args: SendArgs, verbose: bool) -> anyhow::Result<()> {
    let img = ImageReader::open(&args.image)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;

    let frame = link::image_to_frame(&img, args.width, args.height);

    if verbose {
        println!("Sending {} bytes to {}...", frame.len(), args.port);
    }

    let mut port = link::open_port(&args.port, args.baud, Duration::from_secs(args.timeout_secs))?;
    let response = link::exchange(&mut port, &frame)?;

    if verbose {
        println!("Received {} bytes", response.len());
    }

    let received = link::frame_to_image(&response, args.width, args.height).ok_or_else(|| {
        anyhow::anyhow!(
            "Response does not form a {}x{} frame",
            args.width,
            args.height
        )
    })?;
    received
        .save(&args.out)
        .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", args.out.display(), e))?;

    println!("Response frame written to {}", args.out.display());

    Ok(())
}
