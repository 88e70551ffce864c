//! `filterkit` command line: run a filter pipeline over an image, headless.
//!
//! Built with the `cli` feature: `cargo install --path . --features cli`.
//!
//! ```bash
//! filterkit photo.png edges.png --filter grayscale --filter edges --threshold 0.8
//! RUST_LOG=filterkit=debug filterkit photo.png out.png --filter invert --nest
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use filterkit::{
    DrawStatus, Filter, FilterGroup, GpuConfig, GpuContext, GraphicsBackend, GrayscaleStage,
    InvertStage, Quad, SobelThresholdStage, StageHandle, TexCoords, ThresholdEdgeDetection,
    WgpuBackend,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FilterKind {
    Grayscale,
    Invert,
    /// Sobel threshold alone; expects grayscale input.
    Sobel,
    /// Grayscale followed by Sobel threshold.
    Edges,
}

#[derive(Parser)]
#[command(version, about = "Apply a chain of GPU image filters")]
struct Args {
    /// Input image file path
    input: PathBuf,

    /// Output image file path
    output: PathBuf,

    /// Filters to apply, in order. Repeat to chain.
    #[arg(long = "filter", short, value_enum, default_value = "edges")]
    filters: Vec<FilterKind>,

    /// Edge threshold for `sobel` and `edges`
    #[arg(long, default_value_t = SobelThresholdStage::DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Edge sampling distance in pixels for `sobel` and `edges`
    #[arg(long, default_value_t = SobelThresholdStage::DEFAULT_LINE_SIZE)]
    line_size: f32,

    /// Wrap the filters in a nested group
    #[arg(long)]
    nest: bool,

    /// Prefer a low-power adapter
    #[arg(long)]
    low_power: bool,
}

fn build_filter(kind: FilterKind, args: &Args) -> Filter<WgpuBackend> {
    match kind {
        FilterKind::Grayscale => Filter::stage(GrayscaleStage::new()),
        FilterKind::Invert => Filter::stage(InvertStage::new()),
        FilterKind::Sobel => {
            let sobel = StageHandle::new(SobelThresholdStage::new());
            sobel.lock().set_line_size(args.line_size);
            sobel.lock().set_threshold(args.threshold);
            sobel.into()
        }
        FilterKind::Edges => {
            let edges = ThresholdEdgeDetection::new();
            edges.set_line_size(args.line_size);
            edges.set_threshold(args.threshold);
            edges.filter()
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let photo = image::open(&args.input)?.to_rgba8();
    let (width, height) = photo.dimensions();
    info!(path = %args.input.display(), width, height, "loaded input");

    let power_preference = if args.low_power {
        wgpu::PowerPreference::LowPower
    } else {
        wgpu::PowerPreference::HighPerformance
    };
    let gpu = GpuContext::new(GpuConfig::new().power_preference(power_preference))?;
    let mut backend = WgpuBackend::new(gpu);

    let filters = args.filters.iter().map(|&kind| build_filter(kind, &args));
    let group = if args.nest {
        FilterGroup::builder()
            .filter(FilterGroup::with_filters(filters))
            .build()
    } else {
        FilterGroup::with_filters(filters)
    };
    info!(
        stages = group.merged_filters().len(),
        nested = args.nest,
        "built pipeline"
    );

    let input = backend.upload_rgba(&photo)?;
    let output = backend.create_texture()?;
    backend.allocate_texture(output, width, height)?;
    backend.set_default_output(output);

    group.init(&mut backend)?;
    group.resize(width, height);

    backend.begin_frame();
    let status = group.draw(&mut backend, input, &Quad::CUBE, &TexCoords::NO_ROTATION)?;
    backend.finish_frame();
    if status != DrawStatus::Drawn {
        return Err(format!("pipeline did not draw ({status:?})").into());
    }

    let result = backend.read_rgba(output)?;
    result.save(&args.output)?;
    info!(path = %args.output.display(), "saved output");

    group.destroy(&mut backend);
    backend.delete_texture(input);
    backend.delete_texture(output);
    Ok(())
}
