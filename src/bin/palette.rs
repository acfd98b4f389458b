use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dominant_colors_wasm::{
    ColorResult, DominantColorExtractor, ExtractionError, ExtractorConfig, load_rgb_with_info,
    report,
};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

/// Report the dominant colors of images and how much of each image they cover.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Number of colors to extract
    #[arg(short = 'k', long, default_value_t = 5)]
    n_colors: usize,

    /// Shrink images so the longest side is at most this many pixels (0 disables)
    #[arg(short = 'm', long, default_value_t = 800)]
    max_side: u32,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// JSON extractor configuration; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for k-means initialization
    #[arg(long)]
    seed: Option<u64>,

    /// Keep near-black and near-white pixels
    #[arg(long)]
    no_filter: bool,

    /// Cluster a random sample of at most this many pixels
    #[arg(long)]
    sample_limit: Option<usize>,

    /// Retry without the extremes filter when too few pixels survive it
    #[arg(long)]
    fallback: bool,

    /// Directory to write a PNG palette strip per input
    #[arg(short = 's', long)]
    strip: Option<PathBuf>,
}

fn build_config(args: &Args) -> Result<ExtractorConfig> {
    let mut config = match &args.config {
        Some(path) => ExtractorConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ExtractorConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.no_filter {
        config.filter_extremes = false;
    }
    if args.sample_limit.is_some() {
        config.sample_limit = args.sample_limit;
    }
    config.validate()?;
    Ok(config)
}

fn extract_with_fallback(
    extractor: &DominantColorExtractor,
    image: &image::RgbImage,
    args: &Args,
) -> Result<Vec<ColorResult>> {
    match extractor.extract(image, args.n_colors) {
        Err(err @ ExtractionError::InsufficientData { .. })
            if args.fallback && extractor.config().filter_extremes =>
        {
            warn!("{err}; retrying without the extremes filter");
            let unfiltered = DominantColorExtractor::new(extractor.config().clone().unfiltered())?;
            Ok(unfiltered.extract(image, args.n_colors)?)
        }
        other => Ok(other?),
    }
}

fn print_table(input: &Path, colors: &[ColorResult]) {
    println!("{}", input.display());
    println!("{:>4}  {:<8}  {:<15}  {:>7}", "#", "HEX", "RGB", "COVER");
    for entry in report::entries(colors) {
        let rgb = format!("({}, {}, {})", entry.rgb[0], entry.rgb[1], entry.rgb[2]);
        println!(
            "{:>4}  {:<8}  {:<15}  {:>6.1}%",
            entry.rank,
            entry.hex.to_uppercase(),
            rgb,
            entry.coverage
        );
    }
}

fn write_strip(dir: &Path, input: &Path, colors: &[ColorResult]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let out_path = dir.join(format!("{stem}_palette.png"));
    let strip = report::render_strip(
        colors,
        dominant_colors_wasm::STRIP_WIDTH,
        dominant_colors_wasm::STRIP_HEIGHT,
    );
    fs::write(&out_path, report::encode_png(&strip)?)?;
    Ok(out_path)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let extractor = DominantColorExtractor::new(build_config(&args)?)?;
    let max_side = (args.max_side > 0).then_some(args.max_side);

    for input in &args.inputs {
        let (image, image_info) = load_rgb_with_info(input, max_side)
            .with_context(|| format!("loading {}", input.display()))?;
        info!(
            "{}: {}x{} {}",
            input.display(),
            image_info.width,
            image_info.height,
            image_info.color_type
        );

        let colors = extract_with_fallback(&extractor, &image, &args)
            .with_context(|| format!("color extraction failed for {}", input.display()))?;

        match args.format {
            OutputFormat::Table => print_table(input, &colors),
            OutputFormat::Csv => print!("{}", report::to_csv(&colors)),
            OutputFormat::Json => println!("{}", report::to_json(&colors)?),
        }

        if let Some(dir) = &args.strip {
            let out_path = write_strip(dir, input, &colors)?;
            println!("Saved → {}", out_path.display());
        }
    }

    Ok(())
}
