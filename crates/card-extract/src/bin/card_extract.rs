use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use card_extract::detect::save_icons;
use card_extract::pipeline::{CardExtractor, ExtractConfig, ExtractReport, LayoutPreset};
use card_extract::RasterImage;
use clap::Parser;

use log::LevelFilter;

#[cfg(not(feature = "tracing"))]
use log::{info, warn};

#[cfg(feature = "tracing")]
use tracing::{info, warn};

/// Extract rank/suit icon crops from a photo of a card layout.
#[derive(Parser, Debug)]
#[command(name = "card-extract", version, about)]
struct Cli {
    /// Input image. Overrides `image_path` from `--config`.
    image: Option<PathBuf>,

    /// Parameter preset: tableau, grid, single or column.
    #[arg(long)]
    layout: Option<LayoutPreset>,

    /// JSON run configuration (image path, preset or inline params, outputs).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the icons are written into.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Path of the JSON report (default: `<out>/report.json`).
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log per-stage diagnostics.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: bool) {
    card_extract::core::init_at(verbose.then_some(LevelFilter::Debug));
}

#[cfg(feature = "tracing")]
fn init_logging(verbose: bool) {
    let level = verbose.then_some(LevelFilter::Debug);
    card_extract::core::init_tracing(false, level);
    // No-op when the subscriber already bridged `log` records.
    let _ = tracing_log::LogTracer::init();
    card_extract::core::init_at(level);
}

fn resolve_config(cli: &Cli) -> Result<ExtractConfig, Box<dyn Error>> {
    let mut cfg = match (&cli.config, &cli.image) {
        (Some(path), _) => ExtractConfig::load_json(path)?,
        (None, Some(image)) => ExtractConfig::new(image.to_string_lossy(), LayoutPreset::default()),
        (None, None) => return Err("no input image: pass <IMAGE> or --config".into()),
    };
    if let Some(image) = &cli.image {
        cfg.image_path = image.to_string_lossy().into_owned();
    }
    if let Some(layout) = cli.layout {
        cfg.preset = layout;
        cfg.params = None;
    }
    if let Some(out) = &cli.out {
        cfg.output_dir = Some(out.to_string_lossy().into_owned());
    }
    if let Some(report) = &cli.report {
        cfg.report_path = Some(report.to_string_lossy().into_owned());
    }
    Ok(cfg)
}

/// `Ok(false)` means the extraction itself failed; the report still
/// records why.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip(cli)))]
fn run(cli: &Cli) -> Result<bool, Box<dyn Error>> {
    let cfg = resolve_config(cli)?;
    let params = cfg.build_params();
    let extractor = CardExtractor::new(params.clone())?;
    let img = image::open(&cfg.image_path)?;
    info!(
        "{}: {}x{}, {} regions ({})",
        cfg.image_path,
        img.width(),
        img.height(),
        params.regions,
        cfg.preset
    );

    let mut report = ExtractReport::new(cfg.image_path.clone(), &params);
    let ok = match extractor.extract(RasterImage::from(img)) {
        Ok(extraction) => {
            report.set_extraction(&extraction);
            let written = save_icons(&extraction, cfg.output_dir())?;
            for (entry, (_, path)) in report.slots.iter_mut().zip(written) {
                entry.icon_path = Some(path.to_string_lossy().into_owned());
            }
            info!(
                "extracted {} icons into {}",
                report.slots.len(),
                cfg.output_dir().display()
            );
            true
        }
        Err(e) => {
            warn!("extraction failed: {e}");
            eprintln!("extraction failed: {e}");
            report.set_error(&e);
            false
        }
    };

    let report_path = cfg.report_path();
    if let Some(parent) = report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    report.write_json(&report_path)?;
    Ok(ok)
}
