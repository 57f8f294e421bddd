//! ocr-grid command line interface.
//!
//! Loads a shared region list, runs the full images x regions OCR batch with
//! Tesseract, prints a per-cell summary, and writes the CSV grid.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use ocr_grid::batch::Orchestrator;
use ocr_grid::config;
use ocr_grid::export;
use ocr_grid::log;
use ocr_grid::ocr::{self, TesseractEngine};
use ocr_grid::paths;
use ocr_grid::store::{ProjectStore, Region, RegionResult};

/// Batch region OCR over a set of images.
#[derive(Parser, Debug)]
#[command(
    name = "ocr-grid",
    about = "Crop shared regions from every image, recognize them, and export the text grid to CSV"
)]
struct Cli {
    /// Image files to process.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// JSON file with named regions:
    /// [{"name": "...", "coordinates": {"min_x": 0, "min_y": 0, "max_x": 100, "max_y": 40}}]
    #[arg(short, long)]
    regions: Option<PathBuf>,

    /// Output CSV path.
    #[arg(short, long, default_value = export::EXPORT_FILENAME)]
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    paths::ensure_directories().context("failed to create log directory")?;
    config::init_config();

    if let Err(e) = ocr::ensure_tesseract() {
        log(&format!("Warning: {}", e));
        log("OCR jobs will fail until Tesseract is available.");
    }

    let regions = match &cli.regions {
        Some(path) => load_regions(path)?,
        None => Vec::new(),
    };

    let mut store = ProjectStore::with_regions(regions);
    store.add_images(&cli.images);

    let config = config::get_config();
    let engine = TesseractEngine::discover(config)?;
    let orchestrator = Orchestrator::new(engine, config.language.clone());

    let report = orchestrator.run_all_images(&mut store)?;
    log(&format!(
        "Batch finished: {}/{} jobs settled",
        report.completed, report.total
    ));

    print_summary(&store);

    export::export_to_file(&store, &cli.output)?;
    log(&format!("Results written to {}", cli.output.display()));

    Ok(())
}

/// Loads the shared region list from a JSON file.
fn load_regions(path: &Path) -> Result<Vec<Region>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

/// Prints one line per (image, region) cell.
fn print_summary(store: &ProjectStore) {
    for entry in store.images() {
        for (region, cell) in store.regions().iter().zip(&entry.results) {
            match cell {
                RegionResult::Success { text, .. } => {
                    log(&format!(
                        "{} / {}: {}",
                        entry.filename,
                        region.name,
                        text.trim()
                    ));
                }
                RegionResult::Failed { reason, .. } => {
                    log(&format!("{} / {}: {}", entry.filename, region.name, reason));
                }
                RegionResult::Pending => {
                    log(&format!("{} / {}: not run", entry.filename, region.name));
                }
            }
        }
    }
}
