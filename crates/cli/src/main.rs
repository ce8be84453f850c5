//! landsift CLI - parcel suitability enrichment

use anyhow::{Context, Result};
use clap::Parser;
use landsift_core::io::{read_geojson_layer, read_geotiff};
use landsift_core::{Crs, FeatureLayer, LinearUnit, Raster};
use landsift_engine::PlanarEngine;
use landsift_pipeline::{Pipeline, PipelineConfig, PipelineInputs};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "landsift")]
#[command(author, version, about = "Land parcel suitability enrichment", long_about = None)]
struct Cli {
    /// Parcel polygons (GeoJSON)
    parcels: PathBuf,
    /// Flood zone polygons (GeoJSON)
    flood_zones: PathBuf,
    /// Wetland polygons (GeoJSON)
    wetlands: PathBuf,
    /// Road centerlines (GeoJSON)
    roads: PathBuf,
    /// Percent-slope raster (GeoTIFF)
    slope: PathBuf,
    /// Land-cover raster with forest class codes (GeoTIFF)
    forest: PathBuf,
    /// Workspace directory for all output datasets
    workspace: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Fail on existing output datasets instead of overwriting them
    #[arg(long)]
    keep_existing: bool,

    /// EPSG code assumed for inputs that declare no CRS
    #[arg(long, default_value = "2272")]
    epsg: u32,

    /// Linear unit of that CRS: feet, metres
    #[arg(long, default_value = "feet")]
    unit: String,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn parse_unit(s: &str) -> Result<LinearUnit> {
    match s.to_lowercase().as_str() {
        "feet" | "foot" | "ft" => Ok(LinearUnit::Feet),
        "metres" | "meters" | "m" => Ok(LinearUnit::Metres),
        _ => anyhow::bail!("Unknown unit: {}. Use feet or metres.", s),
    }
}

/// Resolve an input's CRS against the `--epsg`/`--unit` declaration.
///
/// Inputs without a CRS get the declared one. Inputs that name the same EPSG
/// code also take the declared linear unit: external files carry only the
/// code, which says nothing about feet vs metres.
fn resolve_crs(declared: Option<&Crs>, fallback: &Crs) -> Option<Crs> {
    match declared {
        None => Some(fallback.clone()),
        Some(crs) if crs.epsg() == fallback.epsg() => Some(fallback.clone()),
        Some(_) => None,
    }
}

fn read_layer(path: &Path, name: &str, fallback: &Crs) -> Result<FeatureLayer> {
    let mut layer = read_geojson_layer(path, name)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if let Some(crs) = resolve_crs(layer.crs(), fallback) {
        layer.set_crs(Some(crs));
    }
    info!("{}: {} features", name, layer.len());
    Ok(layer)
}

fn read_raster(path: &Path, name: &str, fallback: &Crs) -> Result<Raster> {
    let mut raster =
        read_geotiff(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if let Some(crs) = resolve_crs(raster.crs(), fallback) {
        raster.set_crs(Some(crs));
    }
    let (rows, cols) = raster.shape();
    info!("{}: {} x {}", name, cols, rows);
    Ok(raster)
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let fallback = Crs::from_epsg_with_unit(cli.epsg, parse_unit(&cli.unit)?);

    let inputs = PipelineInputs {
        parcels: read_layer(&cli.parcels, "parcels", &fallback)?,
        flood_zones: read_layer(&cli.flood_zones, "flood_zones", &fallback)?,
        wetlands: read_layer(&cli.wetlands, "wetlands", &fallback)?,
        roads: read_layer(&cli.roads, "roads", &fallback)?,
        slope: read_raster(&cli.slope, "slope", &fallback)?,
        forest: read_raster(&cli.forest, "forest", &fallback)?,
    };

    let config = PipelineConfig {
        workspace: cli.workspace.clone(),
        overwrite_output: !cli.keep_existing,
    };
    let pipeline =
        Pipeline::new(PlanarEngine::default(), &config).context("Failed to open workspace")?;

    let start = Instant::now();
    let out = pipeline.run(&inputs).context("Pipeline failed")?;

    println!(
        "Enriched {} parcels saved to: {}",
        out.len(),
        pipeline.workspace().layer_path("parcel_analysis_final").display()
    );
    println!("  Processing time: {:.2?}", start.elapsed());
    Ok(())
}
