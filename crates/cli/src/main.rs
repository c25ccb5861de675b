//! GeoKrige CLI - Simple kriging of scattered observations

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use geokrige_algorithms::interpolation::{
    cross_validate, simple_kriging, KrigingMean, SemivarianceCovariance, Semivariogram,
    SimpleKrigingParams, VariogramModel,
};
use geokrige_core::io::{
    read_ascii_grid, read_observations, write_ascii_grid, AsciiGridOptions,
    ObservationFileOptions,
};
use geokrige_core::vector::value_moments;
use geokrige_core::{GridSpec, Observation, Raster};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "geokrige")]
#[command(author, version, about = "Simple kriging of scattered observations", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interpolate observations onto a grid by simple kriging
    Krige {
        /// Observation file (x, y, value per line)
        input: PathBuf,
        /// Output ASCII grid for the estimates
        output: PathBuf,
        /// Also write the kriging variance to this ASCII grid
        #[arg(long)]
        variance: Option<PathBuf>,
        #[command(flatten)]
        grid: GridArgs,
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        solver: SolverArgs,
        #[command(flatten)]
        file: FileArgs,
        /// NODATA_VALUE written for cells without an estimate
        #[arg(long, default_value = "-9999", allow_negative_numbers = true)]
        nodata: f64,
    },
    /// Leave-one-out cross-validation of a variogram model
    CrossValidate {
        /// Observation file (x, y, value per line)
        input: PathBuf,
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        solver: SolverArgs,
        #[command(flatten)]
        file: FileArgs,
    },
    /// Show information about an ASCII grid file
    Info {
        /// Input grid file
        input: PathBuf,
    },
}

/// Target grid. Rows and columns default to the extent of the observations.
#[derive(Args)]
struct GridArgs {
    /// Node spacing
    #[arg(short, long)]
    cell_size: f64,
    /// X of the lower-left node centre
    #[arg(long, requires_all = ["origin_y", "rows", "cols"], allow_negative_numbers = true)]
    origin_x: Option<f64>,
    /// Y of the lower-left node centre
    #[arg(long, requires_all = ["origin_x", "rows", "cols"], allow_negative_numbers = true)]
    origin_y: Option<f64>,
    /// Number of rows
    #[arg(long, requires_all = ["origin_x", "origin_y", "cols"])]
    rows: Option<usize>,
    /// Number of columns
    #[arg(long, requires_all = ["origin_x", "origin_y", "rows"])]
    cols: Option<usize>,
}

#[derive(Args)]
struct ModelArgs {
    /// Variogram model: spherical, exponential, gaussian
    #[arg(short, long, default_value = "spherical")]
    model: String,
    /// Range (major range when anisotropic)
    #[arg(short, long)]
    range: f64,
    /// Minor range; enables anisotropy
    #[arg(long)]
    minor_range: Option<f64>,
    /// Azimuth of the major axis in degrees (0=North, clockwise)
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    azimuth: f64,
    /// Nugget
    #[arg(short, long, default_value = "0")]
    nugget: f64,
    /// Sill [default: sample variance of the observations]
    #[arg(short, long)]
    sill: Option<f64>,
}

#[derive(Args)]
struct SolverArgs {
    /// Known process mean [default: sample mean]
    #[arg(long, allow_negative_numbers = true)]
    mean: Option<f64>,
    /// Reject systems whose condition estimate exceeds this
    #[arg(long, default_value = "1e12")]
    max_condition: f64,
    /// Accept ill-conditioned systems (best effort)
    #[arg(long)]
    no_condition_check: bool,
}

#[derive(Args)]
struct FileArgs {
    /// Field delimiter of the observation file
    #[arg(short, long, default_value = ",")]
    delimiter: char,
    /// The observation file has no header line
    #[arg(long)]
    no_header: bool,
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

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_points(path: &PathBuf, file: &FileArgs) -> Result<Vec<Observation>> {
    let options = ObservationFileOptions {
        delimiter: file.delimiter,
        has_header: !file.no_header,
        ..Default::default()
    };
    let observations = read_observations(path, &options)
        .with_context(|| format!("Failed to read observations from {}", path.display()))?;
    info!("Observations: {}", observations.len());
    Ok(observations)
}

fn write_result(raster: &Raster<f64>, path: &PathBuf, nodata: f64) -> Result<()> {
    let pb = spinner("Writing output...");
    write_ascii_grid(raster, path, Some(AsciiGridOptions { nodata_value: nodata }))
        .context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &PathBuf, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn build_semivariogram(model: &ModelArgs, observations: &[Observation]) -> Result<Semivariogram> {
    let kind: VariogramModel = model.model.parse()?;
    let sill = match model.sill {
        Some(sill) => sill,
        None => {
            let (_, variance) = value_moments(observations)
                .context("No observations to take a sill from")?;
            info!("Sill from sample variance: {:.6}", variance);
            variance
        }
    };
    let variogram = Semivariogram::new(kind, model.nugget, sill, model.range)
        .context("Invalid variogram parameters")?;
    match model.minor_range {
        Some(minor) => Ok(variogram
            .with_anisotropy(model.azimuth, minor)
            .context("Invalid anisotropy")?),
        None => Ok(variogram),
    }
}

fn kriging_params(solver: &SolverArgs) -> SimpleKrigingParams {
    SimpleKrigingParams {
        mean: solver.mean.map_or(KrigingMean::SampleMean, KrigingMean::Known),
        max_condition_number: (!solver.no_condition_check).then_some(solver.max_condition),
        ..Default::default()
    }
}

fn build_grid(grid: &GridArgs, observations: &[Observation]) -> Result<GridSpec> {
    let spec = match (grid.origin_x, grid.origin_y, grid.rows, grid.cols) {
        (Some(x0), Some(y0), Some(rows), Some(cols)) => {
            GridSpec::new(x0, y0, grid.cell_size, rows, cols)?
        }
        _ => {
            let extent = observations.iter().fold(
                (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
                |(x0, y0, x1, y1), o| (x0.min(o.x), y0.min(o.y), x1.max(o.x), y1.max(o.y)),
            );
            GridSpec::covering(extent, grid.cell_size)?
        }
    };
    info!(
        "Grid: {} x {} nodes from ({}, {}), cell size {}",
        spec.cols, spec.rows, spec.origin_x, spec.origin_y, spec.cell_size
    );
    Ok(spec)
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        // ── Krige ────────────────────────────────────────────────────
        Commands::Krige {
            input,
            output,
            variance,
            grid,
            model,
            solver,
            file,
            nodata,
        } => {
            let observations = read_points(&input, &file)?;
            let variogram = build_semivariogram(&model, &observations)?;
            let covariance = SemivarianceCovariance::from_observations(variogram, &observations)
                .context("Failed to derive covariance")?;
            let grid = build_grid(&grid, &observations)?;

            let pb = spinner("Kriging...");
            let start = Instant::now();
            let result = simple_kriging(&observations, &covariance, &grid, kriging_params(&solver))
                .context("Failed to krige observations")?;
            let elapsed = start.elapsed();
            pb.finish_and_clear();

            write_result(&result.estimate, &output, nodata)?;
            done("Estimate", &output, elapsed);
            if let Some(path) = variance {
                write_result(&result.variance, &path, nodata)?;
                println!("Variance saved to: {}", path.display());
            }
        }

        // ── Cross-validation ─────────────────────────────────────────
        Commands::CrossValidate {
            input,
            model,
            solver,
            file,
        } => {
            let observations = read_points(&input, &file)?;
            let variogram = build_semivariogram(&model, &observations)?;
            let covariance = SemivarianceCovariance::from_observations(variogram, &observations)
                .context("Failed to derive covariance")?;

            let pb = spinner("Cross-validating...");
            let start = Instant::now();
            let cv = cross_validate(&observations, &covariance, &kriging_params(&solver))
                .context("Cross-validation failed")?;
            let elapsed = start.elapsed();
            pb.finish_and_clear();

            println!("Leave-one-out cross-validation ({} folds)", cv.errors.len());
            println!("  Mean error: {:.6}", cv.mean_error);
            println!("  RMSE: {:.6}", cv.rmse);
            println!("  Mean kriging variance: {:.6}", cv.mean_variance);
            if let Some(msse) = cv.mean_squared_standardized_error {
                println!("  Mean squared standardized error: {:.4}", msse);
            }
            println!("  Processing time: {:.2?}", elapsed);
        }

        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let pb = spinner("Reading grid...");
            let raster = read_ascii_grid(&input).context("Failed to read grid")?;
            pb.finish_and_clear();

            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();
            let origin = raster.node_to_geo(0, 0);

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Lower-left node: ({:.6}, {:.6})", origin.0, origin.1);
            println!("Cell size: {}", raster.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / raster.len() as f64
            );
        }
    }

    Ok(())
}
