//! georef: CLI for replaying georeferencing sessions and exporting results.
//!
//! Two modes:
//!
//! - `run` replays a JSON command script (control points, transform fit,
//!   digitizing) into a fresh session and writes the requested outputs;
//! - `fit` estimates a transform straight from a `col,row,x,y` control
//!   point CSV.
//!
//! # Usage
//!
//! ```text
//! cargo run --bin georef -- run session.json --shapefile out/parcels.shp --world-file map.pgw
//! cargo run --bin georef -- fit control.csv --world-file map.pgw --json
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Datelike;
use clap::{Args, Parser, Subcommand};
use georef_core::{
    Command, CommandOutcome, ControlPointError, CoordinateMapper, FitReport, GeorefConfig, Point,
    PolygonSummary, Session, TransformStatus,
};
use georef_export::{DbfDate, ShapefileMetadata};
use georef_io::ControlCsvKind;
use serde::Serialize;

/// Georeference a raster image from control points and export digitized
/// polygons.
#[derive(Parser)]
#[command(name = "georef", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Full session config as a JSON string.
    ///
    /// Missing fields take their defaults. The JSON must be a valid
    /// `GeorefConfig` serialization.
    #[arg(long, global = true)]
    config_json: Option<String>,

    /// Print the report as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a command script and export the result.
    Run(RunArgs),

    /// Fit a transform from a `col,row,x,y` CSV.
    Fit(FitArgs),
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// JSON array of session commands.
    script: PathBuf,

    /// Write the polygons as a shapefile layer (plus `<stem>_vertices.csv`).
    #[arg(long)]
    shapefile: Option<PathBuf>,

    /// Write the fitted transform as a world file.
    #[arg(long)]
    world_file: Option<PathBuf>,

    /// Write the world file next to this image (`map.png` -> `map.pgw`).
    #[arg(long, conflicts_with = "world_file")]
    image: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct FitArgs {
    /// Control point CSV with `col,row,x,y` columns.
    csv: PathBuf,

    /// Write the fitted transform as a world file.
    #[arg(long)]
    world_file: Option<PathBuf>,

    /// Write the world file next to this image (`map.png` -> `map.pgw`).
    #[arg(long, conflicts_with = "world_file")]
    image: Option<PathBuf>,
}

/// Everything printed at the end of a command.
#[derive(Debug, Serialize)]
struct Report {
    transform: TransformStatus,
    fit: Option<FitReport>,
    polygons: Vec<PolygonSummary>,
    outcomes: Vec<CommandOutcome>,
    written: Vec<PathBuf>,
}

impl Report {
    fn from_session(session: &Session, outcomes: Vec<CommandOutcome>) -> Self {
        Self {
            transform: session.status().clone(),
            fit: session.fit_report().cloned(),
            polygons: session.polygon_list(),
            outcomes,
            written: Vec::new(),
        }
    }

    fn print_human(&self) {
        match &self.transform {
            TransformStatus::Absent => println!("Transform: none"),
            TransformStatus::Invalid { reason } => println!("Transform: invalid ({reason})"),
            TransformStatus::Valid { transform, rmse } => {
                let [a, b, c, d, e, f] = transform.coefficients();
                println!("Transform: valid (RMSE {rmse:.6e})");
                println!("  lon = {a} * col + {b} * row + {c}");
                println!("  lat = {d} * col + {e} * row + {f}");
            }
        }
        if let Some(fit) = &self.fit {
            println!();
            println!("{:<6} {:>14} {:>14} {:>14}", "Point", "dLon", "dLat", "Error");
            println!("{}", "-".repeat(51));
            for r in &fit.residuals {
                println!(
                    "{:<6} {:>14.6e} {:>14.6e} {:>14.6e}",
                    r.id, r.d_lon, r.d_lat, r.error
                );
            }
        }
        if !self.polygons.is_empty() {
            println!();
            println!("Polygons ({}):", self.polygons.len());
            for p in &self.polygons {
                println!("  {}: {} ({} vtx)", p.id, p.name, p.vertices);
            }
        }
    }
}

/// Build a [`GeorefConfig`] from `--config-json`, or the default.
fn config_from_cli(cli: &Cli) -> Result<GeorefConfig, String> {
    cli.config_json.as_ref().map_or_else(
        || Ok(GeorefConfig::default()),
        |json| serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}")),
    )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let result = match &cli.command {
        Commands::Run(args) => run_script(args, config, today()),
        Commands::Fit(args) => fit_csv(args, config),
    };

    let report = match result {
        Ok(report) => report,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing report: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        report.print_human();
    }
    for path in &report.written {
        eprintln!("Written: {}", path.display());
    }

    ExitCode::SUCCESS
}

/// Replay `args.script` into a fresh session and write the requested
/// outputs. Every output is encoded before the first file is written, and
/// the files are committed together, so a failure leaves nothing behind.
fn run_script(args: &RunArgs, config: GeorefConfig, date: DbfDate) -> Result<Report, String> {
    let commands = georef_io::load_script(&args.script).map_err(|e| e.to_string())?;

    let mut session = Session::new(config);
    let mut outcomes = Vec::with_capacity(commands.len());
    for (step, command) in commands.into_iter().enumerate() {
        let outcome = session
            .apply(command)
            .map_err(|e| format!("{}: step {}: {e}", args.script.display(), step + 1))?;
        outcomes.push(outcome);
    }
    log::info!(
        "replayed {} commands from {}",
        outcomes.len(),
        args.script.display()
    );

    let mut report = Report::from_session(&session, outcomes);

    let world_file = world_file_target(args.world_file.as_deref(), args.image.as_deref());
    if args.shapefile.is_none() && world_file.is_none() {
        return Ok(report);
    }
    let mapper = session
        .mapper()
        .ok_or_else(|| "cannot export: no transformation has been computed".to_string())?;

    let mut outputs: Vec<(PathBuf, Vec<u8>)> = Vec::new();
    if let Some(path) = world_file {
        outputs.push((path, world_file_text(mapper, session.config()).into_bytes()));
    }
    if let Some(path) = &args.shapefile {
        let metadata = ShapefileMetadata::from_config(session.config(), date);
        let polygons = session.digitizer().snapshot();
        let layer = georef_export::to_shapefile(&polygons, mapper, &metadata)
            .map_err(|e| format!("Error encoding shapefile: {e}"))?;
        let csv = georef_export::to_vertex_csv(&polygons, mapper)
            .map_err(|e| format!("Error encoding vertex CSV: {e}"))?;
        outputs.extend(
            georef_io::shapefile_files(path, &layer)
                .into_iter()
                .map(|(member, bytes)| (member, bytes.to_vec())),
        );
        outputs.push((georef_io::vertices_csv_path(path), csv.into_bytes()));
    }
    report.written = write_outputs(&outputs)?;
    Ok(report)
}

/// Fit a transform from a `col,row,x,y` CSV: each row becomes one
/// complete control point.
fn fit_csv(args: &FitArgs, config: GeorefConfig) -> Result<Report, String> {
    let csv = georef_io::read_control_csv(&args.csv).map_err(|e| e.to_string())?;
    if csv.kind != ControlCsvKind::ByPixel {
        return Err(format!(
            "{}: fit needs col,row,x,y columns; x,y files can only be imported by a script",
            args.csv.display()
        ));
    }

    let mut session = Session::new(config);
    for (i, row) in csv.rows.iter().enumerate() {
        let [col, line, lon, lat] =
            parse_row(i, row).map_err(|e| format!("{}: {e}", args.csv.display()))?;
        let id = session
            .add_point(Point::new(col, line))
            .map_err(|e| format!("{}: row {i}: {e}", args.csv.display()))?;
        session
            .apply(Command::AssignGeo { id, lon, lat })
            .map_err(|e| e.to_string())?;
    }
    let fit = session
        .compute_transform()
        .map_err(|e| format!("{}: {e}", args.csv.display()))?;
    log::info!("fitted {} control points, RMSE {:e}", fit.residuals.len(), fit.rmse);

    let mut report = Report::from_session(&session, Vec::new());

    let world_file = world_file_target(args.world_file.as_deref(), args.image.as_deref());
    if let (Some(path), Some(mapper)) = (world_file, session.mapper()) {
        let text = world_file_text(mapper, session.config());
        report.written = write_outputs(&[(path, text.into_bytes())])?;
    }
    Ok(report)
}

fn parse_row(index: usize, row: &[String]) -> Result<[f64; 4], ControlPointError> {
    let mut out = [0.0; 4];
    for (slot, field) in out.iter_mut().zip(row) {
        *slot = field
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ControlPointError::MalformedRow {
                row: index,
                reason: format!("{field:?} is not a finite number"),
            })?;
    }
    Ok(out)
}

/// `--world-file`, or the world file named after `--image`.
fn world_file_target(world_file: Option<&Path>, image: Option<&Path>) -> Option<PathBuf> {
    world_file
        .map(Path::to_path_buf)
        .or_else(|| image.map(georef_io::world_file_path))
}

fn world_file_text(mapper: &CoordinateMapper, config: &GeorefConfig) -> String {
    georef_export::to_world_file(mapper.transform(), config.world_file_decimals)
}

/// Write every output as one unit and return the paths written.
fn write_outputs(outputs: &[(PathBuf, Vec<u8>)]) -> Result<Vec<PathBuf>, String> {
    let files: Vec<(PathBuf, &[u8])> = outputs
        .iter()
        .map(|(path, bytes)| (path.clone(), bytes.as_slice()))
        .collect();
    georef_io::write_all_atomic(&files).map_err(|e| e.to_string())?;
    Ok(outputs.iter().map(|(path, _)| path.clone()).collect())
}

/// Today's local date for the DBF header.
fn today() -> DbfDate {
    let now = chrono::Local::now();
    DbfDate::new(
        u16::try_from(now.year()).unwrap_or(1900),
        u8::try_from(now.month()).unwrap_or(1),
        u8::try_from(now.day()).unwrap_or(1),
    )
}
