use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use geod_datum::{
    geojson::FeatureCollection, poi::PlaceSearchResponse, Coordinate, Datum, Gcj02, Wgs84,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "gcj2wgs",
    version,
    about = "Shift coordinates between GCJ-02 and WGS-84"
)]
struct Cli {
    /// Round the results to that many decimal digits
    #[arg(long, global = true, env = "GCJ2WGS_PRECISION")]
    precision: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Shift a single coordinate pair
    Point {
        #[arg(allow_hyphen_values = true)]
        lng: f64,
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        /// Treat the pair as WGS-84 and shift it into GCJ-02
        #[arg(long)]
        reverse: bool,
    },
    /// Shift every position of a GCJ-02 feature collection into WGS-84
    Geojson {
        input: PathBuf,
        /// Where to write the result (stdout by default)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the most relevant place of a saved place search response
    Poi { response: PathBuf },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let cli = Cli::parse();
    match cli.command {
        Command::Point { lng, lat, reverse } => handle_point(lng, lat, reverse, cli.precision),
        Command::Geojson { input, output } => handle_geojson(&input, output, cli.precision)?,
        Command::Poi { response } => handle_poi(&response, cli.precision)?,
    }
    Ok(())
}

fn handle_point(lng: f64, lat: f64, reverse: bool, precision: Option<u32>) {
    if reverse {
        let gcj = Coordinate::<Wgs84>::new(lng, lat).to_gcj02();
        println!("{}", round(gcj, precision));
    } else {
        let wgs = Coordinate::<Gcj02>::new(lng, lat).to_wgs84();
        println!("{}", round(wgs, precision));
    }
}

fn handle_geojson(
    input: &Path,
    output: Option<PathBuf>,
    precision: Option<u32>,
) -> anyhow::Result<()> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("Cannot read `{}`", input.display()))?;
    let gcj = FeatureCollection::<Gcj02>::from_json(&content)
        .with_context(|| format!("Cannot parse `{}`", input.display()))?;

    let wgs = gcj.to_wgs84(precision);
    let content = wgs.to_json_pretty()?;

    if let Some(path) = output {
        fs::write(&path, content)
            .with_context(|| format!("Cannot write `{}`", path.display()))?;
        info!(
            features = wgs.features.len(),
            positions = wgs.positions_count(),
            "Saved into `{}`",
            path.display()
        );
    } else {
        println!("{content}");
    }
    Ok(())
}

fn handle_poi(response: &Path, precision: Option<u32>) -> anyhow::Result<()> {
    let body = fs::read_to_string(response)
        .with_context(|| format!("Cannot read `{}`", response.display()))?;
    let response = PlaceSearchResponse::from_json(&body)?;
    let poi = response.first()?;
    let gcj = poi.location()?;

    println!("{}", poi.name().unwrap_or("<unnamed>"));
    if let Some(address) = poi.address() {
        println!("  address: {address}");
    }
    println!("  GCJ-02: {}", round(gcj, precision));
    println!("  WGS-84: {}", round(gcj.to_wgs84(), precision));
    Ok(())
}

fn round<D: Datum>(coord: Coordinate<D>, precision: Option<u32>) -> Coordinate<D> {
    precision.map_or(coord, |digits| coord.rounded(digits))
}
