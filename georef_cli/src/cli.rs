use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use glam::DVec2;

use georef::{AffineParams, TransformMode, YAxisMode};

#[derive(Parser, Debug)]
#[command(name = "georef")]
#[command(version, about = "Fit image-to-map transforms and pick the CRS a map was drawn in")]
pub struct Cli {
    /// Log filter (overridden by RUST_LOG)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Also write daily rolling log files into this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fit transform parameters from a control-point file
    Fit(FitArgs),
    /// Map an image point into the map plane
    Forward(ApplyArgs),
    /// Map a map-plane point back into the image
    Inverse(ApplyArgs),
    /// Rank candidate CRSs and report the best one
    BestCrs(BestCrsArgs),
}

#[derive(Args, Debug)]
pub struct FitOptionArgs {
    /// Transform family: affine, similar or noshear
    #[arg(short, long, default_value = "affine", value_parser = parse_mode)]
    pub mode: TransformMode,

    /// Image Y axis relative to map Y: same, opposite or auto
    #[arg(short, long, default_value = "auto", value_parser = parse_y_axis)]
    pub y_axis: YAxisMode,
}

#[derive(Args, Debug)]
pub struct FitArgs {
    /// YAML or JSON control-point file
    pub points: PathBuf,

    /// Project the `geo` coordinates into this CRS instead of using `map`
    #[arg(long)]
    pub crs: Option<String>,

    /// Extra CRS definitions (YAML or JSON list of {id, definition})
    #[arg(long)]
    pub crs_table: Option<PathBuf>,

    #[command(flatten)]
    pub fit: FitOptionArgs,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Parameters "A,B,C,D,E,F"
    #[arg(short, long, value_parser = parse_params, allow_hyphen_values = true)]
    pub params: AffineParams,

    /// Point "X,Y"
    #[arg(value_parser = parse_point, allow_hyphen_values = true)]
    pub point: DVec2,
}

#[derive(Args, Debug)]
pub struct BestCrsArgs {
    /// YAML or JSON control-point file with `geo` coordinates
    pub points: PathBuf,

    /// Candidate CRS identifiers, in priority order for ties
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub candidates: Vec<String>,

    /// Extra CRS definitions (YAML or JSON list of {id, definition})
    #[arg(long)]
    pub crs_table: Option<PathBuf>,

    /// CRS of the `geo` coordinates
    #[arg(long, default_value = georef::DEFAULT_SOURCE_CRS)]
    pub source_crs: String,

    /// Score candidates one after another instead of on the thread pool
    #[arg(long)]
    pub sequential: bool,

    #[command(flatten)]
    pub fit: FitOptionArgs,
}

impl FitOptionArgs {
    pub fn options(&self) -> georef::FitOptions {
        georef::FitOptions::new(self.mode, self.y_axis)
    }
}

fn parse_numbers<const N: usize>(s: &str) -> Result<[f64; N], String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("Invalid number: {}", part))
        })
        .collect::<Result<_, _>>()?;

    let count = values.len();
    values
        .try_into()
        .map_err(|_| format!("Expected {} comma-separated values, got {}", N, count))
}

fn parse_mode(s: &str) -> Result<TransformMode, String> {
    s.parse().map_err(|e: georef::Error| e.to_string())
}

fn parse_y_axis(s: &str) -> Result<YAxisMode, String> {
    s.parse().map_err(|e: georef::Error| e.to_string())
}

fn parse_params(s: &str) -> Result<AffineParams, String> {
    parse_numbers::<6>(s).map(AffineParams::from_array)
}

fn parse_point(s: &str) -> Result<DVec2, String> {
    parse_numbers::<2>(s).map(DVec2::from_array)
}
