mod cli;
mod points;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use georef::{
    best_score, fit_with_options, forward_affine, inverse_affine, AffineParams, CrsScore, CrsScorer, CrsTable,
    FitQuality, Proj4Projector, Projector, ScorerConfig,
};

use crate::cli::{ApplyArgs, BestCrsArgs, Cli, Command, FitArgs};
use crate::points::ControlPoints;

#[derive(Serialize)]
struct FitReport {
    crs: Option<String>,
    params: AffineParams,
    quality: FitQuality,
}

#[derive(Serialize)]
struct BestCrsReport {
    best: String,
    scores: Vec<CrsScore>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    // Stdout carries the JSON report only.
    common::log_setup::setup_logging(
        &cli.log_level,
        cli.log_dir.as_deref(),
        common::log_setup::ConsoleOutput::Stderr,
    );

    match &cli.command {
        Command::Fit(args) => fit(args),
        Command::Forward(args) => apply(args, false),
        Command::Inverse(args) => apply(args, true),
        Command::BestCrs(args) => best_crs(args),
    }
}

fn load_table(extra: Option<&std::path::Path>) -> Result<CrsTable> {
    let mut table = CrsTable::builtin();
    if let Some(path) = extra {
        table
            .extend_from_file(path)
            .with_context(|| format!("Failed to load CRS table: {:?}", path))?;
    }
    Ok(table)
}

fn fit(args: &FitArgs) -> Result<()> {
    let points = ControlPoints::load(&args.points)?;
    let images = points.image();

    let maps = match &args.crs {
        Some(crs) => {
            let table = load_table(args.crs_table.as_deref())?;
            let projector = Proj4Projector::new();
            let scorer = CrsScorer::new(&projector, &table, ScorerConfig::default());
            scorer.ensure_defined(&scorer.config().source_crs)?;
            scorer.ensure_defined(crs)?;
            projector.project_all(&scorer.config().source_crs, crs, &points.geo()?)?
        }
        None => points.map()?,
    };

    let params = fit_with_options(&images, &maps, &args.fit.options())
        .context("Failed to fit transform")?;
    let quality = FitQuality::of_fit(&params, &images, &maps)?;
    tracing::info!(%params, %quality, "fitted transform");

    print_json(&FitReport {
        crs: args.crs.clone(),
        params,
        quality,
    })
}

fn apply(args: &ApplyArgs, inverse: bool) -> Result<()> {
    let point = if inverse {
        inverse_affine(&args.params, args.point)?
    } else {
        forward_affine(&args.params, args.point)
    };
    print_json(&point)
}

fn best_crs(args: &BestCrsArgs) -> Result<()> {
    let points = ControlPoints::load(&args.points)?;
    let table = load_table(args.crs_table.as_deref())?;
    let projector = Proj4Projector::new();

    let config = scorer_config(args)?;
    let scores = CrsScorer::new(&projector, &table, config)
        .score_candidates(&points.geo()?, &points.image(), &args.candidates)
        .context("Failed to score candidate CRSs")?;
    let best = best_score(&scores)
        .map(|score| score.crs.clone())
        .context("No candidate CRS scored")?;
    tracing::info!(crs = %best, "selected CRS");

    print_json(&BestCrsReport { best, scores })
}

fn scorer_config(args: &BestCrsArgs) -> Result<ScorerConfig> {
    let mut config = ScorerConfig {
        source_crs: args.source_crs.clone(),
        fit: args.fit.options(),
        ..Default::default()
    };
    if args.sequential {
        config = config.sequential();
    }
    config.try_validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
