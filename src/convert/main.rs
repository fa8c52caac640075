//! TIGER/Line address range converter.
//!
//! Reads a county's road features, draws address lines on both sides of
//! every addressed street and writes either one record per house number
//! (`points`) or one record per range (`ranges`).

mod config;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::slice;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tigerways::address::records::{POINT_HEADERS, RANGE_HEADERS};
use tigerways::address::{address_points, address_ranges, group, RunContext, WayGroup};
use tigerways::lookup::{CountyLookup, ZipCodeLookup};
use tigerways::project::Projection;
use tigerways::source::read_features;

use crate::config::{Config, Overrides};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "tiger-convert")]
#[command(about = "Convert TIGER/Line address ranges into address lines")]
struct Args {
    /// TOML config file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One record per house number
    Points(ConvertArgs),
    /// One record per address range, with its address line geometry
    Ranges(ConvertArgs),
}

#[derive(ClapArgs, Debug)]
struct ConvertArgs {
    /// TIGER/Line ADDRFEAT or EDGES export (CSV with WKT geometry, may be gzipped)
    input: PathBuf,

    /// Output CSV file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Distance of the address lines from the centerline, in feet
    #[arg(long)]
    distance: Option<f64>,

    /// Pullback of the address line ends, in feet
    #[arg(long)]
    pullback: Option<f64>,

    /// Projection of the input coordinates
    #[arg(long, value_enum)]
    projection: Option<Projection>,

    /// ZIP code database (CSV)
    #[arg(long)]
    zip_db: Option<PathBuf>,

    /// County FIPS table (JSON)
    #[arg(long)]
    county_fips: Option<PathBuf>,
}

impl ConvertArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            distance_ft: self.distance,
            pullback_ft: self.pullback,
            projection: self.projection,
            zip_db: self.zip_db.clone(),
            county_fips: self.county_fips.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Points,
    Ranges,
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ways ({per_sec})",
            )?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn write_records<W: Write, S: Serialize>(
    writer: &mut csv::Writer<W>,
    records: impl IntoIterator<Item = S>,
) -> Result<u64> {
    let mut count = 0;
    for record in records {
        writer.serialize(record)?;
        count += 1;
    }
    Ok(count)
}

fn run(mode: Mode, args: &ConvertArgs, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?.apply(args.overrides());
    let settings = config
        .offset_settings()
        .context("Invalid conversion settings")?;
    info!(
        "Address lines {} ft from the centerline, {} ft pullback, {:?} input",
        settings.distance_ft, settings.pullback_ft, config.conversion.projection
    );

    let zips = ZipCodeLookup::load_or_empty(&config.lookup.zip_db)
        .with_context(|| format!("Failed to load ZIP database {}", config.lookup.zip_db.display()))?;
    let counties = CountyLookup::load_or_empty(&config.lookup.county_fips).with_context(|| {
        format!(
            "Failed to load county FIPS table {}",
            config.lookup.county_fips.display()
        )
    })?;

    let features = read_features(&args.input, &counties)
        .with_context(|| format!("Failed to read features from {}", args.input.display()))?;

    let groups: Vec<WayGroup> = group(&features);
    let mut ctx = RunContext::build(config.conversion.projection, &features);

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(open_output(args.output.as_deref())?);
    match mode {
        Mode::Points => writer.write_record(POINT_HEADERS)?,
        Mode::Ranges => writer.write_record(RANGE_HEADERS)?,
    }

    let pb = progress_bar(groups.len())?;
    let mut written = 0;
    for group in &groups {
        let group = slice::from_ref(group);
        written += match mode {
            Mode::Points => write_records(
                &mut writer,
                address_points(group, &mut ctx, &zips, settings),
            )?,
            Mode::Ranges => write_records(
                &mut writer,
                address_ranges(group, &mut ctx, &zips, &settings),
            )?,
        };
        pb.inc(1);
    }
    pb.finish_with_message("Conversion complete");

    writer.flush().context("Failed to flush output")?;
    info!("Wrote {} records", written);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("TIGER/Line address converter");

    match &args.command {
        Command::Points(convert) => run(Mode::Points, convert, args.config.as_deref()),
        Command::Ranges(convert) => run(Mode::Ranges, convert, args.config.as_deref()),
    }
}
