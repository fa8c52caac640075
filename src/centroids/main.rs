//! Centroids of converted address ranges.
//!
//! Reads the `;` separated output of `tiger-convert ranges` and writes one
//! point per postcode or per street.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tigerways::summary::{
    collect_points, postcode_centroids, postcode_output_path, street_centroids, SummaryKey,
};

const POSTCODE_HEADERS: [&str; 6] = ["postcode", "city", "county", "state", "lat", "lon"];
const STREET_HEADERS: [&str; 3] = ["street", "lat", "lon"];

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "tiger-centroids")]
#[command(about = "Aggregate converted address ranges into centroids")]
struct Args {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One centroid per city, county, state and postcode
    Postcodes {
        /// Range CSV produced by `tiger-convert ranges`
        input: PathBuf,
        /// Directory receiving `<input>_postals.csv`
        output_dir: PathBuf,
    },
    /// One centroid per street, city, state and postcode
    Streets {
        /// Range CSV (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output CSV (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
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

/// Header is written even when there are no records
fn write_csv<W: Write, S: Serialize>(out: W, headers: &[&str], records: &[S]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .from_writer(out);
    writer.write_record(headers)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn postcodes(input: PathBuf, output_dir: PathBuf) -> Result<()> {
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let output = postcode_output_path(&input, &output_dir);

    info!("Reading postcodes from {}", input.display());
    let file = File::open(&input).with_context(|| format!("Failed to open {}", input.display()))?;
    let groups = collect_points(BufReader::new(file), SummaryKey::Postcode)?;
    let centroids = postcode_centroids(&groups);

    let out = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    write_csv(BufWriter::new(out), &POSTCODE_HEADERS, &centroids)?;
    info!("Wrote {} postcodes to {}", centroids.len(), output.display());
    Ok(())
}

fn streets(input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let reader: Box<dyn Read> = match &input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    info!("Reading streets");
    let groups = collect_points(reader, SummaryKey::Street)?;
    let centroids = street_centroids(&groups);

    match &output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_csv(BufWriter::new(file), &STREET_HEADERS, &centroids)?;
        }
        None => write_csv(io::stdout().lock(), &STREET_HEADERS, &centroids)?,
    }
    info!("Wrote {} streets", centroids.len());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    match args.command {
        Command::Postcodes { input, output_dir } => postcodes(input, output_dir),
        Command::Streets { input, output } => streets(input, output),
    }
}
