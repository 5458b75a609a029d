//! ncresponse - Render a dataset description as a NetCDF3 stream.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ncresponse::config::FormatVersion;
use ncresponse::{description, NcResponse, ResponseConfig};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "ncresponse")]
#[command(about = "Stream a dataset description as a NetCDF3 file", long_about = None)]
struct Args {
    /// Path to the JSON dataset description
    input: PathBuf,

    /// Write the body here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// On-disk format version
    #[arg(long, value_enum, default_value_t = Format::Classic)]
    format: Format,

    /// Records emitted per body block
    #[arg(long, default_value_t = 1)]
    records_per_block: usize,

    /// Unlimited dimension, overriding the dataset's own hint
    #[arg(long, value_name = "NAME")]
    unlimited: Option<String>,

    /// Print the response headers to stderr
    #[arg(long)]
    headers: bool,

    /// Read the written file back and print a summary (needs --output)
    #[cfg(feature = "verify")]
    #[arg(long, requires = "output")]
    verify: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Classic format, 32-bit offsets
    Classic,
    /// 64-bit offset format
    #[value(name = "64bit")]
    Offset64,
}

impl From<Format> for FormatVersion {
    fn from(format: Format) -> Self {
        match format {
            Format::Classic => FormatVersion::Classic,
            Format::Offset64 => FormatVersion::Offset64,
        }
    }
}

fn setup_logging(args: &Args) -> Result<()> {
    let default = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let writer = match &args.log {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(args.log.is_none())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args)?;
    tracing::info!("Starting ncresponse");

    let dataset = description::read_file(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    let mut config = ResponseConfig::default()
        .with_format(args.format.into())
        .with_records_per_block(args.records_per_block);
    if let Some(name) = &args.unlimited {
        config = config.with_unlimited_dimension(name.clone());
    }

    let response = NcResponse::new(dataset, config).context("Failed to build NetCDF response")?;

    if args.headers {
        for (name, value) in response.headers().iter() {
            eprintln!("{}: {}", name, value);
        }
    }

    let written = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            response.write_to(BufWriter::new(file))
        }
        None => response.write_to(io::stdout().lock()),
    }
    .context("Failed to stream NetCDF body")?;
    tracing::info!("Wrote {} bytes", written);

    #[cfg(feature = "verify")]
    if args.verify {
        if let Some(path) = &args.output {
            print_summary(&ncresponse::verify::summarize(path)?);
        }
    }

    Ok(())
}

#[cfg(feature = "verify")]
fn print_summary(summary: &ncresponse::verify::FileSummary) {
    for dim in &summary.dimensions {
        let unlimited = if dim.unlimited { " (unlimited)" } else { "" };
        eprintln!("dimension {} = {}{}", dim.name, dim.len, unlimited);
    }
    for var in &summary.variables {
        eprintln!(
            "variable {} {}({})",
            var.dtype,
            var.name,
            var.dimensions.join(", ")
        );
    }
}
