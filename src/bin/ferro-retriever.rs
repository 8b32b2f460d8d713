// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-retriever CLI
//!
//! Command-line interface for retrieving annotation records.

use clap::{Parser, Subcommand};
use ferro_retriever::cli::{build_config, build_query, output_error, output_record, OutputFormat};
use ferro_retriever::reference::{SequenceStore, SqliteStore};
use ferro_retriever::{Retriever, RetrieverConfig, Span};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{debug, info};
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "ferro-retriever")]
#[command(author, version, about = "Genomic annotation record retriever")]
#[command(
    long_about = "Resolve an accession into a record of genes, transcripts, exon and CDS
positions, and reference sequence.

Examples:
  ferro-retriever retrieve NC_000011.10 --position 112086000 --config retriever.toml
  ferro-retriever retrieve NC_000011.10 --gene SDHD --format json
  ferro-retriever retrieve NC_000011.10 --transcript NM_003002.4
  ferro-retriever slice d41d8cd98f00b204 1000 1100 --sequence-dir /data/seq
  ferro-retriever init-db annotation.db"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retrieve the annotation record for an accession
    Retrieve {
        /// Reference accession with version (e.g., NC_000011.10)
        accession: String,

        /// Restrict to the transcripts of a gene symbol
        #[arg(long)]
        gene: Option<String>,

        /// Restrict to a transcript (ACCESSION.VERSION)
        #[arg(long)]
        transcript: Option<String>,

        /// Position to retrieve around (repeatable)
        #[arg(long = "position")]
        positions: Vec<u64>,

        /// Range START-END to retrieve around (repeatable)
        #[arg(long = "range")]
        ranges: Vec<String>,

        #[command(flatten)]
        settings: Settings,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Write raw bytes of a sequence file to stdout
    Slice {
        /// Sequence checksum (file name without extension)
        checksum: String,

        /// First position (1-based)
        start: u64,

        /// Last position (inclusive)
        end: u64,

        #[command(flatten)]
        settings: Settings,
    },

    /// Create an empty annotation database
    InitDb {
        /// Database file to create
        path: PathBuf,
    },
}

/// Settings shared by subcommands that read data
#[derive(clap::Args)]
struct Settings {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Annotation database (overrides the configuration)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Sequence directory (overrides the configuration)
    #[arg(long)]
    sequence_dir: Option<PathBuf>,

    /// Flank added around positions (overrides the configuration)
    #[arg(long)]
    flank: Option<u64>,
}

impl Settings {
    fn load(&self) -> Result<RetrieverConfig, Box<dyn std::error::Error>> {
        Ok(build_config(
            self.config.as_deref(),
            self.database.as_deref(),
            self.sequence_dir.as_deref(),
            self.flank,
        )?)
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Retrieve {
            accession,
            gene,
            transcript,
            positions,
            ranges,
            settings,
            format,
        } => run_retrieve(
            &accession,
            gene.as_deref(),
            transcript.as_deref(),
            &positions,
            &ranges,
            &settings,
            &format,
        ),
        Commands::Slice {
            checksum,
            start,
            end,
            settings,
        } => run_slice(&checksum, start, end, &settings),
        Commands::InitDb { path } => run_init_db(&path),
    }
}

fn init_tracing(level: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

    let filter = match level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| format!("Invalid log level '{}': {}", level, e))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    Ok(())
}

fn run_retrieve(
    accession: &str,
    gene: Option<&str>,
    transcript: Option<&str>,
    positions: &[u64],
    ranges: &[String],
    settings: &Settings,
    format: &str,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let format = OutputFormat::from_str(format)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let query = match build_query(accession, gene, transcript, positions, ranges) {
        Ok(query) => query,
        Err(e) => {
            output_error(&mut io::stderr(), accession, &e, format)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let config = settings.load()?;
    let mut log = config.message_log()?;
    let result = Retriever::open(config).and_then(|retriever| {
        debug!("Opened annotation database {:?}", retriever.store().filename());
        retriever.retrieve(&query, &mut log)
    });

    match result {
        Ok(record) => {
            output_record(&mut out, &record, format)?;
            info!(
                "{} warning(s), {} error(s)",
                log.warning_count(),
                log.error_count()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            output_error(&mut io::stderr(), &query.to_string(), &e, format)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_slice(
    checksum: &str,
    start: u64,
    end: u64,
    settings: &Settings,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = settings.load()?;
    let store = SequenceStore::new(config.sequence_dir()?);

    match store.fetch(checksum, Span::new(start, end)) {
        Ok(bytes) => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            out.write_all(&bytes)?;
            out.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("ERROR [{}]: {}", e.code(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_init_db(path: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    SqliteStore::create(path)?;
    info!("Created annotation database {}", path.display());
    Ok(ExitCode::SUCCESS)
}
