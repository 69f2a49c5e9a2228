//! Command-line front end for the pdfxmp crate.
//!
//! `pdfxmp extract` recovers the XMP packet from a PDF on disk and
//! `pdfxmp serve` runs the HTTP upload service.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pdfxmp::server::{self, output_file_name, ServerConfig};
use pdfxmp::{ExtractorConfig, TextEncoding, XmpError, XmpExtractor, DEFAULT_MAX_FILE_SIZE};
use std::io::Write;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Recover XMP metadata packets from PDF files
#[derive(Parser)]
#[command(name = "pdfxmp")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Print the packet of a PDF to stdout
    pdfxmp extract report.pdf

    # Write it next to the PDF as report_xmp.xml
    pdfxmp extract report.pdf --save

    # Run the upload service on port 8080
    PORT=8080 pdfxmp serve")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the XMP packet from a PDF file
    Extract {
        /// Input PDF file
        input: PathBuf,

        /// Write the packet to this file instead of stdout
        #[arg(short, long, conflicts_with = "save")]
        output: Option<PathBuf>,

        /// Write the packet beside the input as <name>_xmp.xml
        #[arg(long)]
        save: bool,

        /// Refuse files larger than this many MiB
        #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE / (1024 * 1024))]
        max_size_mb: u64,
    },

    /// Run the HTTP upload service
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 3000)]
        port: u16,

        /// Address to bind
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: IpAddr,

        /// Directory for in-flight uploads (defaults to the system temp dir)
        #[arg(long, env = "UPLOAD_DIR")]
        upload_dir: Option<PathBuf>,

        /// Directory of static assets
        #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
        public_dir: PathBuf,

        /// Largest accepted upload in MiB
        #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE / (1024 * 1024))]
        max_upload_mb: u64,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdfxmp=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            save,
            max_size_mb,
        } => run_extract(&input, output, save, max_size_mb),
        Commands::Serve {
            port,
            host,
            upload_dir,
            public_dir,
            max_upload_mb,
        } => mib_to_bytes(max_upload_mb, "--max-upload-mb").and_then(|max_upload_bytes| {
            run_serve(ServerConfig {
                host,
                port,
                upload_dir: upload_dir.unwrap_or_else(std::env::temp_dir),
                public_dir,
                max_upload_bytes,
            })
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run_extract(
    input: &Path,
    output: Option<PathBuf>,
    save: bool,
    max_size_mb: u64,
) -> anyhow::Result<()> {
    let extractor = XmpExtractor::with_config(ExtractorConfig {
        max_file_size: Some(mib_to_bytes(max_size_mb, "--max-size-mb")?),
        ..Default::default()
    });

    let packet = match extractor.extract_file(input) {
        Ok(packet) => packet,
        Err(XmpError::NoXmpFound) => {
            eprintln!("No XMP metadata found in {}", input.display());
            process::exit(1);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", input.display()));
        }
    };

    eprintln!("Found {} bytes via {}", packet.len(), packet.strategy());
    if packet.encoding() == TextEncoding::Latin1Fallback {
        eprintln!("Packet is not valid UTF-8; decoded one byte per character");
    }
    if let Some(conformance) = packet.pdfa_conformance() {
        eprintln!("Declares {conformance}");
    }

    let destination = match (output, save) {
        (Some(path), _) => Some(path),
        (None, true) => {
            let name = output_file_name(&input.to_string_lossy());
            Some(input.with_file_name(name))
        }
        (None, false) => None,
    };

    let text = packet.to_text();
    match destination {
        Some(path) => {
            std::fs::write(&path, text.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Saved to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

fn mib_to_bytes(mib: u64, flag: &str) -> anyhow::Result<u64> {
    mib.checked_mul(1024 * 1024)
        .with_context(|| format!("{flag} {mib} is too large"))
}

fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime
        .block_on(server::serve(config, XmpExtractor::new()))
        .context("server failed")
}
