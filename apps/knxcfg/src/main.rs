use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use knx_config as cfg;

#[derive(Parser, Debug)]
#[command(
    name = "knxcfg",
    version,
    about = "Check and normalize KNX exporter configuration files",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

impl From<Format> for cfg::DocumentFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Json => cfg::DocumentFormat::Json,
            Format::Yaml => cfg::DocumentFormat::Yaml,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode and validate a configuration file
    Check {
        /// Configuration file (.json, .yaml or .yml)
        file: PathBuf,
    },
    /// Print the canonical encoding of a configuration file
    Fmt {
        /// Configuration file (.json, .yaml or .yml)
        file: PathBuf,
        /// Output format; defaults to the input format
        #[arg(long, value_enum)]
        to: Option<Format>,
    },
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file } => check(&file),
        Commands::Fmt { file, to } => fmt(&file, to),
    }
}

fn setup_tracing() {
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn input_format(path: &Path) -> cfg::DocumentFormat {
    path.extension()
        .and_then(|e| e.to_str())
        .map(cfg::DocumentFormat::from_extension)
        .unwrap_or(cfg::DocumentFormat::Json)
}

fn load(path: &Path) -> Result<(cfg::Config, cfg::DocumentFormat)> {
    let bytes = fs::read(path).with_context(|| format!("reading config: {}", path.display()))?;
    let format = input_format(path);
    let config = cfg::decode_as(format, &bytes)
        .with_context(|| format!("decoding config: {}", path.display()))?;
    info!(path = %path.display(), ?format, "loaded configuration");
    Ok((config, format))
}

fn check(path: &Path) -> Result<()> {
    let (config, _) = load(path)?;
    config
        .validate()
        .with_context(|| format!("validating config: {}", path.display()))?;

    match &config.connection {
        Some(c) => println!("connection\t{}\t{}", c.kind, c.endpoint),
        None => println!("connection\t-"),
    }
    println!("prefix\t{}", config.metrics_prefix);
    println!(
        "addresses\t{}\texported={}\tactive={}",
        config.address_configs.len(),
        config.exported().count(),
        config.active_reads().count()
    );
    for (address, entry) in &config.address_configs {
        let mut line = format!(
            "{address}\t{}\t{}\t{}",
            config.metric_name(entry),
            entry.dpt,
            entry.metric_type
        );
        if !entry.export {
            line.push_str("\tnot-exported");
        }
        if entry.read_active {
            line.push_str(&format!("\tmax-age={}", entry.max_age));
        }
        println!("{line}");
    }
    Ok(())
}

fn fmt(path: &Path, to: Option<Format>) -> Result<()> {
    let (config, format) = load(path)?;
    let out_format = to.map(cfg::DocumentFormat::from).unwrap_or(format);
    let mut out = cfg::encode_as(out_format, &config)?;
    if out.last() != Some(&b'\n') {
        out.push(b'\n');
    }
    std::io::stdout().lock().write_all(&out)?;
    Ok(())
}
