//! pdfappend binary
//!
//! Appends attachments, streams and replacement objects to an existing PDF
//! as an incremental update, and inspects the object graph.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pdfappend_core::{find_object, Dictionary, LopdfReader, Reader, UpdateBuilder, UpdateConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pdfappend")]
#[command(version, about = "Incremental updates for existing PDF files")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append objects to INPUT and write the result to OUTPUT
    Append {
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Embed a file as an attachment
        #[arg(long = "attach", value_name = "FILE")]
        attachments: Vec<PathBuf>,

        /// Add the file's content as a plain stream object
        #[arg(long = "stream", value_name = "FILE")]
        streams: Vec<PathBuf>,

        /// Replace object NUM with the file's content
        #[arg(long = "replace", value_name = "NUM=FILE", value_parser = parse_replacement)]
        replacements: Vec<(u32, PathBuf)>,

        /// TOML file overriding the marker and trailer keys
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print every occurrence of object NUMBER reachable from the trailer
    Find { input: PathBuf, number: u32 },

    /// Print the trailer, size and startxref of INPUT
    Inspect { input: PathBuf },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Stdout carries command output, so logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.command {
        Command::Append {
            input,
            output,
            attachments,
            streams,
            replacements,
            config,
        } => append(&input, &output, &attachments, &streams, &replacements, config.as_deref()),
        Command::Find { input, number } => find(&input, number),
        Command::Inspect { input } => inspect(&input),
    }
}

fn append(
    input: &Path,
    output: &Path,
    attachments: &[PathBuf],
    streams: &[PathBuf],
    replacements: &[(u32, PathBuf)],
    config: Option<&Path>,
) -> Result<()> {
    if input == output {
        bail!("Output must differ from input: {}", input.display());
    }
    let original = read(input)?;
    let mut builder = UpdateBuilder::new(&original)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    if let Some(path) = config {
        let config = UpdateConfig::from_file(path)?;
        builder = builder.with_config(config)?;
    }

    for path in attachments {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("No file name in {}", path.display()))?;
        let reference = builder.stage_attachment(&filename, &read(path)?, Dictionary::new())?;
        tracing::info!("Attached {} as {}", filename, reference);
    }
    for path in streams {
        let reference = builder.stage_addition(&read(path)?, Dictionary::new())?;
        tracing::info!("Added {} as {}", path.display(), reference);
    }
    for (number, path) in replacements {
        let reference = builder.stage_replacement(*number, &read(path)?, Dictionary::new())?;
        tracing::info!("Replaced {} with {}", reference, path.display());
    }
    if !builder.has_changes() {
        tracing::warn!("Nothing staged, output is a copy of the input");
    }

    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    let report = builder
        .write(&mut writer)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(
        "Wrote {} bytes to {} ({} warnings)",
        report.written,
        output.display(),
        report.warnings.len()
    );
    Ok(())
}

fn find(input: &Path, number: u32) -> Result<()> {
    let bytes = read(input)?;
    let reader = LopdfReader::from_bytes(&bytes)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    let traversal = find_object(&reader, number);

    for value in &traversal.found {
        println!("{}", value);
    }
    tracing::info!(
        "{} occurrences of object {}, {} warnings",
        traversal.found.len(),
        number,
        traversal.warnings.len()
    );
    Ok(())
}

fn inspect(input: &Path) -> Result<()> {
    let bytes = read(input)?;
    let reader = LopdfReader::from_bytes(&bytes)
        .with_context(|| format!("Failed to parse {}", input.display()))?;

    println!("trailer   {}", reader.trailer());
    println!("size      {}", reader.size());
    println!("startxref {}", reader.startxref());
    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Parse `NUM=FILE`.
fn parse_replacement(s: &str) -> Result<(u32, PathBuf), String> {
    let (number, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NUM=FILE, got {:?}", s))?;
    let number = number
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("bad object number {:?}: {}", number, e))?;
    if path.is_empty() {
        return Err(format!("missing file in {:?}", s));
    }
    Ok((number, PathBuf::from(path)))
}
