use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use rootcause::prelude::*;
use tracing::debug;

use wl3kit::export::{hex_tags, json};
use wl3kit::models::catalog;
use wl3kit::{DecodeOptions, DecodedModel, FormatRevision, RawFile, decode, decode_with_tags};

/// Inspect WL3 model files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Layout revision of the input files
    #[clap(long, value_enum, default_value_t = RevisionArg::Auto, global = true)]
    revision: RevisionArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum RevisionArg {
    /// Detect the revision of each file
    Auto,
    Early,
    Final,
}

impl RevisionArg {
    fn options(self) -> DecodeOptions {
        let revision = match self {
            RevisionArg::Auto => None,
            RevisionArg::Early => Some(FormatRevision::Early),
            RevisionArg::Final => Some(FormatRevision::Final),
        };
        DecodeOptions::builder().maybe_revision(revision).build()
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the header, part table and known-asset description of each file
    Info {
        /// .wl3 file(s)
        files: Vec<PathBuf>,
    },
    /// Write a wxHexEditor tag file describing every decoded field
    Tags {
        file: PathBuf,
        /// Output path. Defaults to stdout
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// Dump the decoded mesh buffers as JSON
    Mesh {
        file: PathBuf,
        /// Output path. Defaults to stdout
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>, Report> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).context("Failed to create output file")?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn summarize(path: &Path, model: &DecodedModel) -> String {
    let header = &model.header;
    let mut out = format!(
        "{}: '{}', {} revision",
        path.display(),
        header.name,
        model.revision
    );
    if let Some(asset) = catalog::lookup(path) {
        out.push_str(&format!(" ({}: {})", asset.kind, asset.description));
    }
    out.push_str(&format!(
        "\n  {} parts, {} vertices, {} primitives declared; {} primitives decoded",
        header.num_part,
        header.num_vert,
        header.num_prim,
        model.mesh.primitive_count()
    ));
    out.push_str(&format!(
        "\n  part table @ 0x{:X} (0x{:X} bytes)",
        model.part_table.start, model.part_table.size
    ));
    for part in &model.parts {
        out.push_str(&format!(
            "\n  part[{}] @ 0x{:X}: {} triangles, {} quads, {} vertices, texture '{}'",
            part.part.index,
            part.part.start,
            part.triangles,
            part.quads,
            part.part.num_vert,
            part.part.texture
        ));
    }
    out
}

fn info(files: &[PathBuf], options: &DecodeOptions) -> Result<(), Report> {
    let results: Vec<_> = files
        .par_iter()
        .map(|path| {
            let raw = RawFile::open(path)?;
            let model = decode(&raw, options)?;
            Ok::<_, rootcause::Report<wl3kit::Wl3Error>>(summarize(path, &model))
        })
        .collect();

    let mut failed = 0usize;
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(summary) => println!("{summary}"),
            Err(e) => {
                failed += 1;
                eprintln!("{}: {e}", path.display());
            }
        }
    }

    if failed > 0 {
        return Err(rootcause::report!(
            "{} of {} files failed to decode",
            failed,
            files.len()
        ));
    }
    Ok(())
}

fn tags(file: &Path, output: Option<&Path>, options: &DecodeOptions) -> Result<(), Report> {
    let raw = RawFile::open(file).context("Failed to load model")?;
    let (_, tags) = decode_with_tags(&raw, options).context("Failed to decode model")?;
    debug!("{} tags", tags.len());

    let mut writer = open_output(output)?;
    hex_tags::write_hex_tags(&file.display().to_string(), &tags, &mut writer)
        .context("Failed to write tag file")?;
    Ok(())
}

fn mesh(file: &Path, output: Option<&Path>, options: &DecodeOptions) -> Result<(), Report> {
    let raw = RawFile::open(file).context("Failed to load model")?;
    let model = decode(&raw, options).context("Failed to decode model")?;

    let mut writer = open_output(output)?;
    json::write_model_json(&model, &mut writer).context("Failed to write mesh")?;
    Ok(())
}

fn main() -> Result<(), Report> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let options = args.revision.options();

    match args.command {
        Command::Info { files } => info(&files, &options),
        Command::Tags { file, output } => tags(&file, output.as_deref(), &options),
        Command::Mesh { file, output } => mesh(&file, output.as_deref(), &options),
    }
}
