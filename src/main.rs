use clap::{Parser, Subcommand, ValueEnum};
use libstone::stone1::{ChecksumScope, LayoutEntry, ReadOptions, Reader, Record, RecordKind};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stone", about = "Inspect stone package archives")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the prelude and payload headers without decoding bodies
    Info {
        input: PathBuf,
        /// Decode and checksum every payload body
        #[arg(long)]
        verify_all: bool,
        #[arg(long, value_enum, default_value = "plain")]
        checksum: Scope,
    },
    /// Decode and print every record
    Inspect {
        input: PathBuf,
        /// Emit one JSON object per record
        #[arg(long)]
        json: bool,
        #[arg(long, value_enum, default_value = "plain")]
        checksum: Scope,
    },
}

/// Which bytes the payload checksum covers
#[derive(Clone, Copy, ValueEnum)]
enum Scope {
    /// Decompressed payload bytes
    Plain,
    /// Payload bytes as stored (moss-written archives)
    Stored,
}

impl From<Scope> for ChecksumScope {
    fn from(s: Scope) -> Self {
        match s {
            Scope::Plain  => ChecksumScope::Plain,
            Scope::Stored => ChecksumScope::Stored,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input, verify_all, checksum } => {
            let opts = ReadOptions::default()
                .verify_skipped(verify_all)
                .checksum_scope(checksum.into());
            let mut reader = open(&input, opts)?;
            let prelude = *reader.prelude();
            println!("Archive:  {}", input.display());
            println!("Type:     {}", prelude.stone_type);
            println!("Payloads: {}", prelude.num_payloads);
            while reader.advance_payload() {
                if let Some(header) = reader.header() {
                    println!("  Payload: {header}");
                }
            }
            finish(reader)?;
            if verify_all {
                println!("All payload checksums verified.");
            }
        }

        Commands::Inspect { input, json, checksum } => {
            let opts = ReadOptions::default().checksum_scope(checksum.into());
            let mut reader = open(&input, opts)?;
            if !json {
                println!("Archive: {}", input.display());
            }
            while reader.advance_payload() {
                let header = match reader.header() {
                    Some(h) => *h,
                    None    => break,
                };
                if !json {
                    println!("Payload: {header}");
                }
                while reader.advance_record() {
                    if json {
                        if let Some(record) = reader.record() {
                            println!("{}", serde_json::to_string(record)?);
                        }
                    } else {
                        print_record(&mut reader)?;
                    }
                }
                if !json && header.record_kind().ok() == Some(RecordKind::Content) {
                    println!("  ({} content bytes)", header.plain_size);
                }
            }
            finish(reader)?;
        }
    }

    Ok(())
}

fn open(path: &Path, opts: ReadOptions) -> libstone::Result<Reader<BufReader<File>, Cursor<Vec<u8>>>> {
    libstone::open_with_options(BufReader::new(File::open(path)?), Cursor::new(Vec::new()), opts)
}

fn finish<R: Read, S: Read + Write + Seek>(mut reader: Reader<R, S>) -> libstone::Result<()> {
    match reader.take_error() {
        Some(e) => Err(e),
        None    => Ok(()),
    }
}

fn print_record<R: Read, S: Read + Write + Seek>(reader: &mut Reader<R, S>) -> std::io::Result<()> {
    if let Some(mut content) = reader.content() {
        std::io::copy(&mut content, &mut std::io::sink())?;
        return Ok(());
    }
    match reader.record() {
        Some(Record::Meta(meta)) => println!("  {}:\t{}", meta.tag, meta.field),
        Some(Record::Layout(layout)) => match &layout.entry {
            LayoutEntry::Regular { hash, target } => {
                println!("  /usr/{target} -> {hash:032x} [{}]", layout.entry.file_type())
            }
            LayoutEntry::Symlink { source, target } => {
                println!("  /usr/{target} -> {source} [{}]", layout.entry.file_type())
            }
            entry => println!("  /usr/{} [{}]", entry.target(), entry.file_type()),
        },
        Some(Record::Index(index)) => {
            println!("  - {:032x} [size: {:>9} B]", index.hash, index.len())
        }
        Some(Record::Attribute(attr)) => {
            println!("  {} = {}", String::from_utf8_lossy(&attr.key), hex::encode(&attr.value))
        }
        Some(Record::Content(_)) | None => {}
    }
    Ok(())
}
