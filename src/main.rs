//! cubby CLI - Command line interface for the cubby file store
//!
//! Provides commands for saving, retrieving, listing and deleting stored
//! files from the command line. Designed to be wrapped by services that
//! front the store over a transport.

use clap::{Parser, Subcommand};
use cubby::{FileId, FileMeta, LocalStore, Store, StoreConfig};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubby")]
#[command(about = "A content-addressed file store with prefix and tag indexing")]
#[command(version)]
struct Cli {
    /// Base directory for the store (default: $CUBBY_BASE_PATH or ~/.cubby)
    #[arg(short, long)]
    base_path: Option<PathBuf>,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a file into the store
    Put {
        /// Path of the file to store
        file: PathBuf,

        /// Stored name (defaults to the file's name)
        #[arg(short, long)]
        name: Option<String>,

        /// Grouping prefix to index the file under
        #[arg(short, long)]
        prefix: Option<String>,

        /// Additional tag marker within the prefix
        #[arg(short, long)]
        tag: Option<String>,

        /// Declared mime type
        #[arg(short, long, default_value = "application/octet-stream")]
        mime: String,
    },

    /// Retrieve a stored file
    Get {
        /// The file id
        id: String,

        /// The stored name
        name: String,

        /// Write to this path instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Delete a stored file
    Rm {
        /// The file id
        id: String,

        /// Also drop this tag's marker
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// List files recorded under a prefix
    Ls {
        /// The grouping prefix
        prefix: String,

        /// Restrict to a tag within the prefix
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Remove every file recorded under a prefix
    RmPrefix {
        /// The grouping prefix
        prefix: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let store = open_store(cli.base_path.clone())?;

    match cli.command {
        Commands::Put {
            file,
            name,
            prefix,
            tag,
            mime,
        } => {
            let name = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .ok_or_else(|| anyhow::anyhow!("no file name in {}", file.display()))?,
            };
            let size = fs::metadata(&file)?.len();
            let mut meta = FileMeta::new(name, mime, size);
            if let Some(prefix) = prefix {
                meta = meta.with_prefix(prefix);
            }

            let mut content = fs::File::open(&file)?;
            let id = match tag {
                Some(tag) => store.save_tagged(&meta, &mut content, &tag)?,
                None => store.save(&meta, &mut content)?,
            };
            let meta = meta.with_id(id);
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "file": meta
                }),
            );
        }

        Commands::Get { id, name, out } => {
            let id: FileId = id.parse()?;
            match store.open(&id, &name) {
                Ok(mut content) => match out {
                    Some(out) => {
                        let mut dest = fs::File::create(&out)?;
                        io::copy(&mut content, &mut dest)?;
                        output(
                            &cli.format,
                            &serde_json::json!({
                                "status": "ok",
                                "id": id.to_string(),
                                "name": name,
                                "out": out.display().to_string()
                            }),
                        );
                    }
                    None => {
                        let stdout = io::stdout();
                        let mut handle = stdout.lock();
                        io::copy(&mut content, &mut handle)?;
                        handle.flush()?;
                    }
                },
                Err(e) if e.is_not_found() => {
                    output(
                        &cli.format,
                        &serde_json::json!({
                            "status": "error",
                            "message": format!("Not found: {}/{}", id, name)
                        }),
                    );
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Rm { id, tag } => {
            let id: FileId = id.parse()?;
            store.delete(&id, tag.as_deref())?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "id": id.to_string()
                }),
            );
        }

        Commands::Ls { prefix, tag } => {
            let files = store.list_by_prefix(&prefix, tag.as_deref())?;
            output(
                &cli.format,
                &serde_json::json!({
                    "prefix": prefix,
                    "count": files.len(),
                    "files": files
                }),
            );
        }

        Commands::RmPrefix { prefix } => {
            store.remove_prefix(&prefix)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "prefix": prefix
                }),
            );
        }
    }

    Ok(())
}

fn open_store(base_path: Option<PathBuf>) -> anyhow::Result<LocalStore> {
    let config = match base_path {
        Some(path) => StoreConfig::with_base_path(path),
        None => StoreConfig::from_env(),
    };
    Ok(LocalStore::open(config)?)
}

fn output(format: &OutputFormat, value: &serde_json::Value) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(value).unwrap());
        }
        OutputFormat::Text => {
            println!("{}", serde_json::to_string_pretty(value).unwrap());
        }
    }
}
