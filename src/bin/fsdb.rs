//! fsdb CLI
//!
//! Inspect and edit an fsdb data directory from the command line.

use std::fs;
use std::path::Path;

use clap::{Parser, Subcommand};
use fsdb::{CollectionOptions, Config, IndexDefinition, Record, Registry, Store};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

/// fsdb CLI
#[derive(Parser, Debug)]
#[command(name = "fsdb")]
#[command(about = "CLI for the fsdb document store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "data")]
    data_dir: String,

    /// Record file extension
    #[arg(short, long, default_value = "json")]
    ext: String,

    /// Collections to open (defaults to every directory under the data dir)
    #[arg(short, long = "collection")]
    collections: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count the records of a collection
    Count {
        collection: String,
    },

    /// List the record ids of a collection
    Ids {
        collection: String,
    },

    /// Print a record
    Get {
        collection: String,
        id: String,
    },

    /// Save a record given as a JSON object
    Put {
        collection: String,

        /// JSON object, e.g. '{"name": "brian"}'
        json: String,
    },

    /// Delete a record
    Rm {
        collection: String,
        id: String,
    },

    /// Find records by exact field value
    Find {
        collection: String,

        /// Field to match
        field: String,

        /// Value to match (parsed as JSON, falling back to a plain string)
        value: String,

        /// Compare case-insensitively
        #[arg(short, long)]
        ignore_case: bool,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fsdb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> fsdb::Result<()> {
    let collections = if args.collections.is_empty() {
        discover_collections(Path::new(&args.data_dir))?
    } else {
        args.collections.clone()
    };

    let mut registry = Registry::new();
    for name in &collections {
        registry.register_collection(name.as_str(), CollectionOptions::default())?;
    }
    // Commands may address a collection that does not exist on disk yet
    let target = command_collection(&args.command);
    if !registry.contains(target) {
        registry.register_collection(target, CollectionOptions::default())?;
    }

    let config = Config::builder()
        .base_path(&args.data_dir)
        .file_extension(&args.ext)
        .build();
    let store = registry.open(config)?;

    execute(&store, args.command)?;
    store.shutdown();
    Ok(())
}

fn execute(store: &Store, command: Commands) -> fsdb::Result<()> {
    match command {
        Commands::Count { collection } => {
            println!("{}", store.count(&collection)?);
        }
        Commands::Ids { collection } => {
            for id in store.record_ids(&collection)? {
                println!("{}", id?);
            }
        }
        Commands::Get { collection, id } => {
            print_record(&store.get(&collection, id.as_str())?)?;
        }
        Commands::Put { collection, json } => {
            let value: Value = serde_json::from_str(&json)
                .map_err(|e| fsdb::FsdbError::Decode(e.to_string()))?;
            let saved = store.save(&collection, Record::try_from(value)?)?;
            print_record(&saved)?;
        }
        Commands::Rm { collection, id } => {
            let outcome = store.delete(&collection, id.as_str())?;
            println!("{:?}", outcome);
        }
        Commands::Find {
            collection,
            field,
            value,
            ignore_case,
        } => {
            let mut definition = IndexDefinition::new("cli", [field.clone()]);
            if ignore_case {
                definition = definition.case_insensitive();
            }
            store.add_index(&collection, definition)?;

            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            let query = Record::new().with(field, value);
            for record in store.lookup(&collection, "cli", &query)? {
                print_record(&record?)?;
            }
        }
    }
    Ok(())
}

fn command_collection(command: &Commands) -> &str {
    match command {
        Commands::Count { collection }
        | Commands::Ids { collection }
        | Commands::Get { collection, .. }
        | Commands::Put { collection, .. }
        | Commands::Rm { collection, .. }
        | Commands::Find { collection, .. } => collection,
    }
}

/// Every subdirectory of the data dir is a collection
fn discover_collections(data_dir: &Path) -> fsdb::Result<Vec<String>> {
    if !data_dir.exists() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(data_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

fn print_record(record: &Record) -> fsdb::Result<()> {
    let text = serde_json::to_string_pretty(record)
        .map_err(|e| fsdb::FsdbError::Encode(e.to_string()))?;
    println!("{}", text);
    Ok(())
}
