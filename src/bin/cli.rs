//! pstore CLI
//!
//! Inspect and edit a store kept in an EEPROM image file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pstore::medium::FileMedium;
use pstore::{Config, PersistentStore, RecordId, Result, StoreError, ValueHandle};
use tracing_subscriber::{fmt, EnvFilter};

/// pstore CLI
#[derive(Parser, Debug)]
#[command(name = "pstore-cli")]
#[command(about = "Inspect and edit a pstore EEPROM image")]
#[command(version)]
struct Args {
    /// Image file (created erased if missing)
    #[arg(short, long, default_value = "./eeprom.bin")]
    image: PathBuf,

    /// Medium size in bytes
    #[arg(short, long, default_value = "1024")]
    size: u16,

    /// First managed address
    #[arg(long)]
    begin: Option<u16>,

    /// End of the managed range (exclusive)
    #[arg(long)]
    end: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show range, record count and checksum
    Info,

    /// List all stored records
    List,

    /// Print a value by id and size
    Get {
        /// Record id (up to 3 chars)
        id: String,

        /// Declared value size
        size: u16,
    },

    /// Store a value, updating it in place when id and size match
    Set {
        /// Record id (up to 3 chars)
        id: String,

        /// Value as text, or hex with --hex
        value: String,

        /// Parse the value as hex bytes
        #[arg(long)]
        hex: bool,

        /// Declared size; the value is zero-padded to it
        #[arg(long)]
        size: Option<u16>,
    },

    /// Remove every record with this id (rewrites the store)
    Remove {
        /// Record id (up to 3 chars)
        id: String,
    },

    /// Reset the store to empty
    Clear,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let medium = FileMedium::open(&args.image, args.size)?;

    let mut builder = Config::builder();
    if let Some(begin) = args.begin {
        builder = builder.begin(begin);
    }
    if let Some(end) = args.end {
        builder = builder.end(end);
    }
    let config = builder.build();

    let mut store = PersistentStore::new(medium, &config);
    let count = store.open()?;

    match args.command {
        Commands::Info => {
            let (begin, end) = store.range();
            println!("image:      {}", args.image.display());
            println!("range:      [{}, {})", begin, end);
            println!("records:    {}", count);
            if let Some(next) = store.next_write_address() {
                println!("footer at:  {}", next);
            }
            if let Some(free) = store.free_space() {
                println!("free bytes: {}", free);
            }
            println!("checksum:   {:08x}", store.checksum()?);
        }
        Commands::List => {
            for record in store.records() {
                let record = record?;
                println!(
                    "{:>5}  {:<3}  {:>5}  {}  {}",
                    record.address,
                    record.id,
                    record.size(),
                    to_hex(&record.value),
                    printable(&record.value)
                );
            }
        }
        Commands::Get { id, size } => {
            let mut handle = ValueHandle::new(RecordId::user(&id)?, size);
            if !store.find(&mut handle)? {
                return Err(StoreError::Config(format!(
                    "no value '{}' of {} bytes",
                    id, size
                )));
            }
            println!("{}  {}", to_hex(handle.bytes()), printable(handle.bytes()));
        }
        Commands::Set {
            id,
            value,
            hex,
            size,
        } => {
            let mut bytes = if hex {
                parse_hex(&value)?
            } else {
                let mut bytes = value.into_bytes();
                bytes.push(0);
                bytes
            };
            if let Some(size) = size {
                if bytes.len() > size as usize {
                    return Err(StoreError::Config(format!(
                        "value is {} bytes, larger than --size {}",
                        bytes.len(),
                        size
                    )));
                }
                bytes.resize(size as usize, 0);
            }

            let id = RecordId::user(&id)?;
            let mut handle = ValueHandle::with_value(id, &bytes);
            let mut stored = ValueHandle::new(id, handle.size());
            if store.find(&mut stored)? {
                stored.bytes_mut().copy_from_slice(&bytes);
                store.update(&stored)?;
            } else {
                store.append(&mut handle)?;
            }
        }
        Commands::Remove { id } => {
            let removed = store.remove(RecordId::user(&id)?)?;
            println!("{} records removed", removed);
            println!("{} records left", store.count()?);
        }
        Commands::Clear => {
            store.clear()?;
        }
    }

    store.commit()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Text preview with non-printable bytes shown as '.'
fn printable(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    bytes[..end]
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect()
}

fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let text = text.trim_start_matches("0x");
    if !text.is_ascii() || text.len() % 2 != 0 {
        return Err(StoreError::Config(format!(
            "hex value '{}' is not an even number of hex digits",
            text
        )));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&text[i..i + 2], 16)
                .map_err(|e| StoreError::Config(format!("invalid hex '{}': {}", text, e)))
        })
        .collect()
}
