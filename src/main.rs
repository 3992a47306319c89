use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use log::{error, info};

use pieces::bencode::{bvalue_to_json, json_to_bvalue, Encoder};
use pieces::config::{Config, DEFAULT_CONFIG_PATH};
use pieces::torrent::info_hash_from_file;

#[derive(Parser)]
#[command(name = "pieces", about = "Decode, encode and hash bencoded data")]
struct Cli {
    /// More output; repeat for more detail (overrides the config log level)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file to read instead of ./pieces.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode bencoded data and print every top-level value as JSON
    Decode {
        /// Bencoded text, or a path when --file is given
        input: String,
        #[arg(long)]
        file: bool,
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Encode a JSON document as bencode and write the raw bytes to stdout
    Encode {
        json: String,
        /// Sort dictionary keys instead of keeping them in document order
        #[arg(long)]
        canonical: bool,
    },
    /// Print the info-hash of a .torrent file
    InfoHash { torrent: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        error!("{:#}", err);
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config = Config::load_from(&config_path)
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("loading config {}", config_path.display()))?;

    init_logging(&config, cli.verbose);

    match cli.command {
        Command::Decode {
            input,
            file,
            max_depth,
        } => {
            if let Some(max_depth) = max_depth {
                config.max_depth = max_depth;
            }
            let data = if file {
                Bytes::from(fs::read(&input).with_context(|| format!("reading {}", input))?)
            } else {
                Bytes::from(input.into_bytes())
            };
            info!("decoding {} bytes", data.len());

            let mut decoder = config.decoder(data);
            for value in decoder.decode_all()? {
                println!("{}", serde_json::to_string(&bvalue_to_json(&value))?);
            }
        }
        Command::Encode { json, canonical } => {
            let parsed: serde_json::Value =
                serde_json::from_str(&json).context("input is not valid JSON")?;
            let value = json_to_bvalue(&parsed)?;
            let encoder = if canonical {
                Encoder::canonical()
            } else {
                config.encoder()
            };

            let stdout = io::stdout();
            let mut out = stdout.lock();
            encoder.encode_to(&value, &mut out)?;
            out.flush()?;
        }
        Command::InfoHash { torrent } => {
            let hash = info_hash_from_file(&torrent)
                .map_err(|e| anyhow::anyhow!(e))
                .with_context(|| format!("hashing {}", torrent.display()))?;
            println!("Info Hash: {}", hash);
        }
    }

    Ok(())
}

fn init_logging(config: &Config, verbose: u8) {
    let level = match verbose {
        0 => config.log_level,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
