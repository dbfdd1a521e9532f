//! # stegvault CLI
//!
//! Thin wrapper around [`StegCodec`] for working with image files.
//!
//! ## Usage
//!
//! ```bash
//! stegvault encode --input cover.jpg --output stego.png --message "meet at noon" --password 'Pass123!'
//! stegvault decode --input stego.png --password 'Pass123!'
//! stegvault capacity --input cover.jpg
//! stegvault inspect --input stego.png
//! ```
//!
//! The output of `encode` is always PNG, whatever the input format.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};

use stegvault::common::config::StegConfig;
use stegvault::common::logging::init_logger;
use stegvault::StegCodec;

/// Hide text in the pixels of an image
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hide a message in an image and write the result as PNG
    Encode {
        /// Cover image (PNG, JPEG, BMP or GIF)
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the PNG output
        #[arg(short, long)]
        output: PathBuf,

        /// Message to hide
        #[arg(short, long)]
        message: String,

        /// Encrypt the message with this password
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Recover a hidden message and print it to stdout
    Decode {
        #[arg(short, long)]
        input: PathBuf,

        /// Password, if the message is encrypted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Show how many characters an image can hold
    Capacity {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show the metadata of a hidden message without decrypting it
    Inspect {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    let config = StegConfig::from_optional_file(args.config.as_deref())?;
    let codec = StegCodec::from_config(&config);

    match args.command {
        Command::Encode {
            input,
            output,
            message,
            password,
        } => {
            if message.trim().is_empty() {
                anyhow::bail!("message is empty");
            }

            let has_png_extension = output
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            if !has_png_extension {
                warn!("⚠️  Output is always PNG; {} has a different extension", output.display());
            }

            let png = codec.encode_bytes(&read_image(&input)?, &message, password.as_deref())?;
            std::fs::write(&output, png)
                .with_context(|| format!("failed to write {}", output.display()))?;

            info!("✅ Message hidden in {}", output.display());
        }
        Command::Decode { input, password } => {
            let message = codec.decode_bytes(&read_image(&input)?, password.as_deref())?;
            println!("{}", message);
        }
        Command::Capacity { input } => {
            let report = codec.capacity_bytes(&read_image(&input)?)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Inspect { input } => {
            let metadata = codec.inspect_bytes(&read_image(&input)?)?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
    }

    Ok(())
}
