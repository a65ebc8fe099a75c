use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use colored::*;

/// okcash-pow - Okcash proof-of-work toolkit
#[derive(Parser, Debug)]
#[command(name = "okcash-pow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compute, verify and prepare Okcash proof-of-work (cache, DAG, hashimoto)", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the epoch seed hash of a block
    Seedhash {
        #[arg(short, long, value_name = "HEIGHT")]
        block: u64,
    },
    /// Print epoch, cache and dataset sizes of a block
    Sizes {
        #[arg(short, long, value_name = "HEIGHT")]
        block: u64,
    },
    /// Hash with a light handle (cache only)
    Light(HashArgs),
    /// Build or reuse the DAG file of a block's epoch
    Makedag {
        #[arg(short, long, value_name = "HEIGHT")]
        block: u64,

        #[command(flatten)]
        dag: DagArgs,
    },
    /// Hash with a full handle (DAG file)
    Full {
        #[command(flatten)]
        hash: HashArgs,

        #[command(flatten)]
        dag: DagArgs,
    },
    /// Check a claimed mix digest against a boundary without cache or DAG
    Check {
        /// Header hash (32 bytes hex)
        #[arg(long, value_name = "HEX")]
        header: String,

        #[arg(short, long, value_name = "NONCE")]
        nonce: String,

        /// Claimed mix digest (32 bytes hex)
        #[arg(long, value_name = "HEX")]
        mix: String,

        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(ClapArgs, Debug)]
pub struct HashArgs {
    #[arg(short, long, value_name = "HEIGHT")]
    pub block: u64,

    /// Header hash (32 bytes hex)
    #[arg(long, value_name = "HEX")]
    pub header: String,

    /// Nonce, decimal or 0x-prefixed hex
    #[arg(short, long, value_name = "NONCE")]
    pub nonce: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(ClapArgs, Debug)]
pub struct TargetArgs {
    /// Boundary (32 bytes hex, big-endian)
    #[arg(long, value_name = "HEX", conflicts_with = "difficulty")]
    pub boundary: Option<String>,

    /// Difficulty, converted to boundary 2^256 / difficulty
    #[arg(long, value_name = "DIFF")]
    pub difficulty: Option<u64>,
}

#[derive(ClapArgs, Debug)]
pub struct DagArgs {
    /// DAG directory (default: per-user data directory)
    #[arg(long, value_name = "DIR")]
    pub dag_dir: Option<PathBuf>,

    /// Regenerate even if a valid DAG file exists
    #[arg(long)]
    pub force: bool,

    /// Generate the dataset on all cores
    #[arg(long)]
    pub parallel: bool,
}

pub fn display_banner() {
    println!(
        "\n{} {}\n",
        "okcash-pow".bright_white().bold(),
        format!(
            "v{} | Ethash revision {}",
            env!("CARGO_PKG_VERSION"),
            okcash_pow::ethash::REVISION
        )
        .bright_green()
    );
}

/// Parse a 32-byte hash given as hex, with or without `0x`
pub fn parse_h256(hex_str: &str) -> Result<[u8; 32]> {
    let trimmed = hex_str.trim_start_matches("0x");
    let bytes = hex::decode(trimmed).with_context(|| format!("invalid hex: {}", hex_str))?;
    if bytes.len() != 32 {
        bail!("expected 32 bytes, got {} in {}", bytes.len(), hex_str);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Parse a nonce given as decimal or `0x` hex
pub fn parse_nonce(s: &str) -> Result<u64> {
    match s.strip_prefix("0x") {
        Some(hex_part) => {
            u64::from_str_radix(hex_part, 16).with_context(|| format!("invalid hex nonce: {}", s))
        }
        None => s.parse::<u64>().with_context(|| format!("invalid nonce: {}", s)),
    }
}

impl TargetArgs {
    /// Boundary to check against, if one was given
    pub fn boundary(&self) -> Result<Option<[u8; 32]>> {
        match (&self.boundary, self.difficulty) {
            (Some(hex_str), _) => parse_h256(hex_str).map(Some),
            (None, Some(difficulty)) => Ok(Some(okcash_pow::boundary_from_difficulty(difficulty))),
            (None, None) => Ok(None),
        }
    }
}
