use std::ops::ControlFlow;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use serde::Serialize;

mod cli;

use cli::{display_banner, parse_h256, parse_nonce, Args, Command, DagArgs, HashArgs};
use okcash_pow::ethash::{cache_size, check_block_number, EpochInfo};
use okcash_pow::{check_difficulty, quick_hash, seedhash, Full, FullOptions, Light, ReturnValue};

#[derive(Serialize)]
struct SizesReport {
    block: u64,
    epoch: u64,
    seed_hash: String,
    cache_bytes: u64,
    dataset_bytes: u64,
}

#[derive(Serialize)]
struct HashReport {
    block: u64,
    nonce: u64,
    mix_hash: String,
    result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    meets_boundary: Option<bool>,
    elapsed_ms: u64,
}

#[derive(Serialize)]
struct DagReport {
    block: u64,
    path: Option<String>,
    dataset_bytes: u64,
    elapsed_ms: u64,
}

#[derive(Serialize)]
struct CheckReport {
    result: String,
    meets_boundary: Option<bool>,
}

fn print_json<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Percent printer handed to DAG generation; stays quiet in JSON mode
fn progress_printer(quiet: bool) -> impl Fn(u32) -> ControlFlow<()> + Sync {
    move |percent| {
        if !quiet {
            eprint!("\r{} {:>3}%", "Generating DAG".cyan(), percent);
            if percent >= 100 {
                eprintln!();
            }
        }
        ControlFlow::Continue(())
    }
}

fn full_options(dag: &DagArgs) -> FullOptions {
    FullOptions {
        dirname: dag.dag_dir.clone(),
        force_create: dag.force,
        parallel: dag.parallel,
    }
}

fn build_light(block: u64, quiet: bool) -> Result<Light> {
    if !quiet {
        println!(
            "{:<15} {:.1} MB",
            "Cache:".green(),
            cache_size(block) as f64 / (1024.0 * 1024.0)
        );
    }
    Light::new(block).with_context(|| format!("building cache for block {}", block))
}

fn build_full(block: u64, dag: &DagArgs, quiet: bool) -> Result<Full> {
    let light = build_light(block, quiet)?;
    Full::with_options(light, &full_options(dag), progress_printer(quiet))
        .map_err(|e| e.into_parts().1)
        .with_context(|| format!("preparing DAG for block {}", block))
}

fn report_hash(args: &Args, hash: &HashArgs, nonce: u64, out: ReturnValue, started: Instant) -> Result<()> {
    let meets_boundary = hash
        .target
        .boundary()?
        .map(|boundary| check_difficulty(&out.result, &boundary));
    let report = HashReport {
        block: hash.block,
        nonce,
        mix_hash: hex::encode(out.mix_hash),
        result: hex::encode(out.result),
        meets_boundary,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };
    if args.json {
        return print_json(&report);
    }
    println!("{:<15} {}", "Mix hash:".green(), report.mix_hash.bright_white());
    println!("{:<15} {}", "Result:".green(), report.result.bright_white());
    print_verdict(report.meets_boundary);
    println!("{:<15} {} ms", "Elapsed:".green(), report.elapsed_ms);
    Ok(())
}

fn print_verdict(meets_boundary: Option<bool>) {
    match meets_boundary {
        Some(true) => println!("{:<15} {}", "Boundary:".green(), "met".bright_green().bold()),
        Some(false) => println!("{:<15} {}", "Boundary:".green(), "not met".red().bold()),
        None => {}
    }
}

fn run(args: &Args) -> Result<()> {
    let quiet = args.json;
    match &args.command {
        Command::Seedhash { block } => {
            check_block_number(*block)?;
            let seed = hex::encode(seedhash(*block));
            if args.json {
                print_json(&serde_json::json!({ "block": block, "seed_hash": seed }))?;
            } else {
                println!("{}", seed);
            }
        }
        Command::Sizes { block } => {
            let info = EpochInfo::try_for_block(*block)?;
            let report = SizesReport {
                block: *block,
                epoch: info.epoch,
                seed_hash: hex::encode(info.seed_hash),
                cache_bytes: info.cache_bytes,
                dataset_bytes: info.dataset_bytes,
            };
            if args.json {
                print_json(&report)?;
            } else {
                println!("{:<15} {}", "Epoch:".green(), report.epoch);
                println!("{:<15} {}", "Seed hash:".green(), report.seed_hash.bright_white());
                println!("{:<15} {} bytes", "Cache:".green(), report.cache_bytes);
                println!("{:<15} {} bytes", "Dataset:".green(), report.dataset_bytes);
            }
        }
        Command::Light(hash) => {
            let header = parse_h256(&hash.header)?;
            let nonce = parse_nonce(&hash.nonce)?;
            let started = Instant::now();
            let light = build_light(hash.block, quiet)?;
            let out = light.compute(&header, nonce)?;
            report_hash(args, hash, nonce, out, started)?;
        }
        Command::Makedag { block, dag } => {
            let started = Instant::now();
            let full = build_full(*block, dag, quiet)?;
            let report = DagReport {
                block: *block,
                path: full.path().map(|p| p.display().to_string()),
                dataset_bytes: full.dag_size(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            };
            if args.json {
                print_json(&report)?;
            } else {
                if let Some(path) = &report.path {
                    println!("{:<15} {}", "DAG file:".green(), path.bright_white());
                }
                println!("{:<15} {} bytes", "Dataset:".green(), report.dataset_bytes);
                println!("{:<15} {} ms", "Elapsed:".green(), report.elapsed_ms);
            }
        }
        Command::Full { hash, dag } => {
            let header = parse_h256(&hash.header)?;
            let nonce = parse_nonce(&hash.nonce)?;
            let started = Instant::now();
            let full = build_full(hash.block, dag, quiet)?;
            let out = full.compute(&header, nonce)?;
            report_hash(args, hash, nonce, out, started)?;
        }
        Command::Check { header, nonce, mix, target } => {
            let header = parse_h256(header)?;
            let nonce = parse_nonce(nonce)?;
            let mix = parse_h256(mix)?;
            let result = quick_hash(&header, nonce, &mix);
            let report = CheckReport {
                result: hex::encode(result),
                meets_boundary: target.boundary()?.map(|b| check_difficulty(&result, &b)),
            };
            if args.json {
                print_json(&report)?;
            } else {
                println!("{:<15} {}", "Result:".green(), report.result.bright_white());
                print_verdict(report.meets_boundary);
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }
    if !args.json {
        display_banner();
    }

    if let Err(e) = run(&args) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
    Ok(())
}
