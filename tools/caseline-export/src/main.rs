// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CDC COVID case tracker to InfluxDB export CLI
//!
//! Scrapes the current case tracker snapshot, renders Line Protocol, and
//! writes the batch to the configured InfluxDB v2 bucket:
//!
//! ```text
//! caseline-export config.yaml
//! ```
//!
//! Set `RUST_LOG=caseline=debug` for request-level tracing.

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use caseline::{CdcCasesScraper, ExportConfig, InfluxExporter, Precision};

#[derive(Parser, Debug)]
#[command(
    name = "caseline-export",
    about = "Scrape CDC COVID case data and write it to InfluxDB",
    version
)]
struct Args {
    /// Path to the YAML config file
    config: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = ExportConfig::from_file(&args.config)?;

    let mut scraper = CdcCasesScraper::from_config(&config)?;
    let exporter = InfluxExporter::from_config(&config)?;

    log::info!("scraping case tracker snapshot");
    scraper.update()?;
    println!(
        "Scraped {} regions (snapshot updated {})",
        scraper.region_count(),
        scraper.metadata().map(|m| m.update.as_str()).unwrap_or("unknown")
    );

    log::info!("verifying InfluxDB token");
    exporter.is_authenticated()?;

    log::info!("writing to bucket '{}'", exporter.bucket());
    let result = exporter.write(&scraper.line_protocol_data(), Precision::Seconds, false)?;
    if result.accepted() {
        println!(
            "{} {} lines written to bucket '{}'",
            "OK".green().bold(),
            scraper.lines().len(),
            exporter.bucket()
        );
    } else {
        println!(
            "{} write returned HTTP {}",
            "Warning:".yellow().bold(),
            result.status
        );
    }

    Ok(())
}
