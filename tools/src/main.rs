//! audit-runner: headless bill-audit runner.
//!
//! Usage:
//!   audit-runner --bill data/samples/bill_sample.json --pretty
//!   audit-runner --batch data/samples/bill_batch.jsonl --data-dir ./data
//!   audit-runner --stdin --builtin-tables

use anyhow::{Context, Result};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tariff_audit_core::{
    pipeline::{AuditReport, BatchSummary},
    AuditConfig, AuditPipeline,
};

const DEFAULT_DATA_DIR: &str = "./data";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let pretty = has_flag(&args, "--pretty");
    let data_dir = arg_value(&args, "--data-dir");

    let config = match data_dir {
        Some(dir) if !has_flag(&args, "--builtin-tables") => AuditConfig::load(dir)?,
        None if !has_flag(&args, "--builtin-tables") && Path::new(DEFAULT_DATA_DIR).is_dir() => {
            AuditConfig::load(DEFAULT_DATA_DIR)?
        }
        _ => {
            log::info!("Using built-in reference tariff table");
            AuditConfig::reference()
        }
    };
    let pipeline = AuditPipeline::new(config);

    if let Some(path) = arg_value(&args, "--bill") {
        let raw = std::fs::read_to_string(path).with_context(|| format!("Cannot read {path}"))?;
        let report = pipeline.run_json(&raw);
        print_report(&mut io::stdout(), &report, pretty)?;
    } else if let Some(path) = arg_value(&args, "--batch") {
        run_batch_file(&pipeline, path, pretty)?;
    } else if has_flag(&args, "--stdin") {
        run_stdin_loop(&pipeline, pretty)?;
    } else {
        eprintln!("audit-runner: one of --bill FILE, --batch FILE or --stdin is required");
        eprintln!("  options: --data-dir DIR | --builtin-tables, --pretty");
        std::process::exit(2);
    }

    Ok(())
}

/// A batch file is either a JSON array of records or one record per line.
fn run_batch_file(pipeline: &AuditPipeline, path: &str, pretty: bool) -> Result<()> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Cannot read {path}"))?;
    let mut stdout = io::stdout();

    let reports: Vec<AuditReport> = match serde_json::from_str::<Vec<serde_json::Value>>(&content) {
        Ok(values) => values
            .iter()
            .map(|v| pipeline.run_json(&v.to_string()))
            .collect(),
        Err(_) => content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| pipeline.run_json(l))
            .collect(),
    };

    for report in &reports {
        print_report(&mut stdout, report, pretty)?;
    }

    let summary = BatchSummary::from_reports(&reports);
    eprintln!("=== BATCH SUMMARY ===");
    eprintln!("  audited:          {}", summary.audited);
    eprintln!("  conforming:       {}", summary.conforming);
    eprintln!("  non-conforming:   {}", summary.non_conforming);
    eprintln!("  errors:           {}", summary.errors);
    eprintln!("  financial impact: {:.2}", summary.financial_impact);
    Ok(())
}

/// One record per line in, one report per line out, until EOF.
fn run_stdin_loop(pipeline: &AuditPipeline, pretty: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let report = pipeline.run_json(&buffer);
        print_report(&mut stdout, &report, pretty)?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_report(out: &mut impl Write, report: &AuditReport, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    writeln!(out, "{json}")?;
    Ok(())
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
