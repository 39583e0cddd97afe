//! Pool winner lookup CLI
//!
//! Scans a delimited pool file (`name;n1;...;nk` per line) and prints the
//! name of every record whose numbers match the target tuple, order
//! ignored. Exact mode matches all numbers; `--min-match=N` relaxes the
//! match to any N shared numbers.
//!
//! Uses one scan thread per file region. The pool is memory-mapped and
//! shared read-only across threads.
//!
//! # Output Format
//!
//! Matching names are written to stdout, one per line, in no particular
//! order. Statistics are written to stderr upon completion:
//! `file_bytes=N regions=N boundaries=N matches=N elapsed_ms=N throughput_mib_s=N workers=N`
//!
//! # Exit Codes
//!
//! - `0`: Success (regardless of match count)
//! - `1`: I/O error opening or mapping the pool file
//! - `2`: Invalid arguments or configuration error

use memmap2::Mmap;
use poolscan::{scan, MatchPlan, PoolView, ScanConfig, StdoutSink, TargetTuple};
use std::env;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

fn print_usage(exe: &std::ffi::OsStr) {
    eprintln!(
        "usage: {} [OPTIONS] <file> <number>...

Scans <file> for records whose trailing numbers match the target
(1 to 6 numbers, each 0..=49), in any order.

OPTIONS:
    --workers=<N>       Number of scan threads (default: auto-detect CPU count)
    --min-match=<N>     Report records sharing at least N numbers with the
                        target (default: exact match of all numbers)
    --help, -h          Show this help message",
        exe.to_string_lossy()
    );
}

fn main() -> io::Result<()> {
    let mut args = env::args_os();
    let exe = args.next().unwrap_or_else(|| "poolscan".into());
    let mut path: Option<PathBuf> = None;
    let mut numbers: Vec<u8> = Vec::new();
    let mut workers: Option<usize> = None;
    let mut min_match: Option<u32> = None;

    for arg in args {
        if let Some(flag) = arg.to_str() {
            if let Some(value) = flag.strip_prefix("--workers=") {
                let n: usize = value.parse().unwrap_or_else(|_| {
                    eprintln!("invalid --workers value: {}", value);
                    std::process::exit(2);
                });
                if n == 0 {
                    eprintln!("--workers must be >= 1");
                    std::process::exit(2);
                }
                workers = Some(n);
                continue;
            }
            if let Some(value) = flag.strip_prefix("--min-match=") {
                min_match = Some(value.parse().unwrap_or_else(|_| {
                    eprintln!("invalid --min-match value: {}", value);
                    std::process::exit(2);
                }));
                continue;
            }
            match flag {
                "--help" | "-h" => {
                    print_usage(&exe);
                    std::process::exit(0);
                }
                _ if flag.starts_with("--") => {
                    eprintln!("unknown flag: {}", flag);
                    print_usage(&exe);
                    std::process::exit(2);
                }
                _ => {}
            }
            if path.is_none() {
                path = Some(PathBuf::from(flag));
                continue;
            }
            let value: u8 = flag.parse().unwrap_or_else(|_| {
                eprintln!("invalid number: {}", flag);
                std::process::exit(2);
            });
            numbers.push(value);
            continue;
        }
        if path.is_none() {
            path = Some(PathBuf::from(arg));
            continue;
        }
        eprintln!("invalid number: {}", arg.to_string_lossy());
        std::process::exit(2);
    }

    let Some(path) = path else {
        print_usage(&exe);
        std::process::exit(2);
    };

    let target = TargetTuple::new(numbers).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(2);
    });
    let plan = match min_match {
        Some(threshold) => MatchPlan::at_least(&target, threshold),
        None => MatchPlan::exact(&target),
    }
    .unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(2);
    });

    let workers = workers.unwrap_or_else(|| num_cpus::get().max(1));
    let config = ScanConfig {
        workers,
        ..ScanConfig::default()
    };

    let start = Instant::now();
    let file = File::open(&path)?;
    let file_len = file.metadata()?.len();
    let view = if file_len == 0 {
        PoolView::from_vec(Vec::new())
    } else {
        // Safety: the pool is opened read-only and treated as immutable for
        // the whole run; external modification during the scan is outside
        // the contract, as for any mapped input.
        let map = unsafe { Mmap::map(&file)? };
        PoolView::from_mmap(map)
    };

    let sink = StdoutSink::new();
    let report = scan(&view, &plan, &config, &sink);

    let elapsed = start.elapsed();
    let elapsed_secs = elapsed.as_secs_f64();
    let throughput_mib = if elapsed_secs > 0.0 {
        (report.file_bytes as f64 / (1024.0 * 1024.0)) / elapsed_secs
    } else {
        0.0
    };
    eprintln!(
        "file_bytes={} regions={} boundaries={} matches={} elapsed_ms={} throughput_mib_s={:.2} workers={}",
        report.file_bytes,
        report.regions,
        report.boundaries_tested,
        report.matches_emitted,
        elapsed.as_millis(),
        throughput_mib,
        workers
    );

    Ok(())
}
