use anyhow::Result;
use clap::Parser;
use hookscan::config::Config;
use hookscan::maps::maps_path_for_pid;
use hookscan::{DetectionReport, MapsScanner};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hookscan", version)]
#[command(about = "Detect a hooking framework mapped into a process")]
#[command(long_about = r#"
Scans a memory-mapping listing (/proc/self/maps by default) for the file
names a hooking framework maps into the processes it instruments.

Exits with status 1 when the framework is detected, 0 otherwise. A listing
that cannot be read counts as not detected.
"#)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scan /proc/<PID>/maps instead of this process
    #[arg(short, long, conflicts_with = "maps")]
    pid: Option<u32>,

    /// Scan a saved mapping listing
    #[arg(short, long)]
    maps: Option<PathBuf>,

    /// Artifact name to look for (repeatable, replaces configured names)
    #[arg(short = 's', long = "signature")]
    signatures: Vec<String>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Output logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if args.log_json {
        subscriber.json().init();
    } else {
        subscriber.with_target(false).init();
    }

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(pid) = args.pid {
        config.scanner.maps_path = maps_path_for_pid(pid);
    }
    if let Some(maps) = args.maps {
        config.scanner.maps_path = maps;
    }
    if !args.signatures.is_empty() {
        config.scanner.signatures = args.signatures;
    }
    config.scanner.validate()?;

    let scanner = MapsScanner::new(config.scanner);
    info!(
        maps = %scanner.maps_path().display(),
        signatures = scanner.signatures().len(),
        "Scanning mapping listing"
    );

    let report = scanner.report();
    if let Some(error) = &report.error {
        warn!(error = %error, "Mapping listing unavailable, reporting not detected");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(if report.detected {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn print_report(report: &DetectionReport) {
    match &report.detection {
        Some(detection) => println!(
            "Hooking framework detected: {} (line {}: {})",
            detection.signature,
            detection.line_number,
            detection.pathname()
        ),
        None => println!("No hooking framework detected"),
    }
}
