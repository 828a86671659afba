use clap::{Parser, ValueEnum};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use broadcast_domains::adjacencies::{BroadcastL3Adjacencies, L3Adjacencies};
use broadcast_domains::config_loader;
use broadcast_domains::domain::BroadcastDomainComputer;
use broadcast_domains::report::{self, DomainReport};
use broadcast_domains::topology::NodeInterfacePair;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Partition a network snapshot's IP interfaces into broadcast domains
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the snapshot YAML file
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Check whether two interfaces share a broadcast domain
    #[arg(long, num_args = 2, value_names = ["HOST:IFACE", "HOST:IFACE"])]
    check: Option<Vec<NodeInterfacePair>>,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Snapshot file: {:?}", args.snapshot);

    let snapshot = config_loader::load_snapshot(&args.snapshot)?;
    let computer = BroadcastDomainComputer::from_snapshot(&snapshot)
        .wrap_err("Failed to build topology from snapshot")?;
    let adjacencies = BroadcastL3Adjacencies::compute(&computer);

    let report = DomainReport::new(
        &args.snapshot.display().to_string(),
        computer.topology(),
        adjacencies.assignment(),
    );

    match (&args.output, args.format) {
        (Some(path), Format::Json) => report::generate_json_report(&report, path)?,
        (Some(path), Format::Text) => {
            report::generate_text_report(&report, path)?;
            report::print_summary(&report);
        }
        (None, Format::Json) => println!("{}", report::render_json(&report)?),
        (None, Format::Text) => println!("{}", report::render_text(&report)),
    }

    if let Some(pair) = &args.check {
        if let [a, b] = pair.as_slice() {
            let same = adjacencies
                .in_same_broadcast_domain(a, b)
                .wrap_err("Broadcast domain query failed")?;
            println!("{} and {} in same broadcast domain: {}", a, b, same);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["broadcast-domains", "--snapshot", "snap.yaml"]);

        assert_eq!(args.snapshot, PathBuf::from("snap.yaml"));
        assert_eq!(args.format, Format::Text);
        assert!(args.output.is_none());
        assert!(args.check.is_none());
    }

    #[test]
    fn test_check_args() {
        let args = Args::parse_from([
            "broadcast-domains",
            "--snapshot",
            "snap.yaml",
            "--format",
            "json",
            "--check",
            "r1:eth0",
            "r2:ge-0/0/0",
        ]);

        assert_eq!(args.format, Format::Json);
        assert_eq!(
            args.check,
            Some(vec![
                NodeInterfacePair::new("r1", "eth0"),
                NodeInterfacePair::new("r2", "ge-0/0/0"),
            ])
        );
    }

    #[test]
    fn test_check_rejects_malformed_interface() {
        let result = Args::try_parse_from([
            "broadcast-domains",
            "--snapshot",
            "snap.yaml",
            "--check",
            "r1",
            "r2:eth0",
        ]);
        assert!(result.is_err());
    }
}
