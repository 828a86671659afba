//! Report generation for broadcast domain results.
//!
//! Generates both JSON and human-readable text reports.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use serde::Serialize;

use crate::domain::{DomainAssignment, DomainId, FloodStats};
use crate::topology::Topology;

/// Size of the snapshot the domains were computed from.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub snapshot: String,
    pub devices: usize,
    pub physical_interfaces: usize,
    pub ip_interfaces: usize,
    pub hubs: usize,
    pub vxlan_segments: usize,
    pub broadcast_domains: usize,
}

/// One broadcast domain and the flood that found it.
#[derive(Debug, Clone, Serialize)]
pub struct DomainEntry {
    pub id: DomainId,
    pub members: Vec<String>,
    pub flood: FloodStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct DomainReport {
    pub metadata: ReportMetadata,
    pub domains: Vec<DomainEntry>,
}

impl DomainReport {
    pub fn new(snapshot: &str, topology: &Topology, assignment: &DomainAssignment) -> Self {
        let domains: Vec<DomainEntry> = assignment
            .domains()
            .into_iter()
            .map(|(id, members)| DomainEntry {
                id,
                members: members.iter().map(|m| m.to_string()).collect(),
                flood: assignment.flood_stats(id).copied().unwrap_or_default(),
            })
            .collect();

        Self {
            metadata: ReportMetadata {
                snapshot: snapshot.to_string(),
                devices: topology.fabrics().count(),
                physical_interfaces: topology.physical_interfaces().count(),
                ip_interfaces: topology.ip_interface_count(),
                hubs: topology.hubs().count(),
                vxlan_segments: topology.vni_hubs().count(),
                broadcast_domains: domains.len(),
            },
            domains,
        }
    }
}

pub fn render_json(report: &DomainReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
}

pub fn render_text(report: &DomainReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("=".repeat(80));
    lines.push("                          BROADCAST DOMAINS".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    let meta = &report.metadata;
    lines.push(format!("Snapshot: {}", meta.snapshot));
    lines.push(format!("Devices: {}", meta.devices));
    lines.push(format!("Physical Interfaces: {}", meta.physical_interfaces));
    lines.push(format!("IP Interfaces: {}", meta.ip_interfaces));
    lines.push(format!("Hubs: {}", meta.hubs));
    lines.push(format!("VXLAN Segments: {}", meta.vxlan_segments));
    lines.push(format!("Broadcast Domains: {}", meta.broadcast_domains));
    lines.push(String::new());

    for domain in &report.domains {
        lines.push("-".repeat(80));
        lines.push(format!(
            "Domain {} ({} interfaces, {} flood steps)",
            domain.id,
            domain.members.len(),
            domain.flood.steps
        ));
        for member in &domain.members {
            lines.push(format!("  {}", member));
        }
    }
    lines.push("=".repeat(80));

    lines.join("\n")
}

/// Generate JSON report
pub fn generate_json_report(report: &DomainReport, output_path: &Path) -> Result<()> {
    let json = render_json(report)?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

/// Generate human-readable text report
pub fn generate_text_report(report: &DomainReport, output_path: &Path) -> Result<()> {
    fs::write(output_path, render_text(report))
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}

/// Print a summary to stdout
pub fn print_summary(report: &DomainReport) {
    println!("\n=== BROADCAST DOMAIN SUMMARY ===\n");
    println!("IP interfaces: {}", report.metadata.ip_interfaces);
    println!("Broadcast domains: {}", report.metadata.broadcast_domains);
    if let Some(largest) = report.domains.iter().max_by_key(|d| d.members.len()) {
        println!(
            "Largest domain: {} ({} interfaces)",
            largest.id,
            largest.members.len()
        );
    }
    println!();
}
