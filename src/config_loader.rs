use crate::config::Snapshot;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{info, warn};
use std::fs::File;
use std::path::Path;

/// Load, parse and validate a snapshot from a YAML file
pub fn load_snapshot(snapshot_path: &Path) -> Result<Snapshot> {
    info!("Loading snapshot from: {:?}", snapshot_path);

    let file = File::open(snapshot_path)
        .wrap_err_with(|| format!("Failed to open snapshot {}", snapshot_path.display()))?;

    let snapshot: Snapshot = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse snapshot {}", snapshot_path.display()))?;

    snapshot.validate()?;

    info!(
        "Loaded {} devices with {} interfaces, {} layer-1 edges, {} VXLAN edges",
        snapshot.devices.len(),
        snapshot.interface_count(),
        snapshot.layer1_edges.len(),
        snapshot.vxlan_edges.len()
    );
    if snapshot.layer1_edges.is_empty() {
        warn!("No layer-1 topology in snapshot; all physical interfaces share one global hub");
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_snapshot() {
        let yaml = r#"
devices:
  - hostname: r1
    interfaces:
      - name: eth0
        type: physical
        addresses: ["10.0.0.1/24"]
layer1_edges:
  - [{ hostname: r1, interface: eth0 }, { hostname: r2, interface: eth0 }]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let snapshot = load_snapshot(temp_file.path()).unwrap();
        assert_eq!(snapshot.devices.len(), 1);
        assert_eq!(snapshot.layer1_edges.len(), 1);
        assert!(snapshot.vxlan_edges.is_empty());
    }

    #[test]
    fn test_load_invalid_snapshot() {
        let yaml = r#"
devices:
  - hostname: r1
  - hostname: r1
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let err = load_snapshot(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("Duplicate device hostname 'r1'"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_snapshot(Path::new("/nonexistent/snapshot.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to open snapshot"));
    }
}
