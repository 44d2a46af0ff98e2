//! JSON reporter
//!
//! Outputs the full MetaSnapshot as pretty-printed JSON. The same document
//! deserializes back into a snapshot, so saved runs can be reloaded.

use super::{report_file_name, OutputFormat};
use crate::models::MetaSnapshot;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Render snapshot as JSON
pub fn render(snapshot: &MetaSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Write `{expansion}_{format}_{YYYYMMDD}_meta.json` into `dir`
pub fn write_snapshot(snapshot: &MetaSnapshot, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(report_file_name(snapshot, OutputFormat::Json));
    std::fs::write(&path, render(snapshot)?)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
    info!("Snapshot saved to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_snapshot;

    #[test]
    fn test_json_render_valid() {
        let snapshot = test_snapshot();
        let json_str = render(&snapshot).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["expansion"], "FDN");
        assert_eq!(parsed["total_games_analyzed"], 1_234_567);
        assert_eq!(parsed["sleeper_cards"][0]["irregularity"], "sleeper");
        assert_eq!(parsed["no_data_cards"][0]["grade"], "N/A");
        assert!(parsed["no_data_cards"][0]["stats"]["gih_wr"].is_null());
    }

    #[test]
    fn test_json_reloads_snapshot() {
        let snapshot = test_snapshot();
        let json_str = render(&snapshot).expect("render JSON");
        let reloaded: MetaSnapshot = serde_json::from_str(&json_str).expect("reload snapshot");
        assert_eq!(reloaded.expansion, snapshot.expansion);
        assert_eq!(reloaded.timestamp, snapshot.timestamp);
        assert_eq!(reloaded.all_cards.len(), snapshot.all_cards.len());
        assert_eq!(reloaded.trap_cards[0].name(), "Shiny <Bait>");
        assert_eq!(reloaded.llm, snapshot.llm);
    }

    #[test]
    fn test_write_snapshot_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_snapshot(&test_snapshot(), dir.path()).unwrap();
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("FDN_PremierDraft_20260314_meta.json")
        );
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"format\": \"PremierDraft\""));
    }
}
