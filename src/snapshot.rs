//! Dashboard data as exported by the upstream data providers

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::governance::ProposalTiming;
use crate::migration::MigrationPosition;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("could not read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalEntry {
    pub id: u64,
    pub title: String,
    #[serde(flatten)]
    pub timing: ProposalTiming,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub proposals: Vec<ProposalEntry>,
    #[serde(default)]
    pub migration: Vec<MigrationPosition>,
}

impl DashboardSnapshot {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub async fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SnapshotError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let snapshot = Self::from_json(&content).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            proposals = snapshot.proposals.len(),
            positions = snapshot.migration.len(),
            "loaded snapshot from {}",
            path.display()
        );
        Ok(snapshot)
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty() && self.migration.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::ProposalState;
    use crate::migration::{BorrowRateMode, MigrationDisabled};

    const DEMO: &str = include_str!("../demos/dashboard.json");

    #[test]
    fn test_demo_snapshot_parses() {
        let snapshot = DashboardSnapshot::from_json(DEMO).expect("demo snapshot should parse");
        assert!(!snapshot.proposals.is_empty());
        assert!(!snapshot.migration.is_empty());
        assert!(snapshot
            .proposals
            .iter()
            .any(|p| p.timing.state == ProposalState::Active));
        assert!(snapshot
            .migration
            .iter()
            .any(|p| p.borrow_rate_mode == Some(BorrowRateMode::Stable)));
        assert!(snapshot
            .migration
            .iter()
            .any(|p| p.disabled == Some(MigrationDisabled::V3AssetMissing)));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let snapshot = DashboardSnapshot::from_json("{}").unwrap();
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = DashboardSnapshot::load(&path).await.unwrap_err();
        assert!(matches!(err, SnapshotError::Parse { .. }), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DashboardSnapshot::load(&dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, SnapshotError::Read { .. }));
        assert!(err.to_string().contains("absent.json"));
    }
}
