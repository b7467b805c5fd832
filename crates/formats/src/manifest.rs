use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Ordered image references for one (run, variable, elevation, conversion)
/// path, indexed by 0-based time step. `None` marks a gap.
pub type LeafSequence = Vec<Option<String>>;

/// conversion-id → leaf sequence
pub type ElevationEntry = BTreeMap<String, LeafSequence>;
/// elevation-id → conversions
pub type VariableEntry = BTreeMap<String, ElevationEntry>;
/// variable-id → elevations
pub type RunEntry = BTreeMap<String, VariableEntry>;

/// The addressing document for the image dataset:
/// `runs[run][variable][elevation][conversion][t]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestDocument {
    pub runs: BTreeMap<String, RunEntry>,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ManifestDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let payload = fs::read_to_string(path)?;
        Self::from_json_str(&payload)
    }

    /// Parses a manifest. The `runs` key must be present; nothing below it is
    /// validated here.
    pub fn from_json_str(payload: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ManifestError> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Stores `image_ref` at `time_index`, padding the leaf with gaps.
    pub fn insert(
        &mut self,
        run: &str,
        variable: &str,
        elevation: &str,
        conversion: &str,
        time_index: usize,
        image_ref: impl Into<String>,
    ) {
        let leaf = self
            .runs
            .entry(run.to_string())
            .or_default()
            .entry(variable.to_string())
            .or_default()
            .entry(elevation.to_string())
            .or_default()
            .entry(conversion.to_string())
            .or_default();
        if leaf.len() <= time_index {
            leaf.resize(time_index + 1, None);
        }
        leaf[time_index] = Some(image_ref.into());
    }

    /// Number of non-gap image references.
    pub fn image_count(&self) -> usize {
        self.runs
            .values()
            .flat_map(|vars| vars.values())
            .flat_map(|elevs| elevs.values())
            .flat_map(|convs| convs.values())
            .map(|leaf| leaf.iter().filter(|r| r.is_some()).count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{ManifestDocument, ManifestError};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_nested_runs_with_gaps() {
        let payload = r#"{
            "runs": {
                "101": { "temp": { "000": { "C": ["a.png", null, "c.png"] } } }
            }
        }"#;
        let doc = ManifestDocument::from_json_str(payload).expect("parse");
        let leaf = &doc.runs["101"]["temp"]["000"]["C"];
        assert_eq!(
            leaf,
            &vec![Some("a.png".to_string()), None, Some("c.png".to_string())]
        );
        assert_eq!(doc.image_count(), 2);
    }

    #[test]
    fn missing_runs_key_is_a_parse_error() {
        let err = ManifestDocument::from_json_str(r#"{"other": {}}"#).expect_err("must fail");
        assert!(matches!(err, ManifestError::Parse(_)));
    }

    #[test]
    fn insert_pads_leaf_with_gaps() {
        let mut doc = ManifestDocument::new();
        doc.insert("124", "salt", "010", "mean", 2, "figs/salt_t_003.png");
        let leaf = &doc.runs["124"]["salt"]["010"]["mean"];
        assert_eq!(
            leaf,
            &vec![None, None, Some("figs/salt_t_003.png".to_string())]
        );
    }

    #[test]
    fn save_and_load_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(super::MANIFEST_FILE_NAME);

        let mut doc = ManifestDocument::new();
        doc.insert("7", "vel", "000", "mean_diff", 0, "a.png");
        doc.save(&path).expect("save");

        let loaded = ManifestDocument::load(&path).expect("load");
        assert_eq!(loaded, doc);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ManifestDocument::load(dir.path().join("nope.json")).expect_err("must fail");
        assert!(matches!(err, ManifestError::Io(_)));
    }
}
