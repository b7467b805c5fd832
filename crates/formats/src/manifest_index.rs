//! Read-only lookups over a [`ManifestDocument`].
//!
//! The index is built once at startup and never mutated, so it can be shared
//! freely (`Arc<ManifestIndex>` is `Send + Sync`).

use std::collections::BTreeSet;
use std::fmt;

use foundation::ids::cmp_numeric_ids;
use foundation::time::TimeIndex;
use serde::Serialize;
use tracing::warn;

use crate::elevation::sort_elevations;
use crate::manifest::{LeafSequence, ManifestDocument};

/// A problem in the manifest that does not prevent browsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityIssue {
    /// Elevation key that is neither `"000"` nor numeric; it is excluded from
    /// every elevation list.
    MalformedElevation {
        run: String,
        variable: String,
        elevation: String,
    },
}

impl fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataQualityIssue::MalformedElevation {
                run,
                variable,
                elevation,
            } => write!(
                f,
                "malformed elevation key {elevation:?} under run {run}, variable {variable}"
            ),
        }
    }
}

/// Outcome of resolving a full axis tuple.
///
/// `NoCombination` means a key above the leaf sequence is missing;
/// `NoTimeSample` means the leaf exists but has no reference at the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(&'a str),
    NoCombination,
    NoTimeSample,
}

impl<'a> Lookup<'a> {
    pub fn image_ref(self) -> Option<&'a str> {
        match self {
            Lookup::Found(r) => Some(r),
            Lookup::NoCombination | Lookup::NoTimeSample => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ManifestIndex {
    document: ManifestDocument,
    runs: Vec<String>,
    variables: Vec<String>,
    conversions: Vec<String>,
    max_time_steps: usize,
    issues: Vec<DataQualityIssue>,
}

impl ManifestIndex {
    pub fn new(document: ManifestDocument) -> Self {
        let mut runs: Vec<String> = document.runs.keys().cloned().collect();
        runs.sort_by(|a, b| cmp_numeric_ids(a, b));

        let mut variables = BTreeSet::new();
        let mut conversions = BTreeSet::new();
        let mut max_time_steps = 0usize;
        let mut issues = Vec::new();

        for run in &runs {
            for (variable, elevations) in &document.runs[run] {
                variables.insert(variable.clone());

                let sorted = sort_elevations(elevations.keys().map(String::as_str));
                for elevation in sorted.malformed {
                    let issue = DataQualityIssue::MalformedElevation {
                        run: run.clone(),
                        variable: variable.clone(),
                        elevation,
                    };
                    warn!("manifest data-quality issue: {issue}");
                    issues.push(issue);
                }

                for leaves in elevations.values() {
                    for (conversion, leaf) in leaves {
                        conversions.insert(conversion.clone());
                        max_time_steps = max_time_steps.max(leaf.len());
                    }
                }
            }
        }

        Self {
            document,
            runs,
            variables: variables.into_iter().collect(),
            conversions: conversions.into_iter().collect(),
            max_time_steps,
            issues,
        }
    }

    pub fn document(&self) -> &ManifestDocument {
        &self.document
    }

    /// Run ids in display order (ascending numeric).
    pub fn runs(&self) -> &[String] {
        &self.runs
    }

    pub fn first_run(&self) -> Option<&str> {
        self.runs.first().map(String::as_str)
    }

    /// Every variable id appearing under any run, sorted.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Every conversion id appearing anywhere, sorted.
    pub fn conversions(&self) -> &[String] {
        &self.conversions
    }

    /// Length of the longest leaf sequence.
    pub fn max_time_steps(&self) -> usize {
        self.max_time_steps
    }

    pub fn issues(&self) -> &[DataQualityIssue] {
        &self.issues
    }

    /// Elevations under `runs[run][variable]` that carry `conversion`,
    /// `"000"` first then ascending numeric. Malformed keys are never
    /// returned; they are reported through [`ManifestIndex::issues`].
    pub fn valid_elevations(&self, run: &str, variable: &str, conversion: &str) -> Vec<String> {
        let Some(elevations) = self
            .document
            .runs
            .get(run)
            .and_then(|vars| vars.get(variable))
        else {
            return Vec::new();
        };

        let candidates = elevations
            .iter()
            .filter(|(_, leaves)| leaves.contains_key(conversion))
            .map(|(elevation, _)| elevation.as_str());
        sort_elevations(candidates).ordered
    }

    pub fn leaf(
        &self,
        run: &str,
        variable: &str,
        elevation: &str,
        conversion: &str,
    ) -> Option<&LeafSequence> {
        self.document
            .runs
            .get(run)?
            .get(variable)?
            .get(elevation)?
            .get(conversion)
    }

    pub fn lookup(
        &self,
        run: &str,
        variable: &str,
        elevation: &str,
        conversion: &str,
        time: TimeIndex,
    ) -> Lookup<'_> {
        let Some(leaf) = self.leaf(run, variable, elevation, conversion) else {
            return Lookup::NoCombination;
        };
        match leaf.get(time.0).and_then(Option::as_deref) {
            Some(image_ref) if !image_ref.is_empty() => Lookup::Found(image_ref),
            _ => Lookup::NoTimeSample,
        }
    }

    /// Total: returns `None` for any missing key or gap, never panics.
    pub fn resolve_image(
        &self,
        run: &str,
        variable: &str,
        elevation: &str,
        conversion: &str,
        time: TimeIndex,
    ) -> Option<&str> {
        self.lookup(run, variable, elevation, conversion, time)
            .image_ref()
    }
}

impl From<ManifestDocument> for ManifestIndex {
    fn from(document: ManifestDocument) -> Self {
        Self::new(document)
    }
}

#[cfg(test)]
mod tests {
    use super::{DataQualityIssue, Lookup, ManifestIndex};
    use crate::manifest::ManifestDocument;
    use foundation::time::TimeIndex;
    use pretty_assertions::assert_eq;

    fn sample() -> ManifestIndex {
        let payload = r#"{
            "runs": {
                "124": {
                    "salt": { "000": { "mean": ["s0.png"] } }
                },
                "101": {
                    "temp": {
                        "010": { "C": ["t10a.png", "t10b.png"] },
                        "000": { "C": ["t0a.png", "t0b.png", "t0c.png"], "K": [] },
                        "005": { "K": ["k5.png"] },
                        "deep": { "C": ["bad.png"] }
                    }
                },
                "99": {}
            }
        }"#;
        ManifestIndex::new(ManifestDocument::from_json_str(payload).expect("parse"))
    }

    #[test]
    fn runs_are_numerically_ordered() {
        let index = sample();
        assert_eq!(index.runs(), ["99", "101", "124"]);
        assert_eq!(index.first_run(), Some("99"));
        assert_eq!(index.variables(), ["salt", "temp"]);
        assert_eq!(index.conversions(), ["C", "K", "mean"]);
        assert_eq!(index.max_time_steps(), 3);
    }

    #[test]
    fn valid_elevations_filter_by_conversion() {
        let index = sample();
        assert_eq!(index.valid_elevations("101", "temp", "C"), ["000", "010"]);
        assert_eq!(index.valid_elevations("101", "temp", "K"), ["000", "005"]);
        assert!(index.valid_elevations("101", "salt", "C").is_empty());
        assert!(index.valid_elevations("404", "temp", "C").is_empty());
    }

    #[test]
    fn malformed_elevations_are_flagged() {
        let index = sample();
        assert_eq!(
            index.issues(),
            [DataQualityIssue::MalformedElevation {
                run: "101".to_string(),
                variable: "temp".to_string(),
                elevation: "deep".to_string(),
            }]
        );
        assert!(
            !index
                .valid_elevations("101", "temp", "C")
                .contains(&"deep".to_string())
        );
    }

    #[test]
    fn lookup_distinguishes_missing_path_from_missing_time() {
        let index = sample();
        assert_eq!(
            index.lookup("101", "temp", "000", "C", TimeIndex(1)),
            Lookup::Found("t0b.png")
        );
        assert_eq!(
            index.lookup("101", "temp", "000", "C", TimeIndex(5)),
            Lookup::NoTimeSample
        );
        assert_eq!(
            index.lookup("101", "temp", "000", "K", TimeIndex(0)),
            Lookup::NoTimeSample
        );
        assert_eq!(
            index.lookup("101", "temp", "020", "C", TimeIndex(0)),
            Lookup::NoCombination
        );
        assert_eq!(
            index.lookup("101", "wind", "000", "C", TimeIndex(0)),
            Lookup::NoCombination
        );
    }

    #[test]
    fn resolve_image_is_total() {
        let index = sample();
        let keys = ["", "101", "temp", "000", "C", "124", "salt", "mean", "deep"];
        for run in keys {
            for variable in keys {
                for elevation in keys {
                    for conversion in keys {
                        for t in [0, 1, 2, 3, usize::MAX] {
                            let _ = index.resolve_image(
                                run,
                                variable,
                                elevation,
                                conversion,
                                TimeIndex(t),
                            );
                        }
                    }
                }
            }
        }
        assert_eq!(
            index.resolve_image("124", "salt", "000", "mean", TimeIndex(0)),
            Some("s0.png")
        );
    }

    #[test]
    fn gaps_and_empty_refs_resolve_to_no_time_sample() {
        let payload = r#"{"runs": {"1": {"v": {"000": {"c": [null, "", "x.png"]}}}}}"#;
        let index = ManifestIndex::new(ManifestDocument::from_json_str(payload).expect("parse"));
        assert_eq!(index.lookup("1", "v", "000", "c", TimeIndex(0)), Lookup::NoTimeSample);
        assert_eq!(index.lookup("1", "v", "000", "c", TimeIndex(1)), Lookup::NoTimeSample);
        assert_eq!(index.lookup("1", "v", "000", "c", TimeIndex(2)), Lookup::Found("x.png"));
    }
}
