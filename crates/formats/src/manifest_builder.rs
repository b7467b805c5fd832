//! Builds a [`ManifestDocument`] by walking a figure directory tree.
//!
//! Expected layout:
//!
//! ```text
//! <root>/Run<id>/figs/mean/**/<folder>/<var>_<...>_z<NNN>_t_<NNN>.png
//! ```
//!
//! where `<folder>` selects the conversion (see [`default_conversion_folders`]).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::manifest::ManifestDocument;

pub const RUN_DIR_PREFIX: &str = "Run";

/// Suffixes stripped from the raw variable name, longest first.
const VARIABLE_SUFFIXES: [&str; 3] = ["_mean_diff_ext", "_mean_diff", "_mean"];

/// `_zNNN_t_NNN`
const FIGURE_TAIL_LEN: usize = 11;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Figure folder name → conversion id.
pub fn default_conversion_folders() -> BTreeMap<String, String> {
    [
        ("2D_Fields", "mean"),
        ("Diff", "mean_diff"),
        ("Diff_ext", "mean_diff_ext"),
    ]
    .into_iter()
    .map(|(folder, conversion)| (folder.to_string(), conversion.to_string()))
    .collect()
}

/// Axis values parsed from a figure file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureName {
    pub variable: String,
    pub elevation: String,
    /// 1-based, as written in the file name.
    pub time_step: u32,
}

/// Parses `<var>_<anything>_z<NNN>_t_<NNN>.png`.
///
/// The variable does not have to start the name: it is taken from the first
/// run of word characters that contains an underscore after its first
/// character, up to that run's last underscore. It is then normalised with
/// [`normalize_variable`].
pub fn parse_figure_name(file_name: &str) -> Option<FigureName> {
    let stem = file_name.strip_suffix(".png")?;
    if stem.len() < FIGURE_TAIL_LEN || !stem.is_char_boundary(stem.len() - FIGURE_TAIL_LEN) {
        return None;
    }
    let (prefix, tail) = stem.split_at(stem.len() - FIGURE_TAIL_LEN);

    let tail = tail.as_bytes();
    let digits = |range: std::ops::Range<usize>| tail[range].iter().all(u8::is_ascii_digit);
    if !(tail[0] == b'_'
        && tail[1] == b'z'
        && digits(2..5)
        && &tail[5..8] == b"_t_"
        && digits(8..11))
    {
        return None;
    }
    let elevation = std::str::from_utf8(&tail[2..5]).ok()?.to_string();
    let time_step = std::str::from_utf8(&tail[8..11]).ok()?.parse().ok()?;

    let (start, split) = variable_span(prefix)?;

    Some(FigureName {
        variable: normalize_variable(&prefix[start..split]),
        elevation,
        time_step,
    })
}

/// Byte range of the raw variable inside `prefix`.
fn variable_span(prefix: &str) -> Option<(usize, usize)> {
    let mut run_start = None;
    let mut span = None;
    for (i, c) in prefix.char_indices() {
        if c.is_alphanumeric() || c == '_' {
            let start = *run_start.get_or_insert(i);
            if c == '_' && i > start {
                span = Some((start, i));
            }
        } else if span.is_some() {
            break;
        } else {
            run_start = None;
        }
    }
    span
}

/// Strips a trailing `_mean`, `_mean_diff` or `_mean_diff_ext` and renames
/// `total_vel` to `vel`.
pub fn normalize_variable(raw: &str) -> String {
    let stripped = VARIABLE_SUFFIXES
        .iter()
        .find_map(|suffix| raw.strip_suffix(suffix))
        .unwrap_or(raw);
    match stripped {
        "total_vel" => "vel".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NameMismatch,
    ZeroTimeStep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub manifest: ManifestDocument,
    pub images: usize,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    root: PathBuf,
    relative_to: Option<PathBuf>,
    conversion_folders: BTreeMap<String, String>,
}

impl ManifestBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            relative_to: None,
            conversion_folders: default_conversion_folders(),
        }
    }

    /// Image references are written relative to `base`. Without a base they
    /// are the walked paths as-is (relative when `root` is relative).
    pub fn relative_to(mut self, base: impl Into<PathBuf>) -> Self {
        self.relative_to = Some(base.into());
        self
    }

    pub fn conversion_folders(mut self, folders: BTreeMap<String, String>) -> Self {
        self.conversion_folders = folders;
        self
    }

    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let mut report = BuildReport::default();

        for (run_id, run_dir) in self.run_dirs()? {
            report.manifest.runs.entry(run_id.clone()).or_default();

            let figs = run_dir.join("figs").join("mean");
            if !figs.is_dir() {
                debug!("run {run_id}: no figs/mean directory");
                continue;
            }

            for entry in WalkDir::new(&figs).sort_by_file_name() {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                let Some(conversion) = self.conversion_for(path) else {
                    continue;
                };
                let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
                    continue;
                };
                if !file_name.ends_with(".png") {
                    continue;
                }

                let Some(figure) = parse_figure_name(file_name) else {
                    report.skipped.push(SkippedFile {
                        path: path.to_path_buf(),
                        reason: SkipReason::NameMismatch,
                    });
                    continue;
                };
                if figure.time_step == 0 {
                    warn!("skipping {}: time step 000", path.display());
                    report.skipped.push(SkippedFile {
                        path: path.to_path_buf(),
                        reason: SkipReason::ZeroTimeStep,
                    });
                    continue;
                }

                report.manifest.insert(
                    &run_id,
                    &figure.variable,
                    &figure.elevation,
                    conversion,
                    figure.time_step as usize - 1,
                    self.image_ref(path),
                );
                report.images += 1;
            }
        }

        info!(
            "manifest built: {} runs, {} images, {} skipped",
            report.manifest.runs.len(),
            report.images,
            report.skipped.len()
        );
        Ok(report)
    }

    fn run_dirs(&self) -> Result<Vec<(String, PathBuf)>, BuildError> {
        let entries = fs::read_dir(&self.root).map_err(|source| BuildError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut runs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| BuildError::Io {
                path: self.root.clone(),
                source,
            })?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !name.starts_with(RUN_DIR_PREFIX) {
                continue;
            }
            let run_id = name.replacen(RUN_DIR_PREFIX, "", 1);
            runs.push((run_id, entry.path()));
        }
        runs.sort();
        Ok(runs)
    }

    fn conversion_for(&self, file: &Path) -> Option<&str> {
        let folder = file.parent()?.file_name()?.to_str()?;
        self.conversion_folders.get(folder).map(String::as_str)
    }

    fn image_ref(&self, path: &Path) -> String {
        let rel = self
            .relative_to
            .as_deref()
            .and_then(|base| path.strip_prefix(base).ok())
            .unwrap_or(path);
        rel.components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                Component::ParentDir => Some("..".to_string()),
                Component::RootDir => Some(String::new()),
                Component::CurDir | Component::Prefix(_) => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}
