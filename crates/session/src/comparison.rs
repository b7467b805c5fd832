use formats::ManifestIndex;

use crate::selection::{SelectionState, run_label};

pub const NO_DATA_FOUND: &str = "No data found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonColumn {
    pub run_id: String,
    pub heading: String,
    pub image_ref: Option<String>,
    pub caption: String,
}

/// Resolves one image per run id, sharing every other axis with `selection`.
///
/// Always returns exactly `run_ids.len()` columns; unresolved ones carry the
/// [`NO_DATA_FOUND`] placeholder.
pub fn render_all(
    index: &ManifestIndex,
    run_ids: &[String],
    selection: &SelectionState,
) -> Vec<ComparisonColumn> {
    run_ids
        .iter()
        .map(|run_id| render_column(index, run_id, selection))
        .collect()
}

pub fn render_column(
    index: &ManifestIndex,
    run_id: &str,
    selection: &SelectionState,
) -> ComparisonColumn {
    let elevation = selection.elevation.as_deref().unwrap_or_default();
    let image_ref = index.resolve_image(
        run_id,
        &selection.variable,
        elevation,
        &selection.conversion,
        selection.time_index,
    );

    let caption = match image_ref {
        Some(_) => format!(
            "Run {run_id}, {}, {}, z={elevation}, t={} hrs",
            selection.conversion,
            selection.variable,
            selection.time_index.elapsed_hours()
        ),
        None => NO_DATA_FOUND.to_string(),
    };

    ComparisonColumn {
        run_id: run_id.to_string(),
        heading: run_label(run_id),
        image_ref: image_ref.map(str::to_string),
        caption,
    }
}

/// Per-column run pickers for side-by-side comparison.
///
/// Resizing regenerates every picker at the first run id; previous choices
/// are never carried over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonGrid {
    run_ids: Vec<String>,
}

impl ComparisonGrid {
    pub fn new(index: &ManifestIndex, columns: usize) -> Self {
        let mut grid = Self {
            run_ids: Vec::new(),
        };
        grid.resize(index, columns);
        grid
    }

    /// Sets the column count (minimum 1) and resets every column.
    pub fn resize(&mut self, index: &ManifestIndex, columns: usize) {
        let default_run = index.first_run().unwrap_or_default();
        self.run_ids = vec![default_run.to_string(); columns.max(1)];
    }

    pub fn len(&self) -> usize {
        self.run_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.run_ids.is_empty()
    }

    pub fn run_ids(&self) -> &[String] {
        &self.run_ids
    }

    pub fn run_id(&self, column: usize) -> Option<&str> {
        self.run_ids.get(column).map(String::as_str)
    }

    /// Returns `false` when `column` is out of range.
    pub fn set_column_run(&mut self, column: usize, run: impl Into<String>) -> bool {
        match self.run_ids.get_mut(column) {
            Some(slot) => {
                *slot = run.into();
                true
            }
            None => false,
        }
    }

    pub fn render_all(
        &self,
        index: &ManifestIndex,
        selection: &SelectionState,
    ) -> Vec<ComparisonColumn> {
        render_all(index, &self.run_ids, selection)
    }
}
