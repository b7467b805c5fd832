use formats::{Lookup, ManifestIndex};

use crate::selection::{SelectionState, run_label};

pub const NO_COMBINATION_CAPTION: &str = "No data for that combination.";
pub const NO_TIME_SAMPLE_CAPTION: &str = "No image at this time index.";

/// How a selection resolved. The two failure kinds stay distinct: a bad axis
/// combination versus a valid combination with sparse time coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStatus {
    Resolved,
    NoCombination,
    NoTimeSample,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleView {
    pub heading: String,
    pub image_ref: Option<String>,
    pub caption: String,
    pub status: ResolveStatus,
}

/// Resolves the full selection tuple to at most one image.
pub fn render_single_view(index: &ManifestIndex, selection: &SelectionState) -> SingleView {
    let elevation = selection.elevation.as_deref().unwrap_or_default();
    let lookup = index.lookup(
        &selection.run,
        &selection.variable,
        elevation,
        &selection.conversion,
        selection.time_index,
    );

    let (image_ref, caption, status) = match lookup {
        Lookup::Found(image_ref) => (
            Some(image_ref.to_string()),
            format!(
                "{} / {} / {} / z={} / t={} hrs",
                selection.run,
                selection.conversion,
                selection.variable,
                elevation,
                selection.time_index.elapsed_hours()
            ),
            ResolveStatus::Resolved,
        ),
        Lookup::NoCombination => (
            None,
            NO_COMBINATION_CAPTION.to_string(),
            ResolveStatus::NoCombination,
        ),
        Lookup::NoTimeSample => (
            None,
            NO_TIME_SAMPLE_CAPTION.to_string(),
            ResolveStatus::NoTimeSample,
        ),
    };

    SingleView {
        heading: run_label(&selection.run),
        image_ref,
        caption,
        status,
    }
}
