use formats::ManifestIndex;
use foundation::time::TimeIndex;

/// Option label for a run selector.
pub fn run_label(run: &str) -> String {
    format!("Run {run}")
}

/// Option label for an elevation selector.
pub fn elevation_label(elevation: &str) -> String {
    format!("z={elevation}")
}

/// Current value of every selection axis.
///
/// `elevation` is derived: after any run, conversion or variable change it is
/// either a member of [`SelectionState::valid_elevations`] or `None` when that
/// set is empty. Setters never fail; combinations that do not exist simply
/// resolve to nothing downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub run: String,
    pub conversion: String,
    pub variable: String,
    pub elevation: Option<String>,
    pub time_index: TimeIndex,
    valid_elevations: Vec<String>,
}

impl SelectionState {
    /// Starts from the first run, first variable and first conversion known
    /// to the index.
    pub fn initial(index: &ManifestIndex) -> Self {
        let mut state = Self {
            run: index.first_run().unwrap_or_default().to_string(),
            conversion: index.conversions().first().cloned().unwrap_or_default(),
            variable: index.variables().first().cloned().unwrap_or_default(),
            elevation: None,
            time_index: TimeIndex::FIRST,
            valid_elevations: Vec::new(),
        };
        state.rederive_elevation(index);
        state
    }

    pub fn set_run(&mut self, index: &ManifestIndex, run: impl Into<String>) {
        self.run = run.into();
        self.rederive_elevation(index);
    }

    pub fn set_conversion(&mut self, index: &ManifestIndex, conversion: impl Into<String>) {
        self.conversion = conversion.into();
        self.rederive_elevation(index);
    }

    pub fn set_variable(&mut self, index: &ManifestIndex, variable: impl Into<String>) {
        self.variable = variable.into();
        self.rederive_elevation(index);
    }

    /// Direct assignment. Callers should only offer values from
    /// [`SelectionState::valid_elevations`].
    pub fn set_elevation(&mut self, elevation: impl Into<String>) {
        self.elevation = Some(elevation.into());
    }

    pub fn set_time_index(&mut self, time_index: TimeIndex) {
        self.time_index = time_index;
    }

    pub fn valid_elevations(&self) -> &[String] {
        &self.valid_elevations
    }

    pub fn time_label(&self) -> String {
        self.time_index.label()
    }

    /// Recomputes the valid elevation set and repairs `elevation`.
    ///
    /// Keeps the current elevation when it is still valid, otherwise selects
    /// the first valid one (or none). Returns `true` if `elevation` changed.
    /// Idempotent: a second call without an axis change returns `false`.
    pub fn rederive_elevation(&mut self, index: &ManifestIndex) -> bool {
        self.valid_elevations = index.valid_elevations(&self.run, &self.variable, &self.conversion);

        let still_valid = self
            .elevation
            .as_ref()
            .is_some_and(|e| self.valid_elevations.contains(e));
        if still_valid {
            return false;
        }

        let next = self.valid_elevations.first().cloned();
        let changed = next != self.elevation;
        self.elevation = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::{SelectionState, elevation_label, run_label};
    use crate::fixtures;
    use foundation::time::TimeIndex;
    use pretty_assertions::assert_eq;

    #[test]
    fn initial_state_uses_first_run() {
        let index = fixtures::manifest();
        let state = SelectionState::initial(&index);
        assert_eq!(state.run, "101");
        assert_eq!(state.conversion, "C");
        assert_eq!(state.variable, "salt");
        assert_eq!(state.elevation, None);
        assert!(state.valid_elevations().is_empty());
        assert_eq!(state.time_index, TimeIndex(0));
    }

    #[test]
    fn changing_axes_offers_matching_elevations() {
        let index = fixtures::manifest();
        let mut state = SelectionState::initial(&index);
        state.set_run(&index, "101");
        state.set_variable(&index, "temp");
        state.set_conversion(&index, "C");
        assert_eq!(state.valid_elevations(), ["000", "010"]);
        assert_eq!(state.elevation.as_deref(), Some("000"));
    }

    #[test]
    fn still_valid_elevation_is_kept() {
        let index = fixtures::manifest();
        let mut state = SelectionState::initial(&index);
        state.set_variable(&index, "temp");
        state.set_elevation("010");

        // "010" does not carry K; falls back to the first valid value.
        state.set_conversion(&index, "K");
        assert_eq!(state.valid_elevations(), ["000", "005"]);
        assert_eq!(state.elevation.as_deref(), Some("000"));

        state.set_elevation("005");
        state.set_run(&index, "101");
        assert_eq!(state.elevation.as_deref(), Some("005"));
    }

    #[test]
    fn rederivation_is_idempotent() {
        let index = fixtures::manifest();
        for run in ["101", "124", "999"] {
            for variable in ["temp", "salt", "wind"] {
                for conversion in ["C", "K", "X"] {
                    let mut state = SelectionState::initial(&index);
                    state.set_run(&index, run);
                    state.set_variable(&index, variable);
                    state.set_conversion(&index, conversion);
                    let first = state.clone();
                    assert!(!state.rederive_elevation(&index));
                    assert_eq!(state, first);
                }
            }
        }
    }

    #[test]
    fn elevation_is_always_valid_after_axis_change() {
        let index = fixtures::manifest();
        let mut state = SelectionState::initial(&index);
        state.set_elevation("bogus");
        state.set_variable(&index, "temp");
        let e = state.elevation.clone().expect("temp has elevations");
        assert!(state.valid_elevations().contains(&e));

        state.set_variable(&index, "wind");
        assert_eq!(state.elevation, None);
    }

    #[test]
    fn labels() {
        let index = fixtures::manifest();
        let mut state = SelectionState::initial(&index);
        state.set_time_index(TimeIndex::from_ui_step(3));
        assert_eq!(state.time_label(), "48 hrs");
        assert_eq!(run_label("124"), "Run 124");
        assert_eq!(elevation_label("010"), "z=010");
    }
}
