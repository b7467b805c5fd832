/// Fixed sampling cadence between consecutive time steps, in hours.
pub const HOURS_PER_STEP: u64 = 24;

/// 0-based index into a leaf sequence of image references.
///
/// The UI exposes 1-based steps; use [`TimeIndex::from_ui_step`] and
/// [`TimeIndex::ui_step`] at that boundary.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeIndex(pub usize);

impl TimeIndex {
    pub const FIRST: TimeIndex = TimeIndex(0);

    /// Converts a 1-based UI step. Step 0 saturates to the first index.
    pub fn from_ui_step(step: usize) -> Self {
        TimeIndex(step.saturating_sub(1))
    }

    pub fn ui_step(self) -> usize {
        self.0.saturating_add(1)
    }

    /// Elapsed lead time for this index, saturating at `u64::MAX`.
    pub fn elapsed_hours(self) -> u64 {
        (self.0 as u64).saturating_mul(HOURS_PER_STEP)
    }

    /// Slider label, e.g. `"48 hrs"`.
    pub fn label(self) -> String {
        format!("{} hrs", self.elapsed_hours())
    }
}

#[cfg(test)]
mod tests {
    use super::TimeIndex;

    #[test]
    fn ui_steps_are_one_based() {
        assert_eq!(TimeIndex::from_ui_step(1), TimeIndex(0));
        assert_eq!(TimeIndex::from_ui_step(2), TimeIndex(1));
        assert_eq!(TimeIndex::from_ui_step(0), TimeIndex(0));
        assert_eq!(TimeIndex(4).ui_step(), 5);
    }

    #[test]
    fn label_uses_24_hour_cadence() {
        assert_eq!(TimeIndex(0).label(), "0 hrs");
        assert_eq!(TimeIndex(1).label(), "24 hrs");
        assert_eq!(TimeIndex(7).elapsed_hours(), 168);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn huge_indices_saturate() {
        assert_eq!(TimeIndex(usize::MAX).ui_step(), usize::MAX);
        assert_eq!(TimeIndex(1 << 60).elapsed_hours(), u64::MAX);
        assert_eq!(TimeIndex(usize::MAX).label(), format!("{} hrs", u64::MAX));
    }
}
