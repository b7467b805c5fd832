/// Closed scalar interval used for clamping continuous state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds1 {
    pub min: f64,
    pub max: f64,
}

impl Bounds1 {
    pub const fn new(min: f64, max: f64) -> Self {
        Bounds1 { min, max }
    }

    /// Clamps `v` into `[min, max]`. NaN maps to `min`.
    pub fn clamp(&self, v: f64) -> f64 {
        if v.is_nan() {
            return self.min;
        }
        v.max(self.min).min(self.max)
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::Bounds1;

    #[test]
    fn clamps_without_wrapping() {
        let b = Bounds1::new(0.2, 5.0);
        assert_eq!(b.clamp(7.0), 5.0);
        assert_eq!(b.clamp(0.0), 0.2);
        assert_eq!(b.clamp(1.3), 1.3);
        assert_eq!(b.clamp(f64::NAN), 0.2);
        assert!(b.contains(5.0));
        assert!(!b.contains(5.01));
    }
}
