use std::cmp::Ordering;

use foundation::ids::parse_numeric_key;

/// The elevation key that always sorts first.
pub const SURFACE_ELEVATION: &str = "000";

/// Sort rank of an elevation key.
///
/// Ordering contract: `Surface` precedes every `Level`, levels ascend by
/// numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ElevationRank {
    Surface,
    Level(u64),
}

/// Returns `None` for keys that are neither `"000"` nor all-digit.
pub fn elevation_rank(key: &str) -> Option<ElevationRank> {
    if key == SURFACE_ELEVATION {
        return Some(ElevationRank::Surface);
    }
    parse_numeric_key(key).map(ElevationRank::Level)
}

/// Compares two well-formed elevation keys. Malformed keys sort last.
pub fn cmp_elevations(a: &str, b: &str) -> Ordering {
    match (elevation_rank(a), elevation_rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Elevation keys split into display order and rejected keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedElevations {
    pub ordered: Vec<String>,
    pub malformed: Vec<String>,
}

pub fn sort_elevations<'a>(keys: impl IntoIterator<Item = &'a str>) -> SortedElevations {
    let mut out = SortedElevations::default();
    for key in keys {
        if elevation_rank(key).is_some() {
            out.ordered.push(key.to_string());
        } else {
            out.malformed.push(key.to_string());
        }
    }
    out.ordered.sort_by(|a, b| cmp_elevations(a, b));
    out.malformed.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::{ElevationRank, elevation_rank, sort_elevations};
    use pretty_assertions::assert_eq;

    #[test]
    fn surface_first_then_ascending() {
        let sorted = sort_elevations(["100", "010", "000", "005", "2000"]);
        assert_eq!(sorted.ordered, vec!["000", "005", "010", "100", "2000"]);
        assert!(sorted.malformed.is_empty());
    }

    #[test]
    fn surface_outranks_every_level() {
        assert!(ElevationRank::Surface < ElevationRank::Level(0));
        assert_eq!(elevation_rank("000"), Some(ElevationRank::Surface));
        assert_eq!(elevation_rank("0"), Some(ElevationRank::Level(0)));
    }

    #[test]
    fn non_numeric_keys_are_split_out() {
        let sorted = sort_elevations(["surf", "010", "000", "1e3"]);
        assert_eq!(sorted.ordered, vec!["000", "010"]);
        assert_eq!(sorted.malformed, vec!["1e3", "surf"]);
    }

    #[test]
    fn ordering_holds_for_any_input_order() {
        let keys = ["050", "000", "001", "300", "020"];
        for rot in 0..keys.len() {
            let mut rotated = keys.to_vec();
            rotated.rotate_left(rot);
            let sorted = sort_elevations(rotated);
            assert_eq!(sorted.ordered[0], "000");
            let levels: Vec<u64> = sorted.ordered[1..]
                .iter()
                .map(|k| k.parse().expect("numeric"))
                .collect();
            assert!(levels.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
