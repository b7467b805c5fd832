use std::cmp::Ordering;

/// Parses a key made only of ASCII digits.
///
/// Unlike `str::parse`, signs and whitespace are rejected so that `"+10"` or
/// `" 10"` never pass as numeric keys.
pub fn parse_numeric_key(key: &str) -> Option<u64> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// Display order for opaque string ids that are usually numeric.
///
/// Numeric ids come first in ascending value; non-numeric ids follow in
/// lexicographic order. Ties on value (`"7"` vs `"007"`) fall back to the raw
/// string so the order is total.
pub fn cmp_numeric_ids(a: &str, b: &str) -> Ordering {
    match (parse_numeric_key(a), parse_numeric_key(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::{cmp_numeric_ids, parse_numeric_key};

    #[test]
    fn numeric_keys_only_accept_digits() {
        assert_eq!(parse_numeric_key("010"), Some(10));
        assert_eq!(parse_numeric_key("000"), Some(0));
        assert_eq!(parse_numeric_key(""), None);
        assert_eq!(parse_numeric_key("12a"), None);
        assert_eq!(parse_numeric_key("-1"), None);
        assert_eq!(parse_numeric_key("+1"), None);
    }

    #[test]
    fn ids_sort_numerically_then_lexically() {
        let mut ids = vec!["124", "99", "abc", "7", "100", "ab"];
        ids.sort_by(|a, b| cmp_numeric_ids(a, b));
        assert_eq!(ids, vec!["7", "99", "100", "124", "ab", "abc"]);
    }
}
