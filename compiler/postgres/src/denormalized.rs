use std::collections::BTreeSet;

use nestql::casing::flattened_name;

/// The physical column a nested filter path has been flattened into, if the table has one.
///
/// `["location", "ltreePath"]` looks for exactly `location__ltree_path`. The match is
/// case-sensitive and whole-name only; an empty path or column set never resolves.
pub fn resolve_denormalized<'a, S: AsRef<str>>(path: &[S], columns: &'a BTreeSet<String>) -> Option<&'a str> {
    if path.is_empty() || columns.is_empty() || path.iter().any(|segment| segment.as_ref().is_empty()) {
        return None;
    }
    columns.get(&flattened_name(path)).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> BTreeSet<String> { names.iter().map(|s| s.to_string()).collect() }

    #[test]
    fn test_resolves_exact_match() {
        let cols = columns(&["location__ltree_path"]);
        assert_eq!(resolve_denormalized(&["location", "ltreePath"], &cols), Some("location__ltree_path"));
        assert_eq!(resolve_denormalized(&["location", "ltreePath"], &BTreeSet::new()), None);
    }

    #[test]
    fn test_no_partial_or_case_insensitive_match() {
        let cols = columns(&["location__ltree_path_v2", "Location__ltree_path", "location"]);
        assert_eq!(resolve_denormalized(&["location", "ltreePath"], &cols), None);
        assert_eq!(resolve_denormalized(&["location"], &cols), Some("location"));
        let empty: [&str; 0] = [];
        assert_eq!(resolve_denormalized(&empty, &cols), None);
    }
}
