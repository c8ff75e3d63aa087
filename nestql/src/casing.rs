use convert_case::{Boundary, Case, Casing};

/// Digits stay attached to the word they follow; only a capital after a digit starts a new word.
const DIGIT_BOUNDARIES: &[Boundary] = &[Boundary::LowerDigit, Boundary::UpperDigit, Boundary::DigitLower];

/// `ltreePath` -> `ltree_path`, `address2Line` -> `address2_line`. Segments that are
/// already snake_case pass through untouched.
pub fn to_snake_case(segment: &str) -> String { segment.from_case(Case::Camel).without_boundaries(DIGIT_BOUNDARIES).to_case(Case::Snake) }

/// The flattened column name a nested path is denormalized into: each segment
/// snake-cased, joined with a double underscore.
pub fn flattened_name<S: AsRef<str>>(path: &[S]) -> String {
    path.iter().map(|segment| to_snake_case(segment.as_ref())).collect::<Vec<_>>().join("__")
}
