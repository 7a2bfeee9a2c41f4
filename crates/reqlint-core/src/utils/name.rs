//! Package-name validation and normalization.
//!
//! Names may contain letters, digits, `-`, `_`, and `.`, and must start and
//! end with an alphanumeric character. Two names refer to the same package
//! when their normalized forms are equal: lowercase, with runs of `-`, `_`,
//! and `.` collapsed to a single `-`.

/// Check if a string is a valid package name
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && name.starts_with(|c: char| c.is_ascii_alphanumeric())
        && name.ends_with(|c: char| c.is_ascii_alphanumeric())
}

/// Normalize a package name for comparison
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut prev_sep = false;

    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !prev_sep {
                normalized.push('-');
            }
            prev_sep = true;
        } else {
            normalized.push(c.to_ascii_lowercase());
            prev_sep = false;
        }
    }

    normalized
}
