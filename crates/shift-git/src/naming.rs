//! Conversion of free-form names into metadata-safe identifiers

/// Longest name accepted by resource metadata (DNS-1123 label).
pub const MAX_NAME_LEN: usize = 63;

/// Convert `raw` into a lowercase DNS-1123 label.
///
/// Runs of characters outside `[a-z0-9]` collapse to a single dash,
/// leading and trailing dashes are dropped, and the result is capped at
/// [`MAX_NAME_LEN`]. May return an empty string when `raw` has no
/// alphanumeric characters.
///
/// `My_Service/API` -> `my-service-api`
pub fn to_metadata_name(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut last_was_dash = true; // Start true to skip leading dashes

    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            result.push(c);
            last_was_dash = false;
        } else if !last_was_dash {
            result.push('-');
            last_was_dash = true;
        }
    }

    result.truncate(MAX_NAME_LEN);
    while result.ends_with('-') {
        result.pop();
    }
    result
}
