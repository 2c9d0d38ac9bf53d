//! Pattern utility functions

/// Escape regex metacharacters in user input
///
/// Use this when building `$regex` conditions from user input so the value
/// is matched literally.
///
/// # Example
///
/// ```
/// use sieve_server::utils::pattern::escape_regex_pattern;
///
/// assert_eq!(escape_regex_pattern("a.b*"), "a\\.b\\*");
/// ```
pub fn escape_regex_pattern(s: &str) -> String {
    regex::escape(s)
}

/// Split a comma-joined list into its items, kept verbatim
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',').map(str::to_string).collect()
}
