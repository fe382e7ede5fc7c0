/// Canonical form of a question name: lower case, without the trailing root dot.
///
/// Two names that differ only in case or in the presence of the trailing dot
/// normalize to the same string.
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    trimmed.to_lowercase()
}
