//! Pluralization for log messages.

/// Format count with noun, e.g. `1 image`, `5 images`.
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}
