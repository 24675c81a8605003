//! File stem and directory name normalization.

use super::DUPLICATE_MARKER;

/// Characters that are never allowed in a file or directory name.
const ILLEGAL_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Placeholder for directory segments that sanitize to nothing.
const EMPTY_SEGMENT: &str = "_";

fn is_illegal(c: char) -> bool {
    c.is_control() || ILLEGAL_CHARS.contains(&c)
}

/// Normalizes a node label into a file stem.
///
/// The visible name is whatever follows the last `=` (variant properties
/// such as `Size=24, Name=arrow-up`). It is trimmed, inner whitespace runs
/// become single hyphens, the result is lowercased and filesystem-illegal
/// characters become hyphens.
///
/// Sanitized output is a fixed point: `sanitize(&sanitize(x)) == sanitize(x)`.
/// Empty input yields an empty string.
///
/// # Example
///
/// ```
/// use figma_icons_core::sanitize;
///
/// assert_eq!(sanitize("Size=24, Name=Arrow Up"), "arrow-up");
/// assert_eq!(sanitize("  Close   Circle "), "close-circle");
/// ```
#[must_use]
pub fn sanitize(raw_name: &str) -> String {
    let visible = raw_name
        .rsplit_once('=')
        .map_or(raw_name, |(_, after)| after);

    visible
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
        .chars()
        .map(|c| if is_illegal(c) { '-' } else { c })
        .collect()
}

/// Stem for the `counter`-th occurrence of a name.
///
/// Counter 0 is the plain sanitized name, 1 appends the duplicate marker and
/// higher counters append the marker plus the counter.
#[must_use]
pub fn stem(raw_name: &str, counter: usize) -> String {
    duplicate_stem(&sanitize(raw_name), counter)
}

/// Applies the duplicate marker to an already sanitized stem.
pub(crate) fn duplicate_stem(base: &str, counter: usize) -> String {
    match counter {
        0 => base.to_string(),
        1 => format!("{base}{DUPLICATE_MARKER}"),
        n => format!("{base}{DUPLICATE_MARKER}-{n}"),
    }
}

/// Normalizes a page or category name into one directory segment.
///
/// Case and inner spacing are preserved; only characters that would break
/// the path are replaced. `.`, `..` and empty names become `_`.
#[must_use]
pub fn sanitize_path_segment(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if is_illegal(c) { '-' } else { c })
        .collect();
    let trimmed = cleaned.trim();
    match trimmed {
        "" | "." | ".." => EMPTY_SEGMENT.to_string(),
        other => other.to_string(),
    }
}
