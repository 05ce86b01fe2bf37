//! Declared-size parsing.

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use regex::Regex;
use std::sync::LazyLock;

// The catalog renders sizes as e.g. "1,048,576 bytes" with thousands
// separators, sometimes with surrounding markup whitespace.
static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([\d,]+) bytes").unwrap());

/// Parse a declared size string of the form `"<digits-with-separators> bytes"`.
///
/// ```
/// use droidmirror_scrape::parse_declared_size;
///
/// assert_eq!(parse_declared_size("1,048,576 bytes").unwrap(), 1_048_576);
/// assert_eq!(parse_declared_size("(512 bytes)").unwrap(), 512);
/// assert!(parse_declared_size("about a megabyte").is_err());
/// ```
pub fn parse_declared_size(size: &str) -> Result<u64> {
    let captures = SIZE_RE.captures(size).ok_or_raise(|| ErrorKind::InvalidSize(size.to_string()))?;
    let digits = captures[1].replace(',', "");
    digits.parse::<u64>().or_raise(|| ErrorKind::InvalidSize(size.to_string()))
}
