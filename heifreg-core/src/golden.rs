//! Exact comparison of captured output against stored golden artifacts.
//!
//! Both sides are raw bytes and no normalization of any kind happens here:
//! trailing newlines, carriage returns, whitespace and invalid UTF-8 all
//! count.

use crate::error::{HarnessError, Result};
use camino::Utf8Path;
use std::fmt;

/// First point at which two outputs diverge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDiff {
    /// 1-based line number
    pub line: usize,
    pub expected_line: Option<Vec<u8>>,
    pub actual_line: Option<Vec<u8>>,
    pub expected_len: usize,
    pub actual_len: usize,
}

impl fmt::Display for TextDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "first difference at line {} (expected {} bytes, got {} bytes)\n  expected: {}\n  actual:   {}",
            self.line,
            self.expected_len,
            self.actual_len,
            show_line(self.expected_line.as_deref()),
            show_line(self.actual_line.as_deref()),
        )
    }
}

fn show_line(line: Option<&[u8]>) -> String {
    match line {
        Some(l) => format!("\"{}\"", l.escape_ascii()),
        None => "<end of text>".to_owned(),
    }
}

/// Compare two outputs byte for byte. `None` means they are identical.
pub fn diff_bytes(expected: &[u8], actual: &[u8]) -> Option<TextDiff> {
    if expected == actual {
        return None;
    }

    let mut expected_lines = expected.split_inclusive(|&b| b == b'\n');
    let mut actual_lines = actual.split_inclusive(|&b| b == b'\n');
    let mut line = 1;
    loop {
        match (expected_lines.next(), actual_lines.next()) {
            (Some(e), Some(a)) if e == a => line += 1,
            (e, a) => {
                return Some(TextDiff {
                    line,
                    expected_line: e.map(<[u8]>::to_vec),
                    actual_line: a.map(<[u8]>::to_vec),
                    expected_len: expected.len(),
                    actual_len: actual.len(),
                });
            }
        }
    }
}

pub fn diff_text(expected: &str, actual: &str) -> Option<TextDiff> {
    diff_bytes(expected.as_bytes(), actual.as_bytes())
}

/// Read the artifact at `expected_path` and compare it with `actual`.
///
/// A missing or unreadable artifact is an error, not a mismatch, so callers
/// can tell a broken oracle from a broken subject in their messages.
pub fn compare(actual: &[u8], expected_path: &Utf8Path) -> Result<Option<TextDiff>> {
    let expected = std::fs::read(expected_path).map_err(|source| HarnessError::MissingArtifact {
        path: expected_path.to_owned(),
        source,
    })?;
    Ok(diff_bytes(&expected, actual))
}

/// Panic unless `actual` equals the artifact at `expected_path`.
pub fn assert_matches_golden(actual: impl AsRef<[u8]>, expected_path: &Utf8Path) {
    match compare(actual.as_ref(), expected_path) {
        Ok(None) => {}
        Ok(Some(diff)) => panic!("Output does not match {expected_path}: {diff}"),
        Err(e) => panic!("{e}"),
    }
}
