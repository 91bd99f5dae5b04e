//! Unified diff parsing into head-side changed line numbers.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{DiffLineKind, DiffRange};

#[allow(clippy::expect_used)]
static HUNK_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@")
        .expect("hunk header pattern is valid")
});

/// Parse a `@@ -a[,b] +c[,d] @@` hunk header. Omitted counts default to 1.
#[must_use]
pub fn parse_hunk_header(line: &str) -> Option<DiffRange> {
    let captures = HUNK_HEADER.captures(line)?;
    let number = |index: usize, default: Option<u32>| -> Option<u32> {
        match captures.get(index) {
            Some(found) => found.as_str().parse().ok(),
            None => default,
        }
    };

    Some(DiffRange {
        base_start: number(1, None)?,
        base_lines: number(2, Some(1))?,
        head_start: number(3, None)?,
        head_lines: number(4, Some(1))?,
    })
}

/// Head-side line numbers added by a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedLineSet {
    lines: BTreeSet<u32>,
}

impl ChangedLineSet {
    /// Collect the added lines of a unified diff for one file.
    ///
    /// A malformed hunk header closes the current hunk, and every line up to
    /// the next valid header is ignored.
    #[must_use]
    pub fn from_patch(patch: &str) -> Self {
        let mut lines = BTreeSet::new();
        let mut hunk: Option<HunkCursor> = None;

        for raw in patch.split('\n') {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if line.starts_with("@@") {
                hunk = parse_hunk_header(line).map(HunkCursor::new);
                continue;
            }

            let Some(cursor) = hunk.as_mut() else {
                continue;
            };

            match DiffLineKind::classify(line) {
                Some(DiffLineKind::Addition) => {
                    lines.insert(cursor.head_line);
                    cursor.head_line += 1;
                    cursor.head_remaining = cursor.head_remaining.saturating_sub(1);
                }
                Some(DiffLineKind::Deletion) => {
                    cursor.base_remaining = cursor.base_remaining.saturating_sub(1);
                }
                Some(DiffLineKind::Context) => {
                    cursor.head_line += 1;
                    cursor.head_remaining = cursor.head_remaining.saturating_sub(1);
                    cursor.base_remaining = cursor.base_remaining.saturating_sub(1);
                }
                None => continue,
            }

            if cursor.is_exhausted() {
                hunk = None;
            }
        }

        Self { lines }
    }

    /// Whether the patch added no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of added lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether `line` was added.
    #[must_use]
    pub fn contains(&self, line: u32) -> bool {
        self.lines.contains(&line)
    }

    /// Added lines in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.lines.iter().copied()
    }

    /// Added lines within `start..=end`, ascending.
    #[must_use]
    pub fn within(&self, start: u32, end: u32) -> Vec<u32> {
        if start > end {
            return Vec::new();
        }
        self.lines.range(start..=end).copied().collect()
    }
}

impl FromIterator<u32> for ChangedLineSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug)]
struct HunkCursor {
    head_line: u32,
    head_remaining: u32,
    base_remaining: u32,
}

impl HunkCursor {
    const fn new(range: DiffRange) -> Self {
        Self {
            head_line: range.head_start,
            head_remaining: range.head_lines,
            base_remaining: range.base_lines,
        }
    }

    const fn is_exhausted(&self) -> bool {
        self.head_remaining == 0 && self.base_remaining == 0
    }
}
