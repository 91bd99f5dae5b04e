//! A file's text with both offset-based and line-based views.

/// Immutable source text plus its `\n`-separated line view.
///
/// Lines are split on `\n` only, so a trailing newline yields a final empty
/// line and joining the lines with `\n` reproduces the text exactly.
#[derive(Debug, Clone)]
pub struct SourceFile<'a> {
    path: &'a str,
    text: &'a str,
    lines: Vec<&'a str>,
    line_starts: Vec<usize>,
}

impl<'a> SourceFile<'a> {
    /// Index `text` for line addressing.
    #[must_use]
    pub fn new(path: &'a str, text: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (index, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(index + 1);
            }
        }

        Self {
            path,
            text,
            lines: text.split('\n').collect(),
            line_starts,
        }
    }

    /// Path the text was read from.
    #[must_use]
    pub const fn path(&self) -> &'a str {
        self.path
    }

    /// Full text.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// Line view, index 0 holding line 1.
    #[must_use]
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// Number of lines in the line view.
    #[must_use]
    pub fn line_count(&self) -> u32 {
        u32::try_from(self.lines.len()).unwrap_or(u32::MAX)
    }

    /// Text of the 1-based line `number`, if present.
    #[must_use]
    pub fn line(&self, number: u32) -> Option<&'a str> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.lines.get(index).copied()
    }

    /// Byte offset at which the 1-based line `number` starts.
    #[must_use]
    pub fn line_start(&self, number: u32) -> Option<usize> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.line_starts.get(index).copied()
    }

    /// 1-based line containing byte `offset`; offsets past the end map to the
    /// last line.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> u32 {
        let index = self.line_starts.partition_point(|start| *start <= offset);
        u32::try_from(index.max(1)).unwrap_or(u32::MAX)
    }

    /// Lines `start..=end` joined with `\n`.
    #[must_use]
    pub fn lines_between(&self, start: u32, end: u32) -> String {
        let first = usize::try_from(start).unwrap_or(usize::MAX).max(1) - 1;
        let last = usize::try_from(end)
            .unwrap_or(usize::MAX)
            .min(self.lines.len());
        if first >= last {
            return String::new();
        }
        self.lines[first..last].join("\n")
    }
}
