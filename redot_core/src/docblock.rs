//! Backward scan over the lines preceding a declaration.
//!
//! One routine serves both the selector (which wants the existing
//! documentation block) and the rewriter (which additionally needs the
//! insertion point when there is no block to replace).

/// Words that mark a line as part of a declaration's header rather than a
/// separate statement.
pub const MODIFIER_WORDS: &[&str] = &[
    "export",
    "default",
    "async",
    "static",
    "public",
    "private",
    "protected",
    "readonly",
    "abstract",
    "override",
    "declare",
];

/// Result of scanning upward from a declaration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclarationHeader {
    /// First and last line of the documentation block, 1-based inclusive.
    pub doc_range: Option<(u32, u32)>,
    /// Line before which a new block is inserted: the topmost modifier or
    /// decorator line directly above the declaration, or the declaration
    /// itself.
    pub insertion_line: u32,
}

impl DeclarationHeader {
    /// Text of the documentation block, trimmed; `None` when absent or blank.
    #[must_use]
    pub fn doc_text(&self, lines: &[&str]) -> Option<String> {
        let (start, end) = self.doc_range?;
        let start = usize::try_from(start).ok()?.checked_sub(1)?;
        let end = usize::try_from(end).ok()?;
        let block = lines.get(start..end)?.join("\n");
        let trimmed = block.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

/// Whether `trimmed` is structurally a comment line.
#[must_use]
pub fn is_comment_line(trimmed: &str) -> bool {
    ["/**", "/*", "*", "//"]
        .iter()
        .any(|marker| trimmed.starts_with(marker))
        || (trimmed.ends_with("*/") && !trimmed.contains("/*"))
}

/// Whether `trimmed` is a decorator or a modifier prefix of the declaration
/// below it. A line carrying a body or ending a statement is code of its own.
#[must_use]
pub fn is_modifier_line(trimmed: &str) -> bool {
    if trimmed.starts_with('@') {
        return true;
    }
    if trimmed.ends_with(';') || trimmed.contains(['{', '}']) || trimmed.contains("=>") {
        return false;
    }
    let first_word = trimmed
        .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .next()
        .unwrap_or_default();
    MODIFIER_WORDS.contains(&first_word)
}

/// Scan upward from the line above `declaration_line` (1-based).
///
/// Comment lines extend the documentation block and a `/**` opener ends the
/// scan. Blank lines are skipped until a block has been found and end the
/// scan afterwards. Modifier and decorator lines never end the scan, but once
/// one has been crossed above a block, further comments belong to something
/// else. Any other line ends it without being included.
#[must_use]
pub fn scan_header(lines: &[&str], declaration_line: u32) -> DeclarationHeader {
    let mut doc_range: Option<(u32, u32)> = None;
    let mut insertion_line = declaration_line;
    let mut contiguous_modifiers = true;
    let mut in_block = false;
    let mut crossed_modifier = false;

    for line_number in (1..declaration_line).rev() {
        let Some(text) = usize::try_from(line_number - 1)
            .ok()
            .and_then(|index| lines.get(index))
        else {
            contiguous_modifiers = false;
            continue;
        };
        let trimmed = text.trim();

        if in_block || is_comment_line(trimmed) {
            if crossed_modifier {
                break;
            }
            contiguous_modifiers = false;
            doc_range = Some((line_number, doc_range.map_or(line_number, |(_, end)| end)));

            let opens = trimmed.contains("/*");
            if in_block {
                in_block = !opens;
            } else if trimmed.ends_with("*/") && !opens {
                in_block = true;
            }
            if !in_block && trimmed.starts_with("/**") {
                break;
            }
            continue;
        }

        if trimmed.is_empty() {
            if doc_range.is_some() {
                break;
            }
            contiguous_modifiers = false;
            continue;
        }

        if is_modifier_line(trimmed) {
            if contiguous_modifiers {
                insertion_line = line_number;
            }
            crossed_modifier = doc_range.is_some();
            continue;
        }

        break;
    }

    DeclarationHeader {
        doc_range,
        insertion_line,
    }
}

/// Existing documentation block above `declaration_line`, trimmed.
#[must_use]
pub fn existing_doc(lines: &[&str], declaration_line: u32) -> Option<String> {
    scan_header(lines, declaration_line).doc_text(lines)
}
