//! Documentation block rewriting.
//!
//! Every update is turned into a `(line range, replacement)` edit against the
//! original, immutable line sequence. Edits are validated for overlap and
//! applied in a single forward pass, so line numbers recorded before the
//! rewrite stay valid for all updates regardless of the order they arrive in.

use std::collections::BTreeMap;

use redot_api::{DocUpdate, RewriteResult};

use crate::docblock::scan_header;

/// Errors surfaced while rewriting or persisting documentation.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// Update targets a line the file does not have.
    #[error("line {line} is out of bounds for {path}")]
    LineOutOfBounds {
        /// File being rewritten.
        path: String,
        /// Requested declaration line.
        line: u32,
    },
    /// Two different blocks were proposed for the same declaration.
    #[error("conflicting documentation updates for line {line} in {path}")]
    ConflictingUpdates {
        /// File being rewritten.
        path: String,
        /// Declaration line targeted twice.
        line: u32,
    },
    /// Replacement ranges of two updates overlap.
    #[error("documentation edits overlap in {path}")]
    OverlappingEdits {
        /// File being rewritten.
        path: String,
    },
    /// File path escaped the repository root.
    #[error("rewrite path must be relative: {path}")]
    AbsolutePath {
        /// Provided path.
        path: String,
    },
    /// File path attempted to traverse outside of the repository root.
    #[error("rewrite path must not contain parent segments: {path}")]
    PathTraversal {
        /// Provided path.
        path: String,
    },
    /// File write failed while persisting a rewrite.
    #[error("failed to write {path}: {source}")]
    Io {
        /// File targeted by the write.
        path: String,
        /// Source error.
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug)]
struct Edit {
    /// 0-based index of the first replaced line.
    start: usize,
    /// 0-based exclusive end; equal to `start` for insertions.
    end: usize,
    target: u32,
    replacement: Vec<String>,
}

/// Apply documentation updates to `text`.
///
/// Updates without a block are ignored. An existing documentation block above
/// the declaration is replaced in place; otherwise the block and one blank
/// separator line are inserted above the declaration's decorators and
/// modifiers. Inserted lines take the declaration line's indentation.
///
/// # Errors
///
/// Returns an error when an update targets a line outside the file, when two
/// different blocks target the same declaration, or when edits overlap.
pub fn rewrite_docs(
    path: &str,
    text: &str,
    updates: &[DocUpdate],
) -> Result<RewriteResult, RewriteError> {
    let lines: Vec<&str> = text.split('\n').collect();
    let blocks = group_updates(path, updates)?;

    let mut edits = Vec::with_capacity(blocks.len());
    for (target, block) in blocks {
        edits.push(plan_edit(path, &lines, target, block)?);
    }

    edits.sort_by_key(|edit| (edit.start, edit.end, edit.target));
    ensure_non_overlapping(path, &edits)?;

    let mut output: Vec<&str> = Vec::with_capacity(lines.len());
    let mut cursor = 0;
    for edit in &edits {
        output.extend_from_slice(&lines[cursor..edit.start]);
        output.extend(edit.replacement.iter().map(String::as_str));
        cursor = edit.end;
    }
    output.extend_from_slice(&lines[cursor..]);

    Ok(RewriteResult {
        filename: path.to_owned(),
        new_file_text: output.join("\n"),
    })
}

fn group_updates<'u>(
    path: &str,
    updates: &'u [DocUpdate],
) -> Result<BTreeMap<u32, &'u str>, RewriteError> {
    let mut blocks: BTreeMap<u32, &str> = BTreeMap::new();
    for update in updates {
        let Some(block) = update.new_doc_block.as_deref() else {
            continue;
        };

        match blocks.get(&update.target_line) {
            Some(existing) if *existing != block => {
                return Err(RewriteError::ConflictingUpdates {
                    path: path.to_owned(),
                    line: update.target_line,
                });
            }
            Some(_) => {}
            None => {
                blocks.insert(update.target_line, block);
            }
        }
    }
    Ok(blocks)
}

fn plan_edit(path: &str, lines: &[&str], target: u32, block: &str) -> Result<Edit, RewriteError> {
    let out_of_bounds = || RewriteError::LineOutOfBounds {
        path: path.to_owned(),
        line: target,
    };
    let index = usize::try_from(target)
        .ok()
        .and_then(|line| line.checked_sub(1))
        .ok_or_else(out_of_bounds)?;
    let declaration = lines.get(index).ok_or_else(out_of_bounds)?;

    let indent = leading_indent(declaration);
    let line_ending = if declaration.ends_with('\r') { "\r" } else { "" };
    let mut replacement = format_block(block, indent, line_ending);

    let header = scan_header(lines, target);
    let (start, end) = if let Some((first, last)) = header.doc_range {
        (line_index(first), line_index(last) + 1)
    } else {
        replacement.push(line_ending.to_owned());
        let insertion = line_index(header.insertion_line);
        (insertion, insertion)
    };

    Ok(Edit {
        start,
        end,
        target,
        replacement,
    })
}

fn line_index(line: u32) -> usize {
    usize::try_from(line).map_or(0, |line| line.saturating_sub(1))
}

fn leading_indent(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

/// Normalise a generated block: drop blank edge lines, strip the common
/// indentation and prefix every line with `indent`.
fn format_block(block: &str, indent: &str, line_ending: &str) -> Vec<String> {
    let raw: Vec<&str> = block
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let first = raw.iter().position(|line| !line.trim().is_empty());
    let last = raw.iter().rposition(|line| !line.trim().is_empty());
    let body = match (first, last) {
        (Some(first), Some(last)) => &raw[first..=last],
        _ => &[][..],
    };

    let common = body
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_indent(line).len())
        .min()
        .unwrap_or(0);

    body.iter()
        .map(|line| {
            if line.trim().is_empty() {
                line_ending.to_owned()
            } else {
                format!("{indent}{}{line_ending}", line[common..].trim_end())
            }
        })
        .collect()
}

fn ensure_non_overlapping(path: &str, edits: &[Edit]) -> Result<(), RewriteError> {
    for window in edits.windows(2) {
        let [first, second] = match window {
            [a, b] => [a, b],
            _ => continue,
        };

        if first.end > second.start {
            return Err(RewriteError::OverlappingEdits {
                path: path.to_owned(),
            });
        }
    }

    Ok(())
}
