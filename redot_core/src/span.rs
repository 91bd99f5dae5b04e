//! Brace-depth resolution of a declaration's closing line.

use redot_api::FunctionSpan;

use crate::scanner::DeclarationCandidate;
use crate::source::SourceFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    LineComment,
    BlockComment,
    Str { quote: u8, escaped: bool },
}

/// Resolve the span of `candidate` by scanning forward from its start offset
/// until the body's closing brace.
///
/// Returns `None` when the declaration has no block body, when the scan
/// leaves the enclosing scope, or when the file ends before the body closes.
#[must_use]
pub fn resolve_span(
    source: &SourceFile<'_>,
    candidate: &DeclarationCandidate,
) -> Option<FunctionSpan> {
    let end_offset = closing_brace_offset(source.text(), candidate.start_offset)?;
    Some(FunctionSpan {
        name: candidate.name.clone(),
        start_line: candidate.start_line,
        end_line: source.line_of(end_offset),
    })
}

/// Byte offset of the brace that closes the first block body found at or
/// after `start`.
#[must_use]
pub fn closing_brace_offset(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut mode = Mode::Code;
    let mut depth: u32 = 0;
    let mut parens: u32 = 0;
    let mut index = start;

    while let Some(&byte) = bytes.get(index) {
        let next = bytes.get(index + 1).copied();
        match mode {
            Mode::LineComment => {
                if byte == b'\n' {
                    mode = Mode::Code;
                }
            }
            Mode::BlockComment => {
                if byte == b'*' && next == Some(b'/') {
                    mode = Mode::Code;
                    index += 1;
                }
            }
            Mode::Str { quote, escaped } => {
                mode = if escaped {
                    Mode::Str { quote, escaped: false }
                } else if byte == b'\\' {
                    Mode::Str { quote, escaped: true }
                } else if byte == quote || (byte == b'\n' && quote != b'`') {
                    Mode::Code
                } else {
                    mode
                };
            }
            Mode::Code => match byte {
                b'/' if next == Some(b'/') => mode = Mode::LineComment,
                b'/' if next == Some(b'*') => {
                    mode = Mode::BlockComment;
                    index += 1;
                }
                b'"' | b'\'' | b'`' if index == 0 || bytes[index - 1] != b'\\' => {
                    mode = Mode::Str {
                        quote: byte,
                        escaped: false,
                    };
                }
                b'(' if depth == 0 => parens += 1,
                b')' if depth == 0 => parens = parens.saturating_sub(1),
                b'{' if depth > 0 || parens == 0 => depth += 1,
                b'}' if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(index);
                    }
                }
                b'}' if parens == 0 => return None,
                b';' if depth == 0 && parens == 0 => return None,
                _ => {}
            },
        }
        index += 1;
    }

    None
}
