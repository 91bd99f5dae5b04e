//! Change-to-function localization for a single file.

use std::collections::HashSet;

use redot_api::{AffectedFunction, ChangedLine, FunctionSpan};

use crate::diff::ChangedLineSet;
use crate::docblock::existing_doc;
use crate::scanner::DeclarationScanner;
use crate::source::SourceFile;
use crate::span::resolve_span;
use crate::{Error, Result};

/// Resolved spans of every detected declaration, in source order.
///
/// Candidates whose span cannot be resolved are dropped; spans sharing the
/// same start and end line collapse into the first candidate.
#[must_use]
pub fn function_spans(source: &SourceFile<'_>) -> Vec<FunctionSpan> {
    let mut seen = HashSet::new();
    DeclarationScanner::new()
        .scan(source)
        .iter()
        .filter_map(|candidate| resolve_span(source, candidate))
        .filter(|span| seen.insert((span.start_line, span.end_line)))
        .collect()
}

/// Functions among `spans` containing at least one changed line.
#[must_use]
pub fn select_affected(
    source: &SourceFile<'_>,
    spans: &[FunctionSpan],
    changed: &ChangedLineSet,
) -> Vec<AffectedFunction> {
    spans
        .iter()
        .filter_map(|span| {
            let lines = changed.within(span.start_line, span.end_line);
            if lines.is_empty() {
                return None;
            }

            let changed_lines = lines
                .into_iter()
                .map(|line| ChangedLine {
                    line,
                    text: source.line(line).unwrap_or_default().to_string(),
                })
                .collect();

            Some(AffectedFunction {
                filename: source.path().to_string(),
                function_name: span.name.clone(),
                start_line: span.start_line,
                end_line: span.end_line,
                changed_lines,
                existing_doc: existing_doc(source.lines(), span.start_line),
                declaration_text: source.lines_between(span.start_line, span.end_line),
            })
        })
        .collect()
}

/// Functions of `path` touched by `patch`, read against the head-side
/// `text`.
///
/// A file with only one of the two inputs is skipped with an empty result.
///
/// # Errors
///
/// Returns [`Error::MissingInput`] when neither input is provided, so callers
/// can tell "nothing changed" apart from "nothing to analyse".
pub fn localize(
    path: &str,
    patch: Option<&str>,
    text: Option<&str>,
) -> Result<Vec<AffectedFunction>> {
    let (patch, text) = match (patch, text) {
        (None, None) => {
            return Err(Error::MissingInput {
                path: path.to_string(),
            })
        }
        (Some(patch), Some(text)) => (patch, text),
        _ => return Ok(Vec::new()),
    };

    let changed = ChangedLineSet::from_patch(patch);
    if changed.is_empty() {
        return Ok(Vec::new());
    }

    let source = SourceFile::new(path, text);
    let spans = function_spans(&source);
    Ok(select_affected(&source, &spans, &changed))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FUNCTIONS: &str = "function alpha() {
  const a = 1;
  const b = 2;
  return a + b;
}
/**
 * Beta does things.
 */
function beta(x) {
  if (x) {
    return 1;
  }
  return 0;
}
";

    #[test]
    fn change_inside_alpha_selects_only_alpha() {
        let patch = "@@ -1,4 +1,5 @@
 function alpha() {
   const a = 1;
+  const b = 2;
   return a + b;
 }
";
        let affected = localize("two.js", Some(patch), Some(TWO_FUNCTIONS)).expect("localize");
        assert_eq!(affected.len(), 1);
        let alpha = &affected[0];
        assert_eq!(alpha.function_name, "alpha");
        assert_eq!((alpha.start_line, alpha.end_line), (1, 5));
        assert_eq!(alpha.existing_doc, None);
        assert_eq!(
            alpha.changed_lines,
            vec![ChangedLine {
                line: 3,
                text: "  const b = 2;".into()
            }]
        );
        assert!(alpha.declaration_text.starts_with("function alpha() {"));
        assert!(alpha.declaration_text.ends_with('}'));
    }

    #[test]
    fn change_inside_beta_carries_its_doc_block() {
        let patch = "@@ -10,3 +10,3 @@
   if (x) {
-    return 2;
+    return 1;
   }
";
        let affected = localize("two.js", Some(patch), Some(TWO_FUNCTIONS)).expect("localize");
        assert_eq!(affected.len(), 1);
        let beta = &affected[0];
        assert_eq!(beta.function_name, "beta");
        assert_eq!((beta.start_line, beta.end_line), (9, 14));
        assert_eq!(
            beta.existing_doc.as_deref(),
            Some("/**\n * Beta does things.\n */")
        );
        assert_eq!(beta.change_descriptions(), vec!["Line 11:     return 1;"]);
    }

    #[test]
    fn mixed_declaration_styles_are_found_once_in_order() {
        let text = "function named(a) {
  return a;
}
const arrow = (b) => {
  return b;
};
class Box {
  method(c) {
    return c;
  }
}
";
        let spans = function_spans(&SourceFile::new("mixed.js", text));
        let found: Vec<(&str, u32, u32)> = spans
            .iter()
            .map(|span| (span.name.as_str(), span.start_line, span.end_line))
            .collect();
        assert_eq!(
            found,
            vec![("named", 1, 3), ("arrow", 4, 6), ("method", 8, 10)]
        );
    }

    #[test]
    fn braces_in_strings_do_not_shift_later_functions() {
        let text = "function render() {
  return \"<div>{{\" + '}' + `}`;
}
function after() {
  work();
}
";
        let patch = "@@ -4,2 +4,3 @@
 function after() {
+  work();
 }
";
        let affected = localize("tpl.js", Some(patch), Some(text)).expect("localize");
        assert_eq!(affected.len(), 1);
        assert_eq!(affected[0].function_name, "after");
        assert_eq!((affected[0].start_line, affected[0].end_line), (4, 6));
    }

    #[test]
    fn change_outside_functions_selects_nothing() {
        let patch = "@@ -15,0 +15,1 @@\n+console.log('x');\n";
        let text = format!("{TWO_FUNCTIONS}console.log('x');\n");
        let affected = localize("two.js", Some(patch), Some(&text)).expect("localize");
        assert!(affected.is_empty());
    }

    #[test]
    fn missing_inputs() {
        assert!(matches!(
            localize("gone.js", None, None),
            Err(Error::MissingInput { path }) if path == "gone.js"
        ));
        assert!(localize("bin.png", None, Some("x")).expect("skip").is_empty());
        assert!(localize("gone.js", Some("@@ -1 +1 @@\n+x\n"), None)
            .expect("skip")
            .is_empty());
        assert!(localize("a.js", Some(""), Some(TWO_FUNCTIONS))
            .expect("empty patch")
            .is_empty());
    }
}
