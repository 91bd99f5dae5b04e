use serde::{Deserialize, Serialize};

/// Line range of a function-like declaration, 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpan {
    /// Declared name (accessors carry their `get `/`set ` prefix).
    pub name: String,
    /// Line holding the start of the declaration.
    pub start_line: u32,
    /// Line holding the body's closing brace.
    pub end_line: u32,
}

impl FunctionSpan {
    /// Whether `line` falls inside the span.
    pub const fn contains(&self, line: u32) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

/// A changed head-side line together with its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedLine {
    /// 1-based line number in the head file.
    pub line: u32,
    /// Text of the line in the head file.
    pub text: String,
}

/// A function whose body intersects the changed lines of a patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedFunction {
    /// File containing the function.
    pub filename: String,
    /// Name of the function.
    pub function_name: String,
    /// First line of the declaration.
    pub start_line: u32,
    /// Line of the closing brace.
    pub end_line: u32,
    /// Changed lines inside the span, ascending.
    #[serde(default)]
    pub changed_lines: Vec<ChangedLine>,
    /// Documentation block currently preceding the declaration, trimmed.
    #[serde(default)]
    pub existing_doc: Option<String>,
    /// Source text from `start_line` through `end_line`.
    pub declaration_text: String,
}

impl AffectedFunction {
    /// Render the changed lines as `Line N: text` descriptions.
    pub fn change_descriptions(&self) -> Vec<String> {
        self.changed_lines
            .iter()
            .map(|changed| format!("Line {}: {}", changed.line, changed.text))
            .collect()
    }
}
