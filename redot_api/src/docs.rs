use serde::{Deserialize, Serialize};

/// A generator's verdict for one affected function.
///
/// Field names follow the JSON reply requested from the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocProposal {
    /// Whether the documentation should change.
    #[serde(default)]
    pub needs_update: bool,
    /// Short explanation of the verdict.
    #[serde(default)]
    pub reason: Option<String>,
    /// Replacement documentation block, when an update is needed.
    #[serde(default)]
    pub inline_documentation: Option<String>,
    /// One-line summary destined for the project's DOC.MD.
    #[serde(default)]
    pub doc_md_summary: Option<String>,
}

impl DocProposal {
    /// A proposal that leaves the documentation untouched.
    pub fn unchanged(reason: impl Into<String>) -> Self {
        Self {
            needs_update: false,
            reason: Some(reason.into()),
            inline_documentation: None,
            doc_md_summary: None,
        }
    }

    /// The replacement block, if the proposal asks for one.
    pub fn replacement(&self) -> Option<&str> {
        if !self.needs_update {
            return None;
        }
        self.inline_documentation
            .as_deref()
            .filter(|block| !block.trim().is_empty())
    }
}

/// Summary line for a DOC.MD revision request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocSummary {
    /// File containing the function.
    pub filename: String,
    /// Name of the function.
    pub function_name: String,
    /// Summary text produced by the generator.
    pub summary: String,
}

/// A documentation replacement for the declaration starting at `target_line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocUpdate {
    /// Name of the function, for reporting.
    pub function_name: String,
    /// 1-based line of the declaration.
    pub target_line: u32,
    /// New documentation block; `None` leaves the function untouched.
    #[serde(default)]
    pub new_doc_block: Option<String>,
}

impl DocUpdate {
    /// Create an update carrying a replacement block.
    pub fn new(
        function_name: impl Into<String>,
        target_line: u32,
        block: impl Into<String>,
    ) -> Self {
        Self {
            function_name: function_name.into(),
            target_line,
            new_doc_block: Some(block.into()),
        }
    }
}

/// Rewritten file text; persisting it is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteResult {
    /// Path of the rewritten file.
    pub filename: String,
    /// Full text after all updates were applied.
    pub new_file_text: String,
}
