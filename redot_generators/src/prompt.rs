//! Prompt assembly and reply parsing shared by model-backed generators.

use redot_api::{AffectedFunction, DocProposal, DocSummary};
use redot_generator_api::{GeneratorError, GeneratorResult};

const NO_EXISTING_DOC: &str = "No existing documentation found";
const NO_EXISTING_DOC_MD: &str = "No existing DOC.MD found";

/// Build the documentation review prompt for one affected function.
#[must_use]
pub fn function_doc_prompt(function: &AffectedFunction) -> String {
    let existing = function.existing_doc.as_deref().unwrap_or(NO_EXISTING_DOC);
    let changes = function.change_descriptions().join("\n");

    format!(
        r#"<role>
  You are a technical documentation expert analyzing changes in a pull request.
</role>

<context>
  <file>{file}</file>
  <function>{name}</function>
  <lines_changed>{start}-{end}</lines_changed>
</context>

<existing_documentation>
{existing}
</existing_documentation>

<changes>
{changes}
</changes>

<function_context>
{code}
</function_context>

<task>
  1. Determine if the changes warrant updating the function documentation
  2. If yes, provide the updated doc comment block that should precede this function
  3. Provide a brief summary suitable for the DOC.MD file
</task>

<response_format>
  <json_schema>
    {{
      "needsUpdate": true/false,
      "reason": "Brief explanation of why documentation needs/doesn't need update",
      "inlineDocumentation": "Updated doc comment block (or null if no update needed)",
      "docMdSummary": "Brief summary for DOC.MD (or null if no update needed)"
    }}
  </json_schema>
</response_format>"#,
        file = function.filename,
        name = function.function_name,
        start = function.start_line,
        end = function.end_line,
        code = function.declaration_text,
    )
}

/// Build the DOC.MD revision prompt.
#[must_use]
pub fn doc_md_prompt(existing: Option<&str>, summaries: &[DocSummary]) -> String {
    let existing = existing
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(NO_EXISTING_DOC_MD);
    let updates = summaries
        .iter()
        .map(|summary| {
            format!(
                "  <update>\n    <file>{}</file>\n    <function>{}</function>\n    <summary>{}</summary>\n  </update>",
                summary.filename, summary.function_name, summary.summary
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r"<role>You are updating a DOC.MD file based on changes from a pull request.</role>

<existing_doc>
{existing}
</existing_doc>

<function_updates>
{updates}
</function_updates>

<task>
Update the DOC.MD to reflect these changes. Maintain the existing structure and only update relevant sections or add new entries as needed.

Provide the complete updated DOC.MD content.
</task>"
    )
}

/// Parse a model reply into a proposal.
///
/// Replies wrapped in Markdown fences or surrounded by prose are accepted as
/// long as they contain one outermost JSON object.
///
/// # Errors
///
/// Returns [`GeneratorError::MalformedReply`] carrying the raw reply when no
/// proposal can be decoded.
pub fn parse_proposal(reply: &str) -> GeneratorResult<DocProposal> {
    let body = outermost_object(reply).unwrap_or(reply);
    serde_json::from_str(body).map_err(|err| GeneratorError::MalformedReply {
        detail: err.to_string(),
        raw: reply.to_string(),
    })
}

fn outermost_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}
