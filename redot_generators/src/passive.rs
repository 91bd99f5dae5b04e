use redot_api::{AffectedFunction, DocProposal, DocSummary};
use redot_generator_api::{
    DocGenerator, GeneratorCapabilities, GeneratorError, GeneratorResult,
};

/// Minimal builtin generator that performs no external calls.
///
/// Useful for listing affected functions without touching any file.
#[derive(Debug, Default)]
pub struct PassiveGenerator;

impl DocGenerator for PassiveGenerator {
    fn id(&self) -> &'static str {
        "passive"
    }

    fn label(&self) -> &'static str {
        "Passive (report only)"
    }

    fn capabilities(&self) -> GeneratorCapabilities {
        GeneratorCapabilities::new(false, false)
    }

    fn propose(&self, _function: &AffectedFunction) -> GeneratorResult<DocProposal> {
        Ok(DocProposal::unchanged("No documentation generator selected."))
    }

    fn revise_doc_md(
        &self,
        _existing: Option<&str>,
        _summaries: &[DocSummary],
    ) -> GeneratorResult<String> {
        Err(GeneratorError::UnsupportedCapability {
            operation: "revise_doc_md",
        })
    }
}
