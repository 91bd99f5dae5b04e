mod registry;
mod types;

pub use registry::GeneratorRegistry;
pub use types::{GeneratorCapabilities, GeneratorError, GeneratorResult, GeneratorSummary};

use redot_api::{AffectedFunction, DocProposal, DocSummary};

/// Trait implemented by documentation generators (e.g., an external model CLI).
pub trait DocGenerator: Send + Sync {
    /// Stable identifier used for lookup and logging.
    fn id(&self) -> &'static str;

    /// Human-friendly label for reports.
    fn label(&self) -> &'static str;

    /// Capabilities advertised by the generator.
    fn capabilities(&self) -> GeneratorCapabilities;

    /// Decide whether the function's documentation needs refreshing and, if
    /// so, produce the replacement block.
    ///
    /// # Errors
    ///
    /// Implementors should surface transport failures and unparseable replies.
    fn propose(&self, function: &AffectedFunction) -> GeneratorResult<DocProposal>;

    /// Produce a revised DOC.MD from the existing text and the summaries of
    /// every updated function.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::UnsupportedCapability`] when the generator
    /// cannot revise DOC.MD, or generator-defined failures.
    fn revise_doc_md(
        &self,
        existing: Option<&str>,
        summaries: &[DocSummary],
    ) -> GeneratorResult<String>;
}
