use std::sync::Arc;

use redot_api::{AffectedFunction, DocProposal, DocSummary};

use super::{
    DocGenerator, GeneratorCapabilities, GeneratorRegistry, GeneratorResult, GeneratorSummary,
};
use crate::{Error, Result};

/// High-level façade for invoking generator operations.
#[derive(Clone)]
pub struct GeneratorService {
    registry: Arc<GeneratorRegistry>,
}

impl GeneratorService {
    /// Create a generator service backed by the provided registry.
    #[must_use]
    pub fn new(registry: GeneratorRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Access the underlying registry.
    #[must_use]
    pub fn registry(&self) -> Arc<GeneratorRegistry> {
        Arc::clone(&self.registry)
    }

    /// List summaries for all registered generators.
    #[must_use]
    pub fn summaries(&self) -> Vec<GeneratorSummary> {
        self.registry.summaries()
    }

    /// Fetch capabilities for a generator, if registered.
    #[must_use]
    pub fn capabilities(&self, generator_id: &str) -> Option<GeneratorCapabilities> {
        self.registry.capabilities(generator_id)
    }

    /// Ask the generator for a documentation proposal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GeneratorNotRegistered`] when the id is unknown or
    /// propagates generator failures.
    pub fn propose(
        &self,
        generator_id: &str,
        function: &AffectedFunction,
    ) -> Result<DocProposal> {
        let generator = self.generator(generator_id)?;
        Self::invoke(generator_id, generator.propose(function))
    }

    /// Ask the generator for a revised DOC.MD.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GeneratorNotRegistered`] or generator-sourced errors,
    /// including unsupported capabilities.
    pub fn revise_doc_md(
        &self,
        generator_id: &str,
        existing: Option<&str>,
        summaries: &[DocSummary],
    ) -> Result<String> {
        let generator = self.generator(generator_id)?;
        Self::invoke(generator_id, generator.revise_doc_md(existing, summaries))
    }

    fn generator(&self, generator_id: &str) -> Result<Arc<dyn DocGenerator>> {
        self.registry
            .get(generator_id)
            .ok_or_else(|| Error::GeneratorNotRegistered {
                generator: generator_id.to_string(),
            })
    }

    fn invoke<T>(generator_id: &str, result: GeneratorResult<T>) -> Result<T> {
        result.map_err(|source| Error::Generator {
            generator: generator_id.to_string(),
            source,
        })
    }
}

impl Default for GeneratorService {
    fn default() -> Self {
        Self::new(super::default_registry())
    }
}

impl std::fmt::Debug for GeneratorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let generator_ids: Vec<String> = self
            .registry
            .ids()
            .map(std::string::ToString::to_string)
            .collect();
        f.debug_struct("GeneratorService")
            .field("generators", &generator_ids)
            .finish()
    }
}
