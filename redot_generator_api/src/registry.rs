//! Registry keeping track of available documentation generators.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{DocGenerator, GeneratorCapabilities, GeneratorSummary};

/// In-memory registry for documentation generators.
#[derive(Default)]
pub struct GeneratorRegistry {
    generators: BTreeMap<&'static str, Arc<dyn DocGenerator>>,
}

impl GeneratorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator keyed by its `DocGenerator::id`.
    pub fn register<G>(&mut self, generator: G)
    where
        G: DocGenerator + 'static,
    {
        self.register_arc(Arc::new(generator));
    }

    /// Register a shared generator handle.
    pub fn register_arc(&mut self, generator: Arc<dyn DocGenerator>) {
        self.generators.insert(generator.id(), generator);
    }

    /// Retrieve a generator by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<dyn DocGenerator>> {
        self.generators.get(id).cloned()
    }

    /// Returns the registered generator identifiers in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.generators.keys().copied()
    }

    /// Capabilities for a generator, if registered.
    #[must_use]
    pub fn capabilities(&self, id: &str) -> Option<GeneratorCapabilities> {
        self.generators.get(id).map(|generator| generator.capabilities())
    }

    /// Summaries for every registered generator.
    #[must_use]
    pub fn summaries(&self) -> Vec<GeneratorSummary> {
        self.generators
            .values()
            .map(|generator| GeneratorSummary {
                id: generator.id().to_string(),
                label: generator.label().to_string(),
                capabilities: generator.capabilities(),
            })
            .collect()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.generators.keys().collect::<Vec<_>>())
            .finish()
    }
}
