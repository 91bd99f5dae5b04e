//! Documentation generator entry points.

mod service;

pub use redot_generator_api::{
    DocGenerator, GeneratorCapabilities, GeneratorError, GeneratorRegistry, GeneratorResult,
    GeneratorSummary,
};
pub use redot_generators::{default_registry, prompt, CommandGenerator, PassiveGenerator};

pub use service::GeneratorService;
