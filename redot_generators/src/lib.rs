mod command;
mod passive;
pub mod prompt;

pub use command::CommandGenerator;
pub use passive::PassiveGenerator;

use redot_generator_api::GeneratorRegistry;

/// Build a generator registry populated with the default integrations.
#[must_use]
pub fn default_registry() -> GeneratorRegistry {
    let mut registry = GeneratorRegistry::new();
    registry.register(PassiveGenerator);
    registry.register(CommandGenerator::default());
    registry
}
