use serde::{Deserialize, Serialize};

/// Capabilities advertised by a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GeneratorCapabilities {
    /// Whether the generator can revise the project DOC.MD.
    pub supports_doc_md: bool,
    /// Whether the generator calls out to an external process or service.
    pub calls_external: bool,
}

impl GeneratorCapabilities {
    /// Construct a new capabilities struct with explicit flags.
    #[must_use]
    pub const fn new(supports_doc_md: bool, calls_external: bool) -> Self {
        Self {
            supports_doc_md,
            calls_external,
        }
    }
}

/// Summary information about a registered generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorSummary {
    /// Stable identifier for the generator.
    pub id: String,
    /// Human-friendly label for display.
    pub label: String,
    /// Capability flags.
    pub capabilities: GeneratorCapabilities,
}

/// Errors surfaced by generator integrations.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Operation is not supported by the generator.
    #[error("operation '{operation}' is not supported by this generator")]
    UnsupportedCapability {
        /// Name of the unsupported operation.
        operation: &'static str,
    },
    /// The generator replied with something that is not a proposal.
    #[error("generator reply is not valid JSON: {detail}")]
    MalformedReply {
        /// Parser message.
        detail: String,
        /// Reply text as received.
        raw: String,
    },
    /// Generic failure surfaced by the generator.
    #[error("{message}")]
    Failure {
        /// Human-readable error message.
        message: String,
    },
}

impl GeneratorError {
    /// Helper to construct a failure from any displayable message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Raw reply text, when the failure came from parsing one.
    #[must_use]
    pub fn raw_reply(&self) -> Option<&str> {
        match self {
            Self::MalformedReply { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Convenience result alias for generator operations.
pub type GeneratorResult<T> = std::result::Result<T, GeneratorError>;
