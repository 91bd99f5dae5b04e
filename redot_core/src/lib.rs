//! Core library for redot's documentation refresh workflow.
//!
//! The crate is layered around three primary responsibilities:
//! - localizing the functions a patch touches (diff mapping, declaration
//!   scanning, span resolution, documentation lookup)
//! - rewriting documentation blocks in place
//! - orchestrating generators, git access and persistence for a full run

#![warn(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::pedantic,
    missing_docs
)]
#![cfg_attr(
    not(test),
    deny(
        clippy::dbg_macro,
        clippy::expect_used,
        clippy::panic,
        clippy::print_stderr,
        clippy::print_stdout,
        clippy::todo,
        clippy::unwrap_used
    )
)]

/// Unified diff to changed-line mapping.
pub mod diff;
/// Backward scans for documentation blocks and declaration headers.
pub mod docblock;
/// Generator registry access.
pub mod generators;
/// Affected-function selection for one changed file.
pub mod localize;
/// Writing rewritten files into the working tree.
pub mod persist;
/// End-to-end documentation run.
pub mod pipeline;
/// Git repository access and persistence.
pub mod repository;
/// Documentation block rewriting.
pub mod rewrite;
/// Pattern-based declaration detection.
pub mod scanner;
/// Source text with offset and line views.
pub mod source;
/// Brace-depth span resolution.
pub mod span;

pub use redot_api::*;

pub use diff::ChangedLineSet;
pub use generators::GeneratorService;
pub use localize::localize;
pub use persist::DocWriter;
pub use pipeline::{DocPipeline, RunOptions, RunReport};
pub use repository::{ChangeSet, Repository};
pub use rewrite::{rewrite_docs, RewriteError};
pub use scanner::{DeclarationCandidate, DeclarationScanner};
pub use source::SourceFile;

use generators::GeneratorError;

/// Common result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying git operation failed.
    #[error("git error: {source}")]
    Git {
        /// Original libgit2 error bubbled up by the core library.
        #[from]
        source: git2::Error,
    },
    /// Provided path does not correspond to a git repository.
    #[error("path does not reference a git repository: {path}")]
    NotARepository {
        /// Path that failed to resolve to a repository.
        path: String,
    },
    /// Bare repositories are currently unsupported.
    #[error("repository at {path} is bare and unsupported")]
    BareRepository {
        /// Path of the repository lacking a working tree.
        path: String,
    },
    /// Revision expression did not resolve to a commit.
    #[error("revision does not resolve to a commit: {spec}")]
    UnknownRevision {
        /// Revision expression as given.
        spec: String,
    },
    /// Repository has no head revision to diff.
    #[error("repository has no head revision to diff")]
    MissingHeadRevision,
    /// Neither a patch nor the file text was supplied for a file.
    #[error("cannot analyze {path}: neither a patch nor the file text was provided")]
    MissingInput {
        /// File that could not be analyzed.
        path: String,
    },
    /// Documentation rewrite failed.
    #[error(transparent)]
    Rewrite {
        /// Underlying rewrite error.
        #[from]
        source: RewriteError,
    },
    /// Requested generator is not registered.
    #[error("documentation generator is not registered: {generator}")]
    GeneratorNotRegistered {
        /// Identifier that failed to resolve.
        generator: String,
    },
    /// Generator failed to handle the request.
    #[error("generator {generator} failed: {source}")]
    Generator {
        /// Identifier of the failing generator.
        generator: String,
        /// Failure reported by the generator.
        #[source]
        source: GeneratorError,
    },
    /// Filesystem interaction failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Filesystem path involved in the failed operation.
        path: String,
        /// Source I/O error returned by the standard library.
        #[source]
        source: std::io::Error,
    },
}
