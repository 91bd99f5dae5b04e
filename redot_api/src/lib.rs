//! Shared redot data models consumed by the core library and generator crates.

pub mod diff;
pub mod docs;
pub mod function;

pub use diff::*;
pub use docs::*;
pub use function::*;
