//! Symbol collision resolution.
//!
//! Two phases over one bundle:
//! 1. `NameAllocator` gives every top-level entity a unique name, in
//!    emission order. `finish` freezes the names into `AllocatedNames`.
//! 2. `ReferenceResolver` rewrites references against the frozen names,
//!    using `ScopeLocator` to tell local references from scope-crossing ones.

pub mod allocator;
pub mod error;
pub mod resolver;
pub mod scope;

pub use allocator::{AllocatedNames, DEFAULT_NAME_REPLACEMENT, NameAllocator, RENAMEABLE_FLAGS};
pub use error::CollisionError;
pub use resolver::ReferenceResolver;
pub use scope::{ScopeLocator, ScopePath};
