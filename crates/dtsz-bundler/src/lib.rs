//! Declaration bundler for dtsz.
//!
//! This crate provides:
//! - `collisions` - the symbol collision resolver (name allocation, scope
//!   location, reference resolution)
//! - `SemanticModel` - the questions the resolver asks about a program
//! - `ModuleGraph` - module dependency graph with cycle detection
//! - `DeclarationCollector` / `BundleEmitter` - what goes into a bundle and
//!   how it is printed
//! - `bundle` - the whole pipeline

pub mod bundle;
pub mod collect;
pub mod collisions;
pub mod emit;
pub mod graph;
pub mod options;
pub mod semantic;

pub use bundle::{BundleError, BundleOutput, RenamedSymbol, bundle};
pub use collect::{Collection, DeclarationCollector};
pub use collisions::{AllocatedNames, CollisionError, NameAllocator, ReferenceResolver, ScopeLocator};
pub use emit::BundleEmitter;
pub use graph::ModuleGraph;
pub use options::BundleOptions;
pub use semantic::{ScopeContainer, SemanticModel};
