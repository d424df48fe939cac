//! Name binder and program model for dtsz.
//!
//! This crate provides:
//! - `SymbolArena` / `SymbolTable` - symbol storage with TypeScript's flag layout
//! - `BinderState` - declares symbols and scopes for every file of a program
//! - `ModuleResolver` - relative specifier resolution with declaration-file candidates
//! - `Program` - bound files plus alias, entity-name and global-name resolution

pub mod lib_loader;
pub mod module_resolver;
pub mod program;
pub mod scopes;
pub mod state;
mod state_binding;
mod state_import_export;
pub mod symbols;

pub use module_resolver::{ModuleResolver, Resolution, ResolutionFailure};
pub use program::{ExternalImport, ModuleTarget, Program, ProgramBuilder, SourceFile};
pub use scopes::{ContainerKind, Scope, ScopeId};
pub use state::BinderState;
pub use symbols::{FileId, NodeRef, Symbol, SymbolArena, SymbolId, SymbolTable, symbol_flags};
