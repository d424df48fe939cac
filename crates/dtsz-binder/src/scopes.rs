//! Persistent scopes recorded during binding.

use crate::symbols::{SymbolId, SymbolTable};
use dtsz_parser::NodeIndex;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const NONE: ScopeId = ScopeId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

/// Kind of node that created a scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ContainerKind {
    SourceFile,
    /// Namespace body
    Module,
    /// `declare module "m" { ... }`
    ExternalModule,
    /// `declare global { ... }`; declarations land in the program globals
    Global,
    /// Functions, signatures and function types (type parameters and parameters)
    Function,
    /// Interfaces, classes and type aliases (type parameters)
    Type,
    /// Mapped types and conditional types (`in` / `infer` parameters)
    TypeLevel,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub parent: ScopeId,
    pub kind: ContainerKind,
    pub container_node: NodeIndex,
    /// Namespace, module or file module symbol whose exports are visible here
    pub container_symbol: SymbolId,
    /// Declarations go to the program globals instead of `table`
    pub is_global: bool,
    /// Ambient block without explicit exports: every member is exported
    pub export_all: bool,
    pub table: SymbolTable,
}

impl Scope {
    pub fn new(parent: ScopeId, kind: ContainerKind, container_node: NodeIndex) -> Scope {
        Scope {
            parent,
            kind,
            container_node,
            container_symbol: SymbolId::NONE,
            is_global: false,
            export_all: false,
            table: SymbolTable::new(),
        }
    }
}
