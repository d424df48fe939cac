//! The semantic queries the collision resolver depends on.
//!
//! `SemanticModel` is the seam between the resolver and whatever bound the
//! program. The bundler passes a `Program`; the resolver tests pass a small
//! hand-built model.

use dtsz_binder::{FileId, NodeRef, Program, SymbolId, program};
use dtsz_parser::node_flags;
use dtsz_parser::syntax_kind_ext::{MODULE_DECLARATION, SOURCE_FILE};

/// How a node takes part in scope paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeContainer {
    /// Named namespace or module declaration (`namespace A {}`)
    Namespace,
    /// File-like boundary: a source file, `declare module "m" {}` or
    /// `declare global {}`
    Boundary,
    /// Anything else
    Transparent,
}

pub trait SemanticModel {
    /// Symbol declared by a declaration (or its name), or referenced by an
    /// identifier, qualified name or import type.
    fn symbol_at(&self, node: NodeRef) -> Option<SymbolId>;

    fn symbol_flags(&self, symbol: SymbolId) -> u32;

    fn symbol_name(&self, symbol: SymbolId) -> &str;

    /// Follow alias hops; non-aliases map to themselves.
    fn aliased_symbol(&self, symbol: SymbolId) -> SymbolId;

    /// Declaration sites in binding order, possibly empty.
    fn declarations(&self, symbol: SymbolId) -> &[NodeRef];

    /// What `name` currently means at global scope.
    fn resolve_global_name(&self, name: &str) -> Option<SymbolId>;

    fn is_global_namespace(&self, symbol: SymbolId) -> bool;

    fn parent_node(&self, node: NodeRef) -> Option<NodeRef>;

    fn scope_container(&self, node: NodeRef) -> ScopeContainer;

    fn node_text(&self, node: NodeRef) -> &str;

    /// Leftmost identifier of an identifier or qualified name.
    fn leftmost_identifier(&self, name: NodeRef) -> NodeRef;

    fn file_name(&self, file: FileId) -> &str;

    /// `(start, length)` of a node.
    fn node_span(&self, node: NodeRef) -> (u32, u32);
}

impl SemanticModel for Program {
    fn symbol_at(&self, node: NodeRef) -> Option<SymbolId> {
        Program::symbol_at(self, node)
    }

    fn symbol_flags(&self, symbol: SymbolId) -> u32 {
        Program::symbol_flags(self, symbol)
    }

    fn symbol_name(&self, symbol: SymbolId) -> &str {
        self.symbol(symbol).map_or("", |s| s.escaped_name.as_str())
    }

    fn aliased_symbol(&self, symbol: SymbolId) -> SymbolId {
        self.resolve_alias(symbol)
    }

    fn declarations(&self, symbol: SymbolId) -> &[NodeRef] {
        self.symbol(symbol).map_or(&[], |s| &s.declarations[..])
    }

    fn resolve_global_name(&self, name: &str) -> Option<SymbolId> {
        Program::resolve_global_name(self, name)
    }

    fn is_global_namespace(&self, symbol: SymbolId) -> bool {
        Program::is_global_namespace(self, symbol)
    }

    fn parent_node(&self, node: NodeRef) -> Option<NodeRef> {
        Program::parent_node(self, node)
    }

    fn scope_container(&self, node: NodeRef) -> ScopeContainer {
        let Some(arena) = self.arena(node.file) else {
            return ScopeContainer::Transparent;
        };
        let Some(n) = arena.get(node.node) else {
            return ScopeContainer::Transparent;
        };
        match n.kind {
            SOURCE_FILE => ScopeContainer::Boundary,
            MODULE_DECLARATION => {
                let is_string_named = arena
                    .get_module(n)
                    .and_then(|m| arena.get(m.name))
                    .is_some_and(|name| name.is_string_literal());
                if is_string_named || n.flags & node_flags::GLOBAL_AUGMENTATION != 0 {
                    ScopeContainer::Boundary
                } else {
                    ScopeContainer::Namespace
                }
            }
            _ => ScopeContainer::Transparent,
        }
    }

    fn node_text(&self, node: NodeRef) -> &str {
        Program::node_text(self, node)
    }

    fn leftmost_identifier(&self, name: NodeRef) -> NodeRef {
        match self.arena(name.file) {
            Some(arena) => NodeRef::new(name.file, program::leftmost_identifier(arena, name.node)),
            None => name,
        }
    }

    fn file_name(&self, file: FileId) -> &str {
        self.file(file).map_or("", |f| f.file_name.as_str())
    }

    fn node_span(&self, node: NodeRef) -> (u32, u32) {
        self.arena(node.file)
            .and_then(|arena| arena.get(node.node))
            .map_or((0, 0), |n| (n.pos, n.end.saturating_sub(n.pos)))
    }
}
