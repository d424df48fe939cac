//! Scope Locator
//!
//! The scope path of a node is the chain of named namespaces enclosing it,
//! outermost first, up to the nearest file-like boundary. The scope path of
//! a symbol is the scope path of its first declaration; a symbol without
//! declarations has an empty path and is treated as top-level.

use crate::semantic::{ScopeContainer, SemanticModel};
use dtsz_binder::{NodeRef, SymbolId};
use dtsz_common::diagnostics::diagnostic_messages;
use dtsz_common::limits::MAX_SCOPE_WALK_ITERATIONS;
use dtsz_common::{Diagnostic, diagnostic_codes, format_message};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{trace, warn};

/// Enclosing namespace symbols, outermost first.
pub type ScopePath = SmallVec<[SymbolId; 4]>;

pub struct ScopeLocator<'m, M: SemanticModel + ?Sized> {
    model: &'m M,
    symbol_paths: FxHashMap<SymbolId, ScopePath>,
    diagnostics: Vec<Diagnostic>,
}

impl<'m, M: SemanticModel + ?Sized> ScopeLocator<'m, M> {
    pub fn new(model: &'m M) -> Self {
        ScopeLocator {
            model,
            symbol_paths: FxHashMap::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Scope path of the position `node` occupies (the node itself is not
    /// part of its own path).
    pub fn scope_of_node(&self, node: NodeRef) -> ScopePath {
        let mut path = ScopePath::new();
        let mut current = self.model.parent_node(node);
        let mut iterations = 0;
        while let Some(container) = current {
            iterations += 1;
            if iterations > MAX_SCOPE_WALK_ITERATIONS {
                warn!(?node, "scope walk exceeded iteration limit");
                break;
            }
            match self.model.scope_container(container) {
                ScopeContainer::Boundary => break,
                ScopeContainer::Namespace => {
                    if let Some(namespace) = self.model.symbol_at(container) {
                        path.insert(0, namespace);
                    }
                }
                ScopeContainer::Transparent => {}
            }
            current = self.model.parent_node(container);
        }
        trace!(?node, ?path, "scope of node");
        path
    }

    /// Scope path of a symbol's first declaration.
    ///
    /// When declarations disagree, the first one wins and a diagnostic is
    /// recorded once per symbol.
    pub fn scope_of_symbol(&mut self, symbol: SymbolId) -> ScopePath {
        if let Some(path) = self.symbol_paths.get(&symbol) {
            return path.clone();
        }
        let model = self.model;
        let declarations = model.declarations(symbol);
        let Some((&first, rest)) = declarations.split_first() else {
            self.symbol_paths.insert(symbol, ScopePath::new());
            return ScopePath::new();
        };

        let path = self.scope_of_node(first);
        if let Some(&other) = rest.iter().find(|&&d| self.scope_of_node(d) != path) {
            let name = model.symbol_name(symbol);
            warn!(name, "declarations are nested in different namespaces");
            let (start, length) = model.node_span(other);
            let (first_start, first_length) = model.node_span(first);
            self.diagnostics.push(
                Diagnostic::warning(
                    model.file_name(other.file),
                    start,
                    length,
                    format_message(
                        diagnostic_messages::INCONSISTENT_DECLARATION_SCOPES,
                        &[name],
                    ),
                    diagnostic_codes::INCONSISTENT_DECLARATION_SCOPES,
                )
                .with_related(
                    model.file_name(first.file),
                    first_start,
                    first_length,
                    format!("'{name}' is first declared here."),
                ),
            );
        }
        self.symbol_paths.insert(symbol, path.clone());
        path
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
