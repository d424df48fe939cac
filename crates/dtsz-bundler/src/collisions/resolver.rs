//! Reference Resolver
//!
//! Computes the text a reference must be printed as once every module is
//! flattened into one scope. Only the outermost segment of a reference can
//! collide, so only that segment is ever replaced: `A.B.C` becomes
//! `A$1.B.C` when `A` was renamed, never `A.B$1.C`.
//!
//! `None` means "print the reference as written".

use super::allocator::AllocatedNames;
use super::scope::{ScopeLocator, ScopePath};
use crate::semantic::SemanticModel;
use dtsz_binder::{NodeRef, SymbolId};
use dtsz_common::Diagnostic;
use tracing::{debug, trace};

pub struct ReferenceResolver<'m, 'n, M: SemanticModel + ?Sized> {
    model: &'m M,
    names: &'n AllocatedNames,
    scopes: ScopeLocator<'m, M>,
}

impl<'m, 'n, M: SemanticModel + ?Sized> ReferenceResolver<'m, 'n, M> {
    pub fn new(model: &'m M, names: &'n AllocatedNames) -> Self {
        ReferenceResolver {
            model,
            names,
            scopes: ScopeLocator::new(model),
        }
    }

    /// Text for a simple identifier reference.
    pub fn resolve_identifier(&mut self, reference: NodeRef) -> Option<String> {
        let model = self.model;
        let symbol = model.symbol_at(reference)?;
        let entity = model.aliased_symbol(symbol);
        let text = model.node_text(reference);

        let entity_path = self.scopes.scope_of_symbol(entity);
        let site_path = self.scopes.scope_of_node(reference);
        if let (Some(declared_in), Some(used_in)) = (entity_path.first(), site_path.first())
            && declared_in == used_in
        {
            trace!(text, "reference is local to its namespace");
            return Some(text.to_string());
        }

        let top_level = entity_path.first().copied().unwrap_or(entity);
        let top_name = self.top_level_name(top_level)?;
        let resolved = self.qualify(&entity_path, entity, text, top_name);
        debug!(text, resolved, "resolved identifier reference");
        Some(resolved)
    }

    /// Text for a qualified reference (`A.B.C`).
    pub fn resolve_qualified_name(&mut self, reference: NodeRef) -> Option<String> {
        let model = self.model;
        let leftmost = model.leftmost_identifier(reference);
        let text = model.node_text(reference);
        if let Some(first) = self.resolve_identifier(leftmost) {
            let mut segments: Vec<&str> = text.split('.').map(str::trim).collect();
            if let Some(head) = segments.first_mut() {
                *head = &first;
            }
            let resolved = segments.join(".");
            debug!(text, resolved, "resolved qualified reference");
            return Some(resolved);
        }

        // The leftmost segment has no name of its own (a namespace import,
        // for instance): name the entity behind the whole reference instead.
        let symbol = model.symbol_at(reference)?;
        let entity = model.aliased_symbol(symbol);
        let resolved = match self.names.name_of(entity) {
            Some(name) => name.to_string(),
            None => self.resolve_entity_path(entity)?,
        };
        debug!(text, resolved, "flattened qualified reference");
        Some(resolved)
    }

    /// Text naming `entity` from top level: its allocated name, or the
    /// allocated name of its outermost namespace followed by the inner
    /// namespace names.
    pub fn resolve_entity_path(&mut self, entity: SymbolId) -> Option<String> {
        let entity_path = self.scopes.scope_of_symbol(entity);
        let top_level = entity_path.first().copied().unwrap_or(entity);
        let top_name = self.top_level_name(top_level)?;
        let own_name = self.model.symbol_name(entity).to_string();
        Some(self.qualify(&entity_path, entity, &own_name, top_name))
    }

    /// Text for an import type (`import("m").A.B`): the entity path of what
    /// it refers to.
    pub fn resolve_import_type(&mut self, reference: NodeRef) -> Option<String> {
        let symbol = self.model.symbol_at(reference)?;
        let entity = self.model.aliased_symbol(symbol);
        self.resolve_entity_path(entity)
    }

    /// Inconsistent-scope diagnostics found while resolving.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.scopes.take_diagnostics()
    }

    fn top_level_name(&self, top_level: SymbolId) -> Option<String> {
        let original = self.model.symbol_name(top_level);
        self.names
            .preferred_name_of(top_level, original)
            .map(str::to_string)
    }

    /// Scope path segments plus the last segment, with the first segment
    /// replaced by `top_name`.
    fn qualify(
        &self,
        entity_path: &ScopePath,
        entity: SymbolId,
        text: &str,
        top_name: String,
    ) -> String {
        if entity_path.is_empty() {
            return top_name;
        }
        let mut segments = Vec::with_capacity(entity_path.len() + 1);
        segments.push(top_name);
        for &namespace in &entity_path[1..] {
            segments.push(self.model.symbol_name(namespace).to_string());
        }
        // An alias may name the entity differently; inner segments must use
        // the declared name.
        let last = match self.model.symbol_name(entity) {
            "" => text,
            declared => declared,
        };
        segments.push(last.to_string());
        segments.join(".")
    }
}
