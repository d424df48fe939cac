//! Import and export declaration binding.
//!
//! Imports bind as `ALIAS` symbols carrying the module specifier and the
//! imported name; local export lists and `export default` / `export =` bind
//! as `ALIAS` symbols that point at an entity name in the same file. Both are
//! resolved lazily by the `Program`.

use crate::state::BinderState;
use crate::symbols::{NodeRef, SymbolId, symbol_flags};
use dtsz_parser::NodeIndex;
use dtsz_parser::modifier_flags;
use dtsz_parser::{Node, NodeArena};
use dtsz_parser::syntax_kind_ext::*;
use dtsz_scanner::SyntaxKind;

/// Where an alias symbol points.
enum AliasSource<'a> {
    /// `import { name } from "specifier"`; `name` of `None` is the whole module
    Module {
        specifier: &'a str,
        name: Option<&'a str>,
    },
    /// Identifier or qualified name in the current file
    Entity(NodeIndex),
}

impl BinderState {
    fn set_alias_source(&mut self, sym_id: SymbolId, source: AliasSource<'_>, is_type_only: bool) {
        let file = self.current_file;
        let Some(sym) = self.symbols.get_mut(sym_id) else {
            return;
        };
        sym.is_type_only = is_type_only;
        match source {
            AliasSource::Module { specifier, name } => {
                sym.import_module = Some(specifier.to_string());
                sym.import_name = name.map(str::to_string);
            }
            AliasSource::Entity(node) => {
                sym.alias_entity = Some(NodeRef::new(file, node));
            }
        }
    }

    /// Module specifier text of an import/export, recording it for resolution.
    fn module_specifier_text<'a>(
        &mut self,
        arena: &'a NodeArena,
        specifier: NodeIndex,
    ) -> Option<&'a str> {
        if specifier.is_none() {
            return None;
        }
        self.record_module_specifier(arena, specifier);
        arena.literal_text(specifier)
    }

    /// Name of an import/export specifier element (identifier or string).
    fn module_export_name(arena: &NodeArena, idx: NodeIndex) -> Option<&str> {
        arena.name_text(idx)
    }

    pub(crate) fn bind_import_declaration(
        &mut self,
        arena: &NodeArena,
        node: &Node,
        _idx: NodeIndex,
    ) {
        let Some(import) = arena.get_import_decl(node) else {
            return;
        };
        let Some(specifier) = self.module_specifier_text(arena, import.module_specifier) else {
            return;
        };
        let Some(clause_node) = arena.get(import.import_clause) else {
            // Side-effect import
            return;
        };
        let Some(clause) = arena.get_import_clause(clause_node) else {
            return;
        };
        let clause_type_only = clause.is_type_only;

        // Default import
        if let Some(name) = arena.identifier_text(clause.name) {
            let sym_id = self.declare_symbol(name, symbol_flags::ALIAS, import.import_clause, false);
            self.set_alias_source(
                sym_id,
                AliasSource::Module {
                    specifier,
                    name: Some("default"),
                },
                clause_type_only,
            );
            self.current_bindings_mut()
                .node_symbols
                .insert(clause.name.0, sym_id);
        }

        let Some(bindings_node) = arena.get(clause.named_bindings) else {
            return;
        };
        let Some(named) = arena.get_named_imports(bindings_node) else {
            return;
        };

        // import * as ns from "m"
        if bindings_node.kind == NAMESPACE_IMPORT {
            if let Some(name) = arena.identifier_text(named.name) {
                let sym_id =
                    self.declare_symbol(name, symbol_flags::ALIAS, clause.named_bindings, false);
                self.set_alias_source(
                    sym_id,
                    AliasSource::Module {
                        specifier,
                        name: None,
                    },
                    clause_type_only,
                );
                self.current_bindings_mut()
                    .node_symbols
                    .insert(named.name.0, sym_id);
            }
            return;
        }

        // import { a, b as c } from "m"
        for &spec_idx in &named.elements.nodes {
            let Some(spec) = arena.get(spec_idx).and_then(|n| arena.get_specifier(n)) else {
                continue;
            };
            let Some(local_name) = arena.identifier_text(spec.name) else {
                continue;
            };
            let imported_name = if spec.property_name.is_some() {
                Self::module_export_name(arena, spec.property_name)
            } else {
                Some(local_name)
            };
            let sym_id = self.declare_symbol(local_name, symbol_flags::ALIAS, spec_idx, false);
            self.set_alias_source(
                sym_id,
                AliasSource::Module {
                    specifier,
                    name: imported_name,
                },
                clause_type_only || spec.is_type_only,
            );
            self.current_bindings_mut()
                .node_symbols
                .insert(spec.name.0, sym_id);
        }
    }

    /// Bind `import x = ns.member` or `import x = require("...")`
    pub(crate) fn bind_import_equals_declaration(
        &mut self,
        arena: &NodeArena,
        node: &Node,
        idx: NodeIndex,
    ) {
        let Some(import) = arena.get_import_equals(node) else {
            return;
        };
        let Some(name) = arena.identifier_text(import.name) else {
            return;
        };
        let is_exported = arena.has_modifier(idx, modifier_flags::EXPORT);
        let sym_id = self.declare_symbol(name, symbol_flags::ALIAS, idx, is_exported);
        self.current_bindings_mut()
            .node_symbols
            .insert(import.name.0, sym_id);

        let Some(reference) = arena.get(import.module_reference) else {
            return;
        };
        if reference.kind == EXTERNAL_MODULE_REFERENCE {
            let literal = arena
                .get_wrapped(reference)
                .map_or(NodeIndex::NONE, |w| w.inner);
            if let Some(specifier) = self.module_specifier_text(arena, literal) {
                self.set_alias_source(
                    sym_id,
                    AliasSource::Module {
                        specifier,
                        name: None,
                    },
                    import.is_type_only,
                );
            }
        } else {
            self.set_alias_source(
                sym_id,
                AliasSource::Entity(import.module_reference),
                import.is_type_only,
            );
        }
    }

    pub(crate) fn bind_export_declaration(
        &mut self,
        arena: &NodeArena,
        node: &Node,
        _idx: NodeIndex,
    ) {
        let Some(export) = arena.get_export_decl(node) else {
            return;
        };
        let specifier = self.module_specifier_text(arena, export.module_specifier);

        let Some(clause_node) = arena.get(export.export_clause) else {
            // export * from "m"
            if let Some(specifier) = specifier {
                let container = self
                    .scope(self.current_scope_id)
                    .map_or(SymbolId::NONE, |scope| scope.container_symbol);
                if let Some(sym) = self.symbols.get_mut(container) {
                    sym.flags |= symbol_flags::EXPORT_STAR;
                    sym.star_exports.push(specifier.to_string());
                }
            }
            return;
        };
        let Some(named) = arena.get_named_imports(clause_node) else {
            return;
        };

        // export * as ns from "m"
        if clause_node.kind == NAMESPACE_EXPORT {
            if let (Some(name), Some(specifier)) =
                (Self::module_export_name(arena, named.name), specifier)
            {
                let sym_id = self.declare_export(name, symbol_flags::ALIAS, export.export_clause);
                self.set_alias_source(
                    sym_id,
                    AliasSource::Module {
                        specifier,
                        name: None,
                    },
                    export.is_type_only,
                );
                self.current_bindings_mut()
                    .node_symbols
                    .insert(named.name.0, sym_id);
            }
            return;
        }

        // export { a, b as c } [from "m"]
        for &spec_idx in &named.elements.nodes {
            let Some(spec) = arena.get(spec_idx).and_then(|n| arena.get_specifier(n)) else {
                continue;
            };
            let local = if spec.property_name.is_some() {
                spec.property_name
            } else {
                spec.name
            };
            let Some(exported_name) = Self::module_export_name(arena, spec.name) else {
                continue;
            };
            let sym_id = self.declare_export(exported_name, symbol_flags::ALIAS, spec_idx);
            let source = match specifier {
                Some(specifier) => AliasSource::Module {
                    specifier,
                    name: Self::module_export_name(arena, local),
                },
                None => AliasSource::Entity(local),
            };
            self.set_alias_source(sym_id, source, export.is_type_only || spec.is_type_only);
            self.current_bindings_mut()
                .node_symbols
                .insert(spec.name.0, sym_id);
        }
    }

    /// Bind `export default <expr>` and `export = <expr>`.
    pub(crate) fn bind_export_assignment(
        &mut self,
        arena: &NodeArena,
        node: &Node,
        idx: NodeIndex,
    ) {
        let Some(assignment) = arena.get_export_assignment(node) else {
            return;
        };
        let name = if assignment.is_export_equals {
            "export="
        } else {
            "default"
        };
        let is_entity_name = arena.get(assignment.expression).is_some_and(|expr| {
            expr.kind == SyntaxKind::Identifier as u16 || expr.kind == QUALIFIED_NAME
        });
        if is_entity_name {
            let sym_id = self.declare_export(name, symbol_flags::ALIAS, idx);
            self.set_alias_source(sym_id, AliasSource::Entity(assignment.expression), false);
        } else {
            self.declare_export(name, symbol_flags::PROPERTY, idx);
        }
    }
}
