//! Bundle pipeline: module graph, collection, allocation, resolution, emission.

use crate::collect::{DeclarationCollector, ReferenceKind};
use crate::collisions::{CollisionError, NameAllocator, ReferenceResolver};
use crate::emit::{BundleEmitter, PlannedName, PlannedStatement, TextEdit, import_type_head};
use crate::graph::ModuleGraph;
use crate::options::BundleOptions;
use dtsz_binder::{NodeRef, Program};
use dtsz_common::diagnostics::diagnostic_messages;
use dtsz_common::{Diagnostic, diagnostic_codes, format_message};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info_span, warn};

#[derive(Debug, Error)]
pub enum BundleError {
    #[error(transparent)]
    Collision(#[from] CollisionError),

    #[error("entry file '{}' is not part of the program", .0.display())]
    EntryNotFound(PathBuf),

    #[error("entry file '{}' is not a module", .0.display())]
    EntryNotAModule(PathBuf),
}

/// A top-level declaration that did not keep its preferred name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamedSymbol {
    pub file: String,
    pub original: String,
    pub name: String,
}

#[derive(Debug)]
pub struct BundleOutput {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
    pub renamed: Vec<RenamedSymbol>,
}

/// Bundle the declarations reachable from `entry` into one file.
pub fn bundle(
    program: &Program,
    entry: &Path,
    options: &BundleOptions,
) -> Result<BundleOutput, BundleError> {
    let _span = info_span!("bundle", entry = %entry.display()).entered();
    let entry_file = program
        .file_id(entry)
        .ok_or_else(|| BundleError::EntryNotFound(entry.to_path_buf()))?;
    if program.module_symbol(entry_file).is_none() {
        return Err(BundleError::EntryNotAModule(entry.to_path_buf()));
    }

    let mut graph = ModuleGraph::from_program(program, entry_file);
    graph.detect_circular_dependencies();
    let mut diagnostics = graph.cycle_diagnostics();

    let mut collection = DeclarationCollector::new(program, &graph, options).collect(entry_file);
    diagnostics.append(&mut collection.diagnostics);

    // Allocation phase
    let mut allocator = NameAllocator::new(program);
    let mut import_names = FxHashMap::default();
    let mut renamed = Vec::new();
    for binding in &collection.imports {
        match allocator.register(binding.symbol, &binding.preferred_name) {
            Ok(name) => {
                if name != binding.preferred_name {
                    renamed.push(RenamedSymbol {
                        file: binding.specifier.clone(),
                        original: binding.preferred_name.clone(),
                        name: name.clone(),
                    });
                }
                import_names.insert(binding.symbol, name);
            }
            Err(err) => warn!(specifier = %binding.specifier, %err, "import keeps its name"),
        }
    }

    let mut planned: Vec<PlannedStatement<'_>> = Vec::with_capacity(collection.statements.len());
    for statement in &collection.statements {
        let mut names = Vec::new();
        let mut edits = Vec::new();
        for &name_node in &statement.names {
            match allocator.add_top_level_identifier(name_node) {
                Ok(name) => {
                    let Some(symbol) = program.symbol_at(name_node) else {
                        continue;
                    };
                    let is_own_name = name_node != statement.node;
                    let preferred = if is_own_name {
                        program.node_text(name_node).to_string()
                    } else {
                        crate::collisions::DEFAULT_NAME_REPLACEMENT.to_string()
                    };
                    if name != preferred {
                        renamed.push(RenamedSymbol {
                            file: file_name(program, name_node),
                            original: preferred.clone(),
                            name: name.clone(),
                        });
                        if is_own_name && let Some((start, end)) = node_span(program, name_node) {
                            edits.push(TextEdit::replace(start, end, name.clone()));
                        }
                    }
                    names.push(PlannedName {
                        symbol: program.resolve_alias(symbol),
                        name,
                        preferred,
                    });
                }
                Err(err) if err.is_fatal() => return Err(err.into()),
                Err(err) => {
                    warn!(%err, "skipping rename");
                    let (start, length) = node_span(program, name_node)
                        .map_or((0, 0), |(start, end)| (start, end - start));
                    diagnostics.push(Diagnostic::warning(
                        file_name(program, name_node),
                        start,
                        length,
                        format_message(
                            diagnostic_messages::UNSUPPORTED_TOP_LEVEL_DECLARATION,
                            &[program.node_text(name_node)],
                        ),
                        diagnostic_codes::UNSUPPORTED_TOP_LEVEL_DECLARATION,
                    ));
                }
            }
        }
        planned.push(PlannedStatement {
            statement,
            names,
            edits,
        });
    }
    let names = allocator.finish();
    debug!(symbols = names.len(), "allocation phase done");

    // Resolution phase
    let mut resolver = ReferenceResolver::new(program, &names);
    for plan in &mut planned {
        for reference in &plan.statement.references {
            match resolve_reference(program, &mut resolver, reference.node, reference.kind) {
                Ok(Some(edit)) => plan.edits.push(edit),
                Ok(None) => {}
                Err(diagnostic) => diagnostics.push(diagnostic),
            }
        }
    }
    diagnostics.append(&mut resolver.take_diagnostics());

    let text = BundleEmitter::new(program, options).emit(&collection, &planned, &import_names);
    debug!(
        bytes = text.len(),
        renamed = renamed.len(),
        diagnostics = diagnostics.len(),
        "bundle emitted"
    );
    Ok(BundleOutput {
        text,
        diagnostics,
        renamed,
    })
}

/// Edit for one reference, `Ok(None)` when it prints as written.
fn resolve_reference(
    program: &Program,
    resolver: &mut ReferenceResolver<'_, '_, Program>,
    node: NodeRef,
    kind: ReferenceKind,
) -> Result<Option<TextEdit>, Diagnostic> {
    let Some((start, end)) = node_span(program, node) else {
        return Ok(None);
    };
    let written = program.node_text(node);
    let (resolved, start, end) = match kind {
        ReferenceKind::Identifier => (resolver.resolve_identifier(node), start, end),
        ReferenceKind::QualifiedName => (resolver.resolve_qualified_name(node), start, end),
        ReferenceKind::ImportType => {
            let Some(arena) = program.arena(node.file) else {
                return Ok(None);
            };
            let Some((head_start, head_end)) = import_type_head(arena, node.node) else {
                return Ok(None);
            };
            let is_typeof = arena
                .get(node.node)
                .and_then(|n| arena.get_import_type(n))
                .is_some_and(|it| it.is_typeof);
            let resolved = resolver
                .resolve_import_type(node)
                .map(|path| if is_typeof { format!("typeof {path}") } else { path });
            (resolved, head_start, head_end)
        }
    };

    match resolved {
        Some(text) if text != written => Ok(Some(TextEdit::replace(start, end, text))),
        Some(_) => Ok(None),
        None if goes_through_bundled_module(program, node, kind) => Err(Diagnostic::warning(
            file_name(program, node),
            start,
            end - start,
            format_message(
                diagnostic_messages::NAMESPACE_IMPORT_NOT_FLATTENED,
                &[written],
            ),
            diagnostic_codes::NAMESPACE_IMPORT_NOT_FLATTENED,
        )),
        None => Ok(None),
    }
}

/// Whether a reference names a bundled module as a whole, which has no
/// top-level counterpart in the bundle.
fn goes_through_bundled_module(program: &Program, node: NodeRef, kind: ReferenceKind) -> bool {
    let module = match kind {
        ReferenceKind::ImportType => program.import_type_module(node),
        _ => {
            let Some(arena) = program.arena(node.file) else {
                return false;
            };
            let leftmost = dtsz_binder::program::leftmost_identifier(arena, node.node);
            program
                .symbol_at(NodeRef::new(node.file, leftmost))
                .map(|symbol| program.resolve_alias(symbol))
        }
    };
    module.is_some_and(|module| program.module_file(module).is_some())
}

fn node_span(program: &Program, node: NodeRef) -> Option<(u32, u32)> {
    let n = program.arena(node.file)?.get(node.node)?;
    Some((n.pos, n.end))
}

fn file_name(program: &Program, node: NodeRef) -> String {
    program
        .file(node.file)
        .map_or(String::new(), |f| f.file_name.clone())
}
