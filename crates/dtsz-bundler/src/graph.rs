//! Module Dependency Graph
//!
//! Program files reachable from the entry are modules; resolved relative
//! module specifiers are edges. The graph provides:
//! - Circular dependency detection (Tarjan)
//! - The emission order: dependencies before dependents, from the entry

use dtsz_binder::{FileId, ModuleTarget, Program};
use dtsz_common::diagnostics::diagnostic_messages;
use dtsz_common::{Diagnostic, diagnostic_codes, format_message};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Unique identifier for a module in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

/// Information about a module in the dependency graph
#[derive(Debug)]
pub struct ModuleInfo {
    pub id: ModuleId,
    pub file: FileId,
    pub path: PathBuf,
    /// Modules this module imports from, in specifier order
    pub dependencies: Vec<ModuleId>,
    /// Modules that import this module
    pub dependents: FxHashSet<ModuleId>,
}

/// A dependency edge in the module graph
#[derive(Debug, Clone)]
pub struct DependencyEdge {
    /// Source module (the importer)
    pub from: ModuleId,
    /// Target module (the importee)
    pub to: ModuleId,
    /// Import specifier used
    pub specifier: String,
}

/// Circular dependency information
#[derive(Debug, Clone)]
pub struct CircularDependency {
    /// Modules forming the cycle
    pub cycle: Vec<ModuleId>,
    /// File paths for display
    pub paths: Vec<PathBuf>,
}

/// Module dependency graph
#[derive(Debug, Default)]
pub struct ModuleGraph {
    modules: Vec<ModuleInfo>,
    file_to_id: FxHashMap<FileId, ModuleId>,
    edges: Vec<DependencyEdge>,
    entry_points: Vec<ModuleId>,
    circular_dependencies: Vec<CircularDependency>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph of every file reachable from `entry`.
    pub fn from_program(program: &Program, entry: FileId) -> Self {
        let mut graph = ModuleGraph::new();
        let Some(entry_file) = program.file(entry) else {
            return graph;
        };
        let entry_id = graph.add_module(entry, PathBuf::from(&entry_file.file_name));
        graph.add_entry_point(entry_id);

        let mut queue = VecDeque::from([entry]);
        let mut visited = FxHashSet::default();
        while let Some(file) = queue.pop_front() {
            if !visited.insert(file) {
                continue;
            }
            let Some(bindings) = program.binder.file_bindings(file) else {
                continue;
            };
            let from = graph.add_module(file, path_of(program, file));
            for (specifier, _) in &bindings.module_specifiers {
                let Some(&ModuleTarget::File(target)) = program.module_target(file, specifier)
                else {
                    continue;
                };
                let to = graph.add_module(target, path_of(program, target));
                graph.add_dependency(DependencyEdge {
                    from,
                    to,
                    specifier: specifier.clone(),
                });
                queue.push_back(target);
            }
        }
        debug!(modules = graph.len(), edges = graph.edges.len(), "built module graph");
        graph
    }

    /// Add or get a module by file
    pub fn add_module(&mut self, file: FileId, path: PathBuf) -> ModuleId {
        if let Some(&id) = self.file_to_id.get(&file) {
            return id;
        }
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(ModuleInfo {
            id,
            file,
            path,
            dependencies: Vec::new(),
            dependents: FxHashSet::default(),
        });
        self.file_to_id.insert(file, id);
        id
    }

    pub fn add_entry_point(&mut self, module_id: ModuleId) {
        if !self.entry_points.contains(&module_id) {
            self.entry_points.push(module_id);
        }
    }

    /// Add a dependency edge
    pub fn add_dependency(&mut self, edge: DependencyEdge) {
        if let Some(from_module) = self.modules.get_mut(edge.from.0 as usize)
            && !from_module.dependencies.contains(&edge.to)
        {
            from_module.dependencies.push(edge.to);
        }
        if let Some(to_module) = self.modules.get_mut(edge.to.0 as usize) {
            to_module.dependents.insert(edge.from);
        }
        self.edges.push(edge);
    }

    pub fn get_module(&self, id: ModuleId) -> Option<&ModuleInfo> {
        self.modules.get(id.0 as usize)
    }

    /// Detect circular dependencies using Tarjan's algorithm
    pub fn detect_circular_dependencies(&mut self) -> &[CircularDependency] {
        self.circular_dependencies.clear();

        let mut state = TarjanState {
            index_counter: 0,
            stack: Vec::new(),
            on_stack: vec![false; self.modules.len()],
            indices: vec![None; self.modules.len()],
            lowlinks: vec![0; self.modules.len()],
        };

        for v in 0..self.modules.len() {
            if state.indices[v].is_none() {
                self.strongconnect(v, &mut state);
            }
        }

        for cycle in &self.circular_dependencies {
            warn!(paths = ?cycle.paths, "circular module dependency");
        }
        &self.circular_dependencies
    }

    /// Tarjan's strongconnect helper
    fn strongconnect(&mut self, v: usize, state: &mut TarjanState) {
        state.indices[v] = Some(state.index_counter);
        state.lowlinks[v] = state.index_counter;
        state.index_counter += 1;

        state.stack.push(v);
        state.on_stack[v] = true;

        let deps: Vec<usize> = self.modules[v]
            .dependencies
            .iter()
            .map(|d| d.0 as usize)
            .collect();

        for w in deps {
            match state.indices[w] {
                None => {
                    self.strongconnect(w, state);
                    state.lowlinks[v] = state.lowlinks[v].min(state.lowlinks[w]);
                }
                Some(w_index) if state.on_stack[w] => {
                    state.lowlinks[v] = state.lowlinks[v].min(w_index);
                }
                Some(_) => {}
            }
        }

        // Root of SCC
        if Some(state.lowlinks[v]) == state.indices[v] {
            let mut scc = Vec::new();
            while let Some(w) = state.stack.pop() {
                state.on_stack[w] = false;
                scc.push(ModuleId(w as u32));
                if w == v {
                    break;
                }
            }
            scc.reverse();

            let is_self_loop = scc.len() == 1
                && self.modules[v].dependencies.contains(&ModuleId(v as u32));
            if scc.len() > 1 || is_self_loop {
                let paths = scc
                    .iter()
                    .filter_map(|id| self.get_module(*id).map(|m| m.path.clone()))
                    .collect();
                self.circular_dependencies
                    .push(CircularDependency { cycle: scc, paths });
            }
        }
    }

    /// Dependencies before dependents: a post-order walk from the entry
    /// points following dependencies in specifier order. Back edges of
    /// cycles are skipped, so every module appears exactly once.
    pub fn emission_order(&self) -> Vec<ModuleId> {
        let mut order = Vec::with_capacity(self.modules.len());
        let mut visited = vec![false; self.modules.len()];
        let roots = self
            .entry_points
            .iter()
            .copied()
            .chain(self.modules.iter().map(|m| m.id));

        for root in roots {
            if visited[root.0 as usize] {
                continue;
            }
            visited[root.0 as usize] = true;
            // (module, index of the next dependency to visit)
            let mut stack: Vec<(ModuleId, usize)> = vec![(root, 0)];
            while let Some((id, next)) = stack.pop() {
                let deps = &self.modules[id.0 as usize].dependencies;
                if let Some(&dep) = deps.get(next) {
                    stack.push((id, next + 1));
                    if !visited[dep.0 as usize] {
                        visited[dep.0 as usize] = true;
                        stack.push((dep, 0));
                    }
                } else {
                    order.push(id);
                }
            }
        }
        order
    }

    /// One warning per detected cycle.
    pub fn cycle_diagnostics(&self) -> Vec<Diagnostic> {
        self.circular_dependencies
            .iter()
            .map(|cycle| {
                let mut shown: Vec<String> =
                    cycle.paths.iter().map(|p| p.display().to_string()).collect();
                if let Some(first) = shown.first().cloned() {
                    shown.push(first);
                }
                let file = cycle
                    .paths
                    .first()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                Diagnostic::warning(
                    file,
                    0,
                    0,
                    format_message(
                        diagnostic_messages::CIRCULAR_MODULE_DEPENDENCY,
                        &[&shown.join(" -> ")],
                    ),
                    diagnostic_codes::CIRCULAR_MODULE_DEPENDENCY,
                )
            })
            .collect()
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleInfo> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }
}

struct TarjanState {
    index_counter: u32,
    stack: Vec<usize>,
    on_stack: Vec<bool>,
    indices: Vec<Option<u32>>,
    lowlinks: Vec<u32>,
}

fn path_of(program: &Program, file: FileId) -> PathBuf {
    program
        .file(file)
        .map(|f| PathBuf::from(&f.file_name))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(n: u32) -> (ModuleGraph, Vec<ModuleId>) {
        let mut graph = ModuleGraph::new();
        let ids = (0..n)
            .map(|i| graph.add_module(FileId(i), PathBuf::from(format!("/m/{i}.d.ts"))))
            .collect();
        (graph, ids)
    }

    fn edge(graph: &mut ModuleGraph, from: ModuleId, to: ModuleId) {
        graph.add_dependency(DependencyEdge {
            from,
            to,
            specifier: format!("./{}", to.0),
        });
    }

    #[test]
    fn test_module_graph_dedup() {
        let mut graph = ModuleGraph::new();
        let a1 = graph.add_module(FileId(0), PathBuf::from("/m/a.d.ts"));
        let a2 = graph.add_module(FileId(0), PathBuf::from("/m/a.d.ts"));
        assert_eq!(a1, a2);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_add_dependency() {
        let (mut graph, ids) = graph_with(2);
        edge(&mut graph, ids[0], ids[1]);
        edge(&mut graph, ids[0], ids[1]);
        assert_eq!(graph.get_module(ids[0]).unwrap().dependencies, vec![ids[1]]);
        assert!(graph.get_module(ids[1]).unwrap().dependents.contains(&ids[0]));
        assert_eq!(graph.edges().len(), 2);
    }

    #[test]
    fn test_circular_dependency_detection() {
        let (mut graph, ids) = graph_with(4);
        // 0 -> 1 -> 2 -> 0, 2 -> 3
        edge(&mut graph, ids[0], ids[1]);
        edge(&mut graph, ids[1], ids[2]);
        edge(&mut graph, ids[2], ids[0]);
        edge(&mut graph, ids[2], ids[3]);

        let cycles = graph.detect_circular_dependencies();
        assert_eq!(cycles.len(), 1);
        let mut cycle = cycles[0].cycle.clone();
        cycle.sort();
        assert_eq!(cycle, vec![ids[0], ids[1], ids[2]]);

        let diags = graph.cycle_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, diagnostic_codes::CIRCULAR_MODULE_DEPENDENCY);
        assert!(!diags[0].is_error());
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let (mut graph, ids) = graph_with(1);
        edge(&mut graph, ids[0], ids[0]);
        assert_eq!(graph.detect_circular_dependencies().len(), 1);
    }

    #[test]
    fn test_emission_order_puts_dependencies_first() {
        let (mut graph, ids) = graph_with(4);
        graph.add_entry_point(ids[0]);
        // 0 -> 1 -> 3, 0 -> 2 -> 3
        edge(&mut graph, ids[0], ids[1]);
        edge(&mut graph, ids[0], ids[2]);
        edge(&mut graph, ids[1], ids[3]);
        edge(&mut graph, ids[2], ids[3]);

        assert_eq!(graph.emission_order(), vec![ids[3], ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn test_emission_order_with_cycle_lists_each_module_once() {
        let (mut graph, ids) = graph_with(3);
        graph.add_entry_point(ids[0]);
        edge(&mut graph, ids[0], ids[1]);
        edge(&mut graph, ids[1], ids[2]);
        edge(&mut graph, ids[2], ids[1]);

        assert_eq!(graph.emission_order(), vec![ids[2], ids[1], ids[0]]);
    }
}
