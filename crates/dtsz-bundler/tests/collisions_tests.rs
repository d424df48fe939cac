//! Collision resolver tests against a hand-built semantic model.

use dtsz_binder::{FileId, NodeRef, SymbolId, symbol_flags};
use dtsz_bundler::collisions::{CollisionError, NameAllocator, ReferenceResolver, ScopeLocator};
use dtsz_bundler::{ScopeContainer, SemanticModel};
use dtsz_common::diagnostic_codes;
use dtsz_parser::NodeIndex;
use rustc_hash::FxHashMap;
use std::cell::RefCell;

struct MockNode {
    parent: Option<NodeRef>,
    container: ScopeContainer,
    text: String,
    symbol: Option<SymbolId>,
    leftmost: Option<NodeRef>,
}

struct MockSymbol {
    name: String,
    flags: u32,
    declarations: Vec<NodeRef>,
    alias_of: Option<SymbolId>,
}

struct Declared {
    symbol: SymbolId,
    decl: NodeRef,
    name: NodeRef,
}

/// One file; node 0 is the file itself.
struct MockModel {
    nodes: Vec<MockNode>,
    symbols: Vec<MockSymbol>,
    globals: RefCell<FxHashMap<String, SymbolId>>,
    global_namespace: Option<SymbolId>,
}

impl MockModel {
    fn new() -> Self {
        MockModel {
            nodes: vec![MockNode {
                parent: None,
                container: ScopeContainer::Boundary,
                text: String::new(),
                symbol: None,
                leftmost: None,
            }],
            symbols: Vec::new(),
            globals: RefCell::new(FxHashMap::default()),
            global_namespace: None,
        }
    }

    fn root(&self) -> NodeRef {
        NodeRef::new(FileId(0), NodeIndex(0))
    }

    fn add_node(
        &mut self,
        parent: NodeRef,
        container: ScopeContainer,
        text: &str,
        symbol: Option<SymbolId>,
    ) -> NodeRef {
        self.nodes.push(MockNode {
            parent: Some(parent),
            container,
            text: text.to_string(),
            symbol,
            leftmost: None,
        });
        NodeRef::new(FileId(0), NodeIndex(self.nodes.len() as u32 - 1))
    }

    fn add_symbol(&mut self, name: &str, flags: u32) -> SymbolId {
        self.symbols.push(MockSymbol {
            name: name.to_string(),
            flags,
            declarations: Vec::new(),
            alias_of: None,
        });
        SymbolId(self.symbols.len() as u32 - 1)
    }

    fn declare_in(&mut self, parent: NodeRef, name: &str, flags: u32, container: ScopeContainer) -> Declared {
        let symbol = self.add_symbol(name, flags);
        let decl = self.add_node(parent, container, &format!("declare {name} {{"), Some(symbol));
        let name = self.add_node(decl, ScopeContainer::Transparent, name, Some(symbol));
        self.symbols[symbol.0 as usize].declarations.push(decl);
        Declared { symbol, decl, name }
    }

    fn declare(&mut self, parent: NodeRef, name: &str, flags: u32) -> Declared {
        self.declare_in(parent, name, flags, ScopeContainer::Transparent)
    }

    fn namespace(&mut self, parent: NodeRef, name: &str) -> Declared {
        self.declare_in(parent, name, symbol_flags::NAMESPACE_MODULE, ScopeContainer::Namespace)
    }

    /// Another declaration site of an existing symbol.
    fn redeclare(&mut self, symbol: SymbolId, parent: NodeRef) -> NodeRef {
        let name = self.symbols[symbol.0 as usize].name.clone();
        let decl = self.add_node(parent, ScopeContainer::Transparent, &name, Some(symbol));
        self.symbols[symbol.0 as usize].declarations.push(decl);
        self.add_node(decl, ScopeContainer::Transparent, &name, Some(symbol))
    }

    fn alias(&mut self, parent: NodeRef, name: &str, target: SymbolId) -> Declared {
        let declared = self.declare(parent, name, symbol_flags::ALIAS);
        self.symbols[declared.symbol.0 as usize].alias_of = Some(target);
        declared
    }

    fn reference(&mut self, parent: NodeRef, text: &str, symbol: Option<SymbolId>) -> NodeRef {
        self.add_node(parent, ScopeContainer::Transparent, text, symbol)
    }

    fn qualified(
        &mut self,
        parent: NodeRef,
        text: &str,
        symbol: Option<SymbolId>,
        leftmost_symbol: Option<SymbolId>,
    ) -> NodeRef {
        let qualified = self.add_node(parent, ScopeContainer::Transparent, text, symbol);
        let head = text.split('.').next().unwrap_or(text).to_string();
        let leftmost = self.add_node(qualified, ScopeContainer::Transparent, &head, leftmost_symbol);
        self.nodes[qualified.node.0 as usize].leftmost = Some(leftmost);
        qualified
    }

    /// A symbol only the global scope knows about.
    fn global(&mut self, name: &str, flags: u32) -> SymbolId {
        let symbol = self.add_symbol(name, flags);
        self.globals.borrow_mut().insert(name.to_string(), symbol);
        symbol
    }

    fn node(&self, node: NodeRef) -> Option<&MockNode> {
        self.nodes.get(node.node.0 as usize)
    }
}

impl SemanticModel for MockModel {
    fn symbol_at(&self, node: NodeRef) -> Option<SymbolId> {
        self.node(node)?.symbol
    }

    fn symbol_flags(&self, symbol: SymbolId) -> u32 {
        self.symbols.get(symbol.0 as usize).map_or(0, |s| s.flags)
    }

    fn symbol_name(&self, symbol: SymbolId) -> &str {
        self.symbols.get(symbol.0 as usize).map_or("", |s| s.name.as_str())
    }

    fn aliased_symbol(&self, symbol: SymbolId) -> SymbolId {
        let mut current = symbol;
        while let Some(next) = self.symbols.get(current.0 as usize).and_then(|s| s.alias_of) {
            current = next;
        }
        current
    }

    fn declarations(&self, symbol: SymbolId) -> &[NodeRef] {
        self.symbols
            .get(symbol.0 as usize)
            .map_or(&[], |s| s.declarations.as_slice())
    }

    fn resolve_global_name(&self, name: &str) -> Option<SymbolId> {
        self.globals.borrow().get(name).copied()
    }

    fn is_global_namespace(&self, symbol: SymbolId) -> bool {
        self.global_namespace == Some(symbol)
    }

    fn parent_node(&self, node: NodeRef) -> Option<NodeRef> {
        self.node(node)?.parent
    }

    fn scope_container(&self, node: NodeRef) -> ScopeContainer {
        self.node(node).map_or(ScopeContainer::Transparent, |n| n.container)
    }

    fn node_text(&self, node: NodeRef) -> &str {
        self.node(node).map_or("", |n| n.text.as_str())
    }

    fn leftmost_identifier(&self, name: NodeRef) -> NodeRef {
        self.node(name).and_then(|n| n.leftmost).unwrap_or(name)
    }

    fn file_name(&self, _file: FileId) -> &str {
        "/mock.d.ts"
    }

    fn node_span(&self, node: NodeRef) -> (u32, u32) {
        (node.node.0, 1)
    }
}

// =============================================================================
// Name Allocator
// =============================================================================

#[test]
fn test_second_claimant_gets_suffix_and_registration_is_idempotent() {
    let mut model = MockModel::new();
    let root = model.root();
    let x = model.declare(root, "Foo", symbol_flags::CLASS).symbol;
    let y = model.declare(root, "Foo", symbol_flags::INTERFACE).symbol;

    let mut allocator = NameAllocator::new(&model);
    assert_eq!(allocator.register(x, "Foo").unwrap(), "Foo");
    assert_eq!(allocator.register(y, "Foo").unwrap(), "Foo$1");
    assert_eq!(allocator.register(y, "Foo").unwrap(), "Foo$1");
    assert_eq!(allocator.register(x, "Foo").unwrap(), "Foo");
    assert_eq!(allocator.names_of(y).map(|names| names.len()), Some(1));
}

#[test]
fn test_third_claimant_after_global_appears() {
    let mut model = MockModel::new();
    let root = model.root();
    let x = model.declare(root, "Foo", symbol_flags::CLASS).symbol;
    let y = model.declare(root, "Foo", symbol_flags::INTERFACE).symbol;
    let w = model.declare(root, "Foo", symbol_flags::TYPE_ALIAS).symbol;
    let z = model.add_symbol("Foo$1", symbol_flags::INTERFACE);

    let mut allocator = NameAllocator::new(&model);
    assert_eq!(allocator.register(x, "Foo").unwrap(), "Foo");
    assert_eq!(allocator.register(y, "Foo").unwrap(), "Foo$1");
    model.globals.borrow_mut().insert("Foo$1".to_string(), z);
    assert_eq!(allocator.register(w, "Foo").unwrap(), "Foo$2");
}

#[test]
fn test_candidate_taken_by_global_is_skipped() {
    let mut model = MockModel::new();
    let root = model.root();
    model.global("Foo$1", symbol_flags::INTERFACE);
    model.global("Promise", symbol_flags::INTERFACE | symbol_flags::VARIABLE);
    let x = model.declare(root, "Foo", symbol_flags::CLASS).symbol;
    let w = model.declare(root, "Foo", symbol_flags::CLASS).symbol;
    let promise = model.declare(root, "Promise", symbol_flags::INTERFACE).symbol;

    let mut allocator = NameAllocator::new(&model);
    assert_eq!(allocator.register(x, "Foo").unwrap(), "Foo");
    assert_eq!(allocator.register(w, "Foo").unwrap(), "Foo$2");
    assert_eq!(allocator.register(promise, "Promise").unwrap(), "Promise$1");
}

#[test]
fn test_global_meaning_of_the_same_entity_is_not_a_collision() {
    let mut model = MockModel::new();
    let root = model.root();
    let x = model.declare(root, "Foo", symbol_flags::CLASS).symbol;
    model.globals.borrow_mut().insert("Foo".to_string(), x);

    let mut allocator = NameAllocator::new(&model);
    assert_eq!(allocator.register(x, "Foo").unwrap(), "Foo");
}

#[test]
fn test_names_are_unique_within_a_bucket() {
    let mut model = MockModel::new();
    let root = model.root();
    let symbols: Vec<SymbolId> = (0..5)
        .map(|_| model.declare(root, "A", symbol_flags::FUNCTION).symbol)
        .collect();
    model.global("A$2", symbol_flags::VARIABLE);

    let mut allocator = NameAllocator::new(&model);
    let names: Vec<String> = symbols
        .iter()
        .map(|&s| allocator.register(s, "A").unwrap())
        .collect();
    assert_eq!(names, vec!["A", "A$1", "A$3", "A$4", "A$5"]);
}

#[test]
fn test_default_is_never_allocated() {
    let mut model = MockModel::new();
    let root = model.root();
    let first = model.declare(root, "default", symbol_flags::CLASS).symbol;
    let second = model.declare(root, "default", symbol_flags::FUNCTION).symbol;

    let mut allocator = NameAllocator::new(&model);
    assert_eq!(allocator.register(first, "default").unwrap(), "_default");
    assert_eq!(allocator.register(second, "default").unwrap(), "_default$1");
}

#[test]
fn test_unsupported_entities_are_rejected_without_mutation() {
    let mut model = MockModel::new();
    let root = model.root();
    let parameter = model.declare(root, "T", symbol_flags::TYPE_PARAMETER).symbol;
    let global_this = model.declare(root, "globalThis", symbol_flags::VALUE_MODULE).symbol;
    model.global_namespace = Some(global_this);

    let mut allocator = NameAllocator::new(&model);
    let err = allocator.register(parameter, "T").unwrap_err();
    assert!(matches!(err, CollisionError::UnsupportedEntity { ref name, .. } if name == "T"));
    assert!(!err.is_fatal());
    assert!(matches!(
        allocator.register(global_this, "globalThis"),
        Err(CollisionError::UnsupportedEntity { .. })
    ));
    assert!(allocator.names_of(parameter).is_none());
    assert!(allocator.finish().is_empty());
}

#[test]
fn test_missing_symbol_is_fatal_and_names_the_container() {
    let mut model = MockModel::new();
    let root = model.root();
    let ns = model.namespace(root, "Outer");
    let orphan = model.reference(ns.decl, "Ghost", None);

    let mut allocator = NameAllocator::new(&model);
    let err = allocator.add_top_level_identifier(orphan).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(
        err,
        CollisionError::MissingSymbol {
            identifier: "Ghost".to_string(),
            container: "declare Outer {".to_string(),
        }
    );
    assert!(err.to_string().contains("'Ghost'"));
}

#[test]
fn test_top_level_identifier_uses_aliased_entity_and_merges_declarations() {
    let mut model = MockModel::new();
    let root = model.root();
    let foo = model.declare(root, "Foo", symbol_flags::INTERFACE);
    let merged = model.redeclare(foo.symbol, root);
    let reexport = model.alias(root, "Foo", foo.symbol);

    let mut allocator = NameAllocator::new(&model);
    assert_eq!(allocator.add_top_level_identifier(foo.name).unwrap(), "Foo");
    assert_eq!(allocator.add_top_level_identifier(merged).unwrap(), "Foo");
    assert_eq!(allocator.add_top_level_identifier(reexport.name).unwrap(), "Foo");
    let names = allocator.finish();
    assert_eq!(names.len(), 1);
    assert_eq!(names.name_of(foo.symbol), Some("Foo"));
}

#[test]
fn test_entity_keeps_every_allocated_name_in_order() {
    let mut model = MockModel::new();
    let root = model.root();
    let other = model.declare(root, "Bar", symbol_flags::CLASS).symbol;
    let x = model.declare(root, "Foo", symbol_flags::CLASS).symbol;

    let mut allocator = NameAllocator::new(&model);
    allocator.register(other, "Bar").unwrap();
    assert_eq!(allocator.register(x, "Foo").unwrap(), "Foo");
    assert_eq!(allocator.register(x, "Bar").unwrap(), "Bar$1");
    let names = allocator.finish();

    let all: Vec<&str> = names
        .names_of(x)
        .unwrap()
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(all, vec!["Foo", "Bar$1"]);
    assert_eq!(names.name_of(x), Some("Foo"));
    assert_eq!(names.preferred_name_of(x, "Bar"), Some("Bar$1"));
    assert_eq!(names.preferred_name_of(x, "Baz"), Some("Foo"));
}

// =============================================================================
// Scope Locator
// =============================================================================

#[test]
fn test_scope_paths_are_outermost_first_and_stop_at_boundaries() {
    let mut model = MockModel::new();
    let root = model.root();
    let outer = model.namespace(root, "Outer");
    let inner = model.namespace(outer.decl, "Inner");
    let leaf = model.declare(inner.decl, "Leaf", symbol_flags::INTERFACE);
    let ambient = model.add_node(root, ScopeContainer::Boundary, "declare module \"m\" {", None);
    let in_ambient = model.namespace(ambient, "Ambient");
    let deep = model.declare(in_ambient.decl, "Deep", symbol_flags::CLASS);
    let implicit = model.add_symbol("Implicit", symbol_flags::INTERFACE);

    let mut scopes = ScopeLocator::new(&model);
    assert_eq!(scopes.scope_of_symbol(leaf.symbol).as_slice(), &[outer.symbol, inner.symbol]);
    assert_eq!(scopes.scope_of_symbol(outer.symbol).as_slice(), &[] as &[SymbolId]);
    assert_eq!(scopes.scope_of_node(leaf.name).as_slice(), &[outer.symbol, inner.symbol]);
    assert_eq!(scopes.scope_of_symbol(deep.symbol).as_slice(), &[in_ambient.symbol]);
    assert!(scopes.scope_of_symbol(implicit).is_empty());
    assert!(scopes.diagnostics().is_empty());
}

#[test]
fn test_inconsistent_declaration_scopes_are_reported_once() {
    let mut model = MockModel::new();
    let root = model.root();
    let first = model.namespace(root, "A");
    let second = model.namespace(root, "B");
    let split = model.declare(first.decl, "Split", symbol_flags::INTERFACE);
    model.redeclare(split.symbol, second.decl);

    let mut scopes = ScopeLocator::new(&model);
    assert_eq!(scopes.scope_of_symbol(split.symbol).as_slice(), &[first.symbol]);
    assert_eq!(scopes.scope_of_symbol(split.symbol).as_slice(), &[first.symbol]);

    let diagnostics = scopes.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, diagnostic_codes::INCONSISTENT_DECLARATION_SCOPES);
    assert!(diagnostics[0].message_text.contains("'Split'"));
    assert_eq!(diagnostics[0].related_information.len(), 1);
    assert!(scopes.diagnostics().is_empty());
}

// =============================================================================
// Reference Resolver
// =============================================================================

/// `namespace Ns { interface Opt {} }` claimed second, after another `Ns`.
struct NamespaceFixture {
    model: MockModel,
    ns: Declared,
    opt: Declared,
    other_ns: SymbolId,
}

fn namespace_fixture() -> NamespaceFixture {
    let mut model = MockModel::new();
    let root = model.root();
    let other_ns = model.namespace(root, "Ns").symbol;
    let ns = model.namespace(root, "Ns");
    let opt = model.declare(ns.decl, "Opt", symbol_flags::INTERFACE);
    NamespaceFixture {
        model,
        ns,
        opt,
        other_ns,
    }
}

fn allocate(model: &MockModel, symbols: &[(SymbolId, &str)]) -> dtsz_bundler::AllocatedNames {
    let mut allocator = NameAllocator::new(model);
    for &(symbol, preferred) in symbols {
        allocator.register(symbol, preferred).unwrap();
    }
    allocator.finish()
}

#[test]
fn test_reference_inside_declaring_namespace_is_unchanged() {
    let mut fixture = namespace_fixture();
    let site = fixture.model.declare(fixture.ns.decl, "User", symbol_flags::INTERFACE);
    let reference = fixture.model.reference(site.decl, "Opt", Some(fixture.opt.symbol));
    let model = &fixture.model;
    let names = allocate(model, &[(fixture.other_ns, "Ns"), (fixture.ns.symbol, "Ns")]);

    let mut resolver = ReferenceResolver::new(model, &names);
    assert_eq!(resolver.resolve_identifier(reference).as_deref(), Some("Opt"));
}

#[test]
fn test_qualified_reference_from_outside_renames_leftmost_segment() {
    let mut fixture = namespace_fixture();
    let root = fixture.model.root();
    let user = fixture.model.declare(root, "User", symbol_flags::INTERFACE);
    let reference = fixture.model.qualified(
        user.decl,
        "Ns.Opt",
        Some(fixture.opt.symbol),
        Some(fixture.ns.symbol),
    );
    let model = &fixture.model;
    let names = allocate(model, &[(fixture.other_ns, "Ns"), (fixture.ns.symbol, "Ns")]);

    let mut resolver = ReferenceResolver::new(model, &names);
    assert_eq!(resolver.resolve_qualified_name(reference).as_deref(), Some("Ns$1.Opt"));
}

#[test]
fn test_simple_reference_to_nested_entity_gets_qualified() {
    let mut fixture = namespace_fixture();
    let root = fixture.model.root();
    let import = fixture.model.alias(root, "Option", fixture.opt.symbol);
    let user = fixture.model.declare(root, "User", symbol_flags::INTERFACE);
    let reference = fixture.model.reference(user.decl, "Option", Some(import.symbol));
    let model = &fixture.model;
    let names = allocate(model, &[(fixture.other_ns, "Ns"), (fixture.ns.symbol, "Ns")]);

    let mut resolver = ReferenceResolver::new(model, &names);
    assert_eq!(resolver.resolve_identifier(reference).as_deref(), Some("Ns$1.Opt"));
}

#[test]
fn test_qualified_rewrite_touches_only_the_first_segment() {
    let mut model = MockModel::new();
    let root = model.root();
    let first_a = model.namespace(root, "A").symbol;
    let a = model.namespace(root, "A");
    let b = model.namespace(a.decl, "B");
    let c = model.declare(b.decl, "C", symbol_flags::CLASS);
    let user = model.declare(root, "User", symbol_flags::INTERFACE);
    let reference = model.qualified(user.decl, "A.B.C", Some(c.symbol), Some(a.symbol));
    let spaced = model.qualified(user.decl, "A . B.C", Some(c.symbol), Some(a.symbol));
    let names = allocate(&model, &[(first_a, "A"), (a.symbol, "A")]);

    let mut resolver = ReferenceResolver::new(&model, &names);
    assert_eq!(resolver.resolve_qualified_name(reference).as_deref(), Some("A$1.B.C"));
    assert_eq!(resolver.resolve_qualified_name(spaced).as_deref(), Some("A$1.B.C"));
}

#[test]
fn test_unregistered_and_symbolless_references_are_left_alone() {
    let mut model = MockModel::new();
    let root = model.root();
    let map = model.global("Map", symbol_flags::INTERFACE);
    let user = model.declare(root, "User", symbol_flags::INTERFACE);
    let global_ref = model.reference(user.decl, "Map", Some(map));
    let nothing = model.reference(user.decl, "x", None);
    let names = allocate(&model, &[(user.symbol, "User")]);

    let mut resolver = ReferenceResolver::new(&model, &names);
    assert_eq!(resolver.resolve_identifier(global_ref), None);
    assert_eq!(resolver.resolve_identifier(nothing), None);
    assert_eq!(resolver.resolve_qualified_name(nothing), None);
}

#[test]
fn test_qualified_reference_through_namespace_import_flattens() {
    let mut model = MockModel::new();
    let root = model.root();
    let other = model.declare(root, "Thing", symbol_flags::CLASS).symbol;
    let thing = model.declare(root, "Thing", symbol_flags::CLASS).symbol;
    let module = model.add_symbol("\"./things\"", symbol_flags::VALUE_MODULE);
    let star = model.alias(root, "Things", module);
    let user = model.declare(root, "User", symbol_flags::INTERFACE);
    let reference = model.qualified(user.decl, "Things.Thing", Some(thing), Some(star.symbol));
    let names = allocate(&model, &[(other, "Thing"), (thing, "Thing")]);

    let mut resolver = ReferenceResolver::new(&model, &names);
    assert_eq!(resolver.resolve_qualified_name(reference).as_deref(), Some("Thing$1"));
}

#[test]
fn test_entity_path_names_nested_entities_from_top_level() {
    let mut fixture = namespace_fixture();
    let inner = fixture.model.namespace(fixture.ns.decl, "Inner");
    let deep = fixture.model.declare(inner.decl, "Deep", symbol_flags::TYPE_ALIAS);
    let model = &fixture.model;
    let names = allocate(model, &[(fixture.other_ns, "Ns"), (fixture.ns.symbol, "Ns")]);

    let mut resolver = ReferenceResolver::new(model, &names);
    assert_eq!(resolver.resolve_entity_path(deep.symbol).as_deref(), Some("Ns$1.Inner.Deep"));
    assert_eq!(resolver.resolve_entity_path(fixture.ns.symbol).as_deref(), Some("Ns$1"));
    assert!(resolver.take_diagnostics().is_empty());
}
