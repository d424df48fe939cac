//! Symbols, symbol tables and the symbol arena.
//!
//! Symbols live in one `SymbolArena` per program so that a `SymbolId` is a
//! stable identity across every file. Declarations are recorded as
//! `NodeRef`s because a `NodeIndex` alone is only meaningful inside the arena
//! of the file that produced it.

use dtsz_parser::NodeIndex;
use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;

/// Symbol flags, following TypeScript's `SymbolFlags` bit layout.
pub mod symbol_flags {
    pub const NONE: u32 = 0;
    pub const FUNCTION_SCOPED_VARIABLE: u32 = 1 << 0;
    pub const BLOCK_SCOPED_VARIABLE: u32 = 1 << 1;
    pub const PROPERTY: u32 = 1 << 2;
    pub const ENUM_MEMBER: u32 = 1 << 3;
    pub const FUNCTION: u32 = 1 << 4;
    pub const CLASS: u32 = 1 << 5;
    pub const INTERFACE: u32 = 1 << 6;
    pub const CONST_ENUM: u32 = 1 << 7;
    pub const REGULAR_ENUM: u32 = 1 << 8;
    pub const VALUE_MODULE: u32 = 1 << 9;
    pub const NAMESPACE_MODULE: u32 = 1 << 10;
    pub const TYPE_LITERAL: u32 = 1 << 11;
    pub const OBJECT_LITERAL: u32 = 1 << 12;
    pub const METHOD: u32 = 1 << 13;
    pub const CONSTRUCTOR: u32 = 1 << 14;
    pub const GET_ACCESSOR: u32 = 1 << 15;
    pub const SET_ACCESSOR: u32 = 1 << 16;
    pub const SIGNATURE: u32 = 1 << 17;
    pub const TYPE_PARAMETER: u32 = 1 << 18;
    pub const TYPE_ALIAS: u32 = 1 << 19;
    pub const EXPORT_VALUE: u32 = 1 << 20;
    pub const ALIAS: u32 = 1 << 21;
    pub const PROTOTYPE: u32 = 1 << 22;
    pub const EXPORT_STAR: u32 = 1 << 23;
    pub const OPTIONAL: u32 = 1 << 24;
    pub const TRANSIENT: u32 = 1 << 25;

    pub const ENUM: u32 = REGULAR_ENUM | CONST_ENUM;
    pub const VARIABLE: u32 = FUNCTION_SCOPED_VARIABLE | BLOCK_SCOPED_VARIABLE;
    pub const VALUE: u32 = VARIABLE
        | PROPERTY
        | ENUM_MEMBER
        | OBJECT_LITERAL
        | FUNCTION
        | CLASS
        | ENUM
        | VALUE_MODULE
        | METHOD
        | GET_ACCESSOR
        | SET_ACCESSOR;
    pub const TYPE: u32 =
        CLASS | INTERFACE | ENUM | ENUM_MEMBER | TYPE_LITERAL | TYPE_PARAMETER | TYPE_ALIAS;
    pub const NAMESPACE: u32 = VALUE_MODULE | NAMESPACE_MODULE | ENUM;
    pub const MODULE: u32 = VALUE_MODULE | NAMESPACE_MODULE;
}

/// Index of a file in a `Program`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FileId(pub u32);

/// A node together with the file whose arena owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeRef {
    pub file: FileId,
    pub node: NodeIndex,
}

impl NodeRef {
    #[inline]
    pub fn new(file: FileId, node: NodeIndex) -> NodeRef {
        NodeRef { file, node }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub const NONE: SymbolId = SymbolId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

/// A declared entity.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub flags: u32,
    pub escaped_name: String,
    /// Every declaration site; merged declarations append here.
    pub declarations: SmallVec<[NodeRef; 1]>,
    pub value_declaration: Option<NodeRef>,
    /// Enclosing namespace or module symbol, `NONE` at file level
    pub parent: SymbolId,
    /// Exported members of namespaces, modules and enums
    pub exports: Option<Box<SymbolTable>>,
    pub is_exported: bool,
    pub is_type_only: bool,
    /// Module specifier of an import or re-export alias
    pub import_module: Option<String>,
    /// Name imported from `import_module`; `None` imports the whole module
    pub import_name: Option<String>,
    /// Entity name (identifier or qualified name) an alias points at, for
    /// `export { A as B }`, `export default A`, `export = A`, `import B = A.C`
    pub alias_entity: Option<NodeRef>,
    /// `export * from "..."` specifiers of module symbols, in source order
    pub star_exports: Vec<String>,
}

impl Symbol {
    pub fn new(flags: u32, escaped_name: String) -> Symbol {
        Symbol {
            flags,
            escaped_name,
            declarations: SmallVec::new(),
            value_declaration: None,
            parent: SymbolId::NONE,
            exports: None,
            is_exported: false,
            is_type_only: false,
            import_module: None,
            import_name: None,
            alias_entity: None,
            star_exports: Vec::new(),
        }
    }

    #[inline]
    pub fn has_flags(&self, flags: u32) -> bool {
        self.flags & flags != 0
    }

    /// First declaration site, if any.
    #[inline]
    pub fn first_declaration(&self) -> Option<NodeRef> {
        self.declarations.first().copied()
    }

    pub fn add_declaration(&mut self, declaration: NodeRef) {
        if !self.declarations.contains(&declaration) {
            self.declarations.push(declaration);
        }
        if self.value_declaration.is_none() && self.flags & symbol_flags::VALUE != 0 {
            self.value_declaration = Some(declaration);
        }
    }

    pub fn exports_mut(&mut self) -> &mut SymbolTable {
        self.exports.get_or_insert_with(Default::default)
    }
}

/// Arena of every symbol in a program.
#[derive(Clone, Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn new() -> SymbolArena {
        SymbolArena::default()
    }

    pub fn alloc(&mut self, flags: u32, escaped_name: String) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol::new(flags, escaped_name));
        id
    }

    #[inline]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        if id.is_none() {
            None
        } else {
            self.symbols.get(id.0 as usize)
        }
    }

    #[inline]
    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        if id.is_none() {
            None
        } else {
            self.symbols.get_mut(id.0 as usize)
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, sym)| (SymbolId(i as u32), sym))
    }
}

/// Name to symbol map that preserves insertion order.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    table: IndexMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.table.get(name).copied()
    }

    pub fn set(&mut self, name: String, id: SymbolId) {
        self.table.insert(name, id);
    }

    #[inline]
    pub fn has(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SymbolId)> {
        self.table.iter()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
