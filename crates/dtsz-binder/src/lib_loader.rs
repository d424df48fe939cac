//! Lib Loader - the built-in lib and the implicit global namespace.
//!
//! The default lib is embedded in the binary and bound into the program's
//! `lib_globals`. Names declared by bundled script files take precedence over
//! lib names when the program builds its global name table.

use crate::state::BinderState;
use crate::symbols::{SymbolId, SymbolTable, symbol_flags};
use dtsz_common::Diagnostic;
use dtsz_parser::{NodeArena, ParserState};

pub const DEFAULT_LIB_FILE_NAME: &str = "lib.d.ts";

/// Source of the embedded default lib.
pub const DEFAULT_LIB_SOURCE: &str = include_str!("../lib/lib.d.ts");

/// Name of the implicit global namespace symbol.
pub const GLOBAL_THIS_NAME: &str = "globalThis";

/// Parsed lib file.
pub struct LibFile {
    /// File name (e.g., "lib.d.ts")
    pub file_name: String,
    pub arena: NodeArena,
    pub diagnostics: Vec<Diagnostic>,
}

impl LibFile {
    /// Parse a lib file from source text.
    pub fn parse(file_name: impl Into<String>, source: &str) -> LibFile {
        let file_name = file_name.into();
        let mut parser = ParserState::new(file_name.clone(), source.to_string());
        parser.parse_source_file();
        let diagnostics = parser.get_diagnostics().to_vec();
        LibFile {
            file_name,
            arena: parser.into_arena(),
            diagnostics,
        }
    }
}

/// Parse the embedded default lib.
pub fn load_default_lib() -> LibFile {
    LibFile::parse(DEFAULT_LIB_FILE_NAME, DEFAULT_LIB_SOURCE)
}

/// Declare the synthetic `globalThis` namespace in the lib globals.
///
/// It has no declaration sites; the bundler never renames it.
pub fn declare_global_this(binder: &mut BinderState) -> SymbolId {
    if let Some(existing) = binder.lib_globals.get(GLOBAL_THIS_NAME) {
        return existing;
    }
    let sym_id = binder.symbols.alloc(
        symbol_flags::VALUE_MODULE | symbol_flags::NAMESPACE_MODULE,
        GLOBAL_THIS_NAME.to_string(),
    );
    binder
        .lib_globals
        .set(GLOBAL_THIS_NAME.to_string(), sym_id);
    sym_id
}

/// Merge lib symbols into a target symbol table.
///
/// Only adds names the target does not define, so program globals shadow
/// lib declarations of the same name.
pub fn merge_lib_symbols(target: &mut SymbolTable, lib_symbols: &SymbolTable) {
    for (name, &sym_id) in lib_symbols.iter() {
        if !target.has(name) {
            target.set(name.clone(), sym_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{FileId, SymbolArena};

    #[test]
    fn test_merge_lib_symbols_keeps_program_globals() {
        let mut arena = SymbolArena::new();
        let lib_promise = arena.alloc(symbol_flags::INTERFACE, "Promise".to_string());
        let lib_console = arena.alloc(symbol_flags::VARIABLE, "console".to_string());
        let user_promise = arena.alloc(symbol_flags::CLASS, "Promise".to_string());

        let mut lib = SymbolTable::new();
        lib.set("Promise".to_string(), lib_promise);
        lib.set("console".to_string(), lib_console);

        let mut target = SymbolTable::new();
        target.set("Promise".to_string(), user_promise);
        merge_lib_symbols(&mut target, &lib);

        assert_eq!(target.get("Promise"), Some(user_promise));
        assert_eq!(target.get("console"), Some(lib_console));
        assert_eq!(target.len(), 2);
    }

    #[test]
    fn test_default_lib_parses_cleanly() {
        let lib = load_default_lib();
        assert!(
            lib.diagnostics.is_empty(),
            "lib diagnostics: {:?}",
            lib.diagnostics
        );
    }

    #[test]
    fn test_default_lib_binds_common_globals() {
        let lib = load_default_lib();
        let mut binder = BinderState::new();
        binder.bind_lib_file(FileId(0), &lib.arena);
        for name in ["Array", "Promise", "Record", "Partial", "Map", "console"] {
            assert!(binder.lib_globals.has(name), "missing lib global {name}");
        }
        assert!(binder.globals.is_empty());

        let global_this = declare_global_this(&mut binder);
        let sym = binder.symbols.get(global_this).unwrap();
        assert!(sym.declarations.is_empty());
        assert_eq!(declare_global_this(&mut binder), global_this);
    }
}
