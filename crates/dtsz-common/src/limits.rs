//! Centralized limits and thresholds.
//!
//! Shared guards against pathological input. Anything that walks a chain the
//! input controls (aliases, parents, nesting) is capped by one of these.

/// Maximum number of alias hops followed before giving up.
///
/// `export { A as B }` chains and re-exports through `export *` can form
/// cycles in malformed input.
pub const MAX_ALIAS_CHAIN_DEPTH: usize = 64;

/// Maximum number of parent hops when walking from a node to its file.
pub const MAX_SCOPE_WALK_ITERATIONS: usize = 10_000;

/// Maximum nesting depth of types and statements in the parser.
pub const MAX_PARSER_RECURSION_DEPTH: u32 = 500;

/// Maximum number of files the program builder will load from disk.
pub const MAX_PROGRAM_FILES: usize = 50_000;
