//! TypeScript declaration scanner/tokenizer for dtsz.
//!
//! This crate provides the lexical analysis phase:
//! - `SyntaxKind` - Token types
//! - `ScannerState` - Tokenizer state machine
//! - keyword lookup helpers

mod syntax_kind;
pub use syntax_kind::*;

mod scanner;
pub use scanner::{ScannerDiagnostic, ScannerSnapshot, ScannerState, skip_trivia, token_flags};

#[cfg(test)]
#[path = "tests/scanner_tests.rs"]
mod scanner_tests;
