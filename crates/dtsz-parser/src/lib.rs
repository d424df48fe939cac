//! Declaration-file parser for dtsz.
//!
//! This crate provides:
//! - `NodeArena` - thin 16-byte node headers with typed data pools
//! - `ParserState` - recursive descent parser for `.d.ts` syntax
//! - `syntax_kind_ext` - node kinds layered above the scanner's token kinds

pub mod parser;

pub use parser::{
    NodeIndex, NodeList, ParserState, modifier_flags, node::Node, node::NodeArena, node_flags,
    syntax_kind_ext,
};
