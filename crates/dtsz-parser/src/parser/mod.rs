//! Declaration parser: thin-node AST plus a recursive descent `ParserState`.

pub mod base;
pub mod flags;
pub mod node;
mod node_access;
mod state;
mod state_statements;
mod state_types;
pub mod syntax_kind_ext;

pub use base::{NodeIndex, NodeList};
pub use flags::{modifier_flags, node_flags};
pub use state::ParserState;
