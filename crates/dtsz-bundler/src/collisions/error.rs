use thiserror::Error;

/// Why a top-level name could not be allocated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollisionError {
    /// Declaration kind outside the renameable set, or the implicit global
    /// namespace. The caller skips the declaration.
    #[error("declaration '{name}' (symbol flags {flags:#x}) cannot be renamed")]
    UnsupportedEntity { name: String, flags: u32 },

    /// A node given as a top-level declaration name has no symbol. The module
    /// graph and the semantic model disagree, so bundling cannot continue.
    #[error("cannot find a symbol for top-level identifier '{identifier}' (from '{container}')")]
    MissingSymbol {
        identifier: String,
        container: String,
    },
}

impl CollisionError {
    /// Fatal errors abort the bundle; the rest are per-declaration.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CollisionError::MissingSymbol { .. })
    }
}
