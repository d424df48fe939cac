//! Name Allocator
//!
//! Gives every top-level entity of the bundle a name that is unique among
//! the entities registered so far and that does not shadow anything the
//! global scope already means. The first claimant of a name keeps it; later
//! claimants get `name$N`.
//!
//! Allocation is the first of two phases. `NameAllocator::finish` freezes the
//! result into `AllocatedNames`, which is all the reference resolver reads.

use super::error::CollisionError;
use crate::semantic::SemanticModel;
use dtsz_binder::{NodeRef, SymbolId, symbol_flags};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Symbol kinds that can be renamed.
pub const RENAMEABLE_FLAGS: u32 = symbol_flags::ALIAS
    | symbol_flags::VARIABLE
    | symbol_flags::CLASS
    | symbol_flags::ENUM
    | symbol_flags::FUNCTION
    | symbol_flags::INTERFACE
    | symbol_flags::MODULE
    | symbol_flags::TYPE_ALIAS;

/// Stand-in for `default`, which is not a valid declaration name.
pub const DEFAULT_NAME_REPLACEMENT: &str = "_default";

/// Separator between a name and its disambiguation index.
pub const SUFFIX_SEPARATOR: char = '$';

pub fn normalize_preferred_name(name: &str) -> &str {
    if name == "default" {
        DEFAULT_NAME_REPLACEMENT
    } else {
        name
    }
}

/// Allocation phase.
pub struct NameAllocator<'m, M: SemanticModel + ?Sized> {
    model: &'m M,
    /// Preferred name -> claimants and their allocated names, in claim order
    buckets: FxHashMap<String, IndexMap<SymbolId, String>>,
    /// Every name ever allocated per symbol
    generated: IndexMap<SymbolId, IndexSet<String>>,
    /// Allocated name -> owner
    owners: FxHashMap<String, SymbolId>,
}

impl<'m, M: SemanticModel + ?Sized> NameAllocator<'m, M> {
    pub fn new(model: &'m M) -> Self {
        NameAllocator {
            model,
            buckets: FxHashMap::default(),
            generated: IndexMap::new(),
            owners: FxHashMap::default(),
        }
    }

    /// Register the top-level declaration named by `name` (an identifier, or
    /// the declaration node itself for anonymous `export default`).
    pub fn add_top_level_identifier(&mut self, name: NodeRef) -> Result<String, CollisionError> {
        let Some(symbol) = self.model.symbol_at(name) else {
            return Err(CollisionError::MissingSymbol {
                identifier: self.model.node_text(name).to_string(),
                container: self.enclosing_construct(name),
            });
        };
        let symbol = self.model.aliased_symbol(symbol);
        let preferred = match self.model.node_text(name) {
            text if is_identifier_text(text) => text.to_string(),
            _ => self.model.symbol_name(symbol).to_string(),
        };
        self.register(symbol, &preferred)
    }

    /// Allocate (or return the already allocated) name of `symbol`.
    pub fn register(&mut self, symbol: SymbolId, preferred: &str) -> Result<String, CollisionError> {
        let flags = self.model.symbol_flags(symbol);
        if flags & RENAMEABLE_FLAGS == 0 || self.model.is_global_namespace(symbol) {
            return Err(CollisionError::UnsupportedEntity {
                name: preferred.to_string(),
                flags,
            });
        }

        let preferred = normalize_preferred_name(preferred);
        let bucket = self.buckets.entry(preferred.to_string()).or_default();
        if let Some(existing) = bucket.get(&symbol) {
            return Ok(existing.clone());
        }

        let mut index = bucket.len();
        let name = loop {
            let candidate = if index == 0 {
                preferred.to_string()
            } else {
                format!("{preferred}{SUFFIX_SEPARATOR}{index}")
            };
            let global = self.model.resolve_global_name(&candidate);
            let taken = self.owners.get(&candidate).copied();
            let collides = |owner: Option<SymbolId>| owner.is_some_and(|o| o != symbol);
            if !collides(global) && !collides(taken) {
                break candidate;
            }
            trace!(candidate, ?global, ?taken, "name candidate collides");
            index += 1;
        };

        debug!(symbol = symbol.0, preferred, name, "allocated top-level name");
        bucket.insert(symbol, name.clone());
        self.owners.insert(name.clone(), symbol);
        self.generated
            .entry(symbol)
            .or_default()
            .insert(name.clone());
        Ok(name)
    }

    /// Names allocated so far for `symbol`.
    pub fn names_of(&self, symbol: SymbolId) -> Option<&IndexSet<String>> {
        self.generated.get(&symbol)
    }

    /// End the allocation phase.
    pub fn finish(self) -> AllocatedNames {
        AllocatedNames {
            generated: self.generated,
        }
    }

    fn enclosing_construct(&self, node: NodeRef) -> String {
        let parent = self.model.parent_node(node).unwrap_or(node);
        let text = self.model.node_text(parent);
        let first_line = text.lines().next().unwrap_or("").trim();
        let mut out: String = first_line.chars().take(80).collect();
        if out.len() < first_line.len() {
            out.push_str("...");
        }
        out
    }
}

/// Frozen result of the allocation phase.
#[derive(Debug, Default, Clone)]
pub struct AllocatedNames {
    generated: IndexMap<SymbolId, IndexSet<String>>,
}

impl AllocatedNames {
    /// Every name allocated for `symbol`, in allocation order.
    pub fn names_of(&self, symbol: SymbolId) -> Option<&IndexSet<String>> {
        self.generated.get(&symbol).filter(|names| !names.is_empty())
    }

    /// First allocated name of `symbol`.
    pub fn name_of(&self, symbol: SymbolId) -> Option<&str> {
        self.names_of(symbol)?.first().map(String::as_str)
    }

    /// The allocated name that best matches `original`: the name itself,
    /// then the first `original$N`, then the first allocated name.
    pub fn preferred_name_of(&self, symbol: SymbolId, original: &str) -> Option<&str> {
        let names = self.names_of(symbol)?;
        let original = normalize_preferred_name(original);
        if let Some(exact) = names.get(original) {
            return Some(exact.as_str());
        }
        let prefix = format!("{original}{SUFFIX_SEPARATOR}");
        names
            .iter()
            .find(|name| name.starts_with(&prefix))
            .or_else(|| names.first())
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &IndexSet<String>)> {
        self.generated.iter().map(|(&id, names)| (id, names))
    }

    pub fn len(&self) -> usize {
        self.generated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generated.is_empty()
    }
}

fn is_identifier_text(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c == '$' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_default() {
        assert_eq!(normalize_preferred_name("default"), "_default");
        assert_eq!(normalize_preferred_name("Default"), "Default");
    }

    #[test]
    fn test_identifier_text() {
        assert!(is_identifier_text("Foo"));
        assert!(is_identifier_text("$x_1"));
        assert!(!is_identifier_text("export default class {}"));
        assert!(!is_identifier_text(""));
        assert!(!is_identifier_text("1abc"));
    }

    #[test]
    fn test_preferred_name_lookup() {
        let mut generated = IndexMap::new();
        let mut names = IndexSet::new();
        names.insert("Other".to_string());
        names.insert("Foo$2".to_string());
        generated.insert(SymbolId(1), names);
        let allocated = AllocatedNames { generated };

        assert_eq!(allocated.preferred_name_of(SymbolId(1), "Foo"), Some("Foo$2"));
        assert_eq!(allocated.preferred_name_of(SymbolId(1), "Bar"), Some("Other"));
        assert_eq!(allocated.preferred_name_of(SymbolId(2), "Foo"), None);
        assert_eq!(allocated.name_of(SymbolId(1)), Some("Other"));
    }
}
