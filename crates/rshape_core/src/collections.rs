//! Hash collection aliases.
//!
//! Scope tables, property maps and key sets must iterate in insertion order
//! (declaration order is observable in the resolved shapes), so they use
//! `indexmap` with the Fx hasher. Unordered side tables use `FxHashMap`.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxBuildHasher;

pub use rustc_hash::{FxHashMap, FxHashSet};

/// An insertion-ordered map using the Fx hasher.
pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// An insertion-ordered set using the Fx hasher.
pub type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_map_preserves_order() {
        let mut map: FxIndexMap<&str, u32> = FxIndexMap::default();
        map.insert("b", 1);
        map.insert("a", 2);
        map.insert("b", 3);
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(map["b"], 3);
    }

    #[test]
    fn test_index_set_dedupes() {
        let mut set: FxIndexSet<String> = FxIndexSet::default();
        set.insert("x".to_string());
        set.insert("y".to_string());
        assert!(!set.insert("x".to_string()));
        assert_eq!(set.len(), 2);
    }
}
