//! Importance scoring and deterministic forgetting.
//!
//! When the hypergraph exceeds its edge capacity, the lowest-scoring edges are
//! forgotten. Ties are broken by ascending [`EdgeId`] (the Open Question this
//! resolves) so that forgetting is fully deterministic given the same graph
//! state, rather than depending on hash-map iteration order.
//!
//! Importance is a *persisted* score, not a value recomputed fresh from
//! current state each time it's read: every maintenance tick it decays
//! multiplicatively by `decay_factor`, then gains an additive boost from this
//! tick's components. An edge that stops mattering fades out over several
//! ticks rather than vanishing the instant its activation drops; an edge an
//! outstanding `ask()` still needs gets topped back up every tick it stays
//! referenced, which is what gives it forgetting protection.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::error::MemoryError;
use crate::hypergraph::Hypergraph;
use crate::index::Indices;
use crate::term::EdgeId;

/// Weights applied to the components of an edge's importance boost each tick.
#[derive(Debug, Clone, Copy)]
pub struct ImportanceWeights {
    pub expectation: f64,
    pub activation: f64,
    /// Boost for an edge referenced (as a bound slot) by an outstanding `ask()`.
    pub question: f64,
    /// Boost for an edge that was a premise in a recent successful learning experience.
    pub success: f64,
    /// Boost for an edge currently on the context/goal stack.
    pub context: f64,
}

impl Default for ImportanceWeights {
    fn default() -> Self {
        Self { expectation: 0.4, activation: 0.25, question: 0.15, success: 0.1, context: 0.1 }
    }
}

pub struct MemoryManager {
    capacity: usize,
    weights: ImportanceWeights,
    decay_factor: f64,
    scores: HashMap<EdgeId, f64>,
}

impl MemoryManager {
    pub fn new(capacity: usize, decay_factor: f64) -> Result<Self, MemoryError> {
        if capacity == 0 {
            return Err(MemoryError::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            weights: ImportanceWeights::default(),
            decay_factor: decay_factor.clamp(0.0, 1.0),
            scores: HashMap::new(),
        })
    }

    pub fn with_weights(mut self, weights: ImportanceWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Advance every edge currently in the hypergraph by one maintenance
    /// tick: decay its persisted score, then add this tick's weighted boost.
    /// Edges that have since been removed from the hypergraph are dropped
    /// from the score table.
    pub fn tick(
        &mut self,
        hypergraph: &Hypergraph,
        indices: &Indices,
        question_edges: &HashSet<EdgeId>,
        success_edges: &HashSet<EdgeId>,
        context_edges: &HashSet<EdgeId>,
    ) {
        for edge in hypergraph.iter() {
            let expectation = edge.strongest().map(|b| b.expectation()).unwrap_or(0.0);
            let activation = indices.activation(&edge.id);
            let boost = self.weights.expectation * expectation
                + self.weights.activation * activation
                + if question_edges.contains(&edge.id) { self.weights.question } else { 0.0 }
                + if success_edges.contains(&edge.id) { self.weights.success } else { 0.0 }
                + if context_edges.contains(&edge.id) { self.weights.context } else { 0.0 };
            let prior = self.scores.get(&edge.id).copied().unwrap_or(0.0);
            self.scores.insert(edge.id.clone(), prior * self.decay_factor + boost);
        }
        self.scores.retain(|id, _| hypergraph.contains(id));
    }

    /// The persisted importance score for `id`, or `0.0` if it's never been
    /// through a [`Self::tick`].
    pub fn importance(&self, id: &EdgeId) -> f64 {
        self.scores.get(id).copied().unwrap_or(0.0)
    }

    /// If the hypergraph exceeds `capacity`, return the ids of the
    /// lowest-scoring edges to forget, enough to bring it back within
    /// capacity. Ties broken by ascending `EdgeId` for determinism.
    pub fn select_for_forgetting(&self, hypergraph: &Hypergraph) -> Vec<EdgeId> {
        let over = hypergraph.len().saturating_sub(self.capacity);
        if over == 0 {
            return Vec::new();
        }
        let mut scored: Vec<(EdgeId, f64)> =
            hypergraph.iter().map(|e| (e.id.clone(), self.importance(&e.id))).collect();
        scored.sort_by(|(id_a, score_a), (id_b, score_b)| {
            score_a
                .partial_cmp(score_b)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| id_a.cmp(id_b))
        });
        scored.into_iter().take(over).map(|(id, _)| id).collect()
    }

    /// Allocate a priority budget boost proportional to importance, for use
    /// when re-seeding the event queue from a persisted snapshot.
    pub fn allocate_resources(&self, importances: &[(EdgeId, f64)], total_budget: f64) -> Vec<(EdgeId, f64)> {
        let sum: f64 = importances.iter().map(|(_, i)| i.max(0.0)).sum();
        if sum <= f64::EPSILON {
            let share = total_budget / importances.len().max(1) as f64;
            return importances.iter().map(|(id, _)| (id.clone(), share)).collect();
        }
        importances
            .iter()
            .map(|(id, importance)| (id.clone(), total_budget * importance.max(0.0) / sum))
            .collect()
    }
}
