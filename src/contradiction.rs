//! Contradiction detection and resolution.
//!
//! Evidence is belief-scoped (the Open Question this resolves): conflicting
//! assertions about the same edge are ranked by each belief's own
//! [`Belief::evidence_score`], not by a pooled evidence ledger shared across
//! every belief on the edge. `analyze()` walks an edge's belief list and
//! reports every pair whose frequencies diverge beyond a threshold.

use crate::edge::Belief;
use crate::error::ContradictionError;
use crate::hypergraph::Hypergraph;
use crate::term::EdgeId;

/// A detected disagreement between two beliefs attached to the same edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ContradictionReport {
    pub edge: EdgeId,
    pub frequency_a: f64,
    pub frequency_b: f64,
    pub index_a: usize,
    pub index_b: usize,
}

pub struct ContradictionManager {
    /// Surfaced, not-yet-acknowledged contradiction reports, FIFO.
    pending: Vec<ContradictionReport>,
    contradiction_threshold: f64,
}

impl ContradictionManager {
    pub fn new(contradiction_threshold: f64) -> Self {
        Self {
            pending: Vec::new(),
            contradiction_threshold,
        }
    }

    /// Scan an edge's beliefs for pairwise frequency divergence beyond
    /// `contradiction_threshold`. Non-blocking: callers decide whether and
    /// when to act on what's returned.
    pub fn analyze(&mut self, hypergraph: &Hypergraph, edge: &EdgeId) -> Vec<ContradictionReport> {
        let Some(hyperedge) = hypergraph.get(edge) else { return Vec::new() };
        let mut found = Vec::new();
        for i in 0..hyperedge.beliefs.len() {
            for j in (i + 1)..hyperedge.beliefs.len() {
                let fa = hyperedge.beliefs[i].truth.frequency();
                let fb = hyperedge.beliefs[j].truth.frequency();
                if (fa - fb).abs() > self.contradiction_threshold {
                    found.push(ContradictionReport {
                        edge: edge.clone(),
                        frequency_a: fa,
                        frequency_b: fb,
                        index_a: i,
                        index_b: j,
                    });
                }
            }
        }
        self.pending.extend(found.iter().cloned());
        found
    }

    /// Resolve a contradiction on `edge` by keeping only the belief with the
    /// highest [`Belief::evidence_score`], discarding the rest. Returns the
    /// surviving belief.
    pub fn resolve<'a>(
        &mut self,
        hypergraph_beliefs: &'a mut Vec<Belief>,
        edge: &EdgeId,
    ) -> Result<&'a Belief, ContradictionError> {
        if hypergraph_beliefs.len() < 2 {
            return Err(ContradictionError::NothingToResolve { edge: edge.to_string() });
        }
        let winner = hypergraph_beliefs
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.evidence_score()
                    .partial_cmp(&b.evidence_score())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
            .expect("non-empty");
        let kept = hypergraph_beliefs.swap_remove(winner);
        hypergraph_beliefs.clear();
        hypergraph_beliefs.push(kept);
        self.pending.retain(|r| &r.edge != edge);
        Ok(&hypergraph_beliefs[0])
    }

    pub fn pending(&self) -> &[ContradictionReport] {
        &self.pending
    }

    pub fn take_pending(&mut self) -> Vec<ContradictionReport> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::Budget;
    use crate::term::EdgeType;
    use crate::truth::TruthValue;

    fn hypergraph_with_conflict() -> Hypergraph {
        let mut hg = Hypergraph::new(8);
        hg.ensure_atom("a".into(), 0);
        hg.ensure_atom("b".into(), 0);
        hg.add_edge(
            "Inheritance(a,b)".into(),
            EdgeType::Inheritance,
            vec!["a".into(), "b".into()],
            Belief::asserted(TruthValue::new(0.9, 0.8), Budget::full(), 0),
            0,
        )
        .unwrap();
        hg.add_edge(
            "Inheritance(a,b)".into(),
            EdgeType::Inheritance,
            vec!["a".into(), "b".into()],
            Belief::asserted(TruthValue::new(0.1, 0.8), Budget::full(), 1),
            1,
        )
        .unwrap();
        hg
    }

    #[test]
    fn analyze_detects_divergent_beliefs() {
        let hg = hypergraph_with_conflict();
        let mut cm = ContradictionManager::new(0.3);
        let reports = cm.analyze(&hg, &"Inheritance(a,b)".into());
        assert_eq!(reports.len(), 1);
        assert!(!cm.pending().is_empty());
    }

    #[test]
    fn analyze_ignores_close_frequencies() {
        let mut hg = Hypergraph::new(8);
        hg.ensure_atom("a".into(), 0);
        hg.ensure_atom("b".into(), 0);
        hg.add_edge(
            "Inheritance(a,b)".into(),
            EdgeType::Inheritance,
            vec!["a".into(), "b".into()],
            Belief::asserted(TruthValue::new(0.8, 0.8), Budget::full(), 0),
            0,
        )
        .unwrap();
        hg.add_edge(
            "Inheritance(a,b)".into(),
            EdgeType::Inheritance,
            vec!["a".into(), "b".into()],
            Belief::asserted(TruthValue::new(0.85, 0.8), Budget::full(), 1),
            1,
        )
        .unwrap();
        let mut cm = ContradictionManager::new(0.3);
        let reports = cm.analyze(&hg, &"Inheritance(a,b)".into());
        assert!(reports.is_empty());
    }

    #[test]
    fn resolve_keeps_highest_evidence_score() {
        let mut beliefs = vec![
            Belief::asserted(TruthValue::new(0.9, 0.8), Budget::full(), 0),
            Belief::asserted(TruthValue::new(0.1, 0.9), Budget::full(), 1),
        ];
        let mut cm = ContradictionManager::new(0.3);
        let kept = cm.resolve(&mut beliefs, &"Inheritance(a,b)".into()).unwrap().clone();
        assert_eq!(beliefs.len(), 1);
        assert!((kept.truth.frequency() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn resolve_with_fewer_than_two_beliefs_errors() {
        let mut beliefs = vec![Belief::asserted(TruthValue::unknown(), Budget::full(), 0)];
        let mut cm = ContradictionManager::new(0.3);
        let err = cm.resolve(&mut beliefs, &"x".into());
        assert!(matches!(err, Err(ContradictionError::NothingToResolve { .. })));
    }
}
