//! Hyperedges and the beliefs they carry.
//!
//! An edge is identified by its canonical [`EdgeId`] and holds a bounded,
//! expectation-sorted list of [`Belief`]s — alternative, possibly conflicting
//! justified assertions about the same statement.

use serde::{Deserialize, Serialize};

use crate::budget::Budget;
use crate::term::{EdgeId, EdgeType};
use crate::truth::TruthValue;

/// A single piece of evidence attached to a belief, per spec §4.6 (evidence is
/// belief-scoped — the Open Question that earlier source variants disagreed on).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub source: Option<String>,
    pub strength: f64,
    pub evidence_type: String,
    pub added_at: u64,
}

impl Evidence {
    pub fn new(strength: f64, evidence_type: impl Into<String>, added_at: u64) -> Self {
        Self {
            source: None,
            strength: strength.clamp(0.0, 1.0),
            evidence_type: evidence_type.into(),
            added_at,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// A truth-valued, budgeted, justified assertion attached to an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Belief {
    pub truth: TruthValue,
    pub budget: Budget,
    /// Ids of the hyperedges that justified this belief; empty for asserted/root beliefs.
    pub premises: Vec<EdgeId>,
    /// Name of the rule that produced this belief, or `None` for an asserted belief.
    pub derived_by: Option<String>,
    pub timestamp: u64,
    pub evidence: Vec<Evidence>,
}

impl Belief {
    pub fn asserted(truth: TruthValue, budget: Budget, timestamp: u64) -> Self {
        Self {
            truth,
            budget,
            premises: Vec::new(),
            derived_by: None,
            timestamp,
            evidence: Vec::new(),
        }
    }

    pub fn derived(
        truth: TruthValue,
        budget: Budget,
        premises: Vec<EdgeId>,
        derived_by: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        Self {
            truth,
            budget,
            premises,
            derived_by: Some(derived_by.into()),
            timestamp,
            evidence: Vec::new(),
        }
    }

    pub fn expectation(&self) -> f64 {
        self.truth.expectation()
    }

    /// `Σ strength` over this belief's own evidence plus its truth confidence —
    /// the score the contradiction manager ranks competing beliefs by.
    pub fn evidence_score(&self) -> f64 {
        self.evidence.iter().map(|e| e.strength).sum::<f64>() + self.truth.confidence()
    }
}

/// A typed n-ary relation holding a bounded, expectation-sorted list of beliefs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hyperedge {
    pub id: EdgeId,
    pub edge_type: EdgeType,
    pub args: Vec<EdgeId>,
    pub beliefs: Vec<Belief>,
    pub temporal: Option<(f64, f64)>,
    pub created_at: u64,
}

impl Hyperedge {
    pub fn new(id: EdgeId, edge_type: EdgeType, args: Vec<EdgeId>, created_at: u64) -> Self {
        Self {
            id,
            edge_type,
            args,
            beliefs: Vec::new(),
            temporal: None,
            created_at,
        }
    }

    /// The strongest belief (highest expectation), if any.
    pub fn strongest(&self) -> Option<&Belief> {
        self.beliefs.first()
    }

    /// Insert a belief. If its frequency is within `contradiction_threshold` of
    /// the current strongest belief's, the two are merged via
    /// [`TruthValue::revision`] into one belief in place, rather than kept as
    /// separate entries (spec §4.5 — revision on agreement, divergence kept
    /// separate for the contradiction manager to surface). Otherwise the new
    /// belief is pushed and the list re-sorted by descending expectation and
    /// trimmed to `capacity`. The dropped belief, if any, is the lowest-
    /// expectation one.
    pub fn insert_belief(&mut self, belief: Belief, capacity: usize, contradiction_threshold: f64) -> Option<Belief> {
        if let Some(strongest) = self.beliefs.first() {
            let delta = (strongest.truth.frequency() - belief.truth.frequency()).abs();
            if delta <= contradiction_threshold {
                let merged_truth = TruthValue::revision(strongest.truth, belief.truth);
                let mut merged = belief;
                merged.truth = merged_truth;
                merged.premises = self.beliefs[0]
                    .premises
                    .iter()
                    .cloned()
                    .chain(merged.premises)
                    .collect();
                merged.evidence = self.beliefs[0]
                    .evidence
                    .iter()
                    .cloned()
                    .chain(merged.evidence)
                    .collect();
                self.beliefs[0] = merged;
                self.beliefs
                    .sort_by(|a, b| b.expectation().partial_cmp(&a.expectation()).unwrap_or(std::cmp::Ordering::Equal));
                return None;
            }
        }
        self.beliefs.push(belief);
        self.beliefs
            .sort_by(|a, b| b.expectation().partial_cmp(&a.expectation()).unwrap_or(std::cmp::Ordering::Equal));
        if self.beliefs.len() > capacity {
            self.beliefs.pop()
        } else {
            None
        }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }
}
