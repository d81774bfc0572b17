//! The hyperedge store: the single source of truth for edges and their beliefs.
//!
//! Grounded on the teacher's `graph/index.rs` id-indexed store, adapted from a
//! concurrently-accessed `DashMap` to a plain single-owner map — the kernel is
//! driven by a single cooperative event loop (spec §5), so there is no need to
//! pay for interior concurrency here; `dashmap` remains a workspace dependency
//! for the contradiction manager's cross-edge scratch tables.

use std::collections::HashMap;

use crate::budget::Budget;
use crate::edge::{Belief, Hyperedge};
use crate::error::HypergraphError;
use crate::term::{EdgeId, EdgeType};

/// Outcome of [`Hypergraph::add_edge`]: whether the edge was freshly created or
/// an existing edge received a new belief (and whether a prior belief was
/// evicted to keep it within its capacity).
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Created,
    Revised { evicted: Option<Belief> },
}

/// The hyperedge store. Owns every edge by value; all other components hold
/// only [`EdgeId`]s and look edges up here.
pub struct Hypergraph {
    edges: HashMap<EdgeId, Hyperedge>,
    belief_capacity: usize,
    contradiction_threshold: f64,
}

impl Hypergraph {
    pub fn new(belief_capacity: usize) -> Self {
        Self {
            edges: HashMap::new(),
            belief_capacity: belief_capacity.max(1),
            contradiction_threshold: 0.5,
        }
    }

    /// Set the `|Δfrequency|` threshold below which a colliding belief is
    /// merged via revision rather than kept as a separate entry.
    pub fn with_contradiction_threshold(mut self, contradiction_threshold: f64) -> Self {
        self.contradiction_threshold = contradiction_threshold;
        self
    }

    pub fn get(&self, id: &EdgeId) -> Option<&Hyperedge> {
        self.edges.get(id)
    }

    pub fn contains(&self, id: &EdgeId) -> bool {
        self.edges.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hyperedge> {
        self.edges.values()
    }

    /// Validate that every argument id already exists in the store (spec
    /// invariant 1: referential integrity — no hyperedge may reference a
    /// non-existent argument id).
    pub fn check_args_exist(&self, args: &[EdgeId]) -> Result<(), HypergraphError> {
        for arg in args {
            if !self.edges.contains_key(arg) {
                return Err(HypergraphError::DanglingArgument { arg: arg.to_string() });
            }
        }
        Ok(())
    }

    /// Insert or revise an edge. If the edge already exists, the new belief is
    /// merged in via [`Hyperedge::insert_belief`] rather than replacing the
    /// edge outright, per spec §3's "hyperedges are append-only with respect to
    /// belief history" invariant.
    ///
    /// Atoms (arity-0 terms outside the type system, i.e. plain names used only
    /// as arguments) are auto-created as `Term`-typed unary edges referencing
    /// themselves is not required — callers must pre-register atom ids via
    /// [`Self::ensure_atom`] before referencing them as arguments.
    pub fn add_edge(
        &mut self,
        id: EdgeId,
        edge_type: EdgeType,
        args: Vec<EdgeId>,
        belief: Belief,
        created_at: u64,
    ) -> Result<AddOutcome, HypergraphError> {
        edge_type.check_arity(args.len())?;
        self.check_args_exist(&args)?;

        if let Some(existing) = self.edges.get_mut(&id) {
            if existing.edge_type != edge_type || existing.args != args {
                return Err(HypergraphError::StructuralMismatch { id: id.to_string() });
            }
            let evicted = existing.insert_belief(belief, self.belief_capacity, self.contradiction_threshold);
            return Ok(AddOutcome::Revised { evicted });
        }

        let mut edge = Hyperedge::new(id.clone(), edge_type, args, created_at);
        edge.insert_belief(belief, self.belief_capacity, self.contradiction_threshold);
        self.edges.insert(id, edge);
        Ok(AddOutcome::Created)
    }

    /// Register a bare atom as a zero-argument `Term` edge carrying a certain
    /// belief, idempotently. Atoms are the leaves every compound ultimately
    /// references.
    pub fn ensure_atom(&mut self, id: EdgeId, created_at: u64) {
        let contradiction_threshold = self.contradiction_threshold;
        self.edges.entry(id.clone()).or_insert_with(|| {
            let mut edge = Hyperedge::new(id, EdgeType::Term, Vec::new(), created_at);
            edge.insert_belief(
                Belief::asserted(crate::truth::TruthValue::certain(), Budget::full(), created_at),
                1,
                contradiction_threshold,
            );
            edge
        });
    }

    /// Permanently remove an edge, used by the memory manager's forgetting pass.
    /// Callers are responsible for first removing it from every derived index.
    pub fn remove(&mut self, id: &EdgeId) -> Option<Hyperedge> {
        self.edges.remove(id)
    }
}
