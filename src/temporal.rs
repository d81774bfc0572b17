//! Allen's interval algebra: the thirteen qualitative relations between two
//! time intervals, their composition table, and a constraint-propagation
//! reasoner built on top of them.
//!
//! Neither the teacher nor any reference material in this workspace ships an
//! Allen composition table. Rather than hand-transcribe the standard
//! 13x13 table (Allen, 1983) and risk a transcription error in one of its 169
//! cells, `compose` derives each entry from first principles: every relation
//! is a unique pattern of `<`/`=`/`>` comparisons between the two intervals'
//! endpoints, and composing two relations is a feasibility question over a
//! difference-constraint graph on the three intervals' four endpoints. This
//! is the closed algebra invariant 6 requires — every one of the 169 pairs
//! resolves to *some* (possibly large) set of relations, never a silent empty
//! "no entry" gap.

use std::collections::HashMap;
use std::collections::HashSet;

use crate::error::TemporalError;
use crate::term::EdgeId;

/// One of Allen's thirteen basic relations between two intervals `(a, b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllenRelation {
    Before,
    After,
    Meets,
    MetBy,
    Overlaps,
    OverlappedBy,
    Starts,
    StartedBy,
    During,
    Contains,
    Finishes,
    FinishedBy,
    Equals,
}

impl AllenRelation {
    pub fn token(&self) -> &'static str {
        match self {
            AllenRelation::Before => "before",
            AllenRelation::After => "after",
            AllenRelation::Meets => "meets",
            AllenRelation::MetBy => "metBy",
            AllenRelation::Overlaps => "overlaps",
            AllenRelation::OverlappedBy => "overlappedBy",
            AllenRelation::Starts => "starts",
            AllenRelation::StartedBy => "startedBy",
            AllenRelation::During => "during",
            AllenRelation::Contains => "contains",
            AllenRelation::Finishes => "finishes",
            AllenRelation::FinishedBy => "finishedBy",
            AllenRelation::Equals => "equals",
        }
    }

    pub fn parse(token: &str) -> Result<Self, TemporalError> {
        Ok(match token {
            "before" => AllenRelation::Before,
            "after" => AllenRelation::After,
            "meets" => AllenRelation::Meets,
            "metBy" => AllenRelation::MetBy,
            "overlaps" => AllenRelation::Overlaps,
            "overlappedBy" => AllenRelation::OverlappedBy,
            "starts" => AllenRelation::Starts,
            "startedBy" => AllenRelation::StartedBy,
            "during" => AllenRelation::During,
            "contains" => AllenRelation::Contains,
            "finishes" => AllenRelation::Finishes,
            "finishedBy" => AllenRelation::FinishedBy,
            "equals" => AllenRelation::Equals,
            other => return Err(TemporalError::UnknownRelation { token: other.to_string() }),
        })
    }

    /// The converse relation: `r` holds between `(a,b)` iff `inverse(r)` holds
    /// between `(b,a)`.
    pub fn inverse(&self) -> Self {
        match self {
            AllenRelation::Before => AllenRelation::After,
            AllenRelation::After => AllenRelation::Before,
            AllenRelation::Meets => AllenRelation::MetBy,
            AllenRelation::MetBy => AllenRelation::Meets,
            AllenRelation::Overlaps => AllenRelation::OverlappedBy,
            AllenRelation::OverlappedBy => AllenRelation::Overlaps,
            AllenRelation::Starts => AllenRelation::StartedBy,
            AllenRelation::StartedBy => AllenRelation::Starts,
            AllenRelation::During => AllenRelation::Contains,
            AllenRelation::Contains => AllenRelation::During,
            AllenRelation::Finishes => AllenRelation::FinishedBy,
            AllenRelation::FinishedBy => AllenRelation::Finishes,
            AllenRelation::Equals => AllenRelation::Equals,
        }
    }

    pub fn all() -> [AllenRelation; 13] {
        [
            AllenRelation::Before,
            AllenRelation::After,
            AllenRelation::Meets,
            AllenRelation::MetBy,
            AllenRelation::Overlaps,
            AllenRelation::OverlappedBy,
            AllenRelation::Starts,
            AllenRelation::StartedBy,
            AllenRelation::During,
            AllenRelation::Contains,
            AllenRelation::Finishes,
            AllenRelation::FinishedBy,
            AllenRelation::Equals,
        ]
    }

    /// This relation's endpoint signature: `[cmp(lo,lo'), cmp(lo,hi'), cmp(hi,lo'), cmp(hi,hi')]`
    /// for two intervals `(lo,hi)` and `(lo',hi')`, each comparison in
    /// `{-1,0,1}`. Given the invariants `lo<hi` and `lo'<hi'`, this signature
    /// uniquely identifies the relation — it's what `compose` reasons over.
    fn signature(&self) -> [i8; 4] {
        use AllenRelation::*;
        match self {
            Before => [-1, -1, -1, -1],
            After => [1, 1, 1, 1],
            Meets => [-1, -1, 0, -1],
            MetBy => [1, 0, 1, 1],
            Overlaps => [-1, -1, 1, -1],
            OverlappedBy => [1, -1, 1, 1],
            Starts => [0, -1, 1, -1],
            StartedBy => [0, -1, 1, 1],
            During => [1, -1, 1, -1],
            Contains => [-1, -1, 1, 1],
            Finishes => [1, -1, 1, 0],
            FinishedBy => [-1, -1, 1, 0],
            Equals => [0, -1, 1, 0],
        }
    }
}

const A_LO: usize = 0;
const A_HI: usize = 1;
const B_LO: usize = 2;
const B_HI: usize = 3;
const C_LO: usize = 4;
const C_HI: usize = 5;

/// Encode `cmp(x,y) == sign` as difference-constraint edges `(from, to, gap)`
/// meaning `value[to] >= value[from] + gap`.
fn sign_edges(x: usize, y: usize, sign: i8) -> Vec<(usize, usize, i64)> {
    match sign {
        -1 => vec![(x, y, 1)],
        0 => vec![(x, y, 0), (y, x, 0)],
        1 => vec![(y, x, 1)],
        _ => unreachable!("signature comparisons are always -1, 0, or 1"),
    }
}

fn edges_for(lo1: usize, hi1: usize, lo2: usize, hi2: usize, sig: [i8; 4]) -> Vec<(usize, usize, i64)> {
    let mut edges = Vec::with_capacity(4);
    edges.extend(sign_edges(lo1, lo2, sig[0]));
    edges.extend(sign_edges(lo1, hi2, sig[1]));
    edges.extend(sign_edges(hi1, lo2, sig[2]));
    edges.extend(sign_edges(hi1, hi2, sig[3]));
    edges
}

/// Whether a set of `value[to] >= value[from] + gap` constraints over 6 nodes
/// has a solution, via Bellman-Ford longest-path relaxation: a further
/// relaxation possible after `n-1` rounds means a positive-weight cycle, i.e.
/// a node required to exceed itself — infeasible.
fn feasible(edges: &[(usize, usize, i64)]) -> bool {
    const N: usize = 6;
    let mut dist = [0i64; N];
    for _ in 0..N - 1 {
        for &(from, to, gap) in edges {
            if dist[to] < dist[from] + gap {
                dist[to] = dist[from] + gap;
            }
        }
    }
    edges.iter().all(|&(from, to, gap)| dist[to] >= dist[from] + gap)
}

/// Composition of two relations: every relation consistent with `a r1 b` and
/// `b r2 c` implying some relation between `a` and `c`. Always returns at
/// least one relation (the algebra is closed) — an empty-seeming case instead
/// returns the full 13-relation set, meaning "unconstrained".
pub fn compose(r1: AllenRelation, r2: AllenRelation) -> Vec<AllenRelation> {
    let mut base = vec![(A_LO, A_HI, 1), (B_LO, B_HI, 1), (C_LO, C_HI, 1)];
    base.extend(edges_for(A_LO, A_HI, B_LO, B_HI, r1.signature()));
    base.extend(edges_for(B_LO, B_HI, C_LO, C_HI, r2.signature()));

    AllenRelation::all()
        .into_iter()
        .filter(|candidate| {
            let mut edges = base.clone();
            edges.extend(edges_for(A_LO, A_HI, C_LO, C_HI, candidate.signature()));
            feasible(&edges)
        })
        .collect()
}

/// Propagation state for the pairwise constraints placed on intervals by
/// `addConstraint`: which relations between `a` and `b` remain consistent.
pub struct TemporalReasoner {
    /// `(a, b)` with `a < b` lexicographically -> the set of relations from
    /// `a`'s point of view that are still consistent.
    constraints: HashMap<(EdgeId, EdgeId), HashSet<AllenRelation>>,
    horizon: f64,
    max_propagation_iterations: usize,
}

impl TemporalReasoner {
    pub fn new(horizon: f64) -> Self {
        Self { constraints: HashMap::new(), horizon, max_propagation_iterations: 1_000 }
    }

    pub fn with_max_propagation_iterations(mut self, max_propagation_iterations: usize) -> Self {
        self.max_propagation_iterations = max_propagation_iterations.max(1);
        self
    }

    fn key(a: &EdgeId, b: &EdgeId) -> ((EdgeId, EdgeId), bool) {
        if a <= b {
            ((a.clone(), b.clone()), false)
        } else {
            ((b.clone(), a.clone()), true)
        }
    }

    /// Record that `relation` holds between `a` and `b`. Rejects the
    /// constraint if it contradicts a previously recorded relation between the
    /// same pair (the set of consistent relations would become empty).
    pub fn add_constraint(
        &mut self,
        a: EdgeId,
        relation: AllenRelation,
        b: EdgeId,
    ) -> Result<(), TemporalError> {
        let (key, flipped) = Self::key(&a, &b);
        let stored_relation = if flipped { relation.inverse() } else { relation };

        let entry = self.constraints.entry(key).or_insert_with(|| {
            AllenRelation::all().into_iter().collect()
        });
        if !entry.contains(&stored_relation) {
            return Err(TemporalError::ContradictoryConstraint {
                a: a.to_string(),
                b: b.to_string(),
                relation: relation.token().to_string(),
            });
        }
        entry.clear();
        entry.insert(stored_relation);
        Ok(())
    }

    /// The relation known to hold between `a` and `b`, if a unique one has
    /// been established (directly or via a previous `add_constraint` call).
    pub fn relation_between(&self, a: &EdgeId, b: &EdgeId) -> Option<AllenRelation> {
        let (key, flipped) = Self::key(a, b);
        let set = self.constraints.get(&key)?;
        if set.len() != 1 {
            return None;
        }
        let rel = *set.iter().next().unwrap();
        Some(if flipped { rel.inverse() } else { rel })
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// BFS through known pairwise relations to infer a relation between `a`
    /// and `c` via a chain of intermediate intervals, using [`compose`].
    /// Bounded by `max_propagation_iterations` dequeues to keep a densely
    /// constrained network from blowing up the search.
    pub fn infer_relationship(&self, a: &EdgeId, c: &EdgeId) -> Option<AllenRelation> {
        if let Some(direct) = self.relation_between(a, c) {
            return Some(direct);
        }
        let mut visited = HashSet::new();
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((a.clone(), None::<AllenRelation>));
        visited.insert(a.clone());

        let mut iterations = 0;
        while let Some((current, acc)) = queue.pop_front() {
            iterations += 1;
            if iterations > self.max_propagation_iterations {
                break;
            }
            for ((x, y), _) in self.constraints.iter() {
                let (neighbor, rel_from_current) = if x == &current {
                    (y.clone(), self.relation_between(&current, y))
                } else if y == &current {
                    (x.clone(), self.relation_between(&current, x))
                } else {
                    continue;
                };
                if visited.contains(&neighbor) {
                    continue;
                }
                let Some(rel) = rel_from_current else { continue };
                let composed = match acc {
                    None => Some(rel),
                    Some(prior) => compose(prior, rel).into_iter().next(),
                };
                if neighbor == *c {
                    return composed;
                }
                visited.insert(neighbor.clone());
                queue.push_back((neighbor, composed));
            }
        }
        None
    }

    /// Exponentially decay confidence in a relation the further `steps_ahead`
    /// projects beyond the reasoner's horizon, modelling prediction uncertainty.
    pub fn predict(&self, base_confidence: f64, steps_ahead: f64) -> f64 {
        let decay = (-steps_ahead / self.horizon.max(f64::EPSILON)).exp();
        (base_confidence * decay).clamp(0.0, 1.0)
    }

    pub fn adjust_horizon(&mut self, new_horizon: f64) {
        self.horizon = new_horizon.max(f64::EPSILON);
    }

    pub fn horizon(&self) -> f64 {
        self.horizon
    }
}
