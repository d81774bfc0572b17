//! Snapshot persistence.
//!
//! The kernel's durable state is the hypergraph itself — every derived index
//! (type/arg/structure lookups, caches, activations, the event queue) is
//! reconstructed by replaying `addEdge` over the restored edges in ascending
//! `created_at` order, so [`Snapshot`] only needs to carry the edges and the
//! step counter, plus the config that produced them. JSON is used (rather than
//! `bincode`, which the teacher reserves for internal scratch formats) because
//! a snapshot is meant to be a readable interchange document, per the external
//! interface it implements.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::edge::Hyperedge;
use crate::error::PersistError;

pub const SNAPSHOT_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub timestamp: u64,
    pub config: Config,
    pub current_step: u64,
    pub edges: Vec<Hyperedge>,
}

impl Snapshot {
    pub fn new(config: Config, current_step: u64, timestamp: u64, edges: Vec<Hyperedge>) -> Self {
        Self { version: SNAPSHOT_VERSION.to_string(), timestamp, config, current_step, edges }
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        serde_json::to_string_pretty(self).map_err(|e| PersistError::Serialize { message: e.to_string() })
    }

    pub fn from_json(text: &str) -> Result<Self, PersistError> {
        let snapshot: Snapshot =
            serde_json::from_str(text).map_err(|e| PersistError::Deserialize { message: e.to_string() })?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SNAPSHOT_VERSION.to_string(),
                found: snapshot.version,
            });
        }
        Ok(snapshot)
    }

    /// Edges in the order they must be replayed through `addEdge` to
    /// reconstruct a hypergraph with identical derived indices: ascending
    /// creation time, so every referenced argument is created before anything
    /// that points at it (spec invariant 1's referential-integrity ordering).
    pub fn edges_in_replay_order(&self) -> Vec<&Hyperedge> {
        let mut edges: Vec<&Hyperedge> = self.edges.iter().collect();
        edges.sort_by_key(|e| e.created_at);
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::Budget;
    use crate::edge::Belief;
    use crate::term::EdgeType;
    use crate::truth::TruthValue;

    #[test]
    fn round_trip_preserves_edges() {
        let mut edge = Hyperedge::new("a".into(), EdgeType::Term, vec![], 0);
        edge.insert_belief(Belief::asserted(TruthValue::certain(), Budget::full(), 0), 8);
        let snapshot = Snapshot::new(Config::default(), 3, 100, vec![edge]);
        let json = snapshot.to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap();
        assert_eq!(restored.current_step, 3);
        assert_eq!(restored.edges.len(), 1);
    }

    #[test]
    fn version_mismatch_rejected() {
        let mut snapshot = Snapshot::new(Config::default(), 0, 0, vec![]);
        snapshot.version = "999".to_string();
        let json = snapshot.to_json().unwrap();
        let err = Snapshot::from_json(&json);
        assert!(matches!(err, Err(PersistError::VersionMismatch { .. })));
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(Snapshot::from_json("not json").is_err());
    }

    #[test]
    fn replay_order_is_ascending_creation_time() {
        let e1 = Hyperedge::new("a".into(), EdgeType::Term, vec![], 5);
        let e2 = Hyperedge::new("b".into(), EdgeType::Term, vec![], 1);
        let snapshot = Snapshot::new(Config::default(), 0, 0, vec![e1, e2]);
        let ordered = snapshot.edges_in_replay_order();
        assert_eq!(ordered[0].id, crate::term::EdgeId::from("b"));
        assert_eq!(ordered[1].id, crate::term::EdgeId::from("a"));
    }
}
