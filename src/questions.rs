//! The `ask` machinery: step-counted, cooperatively-polled questions.
//!
//! The kernel runs a single synchronous event loop and never yields to a wall
//! clock between steps (spec §5), so an `ask()` "timeout" is realized as a
//! budget of kernel steps rather than real time — a caller polls
//! [`QuestionTable::poll`] after each `step`/`run` call until it gets back
//! [`AskOutcome::Answered`] or [`AskOutcome::TimedOut`].

use std::collections::HashMap;
use std::collections::HashSet;

use crate::hypergraph::Hypergraph;
use crate::pattern::{match_pattern, Match, QueryPattern, Slot};
use crate::term::EdgeId;

#[derive(Debug, Clone)]
pub struct PendingQuestion {
    pub pattern: QueryPattern,
    pub created_step: u64,
    pub timeout_steps: u64,
}

#[derive(Debug, Clone)]
pub enum AskOutcome {
    Answered(Vec<Match>),
    Pending,
    TimedOut,
    Unknown,
}

#[derive(Default)]
pub struct QuestionTable {
    next_id: u64,
    pending: HashMap<u64, PendingQuestion>,
}

impl QuestionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new question, returning its id for later polling.
    pub fn ask(&mut self, pattern: QueryPattern, created_step: u64, timeout_steps: u64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.insert(id, PendingQuestion { pattern, created_step, timeout_steps });
        id
    }

    /// Check whether `id` can now be answered from `hypergraph`'s current
    /// state. Removes the question from the table once it resolves (answered
    /// or timed out) so it is only ever resolved once.
    pub fn poll(&mut self, id: u64, hypergraph: &Hypergraph, current_step: u64) -> AskOutcome {
        let Some(question) = self.pending.get(&id) else { return AskOutcome::Unknown };
        let matches = match_pattern(hypergraph, &question.pattern);
        if !matches.is_empty() {
            self.pending.remove(&id);
            return AskOutcome::Answered(matches);
        }
        if current_step.saturating_sub(question.created_step) >= question.timeout_steps {
            self.pending.remove(&id);
            return AskOutcome::TimedOut;
        }
        AskOutcome::Pending
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Every bound (non-variable) edge id named by a still-pending question's
    /// pattern, used by the memory manager's question-membership importance boost.
    pub fn referenced_edges(&self) -> HashSet<EdgeId> {
        self.pending
            .values()
            .flat_map(|q| q.pattern.slots.iter())
            .filter_map(|slot| match slot {
                Slot::Bound(id) => Some(id.clone()),
                Slot::Variable(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::Budget;
    use crate::edge::Belief;
    use crate::pattern::parse_statement;
    use crate::term::EdgeType;
    use crate::truth::TruthValue;

    #[test]
    fn poll_unknown_id_returns_unknown() {
        let mut table = QuestionTable::new();
        let hg = Hypergraph::new(8);
        assert!(matches!(table.poll(42, &hg, 0), AskOutcome::Unknown));
    }

    #[test]
    fn poll_answers_once_matching_edge_exists() {
        let mut hg = Hypergraph::new(8);
        hg.ensure_atom("bird".into(), 0);
        hg.ensure_atom("tweety".into(), 0);
        hg.add_edge(
            "Inheritance(tweety,bird)".into(),
            EdgeType::Inheritance,
            vec!["tweety".into(), "bird".into()],
            Belief::asserted(TruthValue::new(0.9, 0.9), Budget::full(), 0),
            0,
        )
        .unwrap();

        let parsed = parse_statement("Inheritance(?x,bird)").unwrap();
        let pattern = QueryPattern::parse(&parsed);
        let mut table = QuestionTable::new();
        let id = table.ask(pattern, 0, 10);
        match table.poll(id, &hg, 1) {
            AskOutcome::Answered(matches) => assert_eq!(matches.len(), 1),
            other => panic!("expected Answered, got {other:?}"),
        }
        assert_eq!(table.pending_count(), 0);
    }

    #[test]
    fn referenced_edges_collects_bound_slots_only() {
        let parsed = parse_statement("Inheritance(?x,bird)").unwrap();
        let pattern = QueryPattern::parse(&parsed);
        let mut table = QuestionTable::new();
        table.ask(pattern, 0, 10);
        let refs = table.referenced_edges();
        assert_eq!(refs.len(), 1);
        assert!(refs.contains(&EdgeId::from("bird")));
    }

    #[test]
    fn poll_times_out_after_budget_exhausted() {
        let hg = Hypergraph::new(8);
        let parsed = parse_statement("Inheritance(?x,bird)").unwrap();
        let pattern = QueryPattern::parse(&parsed);
        let mut table = QuestionTable::new();
        let id = table.ask(pattern, 0, 5);
        assert!(matches!(table.poll(id, &hg, 3), AskOutcome::Pending));
        assert!(matches!(table.poll(id, &hg, 5), AskOutcome::TimedOut));
        assert_eq!(table.pending_count(), 0);
    }
}
