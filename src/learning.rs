//! Meta-learning: track which rules pay off, synthesize shortcut rules from
//! recurring derivation chains, and adapt dispatch policy over time.

use std::collections::HashMap;
use std::collections::VecDeque;

use crate::budget::Budget;
use crate::config::Config;
use crate::edge::Belief;
use crate::error::LearningError;
use crate::hypergraph::Hypergraph;
use crate::rules::RuleRegistry;
use crate::term::{EdgeId, EdgeType};
use crate::truth::TruthValue;

/// One observed derivation: which rule fired, on what premises (with their
/// types, for pattern-shape keying), and whether the resulting belief
/// survived a subsequent revision (its truth held up).
#[derive(Debug, Clone)]
pub struct Experience {
    pub rule_name: String,
    pub premises: Vec<EdgeId>,
    pub premise_types: Vec<EdgeType>,
    pub conclusion: EdgeId,
    pub conclusion_type: EdgeType,
    pub survived: bool,
    pub timestamp: u64,
}

/// `joinSorted(typeof(premises)) + "=>" + typeof(conclusion)`: the recurring
/// pattern signature two experiences share when they're the same shape of
/// derivation regardless of which concrete edges filled it in.
fn pattern_signature(premise_types: &[EdgeType], conclusion_type: EdgeType) -> String {
    let mut names: Vec<&str> = premise_types.iter().map(|t| t.name()).collect();
    names.sort_unstable();
    format!("{}=>{}", names.join(","), conclusion_type.name())
}

/// Running tally for a recurring pattern signature, plus a sample instance
/// (the most recently observed premises/conclusion) to materialize if it's
/// promoted.
struct PatternStats {
    instances: u64,
    successes: u64,
    rule_name: String,
    premises: Vec<EdgeId>,
    conclusion: EdgeId,
}

/// A synthesized shortcut: a recurring derivation pattern the engine has
/// learned fires reliably enough to be materialized as its own
/// `Implication(Conjunction(premises...), conclusion)` hyperedge, so future
/// matches can be answered by lookup instead of re-deriving step by step.
#[derive(Debug, Clone)]
pub struct ShortcutRule {
    pub name: String,
    pub source_rule: String,
    pub observed_successes: u64,
    pub success_rate: f64,
    pub edge_id: EdgeId,
}

/// Bounded ring buffer of recent experiences plus pattern-frequency counts,
/// driving rule enable/disable, shortcut promotion, and resource retuning.
pub struct LearningEngine {
    buffer: VecDeque<Experience>,
    capacity: usize,
    pattern_stats: HashMap<String, PatternStats>,
    shortcuts: Vec<ShortcutRule>,
}

impl LearningEngine {
    pub fn new(capacity: usize) -> Result<Self, LearningError> {
        if capacity == 0 {
            return Err(LearningError::ZeroBufferCapacity);
        }
        Ok(Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            pattern_stats: HashMap::new(),
            shortcuts: Vec::new(),
        })
    }

    /// Record an experience, evicting the oldest if the buffer is full, and
    /// update the recurring-pattern tally for its signature.
    pub fn record_experience(&mut self, experience: Experience) {
        let signature = pattern_signature(&experience.premise_types, experience.conclusion_type);
        let stats = self.pattern_stats.entry(signature).or_insert_with(|| PatternStats {
            instances: 0,
            successes: 0,
            rule_name: experience.rule_name.clone(),
            premises: experience.premises.clone(),
            conclusion: experience.conclusion.clone(),
        });
        stats.instances += 1;
        if experience.survived {
            stats.successes += 1;
        }
        stats.premises = experience.premises.clone();
        stats.conclusion = experience.conclusion.clone();

        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(experience);
    }

    /// Adjust every rule's tracked success rate from the buffer's outcomes.
    /// Shortcut promotion is a separate step ([`Self::promote_shortcuts`])
    /// since it needs write access to the hypergraph.
    pub fn apply_learning(&mut self, registry: &mut RuleRegistry, learning_rate: f64) {
        for experience in &self.buffer {
            registry.record_outcome(&experience.rule_name, experience.survived, learning_rate);
        }
    }

    /// Promote every pattern that has recurred at least `min_instances` times
    /// with a success rate above `success_rate_threshold` into a materialized
    /// `Implication(Conjunction(premises...), conclusion)` hyperedge. Returns
    /// the shortcuts newly promoted this call (already promoted ones are
    /// skipped), for the caller to emit events over.
    pub fn promote_shortcuts(
        &mut self,
        hypergraph: &mut Hypergraph,
        min_instances: u64,
        success_rate_threshold: f64,
        now: u64,
    ) -> Vec<ShortcutRule> {
        let mut newly_promoted = Vec::new();
        for (signature, stats) in self.pattern_stats.iter() {
            if stats.instances < min_instances || stats.premises.is_empty() {
                continue;
            }
            let success_rate = stats.successes as f64 / stats.instances as f64;
            if success_rate <= success_rate_threshold {
                continue;
            }
            if self.shortcuts.iter().any(|s| &s.name == signature) {
                continue;
            }

            let conjunction_id = EdgeId::from(format!(
                "Conjunction({})",
                stats.premises.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(",")
            ));
            let conjunction_inserted = hypergraph
                .add_edge(
                    conjunction_id.clone(),
                    EdgeType::Conjunction,
                    stats.premises.clone(),
                    Belief::asserted(TruthValue::certain(), Budget::full(), now),
                    now,
                )
                .is_ok();
            if !conjunction_inserted {
                continue;
            }

            let implication_id = EdgeId::from(format!("Implication({},{})", conjunction_id, stats.conclusion));
            let implication_inserted = hypergraph
                .add_edge(
                    implication_id.clone(),
                    EdgeType::Implication,
                    vec![conjunction_id.clone(), stats.conclusion.clone()],
                    Belief::asserted(TruthValue::new(1.0, success_rate), Budget::full(), now),
                    now,
                )
                .is_ok();
            if !implication_inserted {
                continue;
            }

            let shortcut = ShortcutRule {
                name: signature.clone(),
                source_rule: stats.rule_name.clone(),
                observed_successes: stats.successes,
                success_rate,
                edge_id: implication_id,
            };
            self.shortcuts.push(shortcut.clone());
            newly_promoted.push(shortcut);
        }
        newly_promoted
    }

    pub fn shortcuts(&self) -> &[ShortcutRule] {
        &self.shortcuts
    }

    /// Asymmetric hysteresis: a rule with at least `min_attempts` observed
    /// outcomes is disabled once its success rate falls below
    /// `disable_threshold`, and only re-enabled once it recovers to at least
    /// `enable_threshold` — the gap between the two thresholds stops a rule
    /// hovering near one cutoff from flapping on/off every adjustment pass.
    /// Returns `(rule_name, now_enabled)` for every rule whose policy changed.
    pub fn adjust_rule_policy(
        &self,
        registry: &mut RuleRegistry,
        disable_threshold: f64,
        enable_threshold: f64,
        min_attempts: u64,
    ) -> Vec<(String, bool)> {
        let mut transitions = Vec::new();
        for entry in registry.entries_mut() {
            if entry.attempts < min_attempts {
                continue;
            }
            if entry.enabled && entry.success_rate < disable_threshold {
                entry.enabled = false;
                transitions.push((entry.name().to_string(), false));
            } else if !entry.enabled && entry.success_rate >= enable_threshold {
                entry.enabled = true;
                transitions.push((entry.name().to_string(), true));
            }
        }
        transitions
    }

    /// Retune resource-pressure knobs: raise `admission_threshold` when the
    /// event queue is staying nearly full (admit fewer low-budget
    /// derivations), relax it back down once the queue is mostly empty;
    /// widen `default_temporal_horizon` toward `max_temporal_horizon` when
    /// the temporal reasoner is tracking constraints relative to its current
    /// horizon, so existing constraints don't immediately fall outside it.
    pub fn adjust_resource_thresholds(&self, config: &mut Config, queue_fill_ratio: f64, temporal_pressure: f64) {
        if queue_fill_ratio > 0.8 {
            config.admission_threshold = (config.admission_threshold + 0.02).min(0.95);
        } else if queue_fill_ratio < 0.2 {
            config.admission_threshold = (config.admission_threshold - 0.02).max(0.01);
        }
        if temporal_pressure > 0.8 {
            config.default_temporal_horizon = (config.default_temporal_horizon * 1.1).min(config.max_temporal_horizon);
        }
    }

    pub fn experience_count(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin;

    fn experience(rule: &str, survived: bool, n_premises: usize) -> Experience {
        Experience {
            rule_name: rule.to_string(),
            premises: (0..n_premises).map(|i| EdgeId::from(format!("p{i}"))).collect(),
            premise_types: vec![EdgeType::Inheritance; n_premises],
            conclusion: "c".into(),
            conclusion_type: EdgeType::Inheritance,
            survived,
            timestamp: 0,
        }
    }

    fn graph_with_premises(n: usize) -> Hypergraph {
        let mut hg = Hypergraph::new(8);
        for i in 0..n {
            hg.ensure_atom(format!("a{i}").into(), 0);
            hg.ensure_atom(format!("b{i}").into(), 0);
            hg.add_edge(
                format!("p{i}").into(),
                EdgeType::Inheritance,
                vec![format!("a{i}").into(), format!("b{i}").into()],
                Belief::asserted(TruthValue::new(0.9, 0.9), Budget::full(), 0),
                0,
            )
            .unwrap();
        }
        hg.ensure_atom("ca".into(), 0);
        hg.ensure_atom("cb".into(), 0);
        hg.add_edge(
            "c".into(),
            EdgeType::Inheritance,
            vec!["ca".into(), "cb".into()],
            Belief::asserted(TruthValue::new(0.9, 0.9), Budget::full(), 0),
            0,
        )
        .unwrap();
        hg
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(LearningEngine::new(0).is_err());
    }

    #[test]
    fn buffer_evicts_oldest_beyond_capacity() {
        let mut engine = LearningEngine::new(2).unwrap();
        engine.record_experience(experience("r", true, 2));
        engine.record_experience(experience("r", true, 2));
        engine.record_experience(experience("r", true, 2));
        assert_eq!(engine.experience_count(), 2);
    }

    #[test]
    fn apply_learning_updates_rule_success_rate() {
        let mut registry = RuleRegistry::new();
        builtin::register_all(&mut registry).unwrap();
        let mut engine = LearningEngine::new(10).unwrap();
        for _ in 0..5 {
            engine.record_experience(experience("modus_ponens", false, 2));
        }
        engine.apply_learning(&mut registry, 0.5);
        let entry = registry.entries().iter().find(|e| e.name() == "modus_ponens").unwrap();
        assert!(entry.success_rate < 1.0);
    }

    #[test]
    fn recurring_pattern_above_threshold_promotes_shortcut() {
        let mut engine = LearningEngine::new(50).unwrap();
        let mut hg = graph_with_premises(2);
        for _ in 0..6 {
            engine.record_experience(experience("inheritance_transitivity", true, 2));
        }
        let promoted = engine.promote_shortcuts(&mut hg, 5, 0.8, 10);
        assert_eq!(promoted.len(), 1);
        assert_eq!(engine.shortcuts().len(), 1);
        assert_eq!(engine.shortcuts()[0].source_rule, "inheritance_transitivity");
        assert!(hg.contains(&promoted[0].edge_id));
    }

    #[test]
    fn pattern_below_instance_floor_does_not_promote() {
        let mut engine = LearningEngine::new(50).unwrap();
        let mut hg = graph_with_premises(2);
        for _ in 0..3 {
            engine.record_experience(experience("inheritance_transitivity", true, 2));
        }
        let promoted = engine.promote_shortcuts(&mut hg, 5, 0.8, 10);
        assert!(promoted.is_empty());
    }

    #[test]
    fn pattern_below_success_rate_floor_does_not_promote() {
        let mut engine = LearningEngine::new(50).unwrap();
        let mut hg = graph_with_premises(2);
        for i in 0..10 {
            engine.record_experience(experience("inheritance_transitivity", i % 2 == 0, 2));
        }
        let promoted = engine.promote_shortcuts(&mut hg, 5, 0.8, 10);
        assert!(promoted.is_empty());
    }

    #[test]
    fn adjust_rule_policy_disables_then_reenables_with_hysteresis() {
        let mut registry = RuleRegistry::new();
        builtin::register_all(&mut registry).unwrap();
        for _ in 0..10 {
            registry.record_outcome("analogy", false, 0.9);
        }
        let engine = LearningEngine::new(10).unwrap();
        let transitions = engine.adjust_rule_policy(&mut registry, 0.1, 0.4, 5);
        assert_eq!(transitions, vec![("analogy".to_string(), false)]);
        let entry = registry.entries().iter().find(|e| e.name() == "analogy").unwrap();
        assert!(!entry.enabled);

        for _ in 0..10 {
            registry.record_outcome("analogy", true, 0.9);
        }
        let transitions = engine.adjust_rule_policy(&mut registry, 0.1, 0.4, 5);
        assert_eq!(transitions, vec![("analogy".to_string(), true)]);
    }

    #[test]
    fn below_attempt_floor_rule_is_not_disabled() {
        let mut registry = RuleRegistry::new();
        builtin::register_all(&mut registry).unwrap();
        registry.record_outcome("analogy", false, 0.9);
        let engine = LearningEngine::new(10).unwrap();
        let transitions = engine.adjust_rule_policy(&mut registry, 0.1, 0.4, 5);
        assert!(transitions.is_empty());
    }

    #[test]
    fn adjust_resource_thresholds_raises_admission_under_pressure() {
        let engine = LearningEngine::new(10).unwrap();
        let mut config = Config::default();
        let before = config.admission_threshold;
        engine.adjust_resource_thresholds(&mut config, 0.95, 0.0);
        assert!(config.admission_threshold > before);
    }

    #[test]
    fn adjust_resource_thresholds_widens_horizon_under_temporal_pressure() {
        let engine = LearningEngine::new(10).unwrap();
        let mut config = Config::default();
        let before = config.default_temporal_horizon;
        engine.adjust_resource_thresholds(&mut config, 0.5, 0.95);
        assert!(config.default_temporal_horizon > before);
        assert!(config.default_temporal_horizon <= config.max_temporal_horizon);
    }
}
