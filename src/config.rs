//! Kernel configuration: a flat, serializable key set with validated defaults.
//!
//! Follows the teacher's `EngineConfig` -> fallible `validate()` pattern
//! (`engine.rs`): construct with [`Config::default`], override fields, then
//! call [`Config::validate`] before handing it to [`crate::kernel::Kernel::new`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Max beliefs retained per hyperedge before the weakest is evicted.
    pub belief_capacity: usize,
    /// Max hyperedges retained before the memory manager starts forgetting.
    pub edge_capacity: usize,
    /// Soft cap on pending events in the propagation queue.
    pub event_queue_soft_cap: usize,
    /// Max hops a propagation wave may travel before being dropped.
    pub max_path_length: usize,
    /// Max recursive derivation depth within a single step.
    pub max_derivation_depth: usize,
    /// Entries retained in the derivation/memoization LRU caches.
    pub derivation_cache_size: usize,
    /// Distinct path hashes retained per target edge for cycle detection.
    pub path_cache_size: usize,
    /// EMA decay factor applied to activation updates, in `[0,1]`.
    pub activation_decay: f64,
    /// Budget multiplier applied to a belief when it is used as a premise by a
    /// rule with no more specific factor of its own (`consequent_conjunction`).
    pub derivation_budget_decay: f64,
    /// Minimum event priority admitted to the queue at all.
    pub admission_threshold: f64,
    /// `|Δfrequency|` beyond which two beliefs on the same edge count as
    /// contradicting rather than being merged by revision.
    pub contradiction_threshold: f64,
    /// Minimum expectation a derivation's truth value must clear to be worth
    /// inserting at all.
    pub inference_threshold: f64,

    // --- Derivation weights -------------------------------------------------
    /// `inheritance_transitivity`'s budget factor.
    pub transitive_inheritance_budget_factor: f64,
    /// `similarity_from_inheritance`'s budget factor.
    pub similarity_from_inheritance_budget_factor: f64,
    /// `property_inheritance`'s activation factor.
    pub property_inheritance_activation_factor: f64,
    /// `property_inheritance`'s budget factor.
    pub property_inheritance_budget_factor: f64,
    /// `induction`'s budget factor.
    pub inductive_similarity_budget_factor: f64,
    /// `similarity_symmetry`'s budget factor.
    pub similarity_symmetry_budget_factor: f64,
    /// `analogy`'s budget factor.
    pub analogy_budget_factor: f64,
    /// `modus_ponens`'s activation factor.
    pub implication_activation_factor: f64,
    /// `modus_ponens`'s budget factor.
    pub implication_budget_factor: f64,
    /// `equivalence_decomposition`'s budget factor.
    pub equivalence_budget_factor: f64,
    /// `conjunction_decomposition`'s activation factor.
    pub conjunction_decomposition_activation_factor: f64,
    /// `conjunction_decomposition`'s budget factor.
    pub conjunction_decomposition_budget_factor: f64,
    /// `temporal_transitivity`'s budget factor.
    pub transitive_temporal_budget_factor: f64,

    // --- Learning ------------------------------------------------------------
    /// Bounded ring size for the learning engine's experience buffer.
    pub experience_buffer_max_size: usize,
    /// Learning rate used when updating rule success rates, in `[0,1]`.
    pub rule_learning_rate: f64,
    /// Minimum recurrence count before a pattern is eligible for shortcut promotion.
    pub pattern_min_instances: u64,
    /// Minimum success rate (over its recurrences) before a pattern is promoted
    /// to a shortcut rule, in `[0,1]`.
    pub pattern_success_rate_threshold: f64,
    /// A rule is auto-disabled once its tracked effectiveness falls below this,
    /// in `[0,1]`.
    pub rule_disable_effectiveness_threshold: f64,
    /// A disabled rule is only re-enabled once its tracked effectiveness
    /// recovers to at least this, in `[0,1]`.
    pub rule_enable_effectiveness_threshold: f64,
    /// Minimum number of attempts before a rule is eligible for disabling —
    /// guards against disabling a rule off a handful of unlucky outcomes.
    pub rule_productivity_min_attempts: u64,

    // --- Memory ---------------------------------------------------------------
    /// Multiplicative decay applied to every edge's persisted importance score
    /// each maintenance tick, in `[0,1]`.
    pub importance_decay_factor: f64,
    /// Weight of a belief's own truth expectation in its importance score.
    pub importance_expectation_weight: f64,
    /// Weight of an edge's current activation in its importance score.
    pub importance_activation_weight: f64,
    /// Weight of the "referenced by an outstanding `ask()`" boost.
    pub importance_question_weight: f64,
    /// Weight of the "premise of a recent successful learning experience" boost.
    pub importance_success_weight: f64,
    /// Weight of the context/goal-stack membership boost.
    pub importance_context_weight: f64,

    // --- Temporal ---------------------------------------------------------------
    /// Max hops the temporal reasoner's constraint-graph BFS may traverse
    /// while searching for a composed relation between two intervals.
    pub max_propagation_iterations: usize,
    /// Default horizon (in steps) used by the temporal reasoner's prediction decay.
    pub default_temporal_horizon: f64,
    /// Upper bound `adjust_policy`'s retuning may raise the temporal horizon to.
    pub max_temporal_horizon: f64,
    /// Minimum predicted confidence worth reporting from `predict()`.
    pub prediction_confidence_threshold: f64,
    /// Base confidence used by `predict()` for a `meets`/`metBy` relation.
    pub prediction_base_confidence_meets: f64,
    /// Base confidence used by `predict()` for a `starts`/`startedBy` relation.
    pub prediction_base_confidence_starts: f64,
    /// Base confidence used by `predict()` for an `overlaps`/`overlappedBy` relation.
    pub prediction_base_confidence_overlaps: f64,
    /// Base confidence used by `predict()` for a `before`/`after` relation.
    pub prediction_base_confidence_before: f64,
    /// Base confidence used by `predict()` for any other relation.
    pub prediction_base_confidence_default: f64,

    /// Step budget granted to a blocking `ask()` before it times out.
    pub ask_timeout_steps: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            belief_capacity: 8,
            edge_capacity: 100_000,
            event_queue_soft_cap: 10_000,
            max_path_length: 20,
            max_derivation_depth: 10,
            derivation_cache_size: 10_000,
            path_cache_size: 10_000,
            activation_decay: 0.3,
            derivation_budget_decay: 0.8,
            admission_threshold: 0.05,
            contradiction_threshold: 0.5,
            inference_threshold: 0.01,

            transitive_inheritance_budget_factor: 0.7,
            similarity_from_inheritance_budget_factor: 0.6,
            property_inheritance_activation_factor: 0.6,
            property_inheritance_budget_factor: 0.5,
            inductive_similarity_budget_factor: 0.6,
            similarity_symmetry_budget_factor: 0.9,
            analogy_budget_factor: 0.6,
            implication_activation_factor: 0.9,
            implication_budget_factor: 0.75,
            equivalence_budget_factor: 0.8,
            conjunction_decomposition_activation_factor: 0.9,
            conjunction_decomposition_budget_factor: 0.75,
            transitive_temporal_budget_factor: 0.5,

            experience_buffer_max_size: 1_000,
            rule_learning_rate: 0.1,
            pattern_min_instances: 5,
            pattern_success_rate_threshold: 0.8,
            rule_disable_effectiveness_threshold: 0.1,
            rule_enable_effectiveness_threshold: 0.4,
            rule_productivity_min_attempts: 5,

            importance_decay_factor: 0.99,
            importance_expectation_weight: 0.4,
            importance_activation_weight: 0.25,
            importance_question_weight: 0.15,
            importance_success_weight: 0.1,
            importance_context_weight: 0.1,

            max_propagation_iterations: 1_000,
            default_temporal_horizon: 50.0,
            max_temporal_horizon: 500.0,
            prediction_confidence_threshold: 0.1,
            prediction_base_confidence_meets: 0.9,
            prediction_base_confidence_starts: 0.8,
            prediction_base_confidence_overlaps: 0.7,
            prediction_base_confidence_before: 0.4,
            prediction_base_confidence_default: 0.5,

            ask_timeout_steps: 1_000,
        }
    }
}

impl Config {
    /// Validate all invariants this config must satisfy before the kernel can
    /// be constructed from it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        macro_rules! positive {
            ($field:ident) => {
                if self.$field == 0 {
                    return Err(ConfigError::MustBePositive {
                        key: stringify!($field).to_string(),
                        value: self.$field as i64,
                    });
                }
            };
        }
        positive!(belief_capacity);
        positive!(edge_capacity);
        positive!(event_queue_soft_cap);
        positive!(max_path_length);
        positive!(max_derivation_depth);
        positive!(derivation_cache_size);
        positive!(path_cache_size);
        positive!(experience_buffer_max_size);
        positive!(max_propagation_iterations);

        macro_rules! unit_range {
            ($field:ident) => {
                if !(0.0..=1.0).contains(&self.$field) {
                    return Err(ConfigError::UnitRange {
                        key: stringify!($field).to_string(),
                        value: self.$field,
                    });
                }
            };
        }
        unit_range!(activation_decay);
        unit_range!(derivation_budget_decay);
        unit_range!(admission_threshold);
        unit_range!(contradiction_threshold);
        unit_range!(inference_threshold);
        unit_range!(transitive_inheritance_budget_factor);
        unit_range!(similarity_from_inheritance_budget_factor);
        unit_range!(property_inheritance_activation_factor);
        unit_range!(property_inheritance_budget_factor);
        unit_range!(inductive_similarity_budget_factor);
        unit_range!(similarity_symmetry_budget_factor);
        unit_range!(analogy_budget_factor);
        unit_range!(implication_activation_factor);
        unit_range!(implication_budget_factor);
        unit_range!(equivalence_budget_factor);
        unit_range!(conjunction_decomposition_activation_factor);
        unit_range!(conjunction_decomposition_budget_factor);
        unit_range!(transitive_temporal_budget_factor);
        unit_range!(rule_learning_rate);
        unit_range!(pattern_success_rate_threshold);
        unit_range!(rule_disable_effectiveness_threshold);
        unit_range!(rule_enable_effectiveness_threshold);
        unit_range!(importance_decay_factor);
        unit_range!(importance_expectation_weight);
        unit_range!(importance_activation_weight);
        unit_range!(importance_question_weight);
        unit_range!(importance_success_weight);
        unit_range!(importance_context_weight);
        unit_range!(prediction_confidence_threshold);
        unit_range!(prediction_base_confidence_meets);
        unit_range!(prediction_base_confidence_starts);
        unit_range!(prediction_base_confidence_overlaps);
        unit_range!(prediction_base_confidence_before);
        unit_range!(prediction_base_confidence_default);

        if self.default_temporal_horizon <= 0.0 {
            return Err(ConfigError::UnitRange {
                key: "default_temporal_horizon".to_string(),
                value: self.default_temporal_horizon,
            });
        }
        if self.max_temporal_horizon < self.default_temporal_horizon {
            return Err(ConfigError::UnitRange {
                key: "max_temporal_horizon".to_string(),
                value: self.max_temporal_horizon,
            });
        }
        Ok(())
    }

    /// Parse a config from TOML text, then validate it.
    pub fn from_toml(text: &str) -> Result<Self, crate::error::KernelError> {
        let parsed: Config = toml::from_str(text)
            .map_err(|e| ConfigError::Parse { message: e.to_string() })?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Apply a meta-learning config mutation by key name, used by the
    /// `meta_learning` rule to retune a named knob from observed
    /// `Inheritance(Term(*,configKey), Term(value))` beliefs. Returns `false`
    /// for an unrecognized key.
    pub fn set_by_key(&mut self, key: &str, value: f64) -> bool {
        match key {
            "admissionThreshold" | "admission_threshold" => self.admission_threshold = value.clamp(0.0, 1.0),
            "contradictionThreshold" | "contradiction_threshold" => self.contradiction_threshold = value.clamp(0.0, 1.0),
            "inferenceThreshold" | "inference_threshold" => self.inference_threshold = value.clamp(0.0, 1.0),
            "activationDecay" | "activation_decay" => self.activation_decay = value.clamp(0.0, 1.0),
            "ruleLearningRate" | "rule_learning_rate" => self.rule_learning_rate = value.clamp(0.0, 1.0),
            "defaultTemporalHorizon" | "default_temporal_horizon" => self.default_temporal_horizon = value.max(f64::EPSILON),
            _ => return false,
        }
        true
    }
}
