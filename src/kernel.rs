//! The kernel facade: owns every subsystem and exposes the single entry point
//! an embedding host drives.
//!
//! Grounded on the teacher's `engine.rs` `Engine`/`EngineConfig` pattern: a
//! fallible `new(config)` that validates before constructing, a facade struct
//! holding every subsystem, and a `Debug` impl that doesn't try to print the
//! (potentially huge) hypergraph contents.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, trace};

use crate::budget::Budget;
use crate::config::Config;
use crate::contradiction::{ContradictionManager, ContradictionReport};
use crate::edge::Belief;
use crate::error::{KernelError, KernelResult, RuleError};
use crate::event::{Event, EventQueue};
use crate::hypergraph::{AddOutcome, Hypergraph};
use crate::index::Indices;
use crate::learning::{Experience, LearningEngine};
use crate::memory::{ImportanceWeights, MemoryManager};
use crate::pattern::{self, match_pattern, Match, ParsedStatement, QueryPattern};
use crate::persist::Snapshot;
use crate::questions::{AskOutcome, QuestionTable};
use crate::rules::builtin;
use crate::rules::{RuleContext, RuleRegistry};
use crate::temporal::{AllenRelation, TemporalReasoner};
use crate::term::{EdgeId, EdgeType};
use crate::truth::TruthValue;

/// Events the kernel emits for host-side observers registered via [`Kernel::on`].
#[derive(Debug, Clone)]
pub enum KernelEvent {
    EdgeAdded { id: EdgeId },
    BeliefRevised { id: EdgeId },
    Contradiction(ContradictionReport),
    Forgotten { id: EdgeId },
    /// The `meta_learning` rule retuned a config knob.
    MetaLearningApplied { key: String, value: f64 },
    RuleDisabled { name: String },
    RuleEnabled { name: String },
    /// A recurring derivation pattern was materialized as its own hyperedge.
    ShortcutCreated { edge_id: EdgeId, source_rule: String },
    ConceptFormed { id: EdgeId },
    GoalAchieved { id: EdgeId },
    TemporalUpdate { a: EdgeId, relation: String, b: EdgeId },
    Answer { question_id: u64, matches: usize },
    Log { message: String },
}

/// The non-axiomatic reasoning kernel. Single-threaded, cooperatively
/// scheduled: advances only when `step`/`run` is called (spec §5).
pub struct Kernel {
    config: Config,
    hypergraph: Hypergraph,
    indices: Indices,
    queue: EventQueue,
    rules: RuleRegistry,
    contradictions: ContradictionManager,
    memory: MemoryManager,
    learning: LearningEngine,
    temporal: TemporalReasoner,
    questions: QuestionTable,
    step_count: u64,
    listeners: Vec<Box<dyn FnMut(&KernelEvent)>>,
}

impl Kernel {
    /// Construct a kernel from a validated config, with every built-in rule
    /// registered at its default priority.
    pub fn new(config: Config) -> KernelResult<Self> {
        config.validate()?;
        let mut rules = RuleRegistry::new();
        builtin::register_all(&mut rules)?;

        let memory = MemoryManager::new(config.edge_capacity, config.importance_decay_factor)?.with_weights(
            ImportanceWeights {
                expectation: config.importance_expectation_weight,
                activation: config.importance_activation_weight,
                question: config.importance_question_weight,
                success: config.importance_success_weight,
                context: config.importance_context_weight,
            },
        );
        let learning = LearningEngine::new(config.experience_buffer_max_size)?;

        Ok(Self {
            hypergraph: Hypergraph::new(config.belief_capacity).with_contradiction_threshold(config.contradiction_threshold),
            indices: Indices::new(config.derivation_cache_size, config.path_cache_size),
            queue: EventQueue::new(config.event_queue_soft_cap),
            temporal: TemporalReasoner::new(config.default_temporal_horizon)
                .with_max_propagation_iterations(config.max_propagation_iterations),
            rules,
            contradictions: ContradictionManager::new(config.contradiction_threshold),
            memory,
            learning,
            questions: QuestionTable::new(),
            step_count: 0,
            listeners: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn current_step(&self) -> u64 {
        self.step_count
    }

    /// Register a callback invoked for every [`KernelEvent`] the kernel emits.
    pub fn on(&mut self, listener: impl FnMut(&KernelEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: KernelEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn get_edge(&self, id: &EdgeId) -> Option<&crate::edge::Hyperedge> {
        self.hypergraph.get(id)
    }

    pub fn get_beliefs(&self, id: &EdgeId) -> &[Belief] {
        self.hypergraph.get(id).map(|e| e.beliefs.as_slice()).unwrap_or(&[])
    }

    /// Parse and assert a surface statement (spec §6's statement syntax),
    /// auto-registering any atoms it references, then enqueue a propagation
    /// event for the resulting edge.
    pub fn assert(&mut self, statement: &str) -> KernelResult<EdgeId> {
        let parsed = pattern::parse_statement(statement)?;
        self.add_statement(parsed)
    }

    fn add_statement(&mut self, parsed: ParsedStatement) -> KernelResult<EdgeId> {
        for arg in &parsed.args {
            let id = EdgeId::from(arg.clone());
            self.hypergraph.ensure_atom(id.clone(), self.step_count);
            self.indices.index_edge(&id, EdgeType::Term, &[]);
        }
        let args: Vec<EdgeId> = parsed.args.iter().map(|a| EdgeId::from(a.clone())).collect();
        let id = EdgeId::from(format!(
            "{}({})",
            parsed.edge_type.name(),
            args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(",")
        ));
        let truth = parsed.truth.unwrap_or_else(TruthValue::certain);
        let belief = Belief::asserted(truth, Budget::full(), self.step_count);
        self.add_edge(id, parsed.edge_type, args, belief)
    }

    /// Insert or revise an edge directly, without going through the surface
    /// parser — used by the propagation loop to apply a rule's [`Derivation`].
    pub fn add_edge(
        &mut self,
        id: EdgeId,
        edge_type: EdgeType,
        args: Vec<EdgeId>,
        belief: Belief,
    ) -> KernelResult<EdgeId> {
        let outcome = self
            .hypergraph
            .add_edge(id.clone(), edge_type, args.clone(), belief.clone(), self.step_count)?;
        self.indices.index_edge(&id, edge_type, &args);

        match outcome {
            AddOutcome::Created => {
                debug!(edge = %id, "edge created");
                self.emit(KernelEvent::EdgeAdded { id: id.clone() });
            }
            AddOutcome::Revised { evicted } => {
                trace!(edge = %id, "edge revised");
                self.emit(KernelEvent::BeliefRevised { id: id.clone() });
                if let Some(_evicted) = evicted {
                    self.emit(KernelEvent::Forgotten { id: id.clone() });
                }
                let reports = self.contradictions.analyze(&self.hypergraph, &id);
                for report in reports {
                    self.emit(KernelEvent::Contradiction(report));
                }
            }
        }

        let activation = belief.expectation();
        self.queue.push(Event::new(id.clone(), belief.budget, 0, seed_path_hash(&id), activation, Vec::new()));
        Ok(id)
    }

    /// Pop one event and dispatch every rule whose condition fires on it,
    /// applying each resulting derivation. Returns `false` if the queue was
    /// empty (nothing to do).
    pub fn step(&mut self) -> KernelResult<bool> {
        let Some(event) = self.queue.pop() else { return Ok(false) };

        if event.path_length > self.config.max_path_length {
            return Ok(true);
        }
        if self.indices.has_path_hash(&event.edge, event.path_hash) {
            return Ok(true);
        }
        self.indices.record_path_hash(event.edge.clone(), event.path_hash);
        self.indices.update_activation(event.edge.clone(), event.activation, self.config.activation_decay);

        let ctx = RuleContext::new(&self.hypergraph, &self.indices, &self.config, self.step_count);
        let derivations = self.rules.dispatch(&event, &ctx);
        let meta_updates = ctx.meta_updates.into_inner();

        let mut log_messages = Vec::new();
        let mut experiences = Vec::new();
        for derivation in derivations {
            let key = format!("{}|{:?}", derivation.id, derivation.premises);
            if !self.indices.check_and_record_derivation(key) {
                continue;
            }
            let belief = Belief::derived(
                derivation.truth,
                derivation.budget,
                derivation.premises.clone(),
                derivation.rule_name,
                self.step_count,
            );
            let survived = belief.expectation() > 0.5;
            let next_path_length = event.path_length + 1;
            let mut next_derivation_path = event.derivation_path.clone();
            next_derivation_path.push(event.edge.clone());

            if next_derivation_path.len() > self.config.max_derivation_depth {
                let err = RuleError::DepthExceeded {
                    depth: next_derivation_path.len(),
                    max: self.config.max_derivation_depth,
                };
                log_messages.push(err.to_string());
            } else if derivation.budget.priority >= self.config.admission_threshold
                && next_path_length <= self.config.max_path_length
            {
                let id = derivation.id.clone();
                self.hypergraph
                    .add_edge(id.clone(), derivation.edge_type, derivation.args.clone(), belief, self.step_count)
                    .ok();
                self.indices.index_edge(&id, derivation.edge_type, &derivation.args);
                let next_activation =
                    event.activation * derivation.truth.expectation() * derivation.activation_factor.unwrap_or(1.0);
                self.queue.push(Event::new(
                    id.clone(),
                    derivation.budget,
                    next_path_length,
                    event.path_hash ^ hash_id(&id),
                    next_activation,
                    next_derivation_path,
                ));
            }

            let premise_types: Vec<EdgeType> = derivation
                .premises
                .iter()
                .filter_map(|p| self.hypergraph.get(p).map(|e| e.edge_type))
                .collect();
            experiences.push(Experience {
                rule_name: derivation.rule_name.to_string(),
                premises: derivation.premises,
                premise_types,
                conclusion: derivation.id,
                conclusion_type: derivation.edge_type,
                survived,
                timestamp: self.step_count,
            });
        }
        for message in log_messages {
            self.emit(KernelEvent::Log { message });
        }
        let mut success_edges: HashSet<EdgeId> = HashSet::new();
        for experience in &experiences {
            if experience.survived {
                success_edges.extend(experience.premises.iter().cloned());
            }
            self.learning.record_experience(experience.clone());
        }

        for (key, value) in meta_updates {
            if self.config.set_by_key(&key, value) {
                self.emit(KernelEvent::MetaLearningApplied { key, value });
            }
        }

        self.step_count += 1;

        let question_edges = self.questions.referenced_edges();
        let context_edges: HashSet<EdgeId> = HashSet::new();
        self.memory.tick(&self.hypergraph, &self.indices, &question_edges, &success_edges, &context_edges);
        if self.hypergraph.len() > self.memory.capacity() {
            self.forget_lowest_scoring();
        }
        Ok(true)
    }

    fn forget_lowest_scoring(&mut self) {
        let ids = self.memory.select_for_forgetting(&self.hypergraph);
        for id in ids {
            if let Some(edge) = self.hypergraph.get(&id).cloned() {
                self.indices.remove_edge(&id, edge.edge_type, &edge.args);
                self.hypergraph.remove(&id);
                self.emit(KernelEvent::Forgotten { id });
            }
        }
    }

    /// Run up to `n_steps` propagation steps, stopping early if the queue
    /// empties out. Returns the number of steps actually executed.
    pub fn run(&mut self, n_steps: u64) -> KernelResult<u64> {
        let mut executed = 0;
        for _ in 0..n_steps {
            if !self.step()? {
                break;
            }
            executed += 1;
        }
        Ok(executed)
    }

    /// Run the learning engine's periodic adaptation pass: rule success rates,
    /// enable/disable hysteresis, shortcut promotion, and resource retuning.
    pub fn apply_learning(&mut self) {
        self.learning.apply_learning(&mut self.rules, self.config.rule_learning_rate);

        let transitions = self.learning.adjust_rule_policy(
            &mut self.rules,
            self.config.rule_disable_effectiveness_threshold,
            self.config.rule_enable_effectiveness_threshold,
            self.config.rule_productivity_min_attempts,
        );
        for (name, enabled) in transitions {
            if enabled {
                self.emit(KernelEvent::RuleEnabled { name });
            } else {
                self.emit(KernelEvent::RuleDisabled { name });
            }
        }

        let shortcuts = self.learning.promote_shortcuts(
            &mut self.hypergraph,
            self.config.pattern_min_instances,
            self.config.pattern_success_rate_threshold,
            self.step_count,
        );
        for shortcut in shortcuts {
            if let Some(implication_edge) = self.hypergraph.get(&shortcut.edge_id).cloned() {
                self.indices.index_edge(&implication_edge.id, implication_edge.edge_type, &implication_edge.args);
                if let Some(conjunction_edge) =
                    implication_edge.args.first().and_then(|id| self.hypergraph.get(id)).cloned()
                {
                    self.indices.index_edge(&conjunction_edge.id, conjunction_edge.edge_type, &conjunction_edge.args);
                }
            }
            self.emit(KernelEvent::ShortcutCreated {
                edge_id: shortcut.edge_id,
                source_rule: shortcut.source_rule,
            });
        }

        let queue_fill_ratio = self.queue.len() as f64 / self.config.event_queue_soft_cap.max(1) as f64;
        let temporal_pressure =
            self.temporal.constraint_count() as f64 / self.config.max_propagation_iterations.max(1) as f64;
        self.learning.adjust_resource_thresholds(&mut self.config, queue_fill_ratio, temporal_pressure.min(1.0));
    }

    /// Query the current graph for every match of a surface pattern (spec
    /// §4.10's `query`), with no blocking/timeout semantics.
    pub fn query(&self, pattern: &str) -> KernelResult<Vec<Match>> {
        let parsed = pattern::parse_statement(pattern)?;
        let query_pattern = QueryPattern::parse(&parsed);
        Ok(match_pattern(&self.hypergraph, &query_pattern))
    }

    /// Register a blocking question: returns an id to poll with [`Self::poll_ask`].
    pub fn ask(&mut self, pattern: &str) -> KernelResult<u64> {
        let parsed = pattern::parse_statement(pattern)?;
        let query_pattern = QueryPattern::parse(&parsed);
        Ok(self.questions.ask(query_pattern, self.step_count, self.config.ask_timeout_steps))
    }

    pub fn poll_ask(&mut self, id: u64) -> AskOutcome {
        let outcome = self.questions.poll(id, &self.hypergraph, self.step_count);
        if let AskOutcome::Answered(ref matches) = outcome {
            self.emit(KernelEvent::Answer { question_id: id, matches: matches.len() });
        }
        outcome
    }

    pub fn add_temporal_constraint(&mut self, a: EdgeId, relation: AllenRelation, b: EdgeId) -> KernelResult<()> {
        self.temporal.add_constraint(a.clone(), relation, b.clone()).map_err(KernelError::from)?;
        self.emit(KernelEvent::TemporalUpdate { a, relation: relation.token().to_string(), b });
        Ok(())
    }

    pub fn infer_temporal_relationship(&self, a: &EdgeId, c: &EdgeId) -> Option<AllenRelation> {
        self.temporal.infer_relationship(a, c)
    }

    pub fn save_state(&self) -> KernelResult<String> {
        let edges: Vec<crate::edge::Hyperedge> = self.hypergraph.iter().cloned().collect();
        let snapshot = Snapshot::new(self.config.clone(), self.step_count, 0, edges);
        Ok(snapshot.to_json()?)
    }

    /// Restore a kernel from a snapshot, rebuilding every derived index by
    /// replaying each edge's beliefs through `add_edge` in creation order.
    pub fn load_state(text: &str) -> KernelResult<Self> {
        let snapshot = Snapshot::from_json(text)?;
        let mut kernel = Self::new(snapshot.config.clone())?;
        // Replay: re-insert every edge's args as atoms first (idempotent), then
        // the edge itself with each of its beliefs in original order.
        for edge in snapshot.edges_in_replay_order() {
            for arg in &edge.args {
                kernel.hypergraph.ensure_atom(arg.clone(), edge.created_at);
            }
            for belief in &edge.beliefs {
                kernel
                    .hypergraph
                    .add_edge(edge.id.clone(), edge.edge_type, edge.args.clone(), belief.clone(), edge.created_at)
                    .ok();
            }
            kernel.indices.index_edge(&edge.id, edge.edge_type, &edge.args);
        }
        kernel.step_count = snapshot.current_step;
        Ok(kernel)
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("edges", &self.hypergraph.len())
            .field("queued_events", &self.queue.len())
            .field("step", &self.step_count)
            .finish()
    }
}

fn hash_id(id: &EdgeId) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}

fn seed_path_hash(id: &EdgeId) -> u64 {
    hash_id(id)
}
