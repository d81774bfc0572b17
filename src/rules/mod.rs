//! The derivation engine: condition-based rule dispatch over hypergraph events.
//!
//! Rules are evaluated by *condition*, not by a fixed type-to-rule table — every
//! enabled rule's `condition` is checked against each popped event in descending
//! tunable-priority order, and every rule whose condition holds gets to fire
//! (the Open Question this resolves: dispatch is condition-based so more than
//! one rule can react to the same event, letting novel condition/action pairs
//! synthesized by the learning engine slot in beside the built-ins).

pub mod builtin;

use std::cell::RefCell;

use crate::budget::Budget;
use crate::config::Config;
use crate::error::RuleError;
use crate::event::Event;
use crate::hypergraph::Hypergraph;
use crate::index::Indices;
use crate::term::EdgeId;
use crate::term::EdgeType;
use crate::truth::TruthValue;

/// Read-only view a rule needs to inspect the graph while deciding whether (and
/// how) to fire. `meta_updates` is the one exception to "read-only": the
/// `meta_learning` rule can only observe a config change through `&self`
/// (the `Rule` trait doesn't hand back a mutable kernel), so it reports
/// `(key, value)` pairs here for the kernel to apply after dispatch.
pub struct RuleContext<'a> {
    pub hypergraph: &'a Hypergraph,
    pub indices: &'a Indices,
    pub config: &'a Config,
    pub now: u64,
    pub meta_updates: RefCell<Vec<(String, f64)>>,
}

impl<'a> RuleContext<'a> {
    pub fn new(hypergraph: &'a Hypergraph, indices: &'a Indices, config: &'a Config, now: u64) -> Self {
        Self { hypergraph, indices, config, now, meta_updates: RefCell::new(Vec::new()) }
    }
}

/// A candidate conclusion produced by a rule firing. The caller (the kernel's
/// propagation loop) is responsible for actually inserting it and enqueueing a
/// follow-on event.
#[derive(Debug, Clone)]
pub struct Derivation {
    pub id: EdgeId,
    pub edge_type: EdgeType,
    pub args: Vec<EdgeId>,
    pub truth: TruthValue,
    pub budget: Budget,
    pub premises: Vec<EdgeId>,
    pub rule_name: &'static str,
    /// Multiplier applied to the triggering event's activation before it
    /// propagates to the derived edge (spec §4.3) — `None` means "no
    /// rule-specific factor", leaving the caller to apply truth expectation alone.
    pub activation_factor: Option<f64>,
}

/// A single inference rule: a condition gating when it applies, and an action
/// producing zero or more derivations from the edge that triggered it.
pub trait Rule {
    fn name(&self) -> &'static str;

    /// Whether this rule is worth attempting for `event` at all — a cheap,
    /// purely structural check (e.g. "the triggering edge is an Inheritance").
    fn condition(&self, event: &Event, ctx: &RuleContext) -> bool;

    /// Produce the rule's derivations. Only called when `condition` returned
    /// `true`; may still return an empty vec if no matching partner edge exists.
    fn apply(&self, event: &Event, ctx: &RuleContext) -> Vec<Derivation>;
}

/// Bookkeeping the registry keeps per rule, independent of the rule's own logic —
/// this is what the learning engine tunes over time (spec §4.7).
pub struct RuleEntry {
    rule: Box<dyn Rule>,
    pub priority: f64,
    pub applicability: f64,
    pub success_rate: f64,
    pub last_used: Option<u64>,
    pub usage_count: u64,
    /// Number of outcomes observed via `record_outcome` — distinct from
    /// `usage_count` (which counts firings, not resolved outcomes) and what
    /// the learning engine's disable/enable hysteresis gates on.
    pub attempts: u64,
    pub enabled: bool,
}

impl RuleEntry {
    pub fn name(&self) -> &'static str {
        self.rule.name()
    }
}

/// Ordered collection of rules, dispatched by descending priority each step.
#[derive(Default)]
pub struct RuleRegistry {
    entries: Vec<RuleEntry>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn register(&mut self, rule: Box<dyn Rule>, priority: f64) -> Result<(), RuleError> {
        let name = rule.name();
        if self.entries.iter().any(|e| e.name() == name) {
            return Err(RuleError::DuplicateName { name: name.to_string() });
        }
        self.entries.push(RuleEntry {
            rule,
            priority,
            applicability: 1.0,
            success_rate: 1.0,
            last_used: None,
            usage_count: 0,
            attempts: 0,
            enabled: true,
        });
        Ok(())
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name() == name) {
            entry.enabled = enabled;
        }
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [RuleEntry] {
        &mut self.entries
    }

    /// Evaluate every enabled rule's condition against `event` in descending
    /// priority order, firing every one whose condition holds, and update each
    /// fired rule's usage bookkeeping.
    pub fn dispatch(&mut self, event: &Event, ctx: &RuleContext) -> Vec<Derivation> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| {
            self.entries[b]
                .priority
                .partial_cmp(&self.entries[a].priority)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut out = Vec::new();
        for idx in order {
            let fires = {
                let entry = &self.entries[idx];
                entry.enabled && entry.rule.condition(event, ctx)
            };
            if !fires {
                continue;
            }
            let derivations = self.entries[idx].rule.apply(event, ctx);
            let entry = &mut self.entries[idx];
            entry.last_used = Some(ctx.now);
            entry.usage_count += 1;
            out.extend(derivations);
        }
        out
    }

    /// Exponential update of a rule's tracked success rate, used by the
    /// learning engine after observing whether a derivation survived revision.
    pub fn record_outcome(&mut self, name: &str, success: bool, learning_rate: f64) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name() == name) {
            let target = if success { 1.0 } else { 0.0 };
            entry.success_rate = (1.0 - learning_rate) * entry.success_rate + learning_rate * target;
            entry.attempts += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysFires;
    impl Rule for AlwaysFires {
        fn name(&self) -> &'static str {
            "always_fires"
        }
        fn condition(&self, _event: &Event, _ctx: &RuleContext) -> bool {
            true
        }
        fn apply(&self, _event: &Event, _ctx: &RuleContext) -> Vec<Derivation> {
            Vec::new()
        }
    }

    struct NeverFires;
    impl Rule for NeverFires {
        fn name(&self) -> &'static str {
            "never_fires"
        }
        fn condition(&self, _event: &Event, _ctx: &RuleContext) -> bool {
            false
        }
        fn apply(&self, _event: &Event, _ctx: &RuleContext) -> Vec<Derivation> {
            panic!("should not be called")
        }
    }

    #[test]
    fn duplicate_rule_name_rejected() {
        let mut reg = RuleRegistry::new();
        reg.register(Box::new(AlwaysFires), 1.0).unwrap();
        let err = reg.register(Box::new(AlwaysFires), 1.0);
        assert!(matches!(err, Err(RuleError::DuplicateName { .. })));
    }

    #[test]
    fn dispatch_skips_rules_whose_condition_is_false() {
        let mut reg = RuleRegistry::new();
        reg.register(Box::new(NeverFires), 1.0).unwrap();
        let hg = Hypergraph::new(8);
        let idx = Indices::new(16, 16);
        let config = Config::default();
        let ctx = RuleContext::new(&hg, &idx, &config, 0);
        let event = Event::new("a".into(), Budget::full(), 0, 0, 1.0, Vec::new());
        let out = reg.dispatch(&event, &ctx);
        assert!(out.is_empty());
        assert_eq!(reg.entries()[0].usage_count, 0);
    }

    #[test]
    fn dispatch_runs_in_descending_priority_order_and_tracks_usage() {
        let mut reg = RuleRegistry::new();
        reg.register(Box::new(AlwaysFires), 0.2).unwrap();
        let hg = Hypergraph::new(8);
        let idx = Indices::new(16, 16);
        let config = Config::default();
        let ctx = RuleContext::new(&hg, &idx, &config, 7);
        let event = Event::new("a".into(), Budget::full(), 0, 0, 1.0, Vec::new());
        reg.dispatch(&event, &ctx);
        assert_eq!(reg.entries()[0].usage_count, 1);
        assert_eq!(reg.entries()[0].last_used, Some(7));
    }

    #[test]
    fn disabled_rule_does_not_fire() {
        let mut reg = RuleRegistry::new();
        reg.register(Box::new(AlwaysFires), 1.0).unwrap();
        reg.set_enabled("always_fires", false);
        let hg = Hypergraph::new(8);
        let idx = Indices::new(16, 16);
        let config = Config::default();
        let ctx = RuleContext::new(&hg, &idx, &config, 0);
        let event = Event::new("a".into(), Budget::full(), 0, 0, 1.0, Vec::new());
        reg.dispatch(&event, &ctx);
        assert_eq!(reg.entries()[0].usage_count, 0);
    }

    #[test]
    fn record_outcome_increments_attempts() {
        let mut reg = RuleRegistry::new();
        reg.register(Box::new(AlwaysFires), 1.0).unwrap();
        reg.record_outcome("always_fires", true, 0.5);
        reg.record_outcome("always_fires", false, 0.5);
        assert_eq!(reg.entries()[0].attempts, 2);
    }
}
