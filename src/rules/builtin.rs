//! The built-in derivation rules.
//!
//! Each rule below mirrors a classical non-axiomatic inference pattern. Truth
//! values are combined with the named [`TruthValue`] combinator; budgets are
//! derived from the triggering event's budget scaled by the rule's own
//! dedicated factor from [`crate::config::Config`] — a host tunes each rule's
//! attention decay independently rather than sharing one constant.

use crate::edge::Hyperedge;
use crate::event::Event;
use crate::rules::{Derivation, Rule, RuleContext};
use crate::term::{EdgeId, EdgeType};
use crate::truth::TruthValue;

fn edges_of_type_with_arg(
    ctx: &RuleContext,
    arg: &EdgeId,
    edge_type: EdgeType,
    position: usize,
) -> Vec<Hyperedge> {
    ctx.indices
        .ids_referencing(arg)
        .into_iter()
        .filter_map(|id| ctx.hypergraph.get(&id).cloned())
        .filter(|e| e.edge_type == edge_type && e.args.get(position) == Some(arg))
        .collect()
}

fn derived_budget(event: &Event, factor: f64) -> crate::budget::Budget {
    event.budget.scale(factor)
}

/// `Inheritance(S,M)` + `Inheritance(M,P)` -> `Inheritance(S,P)`.
pub struct InheritanceTransitivity;

impl Rule for InheritanceTransitivity {
    fn name(&self) -> &'static str {
        "inheritance_transitivity"
    }

    fn condition(&self, event: &Event, ctx: &RuleContext) -> bool {
        ctx.hypergraph
            .get(&event.edge)
            .is_some_and(|e| e.edge_type == EdgeType::Inheritance)
    }

    fn apply(&self, event: &Event, ctx: &RuleContext) -> Vec<Derivation> {
        let Some(edge) = ctx.hypergraph.get(&event.edge) else { return Vec::new() };
        let Some(belief) = edge.strongest() else { return Vec::new() };
        let (s, m) = (edge.args[0].clone(), edge.args[1].clone());

        let mut out = Vec::new();
        for next in edges_of_type_with_arg(ctx, &m, EdgeType::Inheritance, 0) {
            let p = next.args[1].clone();
            if p == s {
                continue;
            }
            let Some(next_belief) = next.strongest() else { continue };
            let truth = TruthValue::transitive(belief.truth, next_belief.truth);
            out.push(Derivation {
                id: EdgeId::from(format!("Inheritance({},{})", s, p)),
                edge_type: EdgeType::Inheritance,
                args: vec![s.clone(), p],
                truth,
                budget: derived_budget(event, ctx.config.transitive_inheritance_budget_factor),
                premises: vec![edge.id.clone(), next.id.clone()],
                rule_name: self.name(),
                activation_factor: None,
            });
        }
        out
    }
}

/// `Inheritance(S,P)` -> `Similarity(S,P)` at a fixed, discounted truth value
/// (a single inheritance edge is weaker evidence for similarity than the
/// mutual case, hence the low fixed confidence rather than a derived one).
pub struct SimilarityFromInheritance;

impl Rule for SimilarityFromInheritance {
    fn name(&self) -> &'static str {
        "similarity_from_inheritance"
    }

    fn condition(&self, event: &Event, ctx: &RuleContext) -> bool {
        ctx.hypergraph
            .get(&event.edge)
            .is_some_and(|e| e.edge_type == EdgeType::Inheritance)
    }

    fn apply(&self, event: &Event, ctx: &RuleContext) -> Vec<Derivation> {
        let Some(edge) = ctx.hypergraph.get(&event.edge) else { return Vec::new() };
        if edge.strongest().is_none() {
            return Vec::new();
        }
        let (s, p) = (edge.args[0].clone(), edge.args[1].clone());
        let (lo, hi) = if s.as_str() <= p.as_str() { (s.clone(), p.clone()) } else { (p.clone(), s.clone()) };

        vec![Derivation {
            id: EdgeId::from(format!("Similarity({},{})", lo, hi)),
            edge_type: EdgeType::Similarity,
            args: vec![s, p],
            truth: TruthValue::new(1.0, 0.9),
            budget: derived_budget(event, ctx.config.similarity_from_inheritance_budget_factor),
            premises: vec![edge.id.clone()],
            rule_name: self.name(),
            activation_factor: None,
        }]
    }
}

/// `Inheritance(S,M)` + `Property(M,P)` -> `Property(S,P)`.
pub struct PropertyInheritance;

impl Rule for PropertyInheritance {
    fn name(&self) -> &'static str {
        "property_inheritance"
    }

    fn condition(&self, event: &Event, ctx: &RuleContext) -> bool {
        ctx.hypergraph
            .get(&event.edge)
            .is_some_and(|e| matches!(e.edge_type, EdgeType::Inheritance | EdgeType::Property))
    }

    fn apply(&self, event: &Event, ctx: &RuleContext) -> Vec<Derivation> {
        let Some(edge) = ctx.hypergraph.get(&event.edge) else { return Vec::new() };
        let Some(belief) = edge.strongest() else { return Vec::new() };
        let mut out = Vec::new();
        let budget = derived_budget(event, ctx.config.property_inheritance_budget_factor);
        let activation_factor = Some(ctx.config.property_inheritance_activation_factor);

        if edge.edge_type == EdgeType::Inheritance {
            let (s, m) = (edge.args[0].clone(), edge.args[1].clone());
            for prop in edges_of_type_with_arg(ctx, &m, EdgeType::Property, 0) {
                let Some(prop_belief) = prop.strongest() else { continue };
                let p = prop.args[1].clone();
                let truth = TruthValue::deduced(belief.truth, prop_belief.truth);
                out.push(Derivation {
                    id: EdgeId::from(format!("Property({},{})", s, p)),
                    edge_type: EdgeType::Property,
                    args: vec![s.clone(), p],
                    truth,
                    budget,
                    premises: vec![edge.id.clone(), prop.id.clone()],
                    rule_name: self.name(),
                    activation_factor,
                });
            }
        } else {
            let (m, p) = (edge.args[0].clone(), edge.args[1].clone());
            for inh in edges_of_type_with_arg(ctx, &m, EdgeType::Inheritance, 1) {
                let Some(inh_belief) = inh.strongest() else { continue };
                let s = inh.args[0].clone();
                let truth = TruthValue::deduced(inh_belief.truth, belief.truth);
                out.push(Derivation {
                    id: EdgeId::from(format!("Property({},{})", s, p)),
                    edge_type: EdgeType::Property,
                    args: vec![s.clone(), p.clone()],
                    truth,
                    budget,
                    premises: vec![inh.id.clone(), edge.id.clone()],
                    rule_name: self.name(),
                    activation_factor,
                });
            }
        }
        out
    }
}

/// `Inheritance(A,P)` + `Inheritance(B,P)` -> `Similarity(A,B)`, via the
/// evidence-discounted induction combinator.
pub struct Induction;

impl Rule for Induction {
    fn name(&self) -> &'static str {
        "induction"
    }

    fn condition(&self, event: &Event, ctx: &RuleContext) -> bool {
        ctx.hypergraph
            .get(&event.edge)
            .is_some_and(|e| e.edge_type == EdgeType::Inheritance)
    }

    fn apply(&self, event: &Event, ctx: &RuleContext) -> Vec<Derivation> {
        let Some(edge) = ctx.hypergraph.get(&event.edge) else { return Vec::new() };
        let Some(belief) = edge.strongest() else { return Vec::new() };
        let (a, p) = (edge.args[0].clone(), edge.args[1].clone());

        let mut out = Vec::new();
        for other in edges_of_type_with_arg(ctx, &p, EdgeType::Inheritance, 1) {
            let b = other.args[0].clone();
            if b == a {
                continue;
            }
            let Some(other_belief) = other.strongest() else { continue };
            let truth = TruthValue::induction(belief.truth, other_belief.truth);
            let (lo, hi) = if a.as_str() <= b.as_str() { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) };
            out.push(Derivation {
                id: EdgeId::from(format!("Similarity({},{})", lo, hi)),
                edge_type: EdgeType::Similarity,
                args: vec![a.clone(), b],
                truth,
                budget: derived_budget(event, ctx.config.inductive_similarity_budget_factor),
                premises: vec![edge.id.clone(), other.id.clone()],
                rule_name: self.name(),
                activation_factor: None,
            });
        }
        out
    }
}

/// `Similarity(A,B)` -> `Similarity(B,A)`.
pub struct SimilaritySymmetry;

impl Rule for SimilaritySymmetry {
    fn name(&self) -> &'static str {
        "similarity_symmetry"
    }

    fn condition(&self, event: &Event, ctx: &RuleContext) -> bool {
        ctx.hypergraph
            .get(&event.edge)
            .is_some_and(|e| e.edge_type == EdgeType::Similarity)
    }

    fn apply(&self, event: &Event, ctx: &RuleContext) -> Vec<Derivation> {
        let Some(edge) = ctx.hypergraph.get(&event.edge) else { return Vec::new() };
        let Some(belief) = edge.strongest() else { return Vec::new() };
        let (a, b) = (edge.args[0].clone(), edge.args[1].clone());
        let reverse_id = EdgeId::from(format!("Similarity({},{})", b, a));
        if reverse_id == edge.id {
            return Vec::new();
        }
        vec![Derivation {
            id: reverse_id,
            edge_type: EdgeType::Similarity,
            args: vec![b, a],
            truth: belief.truth,
            budget: derived_budget(event, ctx.config.similarity_symmetry_budget_factor),
            premises: vec![edge.id.clone()],
            rule_name: self.name(),
            activation_factor: None,
        }]
    }
}

/// `Similarity(A,B)` + `Inheritance(A,P)` -> `Inheritance(B,P)`.
pub struct Analogy;

impl Rule for Analogy {
    fn name(&self) -> &'static str {
        "analogy"
    }

    fn condition(&self, event: &Event, ctx: &RuleContext) -> bool {
        ctx.hypergraph
            .get(&event.edge)
            .is_some_and(|e| matches!(e.edge_type, EdgeType::Similarity | EdgeType::Inheritance))
    }

    fn apply(&self, event: &Event, ctx: &RuleContext) -> Vec<Derivation> {
        let Some(edge) = ctx.hypergraph.get(&event.edge) else { return Vec::new() };
        let Some(belief) = edge.strongest() else { return Vec::new() };
        let mut out = Vec::new();
        let budget = derived_budget(event, ctx.config.analogy_budget_factor);

        if edge.edge_type == EdgeType::Similarity {
            let (a, b) = (edge.args[0].clone(), edge.args[1].clone());
            for inh in edges_of_type_with_arg(ctx, &a, EdgeType::Inheritance, 0) {
                let Some(inh_belief) = inh.strongest() else { continue };
                let p = inh.args[1].clone();
                let truth = TruthValue::analogy(belief.truth, inh_belief.truth);
                out.push(Derivation {
                    id: EdgeId::from(format!("Inheritance({},{})", b, p)),
                    edge_type: EdgeType::Inheritance,
                    args: vec![b.clone(), p],
                    truth,
                    budget,
                    premises: vec![edge.id.clone(), inh.id.clone()],
                    rule_name: self.name(),
                    activation_factor: None,
                });
            }
        } else {
            let (a, p) = (edge.args[0].clone(), edge.args[1].clone());
            for sim in edges_of_type_with_arg(ctx, &a, EdgeType::Similarity, 0) {
                let Some(sim_belief) = sim.strongest() else { continue };
                let b = sim.args[1].clone();
                let truth = TruthValue::analogy(sim_belief.truth, belief.truth);
                out.push(Derivation {
                    id: EdgeId::from(format!("Inheritance({},{})", b, p)),
                    edge_type: EdgeType::Inheritance,
                    args: vec![b.clone(), p.clone()],
                    truth,
                    budget,
                    premises: vec![sim.id.clone(), edge.id.clone()],
                    rule_name: self.name(),
                    activation_factor: None,
                });
            }
        }
        out
    }
}

/// `Implication(P,Q)` + `P` -> `Q` (modus ponens).
pub struct ModusPonens;

impl Rule for ModusPonens {
    fn name(&self) -> &'static str {
        "modus_ponens"
    }

    fn condition(&self, event: &Event, ctx: &RuleContext) -> bool {
        ctx.hypergraph.get(&event.edge).is_some_and(|e| {
            e.edge_type == EdgeType::Implication
                || !edges_of_type_with_arg(ctx, &event.edge, EdgeType::Implication, 0).is_empty()
        })
    }

    fn apply(&self, event: &Event, ctx: &RuleContext) -> Vec<Derivation> {
        let Some(edge) = ctx.hypergraph.get(&event.edge) else { return Vec::new() };
        let Some(belief) = edge.strongest() else { return Vec::new() };
        let mut out = Vec::new();
        let budget = derived_budget(event, ctx.config.implication_budget_factor);
        let activation_factor = Some(ctx.config.implication_activation_factor);

        if edge.edge_type == EdgeType::Implication {
            let (p, q) = (edge.args[0].clone(), edge.args[1].clone());
            if let Some(premise_edge) = ctx.hypergraph.get(&p) {
                if let Some(premise_belief) = premise_edge.strongest() {
                    let truth = TruthValue::deduced(premise_belief.truth, belief.truth);
                    out.push(Derivation {
                        id: q.clone(),
                        edge_type: ctx.hypergraph.get(&q).map(|e| e.edge_type).unwrap_or(EdgeType::Term),
                        args: ctx.hypergraph.get(&q).map(|e| e.args.clone()).unwrap_or_default(),
                        truth,
                        budget,
                        premises: vec![edge.id.clone(), premise_edge.id.clone()],
                        rule_name: self.name(),
                        activation_factor,
                    });
                }
            }
        } else {
            for implication in edges_of_type_with_arg(ctx, &edge.id, EdgeType::Implication, 0) {
                let Some(impl_belief) = implication.strongest() else { continue };
                let q = implication.args[1].clone();
                let truth = TruthValue::deduced(belief.truth, impl_belief.truth);
                out.push(Derivation {
                    id: q.clone(),
                    edge_type: ctx.hypergraph.get(&q).map(|e| e.edge_type).unwrap_or(EdgeType::Term),
                    args: ctx.hypergraph.get(&q).map(|e| e.args.clone()).unwrap_or_default(),
                    truth,
                    budget,
                    premises: vec![implication.id.clone(), edge.id.clone()],
                    rule_name: self.name(),
                    activation_factor,
                });
            }
        }
        out
    }
}

/// `Equivalence(P,Q)` -> `Implication(P,Q)` and `Implication(Q,P)`.
pub struct EquivalenceDecomposition;

impl Rule for EquivalenceDecomposition {
    fn name(&self) -> &'static str {
        "equivalence_decomposition"
    }

    fn condition(&self, event: &Event, ctx: &RuleContext) -> bool {
        ctx.hypergraph
            .get(&event.edge)
            .is_some_and(|e| e.edge_type == EdgeType::Equivalence)
    }

    fn apply(&self, event: &Event, ctx: &RuleContext) -> Vec<Derivation> {
        let Some(edge) = ctx.hypergraph.get(&event.edge) else { return Vec::new() };
        let Some(belief) = edge.strongest() else { return Vec::new() };
        let (p, q) = (edge.args[0].clone(), edge.args[1].clone());
        let budget = derived_budget(event, ctx.config.equivalence_budget_factor);
        vec![
            Derivation {
                id: EdgeId::from(format!("Implication({},{})", p, q)),
                edge_type: EdgeType::Implication,
                args: vec![p.clone(), q.clone()],
                truth: belief.truth,
                budget,
                premises: vec![edge.id.clone()],
                rule_name: self.name(),
                activation_factor: None,
            },
            Derivation {
                id: EdgeId::from(format!("Implication({},{})", q, p)),
                edge_type: EdgeType::Implication,
                args: vec![q, p],
                truth: belief.truth,
                budget,
                premises: vec![edge.id.clone()],
                rule_name: self.name(),
                activation_factor: None,
            },
        ]
    }
}

/// `Conjunction(A,B,...)` -> each conjunct, at reduced confidence.
pub struct ConjunctionDecomposition;

impl Rule for ConjunctionDecomposition {
    fn name(&self) -> &'static str {
        "conjunction_decomposition"
    }

    fn condition(&self, event: &Event, ctx: &RuleContext) -> bool {
        ctx.hypergraph
            .get(&event.edge)
            .is_some_and(|e| e.edge_type == EdgeType::Conjunction)
    }

    fn apply(&self, event: &Event, ctx: &RuleContext) -> Vec<Derivation> {
        let Some(edge) = ctx.hypergraph.get(&event.edge) else { return Vec::new() };
        let Some(belief) = edge.strongest() else { return Vec::new() };
        let budget = derived_budget(event, ctx.config.conjunction_decomposition_budget_factor);
        let activation_factor = Some(ctx.config.conjunction_decomposition_activation_factor);
        edge.args
            .iter()
            .filter_map(|conjunct| {
                let target = ctx.hypergraph.get(conjunct)?;
                let truth = TruthValue::new(belief.truth.frequency(), belief.truth.confidence() * 0.9);
                Some(Derivation {
                    id: conjunct.clone(),
                    edge_type: target.edge_type,
                    args: target.args.clone(),
                    truth,
                    budget,
                    premises: vec![edge.id.clone()],
                    rule_name: self.name(),
                    activation_factor,
                })
            })
            .collect()
    }
}

/// `Implication(P,Q1)` + `Implication(P,Q2)` -> `Implication(P, Conjunction(Q1,Q2))`.
/// Uses the shared `derivation_budget_decay` fallback rather than a dedicated
/// factor — it's the one built-in rule the config doc names as that constant's
/// remaining consumer.
pub struct ConsequentConjunction;

impl Rule for ConsequentConjunction {
    fn name(&self) -> &'static str {
        "consequent_conjunction"
    }

    fn condition(&self, event: &Event, ctx: &RuleContext) -> bool {
        ctx.hypergraph
            .get(&event.edge)
            .is_some_and(|e| e.edge_type == EdgeType::Implication)
    }

    fn apply(&self, event: &Event, ctx: &RuleContext) -> Vec<Derivation> {
        let Some(edge) = ctx.hypergraph.get(&event.edge) else { return Vec::new() };
        let Some(belief) = edge.strongest() else { return Vec::new() };
        let (p, q1) = (edge.args[0].clone(), edge.args[1].clone());

        let mut out = Vec::new();
        for other in edges_of_type_with_arg(ctx, &p, EdgeType::Implication, 0) {
            let q2 = other.args[1].clone();
            if q2 == q1 || other.id == edge.id {
                continue;
            }
            let Some(other_belief) = other.strongest() else { continue };
            let conj_id = EdgeId::from(format!("Conjunction({},{})", q1, q2));
            let truth = belief.truth;
            let _ = other_belief;
            out.push(Derivation {
                id: EdgeId::from(format!("Implication({},{})", p, conj_id)),
                edge_type: EdgeType::Implication,
                args: vec![p.clone(), conj_id],
                truth,
                budget: derived_budget(event, ctx.config.derivation_budget_decay),
                premises: vec![edge.id.clone(), other.id.clone()],
                rule_name: self.name(),
                activation_factor: None,
            });
        }
        out
    }
}

/// `TemporalRelation(a,r1,b)` + `TemporalRelation(b,r2,c)` -> `TemporalRelation(a,r3,c)`
/// where `r3` is read off the Allen composition table.
pub struct TemporalTransitivity;

impl Rule for TemporalTransitivity {
    fn name(&self) -> &'static str {
        "temporal_transitivity"
    }

    fn condition(&self, event: &Event, ctx: &RuleContext) -> bool {
        ctx.hypergraph
            .get(&event.edge)
            .is_some_and(|e| e.edge_type == EdgeType::TemporalRelation)
    }

    fn apply(&self, event: &Event, ctx: &RuleContext) -> Vec<Derivation> {
        let Some(edge) = ctx.hypergraph.get(&event.edge) else { return Vec::new() };
        let Some(belief) = edge.strongest() else { return Vec::new() };
        let (a, rel1, b) = (edge.args[0].clone(), edge.args[1].clone(), edge.args[2].clone());
        let Ok(rel1) = crate::temporal::AllenRelation::parse(rel1.as_str()) else { return Vec::new() };

        let mut out = Vec::new();
        for next in edges_of_type_with_arg(ctx, &b, EdgeType::TemporalRelation, 0) {
            let rel2_str = next.args[1].clone();
            let c = next.args[2].clone();
            if c == a {
                continue;
            }
            let Ok(rel2) = crate::temporal::AllenRelation::parse(rel2_str.as_str()) else { continue };
            let Some(next_belief) = next.strongest() else { continue };
            for rel3 in crate::temporal::compose(rel1, rel2) {
                let truth = TruthValue::transitive(belief.truth, next_belief.truth);
                out.push(Derivation {
                    id: EdgeId::from(format!("TemporalRelation({},{},{})", a, rel3.token(), c)),
                    edge_type: EdgeType::TemporalRelation,
                    args: vec![a.clone(), EdgeId::from(rel3.token()), c.clone()],
                    truth,
                    budget: derived_budget(event, ctx.config.transitive_temporal_budget_factor),
                    premises: vec![edge.id.clone(), next.id.clone()],
                    rule_name: self.name(),
                    activation_factor: None,
                });
            }
        }
        out
    }
}

/// Watches for `Inheritance(Term(meta, configKey), Term(value))`-shaped beliefs
/// and reports the retuning as a `(configKey, value)` pair via
/// `ctx.meta_updates` rather than mutating the graph — lets an embedding host
/// (or another rule, via a learned shortcut) retune the kernel's own knobs
/// from within the reasoning process itself.
pub struct MetaLearning;

impl MetaLearning {
    /// `Term(meta,configKey)` parses as `meta(configKey)`; returns `configKey`
    /// if `edge` has that shape, else `None`.
    fn meta_config_key(edge: &Hyperedge) -> Option<String> {
        if edge.edge_type != EdgeType::Term || edge.args.len() != 1 {
            return None;
        }
        let head = edge.id.as_str();
        let open = head.find('(')?;
        if &head[..open] != "meta" {
            return None;
        }
        Some(edge.args[0].as_str().to_string())
    }
}

impl Rule for MetaLearning {
    fn name(&self) -> &'static str {
        "meta_learning"
    }

    fn condition(&self, event: &Event, ctx: &RuleContext) -> bool {
        ctx.hypergraph
            .get(&event.edge)
            .is_some_and(|e| e.edge_type == EdgeType::Inheritance)
    }

    fn apply(&self, event: &Event, ctx: &RuleContext) -> Vec<Derivation> {
        let Some(edge) = ctx.hypergraph.get(&event.edge) else { return Vec::new() };
        if edge.strongest().is_none() {
            return Vec::new();
        }
        let (subject, object) = (edge.args[0].clone(), edge.args[1].clone());
        let Some(subject_edge) = ctx.hypergraph.get(&subject) else { return Vec::new() };
        let Some(config_key) = Self::meta_config_key(&subject_edge) else { return Vec::new() };
        let Some(object_edge) = ctx.hypergraph.get(&object) else { return Vec::new() };
        if object_edge.edge_type != EdgeType::Term || !object_edge.args.is_empty() {
            return Vec::new();
        }
        let Ok(value) = object_edge.id.as_str().parse::<f64>() else { return Vec::new() };

        ctx.meta_updates.borrow_mut().push((config_key, value));
        Vec::new()
    }
}

/// Register every built-in rule at its default tunable priority.
pub fn register_all(registry: &mut crate::rules::RuleRegistry) -> Result<(), crate::error::RuleError> {
    registry.register(Box::new(InheritanceTransitivity), 0.9)?;
    registry.register(Box::new(ModusPonens), 0.9)?;
    registry.register(Box::new(EquivalenceDecomposition), 0.85)?;
    registry.register(Box::new(PropertyInheritance), 0.8)?;
    registry.register(Box::new(SimilarityFromInheritance), 0.75)?;
    registry.register(Box::new(SimilaritySymmetry), 0.7)?;
    registry.register(Box::new(Analogy), 0.65)?;
    registry.register(Box::new(Induction), 0.6)?;
    registry.register(Box::new(ConjunctionDecomposition), 0.55)?;
    registry.register(Box::new(ConsequentConjunction), 0.5)?;
    registry.register(Box::new(TemporalTransitivity), 0.5)?;
    registry.register(Box::new(MetaLearning), 0.4)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::Budget;
    use crate::config::Config;
    use crate::edge::Belief;
    use crate::hypergraph::Hypergraph;
    use crate::index::Indices;

    fn seed(hg: &mut Hypergraph) {
        for atom in ["tweety", "bird", "animal"] {
            hg.ensure_atom(atom.into(), 0);
        }
        hg.add_edge(
            "Inheritance(tweety,bird)".into(),
            EdgeType::Inheritance,
            vec!["tweety".into(), "bird".into()],
            Belief::asserted(TruthValue::new(0.9, 0.9), Budget::full(), 0),
            0,
        )
        .unwrap();
        hg.add_edge(
            "Inheritance(bird,animal)".into(),
            EdgeType::Inheritance,
            vec!["bird".into(), "animal".into()],
            Belief::asserted(TruthValue::new(0.9, 0.9), Budget::full(), 0),
            0,
        )
        .unwrap();
    }

    #[test]
    fn inheritance_transitivity_derives_expected_edge() {
        let mut hg = Hypergraph::new(8);
        seed(&mut hg);
        let idx = Indices::new(16, 16);
        let config = Config::default();
        let ctx = RuleContext::new(&hg, &idx, &config, 0);
        let event = Event::new("Inheritance(tweety,bird)".into(), Budget::full(), 0, 0, 1.0, Vec::new());
        let rule = InheritanceTransitivity;
        assert!(rule.condition(&event, &ctx));
        let derivations = rule.apply(&event, &ctx);
        assert_eq!(derivations.len(), 1);
        assert_eq!(derivations[0].id, EdgeId::from("Inheritance(tweety,animal)"));
        assert!((derivations[0].truth.frequency() - 0.81).abs() < 0.01);
    }

    #[test]
    fn similarity_from_inheritance_fires_on_single_premise() {
        let mut hg = Hypergraph::new(8);
        hg.ensure_atom("tweety".into(), 0);
        hg.ensure_atom("bird".into(), 0);
        hg.add_edge(
            "Inheritance(tweety,bird)".into(),
            EdgeType::Inheritance,
            vec!["tweety".into(), "bird".into()],
            Belief::asserted(TruthValue::new(0.9, 0.9), Budget::full(), 0),
            0,
        )
        .unwrap();
        let idx = Indices::new(16, 16);
        let config = Config::default();
        let ctx = RuleContext::new(&hg, &idx, &config, 0);
        let event = Event::new("Inheritance(tweety,bird)".into(), Budget::full(), 0, 0, 1.0, Vec::new());
        let out = SimilarityFromInheritance.apply(&event, &ctx);
        assert_eq!(out.len(), 1);
        assert!((out[0].truth.frequency() - 1.0).abs() < 1e-9);
        assert!((out[0].truth.confidence() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn similarity_symmetry_derives_reverse() {
        let mut hg = Hypergraph::new(8);
        hg.ensure_atom("a".into(), 0);
        hg.ensure_atom("b".into(), 0);
        hg.add_edge(
            "Similarity(a,b)".into(),
            EdgeType::Similarity,
            vec!["a".into(), "b".into()],
            Belief::asserted(TruthValue::new(0.8, 0.8), Budget::full(), 0),
            0,
        )
        .unwrap();
        let idx = Indices::new(16, 16);
        let config = Config::default();
        let ctx = RuleContext::new(&hg, &idx, &config, 0);
        let event = Event::new("Similarity(a,b)".into(), Budget::full(), 0, 0, 1.0, Vec::new());
        let out = SimilaritySymmetry.apply(&event, &ctx);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, EdgeId::from("Similarity(b,a)"));
    }

    #[test]
    fn modus_ponens_derives_consequent() {
        let mut hg = Hypergraph::new(8);
        hg.ensure_atom("p".into(), 0);
        hg.ensure_atom("q".into(), 0);
        hg.add_edge(
            "p".into(),
            EdgeType::Term,
            vec![],
            Belief::asserted(TruthValue::new(1.0, 0.9), Budget::full(), 0),
            0,
        )
        .unwrap();
        hg.add_edge(
            "Implication(p,q)".into(),
            EdgeType::Implication,
            vec!["p".into(), "q".into()],
            Belief::asserted(TruthValue::new(1.0, 0.9), Budget::full(), 0),
            0,
        )
        .unwrap();
        let idx = Indices::new(16, 16);
        let config = Config::default();
        let ctx = RuleContext::new(&hg, &idx, &config, 0);
        let event = Event::new("Implication(p,q)".into(), Budget::full(), 0, 0, 1.0, Vec::new());
        let out = ModusPonens.apply(&event, &ctx);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, EdgeId::from("q"));
        assert!((out[0].truth.frequency() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn equivalence_decomposes_into_both_implications() {
        let mut hg = Hypergraph::new(8);
        hg.ensure_atom("p".into(), 0);
        hg.ensure_atom("q".into(), 0);
        hg.add_edge(
            "Equivalence(p,q)".into(),
            EdgeType::Equivalence,
            vec!["p".into(), "q".into()],
            Belief::asserted(TruthValue::new(0.9, 0.9), Budget::full(), 0),
            0,
        )
        .unwrap();
        let idx = Indices::new(16, 16);
        let config = Config::default();
        let ctx = RuleContext::new(&hg, &idx, &config, 0);
        let event = Event::new("Equivalence(p,q)".into(), Budget::full(), 0, 0, 1.0, Vec::new());
        let out = EquivalenceDecomposition.apply(&event, &ctx);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn meta_learning_reports_config_update_without_mutating_graph() {
        let mut hg = Hypergraph::new(8);
        hg.ensure_atom("configKey".into(), 0);
        hg.add_edge(
            "meta(configKey)".into(),
            EdgeType::Term,
            vec!["configKey".into()],
            Belief::asserted(TruthValue::certain(), Budget::full(), 0),
            0,
        )
        .unwrap();
        hg.ensure_atom("0.2".into(), 0);
        hg.add_edge(
            "Inheritance(meta(configKey),0.2)".into(),
            EdgeType::Inheritance,
            vec!["meta(configKey)".into(), "0.2".into()],
            Belief::asserted(TruthValue::new(1.0, 0.9), Budget::full(), 0),
            0,
        )
        .unwrap();
        let idx = Indices::new(16, 16);
        let config = Config::default();
        let ctx = RuleContext::new(&hg, &idx, &config, 0);
        let event = Event::new("Inheritance(meta(configKey),0.2)".into(), Budget::full(), 0, 0, 1.0, Vec::new());
        let out = MetaLearning.apply(&event, &ctx);
        assert!(out.is_empty());
        let updates = ctx.meta_updates.borrow();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, "configKey");
        assert!((updates[0].1 - 0.2).abs() < 1e-9);
    }

    #[test]
    fn register_all_has_no_duplicate_names() {
        let mut registry = crate::rules::RuleRegistry::new();
        assert!(register_all(&mut registry).is_ok());
        assert_eq!(registry.entries().len(), 12);
    }
}
