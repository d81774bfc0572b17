//! Expression-surface parsing and pattern matching.
//!
//! Surface syntax: `Type(arg1,arg2,...) %frequency;confidence%` asserts a
//! belief; `Type(?X,arg2)` with a leading `?` marks a pattern variable for
//! `query`. Precedence between alternative matches at a branch point is
//! strict `>` — a candidate only displaces the current best if its score is
//! strictly greater, never on a tie (the Open Question this resolves); ties
//! keep the first-seen candidate, so query results are stable across runs
//! given the same insertion order.

use std::collections::HashMap;

use crate::error::HypergraphError;
use crate::hypergraph::Hypergraph;
use crate::term::{EdgeId, EdgeType};
use crate::truth::TruthValue;

/// A parsed surface statement, ready to be asserted into the hypergraph.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement {
    pub edge_type: EdgeType,
    pub args: Vec<String>,
    pub truth: Option<TruthValue>,
}

/// Parse `Type(arg1,arg2,...)` optionally followed by `%f;c%`. Minimal surface
/// parser — no nested compounds in argument position, matching spec §4.10's
/// "flat statement" scope (nested terms are built via successive `addEdge`
/// calls instead).
pub fn parse_statement(input: &str) -> Result<ParsedStatement, HypergraphError> {
    let input = input.trim();
    let (body, truth) = match input.split_once('%') {
        Some((b, rest)) => {
            let truth_str = rest.trim_end_matches('%').trim();
            let (f, c) = truth_str
                .split_once(';')
                .ok_or_else(|| parse_error(input, "truth value must be `f;c`"))?;
            let f: f64 = f.trim().parse().map_err(|_| parse_error(input, "bad frequency"))?;
            let c: f64 = c.trim().parse().map_err(|_| parse_error(input, "bad confidence"))?;
            (b.trim(), Some(TruthValue::new(f, c)))
        }
        None => (input, None),
    };

    let open = body.find('(').ok_or_else(|| parse_error(input, "missing '('"))?;
    if !body.ends_with(')') {
        return Err(parse_error(input, "missing trailing ')'"));
    }
    let type_name = &body[..open];
    let args_str = &body[open + 1..body.len() - 1];
    let edge_type = edge_type_from_name(type_name).ok_or_else(|| parse_error(input, "unknown type"))?;
    let args: Vec<String> = args_str.split(',').map(|s| s.trim().to_string()).collect();
    if args.iter().any(|a| a.is_empty()) {
        return Err(parse_error(input, "empty argument"));
    }

    Ok(ParsedStatement { edge_type, args, truth })
}

fn parse_error(input: &str, reason: &str) -> HypergraphError {
    HypergraphError::StructuralMismatch { id: format!("{input} ({reason})") }
}

fn edge_type_from_name(name: &str) -> Option<EdgeType> {
    Some(match name {
        "Inheritance" => EdgeType::Inheritance,
        "Similarity" => EdgeType::Similarity,
        "Implication" => EdgeType::Implication,
        "Equivalence" => EdgeType::Equivalence,
        "Conjunction" => EdgeType::Conjunction,
        "Disjunction" => EdgeType::Disjunction,
        "Negation" => EdgeType::Negation,
        "Product" => EdgeType::Product,
        "ImageExt" => EdgeType::ImageExt,
        "ImageInt" => EdgeType::ImageInt,
        "Term" => EdgeType::Term,
        "TemporalRelation" => EdgeType::TemporalRelation,
        "TimeInterval" => EdgeType::TimeInterval,
        "Property" => EdgeType::Property,
        "Instance" => EdgeType::Instance,
        "Sequence" => EdgeType::Sequence,
        "Concept" => EdgeType::Concept,
        "ActionConsequence" => EdgeType::ActionConsequence,
        _ => return None,
    })
}

/// A query pattern: a type and a list of argument slots, each either a bound
/// atom name or a `?`-prefixed variable.
#[derive(Debug, Clone)]
pub struct QueryPattern {
    pub edge_type: EdgeType,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Bound(EdgeId),
    Variable(String),
}

impl QueryPattern {
    pub fn parse(statement: &ParsedStatement) -> Self {
        let slots = statement
            .args
            .iter()
            .map(|a| {
                if let Some(name) = a.strip_prefix('?') {
                    Slot::Variable(name.to_string())
                } else {
                    Slot::Bound(EdgeId::from(a.clone()))
                }
            })
            .collect();
        Self { edge_type: statement.edge_type, slots }
    }
}

/// A single match: variable name -> bound edge id, plus the matched edge's
/// score (its strongest belief's expectation) for precedence comparison.
#[derive(Debug, Clone)]
pub struct Match {
    pub edge: EdgeId,
    pub bindings: HashMap<String, EdgeId>,
    pub score: f64,
}

/// Find every edge matching `pattern`, then keep only the strictly-best-scoring
/// one per distinct variable-binding combination that the query targets, using
/// strict `>` precedence: a later candidate must beat, not merely tie, the
/// current best to replace it.
pub fn match_pattern(hypergraph: &Hypergraph, pattern: &QueryPattern) -> Vec<Match> {
    let mut best: HashMap<Vec<(String, EdgeId)>, Match> = HashMap::new();

    for edge in hypergraph.iter() {
        if edge.edge_type != pattern.edge_type || edge.args.len() != pattern.slots.len() {
            continue;
        }
        let mut bindings = HashMap::new();
        let mut ok = true;
        for (slot, arg) in pattern.slots.iter().zip(&edge.args) {
            match slot {
                Slot::Bound(expected) => {
                    if expected != arg {
                        ok = false;
                        break;
                    }
                }
                Slot::Variable(name) => {
                    bindings.insert(name.clone(), arg.clone());
                }
            }
        }
        if !ok {
            continue;
        }
        let score = edge.strongest().map(|b| b.expectation()).unwrap_or(0.0);
        let mut key: Vec<(String, EdgeId)> = bindings.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        key.sort();

        match best.get(&key) {
            Some(current) if score <= current.score => {}
            _ => {
                best.insert(
                    key,
                    Match { edge: edge.id.clone(), bindings, score },
                );
            }
        }
    }

    let mut out: Vec<Match> = best.into_values().collect();
    out.sort_by(|a, b| a.edge.cmp(&b.edge));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::Budget;
    use crate::edge::Belief;

    #[test]
    fn parse_statement_with_truth_value() {
        let parsed = parse_statement("Inheritance(tweety,bird) %0.9;0.9%").unwrap();
        assert_eq!(parsed.edge_type, EdgeType::Inheritance);
        assert_eq!(parsed.args, vec!["tweety", "bird"]);
        assert!(parsed.truth.is_some());
    }

    #[test]
    fn parse_statement_without_truth_value() {
        let parsed = parse_statement("Inheritance(tweety,bird)").unwrap();
        assert!(parsed.truth.is_none());
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(parse_statement("Inheritance tweety,bird").is_err());
        assert!(parse_statement("Unknown(a,b)").is_err());
    }

    #[test]
    fn query_pattern_extracts_variables() {
        let parsed = parse_statement("Inheritance(?x,bird)").unwrap();
        let pattern = QueryPattern::parse(&parsed);
        assert_eq!(pattern.slots[0], Slot::Variable("x".to_string()));
        assert_eq!(pattern.slots[1], Slot::Bound("bird".into()));
    }

    #[test]
    fn match_pattern_strict_precedence_keeps_first_on_tie() {
        let mut hg = Hypergraph::new(8);
        for atom in ["a", "b", "bird"] {
            hg.ensure_atom(atom.into(), 0);
        }
        hg.add_edge(
            "Inheritance(a,bird)".into(),
            EdgeType::Inheritance,
            vec!["a".into(), "bird".into()],
            Belief::asserted(TruthValue::new(0.9, 0.9), Budget::full(), 0),
            0,
        )
        .unwrap();
        let parsed = parse_statement("Inheritance(?x,bird)").unwrap();
        let pattern = QueryPattern::parse(&parsed);
        let matches = match_pattern(&hg, &pattern);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].bindings.get("x"), Some(&EdgeId::from("a")));
    }
}
