//! Terms and the canonical, content-addressed identity of a hyperedge.
//!
//! A [`Term`] is either an atom (a bare string identifier) or a compound built
//! from an [`EdgeType`] and an ordered list of argument terms. A term's identity
//! is its canonical string form — there is no separately allocated id; the
//! string *is* the key, recursively computed bottom-up the same way the caller
//! builds the term tree.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::HypergraphError;

/// Canonical, interned identity of a hyperedge: `type(arg1,arg2,...)` for
/// compounds, or the bare atom name for atoms of type `Term`.
///
/// Cheap to clone (an `Arc<str>` under the hood) since the same id is copied
/// into every index that references an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(Arc<str>);

impl EdgeId {
    pub fn new(canonical: impl Into<Arc<str>>) -> Self {
        Self(canonical.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(s: &str) -> Self {
        Self::new(Arc::from(s))
    }
}

impl From<String> for EdgeId {
    fn from(s: String) -> Self {
        Self::new(Arc::from(s))
    }
}

/// The type tag of a hyperedge, fixing its arity contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    Inheritance,
    Similarity,
    Implication,
    Equivalence,
    Conjunction,
    Disjunction,
    Negation,
    Product,
    ImageExt,
    ImageInt,
    Term,
    TemporalRelation,
    TimeInterval,
    Property,
    Instance,
    Sequence,
    Concept,
    ActionConsequence,
}

impl EdgeType {
    /// Human-readable canonical-form name, matching the surface syntax's type tokens.
    pub fn name(&self) -> &'static str {
        match self {
            EdgeType::Inheritance => "Inheritance",
            EdgeType::Similarity => "Similarity",
            EdgeType::Implication => "Implication",
            EdgeType::Equivalence => "Equivalence",
            EdgeType::Conjunction => "Conjunction",
            EdgeType::Disjunction => "Disjunction",
            EdgeType::Negation => "Negation",
            EdgeType::Product => "Product",
            EdgeType::ImageExt => "ImageExt",
            EdgeType::ImageInt => "ImageInt",
            EdgeType::Term => "Term",
            EdgeType::TemporalRelation => "TemporalRelation",
            EdgeType::TimeInterval => "TimeInterval",
            EdgeType::Property => "Property",
            EdgeType::Instance => "Instance",
            EdgeType::Sequence => "Sequence",
            EdgeType::Concept => "Concept",
            EdgeType::ActionConsequence => "ActionConsequence",
        }
    }

    /// Fixed arity for this type, or `None` if the type is n-ary (any length >= 1).
    pub fn fixed_arity(&self) -> Option<usize> {
        match self {
            EdgeType::Inheritance
            | EdgeType::Similarity
            | EdgeType::Implication
            | EdgeType::Equivalence => Some(2),
            EdgeType::TemporalRelation => Some(3),
            EdgeType::Negation => Some(1),
            EdgeType::Term => Some(1),
            EdgeType::Conjunction
            | EdgeType::Disjunction
            | EdgeType::Product
            | EdgeType::ImageExt
            | EdgeType::ImageInt
            | EdgeType::TimeInterval
            | EdgeType::Property
            | EdgeType::Instance
            | EdgeType::Sequence
            | EdgeType::Concept
            | EdgeType::ActionConsequence => None,
        }
    }

    /// Validate that `arity` is acceptable for this type.
    pub fn check_arity(&self, arity: usize) -> Result<(), HypergraphError> {
        match self.fixed_arity() {
            Some(expected) if expected != arity => Err(HypergraphError::ArityMismatch {
                edge_type: self.name().to_string(),
                expected: expected.to_string(),
                actual: arity,
            }),
            Some(_) => Ok(()),
            None if arity == 0 => Err(HypergraphError::ArityMismatch {
                edge_type: self.name().to_string(),
                expected: ">=1".to_string(),
                actual: arity,
            }),
            None => Ok(()),
        }
    }
}

/// A term: an atom, or a compound of a type applied to ordered argument terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Atom(Arc<str>),
    Compound { edge_type: EdgeType, args: Vec<Term> },
}

impl Term {
    pub fn atom(name: impl Into<Arc<str>>) -> Self {
        Term::Atom(name.into())
    }

    pub fn compound(edge_type: EdgeType, args: Vec<Term>) -> Self {
        Term::Compound { edge_type, args }
    }

    /// The canonical id of this term: the bare atom name, or `type(arg1,...)`
    /// with each argument recursively canonicalized.
    pub fn canonical_id(&self) -> EdgeId {
        match self {
            Term::Atom(name) => EdgeId::new(Arc::clone(name)),
            Term::Compound { edge_type, args } => {
                let joined = args
                    .iter()
                    .map(|a| a.canonical_id().as_str().to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                EdgeId::from(format!("{}({})", edge_type.name(), joined))
            }
        }
    }

    /// The immediate argument ids of this term, empty for an atom.
    pub fn arg_ids(&self) -> Vec<EdgeId> {
        match self {
            Term::Atom(_) => Vec::new(),
            Term::Compound { args, .. } => args.iter().map(Term::canonical_id).collect(),
        }
    }
}
