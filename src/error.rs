//! Rich diagnostic error types for the reasoning kernel.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so an embedding host knows
//! exactly what went wrong and how to recover. The taxonomy follows *kinds*, not
//! mechanical per-function types: `InvalidInput` is always recoverable, an
//! `InvariantViolation` always means the kernel found its own bookkeeping broken.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the reasoning kernel.
#[derive(Debug, Error, Diagnostic)]
pub enum KernelError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Truth(#[from] TruthError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Budget(#[from] BudgetError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Hypergraph(#[from] HypergraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Contradiction(#[from] ContradictionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Learning(#[from] LearningError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Temporal(#[from] TemporalError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Result type threaded through the kernel's public API.
pub type KernelResult<T> = std::result::Result<T, KernelError>;

// ---------------------------------------------------------------------------
// Truth / budget arithmetic errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TruthError {
    #[error("frequency {value} out of range [0,1]")]
    #[diagnostic(
        code(nal::truth::frequency_range),
        help("Truth frequencies must lie in [0,1]. Clamp the value before constructing a TruthValue.")
    )]
    FrequencyOutOfRange { value: f64 },

    #[error("confidence {value} out of range [0,1)")]
    #[diagnostic(
        code(nal::truth::confidence_range),
        help("Truth confidences must lie in [0,1) — 1.0 is reserved for the unattainable `certain` limit.")
    )]
    ConfidenceOutOfRange { value: f64 },
}

#[derive(Debug, Error, Diagnostic)]
pub enum BudgetError {
    #[error("budget component {value} out of range [0,1]")]
    #[diagnostic(
        code(nal::budget::component_range),
        help("priority, durability and quality must each lie in [0,1]. Use Budget::clamp to sanitize inputs.")
    )]
    ComponentOutOfRange { value: f64 },
}

// ---------------------------------------------------------------------------
// Hypergraph / edge store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum HypergraphError {
    #[error("arity mismatch for type {edge_type}: expected {expected}, got {actual}")]
    #[diagnostic(
        code(nal::hypergraph::arity_mismatch),
        help("Each edge type has a fixed arity (binary for Inheritance/Similarity/Implication/Equivalence, n-ary for Conjunction/Disjunction/Product, ternary for TemporalRelation). Check the argument list.")
    )]
    ArityMismatch {
        edge_type: String,
        expected: String,
        actual: usize,
    },

    #[error("premise {premise} referenced by a new belief on {edge} does not exist")]
    #[diagnostic(
        code(nal::hypergraph::dangling_premise),
        help("Every premise id in a belief must already be present in the hypergraph, or be created in the same call. This indicates a bookkeeping bug in the caller or a derivation rule.")
    )]
    DanglingPremise { edge: String, premise: String },

    #[error("argument {arg} referenced by a new edge does not exist")]
    #[diagnostic(
        code(nal::hypergraph::dangling_argument),
        help("Every argument id must already be present in the hypergraph before it can be referenced. Register atoms with ensure_atom() first.")
    )]
    DanglingArgument { arg: String },

    #[error("edge {id} already exists with a different type or argument list")]
    #[diagnostic(
        code(nal::hypergraph::structural_mismatch),
        help("An edge's canonical id, type and argument list are fixed at creation. Use a different id for a statement with different structure.")
    )]
    StructuralMismatch { id: String },

    #[error("edge {id} not found")]
    #[diagnostic(
        code(nal::hypergraph::not_found),
        help("The requested edge id does not exist in the hypergraph. It may have been forgotten by the memory manager.")
    )]
    NotFound { id: String },
}

// ---------------------------------------------------------------------------
// Event queue errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EventError {
    #[error("event queue overflow: soft cap {cap} reached")]
    #[diagnostic(
        code(nal::event::queue_overflow),
        help("The event queue exceeded its soft cap; the lowest-priority event was dropped. Raise eventQueueSoftCap if this is frequent.")
    )]
    QueueOverflow { cap: usize },

    #[error("path length {length} exceeds maxPathLength {max}")]
    #[diagnostic(
        code(nal::event::path_too_long),
        help("Propagation chains are capped to prevent runaway derivation depth. Raise maxPathLength if this rejection is unexpected.")
    )]
    PathTooLong { length: usize, max: usize },
}

// ---------------------------------------------------------------------------
// Derivation / rule engine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RuleError {
    #[error("rule '{name}' is already registered")]
    #[diagnostic(
        code(nal::rule::duplicate_name),
        help("Rule names must be unique within a registry. Choose a different name or remove the existing rule first.")
    )]
    DuplicateName { name: String },

    #[error("derivation depth {depth} exceeds maxDerivationDepth {max}")]
    #[diagnostic(
        code(nal::rule::depth_exceeded),
        help("A single event produced a derivation chain deeper than maxDerivationDepth. This usually indicates a cyclic or overly productive rule set.")
    )]
    DepthExceeded { depth: usize, max: usize },
}

// ---------------------------------------------------------------------------
// Contradiction manager errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ContradictionError {
    #[error("no beliefs to resolve for edge {edge}")]
    #[diagnostic(
        code(nal::contradiction::nothing_to_resolve),
        help("resolve() was called on an edge with zero or one belief. Check analyze() first to see whether a contradiction actually exists.")
    )]
    NothingToResolve { edge: String },
}

// ---------------------------------------------------------------------------
// Memory manager errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum MemoryError {
    #[error("capacity must be greater than zero")]
    #[diagnostic(
        code(nal::memory::zero_capacity),
        help("The memory manager's edge capacity must be a positive integer.")
    )]
    ZeroCapacity,
}

// ---------------------------------------------------------------------------
// Learning engine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LearningError {
    #[error("experience buffer capacity must be greater than zero")]
    #[diagnostic(
        code(nal::learning::zero_buffer),
        help("experienceBufferMaxSize must be a positive integer.")
    )]
    ZeroBufferCapacity,
}

// ---------------------------------------------------------------------------
// Temporal reasoner errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TemporalError {
    #[error("constraint {a} {relation} {b} contradicts an existing constraint")]
    #[diagnostic(
        code(nal::temporal::contradictory_constraint),
        help("Composing the existing relation between these terms with the inverse of the proposed relation yielded an empty set. The new constraint was rejected rather than silently overwriting the old one.")
    )]
    ContradictoryConstraint {
        a: String,
        b: String,
        relation: String,
    },

    #[error("unknown Allen relation token '{token}'")]
    #[diagnostic(
        code(nal::temporal::unknown_relation),
        help("Valid relations are the 13 Allen interval relations: before, after, meets, metBy, overlaps, overlappedBy, starts, startedBy, during, contains, finishes, finishedBy, equals.")
    )]
    UnknownRelation { token: String },
}

// ---------------------------------------------------------------------------
// Persistence errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PersistError {
    #[error("failed to serialize kernel snapshot: {message}")]
    #[diagnostic(
        code(nal::persist::serialize),
        help("The snapshot failed to encode to JSON. This should not happen for well-formed kernel state — please file a bug report.")
    )]
    Serialize { message: String },

    #[error("failed to deserialize kernel snapshot: {message}")]
    #[diagnostic(
        code(nal::persist::deserialize),
        help("The snapshot bytes could not be parsed. Check that they were produced by a compatible saveState() version.")
    )]
    Deserialize { message: String },

    #[error("snapshot version '{found}' is not supported (expected '{expected}')")]
    #[diagnostic(
        code(nal::persist::version_mismatch),
        help("loadState() only accepts snapshots whose version field matches this build's format. Migrate the snapshot out-of-band if the format has changed.")
    )]
    VersionMismatch { expected: String, found: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("configuration key '{key}' must be positive, got {value}")]
    #[diagnostic(
        code(nal::config::must_be_positive),
        help("Capacity and size keys must be strictly positive integers.")
    )]
    MustBePositive { key: String, value: i64 },

    #[error("configuration key '{key}' must lie in [0,1], got {value}")]
    #[diagnostic(
        code(nal::config::unit_range),
        help("Decay factors, thresholds and budget weights are all probabilities or proportions and must lie in [0,1].")
    )]
    UnitRange { key: String, value: f64 },

    #[error("failed to parse configuration: {message}")]
    #[diagnostic(
        code(nal::config::parse),
        help("The configuration text is not valid TOML, or does not match the Config schema.")
    )]
    Parse { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_error_wraps_subsystem_errors() {
        let e: KernelError = TruthError::FrequencyOutOfRange { value: 2.0 }.into();
        assert!(matches!(e, KernelError::Truth(_)));
        assert!(e.to_string().contains("out of range"));
    }

    #[test]
    fn diagnostic_codes_present() {
        let e = HypergraphError::NotFound { id: "Inheritance(a,b)".into() };
        assert_eq!(e.code().unwrap().to_string(), "nal::hypergraph::not_found");
    }
}
