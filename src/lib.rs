// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # nalkernel
//!
//! A non-axiomatic reasoning kernel: a hypergraph of uncertain, budgeted
//! beliefs that propagates forward under an attention economy rather than a
//! fixed proof procedure.
//!
//! ## Architecture
//!
//! - **Data model** (`term`, `edge`, `truth`, `budget`): content-addressed terms,
//!   the hyperedges and beliefs built from them, and the two small numeric
//!   systems (truth-value combinators, attention budgets) everything else runs on.
//! - **Store** (`hypergraph`, `index`): the hyperedge store and its derived
//!   indices (by type, by argument, by structure, plus bounded derivation and
//!   path caches).
//! - **Propagation** (`event`, `rules`): a priority event queue and a
//!   condition-dispatched rule registry that together drive forward inference.
//! - **Quality control** (`contradiction`, `memory`, `learning`): belief-scoped
//!   contradiction detection, deterministic forgetting under capacity, and a
//!   meta-learning pass that retunes rule priorities from observed outcomes.
//! - **Extensions** (`temporal`, `pattern`, `questions`): Allen interval-algebra
//!   reasoning, the surface statement parser/matcher, and step-counted
//!   blocking questions.
//! - **Facade** (`kernel`, `config`, `persist`): the single entry point an
//!   embedding host drives, its configuration, and snapshot persistence.
//!
//! ## Library usage
//!
//! ```no_run
//! use nalkernel::config::Config;
//! use nalkernel::kernel::Kernel;
//!
//! let mut kernel = Kernel::new(Config::default()).unwrap();
//! kernel.assert("Inheritance(tweety,bird) %0.9;0.9%").unwrap();
//! kernel.assert("Inheritance(bird,animal) %0.9;0.9%").unwrap();
//! kernel.run(20).unwrap();
//! let matches = kernel.query("Inheritance(tweety,animal)").unwrap();
//! assert!(!matches.is_empty());
//! ```

pub mod budget;
pub mod config;
pub mod contradiction;
pub mod edge;
pub mod error;
pub mod event;
pub mod hypergraph;
pub mod index;
pub mod kernel;
pub mod learning;
pub mod memory;
pub mod pattern;
pub mod persist;
pub mod questions;
pub mod rules;
pub mod temporal;
pub mod term;
pub mod truth;
