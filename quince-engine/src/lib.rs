//! # Quince
//! Quince is a propagation engine for finite-domain constraint satisfaction
//! problems (CSPs): variables over finite domains, linked by pairwise
//! constraints, with propagation that prunes impossible values as variables
//! are assigned and restores them as assignments are retracted.
//!
//! The engine deliberately stops short of search. It exposes the primitives
//! a backtracking driver calls — assignment with forward checking,
//! retraction, arc revision, and the domain-size queries that ordering
//! heuristics need — but it never selects variables or tries values itself.
//!
//! # Using Quince
//! A problem is built incrementally: **variables** first, then the
//! **constraints** between them. Each constraint is an arbitrary pure
//! predicate over a pair of values:
//! ```rust
//! use quince_engine::ConstraintGraph;
//! use quince_engine::Variable;
//!
//! let mut graph = ConstraintGraph::new();
//! let x = graph.add_variable(Variable::new("x", [1, 2, 3]))?;
//! let y = graph.add_variable(Variable::new("y", [1, 2, 3]))?;
//! let not_equal = graph.add_constraint(x, y, |a, b| a != b)?;
//!
//! // Assigning x forward-checks the constraint and prunes y.
//! graph.set_value(x, 2)?;
//! assert!(!graph.is_legal(y, &2));
//! assert_eq!(graph.variable(y).num_legal(), 2);
//! assert!(graph.satisfiable());
//!
//! // Retracting the assignment restores y's options.
//! assert!(graph.clear_value(x)?);
//! assert_eq!(graph.variable(y).num_legal(), 3);
//! # let _ = not_equal;
//! # Ok::<(), quince_engine::CspOperationError>(())
//! ```
//!
//! **Arc revision** prunes values that no possible value of a neighbour can
//! support, without requiring an assignment. An external AC-3 style driver
//! would keep revising until no call reports a removal:
//! ```rust
//! use quince_engine::ConstraintGraph;
//! use quince_engine::Variable;
//!
//! let mut graph = ConstraintGraph::new();
//! let x = graph.add_variable(Variable::new("x", [1i32, 2]))?;
//! let y = graph.add_variable(Variable::new("y", [1, 2, 3]))?;
//! let far_apart = graph.add_constraint(x, y, |a, b| (a - b).abs() >= 2)?;
//!
//! // Only y = 3 has a support in x's domain.
//! assert!(graph.revise_constraint(far_apart, y)?);
//! assert!(graph.variable(y).is_legal(&3));
//! assert_eq!(graph.variable(y).num_legal(), 1);
//! # Ok::<(), quince_engine::CspOperationError>(())
//! ```
//!
//! Failed assignments never leave partial pruning behind: if any incident
//! constraint rejects an assignment, every pruning performed for the attempt
//! is rolled back before the error is returned. The one unrecoverable
//! failure is [`CspOperationError::Unsolvable`], raised when revision proves
//! that a committed assignment has no support.
//!
//! ## Feature Flags
//! - `debug-checks`: Enable the more expensive internal consistency
//!   assertions. Off by default.
pub(crate) mod basic_types;
pub mod containers;
pub(crate) mod engine;
#[doc(hidden)]
pub mod quince_asserts;

pub use crate::basic_types::CspOperationError;
pub use crate::engine::Constraint;
pub use crate::engine::ConstraintGraph;
pub use crate::engine::ConstraintId;
pub use crate::engine::DomainValue;
pub use crate::engine::Variable;
pub use crate::engine::VariableId;
