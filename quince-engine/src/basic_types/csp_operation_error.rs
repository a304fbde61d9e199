use thiserror::Error;

#[cfg(doc)]
use crate::ConstraintGraph;

/// Errors reported by the operations on a [`ConstraintGraph`].
///
/// Every variant except [`CspOperationError::Unsolvable`] is recoverable: the
/// failed operation has not mutated any state and the caller may retry with
/// different inputs. `Unsolvable` is fatal for the graph instance; once it is
/// raised, every subsequent mutating call is rejected with the same error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CspOperationError {
    /// The requested value is not in the variable's current legal set.
    #[error("value is not in the current legal set of variable '{variable}'")]
    IllegalValue { variable: String },
    /// An incident constraint rejected the assignment because a neighbouring
    /// variable is committed to a conflicting value; all pruning performed
    /// for the attempt has been rolled back.
    #[error("assigning variable '{variable}' conflicts with a neighbouring assignment")]
    ConflictingAssignment { variable: String },
    /// The variable holds a fixed value, which can never be changed or
    /// cleared.
    #[error("variable '{variable}' is fixed and cannot be modified")]
    FixedValueImmutable { variable: String },
    /// A variable with the same name already exists in the graph.
    #[error("a variable named '{name}' already exists in the graph")]
    DuplicateName { name: String },
    /// No variable with the given name exists in the graph.
    #[error("no variable named '{name}' exists in the graph")]
    UnknownVariable { name: String },
    /// Both endpoints of a constraint refer to the same variable.
    #[error("a constraint cannot relate variable '{variable}' to itself")]
    SelfConstraint { variable: String },
    /// The constraint does not relate to the given variable.
    #[error("the constraint does not relate to variable '{variable}'")]
    UnrelatedConstraint { variable: String },
    /// Arc revision found that a fixed or unrecoverable assignment has no
    /// support; the problem admits no solution.
    #[error("the problem is unsolvable: the assignment of variable '{variable}' has no support")]
    Unsolvable { variable: String },
}
