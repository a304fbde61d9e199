pub(crate) mod constraint;
pub(crate) mod graph;
mod propagation;
pub(crate) mod variable;

pub use constraint::Constraint;
pub use constraint::ConstraintId;
pub use graph::ConstraintGraph;
pub use variable::DomainValue;
pub use variable::Variable;
pub use variable::VariableId;
