use std::fmt;

use log::warn;

use crate::basic_types::CspOperationError;
use crate::containers::HashMap;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::engine::constraint::Constraint;
use crate::engine::constraint::ConstraintId;
use crate::engine::variable::DomainValue;
use crate::engine::variable::Variable;
use crate::engine::variable::VariableId;
use crate::quince_assert_simple;

/// Health of the graph as a whole.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum GraphHealth {
    /// No global verdict has been reached; satisfiability is derived from
    /// the constraints' validity flags.
    Consistent,
    /// A clamp to a fixed value failed. Permanent: the graph reports
    /// unsatisfiable from here on, though local operations remain allowed.
    ClampFailed,
    /// Arc revision proved the problem unsolvable. Permanent and fatal:
    /// every further mutating operation is rejected.
    Unsolvable { variable: String },
}

/// A finite-domain constraint satisfaction problem: variables keyed by name,
/// pairwise constraints, and the propagation machinery connecting them.
///
/// Variables and constraints are stored in arenas owned by the graph and
/// addressed through [`VariableId`]/[`ConstraintId`] handles; a variable
/// holds handles of its incident constraints rather than references, so the
/// cyclic variable/constraint structure needs no shared ownership.
///
/// The graph is single-threaded and synchronous: every operation runs to
/// completion before returning. Embedding in a concurrent host requires
/// external serialization, e.g. one exclusive lock around the whole graph.
pub struct ConstraintGraph<V> {
    pub(crate) variables: KeyedVec<VariableId, Variable<V>>,
    pub(crate) constraints: KeyedVec<ConstraintId, Constraint<V>>,
    names: HashMap<String, VariableId>,
    pub(crate) health: GraphHealth,
}

impl<V: DomainValue> Default for ConstraintGraph<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: DomainValue> ConstraintGraph<V> {
    pub fn new() -> Self {
        ConstraintGraph {
            variables: KeyedVec::default(),
            constraints: KeyedVec::default(),
            names: HashMap::default(),
            health: GraphHealth::Consistent,
        }
    }

    /// Add a variable to the graph.
    ///
    /// Fails with [`CspOperationError::DuplicateName`] if a variable with
    /// the same name is already present.
    pub fn add_variable(&mut self, variable: Variable<V>) -> Result<VariableId, CspOperationError> {
        if self.names.contains_key(variable.name()) {
            return Err(CspOperationError::DuplicateName {
                name: variable.name().to_owned(),
            });
        }

        let name = variable.name().to_owned();
        let id = self.variables.push(variable);
        let _ = self.names.insert(name, id);

        Ok(id)
    }

    /// Add a constraint between two previously-added variables and register
    /// it with both endpoints.
    ///
    /// The predicate is evaluated as `predicate(known_value, candidate_value)`
    /// during forward checking; see [`Constraint`] for the argument-order
    /// contract. Existing assignments are *not* re-validated against the new
    /// constraint; callers add constraints before relying on their effect, or
    /// run [`revise_constraint`](Self::revise_constraint) manually.
    ///
    /// Fails with [`CspOperationError::SelfConstraint`] if both endpoints are
    /// the same variable.
    pub fn add_constraint(
        &mut self,
        a: VariableId,
        b: VariableId,
        predicate: impl Fn(&V, &V) -> bool + 'static,
    ) -> Result<ConstraintId, CspOperationError> {
        quince_assert_simple!(
            a.index() < self.variables.len() && b.index() < self.variables.len(),
            "constraint endpoints must belong to this graph"
        );

        if a == b {
            return Err(CspOperationError::SelfConstraint {
                variable: self.variables[a].name().to_owned(),
            });
        }

        let id = self.constraints.push(Constraint::new(a, b, Box::new(predicate)));
        self.variables[a].attach_constraint(id);
        self.variables[b].attach_constraint(id);

        Ok(id)
    }

    /// Clamp variables to fixed values, by name, through
    /// [`set_fixed`](Self::set_fixed).
    ///
    /// The first failing clamp permanently marks the graph unsatisfiable and
    /// stops the iteration; the remaining pairs are not applied.
    pub fn clamp_values<I, S>(&mut self, clamps: I) -> Result<(), CspOperationError>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
    {
        for (name, value) in clamps {
            self.set_fixed(name.as_ref(), value)?;
        }

        Ok(())
    }

    /// Assign a value to the named variable. See
    /// [`set_value`](Self::set_value).
    pub fn set_value_by_name(&mut self, name: &str, value: V) -> Result<(), CspOperationError> {
        let id = self.lookup(name)?;
        self.set_value(id, value)
    }

    /// Clamp the named variable to a fixed value. A failed clamp permanently
    /// marks the whole graph unsatisfiable, unlike a failed
    /// [`set_fixed_value`](Self::set_fixed_value) on the variable itself.
    pub fn set_fixed(&mut self, name: &str, value: V) -> Result<(), CspOperationError> {
        let result = self
            .lookup(name)
            .and_then(|id| self.set_fixed_value(id, value));

        if result.is_err() && matches!(self.health, GraphHealth::Consistent) {
            warn!("clamping '{name}' to a fixed value failed; the graph can no longer be satisfied");
            self.health = GraphHealth::ClampFailed;
        }

        result
    }

    /// Whether the graph still admits the possibility of a consistent global
    /// assignment: no clamp has failed, no unsolvability verdict has been
    /// reached, and every constraint's validity flag holds.
    pub fn satisfiable(&self) -> bool {
        matches!(self.health, GraphHealth::Consistent)
            && self.constraints.iter().all(Constraint::is_valid)
    }

    pub fn variable_id(&self, name: &str) -> Option<VariableId> {
        self.names.get(name).copied()
    }

    pub fn variable(&self, id: VariableId) -> &Variable<V> {
        &self.variables[id]
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable<V>> {
        self.variables.iter()
    }

    pub fn variable_ids(&self) -> impl Iterator<Item = VariableId> {
        self.variables.keys()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn constraint(&self, id: ConstraintId) -> &Constraint<V> {
        &self.constraints[id]
    }

    pub fn constraint_ids(&self) -> impl Iterator<Item = ConstraintId> {
        self.constraints.keys()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// The constraints registered against a variable, in registration order.
    pub fn constraints_of(&self, id: VariableId) -> &[ConstraintId] {
        self.variables[id].constrained_by()
    }

    pub fn endpoints(&self, id: ConstraintId) -> (VariableId, VariableId) {
        self.constraints[id].endpoints()
    }

    pub fn endpoint_names(&self, id: ConstraintId) -> (&str, &str) {
        let (a, b) = self.constraints[id].endpoints();
        (self.variables[a].name(), self.variables[b].name())
    }

    fn lookup(&self, name: &str) -> Result<VariableId, CspOperationError> {
        self.variable_id(name)
            .ok_or_else(|| CspOperationError::UnknownVariable {
                name: name.to_owned(),
            })
    }

    /// Rejects mutation once the graph has been proven unsolvable.
    pub(crate) fn ensure_mutable(&self) -> Result<(), CspOperationError> {
        match &self.health {
            GraphHealth::Unsolvable { variable } => Err(CspOperationError::Unsolvable {
                variable: variable.clone(),
            }),
            GraphHealth::Consistent | GraphHealth::ClampFailed => Ok(()),
        }
    }

    pub(crate) fn mark_unsolvable(&mut self, variable: &str) {
        warn!("the assignment of '{variable}' has no support; the problem is unsolvable");
        self.health = GraphHealth::Unsolvable {
            variable: variable.to_owned(),
        };
    }
}

impl<V: DomainValue> fmt::Debug for ConstraintGraph<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintGraph")
            .field("variables", &self.variables)
            .field("constraints", &self.constraints)
            .field("health", &self.health)
            .finish()
    }
}
