//! The propagation operations of the engine: forward checking on
//! assignment, restoration on retraction, and one-directional arc revision.
//!
//! All operations keep the legal/illegal partition of every touched variable
//! intact, whether they succeed or fail. Failing operations roll their
//! partial effects back before returning; the candidate collection for each
//! step is gathered against immutable borrows first and applied to the
//! variable arena afterwards.

use log::warn;

use crate::basic_types::CspOperationError;
use crate::basic_types::UndoLog;
use crate::engine::constraint::ConstraintId;
use crate::engine::graph::ConstraintGraph;
use crate::engine::variable::DomainValue;
use crate::engine::variable::VariableId;

impl<V: DomainValue> ConstraintGraph<V> {
    /// Assign `value` to a variable, forward-checking every incident
    /// constraint.
    ///
    /// Fails with [`CspOperationError::FixedValueImmutable`] on a fixed
    /// variable and with [`CspOperationError::IllegalValue`] when `value` is
    /// not in the current legal set.
    ///
    /// Each incident constraint prunes the values at its other endpoint that
    /// are incompatible with `value`. The first constraint that cannot be
    /// applied (because the other endpoint is committed to a conflicting
    /// value) aborts the whole operation: every constraint applied so far is
    /// undone in reverse order and the error is reported without the value
    /// having been assigned. Assignment is therefore all-or-nothing with
    /// respect to neighbour pruning.
    ///
    /// Assigning over an existing assignment does not first retract the old
    /// assignment's prunings; drivers [`clear_value`](Self::clear_value)
    /// before reassigning.
    pub fn set_value(&mut self, var: VariableId, value: V) -> Result<(), CspOperationError> {
        self.ensure_mutable()?;

        if self.variables[var].is_fixed() {
            return Err(CspOperationError::FixedValueImmutable {
                variable: self.variables[var].name().to_owned(),
            });
        }
        if !self.variables[var].is_legal(&value) {
            return Err(CspOperationError::IllegalValue {
                variable: self.variables[var].name().to_owned(),
            });
        }

        let incident: Vec<ConstraintId> = self.variables[var].constrained_by().to_vec();
        let mut applied = UndoLog::default();
        for constraint_id in incident {
            if self.apply_constraint(constraint_id, var, Some(&value)) {
                applied.push(constraint_id);
                continue;
            }

            // Unwind the prunings of every constraint that did apply, then
            // clear the failed constraint itself so that its validity flag
            // reflects the rolled-back state.
            let undo: Vec<ConstraintId> = applied.unwind().collect();
            for undone in undo {
                let _ = self.clear_constraint(undone, var, Some(&value));
            }
            let _ = self.clear_constraint(constraint_id, var, Some(&value));

            return Err(CspOperationError::ConflictingAssignment {
                variable: self.variables[var].name().to_owned(),
            });
        }

        self.variables[var].assign(value);
        Ok(())
    }

    /// Assign `value` and lock it in: the legal set collapses to the value,
    /// the rest of the domain becomes illegal, and neither
    /// [`set_value`](Self::set_value) to a different value nor
    /// [`clear_value`](Self::clear_value) can touch the variable afterwards.
    pub fn set_fixed_value(&mut self, var: VariableId, value: V) -> Result<(), CspOperationError> {
        self.set_value(var, value.clone())?;
        self.variables[var].fix(&value);
        Ok(())
    }

    /// Retract a variable's assignment and let every incident constraint
    /// restore the values it had pruned at its other endpoint because of the
    /// retracted value.
    ///
    /// Returns `Ok(true)` when there was nothing to clear, or when at least
    /// one incident constraint reported a successful clearance. `Ok(false)`
    /// means the value was removed but no constraint recovered anything.
    /// Note that success is a heuristic, not a proof that global consistency
    /// has been restored; a stricter caller should follow up with
    /// [`revise_constraint`](Self::revise_constraint) on the neighbours.
    pub fn clear_value(&mut self, var: VariableId) -> Result<bool, CspOperationError> {
        self.ensure_mutable()?;

        if self.variables[var].is_fixed() {
            return Err(CspOperationError::FixedValueImmutable {
                variable: self.variables[var].name().to_owned(),
            });
        }

        let Some(cleared) = self.variables[var].take_value() else {
            // Clearing an empty variable is a no-op success.
            return Ok(true);
        };

        let incident: Vec<ConstraintId> = self.variables[var].constrained_by().to_vec();
        let mut recovered = 0_usize;
        for constraint_id in incident {
            if self.clear_constraint(constraint_id, var, Some(&cleared)) {
                recovered += 1;
            }
        }

        Ok(recovered > 0)
    }

    /// Move `value` from the variable's legal to its illegal set.
    ///
    /// Trivially succeeds when the value is already not legal; fails only
    /// when `value` is the variable's current assignment, or when the graph
    /// has been proven unsolvable.
    pub fn remove_legal_value(&mut self, var: VariableId, value: &V) -> bool {
        if self.ensure_mutable().is_err() {
            return false;
        }

        self.variables[var].remove_legal(value)
    }

    /// Move `value` from the variable's illegal set back to its legal set,
    /// provided it belongs to the domain and every incident constraint
    /// agrees with the restoration. The first rejecting constraint stops the
    /// scan.
    ///
    /// A fixed variable's partition never changes: restoring anything other
    /// than its own (already legal) value fails.
    pub fn restore_legal_value(&mut self, var: VariableId, value: &V) -> bool {
        if self.ensure_mutable().is_err() {
            return false;
        }

        if !self.variables[var].in_domain(value) {
            return false;
        }
        if self.variables[var].is_legal(value) {
            return true;
        }
        if self.variables[var].is_fixed() {
            return false;
        }

        let agreed = self.variables[var]
            .constrained_by()
            .iter()
            .all(|&constraint_id| self.check_constraint(constraint_id, var, Some(value)));
        if !agreed {
            return false;
        }

        self.variables[var].restore_legal(value);
        true
    }

    /// Whether `value` is currently legal for the variable.
    pub fn is_legal(&self, var: VariableId, value: &V) -> bool {
        self.variables[var].is_legal(value)
    }

    /// Impose a constraint on the endpoint opposite `from`, based on `from`
    /// holding `value`: every legal value there that is incompatible with
    /// `value` is pruned.
    ///
    /// Trivially succeeds on an empty value. If one of the prunings fails
    /// (the opposite endpoint is committed to a conflicting value), the
    /// prunings already performed by this call are rolled back in reverse
    /// order, the constraint is flagged invalid, and the call fails.
    pub(crate) fn apply_constraint(
        &mut self,
        constraint_id: ConstraintId,
        from: VariableId,
        value: Option<&V>,
    ) -> bool {
        let Some(value) = value else {
            return true;
        };

        let (other, other_index) = self.constraints[constraint_id].other_endpoint(from);
        let conflicting: Vec<V> = {
            let constraint = &self.constraints[constraint_id];
            self.variables[other]
                .legal_values()
                .filter(|&candidate| !constraint.evaluate(value, candidate))
                .cloned()
                .collect()
        };

        let mut removed = UndoLog::default();
        for candidate in conflicting {
            if self.variables[other].remove_legal(&candidate) {
                removed.push(candidate);
                continue;
            }

            // The other endpoint is already committed to a value in the
            // conflict set; put back what this call pruned.
            let put_back: Vec<V> = removed.unwind().collect();
            for restored in put_back {
                let _ = self.restore_legal_value(other, &restored);
            }
            self.constraints[constraint_id].set_valid(false);
            return false;
        }

        self.constraints[constraint_id].set_active(other_index, true);
        true
    }

    /// Release a constraint on the endpoint opposite `from`, based on
    /// `value` no longer being operative there: illegal values at the other
    /// endpoint that only `value` forbade become candidates for restoration.
    ///
    /// The constraint stops restricting the other endpoint no matter what.
    /// An empty value fails (there is nothing to recompute from). Zero
    /// restorable candidates means the constraint was never in conflict:
    /// the validity flag is reset and the call succeeds. Restorable
    /// candidates that are all vetoed by other constraints make the call
    /// fail; otherwise it succeeds, resetting the validity flag when both
    /// endpoints retain at least one legal value.
    pub(crate) fn clear_constraint(
        &mut self,
        constraint_id: ConstraintId,
        from: VariableId,
        value: Option<&V>,
    ) -> bool {
        let (other, other_index) = self.constraints[constraint_id].other_endpoint(from);
        self.constraints[constraint_id].set_active(other_index, false);

        let Some(value) = value else {
            return false;
        };

        let restorable: Vec<V> = {
            let constraint = &self.constraints[constraint_id];
            self.variables[other]
                .illegal_values()
                .filter(|&candidate| !constraint.evaluate(value, candidate))
                .cloned()
                .collect()
        };

        if restorable.is_empty() {
            self.constraints[constraint_id].set_valid(true);
            return true;
        }

        let mut recovered = 0_usize;
        for candidate in &restorable {
            if self.restore_legal_value(other, candidate) {
                recovered += 1;
            }
        }
        if recovered == 0 {
            return false;
        }

        if self.variables[from].num_legal() > 0 && self.variables[other].num_legal() > 0 {
            self.constraints[constraint_id].set_valid(true);
        }
        true
    }

    /// Whether assigning `value` to `node` would agree with this constraint.
    ///
    /// Trivially true when the constraint is not currently restricting
    /// `node`, when the value is empty, or when the other endpoint is
    /// unassigned; otherwise the predicate decides.
    pub(crate) fn check_constraint(
        &self,
        constraint_id: ConstraintId,
        node: VariableId,
        value: Option<&V>,
    ) -> bool {
        let constraint = &self.constraints[constraint_id];
        if !constraint.is_active_against(node) {
            return true;
        }
        let Some(value) = value else {
            return true;
        };

        let (other, _) = constraint.other_endpoint(node);
        match self.variables[other].value() {
            None => true,
            Some(other_value) => constraint.evaluate(other_value, value),
        }
    }

    /// One-directional arc-consistency revision: remove every legal value of
    /// `node` that has no supporting value at the constraint's other
    /// endpoint.
    ///
    /// The support set is the other endpoint's assignment if it has one, and
    /// its whole legal set otherwise. Returns whether any value was removed,
    /// which an external work-queue driver uses to decide what to re-revise.
    ///
    /// If an unsupported value turns out to be `node`'s current assignment,
    /// the engine attempts to retract the assignment; if that is impossible
    /// (the variable is fixed, or retraction recovers nothing) the problem
    /// as a whole is unsolvable: the graph permanently reports
    /// unsatisfiable and rejects every further mutation.
    pub fn revise_constraint(
        &mut self,
        constraint_id: ConstraintId,
        node: VariableId,
    ) -> Result<bool, CspOperationError> {
        self.ensure_mutable()?;

        if !self.constraints[constraint_id].is_incident(node) {
            warn!(
                "attempted to revise {constraint_id} against unrelated variable '{}'",
                self.variables[node].name()
            );
            return Err(CspOperationError::UnrelatedConstraint {
                variable: self.variables[node].name().to_owned(),
            });
        }

        let (other, _) = self.constraints[constraint_id].other_endpoint(node);
        let unsupported: Vec<V> = {
            let constraint = &self.constraints[constraint_id];
            let node_variable = &self.variables[node];
            let other_variable = &self.variables[other];
            match other_variable.value() {
                Some(support) => node_variable
                    .legal_values()
                    .filter(|&candidate| !constraint.evaluate(candidate, support))
                    .cloned()
                    .collect(),
                None => node_variable
                    .legal_values()
                    .filter(|&candidate| {
                        !other_variable
                            .legal_values()
                            .any(|support| constraint.evaluate(candidate, support))
                    })
                    .cloned()
                    .collect(),
            }
        };

        let removed_any = !unsupported.is_empty();
        for value in unsupported {
            if self.variables[node].remove_legal(&value) {
                continue;
            }

            // The unsupported value is the node's current assignment; try to
            // retract the assignment so the value can be pruned after all.
            if !matches!(self.clear_value(node), Ok(true)) {
                let name = self.variables[node].name().to_owned();
                self.mark_unsolvable(&name);
                return Err(CspOperationError::Unsolvable { variable: name });
            }
            let _ = self.variables[node].remove_legal(&value);
        }

        Ok(removed_any)
    }
}
