use std::fmt;

use crate::containers::StorageKey;
use crate::engine::variable::DomainValue;
use crate::engine::variable::VariableId;
use crate::quince_assert_simple;

/// Handle to a [`Constraint`] stored in a
/// [`ConstraintGraph`](crate::ConstraintGraph).
#[derive(Clone, PartialEq, Eq, Copy, Hash)]
pub struct ConstraintId {
    pub(crate) id: u32,
}

impl StorageKey for ConstraintId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        ConstraintId { id: index as u32 }
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.id)
    }
}

impl fmt::Debug for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.id)
    }
}

/// A pairwise compatibility rule between the values of two distinct
/// variables.
///
/// The rule itself is a caller-supplied pure predicate over a pair of
/// values. During forward checking the engine evaluates it as
/// `predicate(known_value, candidate_value)`; during arc revision the
/// candidate under revision is the first argument. Callers should therefore
/// supply predicates that are insensitive to argument order, or accept that
/// the two directions are evaluated as written.
pub struct Constraint<V> {
    endpoints: [VariableId; 2],
    predicate: Box<dyn Fn(&V, &V) -> bool>,
    /// Per endpoint: true when this constraint is currently restricting that
    /// endpoint because of a value at the other end.
    active: [bool; 2],
    valid: bool,
}

impl<V: DomainValue> Constraint<V> {
    /// Callers go through
    /// [`ConstraintGraph::add_constraint`](crate::ConstraintGraph::add_constraint),
    /// which rejects self-constraints with a proper error.
    pub(crate) fn new(a: VariableId, b: VariableId, predicate: Box<dyn Fn(&V, &V) -> bool>) -> Self {
        quince_assert_simple!(a != b, "a constraint must relate two distinct variables");

        Constraint {
            endpoints: [a, b],
            predicate,
            active: [false, false],
            valid: true,
        }
    }

    pub fn endpoints(&self) -> (VariableId, VariableId) {
        (self.endpoints[0], self.endpoints[1])
    }

    /// Whether the constraint can still be satisfied with the current
    /// domains, as far as propagation has determined.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether this constraint currently restricts `node`, i.e. has pruned
    /// values from `node`'s legal set because of a value at the other end.
    pub fn is_active_against(&self, node: VariableId) -> bool {
        self.endpoint_index(node).is_some_and(|index| self.active[index])
    }

    pub(crate) fn is_incident(&self, node: VariableId) -> bool {
        self.endpoint_index(node).is_some()
    }

    /// The endpoint opposite to `node`, together with its index into the
    /// `active` flags. `node` must be one of the two endpoints.
    pub(crate) fn other_endpoint(&self, node: VariableId) -> (VariableId, usize) {
        if node == self.endpoints[0] {
            (self.endpoints[1], 1)
        } else {
            quince_assert_simple!(
                node == self.endpoints[1],
                "variable {node} is not an endpoint of this constraint"
            );
            (self.endpoints[0], 0)
        }
    }

    pub(crate) fn evaluate(&self, known: &V, candidate: &V) -> bool {
        (self.predicate)(known, candidate)
    }

    pub(crate) fn set_active(&mut self, endpoint_index: usize, active: bool) {
        self.active[endpoint_index] = active;
    }

    pub(crate) fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    fn endpoint_index(&self, node: VariableId) -> Option<usize> {
        self.endpoints.iter().position(|&endpoint| endpoint == node)
    }
}

impl<V> fmt::Debug for Constraint<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Constraint {{ endpoints: [{}, {}], active: {:?}, valid: {} }}",
            self.endpoints[0], self.endpoints[1], self.active, self.valid
        )
    }
}
