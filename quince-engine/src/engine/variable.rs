use std::fmt;
use std::hash::Hash;

use itertools::Itertools;

use crate::basic_types::CspOperationError;
use crate::containers::HashSet;
use crate::containers::StorageKey;
use crate::engine::constraint::ConstraintId;
use crate::quince_assert_moderate;

/// Marker trait for types that can serve as domain values.
///
/// Blanket-implemented; any clonable, hashable, equality-comparable type with
/// a [`Debug`](fmt::Debug) representation qualifies.
pub trait DomainValue: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> DomainValue for T {}

/// Handle to a [`Variable`] stored in a
/// [`ConstraintGraph`](crate::ConstraintGraph).
#[derive(Clone, PartialEq, Eq, Copy, Hash)]
pub struct VariableId {
    pub(crate) id: u32,
}

impl StorageKey for VariableId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        VariableId { id: index as u32 }
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.id)
    }
}

impl fmt::Debug for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.id)
    }
}

/// A dimension of the problem: a named variable with a finite domain, at
/// most one current value, and an explicit partition of the domain into
/// values that are still possible (`legal`) and values excluded by
/// propagation (`illegal`).
///
/// All mutation goes through the operations on
/// [`ConstraintGraph`](crate::ConstraintGraph); a `Variable` on its own only
/// exposes read access.
pub struct Variable<V> {
    name: String,
    /// The full candidate set, or [`None`] for a variable that can never be
    /// assigned.
    domain: Option<HashSet<V>>,
    value: Option<V>,
    legal: HashSet<V>,
    illegal: HashSet<V>,
    fixed: bool,
    /// Handles of the constraints touching this variable. The constraints
    /// themselves are owned by the graph.
    constrained_by: Vec<ConstraintId>,
}

impl<V: DomainValue> Variable<V> {
    /// Create an unassigned variable over the given domain.
    pub fn new(name: impl Into<String>, domain: impl IntoIterator<Item = V>) -> Self {
        let domain: HashSet<V> = domain.into_iter().collect();
        let legal = domain.clone();

        Variable {
            name: name.into(),
            domain: Some(domain),
            value: None,
            legal,
            illegal: HashSet::default(),
            fixed: false,
            constrained_by: Vec::new(),
        }
    }

    /// Create a variable over the given domain with an initial value.
    ///
    /// Fails with [`CspOperationError::IllegalValue`] if the initial value is
    /// not part of the domain.
    pub fn with_initial_value(
        name: impl Into<String>,
        domain: impl IntoIterator<Item = V>,
        value: V,
    ) -> Result<Self, CspOperationError> {
        let mut variable = Self::new(name, domain);

        if !variable.is_legal(&value) {
            return Err(CspOperationError::IllegalValue {
                variable: variable.name,
            });
        }

        variable.value = Some(value);
        Ok(variable)
    }

    /// Create a variable without a domain. Such a variable is permanently
    /// unassignable: no value is ever legal for it.
    pub fn without_domain(name: impl Into<String>) -> Self {
        Variable {
            name: name.into(),
            domain: None,
            value: None,
            legal: HashSet::default(),
            illegal: HashSet::default(),
            fixed: false,
            constrained_by: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn has_domain(&self) -> bool {
        self.domain.is_some()
    }

    /// Iterate over the full domain, in no particular order. Empty for a
    /// variable without a domain.
    pub fn domain_values(&self) -> impl Iterator<Item = &V> {
        self.domain.iter().flatten()
    }

    /// The number of values the variable can still take. Used by external
    /// drivers for most-constrained-variable ordering.
    pub fn num_legal(&self) -> usize {
        self.legal.len()
    }

    pub fn num_illegal(&self) -> usize {
        self.illegal.len()
    }

    /// The number of constraints touching this variable. Used by external
    /// drivers for highest-degree ordering.
    pub fn num_constraints(&self) -> usize {
        self.constrained_by.len()
    }

    pub fn legal_values(&self) -> impl Iterator<Item = &V> {
        self.legal.iter()
    }

    pub fn illegal_values(&self) -> impl Iterator<Item = &V> {
        self.illegal.iter()
    }

    /// Whether `value` can currently be assigned to this variable.
    ///
    /// Always false for a variable without a domain. A value found in both
    /// the legal and the illegal set indicates a bug inside the engine and
    /// trips a fatal assertion rather than being silently corrected.
    pub fn is_legal(&self, value: &V) -> bool {
        if self.domain.is_none() {
            return false;
        }

        let in_legal = self.legal.contains(value);
        quince_assert_moderate!(
            !(in_legal && self.illegal.contains(value)),
            "value {value:?} is in both the legal and illegal sets of variable '{}'",
            self.name
        );

        in_legal
    }

    /// The constraints registered against this variable, in registration
    /// order.
    pub fn constrained_by(&self) -> &[ConstraintId] {
        &self.constrained_by
    }

    pub(crate) fn in_domain(&self, value: &V) -> bool {
        self.domain
            .as_ref()
            .is_some_and(|domain| domain.contains(value))
    }

    /// Move `value` from the legal to the illegal set.
    ///
    /// Trivially succeeds when the value is already not legal; fails only
    /// when `value` is the variable's current assignment, which cannot be
    /// invalidated.
    pub(crate) fn remove_legal(&mut self, value: &V) -> bool {
        if self.value.as_ref() == Some(value) {
            return false;
        }

        if self.legal.remove(value) {
            let _ = self.illegal.insert(value.clone());
        }

        true
    }

    /// Move `value` from the illegal set back to the legal set. The caller
    /// is responsible for having checked that every incident constraint
    /// agrees with the restoration.
    pub(crate) fn restore_legal(&mut self, value: &V) {
        let _ = self.illegal.remove(value);
        let _ = self.legal.insert(value.clone());
    }

    pub(crate) fn assign(&mut self, value: V) {
        self.value = Some(value);
    }

    pub(crate) fn take_value(&mut self) -> Option<V> {
        self.value.take()
    }

    /// Collapse the legal set to `{value}` and lock the variable. Only
    /// called once `value` is the variable's current assignment.
    pub(crate) fn fix(&mut self, value: &V) {
        if let Some(domain) = &self.domain {
            self.illegal = domain
                .iter()
                .filter(|candidate| *candidate != value)
                .cloned()
                .collect();
        }
        self.legal.clear();
        let _ = self.legal.insert(value.clone());
        self.fixed = true;
    }

    pub(crate) fn attach_constraint(&mut self, constraint: ConstraintId) {
        self.constrained_by.push(constraint);
    }
}

impl<V: DomainValue> fmt::Debug for Variable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Variable {{ name: {:?}, value: {:?}, fixed: {}, legal: {{{}}}, illegal: {{{}}} }}",
            self.name,
            self.value,
            self.fixed,
            render_sorted(&self.legal),
            render_sorted(&self.illegal),
        )
    }
}

/// Renders a value set deterministically for logs and debug output.
fn render_sorted<V: DomainValue>(set: &HashSet<V>) -> String {
    set.iter().map(|value| format!("{value:?}")).sorted().join(", ")
}
