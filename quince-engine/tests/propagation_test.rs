#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

use std::collections::BTreeSet;

use quince_engine::ConstraintGraph;
use quince_engine::CspOperationError;
use quince_engine::Variable;
use quince_engine::VariableId;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn legal_set(graph: &ConstraintGraph<i32>, var: VariableId) -> BTreeSet<i32> {
    graph.variable(var).legal_values().copied().collect()
}

fn illegal_set(graph: &ConstraintGraph<i32>, var: VariableId) -> BTreeSet<i32> {
    graph.variable(var).illegal_values().copied().collect()
}

#[test]
fn inequality_between_two_variables() {
    let mut graph = ConstraintGraph::new();
    let x = graph.add_variable(Variable::new("x", [1, 2, 3])).unwrap();
    let y = graph.add_variable(Variable::new("y", [1, 2, 3])).unwrap();
    let _ = graph.add_constraint(x, y, |a, b| a != b).unwrap();

    graph.set_value(x, 2).expect("2 is legal for x");

    assert_eq!(legal_set(&graph, y), BTreeSet::from([1, 3]));
    assert!(graph.satisfiable());

    assert_eq!(
        graph.set_value(y, 2),
        Err(CspOperationError::IllegalValue {
            variable: "y".to_owned()
        })
    );
}

#[test]
fn a_conflicting_fix_fails_harmlessly_at_the_variable_level() {
    let mut graph = ConstraintGraph::new();
    let x = graph.add_variable(Variable::new("x", [1, 2])).unwrap();
    let y = graph.add_variable(Variable::new("y", [1, 2])).unwrap();
    let _ = graph.add_constraint(x, y, |a, b| a != b).unwrap();

    graph.set_fixed_value(x, 1).expect("x can be fixed to 1");

    // 1 has been pruned from y, so fixing y to it fails, without any effect
    // on the graph's satisfiability verdict.
    assert!(graph.set_fixed_value(y, 1).is_err());
    assert!(graph.satisfiable());
    assert_eq!(graph.variable(y).value(), None);
    assert!(!graph.variable(y).is_fixed());
}

#[test]
fn a_conflicting_clamp_poisons_the_graph() {
    init_logger();

    let mut graph = ConstraintGraph::new();
    let x = graph.add_variable(Variable::new("x", [1, 2])).unwrap();
    let y = graph.add_variable(Variable::new("y", [1, 2])).unwrap();
    let _ = graph.add_constraint(x, y, |a, b| a != b).unwrap();

    graph.set_fixed("x", 1).expect("x can be clamped to 1");

    assert!(graph.set_fixed("y", 1).is_err());
    assert!(!graph.satisfiable());

    // The verdict is permanent, even though y could still take 2.
    graph.set_value(y, 2).expect("y can still be assigned");
    assert!(!graph.satisfiable());
}

#[test]
fn revision_empties_an_unassigned_variable_without_a_verdict() {
    let mut graph = ConstraintGraph::new();
    let x = graph.add_variable(Variable::new("x", [5])).unwrap();
    let y = graph.add_variable(Variable::new("y", [1, 2, 3])).unwrap();
    graph.set_fixed_value(x, 5).expect("x can be fixed to 5");

    // The constraint is added after the fix, so y has not been pruned yet.
    let equal = graph.add_constraint(x, y, |a, b| a == b).unwrap();

    assert!(graph.revise_constraint(equal, y).unwrap());
    assert_eq!(graph.variable(y).num_legal(), 0);
    assert!(graph.satisfiable());
}

#[test]
fn revision_against_a_fixed_variable_without_support_is_unsolvable() {
    let mut graph = ConstraintGraph::new();
    let x = graph.add_variable(Variable::new("x", [5])).unwrap();
    let y = graph.add_variable(Variable::new("y", [1, 2, 3])).unwrap();
    graph.set_fixed_value(x, 5).expect("x can be fixed to 5");
    graph.set_fixed_value(y, 2).expect("y can be fixed to 2");

    let equal = graph.add_constraint(x, y, |a, b| a == b).unwrap();

    assert_eq!(
        graph.revise_constraint(equal, y),
        Err(CspOperationError::Unsolvable {
            variable: "y".to_owned()
        })
    );
    assert!(!graph.satisfiable());

    // Once unsolvable, every further mutation is rejected.
    assert_eq!(
        graph.clear_value(y),
        Err(CspOperationError::Unsolvable {
            variable: "y".to_owned()
        })
    );
}

#[test]
fn a_rejected_assignment_leaves_every_neighbour_untouched() {
    let mut graph = ConstraintGraph::new();
    let x = graph.add_variable(Variable::new("x", [1, 2, 3])).unwrap();
    let y = graph.add_variable(Variable::new("y", [1, 2, 3])).unwrap();
    // z carries an initial value; constraints added afterwards do not
    // re-validate it, so x's legal set is still untouched.
    let z = graph
        .add_variable(Variable::with_initial_value("z", [1, 2, 3], 1).unwrap())
        .unwrap();
    let _ = graph.add_constraint(x, y, |a, b| a != b).unwrap();
    let _ = graph.add_constraint(x, z, |a, b| a != b).unwrap();

    let y_legal = legal_set(&graph, y);
    let y_illegal = illegal_set(&graph, y);
    let z_legal = legal_set(&graph, z);

    // The first constraint prunes y, the second conflicts with z's value;
    // the whole assignment must be rolled back.
    assert_eq!(
        graph.set_value(x, 1),
        Err(CspOperationError::ConflictingAssignment {
            variable: "x".to_owned()
        })
    );

    assert_eq!(graph.variable(x).value(), None);
    assert_eq!(legal_set(&graph, y), y_legal);
    assert_eq!(illegal_set(&graph, y), y_illegal);
    assert_eq!(legal_set(&graph, z), z_legal);
    assert!(graph.satisfiable());
}

#[test]
fn assigning_and_clearing_round_trips_the_neighbour_sets() {
    let mut graph = ConstraintGraph::new();
    let x = graph.add_variable(Variable::new("x", [1, 2, 3])).unwrap();
    let y = graph.add_variable(Variable::new("y", [1, 2, 3])).unwrap();
    let _ = graph.add_constraint(x, y, |a, b| a != b).unwrap();

    let y_legal = legal_set(&graph, y);
    let y_illegal = illegal_set(&graph, y);

    graph.set_value(x, 2).expect("2 is legal for x");
    assert_eq!(legal_set(&graph, y), BTreeSet::from([1, 3]));

    assert!(graph.clear_value(x).unwrap());

    assert_eq!(graph.variable(x).value(), None);
    assert_eq!(legal_set(&graph, y), y_legal);
    assert_eq!(illegal_set(&graph, y), y_illegal);
}

#[test]
fn a_fixed_variable_rejects_assignment_and_clearing() {
    let mut graph = ConstraintGraph::new();
    let x = graph.add_variable(Variable::new("x", [1, 2, 3])).unwrap();

    graph.set_fixed_value(x, 2).expect("x can be fixed to 2");

    assert_eq!(
        graph.set_value(x, 2),
        Err(CspOperationError::FixedValueImmutable {
            variable: "x".to_owned()
        })
    );
    assert_eq!(
        graph.set_value(x, 1),
        Err(CspOperationError::FixedValueImmutable {
            variable: "x".to_owned()
        })
    );
    assert_eq!(
        graph.clear_value(x),
        Err(CspOperationError::FixedValueImmutable {
            variable: "x".to_owned()
        })
    );
    assert_eq!(graph.variable(x).value(), Some(&2));
}

#[test]
fn clearing_twice_is_a_no_op_the_second_time() {
    let mut graph = ConstraintGraph::new();
    let x = graph.add_variable(Variable::new("x", [1, 2, 3])).unwrap();
    let y = graph.add_variable(Variable::new("y", [1, 2, 3])).unwrap();
    let _ = graph.add_constraint(x, y, |a, b| a != b).unwrap();

    graph.set_value(x, 2).expect("2 is legal for x");
    assert!(graph.clear_value(x).unwrap());

    let y_legal = legal_set(&graph, y);
    assert!(graph.clear_value(x).unwrap());
    assert_eq!(graph.variable(x).value(), None);
    assert_eq!(legal_set(&graph, y), y_legal);
}

#[test]
fn clearing_without_neighbours_recovers_nothing() {
    let mut graph = ConstraintGraph::new();
    let x = graph.add_variable(Variable::new("x", [1, 2])).unwrap();

    graph.set_value(x, 1).expect("1 is legal for x");

    // The success criterion counts recovering constraints, so a variable
    // without any reports failure even though the value is gone.
    assert!(!graph.clear_value(x).unwrap());
    assert_eq!(graph.variable(x).value(), None);
}

#[test]
fn name_keyed_operations_delegate_to_the_variable() {
    let mut graph = ConstraintGraph::new();
    let x = graph.add_variable(Variable::new("x", [1, 2, 3])).unwrap();
    let y = graph.add_variable(Variable::new("y", [1, 2, 3])).unwrap();
    let _ = graph.add_constraint(x, y, |a, b| a != b).unwrap();

    graph.set_value_by_name("x", 2).expect("2 is legal for x");
    assert_eq!(graph.variable(x).value(), Some(&2));
    assert_eq!(legal_set(&graph, y), BTreeSet::from([1, 3]));

    assert_eq!(
        graph.set_value_by_name("ghost", 1),
        Err(CspOperationError::UnknownVariable {
            name: "ghost".to_owned()
        })
    );
}

#[test]
fn clamping_applies_every_mapping_entry() {
    let mut graph = ConstraintGraph::new();
    let x = graph.add_variable(Variable::new("x", [1, 2, 3])).unwrap();
    let y = graph.add_variable(Variable::new("y", [1, 2, 3])).unwrap();
    let _ = graph.add_constraint(x, y, |a, b| a != b).unwrap();

    graph
        .clamp_values([("x", 1), ("y", 2)])
        .expect("both clamps are compatible");

    assert!(graph.variable(x).is_fixed());
    assert!(graph.variable(y).is_fixed());
    assert!(graph.satisfiable());
}
