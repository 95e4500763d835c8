//! Shared helpers for end-to-end scenario tests (spec.md §8).

use std::collections::HashMap;

use crate::condition::{Condition, Value};
use crate::dag::Dag;
use crate::expression::Expression;
use crate::search::find_proof;
use crate::term::{Outcome, Term};

/// Builds a `Dag` from a literal parent -> children adjacency list.
/// Cyclic input is silently repaired by `Dag::build`, which is exactly the
/// behavior under test in `dag.rs`; this helper just discards the warnings
/// for tests that don't care about them.
pub fn dag_of(edges: &[(&str, &[&str])]) -> Dag {
    let map: HashMap<String, Vec<String>> = edges
        .iter()
        .map(|(p, cs)| (p.to_string(), cs.iter().map(|c| c.to_string()).collect()))
        .collect();
    Dag::build(&map).0
}

pub fn bare(var: &str) -> Outcome {
    Outcome::Bare(var.to_string())
}

pub fn do_(var: &str) -> Condition {
    Condition::intervention(var)
}

pub fn obs(var: &str) -> Condition {
    Condition::observation(var)
}

pub fn do_eq(var: &str, value: i64) -> Condition {
    Condition::intervention_eq(var, Value::Int(value))
}

pub fn obs_eq(var: &str, value: i64) -> Condition {
    Condition::observation_eq(var, Value::Int(value))
}

/// Asserts that a proof exists from `start` to `target` within
/// `max_depth` steps and that its last step (if any) is exactly `target`.
/// An already-equivalent pair yields an empty proof, which is also a pass.
pub fn assert_proof(g: &Dag, start: &Term, target: &Term, max_depth: usize) {
    let found = crate::search::find_proof_single(g, start, target, max_depth)
        .unwrap_or_else(|| panic!("expected a proof from {} to {}", start, target));
    if let Some(last) = found.last() {
        assert_eq!(last.term, *target);
    } else {
        assert!(start.structurally_equal(target));
    }
}

/// Asserts that no proof exists from `start` to `target` within
/// `max_depth` steps.
pub fn assert_no_proof(g: &Dag, start: &Term, target: &Term, max_depth: usize) {
    assert!(
        crate::search::find_proof_single(g, start, target, max_depth).is_none(),
        "expected no proof from {} to {}",
        start,
        target
    );
}

pub fn assert_ate_proof(g: &Dag, start: &Expression, target: &Expression, max_depth: usize) {
    let result = find_proof(g, start, target, max_depth)
        .expect("find_proof should not error on well-formed ATE expressions");
    assert!(
        result.is_some(),
        "expected an ATE proof for {} -> {}",
        start,
        target
    );
}
