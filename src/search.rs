//! Breadth-first proof search over do-calculus rewrites (spec.md §4.4-§4.5).
//!
//! States are canonicalized `Term`s; BFS guarantees the shortest rewrite
//! chain is the one returned. An ATE query (`A - B`) is split into two
//! independent single-term searches rather than searched jointly, since
//! the two sides of the difference never interact through a rewrite rule.

use std::collections::VecDeque;

use fxhash::FxHashMap;

use crate::dag::Dag;
use crate::error::{DoverifyError, Result};
use crate::expression::Expression;
use crate::proof::{Proof, ProofStep, ATE_LEFT, ATE_RIGHT, INITIAL};
use crate::rules::{enumerate_rule_1, enumerate_rule_2, enumerate_rule_3};
use crate::term::Term;

/// A canonical string key for a term, used as the BFS visited-set key and
/// as the identifier printed by `explore`. Two terms have the same key iff
/// they are `==` (spec.md §4.4).
pub fn state_key(term: &Term) -> String {
    let mut key = format!("Y={}|DO=", term.outcome);
    let mut ivs: Vec<String> = term.interventions().map(|c| c.to_string()).collect();
    ivs.sort();
    key.push_str(&ivs.join(","));
    key.push_str("|OBS=");
    let mut obs: Vec<String> = term.observations().map(|c| c.to_string()).collect();
    obs.sort();
    key.push_str(&obs.join(","));
    key
}

fn successors(term: &Term, g: &Dag) -> Vec<(&'static str, Term)> {
    let mut out = vec![];
    out.extend(enumerate_rule_1(term, g).into_iter().map(|t| (crate::proof::RULE_1, t)));
    out.extend(enumerate_rule_2(term, g).into_iter().map(|t| (crate::proof::RULE_2, t)));
    out.extend(enumerate_rule_3(term, g).into_iter().map(|t| (crate::proof::RULE_3, t)));
    out
}

/// BFS from `start` to `target` in `g`, exploring at most `max_depth`
/// rewrite steps. Returns the shortest proof chain, or `None` if the
/// target is unreachable within the depth bound. `start` itself is never
/// part of the returned chain -- only the rule-labeled rewrites applied
/// after it -- so an already-equivalent pair yields `Some(vec![])`
/// (spec.md §4.4/§8 scenario 1).
pub fn find_proof_single(
    g: &Dag,
    start: &Term,
    target: &Term,
    max_depth: usize,
) -> Option<Vec<ProofStep>> {
    if start.structurally_equal(target) {
        return Some(vec![]);
    }

    let start_key = state_key(start);
    let mut visited: FxHashMap<String, (Option<String>, Term, &'static str)> = FxHashMap::default();
    let mut queue: VecDeque<(Term, usize)> = VecDeque::new();
    queue.push_back((start.clone(), 0));
    visited.insert(start_key.clone(), (None, start.clone(), INITIAL));

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for (rule, next) in successors(&current, g) {
            let next_key = state_key(&next);
            if visited.contains_key(&next_key) {
                continue;
            }
            let current_key = state_key(&current);
            visited.insert(next_key.clone(), (Some(current_key), next.clone(), rule));
            if next.structurally_equal(target) {
                return Some(reconstruct(&visited, &next_key));
            }
            queue.push_back((next, depth + 1));
        }
    }
    None
}

/// Walks the parent chain from `goal_key` back to (but not including) the
/// start state, which is recorded with a `None` parent and never turned
/// into a `ProofStep` itself.
fn reconstruct(
    visited: &FxHashMap<String, (Option<String>, Term, &'static str)>,
    goal_key: &str,
) -> Vec<ProofStep> {
    let mut chain = vec![];
    let mut key = goal_key.to_string();
    loop {
        let (parent_key, term, rule) = visited.get(&key).expect("state_key reachable by construction");
        chain.push(ProofStep {
            term: term.clone(),
            rule,
        });
        match parent_key {
            Some(parent) => key = parent.clone(),
            None => unreachable!("the start state is never pushed onto the chain"),
        }
        if visited.get(&key).map(|(p, _, _)| p.is_none()).unwrap_or(false) {
            break;
        }
    }
    chain.reverse();
    chain
}

/// Dispatches a start/target pair of expressions to either a single-term
/// search or, when both sides are recognized as `A - B` differences, two
/// independent single-term searches (spec.md §4.5).
pub fn find_proof(
    g: &Dag,
    start: &Expression,
    target: &Expression,
    max_depth: usize,
) -> Result<Option<Proof>> {
    match (start.as_ate_pair(), target.as_ate_pair()) {
        (Some((sa, sb)), Some((ta, tb))) => {
            let left = find_proof_single(g, sa, ta, max_depth);
            let right = find_proof_single(g, sb, tb, max_depth);
            match (left, right) {
                (Some(mut left), Some(mut right)) => {
                    relabel_first(&mut left, ATE_LEFT);
                    relabel_first(&mut right, ATE_RIGHT);
                    Ok(Some(Proof::Ate { left, right }))
                }
                _ => Ok(None),
            }
        }
        (None, None) => match (start.as_term(), target.as_term()) {
            (Some(s), Some(t)) => Ok(find_proof_single(g, s, t, max_depth).map(Proof::Single)),
            _ if start.is_malformed_difference() && target.is_malformed_difference() => {
                Err(DoverifyError::TypeError {
                    detail: "both sides are A - B differences, but an operand isn't a bare term"
                        .to_string(),
                })
            }
            _ => Err(DoverifyError::UnsupportedExpression),
        },
        _ => Err(DoverifyError::TypeError {
            detail: "start and target must both be bare terms or both be A - B differences"
                .to_string(),
        }),
    }
}

fn relabel_first(chain: &mut [ProofStep], label: &'static str) {
    if let Some(first) = chain.first_mut() {
        first.rule = label;
    }
}

/// One entry of an exhaustive reachability enumeration: a reachable state,
/// the rule that produced it, and its BFS depth from `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreEntry {
    pub term: Term,
    pub rule: &'static str,
    pub depth: usize,
}

/// Enumerates every state reachable from `start` within `max_depth` steps,
/// each exactly once, labeled with the rule that first reached it. Used by
/// the `doverify-explore` binary and by tests asserting reachability.
pub fn explore(g: &Dag, start: &Term, max_depth: usize) -> Vec<ExploreEntry> {
    let mut visited: FxHashMap<String, ExploreEntry> = FxHashMap::default();
    let start_key = state_key(start);
    visited.insert(
        start_key.clone(),
        ExploreEntry {
            term: start.clone(),
            rule: INITIAL,
            depth: 0,
        },
    );
    let mut queue: VecDeque<(Term, usize)> = VecDeque::new();
    queue.push_back((start.clone(), 0));

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for (rule, next) in successors(&current, g) {
            let key = state_key(&next);
            if visited.contains_key(&key) {
                continue;
            }
            visited.insert(
                key,
                ExploreEntry {
                    term: next.clone(),
                    rule,
                    depth: depth + 1,
                },
            );
            queue.push_back((next, depth + 1));
        }
    }

    let mut out: Vec<ExploreEntry> = visited.into_values().collect();
    out.sort_by(|a, b| {
        a.depth
            .cmp(&b.depth)
            .then_with(|| a.term.to_string().cmp(&b.term.to_string()))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::term::Outcome;
    use std::collections::HashMap;

    fn dag_of(edges: &[(&str, &[&str])]) -> Dag {
        let map: HashMap<String, Vec<String>> = edges
            .iter()
            .map(|(p, cs)| (p.to_string(), cs.iter().map(|c| c.to_string()).collect()))
            .collect();
        Dag::build(&map).0
    }

    fn y() -> Outcome {
        Outcome::Bare("Y".to_string())
    }

    #[test]
    fn test_trivial_proof_when_start_equals_target() {
        let g = dag_of(&[("X", &["Y"])]);
        let t = Term::new(y(), vec![Condition::intervention("X")]);
        let proof = find_proof_single(&g, &t, &t, 5).unwrap();
        assert!(proof.is_empty());
    }

    #[test]
    fn test_do_becomes_observation_for_isolated_cause() {
        let g = dag_of(&[("X", &["Y"])]);
        let start = Term::new(y(), vec![Condition::intervention("X")]);
        let target = Term::new(y(), vec![Condition::observation("X")]);
        let proof = find_proof_single(&g, &start, &target, 5).expect("proof should exist");
        assert_eq!(proof.last().unwrap().term, target);
        assert!(proof.iter().any(|s| s.rule == crate::proof::RULE_2));
    }

    #[test]
    fn test_no_proof_when_confounded() {
        let g = dag_of(&[("U", &["X", "Y"])]);
        let start = Term::new(y(), vec![Condition::intervention("X")]);
        let target = Term::new(y(), vec![Condition::observation("X")]);
        assert!(find_proof_single(&g, &start, &target, 10).is_none());
    }

    #[test]
    fn test_ate_pair_splits_into_two_searches() {
        let g = dag_of(&[("X", &["Y"])]);
        let start_a = Term::new(
            y(),
            vec![Condition::intervention_eq("X", crate::condition::Value::Int(1))],
        );
        let start_b = Term::new(
            y(),
            vec![Condition::intervention_eq("X", crate::condition::Value::Int(0))],
        );
        let target_a = Term::new(
            y(),
            vec![Condition::observation_eq("X", crate::condition::Value::Int(1))],
        );
        let target_b = Term::new(
            y(),
            vec![Condition::observation_eq("X", crate::condition::Value::Int(0))],
        );
        let start = Expression::difference(start_a, start_b);
        let target = Expression::difference(target_a, target_b);
        let proof = find_proof(&g, &start, &target, 5).unwrap().unwrap();
        match proof {
            Proof::Ate { left, right } => {
                assert_eq!(left[0].rule, ATE_LEFT);
                assert_eq!(right[0].rule, ATE_RIGHT);
            }
            _ => panic!("expected an ATE proof"),
        }
    }

    #[test]
    fn test_mismatched_shapes_is_an_error() {
        let g = dag_of(&[("X", &["Y"])]);
        let bare = Expression::term(Term::new(y(), vec![Condition::intervention("X")]));
        let ate = Expression::difference(
            Term::new(y(), vec![Condition::intervention("X")]),
            Term::new(y(), vec![Condition::observation("X")]),
        );
        assert!(find_proof(&g, &bare, &ate, 5).is_err());
    }

    #[test]
    fn test_product_ate_operands_are_a_type_error_not_unsupported() {
        let g = dag_of(&[("X", &["Y"])]);
        let a = Term::new(y(), vec![Condition::intervention("X")]);
        let b = Term::new(y(), vec![Condition::observation("X")]);
        let product = Expression::Product(vec![Expression::term(a), Expression::term(b)]);
        let start = Expression::Add(vec![
            product.clone(),
            Expression::Neg(Box::new(product.clone())),
        ]);
        let target = Expression::Add(vec![product.clone(), Expression::Neg(Box::new(product))]);
        match find_proof(&g, &start, &target, 5) {
            Err(DoverifyError::TypeError { .. }) => {}
            other => panic!("expected a TypeError, got {:?}", other),
        }
    }

    #[test]
    fn test_explore_includes_start_at_depth_zero() {
        let g = dag_of(&[("X", &["Y"])]);
        let start = Term::new(y(), vec![Condition::intervention("X")]);
        let entries = explore(&g, &start, 3);
        let start_entry = entries
            .iter()
            .find(|e| e.term.structurally_equal(&start))
            .unwrap();
        assert_eq!(start_entry.depth, 0);
        assert_eq!(start_entry.rule, INITIAL);
    }
}
