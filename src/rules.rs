//! Do-calculus rule enumerators: for a term and a DAG, every distinct
//! one-step successor under Rules 1, 2, and 3 of Pearl's do-calculus
//! (spec.md §4.3).
//!
//! Each enumerator is deterministic (sorted by the affected variable's
//! name) and never introduces a variable not already present in the input
//! term. An enumerator that hits an oracle failure on a single candidate
//! skips that candidate and keeps going, rather than failing the whole
//! enumeration (spec.md §7) -- there's no fallible oracle call in this
//! implementation, but the per-candidate `Option` shape is kept so a
//! future oracle that *can* fail slots in without changing the contract.

use fxhash::FxHashSet;

use crate::condition::ConditionKind;
use crate::dag::Dag;
use crate::dsep::is_d_separated;
use crate::term::Term;

fn fxset(vars: impl IntoIterator<Item = String>) -> FxHashSet<String> {
    vars.into_iter().collect()
}

fn owned(vars: &[&str]) -> FxHashSet<String> {
    vars.iter().map(|v| v.to_string()).collect()
}

/// Rule 1: drop an observation `W` when `Y ⟂ W | X, O∖{W}` in `bar(G, X)`.
pub fn enumerate_rule_1(term: &Term, g: &Dag) -> Vec<Term> {
    let x = term.intervention_vars();
    let mut o = term.observation_vars();
    o.sort();

    let g_bar_x = g.bar(&owned(&x));
    let mut candidates: Vec<(String, Option<Term>)> = vec![];

    for &w in &o {
        let z: FxHashSet<String> = fxset(
            x.iter()
                .map(|v| v.to_string())
                .chain(o.iter().filter(|&&v| v != w).map(|v| v.to_string())),
        );
        let candidate = if is_d_separated(&g_bar_x, term.outcome.var(), w, &z) {
            Some(term.without_condition(ConditionKind::Observation, w))
        } else {
            None
        };
        candidates.push((w.to_string(), candidate));
    }

    finalize(candidates, term)
}

/// Rule 2: turn intervention `do(Z)` into observation `Z` when
/// `Y ⟂ Z | X∖{Z}, O` in `underline(bar(G, X∖{Z}), {Z})`.
pub fn enumerate_rule_2(term: &Term, g: &Dag) -> Vec<Term> {
    let mut x = term.intervention_vars();
    x.sort();
    let o = term.observation_vars();

    let mut candidates: Vec<(String, Option<Term>)> = vec![];
    for &z_var in &x {
        let x_minus: Vec<&str> = x.iter().copied().filter(|&v| v != z_var).collect();
        let g_prime = g.bar(&owned(&x_minus)).underline(&owned(&[z_var]));
        let z_set = fxset(
            x_minus
                .iter()
                .map(|v| v.to_string())
                .chain(o.iter().map(|v| v.to_string())),
        );
        let candidate = if is_d_separated(&g_prime, term.outcome.var(), z_var, &z_set) {
            Some(term.with_intervention_observed(z_var))
        } else {
            None
        };
        candidates.push((z_var.to_string(), candidate));
    }

    finalize(candidates, term)
}

/// Rule 3: drop intervention `do(Z)` when `Y ⟂ Z | X∖{Z}, O` in the graph
/// formed by barring `X∖{Z}`, and additionally barring `Z` itself unless
/// `Z` is an ancestor (in that barred graph) of some observed variable.
pub fn enumerate_rule_3(term: &Term, g: &Dag) -> Vec<Term> {
    let mut x = term.intervention_vars();
    x.sort();
    let o = term.observation_vars();

    let mut candidates: Vec<(String, Option<Term>)> = vec![];
    for &z_var in &x {
        let x_minus: Vec<&str> = x.iter().copied().filter(|&v| v != z_var).collect();
        let g_bar = g.bar(&owned(&x_minus));

        let z_is_ancestor_of_obs = o.iter().any(|&w| g_bar.reachable(z_var, w));
        let g_prime = if z_is_ancestor_of_obs {
            g_bar
        } else {
            g_bar.bar(&owned(&[z_var]))
        };

        let z_set = fxset(
            x_minus
                .iter()
                .map(|v| v.to_string())
                .chain(o.iter().map(|v| v.to_string())),
        );
        let candidate = if is_d_separated(&g_prime, term.outcome.var(), z_var, &z_set) {
            Some(term.without_condition(ConditionKind::Intervention, z_var))
        } else {
            None
        };
        candidates.push((z_var.to_string(), candidate));
    }

    finalize(candidates, term)
}

/// Sorts by the affected variable's name, drops non-matches and any
/// accidental self-loop (a "successor" equal to the input), and
/// deduplicates by canonical term equality (which is the same granularity
/// as the BFS state key, since `Term` is already canonical).
fn finalize(mut candidates: Vec<(String, Option<Term>)>, input: &Term) -> Vec<Term> {
    candidates.sort_by(|a, b| a.0.cmp(&b.0));
    let mut out = vec![];
    for (_, candidate) in candidates {
        let Some(t) = candidate else { continue };
        if &t == input {
            continue;
        }
        if !out.contains(&t) {
            out.push(t);
        }
    }
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
    fn test_rule_1_drops_irrelevant_observation() {
        let g = dag_of(&[("X", &["Y"]), ("W", &[])]);
        let term = Term::new(
            y(),
            vec![Condition::intervention("X"), Condition::observation("W")],
        );
        let out = enumerate_rule_1(&term, &g);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].to_string(), "P(Y | do(X))");
    }

    #[test]
    fn test_rule_2_blocked_by_confounding() {
        let g = dag_of(&[("U", &["Z", "Y"])]);
        let term = Term::new(y(), vec![Condition::intervention("Z")]);
        assert!(enumerate_rule_2(&term, &g).is_empty());
    }

    #[test]
    fn test_rule_2_converts_isolated_intervention() {
        // X is confounded with Y through U, so do(X) must stay an
        // intervention; Z is unconfounded and isolated, so do(Z) converts.
        let g = dag_of(&[("U", &["X", "Y"]), ("Z", &[])]);
        let term = Term::new(
            y(),
            vec![Condition::intervention("X"), Condition::intervention("Z")],
        );
        let out = enumerate_rule_2(&term, &g);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].to_string(), "P(Y | do(X), Z)");
    }

    #[test]
    fn test_rule_3_removes_isolated_intervention() {
        // X has no causal path to Y at all, so do(X) can be dropped; Z
        // directly causes Y, so do(Z) must stay.
        let g = dag_of(&[("X", &[]), ("Z", &["Y"])]);
        let term = Term::new(
            y(),
            vec![Condition::intervention("X"), Condition::intervention("Z")],
        );
        let out = enumerate_rule_3(&term, &g);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].to_string(), "P(Y | do(Z))");
    }

    #[test]
    fn test_no_rule_introduces_a_new_variable() {
        let g = dag_of(&[("X", &["Y"]), ("Z", &["Y"]), ("W", &[])]);
        let term = Term::new(
            y(),
            vec![
                Condition::intervention("X"),
                Condition::intervention("Z"),
                Condition::observation("W"),
            ],
        );
        let before = term.variables();
        for successor in enumerate_rule_1(&term, &g)
            .into_iter()
            .chain(enumerate_rule_2(&term, &g))
            .chain(enumerate_rule_3(&term, &g))
        {
            assert!(successor.variables().is_subset(&before));
        }
    }

    #[test]
    fn test_successors_are_distinct_from_input_and_each_other() {
        let g = dag_of(&[("X", &[]), ("Z", &[]), ("Y", &[])]);
        let term = Term::new(
            y(),
            vec![Condition::intervention("X"), Condition::intervention("Z")],
        );
        let out = enumerate_rule_3(&term, &g);
        for t in &out {
            assert_ne!(t, &term);
        }
        let mut dedup = out.clone();
        dedup.dedup();
        assert_eq!(dedup.len(), out.len());
    }
}
