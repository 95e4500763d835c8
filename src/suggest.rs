//! Heuristic suggestions for a term that has no proof, grounded in
//! `CausalEquivalence.suggest_fix` from the original implementation
//! (`examples/original_source/causal_equiv.py`).
//!
//! This is purely advisory: it never participates in `rules` or `search`,
//! and a suggestion is not a proof. It exists to give a human a starting
//! point when `find_proof` returns `None`.

use crate::dag::Dag;
use crate::term::Term;
use crate::dsep::is_d_separated;

/// One piece of advice about a term that could not be proven
/// identifiable, paired with the observed variable it concerns (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub variable: Option<String>,
    pub message: String,
}

/// Suggests fixes for `term` against `g`. Mirrors the original's three
/// checks: whether every observed variable is d-separated from the
/// outcome in the do(X) graph (in which case drop all conditioning), and
/// otherwise, for each observed variable that is a direct cause of the
/// outcome, whether it's a mediator (avoid conditioning on it) or a
/// plain cause only observed (consider intervening on it instead).
pub fn suggest_fix(term: &Term, g: &Dag) -> Vec<Suggestion> {
    let y = term.outcome.var();
    let do_vars = term.intervention_vars();
    let obs_vars = term.observation_vars();

    let g_do = g.bar(&do_vars.iter().map(|v| v.to_string()).collect());

    let all_dsep = !obs_vars.is_empty()
        && obs_vars.iter().all(|&z| {
            let mut conditioning: std::collections::HashSet<String> =
                do_vars.iter().map(|v| v.to_string()).collect();
            conditioning.extend(obs_vars.iter().filter(|&&v| v != z).map(|v| v.to_string()));
            is_d_separated(&g_do, y, z, &conditioning.into_iter().collect())
        });

    if all_dsep {
        return vec![Suggestion {
            variable: None,
            message: format!(
                "All observed variables are d-separated from {y} in the interventional graph. \
                 Consider using P({y}) instead -- no conditioning is necessary.",
                y = y
            ),
        }];
    }

    let mut suggestions = vec![];
    for &z in &obs_vars {
        if g.children_of(z).any(|c| c == y) {
            let is_mediator = obs_vars
                .iter()
                .any(|&x| x != z && g.reachable(x, z));
            if is_mediator {
                suggestions.push(Suggestion {
                    variable: Some(z.to_string()),
                    message: format!(
                        "{z} is a mediator between a cause and {y}. Avoid conditioning on {z} \
                         to prevent post-treatment bias.",
                        z = z,
                        y = y
                    ),
                });
            } else {
                suggestions.push(Suggestion {
                    variable: Some(z.to_string()),
                    message: format!(
                        "{z} causes {y}, but is only observed. Consider using do({z}) if you \
                         intend an intervention.",
                        z = z,
                        y = y
                    ),
                });
            }
        }

        let mut conditioning: std::collections::HashSet<String> =
            do_vars.iter().map(|v| v.to_string()).collect();
        conditioning.extend(obs_vars.iter().filter(|&&v| v != z).map(|v| v.to_string()));
        if !is_d_separated(&g_do, y, z, &conditioning.into_iter().collect()) {
            suggestions.push(Suggestion {
                variable: Some(z.to_string()),
                message: format!(
                    "Conditioning on {z} may bias results; {y} is not d-separated from {z} given \
                     the remaining conditions.",
                    z = z,
                    y = y
                ),
            });
        }
    }
    suggestions
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

    #[test]
    fn test_suggests_dropping_irrelevant_conditioning() {
        let g = dag_of(&[("X", &["Y"]), ("W", &[])]);
        let term = Term::new(
            Outcome::Bare("Y".to_string()),
            vec![Condition::intervention("X"), Condition::observation("W")],
        );
        let suggestions = suggest_fix(&term, &g);
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].message.contains("P(Y)"));
    }

    #[test]
    fn test_flags_direct_cause_observed_instead_of_intervened() {
        let g = dag_of(&[("Z", &["Y"]), ("X", &["Y"])]);
        let term = Term::new(
            Outcome::Bare("Y".to_string()),
            vec![Condition::intervention("X"), Condition::observation("Z")],
        );
        let suggestions = suggest_fix(&term, &g);
        assert!(suggestions.iter().any(|s| s.message.contains("do(Z)")));
    }

    #[test]
    fn test_no_suggestions_for_well_formed_term() {
        let g = dag_of(&[("X", &["Y"])]);
        let term = Term::new(Outcome::Bare("Y".to_string()), vec![Condition::intervention("X")]);
        assert!(suggest_fix(&term, &g).is_empty());
    }
}
