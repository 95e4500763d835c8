use std::fmt;

use fxhash::FxHashSet;

use crate::condition::{Condition, ConditionKind, Value};

/// The thing a term's probability is about: a bare variable, or a variable
/// fixed to a particular value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    Bare(String),
    Equality(String, Value),
}

impl Outcome {
    pub fn var(&self) -> &str {
        match self {
            Outcome::Bare(v) => v,
            Outcome::Equality(v, _) => v,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Bare(v) => write!(f, "{}", v),
            Outcome::Equality(v, val) => write!(f, "{}={}", v, val),
        }
    }
}

/// A causal probability term `P(Y | C)`. `C` is a multiset of conditions
/// treated as a set: `Term::new` coalesces duplicates and sorts into
/// canonical order, so two terms with the same outcome and the same
/// condition set are `==` regardless of the order they were built in.
#[derive(Debug, Clone, Eq)]
pub struct Term {
    pub outcome: Outcome,
    conditions: Vec<Condition>,
}

impl Term {
    /// Builds a canonical term: sorts conditions, and for any two
    /// conditions on the same variable of the same kind, keeps only the
    /// first one supplied (spec.md §3.4's open question: this is lenient,
    /// not an error — see DESIGN.md).
    pub fn new(outcome: Outcome, conditions: Vec<Condition>) -> Term {
        let mut kept: Vec<Condition> = Vec::with_capacity(conditions.len());
        for cond in conditions {
            if !kept.iter().any(|c| c.same_slot(&cond)) {
                kept.push(cond);
            }
        }
        kept.sort();
        Term {
            outcome,
            conditions: kept,
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn interventions(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.iter().filter(|c| c.is_intervention())
    }

    pub fn observations(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.iter().filter(|c| c.is_observation())
    }

    pub fn intervention_vars(&self) -> Vec<&str> {
        self.interventions().map(|c| c.var.as_str()).collect()
    }

    pub fn observation_vars(&self) -> Vec<&str> {
        self.observations().map(|c| c.var.as_str()).collect()
    }

    /// All variables mentioned anywhere in the term: the outcome and every
    /// condition. Used to check the "no enumerator introduces a new
    /// variable" invariant (spec.md §8, property 4).
    pub fn variables(&self) -> FxHashSet<&str> {
        let mut vars: FxHashSet<&str> = self.conditions.iter().map(|c| c.var.as_str()).collect();
        vars.insert(self.outcome.var());
        vars
    }

    /// Returns a new term with the given condition removed (matched by
    /// variable and kind, ignoring value). Used by Rules 1 and 3.
    pub fn without_condition(&self, kind: ConditionKind, var: &str) -> Term {
        let conditions = self
            .conditions
            .iter()
            .filter(|c| !(c.kind == kind && c.var == var))
            .cloned()
            .collect();
        Term::new(self.outcome.clone(), conditions)
    }

    /// Returns a new term with the intervention on `var` turned into an
    /// observation on the same variable, value preserved. Used by Rule 2.
    pub fn with_intervention_observed(&self, var: &str) -> Term {
        let conditions = self
            .conditions
            .iter()
            .map(|c| {
                if c.is_intervention() && c.var == var {
                    c.with_kind(ConditionKind::Observation)
                } else {
                    c.clone()
                }
            })
            .collect();
        Term::new(self.outcome.clone(), conditions)
    }

    /// Structural equivalence used by the proof search's goal check: same
    /// outcome, same intervention set, same observation set. For a
    /// canonical `Term` this is exactly `==`, but the search code checks
    /// both this and the state key explicitly, per spec.md §4.4.
    pub fn structurally_equal(&self, other: &Term) -> bool {
        self == other
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.outcome == other.outcome && self.conditions == other.conditions
    }
}

impl std::hash::Hash for Term {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.outcome.hash(state);
        self.conditions.hash(state);
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.conditions.is_empty() {
            return write!(f, "P({})", self.outcome);
        }
        write!(f, "P({} | ", self.outcome)?;
        for (i, cond) in self.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", cond)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn y() -> Outcome {
        Outcome::Bare("Y".to_string())
    }

    #[test]
    fn test_duplicate_conditions_keep_first() {
        let t = Term::new(
            y(),
            vec![
                Condition::observation_eq("X", Value::Int(0)),
                Condition::observation_eq("X", Value::Int(1)),
            ],
        );
        assert_eq!(t.conditions().len(), 1);
        assert_eq!(t.to_string(), "P(Y | X=0)");
    }

    #[test]
    fn test_canonical_display() {
        let t = Term::new(
            y(),
            vec![
                Condition::observation("W"),
                Condition::intervention("X"),
            ],
        );
        assert_eq!(t.to_string(), "P(Y | do(X), W)");
    }

    #[test]
    fn test_order_independent_equality() {
        let a = Term::new(
            y(),
            vec![Condition::observation("W"), Condition::intervention("X")],
        );
        let b = Term::new(
            y(),
            vec![Condition::intervention("X"), Condition::observation("W")],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_conditions_renders_bare() {
        let t = Term::new(y(), vec![]);
        assert_eq!(t.to_string(), "P(Y)");
    }

    #[test]
    fn test_with_intervention_observed_preserves_value() {
        let t = Term::new(y(), vec![Condition::intervention_eq("X", Value::Int(1))]);
        let t2 = t.with_intervention_observed("X");
        assert_eq!(t2.to_string(), "P(Y | X=1)");
    }
}
