//! The result of a successful search: a labeled chain of terms, or (for an
//! ATE query) a pair of such chains.

use std::fmt;

use crate::term::Term;

pub const RULE_1: &str = "Do-calculus Rule 1";
pub const RULE_2: &str = "Do-calculus Rule 2";
pub const RULE_3: &str = "Do-calculus Rule 3";
pub const INITIAL: &str = "Initial";
pub const ATE_LEFT: &str = "ATE-left";
pub const ATE_RIGHT: &str = "ATE-right";

/// One term in a proof, plus the label of the rule that produced it from
/// the previous step. A chain never includes the start term itself --
/// an already-equivalent start/target pair is an empty chain, not a
/// chain of one [`INITIAL`] step. [`INITIAL`] labels the start entry in
/// `search::explore`'s reachability listing, which is a different
/// structure from a proof chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofStep {
    pub term: Term,
    pub rule: &'static str,
}

impl fmt::Display for ProofStep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} [{}]", self.term, self.rule)
    }
}

/// A completed proof: either a single chain from start to target, or an ATE
/// query decomposed into two independent single-term proofs (spec.md §4.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proof {
    Single(Vec<ProofStep>),
    Ate {
        left: Vec<ProofStep>,
        right: Vec<ProofStep>,
    },
}

impl fmt::Display for Proof {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Proof::Single(steps) => {
                for step in steps {
                    writeln!(f, "{}", step)?;
                }
                Ok(())
            }
            Proof::Ate { left, right } => {
                writeln!(f, "-- left term --")?;
                for step in left {
                    writeln!(f, "{}", step)?;
                }
                writeln!(f, "-- right term --")?;
                for step in right {
                    writeln!(f, "{}", step)?;
                }
                Ok(())
            }
        }
    }
}
