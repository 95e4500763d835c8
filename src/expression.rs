use std::fmt;

use crate::term::Term;

/// An arithmetic composition of causal probability terms.
///
/// The proof-search core (`search`) only interprets a bare `Term` and the
/// `Add(Term, Neg(Term))` shape (the "A - B" / ATE pattern). Everything
/// else -- general sums, products -- passes through unchanged, per
/// spec.md §3.5 and the `Term{..}`/`Add(terms…)`/`Product(terms…)`/`Neg(term)`
/// design note in §9.
#[derive(Debug, Clone)]
pub enum Expression {
    Term(Term),
    Add(Vec<Expression>),
    Neg(Box<Expression>),
    Product(Vec<Expression>),
}

impl Expression {
    pub fn term(t: Term) -> Expression {
        Expression::Term(t)
    }

    pub fn difference(a: Term, b: Term) -> Expression {
        Expression::Add(vec![
            Expression::Term(a),
            Expression::Neg(Box::new(Expression::Term(b))),
        ])
    }

    /// If this expression is exactly a single term, return it.
    pub fn as_term(&self) -> Option<&Term> {
        match self {
            Expression::Term(t) => Some(t),
            _ => None,
        }
    }

    /// Recognizes the `A - B` shape (`Add([a, Neg(b)])`) without requiring
    /// `a` and `b` to themselves be bare terms. Separated out from
    /// `as_ate_pair` so a caller can tell "not a difference at all" apart
    /// from "a difference, but one side isn't a term" -- the two situations
    /// are different error kinds in `search::find_proof`.
    fn as_difference_shape(&self) -> Option<(&Expression, &Expression)> {
        let Expression::Add(terms) = self else {
            return None;
        };
        let [a, b] = terms.as_slice() else {
            return None;
        };
        let Expression::Neg(boxed) = b else {
            return None;
        };
        Some((a, boxed))
    }

    /// Recognizes the `A - B` (ATE) shape: `Add([Term(a), Neg(Term(b))])`.
    /// Returns `None` for anything else, including a difference shape whose
    /// operands aren't bare terms -- see `is_malformed_difference` for that
    /// case.
    pub fn as_ate_pair(&self) -> Option<(&Term, &Term)> {
        let (a, b) = self.as_difference_shape()?;
        Some((a.as_term()?, b.as_term()?))
    }

    /// True for a difference shape (`A - B`) whose operands aren't both
    /// bare terms, e.g. `P(A|B)*P(C) - P(D|E)*P(F)`. Distinguishes a
    /// genuine ATE-shaped type error from an expression that doesn't
    /// resemble a difference at all.
    pub fn is_malformed_difference(&self) -> bool {
        self.as_difference_shape().is_some() && self.as_ate_pair().is_none()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::Term(t) => write!(f, "{}", t),
            Expression::Neg(inner) => write!(f, "-{}", inner),
            Expression::Add(terms) => {
                for (i, t) in terms.iter().enumerate() {
                    if i > 0 {
                        if let Expression::Neg(inner) = t {
                            write!(f, " - {}", inner)?;
                            continue;
                        }
                        write!(f, " + ")?;
                    }
                    write!(f, "{}", t)?;
                }
                Ok(())
            }
            Expression::Product(terms) => {
                for (i, t) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " * ")?;
                    }
                    write!(f, "{}", t)?;
                }
                Ok(())
            }
        }
    }
}
