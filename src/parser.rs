//! Surface-syntax parser for causal probability expressions.
//!
//! Grounded in `CausalProbability.parse` from the original Python
//! implementation (`examples/original_source/probability.py`): same surface
//! grammar (`P(Y)`, `P(Y=v)`, `P(Y | W, do(X))`, subscript notation
//! `P(Y_{X=1,Z=0})`, and `+`/`-`/`*` composition), reimplemented with the
//! `regex` crate instead of the original's placeholder-and-sympify trick.
//! This module is a collaborator of the core, not part of it: `search` and
//! `rules` never call it, and it never reaches into the d-separation oracle.

use std::sync::OnceLock;

use regex::Regex;

use crate::condition::{Condition, Value};
use crate::error::{DoverifyError, Result};
use crate::expression::Expression;
use crate::term::{Outcome, Term};

fn subscript_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\w+)_\{([^}]*)\}$").unwrap())
}

/// Parses a full expression: one or more `P(...)` terms combined with
/// `+`, `-`, and `*` at the top level (operators inside a `P(...)` or a
/// `{...}` subscript don't count as splits).
pub fn parse_expression(input: &str) -> Result<Expression> {
    let trimmed: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let sums = split_top_level(&trimmed, &['+', '-']);
    if sums.len() == 1 && sums[0].1 == '+' {
        return parse_product(&sums[0].0);
    }

    let mut terms = vec![];
    for (chunk, sign) in sums {
        let product = parse_product(&chunk)?;
        if sign == '-' {
            terms.push(Expression::Neg(Box::new(product)));
        } else {
            terms.push(product);
        }
    }
    if terms.len() == 1 {
        Ok(terms.into_iter().next().unwrap())
    } else {
        Ok(Expression::Add(terms))
    }
}

fn parse_product(input: &str) -> Result<Expression> {
    let factors = split_top_level_single_char(input, '*');
    if factors.len() == 1 {
        return Ok(Expression::Term(parse_term(&factors[0])?));
    }
    let mut out = vec![];
    for f in factors {
        out.push(Expression::Term(parse_term(&f)?));
    }
    Ok(Expression::Product(out))
}

/// Splits `input` on any of `ops` at paren/brace depth zero, keeping the
/// operator that precedes each chunk (`+` for the first chunk, or when the
/// chunk starts with neither).
fn split_top_level(input: &str, ops: &[char]) -> Vec<(String, char)> {
    let mut out = vec![];
    let mut depth = 0i32;
    let mut current = String::new();
    let mut sign = '+';
    for c in input.chars() {
        match c {
            '(' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | '}' => {
                depth -= 1;
                current.push(c);
            }
            c if depth == 0 && ops.contains(&c) => {
                if !current.is_empty() {
                    out.push((std::mem::take(&mut current), sign));
                }
                sign = c;
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        out.push((current, sign));
    }
    out
}

fn split_top_level_single_char(input: &str, op: char) -> Vec<String> {
    split_top_level(input, &[op])
        .into_iter()
        .map(|(chunk, _)| chunk)
        .collect()
}

/// Parses one `P(...)` term.
pub fn parse_term(input: &str) -> Result<Term> {
    let input: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if !input.starts_with("P(") || !input.ends_with(')') {
        return Err(DoverifyError::Parse {
            detail: format!("expected P(...), got `{}`", input),
        });
    }
    let inner = &input[2..input.len() - 1];
    let mut parts = inner.splitn(2, '|');
    let outcome_part = parts.next().unwrap_or("");
    let condition_part = parts.next();

    let (outcome, subscript_conditions) = parse_outcome(outcome_part)?;
    let mut conditions = subscript_conditions;
    if let Some(cond_str) = condition_part {
        for piece in split_top_level_single_char(cond_str, ',') {
            if !piece.is_empty() {
                conditions.push(parse_condition(&piece)?);
            }
        }
    }
    Ok(Term::new(outcome, conditions))
}

fn parse_outcome(input: &str) -> Result<(Outcome, Vec<Condition>)> {
    if let Some(caps) = subscript_re().captures(input) {
        let var = caps[1].to_string();
        let mut conditions = vec![];
        for piece in caps[2].split(',') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            conditions.push(Condition::intervention_eq(
                var_name(piece)?,
                parse_eq_value(piece)?,
            ));
        }
        return Ok((Outcome::Bare(var), conditions));
    }

    if let Some((var, val)) = input.split_once('=') {
        Ok((Outcome::Equality(var.to_string(), parse_value(val)?), vec![]))
    } else if input.is_empty() {
        Err(DoverifyError::Parse {
            detail: "empty outcome".to_string(),
        })
    } else {
        Ok((Outcome::Bare(input.to_string()), vec![]))
    }
}

fn var_name(assignment: &str) -> Result<String> {
    let (var, _) = assignment.split_once('=').ok_or_else(|| DoverifyError::Parse {
        detail: format!("expected VAR=value in subscript, got `{}`", assignment),
    })?;
    Ok(var.to_string())
}

fn parse_eq_value(assignment: &str) -> Result<Value> {
    let (_, val) = assignment.split_once('=').ok_or_else(|| DoverifyError::Parse {
        detail: format!("expected VAR=value in subscript, got `{}`", assignment),
    })?;
    parse_value(val)
}

fn parse_condition(input: &str) -> Result<Condition> {
    if let Some(inner) = input.strip_prefix("do(").and_then(|s| s.strip_suffix(')')) {
        return Ok(match inner.split_once('=') {
            Some((var, val)) => Condition::intervention_eq(var, parse_value(val)?),
            None => Condition::intervention(inner),
        });
    }
    Ok(match input.split_once('=') {
        Some((var, val)) => Condition::observation_eq(var, parse_value(val)?),
        None => Condition::observation(input),
    })
}

fn parse_value(input: &str) -> Result<Value> {
    let input = input.trim();
    if let Ok(i) = input.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    if let Ok(f) = input.parse::<f64>() {
        return Ok(Value::Real(ordered_float::OrderedFloat(f)));
    }
    if input.is_empty() {
        return Err(DoverifyError::Parse {
            detail: "empty value".to_string(),
        });
    }
    Ok(Value::Symbol(input.to_string()))
}
