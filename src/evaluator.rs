//! Tree-walking evaluator
//!
//! `eval` dispatches on the shape of an expression: self-evaluating data,
//! symbol lookup, the four special forms (`quote`, `lambda`, `define`,
//! `if`), and procedure application. `apply` runs an already-evaluated
//! procedure on already-evaluated arguments.

use std::rc::Rc;

use log::trace;
use once_cell::sync::Lazy;

use crate::MAX_EVAL_DEPTH;
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::interner::Symbol;
use crate::language::{Closure, Object};

// ============================================================================
// Special Forms
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecialForm {
    Quote,
    Lambda,
    Define,
    If,
}

struct Keywords {
    quote: Symbol,
    lambda: Symbol,
    define: Symbol,
    if_: Symbol,
}

static KEYWORDS: Lazy<Keywords> = Lazy::new(|| Keywords {
    quote: Symbol::intern("quote"),
    lambda: Symbol::intern("lambda"),
    define: Symbol::intern("define"),
    if_: Symbol::intern("if"),
});

impl SpecialForm {
    fn classify(operator: &Object) -> Option<SpecialForm> {
        let sym = operator.as_symbol()?;
        let keywords = &*KEYWORDS;
        if sym == keywords.quote {
            Some(SpecialForm::Quote)
        } else if sym == keywords.lambda {
            Some(SpecialForm::Lambda)
        } else if sym == keywords.define {
            Some(SpecialForm::Define)
        } else if sym == keywords.if_ {
            Some(SpecialForm::If)
        } else {
            None
        }
    }
}

// ============================================================================
// Evaluator
// ============================================================================

/// Evaluate `expr` in `env`.
pub fn eval(expr: &Object, env: &Environment) -> Result<Object> {
    eval_at(expr, env, 0)
}

/// Apply an evaluated procedure to evaluated arguments.
pub fn apply(operator: &Object, args: &[Object], env: &Environment) -> Result<Object> {
    apply_at(operator, args, env, 0)
}

// `depth` counts the closure applications currently active; nesting inside
// a single expression is bounded by the reader instead.
fn eval_at(expr: &Object, env: &Environment, depth: usize) -> Result<Object> {
    match expr {
        // Self-evaluating forms
        Object::Empty
        | Object::Integer(_)
        | Object::Boolean(_)
        | Object::Primitive(_)
        | Object::Closure(_) => Ok(expr.clone()),

        // Bound values are already evaluated, so one lookup is enough
        Object::Symbol(name) => env.lookup(*name),

        Object::Pair(pair) => {
            let operator = &pair.car;
            let operands = pair.cdr.to_vec("application")?;

            match SpecialForm::classify(operator) {
                Some(SpecialForm::Quote) => eval_quote(&operands),
                Some(SpecialForm::Lambda) => eval_lambda(&operands, env),
                Some(SpecialForm::Define) => eval_define(&operands, env, depth),
                Some(SpecialForm::If) => eval_if(&operands, env, depth),
                None => {
                    let procedure = eval_at(operator, env, depth)?;
                    let mut args = Vec::with_capacity(operands.len());
                    for operand in &operands {
                        args.push(eval_at(operand, env, depth)?);
                    }
                    apply_at(&procedure, &args, env, depth)
                }
            }
        }
    }
}

fn apply_at(operator: &Object, args: &[Object], env: &Environment, depth: usize) -> Result<Object> {
    match operator {
        Object::Primitive(primitive) => primitive.call(args, env),
        Object::Closure(closure) => {
            if depth >= MAX_EVAL_DEPTH {
                return Err(Error::recursion_limit(MAX_EVAL_DEPTH));
            }
            trace!(
                "apply closure of {} formal(s) at depth {depth}",
                closure.formals.len()
            );
            let call_env = closure.env.extend(&closure.formals, args)?;
            eval_at(&closure.body, &call_env, depth + 1)
        }
        other => Err(Error::unknown_operator(other)),
    }
}

fn expect_operands(form: &str, operands: &[Object], allowed: &[usize]) -> Result<()> {
    if allowed.contains(&operands.len()) {
        return Ok(());
    }
    let expected = allowed
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ");
    Err(Error::arity(form, expected, operands.len()))
}

fn eval_quote(operands: &[Object]) -> Result<Object> {
    expect_operands("quote", operands, &[1])?;
    Ok(operands[0].clone())
}

/// `(lambda (formal ...) body)` closes over the current environment.
fn eval_lambda(operands: &[Object], env: &Environment) -> Result<Object> {
    expect_operands("lambda", operands, &[2])?;

    let formals = operands[0]
        .to_vec("lambda")?
        .iter()
        .map(|formal| {
            formal
                .as_symbol()
                .ok_or_else(|| Error::type_mismatch("lambda", "symbol as parameter", formal))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Object::Closure(Rc::new(Closure {
        env: env.clone(),
        formals,
        body: operands[1].clone(),
    })))
}

/// `(define name expr)` always binds in the global frame.
fn eval_define(operands: &[Object], env: &Environment, depth: usize) -> Result<Object> {
    expect_operands("define", operands, &[2])?;

    let name = operands[0]
        .as_symbol()
        .ok_or_else(|| Error::type_mismatch("define", "symbol", &operands[0]))?;
    let value = eval_at(&operands[1], env, depth)?;
    env.define_global(name, value.clone());
    Ok(value)
}

/// `(if test consequent [alternative])`; only `#f` selects the alternative.
fn eval_if(operands: &[Object], env: &Environment, depth: usize) -> Result<Object> {
    expect_operands("if", operands, &[2, 3])?;

    let test = eval_at(&operands[0], env, depth)?;
    if !test.is_false() {
        eval_at(&operands[1], env, depth)
    } else if let Some(alternative) = operands.get(2) {
        eval_at(alternative, env, depth)
    } else {
        Ok(Object::FALSE)
    }
}
