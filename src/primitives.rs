//! Built-in procedures
//!
//! Every primitive receives its arguments already evaluated, plus the
//! calling environment. Argument counts are checked against the declared
//! [`Arity`] before the body runs.

use std::fmt;

use log::trace;

use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::interner::Symbol;
use crate::language::Object;

pub type PrimitiveFn = fn(&[Object], &Environment) -> Result<Object>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

pub struct Primitive {
    pub name: &'static str,
    pub arity: Arity,
    func: PrimitiveFn,
}

impl Primitive {
    pub fn call(&self, args: &[Object], env: &Environment) -> Result<Object> {
        if !self.arity.accepts(args.len()) {
            return Err(Error::arity(self.name, self.arity, args.len()));
        }
        trace!("primitive {} with {} argument(s)", self.name, args.len());
        (self.func)(args, env)
    }
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Primitive")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// The fixed registry, in registration order.
pub static PRIMITIVES: [Primitive; 10] = [
    Primitive { name: "+", arity: Arity::AtLeast(0), func: add },
    Primitive { name: "-", arity: Arity::AtLeast(1), func: sub },
    Primitive { name: "*", arity: Arity::Exactly(2), func: mul },
    Primitive { name: "/", arity: Arity::Exactly(2), func: div },
    Primitive { name: "zero?", arity: Arity::Exactly(1), func: is_zero },
    Primitive { name: "null?", arity: Arity::Exactly(1), func: is_null },
    Primitive { name: "eq?", arity: Arity::Exactly(2), func: is_eq },
    Primitive { name: "<", arity: Arity::Exactly(2), func: less_than },
    Primitive { name: ">", arity: Arity::Exactly(2), func: greater_than },
    Primitive { name: "=", arity: Arity::AtLeast(1), func: num_eq },
];

/// Bind every primitive in the global frame of `env`.
pub fn register_primitives(env: &Environment) {
    for primitive in &PRIMITIVES {
        env.define_global(Symbol::intern(primitive.name), Object::Primitive(primitive));
    }
}

/// A fresh global environment holding exactly the built-in procedures.
pub fn create_global_environment() -> Environment {
    let env = Environment::new();
    register_primitives(&env);
    env
}

// ============================================================================
// Helpers
// ============================================================================

fn integer(who: &str, arg: &Object) -> Result<i64> {
    arg.as_integer()
        .ok_or_else(|| Error::type_mismatch(who, "integer", arg))
}

fn integers(who: &str, args: &[Object]) -> Result<Vec<i64>> {
    args.iter().map(|arg| integer(who, arg)).collect()
}

// ============================================================================
// Arithmetic
// ============================================================================

fn add(args: &[Object], _env: &Environment) -> Result<Object> {
    integers("+", args)?
        .into_iter()
        .try_fold(0i64, |acc, n| acc.checked_add(n).ok_or_else(|| Error::overflow("+")))
        .map(Object::Integer)
}

fn sub(args: &[Object], _env: &Environment) -> Result<Object> {
    let nums = integers("-", args)?;
    let (first, rest) = nums.split_first().ok_or_else(|| Error::arity("-", Arity::AtLeast(1), 0))?;
    rest.iter()
        .try_fold(*first, |acc, n| acc.checked_sub(*n).ok_or_else(|| Error::overflow("-")))
        .map(Object::Integer)
}

fn mul(args: &[Object], _env: &Environment) -> Result<Object> {
    let a = integer("*", &args[0])?;
    let b = integer("*", &args[1])?;
    a.checked_mul(b)
        .map(Object::Integer)
        .ok_or_else(|| Error::overflow("*"))
}

fn div(args: &[Object], _env: &Environment) -> Result<Object> {
    let a = integer("/", &args[0])?;
    let b = integer("/", &args[1])?;
    if b == 0 {
        return Err(Error::division_by_zero("/"));
    }
    // i64::MIN / -1
    a.checked_div(b)
        .map(Object::Integer)
        .ok_or_else(|| Error::overflow("/"))
}

// ============================================================================
// Predicates
// ============================================================================

fn is_zero(args: &[Object], _env: &Environment) -> Result<Object> {
    Ok(Object::from(integer("zero?", &args[0])? == 0))
}

fn is_null(args: &[Object], _env: &Environment) -> Result<Object> {
    Ok(Object::from(args[0].is_empty()))
}

fn is_eq(args: &[Object], _env: &Environment) -> Result<Object> {
    let same = match (&args[0], &args[1]) {
        (Object::Symbol(a), Object::Symbol(b)) => a == b,
        (Object::Integer(a), Object::Integer(b)) => a == b,
        _ => false,
    };
    Ok(Object::from(same))
}

fn less_than(args: &[Object], _env: &Environment) -> Result<Object> {
    Ok(Object::from(integer("<", &args[0])? < integer("<", &args[1])?))
}

fn greater_than(args: &[Object], _env: &Environment) -> Result<Object> {
    Ok(Object::from(integer(">", &args[0])? > integer(">", &args[1])?))
}

fn num_eq(args: &[Object], _env: &Environment) -> Result<Object> {
    let nums = integers("=", args)?;
    Ok(Object::from(nums.iter().all(|n| *n == nums[0])))
}
