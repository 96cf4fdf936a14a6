use std::fmt;
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::interner::Symbol;
use crate::primitives::Primitive;

// ============================================================================
// Core Type System
// ============================================================================

#[derive(Clone, Debug)]
pub struct Pair {
    pub car: Object,
    pub cdr: Object,
}

// Long lists are walked along the cdr chain in a loop; only car nesting,
// which the reader bounds, recurses.
impl PartialEq for Pair {
    fn eq(&self, other: &Self) -> bool {
        let (mut a, mut b) = (self, other);
        loop {
            if a.car != b.car {
                return false;
            }
            match (&a.cdr, &b.cdr) {
                (Object::Pair(x), Object::Pair(y)) => {
                    if Rc::ptr_eq(x, y) {
                        return true;
                    }
                    a = &**x;
                    b = &**y;
                }
                (x, y) => return x == y,
            }
        }
    }
}

impl Drop for Pair {
    fn drop(&mut self) {
        let mut tail = std::mem::replace(&mut self.cdr, Object::Empty);
        while let Object::Pair(next) = tail {
            // A shared tail is still owned elsewhere; leave it alone.
            match Rc::try_unwrap(next) {
                Ok(mut pair) => tail = std::mem::replace(&mut pair.cdr, Object::Empty),
                Err(_) => break,
            }
        }
    }
}

/// A user procedure: the environment active when its `lambda` was
/// evaluated, its parameter names, and a single body expression.
#[derive(Clone)]
pub struct Closure {
    pub env: Environment,
    pub formals: Vec<Symbol>,
    pub body: Object,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("formals", &self.formals)
            .field("body", &self.body)
            .field("env", &"<environment>")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub enum Object {
    /// The empty list `()`
    Empty,
    Integer(i64),
    Symbol(Symbol),
    /// `#t` or `#f`; there are no other boolean values
    Boolean(bool),
    Pair(Rc<Pair>),
    Primitive(&'static Primitive),
    Closure(Rc<Closure>),
}

impl Object {
    pub const TRUE: Object = Object::Boolean(true);
    pub const FALSE: Object = Object::Boolean(false);

    pub fn symbol(name: &str) -> Object {
        Object::Symbol(Symbol::intern(name))
    }

    /// Everything except `#f` counts as true in a conditional.
    pub fn is_false(&self) -> bool {
        matches!(self, Object::Boolean(false))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Object::Empty)
    }

    pub fn as_symbol(&self) -> Option<Symbol> {
        match self {
            Object::Symbol(sym) => Some(*sym),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Collect a proper list into a vector, or fail naming `who`.
    pub fn to_vec(&self, who: &str) -> Result<Vec<Object>> {
        let mut items = Vec::new();
        let mut current = self;
        loop {
            match current {
                Object::Empty => return Ok(items),
                Object::Pair(pair) => {
                    items.push(pair.car.clone());
                    current = &pair.cdr;
                }
                other => return Err(Error::type_mismatch(who, "proper list", other)),
            }
        }
    }
}

// Booleans compare by identity of the two singletons, which for a
// two-valued payload is plain value equality. Procedures compare by
// reference.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Empty, Object::Empty) => true,
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Symbol(a), Object::Symbol(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::Pair(a), Object::Pair(b)) => a == b,
            (Object::Primitive(a), Object::Primitive(b)) => std::ptr::eq(*a, *b),
            (Object::Closure(a), Object::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<i64> for Object {
    fn from(n: i64) -> Self {
        Object::Integer(n)
    }
}

impl From<bool> for Object {
    fn from(b: bool) -> Self {
        Object::Boolean(b)
    }
}

impl From<Symbol> for Object {
    fn from(sym: Symbol) -> Self {
        Object::Symbol(sym)
    }
}

// ============================================================================
// Pair Operations
// ============================================================================

pub fn cons(car: Object, cdr: Object) -> Object {
    Object::Pair(Rc::new(Pair { car, cdr }))
}

pub fn car(obj: &Object) -> Result<Object> {
    match obj {
        Object::Pair(pair) => Ok(pair.car.clone()),
        _ => Err(Error::type_mismatch("car", "pair", obj)),
    }
}

pub fn cdr(obj: &Object) -> Result<Object> {
    match obj {
        Object::Pair(pair) => Ok(pair.cdr.clone()),
        _ => Err(Error::type_mismatch("cdr", "pair", obj)),
    }
}

/// Build a proper list from `items`, first element first.
pub fn list<I>(items: I) -> Object
where
    I: IntoIterator<Item = Object>,
    I::IntoIter: DoubleEndedIterator,
{
    items
        .into_iter()
        .rev()
        .fold(Object::Empty, |acc, item| cons(item, acc))
}
