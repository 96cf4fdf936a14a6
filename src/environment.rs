//! Environment for identifier bindings
//!
//! An environment is a chain of frames, newest first, ending in a single
//! global frame. Frames created by procedure calls are immutable once
//! built; the global frame only ever grows at its front. Cloning an
//! `Environment` is a pair of `Rc` increments, so closures share the chain
//! they captured rather than copying it.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::error::{Error, Result};
use crate::interner::Symbol;
use crate::language::Object;

// ============================================================================
// Frame
// ============================================================================

/// One binding level. Identifiers and values are kept index-aligned by
/// storing them as pairs; lookup scans from the front.
#[derive(Default)]
struct Frame {
    bindings: VecDeque<(Symbol, Object)>,
}

impl Frame {
    fn find(&self, name: Symbol) -> Option<Object> {
        self.bindings
            .iter()
            .find(|(id, _)| *id == name)
            .map(|(_, value)| value.clone())
    }

    fn prepend(&mut self, name: Symbol, value: Object) {
        self.bindings.push_front((name, value));
    }
}

struct Scope {
    frame: Frame,
    parent: Option<Rc<Scope>>,
}

// ============================================================================
// Environment
// ============================================================================

#[derive(Clone)]
pub struct Environment {
    locals: Option<Rc<Scope>>,
    global: Rc<RefCell<Frame>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create an environment holding nothing but an empty global frame.
    pub fn new() -> Self {
        Environment {
            locals: None,
            global: Rc::new(RefCell::new(Frame::default())),
        }
    }

    /// Resolve `name`, innermost frame first, global frame last.
    pub fn lookup(&self, name: Symbol) -> Result<Object> {
        let mut scope = self.locals.as_deref();
        while let Some(current) = scope {
            if let Some(value) = current.frame.find(name) {
                return Ok(value);
            }
            scope = current.parent.as_deref();
        }

        self.global
            .borrow()
            .find(name)
            .ok_or_else(|| Error::unbound(name))
    }

    /// Build a child environment binding `formals` positionally to `args`.
    /// `self` is left untouched.
    pub fn extend(&self, formals: &[Symbol], args: &[Object]) -> Result<Self> {
        if formals.len() != args.len() {
            return Err(Error::arity("procedure", formals.len(), args.len()));
        }

        let bindings = formals.iter().copied().zip(args.iter().cloned()).collect();
        Ok(Environment {
            locals: Some(Rc::new(Scope {
                frame: Frame { bindings },
                parent: self.locals.clone(),
            })),
            global: Rc::clone(&self.global),
        })
    }

    /// Bind `name` in the outermost frame, shadowing any earlier global
    /// binding of the same name. Existing entries are never touched.
    pub fn define_global(&self, name: Symbol, value: Object) {
        debug!("define {name} = {value}");
        self.global.borrow_mut().prepend(name, value);
    }

    /// Number of frames above the global one.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut scope = self.locals.as_deref();
        while let Some(current) = scope {
            depth += 1;
            scope = current.parent.as_deref();
        }
        depth
    }

    pub fn global_len(&self) -> usize {
        self.global.borrow().bindings.len()
    }

    /// True when both environments end in the same global frame.
    pub fn shares_global(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.global, &other.global)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("depth", &self.depth())
            .field("globals", &self.global_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn sym(name: &str) -> Symbol {
        Symbol::intern(name)
    }

    #[test]
    fn test_lookup_unbound() {
        let env = Environment::new();
        let err = env.lookup(sym("nowhere")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnboundIdentifier);
    }

    #[test]
    fn test_redefinition_shadows_older_binding() {
        let env = Environment::new();
        env.define_global(sym("x"), Object::Integer(1));
        env.define_global(sym("x"), Object::Integer(2));
        assert_eq!(env.lookup(sym("x")).unwrap(), Object::Integer(2));
        assert_eq!(env.global_len(), 2);
    }

    #[test]
    fn test_extend_does_not_mutate_parent() {
        let env = Environment::new();
        env.define_global(sym("y"), Object::Integer(1));
        let child = env.extend(&[sym("y")], &[Object::Integer(99)]).unwrap();

        assert_eq!(child.lookup(sym("y")).unwrap(), Object::Integer(99));
        assert_eq!(env.lookup(sym("y")).unwrap(), Object::Integer(1));
        assert_eq!(child.depth(), 1);
        assert_eq!(env.depth(), 0);
    }

    #[test]
    fn test_child_falls_through_to_parent_frames() {
        let env = Environment::new();
        env.define_global(sym("g"), Object::Integer(7));
        let outer = env.extend(&[sym("a")], &[Object::Integer(1)]).unwrap();
        let inner = outer.extend(&[sym("b")], &[Object::Integer(2)]).unwrap();

        assert_eq!(inner.lookup(sym("a")).unwrap(), Object::Integer(1));
        assert_eq!(inner.lookup(sym("g")).unwrap(), Object::Integer(7));
        assert!(outer.lookup(sym("b")).is_err());
    }

    #[test]
    fn test_define_global_visible_from_existing_children() {
        let env = Environment::new();
        let child = env.extend(&[], &[]).unwrap();
        child.define_global(sym("late"), Object::TRUE);

        assert_eq!(env.lookup(sym("late")).unwrap(), Object::TRUE);
        assert_eq!(child.lookup(sym("late")).unwrap(), Object::TRUE);
        assert!(child.shares_global(&env));
    }

    #[test]
    fn test_extend_arity_mismatch() {
        let env = Environment::new();
        let err = env
            .extend(&[sym("a"), sym("b")], &[Object::Integer(1)])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
    }

    #[test]
    fn test_first_duplicate_formal_wins() {
        let env = Environment::new();
        let child = env
            .extend(&[sym("d"), sym("d")], &[Object::Integer(1), Object::Integer(2)])
            .unwrap();
        assert_eq!(child.lookup(sym("d")).unwrap(), Object::Integer(1));
    }
}
