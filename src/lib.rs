//! abscm - a minimal Scheme-family interpreter core
//!
//! The crate is made of four cooperating pieces sharing one object model:
//!
//! - `reader`: characters to [`Object`] trees
//! - `evaluator`: `eval`/`apply` over a chained [`Environment`]
//! - `primitives`: the fixed set of built-in procedures
//! - `printer`: [`Object`] back to text
//!
//! ```
//! use abscm::{create_global_environment, eval, parse};
//!
//! let env = create_global_environment();
//! eval(&parse("(define add1 (lambda (n) (+ n 1)))").unwrap(), &env).unwrap();
//! let result = eval(&parse("(add1 41)").unwrap(), &env).unwrap();
//! assert_eq!(result.to_string(), "42");
//! ```

pub mod environment;
pub mod error;
pub mod evaluator;
pub mod interner;
pub mod language;
pub mod primitives;
pub mod printer;
pub mod reader;

use std::{io, panic, thread};

/// Maximum number of closure applications active at once before evaluation
/// is abandoned with `ErrorKind::RecursionLimit`. There is no tail-call
/// elimination, so this bounds the recursion depth of user procedures.
pub const MAX_EVAL_DEPTH: usize = 10_000;

/// Maximum nesting of lists and quotes the reader accepts. Deeper input is a
/// `ErrorKind::ParseError`, which also bounds how deep any expression handed
/// to `eval` can be.
pub const MAX_READ_DEPTH: usize = 256;

/// Stack reserved by [`with_eval_stack`]; enough for `MAX_EVAL_DEPTH`
/// nested calls in an unoptimized build.
pub const EVAL_STACK_SIZE: usize = 256 * 1024 * 1024;

// Re-export commonly used items for convenience
pub use environment::Environment;
pub use error::{Error, ErrorKind, Position, Result};
pub use evaluator::{apply, eval};
pub use interner::Symbol;
pub use language::{Closure, Object, Pair, car, cdr, cons, list};
pub use primitives::{Arity, PRIMITIVES, Primitive, create_global_environment, register_primitives};
pub use printer::write;
pub use reader::{Reader, parse, parse_all};

/// Read and evaluate every expression in `source` against `env`, in order,
/// returning each result. The first failure stops the run; definitions
/// made by earlier expressions stay in `env`.
pub fn run_source(source: &str, env: &Environment) -> Result<Vec<Object>> {
    let mut results = Vec::new();
    for expr in Reader::from_text(source) {
        results.push(eval(&expr?, env)?);
    }
    Ok(results)
}

/// Run `f` on a dedicated thread with an [`EVAL_STACK_SIZE`] stack.
///
/// The default main-thread stack runs out long before `MAX_EVAL_DEPTH`
/// calls, so deep recursion should be evaluated in here. A panic in `f` is
/// resumed on the calling thread.
pub fn with_eval_stack<F, T>(f: F) -> io::Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let handle = thread::Builder::new()
        .name("abscm-eval".to_string())
        .stack_size(EVAL_STACK_SIZE)
        .spawn(f)?;
    match handle.join() {
        Ok(value) => Ok(value),
        Err(payload) => panic::resume_unwind(payload),
    }
}
