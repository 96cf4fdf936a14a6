use std::fmt;

use crate::language::Object;

// ============================================================================
// Display Implementation
// ============================================================================

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Object::Empty => write!(f, "()"),
            Object::Integer(n) => write!(f, "{n}"),
            Object::Symbol(s) => write!(f, "{s}"),
            Object::Boolean(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Object::Pair(_) => {
                write!(f, "(")?;
                let mut current = self;
                while let Object::Pair(pair) = current {
                    write!(f, "{}", pair.car)?;
                    match &pair.cdr {
                        Object::Empty => break,
                        Object::Pair(_) => {
                            write!(f, " ")?;
                            current = &pair.cdr;
                        }
                        other => {
                            write!(f, " . {other}")?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
            Object::Primitive(_) => write!(f, "<primitive>"),
            Object::Closure(_) => write!(f, "<closure>"),
        }
    }
}

/// Render `obj` in the syntax the reader accepts.
pub fn write(obj: &Object) -> String {
    obj.to_string()
}
