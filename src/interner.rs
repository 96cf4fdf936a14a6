use once_cell::sync::Lazy;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

static SYMBOLS: Lazy<RwLock<StringInterner<DefaultBackend>>> =
    Lazy::new(|| RwLock::new(StringInterner::default()));

/// An identifier name stored once in the process-wide symbol table.
///
/// Two `Symbol`s are equal exactly when their names are textually equal,
/// so comparison is a handle comparison rather than a string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(DefaultSymbol);

impl Symbol {
    /// Intern `name`, returning the existing handle if it was seen before.
    pub fn intern(name: &str) -> Self {
        let mut table = SYMBOLS.write().unwrap_or_else(PoisonError::into_inner);
        Symbol(table.get_or_intern(name))
    }

    /// Run `f` against the symbol's name without allocating.
    pub fn with_name<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&str) -> R,
    {
        let table = SYMBOLS.read().unwrap_or_else(PoisonError::into_inner);
        // Handles are only minted by `intern`, which never removes entries.
        f(table.resolve(self.0).unwrap_or_default())
    }

    pub fn name(&self) -> String {
        self.with_name(str::to_string)
    }

    pub fn is(&self, name: &str) -> bool {
        self.with_name(|s| s == name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_name(|s| f.write_str(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_symbol() {
        assert_eq!(Symbol::intern("lambda"), Symbol::intern("lambda"));
    }

    #[test]
    fn test_different_names_differ() {
        assert_ne!(Symbol::intern("car"), Symbol::intern("cdr"));
    }

    #[test]
    fn test_name_round_trips() {
        let sym = Symbol::intern("make-adder");
        assert_eq!(sym.name(), "make-adder");
        assert!(sym.is("make-adder"));
        assert!(!sym.is("make"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Symbol::intern("zero?").to_string(), "zero?");
    }
}
