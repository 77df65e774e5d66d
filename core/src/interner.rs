//! Symbol interning
//!
//! Symbol names are stored once in a process-wide interner and handled as
//! small `Copy` ids afterwards. Environment keys and `Value::Symbol` both use
//! these ids, so symbol comparison is an integer compare.

use once_cell::sync::Lazy;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

static NAMES: Lazy<RwLock<StringInterner<DefaultBackend>>> =
    Lazy::new(|| RwLock::new(StringInterner::default()));

/// A symbol name interned in the global name table
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InternedSymbol(DefaultSymbol);

impl InternedSymbol {
    /// Intern `name`, returning the existing id if it was seen before
    pub fn new(name: &str) -> Self {
        if let Some(id) = NAMES
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return InternedSymbol(id);
        }
        let mut names = NAMES.write().unwrap_or_else(PoisonError::into_inner);
        InternedSymbol(names.get_or_intern(name))
    }

    /// Owned copy of the symbol's name
    pub fn resolve(&self) -> String {
        self.with_str(str::to_owned)
    }

    /// Run `f` against the name without allocating
    pub fn with_str<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&str) -> R,
    {
        let names = NAMES.read().unwrap_or_else(PoisonError::into_inner);
        // Ids are only minted by `new`, so resolution cannot miss.
        f(names.resolve(self.0).unwrap_or_default())
    }

    /// True if this symbol is spelled `name`
    pub fn is(&self, name: &str) -> bool {
        self.with_str(|s| s == name)
    }
}

impl From<&str> for InternedSymbol {
    fn from(name: &str) -> Self {
        InternedSymbol::new(name)
    }
}

impl fmt::Display for InternedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|s| f.write_str(s))
    }
}

impl fmt::Debug for InternedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|s| write!(f, "'{s}"))
    }
}
