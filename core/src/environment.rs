//! Environment for variable bindings
//!
//! An Environment is one lexical scope: a table of owned bindings plus a
//! non-owning link to the enclosing scope. Lookups walk outward through the
//! parent links until the name is found or the root is passed.
//!
//! `Environment` itself is a handle. Cloning the handle aliases the same
//! scope (that is how the evaluator passes the current scope around);
//! [`Environment::deep_copy`] produces an independent scope.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::interner::InternedSymbol;
use crate::language::Value;

// ============================================================================
// Environment
// ============================================================================

#[derive(Default)]
struct EnvironmentState {
    bindings: FxHashMap<InternedSymbol, Value>,
    parent: Option<Weak<RefCell<EnvironmentState>>>,
}

impl EnvironmentState {
    fn parent(&self) -> Option<Rc<RefCell<EnvironmentState>>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }
}

#[derive(Clone, Default)]
pub struct Environment {
    state: Rc<RefCell<EnvironmentState>>,
}

impl Environment {
    /// Create an empty scope with no parent
    pub fn new() -> Self {
        Self::default()
    }

    /// Look `name` up in this scope, then in each enclosing scope.
    ///
    /// The caller gets its own copy of the bound value. An unbound name
    /// yields an Error value rather than failing.
    pub fn get(&self, name: InternedSymbol) -> Value {
        let mut scope = Rc::clone(&self.state);
        loop {
            let parent = {
                let state = scope.borrow();
                if let Some(value) = state.bindings.get(&name) {
                    return value.clone();
                }
                state.parent()
            };
            match parent {
                Some(parent) => scope = parent,
                None => return Value::Error(format!("Unbound symbol '{name}'")),
            }
        }
    }

    /// Bind `name` in this scope only, replacing any existing local binding
    pub fn put(&self, name: InternedSymbol, value: Value) {
        self.state.borrow_mut().bindings.insert(name, value);
    }

    /// Bind `name` in the outermost scope reachable from this one
    pub fn define_global(&self, name: InternedSymbol, value: Value) {
        self.root().put(name, value);
    }

    /// The outermost ancestor of this scope (possibly itself)
    pub fn root(&self) -> Environment {
        let mut scope = Rc::clone(&self.state);
        loop {
            let parent = scope.borrow().parent();
            match parent {
                Some(parent) => scope = parent,
                None => return Environment { state: scope },
            }
        }
    }

    /// Independent copy of this scope's bindings, sharing the same parent link
    pub fn deep_copy(&self) -> Environment {
        let state = self.state.borrow();
        Environment {
            state: Rc::new(RefCell::new(EnvironmentState {
                bindings: state.bindings.clone(),
                parent: state.parent.clone(),
            })),
        }
    }

    /// Point this scope's lookup chain at `parent`
    pub fn set_parent(&self, parent: &Environment) {
        self.state.borrow_mut().parent = Some(Rc::downgrade(&parent.state));
    }

    pub fn has_parent(&self) -> bool {
        self.state.borrow().parent().is_some()
    }

    /// True if `name` is bound directly in this scope
    pub fn contains_local(&self, name: InternedSymbol) -> bool {
        self.state.borrow().bindings.contains_key(&name)
    }

    /// Number of bindings held directly in this scope
    pub fn len(&self) -> usize {
        self.state.borrow().bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if both handles refer to the same scope
    pub fn same_scope(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}
