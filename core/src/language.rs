use std::fmt;

use crate::environment::Environment;
use crate::interner::InternedSymbol;
use crate::stack::ensure_sufficient_stack;

// ============================================================================
// Core Type System
// ============================================================================

/// Native operation callable from qlisp.
///
/// A builtin owns its argument list. Returning `Err(message)` is the same as
/// returning `Value::Error(message)`; the evaluator converts it at the call
/// boundary so builtins can use `?`.
pub type BuiltinFn = fn(&Environment, Vec<Value>) -> Result<Value, String>;

/// A primitive operation, identified by its function pointer
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl Builtin {
    pub fn call(&self, env: &Environment, args: Vec<Value>) -> Value {
        (self.func)(env, args).unwrap_or_else(Value::Error)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::fn_addr_eq(self.func, other.func)
    }
}

/// A user-defined function.
///
/// `formals` holds the parameters still waiting for an argument; a partially
/// applied closure has already bound the leading ones into `env`.
pub struct Closure {
    pub formals: Vec<InternedSymbol>,
    pub body: Vec<Value>,
    pub env: Environment,
}

impl Closure {
    /// Closure with a fresh, empty captured environment
    pub fn new(formals: Vec<InternedSymbol>, body: Vec<Value>) -> Self {
        Closure {
            formals,
            body,
            env: Environment::new(),
        }
    }
}

// Copying a closure copies its captured bindings; the copy never shares
// scope with the original.
impl Clone for Closure {
    fn clone(&self) -> Self {
        Closure {
            formals: self.formals.clone(),
            body: self.body.clone(),
            env: self.env.deep_copy(),
        }
    }
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

// Captured environments are deliberately not compared.
impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        self.formals == other.formals && self.body == other.body
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Function {
    Builtin(Builtin),
    Closure(Closure),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Error(String),
    Symbol(InternedSymbol),
    String(String),
    /// Expression reduced by the evaluator
    SExpr(Vec<Value>),
    /// Quoted expression, never reduced automatically
    QExpr(Vec<Value>),
    Function(Function),
}

// ============================================================================
// Constructors
// ============================================================================

impl Value {
    pub fn error<S: Into<String>>(message: S) -> Value {
        Value::Error(message.into())
    }

    pub fn symbol(name: &str) -> Value {
        Value::Symbol(InternedSymbol::new(name))
    }

    pub fn string<S: Into<String>>(text: S) -> Value {
        Value::String(text.into())
    }

    pub fn sexpr() -> Value {
        Value::SExpr(Vec::new())
    }

    pub fn qexpr() -> Value {
        Value::QExpr(Vec::new())
    }

    pub fn builtin(name: &'static str, func: BuiltinFn) -> Value {
        Value::Function(Function::Builtin(Builtin { name, func }))
    }

    pub fn lambda(formals: Vec<InternedSymbol>, body: Vec<Value>) -> Value {
        Value::Function(Function::Closure(Closure::new(formals, body)))
    }

    /// Integer encoding of a truth value
    pub fn boolean(b: bool) -> Value {
        Value::Integer(i64::from(b))
    }
}

// ============================================================================
// Inspection
// ============================================================================

impl Value {
    /// User-facing name of this value's type, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Error(_) => "Error",
            Value::Symbol(_) => "Symbol",
            Value::String(_) => "String",
            Value::SExpr(_) => "S-Expression",
            Value::QExpr(_) => "Q-Expression",
            Value::Function(_) => "Function",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Value::SExpr(items) | Value::QExpr(items) => Some(items),
            _ => None,
        }
    }

    fn items_mut(&mut self) -> &mut Vec<Value> {
        match self {
            Value::SExpr(items) | Value::QExpr(items) => items,
            other => panic!("expected an expression container, got {}", other.type_name()),
        }
    }

    /// Number of items in a container; zero for anything else
    pub fn len(&self) -> usize {
        self.items().map_or(0, <[Value]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Container Operations
// ============================================================================

impl Value {
    /// Remove and return the item at `i`, keeping the order of the rest.
    ///
    /// # Panics
    /// If `self` is not a container or `i` is out of range.
    pub fn pop(&mut self, i: usize) -> Value {
        self.items_mut().remove(i)
    }

    /// `pop` the item at `i` and drop the remainder of the container
    ///
    /// # Panics
    /// Same conditions as [`Value::pop`].
    pub fn take(mut self, i: usize) -> Value {
        self.pop(i)
    }

    /// Move every item of `other` onto the end of `self`.
    ///
    /// # Panics
    /// If either side is not a container.
    pub fn join(mut self, mut other: Value) -> Value {
        let tail = std::mem::take(other.items_mut());
        self.items_mut().extend(tail);
        self
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

pub(crate) fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            '\0' => result.push_str("\\0"),
            '\x07' => result.push_str("\\a"),
            '\x08' => result.push_str("\\b"),
            '\x0b' => result.push_str("\\v"),
            '\x0c' => result.push_str("\\f"),
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            c => result.push(c),
        }
    }
    result
}

fn write_expr(f: &mut fmt::Formatter<'_>, items: &[Value], open: char, close: char) -> fmt::Result {
    ensure_sufficient_stack(|| {
        write!(f, "{open} ")?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{item}")?;
        }
        write!(f, " {close}")
    })
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Builtin(_) => write!(f, "<builtin>"),
            Function::Closure(closure) => {
                let formals: Vec<Value> =
                    closure.formals.iter().copied().map(Value::Symbol).collect();
                write!(f, "(\\ ")?;
                write_expr(f, &formals, '{', '}')?;
                write!(f, " ")?;
                write_expr(f, &closure.body, '{', '}')?;
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Error(message) => write!(f, "Error: {message}."),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Value::SExpr(items) => write_expr(f, items, '(', ')'),
            Value::QExpr(items) => write_expr(f, items, '{', '}'),
            Value::Function(func) => write!(f, "{func}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always_zero(_env: &Environment, _args: Vec<Value>) -> Result<Value, String> {
        Ok(Value::Integer(0))
    }

    fn always_one(_env: &Environment, _args: Vec<Value>) -> Result<Value, String> {
        Ok(Value::Integer(1))
    }

    fn qlist(items: &[i64]) -> Value {
        Value::QExpr(items.iter().copied().map(Value::Integer).collect())
    }

    #[test]
    fn pop_preserves_order_of_remainder() {
        let mut list = qlist(&[1, 2, 3, 4]);
        assert_eq!(list.pop(1), Value::Integer(2));
        assert_eq!(list, qlist(&[1, 3, 4]));
    }

    #[test]
    fn take_returns_single_item() {
        assert_eq!(qlist(&[7, 8, 9]).take(2), Value::Integer(9));
    }

    #[test]
    #[should_panic]
    fn pop_out_of_range_panics() {
        qlist(&[1]).pop(3);
    }

    #[test]
    fn join_concatenates_in_order() {
        let joined = qlist(&[1, 2]).join(qlist(&[3, 4]));
        assert_eq!(joined, qlist(&[1, 2, 3, 4]));
    }

    #[test]
    fn join_keeps_container_tag_of_left_side() {
        let joined = Value::sexpr().join(qlist(&[1]));
        assert_eq!(joined, Value::SExpr(vec![Value::Integer(1)]));
    }

    #[test]
    fn copy_is_isolated_from_mutation() {
        let mut original = Value::QExpr(vec![qlist(&[1, 2]), Value::string("x")]);
        let copy = original.clone();
        original.pop(0);
        assert_eq!(copy.len(), 2);
        assert_eq!(copy.items().map(|i| i[0].len()), Some(2));
    }

    #[test]
    fn sexpr_and_qexpr_with_same_items_differ() {
        assert_ne!(Value::SExpr(vec![]), Value::QExpr(vec![]));
    }

    #[test]
    fn builtins_compare_by_identity() {
        let zero = Value::builtin("zero", always_zero);
        let zero_again = Value::builtin("other-name", always_zero);
        let one = Value::builtin("one", always_one);
        assert_eq!(zero, zero_again);
        assert_ne!(zero, one);
    }

    #[test]
    fn closures_compare_formals_and_body() {
        let x = InternedSymbol::new("x");
        let y = InternedSymbol::new("y");
        let id_x = Value::lambda(vec![x], vec![Value::Symbol(x)]);
        let id_x_again = Value::lambda(vec![x], vec![Value::Symbol(x)]);
        let id_y = Value::lambda(vec![y], vec![Value::Symbol(y)]);
        assert_eq!(id_x, id_x_again);
        assert_ne!(id_x, id_y);
    }

    #[test]
    fn closure_equality_ignores_environment() {
        let x = InternedSymbol::new("x");
        let plain = Closure::new(vec![x], vec![Value::Symbol(x)]);
        let bound = plain.clone();
        bound.env.put(InternedSymbol::new("z"), Value::Integer(3));
        assert_eq!(plain, bound);
    }

    #[test]
    fn closure_copy_does_not_share_bindings() {
        let z = InternedSymbol::new("z");
        let original = Closure::new(vec![], vec![]);
        original.env.put(z, Value::Integer(1));
        let copy = original.clone();
        copy.env.put(z, Value::Integer(2));
        assert_eq!(original.env.get(z), Value::Integer(1));
        assert_eq!(copy.env.get(z), Value::Integer(2));
    }

    #[test]
    fn renders_every_variant() {
        assert_eq!(Value::Integer(-12).to_string(), "-12");
        assert_eq!(Value::error("Divide by zero").to_string(), "Error: Divide by zero.");
        assert_eq!(Value::symbol("head").to_string(), "head");
        assert_eq!(Value::string("a\"b\n").to_string(), "\"a\\\"b\\n\"");
        assert_eq!(Value::sexpr().to_string(), "(  )");
        assert_eq!(
            Value::SExpr(vec![Value::symbol("+"), Value::Integer(1)]).to_string(),
            "( + 1 )"
        );
        assert_eq!(qlist(&[1, 2]).to_string(), "{ 1 2 }");
        assert_eq!(Value::builtin("zero", always_zero).to_string(), "<builtin>");
    }

    #[test]
    fn renders_closure_as_lambda_form() {
        let x = InternedSymbol::new("x");
        let closure = Value::lambda(
            vec![x],
            vec![Value::symbol("+"), Value::Symbol(x), Value::Integer(1)],
        );
        assert_eq!(closure.to_string(), "(\\ { x } { + x 1 })");
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::qexpr().type_name(), "Q-Expression");
        assert_eq!(Value::sexpr().type_name(), "S-Expression");
        assert_eq!(Value::lambda(vec![], vec![]).type_name(), "Function");
    }
}
