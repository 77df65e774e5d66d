//! Builtin operations
//!
//! Every builtin is registered into the root environment from the
//! [`BUILTINS`] table. Builtins own their argument list; a returned
//! `Err(message)` reaches the language as `Error(message)`.

use std::io::{self, Write};

use qlisp::{BuiltinFn, Environment, InternedSymbol, Value};

use crate::interpreter::eval;

/// Name to operation table, resolved once at registration
pub const BUILTINS: &[(&str, BuiltinFn)] = &[
    // Lists and quoting
    ("list", list),
    ("head", head),
    ("tail", tail),
    ("eval", eval_qexpr),
    ("join", join),
    // Arithmetic
    ("+", add),
    ("-", sub),
    ("*", mul),
    ("/", div),
    // Binding
    ("def", def),
    ("=", local_def),
    ("\\", lambda),
    // Comparison and control
    ("==", equal),
    ("!=", not_equal),
    (">", greater),
    (">=", greater_or_equal),
    ("<", less),
    ("<=", less_or_equal),
    ("if", if_),
    // Misc
    ("print", print),
    ("error", error),
];

/// Bind every builtin into `env`
pub fn register_stdlib(env: &Environment) {
    for &(name, func) in BUILTINS {
        env.put(InternedSymbol::new(name), Value::builtin(name, func));
    }
}

// ============================================================================
// Argument Checks
// ============================================================================

/// Split `args` into exactly `N` values, or fail with a count error
fn take_args<const N: usize>(name: &str, args: Vec<Value>) -> Result<[Value; N], String> {
    args.try_into().map_err(|args: Vec<Value>| {
        format!(
            "Function '{name}' passed incorrect number of arguments: got {}, expected {N}",
            args.len()
        )
    })
}

fn type_error(name: &str, index: usize, got: &Value, expected: &str) -> String {
    format!(
        "Function '{name}' passed incorrect type for argument {index}: got {}, expected {expected}",
        got.type_name()
    )
}

fn into_qexpr(name: &str, index: usize, value: Value) -> Result<Vec<Value>, String> {
    match value {
        Value::QExpr(items) => Ok(items),
        other => Err(type_error(name, index, &other, "Q-Expression")),
    }
}

fn as_integer(name: &str, index: usize, value: &Value) -> Result<i64, String> {
    match value {
        Value::Integer(n) => Ok(*n),
        other => Err(type_error(name, index, other, "Integer")),
    }
}

/// The single argument of a one-argument builtin taking a non-empty list
fn non_empty_list(name: &str, args: Vec<Value>) -> Result<Vec<Value>, String> {
    let [list] = take_args(name, args)?;
    let items = into_qexpr(name, 0, list)?;
    if items.is_empty() {
        return Err(format!("Function '{name}' passed {{}}"));
    }
    Ok(items)
}

// ============================================================================
// Lists and Quoting
// ============================================================================

fn list(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    Ok(Value::QExpr(args))
}

fn head(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    let mut items = non_empty_list("head", args)?;
    items.truncate(1);
    Ok(Value::QExpr(items))
}

fn tail(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    let mut items = non_empty_list("tail", args)?;
    items.remove(0);
    Ok(Value::QExpr(items))
}

fn eval_qexpr(env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    let [expr] = take_args("eval", args)?;
    let items = into_qexpr("eval", 0, expr)?;
    Ok(eval(env, Value::SExpr(items)))
}

fn join(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    if let Some((i, bad)) = args
        .iter()
        .enumerate()
        .find(|(_, arg)| !matches!(arg, Value::QExpr(_)))
    {
        return Err(type_error("join", i, bad, "Q-Expression"));
    }
    Ok(args.into_iter().fold(Value::qexpr(), Value::join))
}

// ============================================================================
// Arithmetic
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }

    fn fold(self, acc: i64, n: i64) -> Result<i64, String> {
        match self {
            ArithOp::Add => Ok(acc.wrapping_add(n)),
            ArithOp::Sub => Ok(acc.wrapping_sub(n)),
            ArithOp::Mul => Ok(acc.wrapping_mul(n)),
            ArithOp::Div if n == 0 => Err("Divide by zero".to_string()),
            ArithOp::Div => Ok(acc.wrapping_div(n)),
        }
    }
}

fn arithmetic(op: ArithOp, args: Vec<Value>) -> Result<Value, String> {
    let numbers = args
        .iter()
        .map(|arg| match arg {
            Value::Integer(n) => Ok(*n),
            _ => Err("Cannot operate on non-number".to_string()),
        })
        .collect::<Result<Vec<i64>, String>>()?;

    let Some((&first, rest)) = numbers.split_first() else {
        return Err(format!(
            "Function '{}' passed incorrect number of arguments: got 0, expected at least 1",
            op.symbol()
        ));
    };

    if op == ArithOp::Sub && rest.is_empty() {
        return Ok(Value::Integer(first.wrapping_neg()));
    }

    rest.iter()
        .try_fold(first, |acc, &n| op.fold(acc, n))
        .map(Value::Integer)
}

fn add(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    arithmetic(ArithOp::Add, args)
}

fn sub(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    arithmetic(ArithOp::Sub, args)
}

fn mul(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    arithmetic(ArithOp::Mul, args)
}

fn div(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    arithmetic(ArithOp::Div, args)
}

// ============================================================================
// Binding
// ============================================================================

fn bind(name: &str, env: &Environment, args: Vec<Value>, global: bool) -> Result<Value, String> {
    let mut args = args.into_iter();
    let Some(first) = args.next() else {
        return Err(format!(
            "Function '{name}' passed incorrect number of arguments: got 0, expected at least 1"
        ));
    };

    let symbols = into_qexpr(name, 0, first)?
        .into_iter()
        .map(|item| match item {
            Value::Symbol(sym) => Ok(sym),
            other => Err(format!(
                "Function '{name}' cannot define non-symbol: got {}, expected Symbol",
                other.type_name()
            )),
        })
        .collect::<Result<Vec<InternedSymbol>, String>>()?;

    let values: Vec<Value> = args.collect();
    if symbols.len() != values.len() {
        return Err(format!(
            "Function '{name}' passed incorrect number of values for symbols: got {}, expected {}",
            values.len(),
            symbols.len()
        ));
    }

    for (sym, value) in symbols.into_iter().zip(values) {
        if global {
            env.define_global(sym, value);
        } else {
            env.put(sym, value);
        }
    }
    Ok(Value::sexpr())
}

fn def(env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    bind("def", env, args, true)
}

fn local_def(env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    bind("=", env, args, false)
}

fn lambda(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    let [formals, body] = take_args("\\", args)?;
    let formals = into_qexpr("\\", 0, formals)?;
    let body = into_qexpr("\\", 1, body)?;

    let formals = formals
        .into_iter()
        .map(|formal| match formal {
            Value::Symbol(sym) => Ok(sym),
            other => Err(format!(
                "Cannot define non-symbol: got {}, expected Symbol",
                other.type_name()
            )),
        })
        .collect::<Result<Vec<InternedSymbol>, String>>()?;

    Ok(Value::lambda(formals, body))
}

// ============================================================================
// Comparison and Control
// ============================================================================

fn equality(name: &str, args: Vec<Value>, want_equal: bool) -> Result<Value, String> {
    let [a, b] = take_args(name, args)?;
    Ok(Value::boolean((a == b) == want_equal))
}

fn equal(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    equality("==", args, true)
}

fn not_equal(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    equality("!=", args, false)
}

fn ordering<F>(name: &str, args: Vec<Value>, op: F) -> Result<Value, String>
where
    F: Fn(i64, i64) -> bool,
{
    let [a, b] = take_args(name, args)?;
    let a = as_integer(name, 0, &a)?;
    let b = as_integer(name, 1, &b)?;
    Ok(Value::boolean(op(a, b)))
}

fn greater(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    ordering(">", args, |a, b| a > b)
}

fn greater_or_equal(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    ordering(">=", args, |a, b| a >= b)
}

fn less(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    ordering("<", args, |a, b| a < b)
}

fn less_or_equal(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    ordering("<=", args, |a, b| a <= b)
}

fn if_(env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    let [condition, then_branch, else_branch] = take_args("if", args)?;
    let condition = as_integer("if", 0, &condition)?;
    let then_branch = into_qexpr("if", 1, then_branch)?;
    let else_branch = into_qexpr("if", 2, else_branch)?;

    let chosen = if condition != 0 { then_branch } else { else_branch };
    Ok(eval(env, Value::SExpr(chosen)))
}

// ============================================================================
// Misc
// ============================================================================

/// Usage: (print "total" 3) prints `"total" 3` and a newline, returns ()
fn print(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(handle, " ").map_err(|e| format!("print: I/O error: {e}"))?;
        }
        write!(handle, "{arg}").map_err(|e| format!("print: I/O error: {e}"))?;
    }
    writeln!(handle).map_err(|e| format!("print: I/O error: {e}"))?;

    Ok(Value::sexpr())
}

fn error(_env: &Environment, args: Vec<Value>) -> Result<Value, String> {
    match take_args::<1>("error", args)? {
        [Value::String(message)] => Ok(Value::Error(message)),
        [other] => Err(type_error("error", 0, &other, "String")),
    }
}
