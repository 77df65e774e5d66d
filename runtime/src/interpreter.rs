use qlisp::{Closure, Environment, Function, InternedSymbol, Value, ensure_sufficient_stack};
use tracing::{debug, trace};

/// Formal parameter that collects all remaining arguments into a Q-Expression
const VARIADIC_MARKER: &str = "&";

// ============================================================================
// Evaluator
// ============================================================================

/// Reduce `value` in `env`.
///
/// Symbols are looked up, S-Expressions are reduced, everything else
/// evaluates to itself. Failures come back as `Value::Error`.
pub fn eval(env: &Environment, value: Value) -> Value {
    ensure_sufficient_stack(|| match value {
        Value::Symbol(name) => env.get(name),
        Value::SExpr(items) => eval_sexpr(env, items),
        other => other,
    })
}

fn eval_sexpr(env: &Environment, items: Vec<Value>) -> Value {
    // Every child is evaluated, left to right, before errors are checked.
    let mut items: Vec<Value> = items.into_iter().map(|item| eval(env, item)).collect();

    if let Some(i) = items.iter().position(Value::is_error) {
        return items.swap_remove(i);
    }

    let head = match items.len() {
        0 => return Value::SExpr(items),
        1 => return items.swap_remove(0),
        _ => items.remove(0),
    };

    match head {
        Value::Function(func) => apply(env, func, items),
        other => Value::Error(format!(
            "S-Expression starts with incorrect type: got {}, expected Function",
            other.type_name()
        )),
    }
}

// ============================================================================
// Function Application
// ============================================================================

/// Apply `func` to `args`, with `env` as the calling environment.
///
/// A closure that receives fewer arguments than it has formals comes back
/// as a new closure waiting for the rest.
pub fn apply(env: &Environment, func: Function, args: Vec<Value>) -> Value {
    match func {
        Function::Builtin(builtin) => {
            trace!(builtin = builtin.name, argc = args.len(), "calling builtin");
            builtin.call(env, args)
        }
        Function::Closure(closure) => call_closure(env, closure, args),
    }
}

fn call_closure(env: &Environment, mut closure: Closure, args: Vec<Value>) -> Value {
    if let Err(message) = bind_formals(&mut closure, args) {
        return Value::Error(message);
    }

    if !closure.formals.is_empty() {
        debug!(remaining = closure.formals.len(), "partial application");
        return Value::Function(Function::Closure(closure));
    }

    // The body sees the caller's scope, not the definition site's.
    closure.env.set_parent(env);
    debug!(body_len = closure.body.len(), "closure complete, evaluating body");
    eval(&closure.env, Value::SExpr(closure.body))
}

/// Bind `args` to the closure's leading formals in its captured environment.
///
/// Consumed formals are removed from the closure. `&` must be followed by
/// exactly one formal, which receives every remaining argument as a
/// Q-Expression, or an empty one when the arguments ran out right at `&`.
fn bind_formals(closure: &mut Closure, args: Vec<Value>) -> Result<(), String> {
    let given = args.len();
    let expected = closure.formals.len();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if closure.formals.is_empty() {
            return Err(format!(
                "Function passed too many arguments: got {given}, expected {expected}"
            ));
        }

        let formal = closure.formals.remove(0);
        if formal.is(VARIADIC_MARKER) {
            let rest = rest_formal(closure)?;
            let collected = std::iter::once(arg).chain(args.by_ref()).collect();
            closure.env.put(rest, Value::QExpr(collected));
            break;
        }

        closure.env.put(formal, arg);
    }

    if closure
        .formals
        .first()
        .is_some_and(|formal| formal.is(VARIADIC_MARKER))
    {
        closure.formals.remove(0);
        let rest = rest_formal(closure)?;
        closure.env.put(rest, Value::qexpr());
    }

    Ok(())
}

/// Pop the formal following `&`, which must be the last one
fn rest_formal(closure: &mut Closure) -> Result<InternedSymbol, String> {
    if closure.formals.len() != 1 {
        return Err("invalid function format".to_string());
    }
    Ok(closure.formals.remove(0))
}
