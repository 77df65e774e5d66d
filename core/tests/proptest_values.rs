use proptest::prelude::*;
use qlisp::{Environment, InternedSymbol, Value};

// ============================================================================
// Strategies for Generating Values
// ============================================================================

fn leaf_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Integer),
        "[a-z ]{0,8}".prop_map(Value::Error),
        "[a-z+*/-]{1,6}".prop_map(|s| Value::symbol(&s)),
        ".{0,8}".prop_map(Value::String),
    ]
}

/// Arbitrary value trees, closures included
fn any_value() -> impl Strategy<Value = Value> {
    leaf_value().prop_recursive(4, 32, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::SExpr),
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::QExpr),
            (
                prop::collection::vec("[a-z]{1,4}", 0..3),
                prop::collection::vec(inner, 0..3)
            )
                .prop_map(|(formals, body)| {
                    Value::lambda(
                        formals.iter().map(|f| InternedSymbol::new(f)).collect(),
                        body,
                    )
                }),
        ]
    })
}

fn any_container() -> impl Strategy<Value = Value> {
    prop::collection::vec(any_value(), 1..6).prop_map(Value::QExpr)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn copy_equals_original(v in any_value()) {
        prop_assert_eq!(v.clone(), v);
    }

    #[test]
    fn copy_survives_pop_on_original(v in any_container()) {
        let snapshot = v.to_string();
        let copy = v.clone();
        let mut original = v;
        original.pop(0);
        prop_assert_eq!(copy.to_string(), snapshot);
        prop_assert_eq!(copy.len(), original.len() + 1);
    }

    #[test]
    fn copy_survives_join_on_original(v in any_container(), extra in any_container()) {
        let copy = v.clone();
        let extra_len = extra.len();
        let joined = v.join(extra);
        prop_assert_eq!(joined.len(), copy.len() + extra_len);
        prop_assert_eq!(joined.items().map(|i| &i[..copy.len()]), copy.items());
    }

    #[test]
    fn environment_copy_is_isolated(v in any_value(), w in any_value()) {
        let name = InternedSymbol::new("slot");
        let env = Environment::new();
        env.put(name, v.clone());
        let copy = env.deep_copy();
        copy.put(name, w);
        prop_assert_eq!(env.get(name), v);
    }

    #[test]
    fn join_concatenates(a in any_value(), b in any_value(), c in any_value(), d in any_value()) {
        let left = Value::QExpr(vec![a.clone(), b.clone()]);
        let right = Value::QExpr(vec![c.clone(), d.clone()]);
        prop_assert_eq!(left.join(right), Value::QExpr(vec![a, b, c, d]));
    }

    #[test]
    fn equality_is_symmetric(a in any_value(), b in any_value()) {
        prop_assert_eq!(a == b, b == a);
    }

    #[test]
    fn pop_then_take_preserves_order(items in prop::collection::vec(any::<i64>(), 2..8)) {
        let mut list = Value::QExpr(items.iter().copied().map(Value::Integer).collect());
        let first = list.pop(0);
        let last_index = list.len() - 1;
        let last = list.take(last_index);
        prop_assert_eq!(first, Value::Integer(items[0]));
        prop_assert_eq!(last, Value::Integer(items[items.len() - 1]));
    }
}
