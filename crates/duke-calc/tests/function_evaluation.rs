//! Tests for the public function evaluation entry point

use duke_calc::prelude::*;
use duke_calc::{mathx, registry};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn eval(name: &str, operands: &[Value]) -> Value {
    evaluate(name, operands, &EvaluationContext::simple()).unwrap()
}

fn num(n: f64) -> Value {
    Value::Number(n)
}

fn column(values: Vec<Value>) -> Value {
    Value::Range(Area::column(0, 5, values).unwrap())
}

fn numbers(values: &[f64]) -> Value {
    column(values.iter().map(|v| num(*v)).collect())
}

/// AVERAGE over nothing numeric is a division by zero
#[test]
fn test_average_of_nothing() {
    assert_eq!(
        eval("AVERAGE", &[column(vec![Value::Blank, Value::text("x")])]),
        Value::Error(ErrorCode::DivideByZero)
    );
}

#[test]
fn test_mid_window_past_end() {
    assert_eq!(eval("MID", &[Value::text("hello"), num(1.0), num(10.0)]), Value::text("hello"));
    assert_eq!(eval("MID", &[Value::text("hello"), num(10.0), num(1.0)]), Value::text(""));
    assert_eq!(
        eval("MID", &[Value::text("hello"), num(1.0), num(-1.0)]),
        Value::Error(ErrorCode::InvalidValue)
    );
}

#[test]
fn test_fact_domain() {
    assert!(eval("FACT", &[num(-1.0)]).is_error());
    assert_eq!(eval("FACT", &[num(0.0)]), num(1.0));
    assert_eq!(eval("FACT", &[num(5.0)]), num(120.0));
}

#[test]
fn test_large_with_duplicates() {
    assert_eq!(eval("LARGE", &[numbers(&[1.0, 2.0, 3.0, 3.0, 4.0]), num(2.0)]), num(3.0));
    assert_eq!(eval("SMALL", &[numbers(&[1.0, 2.0, 3.0, 3.0, 4.0]), num(5.0)]), num(4.0));
    assert_eq!(
        eval("LARGE", &[numbers(&[1.0, 2.0]), num(3.0)]),
        Value::Error(ErrorCode::NumericError)
    );
}

#[test]
fn test_round_half_away_from_zero() {
    assert_eq!(eval("ROUND", &[num(2.5), num(0.0)]), num(3.0));
    assert_eq!(eval("ROUND", &[num(-2.5), num(0.0)]), num(-3.0));
    assert_eq!(eval("ROUND", &[num(1234.5678), num(-2.0)]), num(1200.0));
    assert_eq!(eval("ROUNDUP", &[num(-3.14159), num(1.0)]), num(-3.2));
}

#[test]
fn test_countif_ordering_ignores_other_types() {
    let range = column(vec![
        num(1.0),
        num(2.0),
        Value::text("apple"),
        Value::Boolean(true),
        Value::text(""),
    ]);
    assert_eq!(eval("COUNTIF", &[range, Value::text(">1")]), num(1.0));
}

#[test]
fn test_vlookup_exact() {
    let table = Value::Range(
        Area::new(
            0,
            0,
            vec![
                vec![num(1.0), Value::text("a")],
                vec![num(2.0), Value::text("b")],
                vec![num(3.0), Value::text("c")],
            ],
        )
        .unwrap(),
    );
    assert_eq!(
        eval("VLOOKUP", &[num(3.0), table, num(2.0), Value::Boolean(false)]),
        Value::text("c")
    );
}

#[test]
fn test_substitute_single_instance() {
    assert_eq!(
        eval("SUBSTITUTE", &[Value::text("ababab"), Value::text("ab"), Value::text("X"), num(2.0)]),
        Value::text("abXab")
    );
}

#[test]
fn test_date_keeps_phantom_leap_day() {
    assert_eq!(eval("DATE", &[num(1900.0), num(2.0), num(29.0)]), num(60.0));
    assert_eq!(eval("DATE", &[num(1900.0), num(3.0), num(1.0)]), num(61.0));
}

#[test]
fn test_match_descending() {
    assert_eq!(
        eval("MATCH", &[num(5.0), numbers(&[10.0, 8.0, 6.0, 4.0, 2.0]), num(-1.0)]),
        num(3.0)
    );
}

#[test]
fn test_match_and_vlookup_agree_on_sorted_input() {
    let keys = [1.0, 2.0, 2.0, 4.0, 7.0];
    let table = Value::Range(
        Area::new(
            0,
            0,
            keys.iter()
                .enumerate()
                .map(|(i, k)| vec![num(*k), num(i as f64)])
                .collect(),
        )
        .unwrap(),
    );
    for x in [1.0, 2.0, 4.0, 7.0] {
        let position = eval("MATCH", &[num(x), numbers(&keys), num(1.0)]);
        let row = eval("VLOOKUP", &[num(x), table.clone(), num(2.0)]);
        match (position, row) {
            (Value::Number(p), Value::Number(r)) => assert_eq!(p - 1.0, r, "lookup of {}", x),
            other => panic!("unexpected results for {}: {:?}", x, other),
        }
    }
    // duplicates resolve to the last occurrence
    assert_eq!(eval("MATCH", &[num(2.0), numbers(&keys)]), num(3.0));
}

#[test]
fn test_not_implemented_is_a_hard_stop() {
    let ctx = EvaluationContext::simple();
    assert_eq!(
        evaluate("OFFSET", &[num(1.0)], &ctx),
        Err(FunctionError::NotImplemented("OFFSET".into()))
    );
    assert!(registry().contains("OFFSET"));
}

#[test]
fn test_iserror_detects_self_reference() {
    let range = Value::Range(Area::column(0, 0, vec![num(1.0); 5]).unwrap());
    assert_eq!(
        evaluate_at("ISERROR", &[range], (2, 0)),
        Ok(Value::Error(ErrorCode::CircularReference))
    );
}

#[test]
fn test_1904_date_system() {
    let settings = EngineSettings {
        date_1904: true,
        ..EngineSettings::default()
    };
    let ctx = EvaluationContext::new(0, 0, &settings);
    assert_eq!(
        evaluate("DATE", &[num(1904.0), num(1.0), num(2.0)], &ctx),
        Ok(num(1.0))
    );
}

#[test]
fn test_criteria_predicate_is_reusable() {
    let ctx = EvaluationContext::simple();
    let a = duke_calc::build_predicate(&Value::text("b*"), &ctx).unwrap();
    let b = duke_calc::build_predicate(&Value::text("b*"), &ctx).unwrap();
    for target in [Value::text("banana"), Value::text("apple"), num(1.0), Value::Blank] {
        assert_eq!(a.matches(&target), b.matches(&target));
    }
}

proptest! {
    #[test]
    fn kth_largest_mirrors_kth_smallest(
        values in prop::collection::vec(-1e6f64..1e6, 1..40),
        k in 1usize..40,
    ) {
        let k = (k - 1) % values.len() + 1;
        let largest = mathx::kth_largest(&values, k);
        let smallest = mathx::kth_smallest(&values, values.len() + 1 - k);
        prop_assert_eq!(largest, smallest);
        prop_assert!(largest.map_or(false, |v| values.contains(&v)));
    }

    #[test]
    fn sum_ignores_operand_order(values in prop::collection::vec(-1e3f64..1e3, 0..20)) {
        let forward: Vec<Value> = values.iter().map(|v| Value::Number(*v)).collect();
        let backward: Vec<Value> = forward.iter().rev().cloned().collect();
        let a = evaluate("SUM", &forward, &EvaluationContext::simple()).unwrap();
        let b = evaluate("SUM", &backward, &EvaluationContext::simple()).unwrap();
        match (a, b) {
            (Value::Number(a), Value::Number(b)) => prop_assert!((a - b).abs() < 1e-6),
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }
}
