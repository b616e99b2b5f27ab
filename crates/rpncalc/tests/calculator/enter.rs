//! Commit protocol tests.

use rpncalc::{LastOp, Value};

use crate::{
    assert_error, assert_top_close, bare_engine, engine, enter_all, ints, submit_all, top,
};

#[test]
fn constant_commits_to_float() {
    let mut engine = engine();
    enter_all(&mut engine, &["pi"]);
    assert_eq!(top(&engine), Value::Float(3.14159265));
    assert_eq!(engine.depth(), 2);
    assert_eq!(engine.last_operation(), Some(LastOp::Enter));
}

#[test]
fn scientific_notation() {
    let mut engine = engine();
    enter_all(&mut engine, &["45.00001e-12"]);
    assert!(matches!(top(&engine), Value::Float(_)));
    assert_top_close(&engine, 45.00001e-12);
}

#[test]
fn integer_entry_stays_integer() {
    let mut engine = engine();
    enter_all(&mut engine, &["123456789"]);
    assert_eq!(top(&engine), Value::Int(123456789));
}

#[test]
fn expression_is_evaluated() {
    let mut engine = engine();
    enter_all(&mut engine, &["(sin(pi/2)**2+4.754/4-9)"]);
    assert_top_close(&engine, -13623.0 / 2000.0);
    assert_eq!(engine.last_operation(), Some(LastOp::Eval));
}

#[test]
fn values_typed_over_a_duplicate_replace_it() {
    let mut engine = engine();
    enter_all(&mut engine, &["pi", "45.00001e-12", "123456789"]);
    assert_eq!(engine.depth(), 4);
    assert_eq!(engine.read(1), Some(Value::Int(123456789)));
    assert!(matches!(engine.read(2), Some(Value::Float(_))));
}

#[test]
fn seeded_random_is_reproducible() {
    let mut engine = engine();
    enter_all(&mut engine, &["import random", "random.seed(4321)", "random.randint(5, 5000000000)"]);
    let first = top(&engine);
    assert!(matches!(first, Value::Int(n) if (5..=5_000_000_000).contains(&n)));
    enter_all(&mut engine, &["random.seed(4321)", "random.randint(5, 5000000000)"]);
    assert_eq!(top(&engine), first);
}

#[test]
fn callable_result_is_applied_to_y() {
    let mut engine = engine();
    enter_all(&mut engine, &["[1, 2, 3]", "sum"]);
    assert_eq!(top(&engine), Value::Int(6));
    enter_all(&mut engine, &["[4, 5]", "len"]);
    assert_eq!(top(&engine), Value::Int(2));
}

#[test]
fn statements_are_executed() {
    let mut engine = engine();
    enter_all(&mut engine, &["counter = 10"]);
    enter_all(&mut engine, &["for i in range(3): counter += i"]);
    assert_eq!(engine.last_operation(), Some(LastOp::Exec));
    enter_all(&mut engine, &["counter"]);
    assert_eq!(top(&engine), Value::Int(13));
}

#[test]
fn failed_evaluation_restores_text() {
    let mut engine = engine();
    enter_all(&mut engine, &["undefined_name + 1"]);
    assert_eq!(top(&engine), Value::str("undefined_name + 1"));
    assert_eq!(engine.last_operation(), Some(LastOp::Error));
    assert_error(&engine);
}

#[test]
fn commit_on_empty_stack_does_nothing() {
    let mut engine = bare_engine();
    engine.commit();
    assert!(engine.stack().is_empty());
    assert_eq!(engine.message(), None);
}

#[test]
fn committing_a_number_duplicates_it() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(7));
    engine.commit();
    assert_eq!(engine.stack(), ints(&[7, 7]));
}

#[test]
fn button_name_typed_as_text_is_pressed_on_commit() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(3));
    engine.submit(Value::Int(4));
    submit_all(&mut engine, &["s", "wap"]);
    assert_eq!(engine.read(0), Some(Value::str("swap")));
    engine.submit("enter");
    assert_eq!(engine.stack(), ints(&[3, 4]));
}

#[test]
fn user_function_pulls_its_arguments() {
    let mut engine = engine();
    engine.define_function("def area(w, h): return w * h").unwrap();
    engine.submit(Value::Int(3));
    engine.submit(Value::Int(4));
    engine.submit("area");
    engine.submit("enter");
    assert_eq!(engine.stack(), ints(&[12]));
    assert_eq!(engine.last_operation(), Some(LastOp::Function));
}

#[test]
fn user_function_with_too_few_operands() {
    let mut engine = engine();
    engine.define_function("def area(w, h): return w * h").unwrap();
    engine.submit(Value::Int(3));
    engine.submit("area");
    engine.submit("enter");
    assert_eq!(engine.stack(), vec![Value::str("area"), Value::Int(3)]);
    assert_error(&engine);
}

#[test]
fn library_functions_resolve_by_name() {
    let mut engine = engine();
    engine.submit(Value::list(vec![Value::Int(2), Value::Int(4)]));
    engine.submit("mean");
    engine.submit("enter");
    assert_eq!(engine.stack(), vec![Value::Float(3.0)]);
}

#[test]
fn failing_library_call_restores_arguments() {
    let mut engine = engine();
    let words = Value::list(vec![Value::str("a"), Value::str("b")]);
    engine.submit(words.clone());
    engine.submit("mean");
    engine.commit();
    assert_eq!(engine.stack(), vec![Value::str("mean"), words]);
    assert_eq!(engine.last_operation(), Some(LastOp::Error));
    assert_error(&engine);
}

#[test]
fn oversized_results_are_reported() {
    for text in ["'ab' * 10**18", "[1, 2] * 4611686018427387904", "np.arange(0, 10**12)"] {
        let mut engine = engine();
        enter_all(&mut engine, &[text]);
        assert_eq!(top(&engine), Value::str(text));
        assert_eq!(engine.last_operation(), Some(LastOp::Error));
        assert_error(&engine);
    }
}

#[test]
fn integer_limit_math_is_reported() {
    let mut engine = engine();
    let text = "math.lcm(-9223372036854775807-1, 1)";
    enter_all(&mut engine, &[text]);
    assert_eq!(top(&engine), Value::str(text));
    assert_error(&engine);
}

#[test]
fn deeply_nested_expression_is_reported() {
    let mut engine = engine();
    let text = format!("{}1{}", "(".repeat(50_000), ")".repeat(50_000));
    enter_all(&mut engine, &[text.as_str()]);
    assert_eq!(top(&engine), Value::str(text.as_str()));
    assert_error(&engine);
}
