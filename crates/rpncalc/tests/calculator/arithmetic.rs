//! Arithmetic buttons, math function groups and stack manipulation.

use rpncalc::Value;

use crate::{assert_error, assert_top_close, bare_engine, engine, ints, submit_all, top, top_f64};

#[test]
fn typed_operands() {
    let mut engine = bare_engine();
    submit_all(&mut engine, &["2", "enter", "3", "+"]);
    assert_eq!(engine.stack(), ints(&[5]));
    submit_all(&mut engine, &["4", "*", "6", "-"]);
    assert_eq!(engine.stack(), ints(&[14]));
    submit_all(&mut engine, &["4", "/"]);
    assert_top_close(&engine, 3.5);
}

#[test]
fn operator_on_a_lone_text_cell_composes() {
    let mut engine = bare_engine();
    submit_all(&mut engine, &["3", "+", "4"]);
    assert_eq!(engine.stack(), vec![Value::str("3+4")]);
    engine.submit("enter");
    assert_eq!(engine.stack(), ints(&[7]));
}

#[test]
fn unfinished_expression_keeps_composing() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(1));
    submit_all(&mut engine, &["x", "*"]);
    assert_eq!(engine.stack(), vec![Value::str("x*"), Value::Int(1)]);
}

#[test]
fn division_by_zero_is_infinite() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(1));
    engine.submit(Value::Int(0));
    engine.submit("/");
    assert_eq!(top(&engine), Value::Float(f64::INFINITY));
}

#[test]
fn reciprocal_of_zero_is_an_error() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(0));
    engine.submit("1/x");
    assert_eq!(engine.stack(), ints(&[0]));
    assert_error(&engine);
}

#[test]
fn missing_operand_leaves_the_stack() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(1));
    engine.submit("+");
    assert_eq!(engine.stack(), ints(&[1]));
    assert_error(&engine);
}

#[test]
fn failed_operation_restores_operands() {
    let mut engine = bare_engine();
    let list = Value::list(ints(&[1]));
    engine.submit(list.clone());
    engine.submit(Value::Int(1));
    engine.submit("-");
    assert_eq!(engine.stack(), vec![Value::Int(1), list]);
    assert_error(&engine);
}

#[test]
fn powers_and_exponentials() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(7));
    engine.submit("x^2");
    assert_eq!(top(&engine), Value::Int(49));

    engine.submit(Value::Int(2));
    engine.submit(Value::Int(10));
    engine.submit("x^y");
    assert_eq!(top(&engine), Value::Int(1024));

    engine.submit(Value::Int(1));
    engine.submit("e^x");
    assert_top_close(&engine, std::f64::consts::E);
    engine.submit("ln");
    assert_top_close(&engine, 1.0);
}

#[test]
fn sign_and_reciprocal() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(4));
    engine.submit("+/-");
    assert_eq!(top(&engine), Value::Int(-4));
    engine.submit("1/x");
    assert_top_close(&engine, -0.25);
}

#[test]
fn combinatorics() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(5));
    engine.submit(Value::Int(2));
    engine.submit("ncr");
    assert_eq!(top_f64(&engine), 10.0);

    engine.submit(Value::Int(5));
    engine.submit(Value::Int(2));
    engine.submit("npr");
    assert_eq!(top_f64(&engine), 20.0);

    engine.submit(Value::Int(5));
    engine.submit("!");
    assert_eq!(top_f64(&engine), 120.0);
}

#[test]
fn one_argument_functions_map_over_sequences() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(16));
    engine.submit("sqrt");
    assert_top_close(&engine, 4.0);

    engine.submit(Value::tuple(ints(&[4, 9])));
    engine.submit("sqrt");
    assert_eq!(top(&engine), Value::tuple(vec![Value::Float(2.0), Value::Float(3.0)]));
}

#[test]
fn iterable_functions_take_the_whole_cell() {
    let mut engine = bare_engine();
    engine.submit(Value::list(ints(&[1, 2, 3])));
    engine.submit("fsum");
    assert_top_close(&engine, 6.0);
}

#[test]
fn typed_constants() {
    let mut engine = engine();
    submit_all(&mut engine, &["tau", "enter"]);
    assert_top_close(&engine, 6.28318530);
    submit_all(&mut engine, &["jackpot", "enter"]);
    assert_eq!(top(&engine), Value::Int(777));
}

#[test]
fn stack_manipulation() {
    let mut engine = bare_engine();
    for n in [1, 2, 3] {
        engine.submit(Value::Int(n));
    }
    engine.submit("swap");
    assert_eq!(engine.stack(), ints(&[2, 3, 1]));
    engine.submit("roll_up");
    assert_eq!(engine.stack(), ints(&[1, 2, 3]));
    engine.submit("roll_down");
    assert_eq!(engine.stack(), ints(&[2, 3, 1]));
    engine.submit("dup");
    assert_eq!(engine.stack(), ints(&[2, 2, 3, 1]));
    engine.submit("drop");
    assert_eq!(engine.stack(), ints(&[2, 3, 1]));
}

#[test]
fn clearing_a_level() {
    let mut engine = bare_engine();
    for n in [1, 2, 3] {
        engine.submit(Value::Int(n));
    }
    assert_eq!(engine.clear_level(1).unwrap(), Value::Int(2));
    assert_eq!(engine.stack(), ints(&[3, 1]));
    assert!(engine.clear_level(5).is_err());
    assert_error(&engine);
    engine.clear_stack();
    assert!(engine.stack().is_empty());
}
