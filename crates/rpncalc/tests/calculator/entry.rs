//! Token-by-token entry.

use rpncalc::{LastOp, Value};

use crate::{assert_top_close, bare_engine, enter_all, ints, submit_all, top};

#[test]
fn keystrokes_build_a_number() {
    let mut engine = bare_engine();
    submit_all(&mut engine, &["1", "2", ".", "5"]);
    assert_eq!(engine.stack(), vec![Value::str("12.5")]);
    assert_eq!(engine.history_len(), 1);
    submit_all(&mut engine, &["delete", "delete"]);
    assert_eq!(engine.stack(), vec![Value::str("12")]);
    engine.submit("enter");
    assert_eq!(engine.stack(), ints(&[12, 12]));
}

#[test]
fn delete_after_enter_drops_the_copy() {
    let mut engine = bare_engine();
    enter_all(&mut engine, &["7"]);
    engine.submit("delete");
    assert_eq!(engine.stack(), ints(&[7]));
}

#[test]
fn delete_on_a_number_is_an_error() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(7));
    engine.submit("delete");
    assert_eq!(engine.stack(), ints(&[7]));
    assert!(engine.message().is_some_and(|m| m.starts_with("Error:")));
}

#[test]
fn open_call_swallows_operators() {
    let mut engine = bare_engine();
    submit_all(&mut engine, &["max(", "3", ",", "2", "+", "1)"]);
    assert_eq!(engine.stack(), vec![Value::str("max(3,2+1)")]);
    engine.submit("enter");
    assert_eq!(engine.stack(), ints(&[3]));
}

#[test]
fn button_names_inside_brackets_are_text() {
    let mut engine = bare_engine();
    submit_all(&mut engine, &["(", "pi", ")"]);
    assert_eq!(engine.stack(), vec![Value::str("(pi)")]);
    engine.submit("enter");
    assert_top_close(&engine, std::f64::consts::PI);
}

#[test]
fn e_reads_as_eulers_number() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(2));
    enter_all(&mut engine, &["e"]);
    assert_top_close(&engine, std::f64::consts::E);
    assert_eq!(engine.depth(), 2);
}

#[test]
fn typing_over_an_assignment_replaces_it() {
    let mut engine = bare_engine();
    enter_all(&mut engine, &["word = hello"]);
    assert_eq!(engine.stack(), vec![Value::str("hello")]);
    engine.submit("world");
    assert_eq!(engine.stack(), vec![Value::str("world")]);
    assert_eq!(engine.last_operation(), Some(LastOp::UserEntry));
}

#[test]
fn typing_over_a_result_starts_a_new_cell() {
    let mut engine = bare_engine();
    enter_all(&mut engine, &["2**10"]);
    assert_eq!(top(&engine), Value::Int(1024));
    engine.submit("5");
    assert_eq!(engine.stack(), vec![Value::str("5"), Value::Int(1024)]);
}
