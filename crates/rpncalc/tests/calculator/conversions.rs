//! Moving cells between the stack and list or array cells.

use rpncalc::{Array, Value};

use crate::{bare_engine, engine, enter_all, ints, submit_all, top};

#[test]
fn array_from_typed_entries() {
    let mut engine = engine();
    engine.clear_stack();
    enter_all(&mut engine, &["1", "2"]);
    submit_all(&mut engine, &["3", "stack_to_array"]);
    assert_eq!(engine.stack(), vec![Value::array(Array::Int(vec![1, 2, 3]))]);
    submit_all(&mut engine, &["10", "*", "sum", "enter"]);
    assert_eq!(engine.stack(), ints(&[60]));
}

#[test]
fn list_then_spread() {
    let mut engine = bare_engine();
    for n in [1, 2, 3] {
        engine.submit(Value::Int(n));
    }
    engine.submit("stack_to_list");
    assert_eq!(engine.stack(), vec![Value::list(ints(&[1, 2, 3]))]);
    engine.submit("iterable_to_stack");
    assert_eq!(engine.stack(), ints(&[3, 2, 1]));
}

#[test]
fn list_order_follows_setting() {
    let mut engine = bare_engine();
    engine.set_invert_lists(false);
    for n in [1, 2, 3] {
        engine.submit(Value::Int(n));
    }
    engine.submit("stack_to_list");
    assert_eq!(engine.stack(), vec![Value::list(ints(&[3, 2, 1]))]);
    engine.submit("iterable_to_stack");
    assert_eq!(engine.stack(), ints(&[3, 2, 1]));
}

#[test]
fn spreading_a_number_duplicates_it() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(5));
    engine.submit("iterable_to_stack");
    assert_eq!(engine.stack(), ints(&[5, 5]));
    assert!(engine.message().is_some_and(|m| m.starts_with("Warning:")));
}

#[test]
fn float_entry_makes_a_float_array() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(1));
    engine.submit(Value::Float(2.5));
    engine.submit("stack_to_array");
    assert_eq!(top(&engine), Value::array(Array::Float(vec![1.0, 2.5])));
}

#[test]
fn text_makes_a_text_array() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(1));
    engine.submit("abc");
    engine.submit("stack_to_array");
    assert_eq!(
        top(&engine),
        Value::array(Array::Text(vec!["1".into(), "abc".into()]))
    );
}

#[test]
fn sequences_cannot_become_array_elements() {
    let mut engine = bare_engine();
    let nested = Value::list(ints(&[1]));
    engine.submit(nested.clone());
    engine.submit(Value::Int(2));
    engine.submit("stack_to_array");
    assert_eq!(engine.stack(), vec![Value::Int(2), nested]);
    assert!(engine.message().is_some_and(|m| m.starts_with("Error:")));
}
