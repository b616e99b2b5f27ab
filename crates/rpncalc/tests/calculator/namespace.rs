//! Variables, user functions and imports.

use std::collections::BTreeMap;

use rpncalc::{Array, LastOp, Value};

use crate::{assert_error, bare_engine, enter_all, ints, top};

#[test]
fn assignment_then_recall() {
    let mut engine = bare_engine();
    enter_all(&mut engine, &["a=5"]);
    assert_eq!(engine.stack(), ints(&[5]));
    assert_eq!(engine.message(), Some("Assignment: a = 5"));
    enter_all(&mut engine, &["a"]);
    assert_eq!(engine.stack(), ints(&[5, 5]));
    assert_eq!(engine.last_operation(), Some(LastOp::Recall));
}

#[test]
fn empty_right_hand_side_takes_y() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(42));
    enter_all(&mut engine, &["b="]);
    assert_eq!(engine.stack(), ints(&[42]));
    assert_eq!(engine.export_locals().get("b"), Some(&Value::Int(42)));
}

#[test]
fn text_values_are_kept_as_text() {
    let mut engine = bare_engine();
    enter_all(&mut engine, &["greeting = hello"]);
    assert_eq!(engine.export_locals().get("greeting"), Some(&Value::str("hello")));
}

#[test]
fn names_the_evaluator_cannot_read_are_not_assigned() {
    let mut engine = bare_engine();
    enter_all(&mut engine, &["π=3"]);
    assert_eq!(engine.stack(), vec![Value::str("π=3")]);
    assert!(engine.export_locals().is_empty());
    assert_error(&engine);
}

#[test]
fn builtin_names_cannot_be_assigned() {
    let mut engine = bare_engine();
    enter_all(&mut engine, &["pi=3"]);
    assert_eq!(engine.stack(), vec![Value::str("pi=3")]);
    assert_eq!(engine.last_operation(), Some(LastOp::Error));
    assert_error(&engine);
    assert!(engine.export_locals().is_empty());
}

#[test]
fn deleting_variables() {
    let mut engine = bare_engine();
    enter_all(&mut engine, &["a=5", "b=6", "c=7"]);
    assert_eq!(engine.delete_local("a").unwrap(), Value::Int(5));
    assert!(engine.delete_local("a").is_err());
    assert!(engine.delete_local("sqrt").is_err());
    assert_eq!(engine.clear_all_variables(), vec!["b".to_string(), "c".to_string()]);
    assert!(engine.export_locals().is_empty());
}

#[test]
fn loading_skips_reserved_names() {
    let mut engine = bare_engine();
    let mut locals = BTreeMap::new();
    locals.insert("rate".to_string(), Value::Float(0.07));
    locals.insert("sqrt".to_string(), Value::Int(2));
    engine.load_locals(locals, true);
    assert!(engine.message().is_some_and(|m| m.starts_with("Warning:")));
    let exported = engine.export_locals();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported.get("rate"), Some(&Value::Float(0.07)));
}

#[test]
fn defining_and_removing_functions() {
    let mut engine = bare_engine();
    let name = engine.define_function("def double(x): return 2 * x").unwrap();
    assert_eq!(name, "double");
    assert!(engine.user_functions().contains_key("double"));

    enter_all(&mut engine, &["double(4)"]);
    assert_eq!(top(&engine), Value::Int(8));

    assert_eq!(engine.remove_user_function(Some("double")), vec!["double".to_string()]);
    assert!(engine.user_functions().is_empty());
    assert!(engine.remove_user_function(Some("double")).is_empty());
}

#[test]
fn invalid_definitions_are_rejected() {
    let mut engine = bare_engine();
    assert!(engine.define_function("double = 3").is_err());
    assert_error(&engine);
    assert!(engine.define_function("def broken(x) return x").is_err());
    assert!(engine.user_functions().is_empty());
}

#[test]
fn variable_replaces_function() {
    let mut engine = bare_engine();
    engine.define_function("def double(x): return 2 * x").unwrap();
    enter_all(&mut engine, &["double=3"]);
    assert!(engine.user_functions().is_empty());
    assert_eq!(engine.export_locals().get("double"), Some(&Value::Int(3)));
}

#[test]
fn imported_symbol_is_callable_by_name() {
    let mut engine = bare_engine();
    enter_all(&mut engine, &["from numpy import cumsum"]);
    assert_eq!(engine.message(), Some("Imported 'cumsum'"));
    assert_eq!(engine.last_operation(), Some(LastOp::Exec));
    assert!(engine.stack().is_empty());

    engine.submit(Value::list(ints(&[1, 2, 3])));
    enter_all(&mut engine, &["cumsum"]);
    assert_eq!(top(&engine), Value::array(Array::Int(vec![1, 3, 6])));

    enter_all(&mut engine, &["cumsum=1"]);
    assert_error(&engine);
}

#[test]
fn aliased_library_members_resolve() {
    let mut engine = bare_engine();
    enter_all(&mut engine, &["import random as rnd"]);
    assert_eq!(engine.namespace().libraries()[0].name, "rnd");

    engine.submit(Value::Int(5));
    engine.submit(Value::Int(5));
    enter_all(&mut engine, &["randint"]);
    assert_eq!(engine.stack(), ints(&[5]));
    assert_eq!(engine.last_operation(), Some(LastOp::Function));
}

#[test]
fn importing_a_bound_name_does_nothing() {
    let mut engine = bare_engine();
    enter_all(&mut engine, &["from math import gcd"]);
    assert!(engine.message().is_some_and(|m| m.starts_with("Warning:")));
    assert!(engine.stack().is_empty());
}

#[test]
fn unknown_module_is_an_error() {
    let mut engine = bare_engine();
    enter_all(&mut engine, &["import nosuchmodule"]);
    assert_eq!(engine.stack(), vec![Value::str("import nosuchmodule")]);
    assert_error(&engine);
}
