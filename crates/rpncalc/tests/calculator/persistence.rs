//! Saving a session and picking it back up.

use rpncalc::{Array, SavedState, SavedValue, Value};

use crate::{assert_error, bare_engine, enter_all, ints, top};

fn saved_session() -> SavedState {
    let mut engine = bare_engine();
    enter_all(&mut engine, &["rate=0.5"]);
    engine.define_function("def half(x): return x * rate").unwrap();
    engine.submit(Value::array(Array::Int(vec![1, 2])));
    engine.submit("unfinished(");
    engine.set_invert_lists(false);
    engine.save_state()
}

#[test]
fn state_survives_json() {
    let state = saved_session();
    let json = serde_json::to_string_pretty(&state).unwrap();
    let loaded: SavedState = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded, state);

    let mut engine = bare_engine();
    engine.restore_state(loaded).unwrap();
    assert_eq!(
        engine.stack(),
        vec![
            Value::str("unfinished("),
            Value::array(Array::Int(vec![1, 2])),
            Value::Float(0.5),
        ]
    );
    assert_eq!(engine.export_locals().get("rate"), Some(&Value::Float(0.5)));
    assert!(engine.user_functions().contains_key("half"));
    assert!(!engine.invert_lists());
}

#[test]
fn infinite_and_nan_cells_survive_json() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(1));
    engine.submit(Value::Int(0));
    engine.submit("/");
    engine.submit(Value::array(Array::Float(vec![f64::NEG_INFINITY, 2.0])));
    engine.submit(Value::Float(f64::NAN));
    let json = serde_json::to_string(&engine.save_state()).unwrap();

    let mut restored = bare_engine();
    restored.restore_state(serde_json::from_str(&json).unwrap()).unwrap();
    let stack = restored.stack();
    assert!(matches!(stack[0], Value::Float(f) if f.is_nan()));
    assert_eq!(stack[1], Value::array(Array::Float(vec![f64::NEG_INFINITY, 2.0])));
    assert_eq!(stack[2], Value::Float(f64::INFINITY));
}

#[test]
fn restored_functions_are_callable() {
    let mut engine = bare_engine();
    engine.restore_state(saved_session()).unwrap();
    engine.clear_stack();
    engine.submit(Value::Int(8));
    enter_all(&mut engine, &["half"]);
    assert_eq!(top(&engine), Value::Float(4.0));
}

#[test]
fn restore_replaces_the_session() {
    let mut engine = bare_engine();
    enter_all(&mut engine, &["old=1"]);
    engine.define_function("def gone(x): return x").unwrap();
    engine.restore_state(SavedState::default()).unwrap();
    assert!(engine.stack().is_empty());
    assert!(engine.export_locals().is_empty());
    assert!(engine.user_functions().is_empty());
}

#[test]
fn restore_can_be_undone() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(1));
    engine.restore_state(SavedState::default()).unwrap();
    engine.undo(0).unwrap();
    assert_eq!(engine.stack(), ints(&[1]));
}

#[test]
fn broken_function_source_is_reported() {
    let mut state = SavedState::default();
    state.stack.push(SavedValue::Int(3));
    state.functions.insert("bad".to_string(), "def bad(x) x".to_string());
    let mut engine = bare_engine();
    assert!(engine.restore_state(state).is_err());
    assert_error(&engine);
    assert_eq!(engine.stack(), ints(&[3]));
}

#[test]
fn missing_fields_take_defaults() {
    let state: SavedState = serde_json::from_str(r#"{"stack":[{"type":"int","value":2}]}"#).unwrap();
    assert_eq!(state.stack, vec![SavedValue::Int(2)]);
    assert!(state.locals.is_empty());
    assert!(!state.invert_lists);
}
