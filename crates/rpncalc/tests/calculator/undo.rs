//! Undo history tests.

use rpncalc::{EngineConfig, EngineError, Engine, LastOp, Value};

use crate::{bare_engine, engine, enter_all, ints, top};

#[test]
fn typed_undo_steps_back_through_commits() {
    let mut engine = engine();
    enter_all(&mut engine, &["1", "2", "3", "4", "5"]);
    assert_eq!(engine.stack(), ints(&[5, 5, 4, 3, 2, 1]));
    for _ in 0..6 {
        engine.submit("undo");
        engine.submit("enter");
    }
    assert_eq!(top(&engine), Value::Int(2));
}

#[test]
fn undo_walks_back_to_empty() {
    let mut engine = bare_engine();
    enter_all(&mut engine, &["1", "2", "3"]);
    let mut steps = 0;
    while engine.undo(0).is_ok() {
        steps += 1;
        assert!(steps < 100, "history never ran out");
    }
    assert!(engine.stack().is_empty());
    assert_eq!(engine.message(), Some("Error: no history to undo"));
}

#[test]
fn undo_without_history() {
    let mut engine = bare_engine();
    assert!(matches!(engine.undo(0), Err(EngineError::NoHistory)));
    assert!(engine.stack().is_empty());
}

#[test]
fn undo_restores_after_arithmetic() {
    let mut engine = bare_engine();
    engine.submit(Value::Int(6));
    engine.submit(Value::Int(7));
    engine.submit("*");
    assert_eq!(engine.stack(), ints(&[42]));
    engine.undo(0).unwrap();
    assert_eq!(engine.stack(), ints(&[7, 6]));
}

#[test]
fn discard_count_is_configurable() {
    let config = EngineConfig {
        undo_discard: 0,
        ..EngineConfig::bare()
    };
    let mut engine = Engine::with_config(config);
    enter_all(&mut engine, &["1"]);
    assert_eq!(engine.stack(), ints(&[1, 1]));
    engine.submit("undo");
    assert_eq!(engine.stack(), ints(&[1]));
    assert_eq!(engine.last_operation(), Some(LastOp::Enter));
}

#[test]
fn history_is_bounded() {
    let config = EngineConfig {
        history_capacity: 3,
        ..EngineConfig::bare()
    };
    let mut engine = Engine::with_config(config);
    enter_all(&mut engine, &["1", "2", "3", "4"]);
    assert_eq!(engine.history_len(), 3);
}

#[test]
fn startup_leaves_no_history() {
    let engine = engine();
    assert_eq!(engine.history_len(), 0);
    assert!(engine.stack().is_empty());
    assert_eq!(engine.last_operation(), None);
}
