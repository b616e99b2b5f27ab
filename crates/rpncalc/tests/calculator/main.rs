//! End-to-end calculator tests.
//!
//! These tests drive the engine the way a front-end does: every token goes
//! through `submit`, including `enter`. Tests are organized into modules
//! by functionality.

use rpncalc::{Engine, EngineConfig, Value};

/// Create an engine with the default startup imports.
pub fn engine() -> Engine {
    Engine::new()
}

/// Create an engine with no startup statements.
pub fn bare_engine() -> Engine {
    Engine::with_config(EngineConfig::bare())
}

// Test modules
mod arithmetic;
mod conversions;
mod enter;
mod entry;
mod namespace;
mod persistence;
mod undo;

// ============================================================================
// Test Helpers
// ============================================================================

/// Submit each token followed by `enter`.
pub fn enter_all(engine: &mut Engine, tokens: &[&str]) {
    for token in tokens {
        engine.submit(*token);
        engine.submit("enter");
    }
}

/// Submit each token without committing.
pub fn submit_all(engine: &mut Engine, tokens: &[&str]) {
    for token in tokens {
        engine.submit(*token);
    }
}

/// The X cell, failing with the status message if the stack is empty.
pub fn top(engine: &Engine) -> Value {
    engine
        .read(0)
        .unwrap_or_else(|| panic!("stack is empty; message: {:?}", engine.message()))
}

/// X as a float, failing if it is not a number.
pub fn top_f64(engine: &Engine) -> f64 {
    let x = top(engine);
    match x {
        Value::Float(f) => f,
        Value::Int(n) => n as f64,
        other => panic!("expected a number in X, got {:?}", other),
    }
}

/// Check X against a float with relative tolerance.
pub fn assert_top_close(engine: &Engine, expected: f64) {
    let actual = top_f64(engine);
    let tolerance = 1e-9 * expected.abs().max(1e-300);
    assert!(
        (actual - expected).abs() <= tolerance,
        "X = {}, expected {} (message: {:?})",
        actual,
        expected,
        engine.message()
    );
}

/// Assert the status message reports an error.
pub fn assert_error(engine: &Engine) {
    let message = engine.message().unwrap_or("");
    assert!(message.starts_with("Error:"), "expected an error, got {:?}", message);
}

pub fn ints(xs: &[i64]) -> Vec<Value> {
    xs.iter().map(|n| Value::Int(*n)).collect()
}
