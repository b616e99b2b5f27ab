//! Saving and restoring the engine's stack, variables and functions.
//!
//! [`SavedValue`] is a plain serde tree, so a [`SavedState`] can be written
//! with any serde format. Cells with no plain form (functions, modules,
//! plots) are skipped with a warning. Non-finite floats are written as the
//! strings `"inf"`, `"-inf"` and `"nan"` so formats without them (JSON) can
//! still read them back.

use std::collections::BTreeMap;

use rpncalc_script::{Array, Value};
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::EngineError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SavedValue {
    None,
    Bool(bool),
    Int(i64),
    Float(#[serde(with = "float_repr")] f64),
    Text(String),
    List(Vec<SavedValue>),
    Tuple(Vec<SavedValue>),
    Set(Vec<SavedValue>),
    Dict(Vec<(SavedValue, SavedValue)>),
    Array(SavedArray),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dtype", content = "data", rename_all = "snake_case")]
pub enum SavedArray {
    Int(Vec<i64>),
    Float(#[serde(with = "float_repr::many")] Vec<f64>),
    Text(Vec<String>),
}

mod float_repr {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Special(String),
    }

    impl From<f64> for Repr {
        fn from(f: f64) -> Self {
            match f {
                f if f.is_finite() => Repr::Number(f),
                f if f.is_nan() => Repr::Special("nan".into()),
                f if f > 0.0 => Repr::Special("inf".into()),
                _ => Repr::Special("-inf".into()),
            }
        }
    }

    impl Repr {
        fn into_f64<E: Error>(self) -> Result<f64, E> {
            match self {
                Repr::Number(f) => Ok(f),
                Repr::Special(s) => match s.as_str() {
                    "inf" => Ok(f64::INFINITY),
                    "-inf" => Ok(f64::NEG_INFINITY),
                    "nan" => Ok(f64::NAN),
                    other => Err(E::custom(format!("invalid float '{}'", other))),
                },
            }
        }
    }

    pub fn serialize<S: Serializer>(f: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        Repr::from(*f).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Repr::deserialize(deserializer)?.into_f64()
    }

    pub mod many {
        use super::*;

        pub fn serialize<S: Serializer>(v: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
            v.iter().map(|f| Repr::from(*f)).collect::<Vec<_>>().serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
            Vec::<Repr>::deserialize(deserializer)?
                .into_iter()
                .map(Repr::into_f64)
                .collect()
        }
    }
}

impl SavedValue {
    /// The plain form of a value, if it has one.
    pub fn from_value(value: &Value) -> Option<SavedValue> {
        Some(match value {
            Value::None => SavedValue::None,
            Value::Bool(b) => SavedValue::Bool(*b),
            Value::Int(n) => SavedValue::Int(*n),
            Value::Float(f) => SavedValue::Float(*f),
            Value::Str(s) => SavedValue::Text(s.to_string()),
            Value::List(items) => SavedValue::List(save_all(items)?),
            Value::Tuple(items) => SavedValue::Tuple(save_all(items)?),
            Value::Set(items) => SavedValue::Set(save_all(items)?),
            Value::Dict(entries) => SavedValue::Dict(
                entries
                    .iter()
                    .map(|(k, v)| Some((SavedValue::from_value(k)?, SavedValue::from_value(v)?)))
                    .collect::<Option<Vec<_>>>()?,
            ),
            Value::Array(a) => SavedValue::Array(match &**a {
                Array::Int(v) => SavedArray::Int(v.clone()),
                Array::Float(v) => SavedArray::Float(v.clone()),
                Array::Text(v) => SavedArray::Text(v.clone()),
            }),
            Value::Function(_) | Value::Module(_) | Value::Plot(_) => return None,
        })
    }

    pub fn to_value(&self) -> Value {
        match self {
            SavedValue::None => Value::None,
            SavedValue::Bool(b) => Value::Bool(*b),
            SavedValue::Int(n) => Value::Int(*n),
            SavedValue::Float(f) => Value::Float(*f),
            SavedValue::Text(s) => Value::str(s.as_str()),
            SavedValue::List(items) => Value::list(load_all(items)),
            SavedValue::Tuple(items) => Value::tuple(load_all(items)),
            SavedValue::Set(items) => Value::set(load_all(items)),
            SavedValue::Dict(entries) => {
                Value::dict(entries.iter().map(|(k, v)| (k.to_value(), v.to_value())))
            }
            SavedValue::Array(a) => Value::array(match a {
                SavedArray::Int(v) => Array::Int(v.clone()),
                SavedArray::Float(v) => Array::Float(v.clone()),
                SavedArray::Text(v) => Array::Text(v.clone()),
            }),
        }
    }
}

fn save_all(items: &[Value]) -> Option<Vec<SavedValue>> {
    items.iter().map(SavedValue::from_value).collect()
}

fn load_all(items: &[SavedValue]) -> Vec<Value> {
    items.iter().map(SavedValue::to_value).collect()
}

/// Everything needed to pick a session back up.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedState {
    /// Stack cells, top first.
    pub stack: Vec<SavedValue>,
    pub locals: BTreeMap<String, SavedValue>,
    /// User function names mapped to their `def` source.
    pub functions: BTreeMap<String, String>,
    pub invert_lists: bool,
}

impl Engine {
    pub fn save_state(&self) -> SavedState {
        let mut stack = Vec::with_capacity(self.stack.len());
        for cell in self.stack.iter() {
            match SavedValue::from_value(cell) {
                Some(saved) => stack.push(saved),
                None => log::warn!("not saving stack cell {}", cell.repr()),
            }
        }
        let mut locals = BTreeMap::new();
        for (name, value) in self.names.export_locals() {
            match SavedValue::from_value(&value) {
                Some(saved) => {
                    locals.insert(name, saved);
                }
                None => log::warn!("not saving variable '{}'", name),
            }
        }
        SavedState {
            stack,
            locals,
            functions: self.names.functions().clone(),
            invert_lists: self.invert_lists,
        }
    }

    /// Replace the stack, variables and functions with a saved state.
    ///
    /// Saved cells are pushed back verbatim (text is not re-interpreted).
    /// Functions that fail to compile are reported and skipped; the first
    /// such failure is returned after everything else is restored.
    pub fn restore_state(&mut self, state: SavedState) -> Result<(), EngineError> {
        self.message = None;
        self.snapshot();
        let locals = state
            .locals
            .iter()
            .map(|(name, saved)| (name.clone(), saved.to_value()))
            .collect();
        self.load_locals(locals, true);

        self.stack.clear();
        for cell in state.stack.iter().rev() {
            self.stack.push(cell.to_value());
        }
        self.invert_lists = state.invert_lists;

        self.names.remove_function(None);
        let mut first_failure = None;
        for source in state.functions.values() {
            if let Err(err) = self.names.define_function(self.evaluator.as_ref(), source) {
                log::error!("{}", err);
                first_failure.get_or_insert(err);
            }
        }
        match first_failure {
            Some(err) => self.settle(Err(err)),
            None => {
                self.note(format!(
                    "Restored {} cell(s), {} variable(s), {} function(s)",
                    state.stack.len(),
                    state.locals.len(),
                    state.functions.len()
                ));
                Ok(())
            }
        }
    }
}
