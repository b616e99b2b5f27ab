//! An RPN calculator engine with an embedded expression evaluator.
//!
//! This crate provides:
//! - `engine` - The [`Engine`]: stack, undo history, namespace and registry
//! - `entry`, `enter` - How submitted tokens and commits are interpreted
//! - `dispatch`, `convert` - Button actions and list/array conversions
//! - `registry` - Button names and the actions they trigger
//! - `names` - User variables, user functions and import tracking
//! - `state`, `config` - Persistence and configuration
//! - `plot`, `format` - Collaborator traits for front-ends

pub mod coerce;
pub mod config;
mod convert;
mod dispatch;
pub mod engine;
pub mod enter;
pub mod entry;
pub mod error;
pub mod format;
pub mod history;
pub mod names;
pub mod plot;
pub mod registry;
pub mod stack;
pub mod state;

pub use coerce::coerce;
pub use config::EngineConfig;
pub use engine::{Engine, LastOp};
pub use error::{CoercionError, ConfigError, EngineError, StackError};
pub use format::{Formatter, PlainFormatter};
pub use plot::{LogPlotSink, PlotRequest, PlotSink};
pub use registry::{Action, Registry};
pub use state::{SavedArray, SavedState, SavedValue};

pub use rpncalc_script::{Array, DType, PlotContainer, Value};
