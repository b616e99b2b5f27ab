//! The operation registry: button names mapped to engine actions.
//!
//! Names come from two places:
//! - A fixed table of stack operations, arithmetic, constants and wrappers
//! - The `math` module partition, which generates one action per function
//!   according to how it takes its arguments from the stack

use std::collections::HashMap;

use rpncalc_script::Module;
use rpncalc_script::ast::BinOp;
use rpncalc_script::modules::math;

/// What a button does when pressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Binary arithmetic on Y and X.
    Binary(BinOp),
    /// A named math function fed X, or X and Y when X alone fails.
    StackFunction(&'static str),
    Square,
    PowerXY,
    ExpX,
    Ln,
    Ncr,
    Npr,
    Negate,
    Reciprocal,
    /// Push constant text, committed later like typed digits.
    Constant(&'static str),
    Swap,
    Drop,
    Dup,
    RollUp,
    RollDown,
    IterableToStack,
    StackToList,
    StackToArray,
    Enter,
    Clear,
    Delete,
    Undo,
    ShowPlot,
    OneArg(&'static str),
    TwoArg(&'static str),
    Iterable(&'static str),
}

const FIXED: &[(&str, Action)] = &[
    ("+", Action::Binary(BinOp::Add)),
    ("-", Action::Binary(BinOp::Sub)),
    ("*", Action::Binary(BinOp::Mul)),
    ("/", Action::Binary(BinOp::Div)),
    ("**", Action::Binary(BinOp::Pow)),
    ("!", Action::StackFunction("factorial")),
    ("x^2", Action::Square),
    ("x^y", Action::PowerXY),
    ("e^x", Action::ExpX),
    ("pi", Action::Constant("3.14159265")),
    ("euler", Action::Constant("2.71828182")),
    ("phi", Action::Constant("1.61803398")),
    ("tau", Action::Constant("6.28318530")),
    ("jackpot", Action::Constant("777")),
    ("swap", Action::Swap),
    ("swap_x_y", Action::Swap),
    ("x<->y", Action::Swap),
    ("drop", Action::Drop),
    ("dup", Action::Dup),
    ("rot", Action::RollDown),
    ("roll_up", Action::RollUp),
    ("roll_down", Action::RollDown),
    ("negate", Action::Negate),
    ("+/-", Action::Negate),
    ("1/x", Action::Reciprocal),
    ("recip", Action::Reciprocal),
    ("iterable_to_stack", Action::IterableToStack),
    ("stack_to_list", Action::StackToList),
    ("stack_to_array", Action::StackToArray),
    ("enter", Action::Enter),
    ("clear", Action::Clear),
    ("delete", Action::Delete),
    ("undo", Action::Undo),
    ("ln", Action::Ln),
    ("ncr", Action::Ncr),
    ("npr", Action::Npr),
    ("show_plot", Action::ShowPlot),
];

/// Button name → action table.
#[derive(Clone, Debug)]
pub struct Registry {
    order: Vec<&'static str>,
    actions: HashMap<&'static str, Action>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            actions: HashMap::new(),
        }
    }

    /// The calculator's full button set.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for &(name, action) in FIXED {
            registry.register(name, action);
        }
        for &name in math::ONE_ARG {
            registry.register(name, Action::OneArg(name));
        }
        for &name in math::TWO_ARG {
            registry.register(name, Action::TwoArg(name));
        }
        for &name in math::ITERABLE {
            registry.register(name, Action::Iterable(name));
        }
        registry
    }

    /// Register a button, replacing any earlier action under the same name.
    pub fn register(&mut self, name: &'static str, action: Action) {
        if self.actions.insert(name, action).is_none() {
            self.order.push(name);
        }
    }

    /// Look up a button. `e` is never a button so it can be typed as text.
    pub fn find(&self, name: &str) -> Option<Action> {
        if name == "e" {
            return None;
        }
        self.actions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Button names in registration order.
    pub fn names(&self) -> &[&'static str] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Names in the math module that are not in exactly one argument bucket.
///
/// Constants and wrapped functions count as classified.
pub fn unclassified(module: &Module) -> Vec<String> {
    let buckets = [math::ONE_ARG, math::TWO_ARG, math::ITERABLE, math::CONSTANTS, math::WRAPPED];
    let mut names: Vec<String> = module
        .names()
        .filter(|name| buckets.iter().filter(|b| b.contains(name)).count() != 1)
        .map(str::to_string)
        .collect();
    names.sort();
    names
}
