//! The evaluation namespace.
//!
//! One map holds every name the evaluator can see. Each binding carries an
//! [`Origin`] tag, so user variables and evaluator-internal names live side
//! by side without a second map to keep in sync.

use std::collections::HashMap;
use std::sync::Arc;

use crate::value::{Module, Value};
use crate::{builtins, modules};

/// Where a binding came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Host built-ins and the math functions preloaded with them.
    Builtin,
    /// Bound by an `import` statement.
    Import,
    /// A user variable set through calculator assignment.
    Local,
    /// A user-defined function registered with the calculator.
    Function,
    /// Bound by executed script text.
    Script,
}

impl Origin {
    /// Reserved origins cannot be overwritten by calculator assignment.
    pub fn is_reserved(self) -> bool {
        matches!(self, Origin::Builtin | Origin::Import)
    }
}

/// A value plus its origin tag.
#[derive(Clone, Debug)]
pub struct Binding {
    pub value: Value,
    pub origin: Origin,
}

/// Name → binding map shared by the calculator and the evaluator.
#[derive(Clone, Debug, Default)]
pub struct Namespace {
    bindings: HashMap<String, Binding>,
    /// Loaded modules by module name, so repeated imports share state.
    modules: HashMap<String, Arc<Module>>,
}

impl Namespace {
    /// Create an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a namespace preloaded with built-ins and the `math` functions.
    pub fn with_builtins() -> Self {
        let mut ns = Self::new();
        if let Some(math) = ns.load_module("math") {
            for (name, value) in math.members() {
                ns.bind(name, value.clone(), Origin::Builtin);
            }
        }
        builtins::install(&mut ns);
        ns
    }

    /// Look up a name's value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name).map(|b| &b.value)
    }

    /// Look up a full binding.
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn origin(&self, name: &str) -> Option<Origin> {
        self.bindings.get(name).map(|b| b.origin)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Check whether a name is bound by a built-in or an import.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.origin(name).is_some_and(Origin::is_reserved)
    }

    /// Bind a name with an explicit origin, returning the previous binding.
    pub fn bind(&mut self, name: impl Into<String>, value: Value, origin: Origin) -> Option<Binding> {
        self.bindings.insert(name.into(), Binding { value, origin })
    }

    /// Bind a name from executed script text.
    ///
    /// User variables and functions keep their origin when script text
    /// rebinds them; anything else becomes a script binding.
    pub fn set(&mut self, name: &str, value: Value) {
        match self.bindings.get_mut(name) {
            Some(binding) if matches!(binding.origin, Origin::Local | Origin::Function) => {
                binding.value = value;
            }
            _ => {
                self.bind(name, value, Origin::Script);
            }
        }
    }

    /// Change the origin tag of an existing binding.
    pub fn retag(&mut self, name: &str, origin: Origin) -> bool {
        match self.bindings.get_mut(name) {
            Some(binding) => {
                binding.origin = origin;
                true
            }
            None => false,
        }
    }

    /// Remove a name.
    pub fn unbind(&mut self, name: &str) -> Option<Binding> {
        self.bindings.remove(name)
    }

    /// Remove every binding with the given origin, returning the removed names.
    pub fn unbind_origin(&mut self, origin: Origin) -> Vec<String> {
        let names = self.names_with(origin);
        for name in &names {
            self.bindings.remove(name);
        }
        names
    }

    /// Sorted names bound with the given origin.
    pub fn names_with(&self, origin: Origin) -> Vec<String> {
        let mut names: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, b)| b.origin == origin)
            .map(|(k, _)| k.clone())
            .collect();
        names.sort();
        names
    }

    /// All bound names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Load a module by name, reusing an earlier load.
    pub fn load_module(&mut self, name: &str) -> Option<Arc<Module>> {
        if let Some(module) = self.modules.get(name) {
            return Some(module.clone());
        }
        let module = Arc::new(modules::load(name)?);
        self.modules.insert(name.to_string(), module.clone());
        Some(module)
    }

    /// A module loaded earlier, without loading it.
    pub fn loaded_module(&self, name: &str) -> Option<Arc<Module>> {
        self.modules.get(name).cloned()
    }
}
