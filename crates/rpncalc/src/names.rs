//! The namespace manager.
//!
//! Wraps the evaluator's [`Namespace`] and keeps the calculator's view of
//! it: which names are user variables, which are user functions (with the
//! source they were defined from), and which libraries and symbols were
//! imported by committed `import` statements.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rpncalc_script::{Callable, Evaluator, Module, Namespace, Origin, Value};

pub use rpncalc_script::is_identifier;

use crate::error::EngineError;

/// A library brought in by `import m`, `import m as a` or `from m import *`.
#[derive(Clone, Debug)]
pub struct Library {
    /// The name it was imported under.
    pub name: String,
    pub module: Arc<Module>,
}

/// The shape of an import statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportShape {
    /// `import m` or `import m as a`.
    Module { module: String, binding: String },
    /// `from m import *`.
    Wildcard { module: String },
    /// `from m import name`.
    Name { module: String, name: String },
    /// Anything else that mentions `import`.
    Other,
}

impl ImportShape {
    pub fn parse(text: &str) -> Self {
        let words: Vec<&str> = text.split_whitespace().collect();
        match words.as_slice() {
            ["import", m] => ImportShape::Module {
                module: m.to_string(),
                binding: m.to_string(),
            },
            ["import", m, "as", a] => ImportShape::Module {
                module: m.to_string(),
                binding: a.to_string(),
            },
            ["from", m, "import", "*"] => ImportShape::Wildcard { module: m.to_string() },
            ["from", m, "import", n] => ImportShape::Name {
                module: m.to_string(),
                name: n.to_string(),
            },
            _ => ImportShape::Other,
        }
    }
}

/// What a committed import did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportOutcome {
    Library(String),
    Symbol(String),
    /// The symbol was already bound, so nothing was imported.
    AlreadyBound(String),
    Executed,
}

/// A callable found by name, with where it came from.
#[derive(Clone, Debug)]
pub struct Resolved {
    pub callable: Arc<dyn Callable>,
    pub source: String,
}


/// The function name declared by `def name(...)` source.
pub fn declared_name(source: &str) -> Option<&str> {
    let rest = source.trim_start().strip_prefix("def ")?;
    let name = rest.split('(').next()?.trim();
    is_identifier(name).then_some(name)
}

#[derive(Debug)]
pub struct NamespaceManager {
    namespace: Namespace,
    functions: BTreeMap<String, String>,
    libraries: Vec<Library>,
    symbols: BTreeSet<String>,
}

impl NamespaceManager {
    /// A manager over the evaluator's built-in namespace.
    pub fn new() -> Self {
        Self::with_namespace(Namespace::with_builtins())
    }

    pub fn with_namespace(namespace: Namespace) -> Self {
        Self {
            namespace,
            functions: BTreeMap::new(),
            libraries: Vec::new(),
            symbols: BTreeSet::new(),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn namespace_mut(&mut self) -> &mut Namespace {
        &mut self.namespace
    }

    // ========================================================================
    // Variables
    // ========================================================================

    /// Bind a user variable. Built-in and imported names are refused.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), EngineError> {
        if self.namespace.is_reserved(name) {
            return Err(EngineError::ReservedName(name.to_string()));
        }
        if self.functions.remove(name).is_some() {
            log::debug!("variable '{}' replaces a user function", name);
        }
        self.namespace.bind(name, value, Origin::Local);
        Ok(())
    }

    /// The value of a user variable.
    pub fn recall(&self, name: &str) -> Option<&Value> {
        self.namespace
            .binding(name)
            .filter(|b| b.origin == Origin::Local)
            .map(|b| &b.value)
    }

    /// Remove a user variable.
    pub fn delete(&mut self, name: &str) -> Result<Value, EngineError> {
        if self.recall(name).is_none() {
            return Err(EngineError::Resolution(name.to_string()));
        }
        self.namespace
            .unbind(name)
            .map(|b| b.value)
            .ok_or_else(|| EngineError::Resolution(name.to_string()))
    }

    /// Remove every user variable, returning their names.
    pub fn clear_all(&mut self) -> Vec<String> {
        self.namespace.unbind_origin(Origin::Local)
    }

    pub fn export_locals(&self) -> BTreeMap<String, Value> {
        self.namespace
            .names_with(Origin::Local)
            .into_iter()
            .filter_map(|name| {
                let value = self.namespace.get(&name)?.clone();
                Some((name, value))
            })
            .collect()
    }

    /// Bind many user variables at once; reserved names are skipped.
    pub fn load_locals(&mut self, locals: BTreeMap<String, Value>, clear_first: bool) -> Vec<String> {
        if clear_first {
            self.clear_all();
        }
        let mut skipped = Vec::new();
        for (name, value) in locals {
            if self.assign(&name, value).is_err() {
                log::warn!("not loading variable '{}': the name is reserved", name);
                skipped.push(name);
            }
        }
        skipped
    }

    // ========================================================================
    // User functions
    // ========================================================================

    /// Execute a `def` and register the function it declares.
    pub fn define_function(
        &mut self,
        evaluator: &dyn Evaluator,
        source: &str,
    ) -> Result<String, EngineError> {
        let failed = |reason: String| EngineError::Definition {
            text: source.to_string(),
            reason,
        };
        let name = declared_name(source)
            .ok_or_else(|| failed("expected 'def name(...)'".to_string()))?
            .to_string();
        evaluator
            .execute(source, &mut self.namespace)
            .map_err(|e| failed(e.to_string()))?;
        if !self.namespace.get(&name).is_some_and(Value::is_callable) {
            return Err(failed(format!("'{}' is not bound to a function", name)));
        }
        self.namespace.retag(&name, Origin::Function);
        self.functions.insert(name.clone(), source.to_string());
        Ok(name)
    }

    /// Remove one user function, or all of them when `name` is `None`.
    pub fn remove_function(&mut self, name: Option<&str>) -> Vec<String> {
        let names: Vec<String> = match name {
            Some(n) if self.functions.contains_key(n) => vec![n.to_string()],
            Some(_) => Vec::new(),
            None => self.functions.keys().cloned().collect(),
        };
        for n in &names {
            self.functions.remove(n);
            self.namespace.unbind(n);
        }
        names
    }

    /// User function names mapped to their source.
    pub fn functions(&self) -> &BTreeMap<String, String> {
        &self.functions
    }

    // ========================================================================
    // Imports
    // ========================================================================

    /// Execute an import statement and track what it brought in.
    pub fn import(&mut self, evaluator: &dyn Evaluator, text: &str) -> Result<ImportOutcome, EngineError> {
        let shape = ImportShape::parse(text);
        if let ImportShape::Name { name, .. } = &shape
            && self.namespace.contains(name)
        {
            return Ok(ImportOutcome::AlreadyBound(name.clone()));
        }
        evaluator
            .execute(text, &mut self.namespace)
            .map_err(|e| EngineError::evaluation(format!("import failed for '{}'", text.trim()), e))?;

        match shape {
            ImportShape::Module { binding, .. } => {
                if let Some(module) = self.namespace.get(&binding).and_then(Value::as_module) {
                    self.track(Library {
                        name: binding.clone(),
                        module: module.clone(),
                    });
                }
                Ok(ImportOutcome::Library(binding))
            }
            ImportShape::Wildcard { module } => {
                if let Some(loaded) = self.namespace.loaded_module(&module) {
                    self.track(Library {
                        name: module.clone(),
                        module: loaded,
                    });
                }
                Ok(ImportOutcome::Library(module))
            }
            ImportShape::Name { name, .. } => {
                self.symbols.insert(name.clone());
                Ok(ImportOutcome::Symbol(name))
            }
            ImportShape::Other => Ok(ImportOutcome::Executed),
        }
    }

    fn track(&mut self, library: Library) {
        self.libraries.retain(|l| l.name != library.name);
        self.libraries.push(library);
    }

    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Whether `name` can be invoked by name from the stack.
    pub fn is_known_callable(&self, name: &str) -> bool {
        self.functions.contains_key(name)
            || self.symbols.contains(name)
            || self.library_member(name).is_some()
    }

    /// A user function by name.
    pub fn user_function(&self, name: &str) -> Option<Arc<dyn Callable>> {
        if !self.functions.contains_key(name) {
            return None;
        }
        self.namespace.get(name)?.as_callable().cloned()
    }

    /// An imported callable: a directly imported symbol, then the first
    /// tracked library that has a callable member of that name.
    pub fn library_member(&self, name: &str) -> Option<Resolved> {
        if self.symbols.contains(name)
            && let Some(callable) = self.namespace.get(name).and_then(Value::as_callable)
        {
            return Some(Resolved {
                callable: callable.clone(),
                source: name.to_string(),
            });
        }
        self.libraries.iter().find_map(|lib| {
            let callable = lib.module.get(name)?.as_callable()?;
            Some(Resolved {
                callable: callable.clone(),
                source: format!("{}.{}", lib.name, name),
            })
        })
    }
}

impl Default for NamespaceManager {
    fn default() -> Self {
        Self::new()
    }
}
