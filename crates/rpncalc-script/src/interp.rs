//! Tree-walking interpreter.
//!
//! An [`Interpreter`] borrows the global [`Namespace`] for the duration of
//! one evaluation. Calls to script-defined functions run in a fresh
//! interpreter with a local frame layered over the same globals.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ast::{Expr, FunctionDef, ImportNames, Stmt};
use crate::callable::{Args, Callable};
use crate::error::{EvalError, EvalResult};
use crate::namespace::{Namespace, Origin};
use crate::ops;
use crate::value::Value;

/// Maximum nesting of script-defined function calls.
const MAX_CALL_DEPTH: usize = 100;

thread_local! {
    static CALL_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Tracks call nesting; decremented on drop.
struct DepthGuard;

impl DepthGuard {
    fn enter() -> EvalResult<Self> {
        CALL_DEPTH.with(|depth| {
            if depth.get() >= MAX_CALL_DEPTH {
                return Err(EvalError::Overflow(
                    "maximum recursion depth exceeded".into(),
                ));
            }
            depth.set(depth.get() + 1);
            Ok(DepthGuard)
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        CALL_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// How a statement finished.
enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

type Frame = HashMap<Arc<str>, Value>;

/// Evaluation state for one call frame.
pub struct Interpreter<'a> {
    globals: &'a mut Namespace,
    locals: Option<Frame>,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter at module level.
    pub fn new(globals: &'a mut Namespace) -> Self {
        Self {
            globals,
            locals: None,
        }
    }

    fn with_frame(globals: &'a mut Namespace, frame: Frame) -> Self {
        Self {
            globals,
            locals: Some(frame),
        }
    }

    /// Run statements at module level.
    pub fn run(&mut self, stmts: &[Stmt]) -> EvalResult<()> {
        match self.exec_block(stmts)? {
            Flow::Normal => Ok(()),
            Flow::Return(_) => Err(EvalError::syntax("'return' outside function")),
            Flow::Break | Flow::Continue => Err(EvalError::syntax("'break' outside loop")),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn exec_block(&mut self, stmts: &[Stmt]) -> EvalResult<Flow> {
        for stmt in stmts {
            match self.exec(stmt)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, stmt: &Stmt) -> EvalResult<Flow> {
        match stmt {
            Stmt::Expr(expr) => {
                self.eval(expr)?;
            }
            Stmt::Assign(name, expr) => {
                let value = self.eval(expr)?;
                self.assign(name, value);
            }
            Stmt::AugAssign(name, op, expr) => {
                let current = self.lookup(name)?;
                let rhs = self.eval(expr)?;
                let value = ops::binary(*op, &current, &rhs)?;
                self.assign(name, value);
            }
            Stmt::Def(def) => {
                let function = self.make_function(def)?;
                self.assign(&def.name, function);
            }
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(e) => self.eval(e)?,
                    None => Value::None,
                };
                return Ok(Flow::Return(value));
            }
            Stmt::If { branches, orelse } => {
                for (cond, body) in branches {
                    if self.eval(cond)?.is_truthy() {
                        return self.exec_block(body);
                    }
                }
                return self.exec_block(orelse);
            }
            Stmt::For { target, iter, body } => {
                let iterable = self.eval(iter)?;
                let items = iterable.iter_items().ok_or_else(|| {
                    EvalError::type_error(format!(
                        "'{}' object is not iterable",
                        iterable.type_name()
                    ))
                })?;
                for item in items {
                    self.assign(target, item);
                    match self.exec_block(body)? {
                        Flow::Break => break,
                        Flow::Return(v) => return Ok(Flow::Return(v)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
            }
            Stmt::While { cond, body } => {
                while self.eval(cond)?.is_truthy() {
                    match self.exec_block(body)? {
                        Flow::Break => break,
                        Flow::Return(v) => return Ok(Flow::Return(v)),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
            }
            Stmt::Break => return Ok(Flow::Break),
            Stmt::Continue => return Ok(Flow::Continue),
            Stmt::Pass => {}
            Stmt::Import { module, alias } => {
                let loaded = self
                    .globals
                    .load_module(module)
                    .ok_or_else(|| EvalError::Import(module.clone()))?;
                let name = alias.as_deref().unwrap_or(module);
                self.bind_import(name, Value::Module(loaded));
            }
            Stmt::FromImport { module, names } => {
                let loaded = self
                    .globals
                    .load_module(module)
                    .ok_or_else(|| EvalError::Import(module.clone()))?;
                match names {
                    ImportNames::All => {
                        for (name, value) in loaded.members() {
                            self.bind_import(name, value.clone());
                        }
                    }
                    ImportNames::Names(names) => {
                        for (name, alias) in names {
                            let value = loaded.get(name).cloned().ok_or_else(|| {
                                EvalError::Import(format!("{}.{}", module, name))
                            })?;
                            self.bind_import(alias.as_deref().unwrap_or(name), value);
                        }
                    }
                }
            }
            Stmt::Del(names) => {
                for name in names {
                    self.delete(name)?;
                }
            }
        }
        Ok(Flow::Normal)
    }

    fn assign(&mut self, name: &str, value: Value) {
        match &mut self.locals {
            Some(frame) => {
                frame.insert(name.into(), value);
            }
            None => self.globals.set(name, value),
        }
    }

    fn bind_import(&mut self, name: &str, value: Value) {
        match &mut self.locals {
            Some(frame) => {
                frame.insert(name.into(), value);
            }
            None => {
                self.globals.bind(name, value, Origin::Import);
            }
        }
    }

    fn delete(&mut self, name: &str) -> EvalResult<()> {
        let removed = match &mut self.locals {
            Some(frame) => frame.remove(name).is_some(),
            None => self.globals.unbind(name).is_some(),
        };
        if removed {
            Ok(())
        } else {
            Err(EvalError::Name(name.to_string()))
        }
    }

    fn lookup(&self, name: &str) -> EvalResult<Value> {
        if let Some(frame) = &self.locals
            && let Some(value) = frame.get(name)
        {
            return Ok(value.clone());
        }
        self.globals
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::Name(name.to_string()))
    }

    fn make_function(&mut self, def: &Arc<FunctionDef>) -> EvalResult<Value> {
        let mut defaults = Vec::with_capacity(def.params.len());
        for param in &def.params {
            defaults.push(match &param.default {
                Some(expr) => Some(self.eval(expr)?),
                None => None,
            });
        }
        Ok(Value::function(UserFunction {
            def: def.clone(),
            defaults,
            closure: self.locals.clone().unwrap_or_default(),
        }))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Evaluate an expression.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Name(name) => self.lookup(name),
            Expr::Attribute(object, attr) => {
                let object = self.eval(object)?;
                attribute(&object, attr)
            }
            Expr::Call {
                callee,
                args,
                keywords,
            } => {
                let callee = self.eval(callee)?;
                let mut call_args = Args::default();
                for arg in args {
                    call_args.positional.push(self.eval(arg)?);
                }
                for (name, arg) in keywords {
                    let value = self.eval(arg)?;
                    call_args.keywords.push((name.clone(), value));
                }
                self.call(&callee, call_args)
            }
            Expr::Subscript(object, index) => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                subscript(&object, &index)
            }
            Expr::Unary(op, operand) => {
                let value = self.eval(operand)?;
                ops::unary(*op, &value)
            }
            Expr::Binary(op, left, right) => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                ops::binary(*op, &l, &r)
            }
            Expr::Compare(first, links) => {
                let mut left = self.eval(first)?;
                for (op, next) in links {
                    let right = self.eval(next)?;
                    if !ops::compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            Expr::And(left, right) => {
                let l = self.eval(left)?;
                if !l.is_truthy() {
                    return Ok(l);
                }
                self.eval(right)
            }
            Expr::Or(left, right) => {
                let l = self.eval(left)?;
                if l.is_truthy() {
                    return Ok(l);
                }
                self.eval(right)
            }
            Expr::List(items) => Ok(Value::list(self.eval_all(items)?)),
            Expr::Tuple(items) => Ok(Value::tuple(self.eval_all(items)?)),
            Expr::Set(items) => Ok(Value::set(self.eval_all(items)?)),
            Expr::Dict(entries) => {
                let mut pairs = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    pairs.push((self.eval(k)?, self.eval(v)?));
                }
                Ok(Value::dict(pairs))
            }
            Expr::Lambda(def) => self.make_function(def),
        }
    }

    fn eval_all(&mut self, exprs: &[Expr]) -> EvalResult<Vec<Value>> {
        exprs.iter().map(|e| self.eval(e)).collect()
    }

    fn call(&mut self, callee: &Value, args: Args) -> EvalResult<Value> {
        match callee {
            Value::Function(f) => f.call(args, self.globals),
            other => Err(EvalError::type_error(format!(
                "'{}' object is not callable",
                other.type_name()
            ))),
        }
    }
}

/// Attribute access on a value.
pub fn attribute(object: &Value, attr: &str) -> EvalResult<Value> {
    let missing = || EvalError::Attribute {
        owner: object.type_name().to_string(),
        attr: attr.to_string(),
    };
    match object {
        Value::Module(m) => m.get(attr).cloned().ok_or_else(|| EvalError::Attribute {
            owner: m.name().to_string(),
            attr: attr.to_string(),
        }),
        Value::Array(a) => match attr {
            "size" => Ok(Value::Int(a.len() as i64)),
            "dtype" => Ok(Value::str(a.dtype().name())),
            _ => Err(missing()),
        },
        Value::Plot(p) => match attr {
            "name" => Ok(Value::str(p.name.as_str())),
            "data" => Ok(Value::list(p.data.iter().map(|f| Value::Float(*f)).collect::<Vec<_>>())),
            _ => Err(missing()),
        },
        _ => Err(missing()),
    }
}

fn normalize_index(index: &Value, len: usize) -> EvalResult<usize> {
    let i = index.as_i64().ok_or_else(|| {
        EvalError::type_error(format!(
            "indices must be integers, not {}",
            index.type_name()
        ))
    })?;
    let len = len as i64;
    let pos = if i < 0 { i + len } else { i };
    if pos < 0 || pos >= len {
        return Err(EvalError::Index(i));
    }
    Ok(pos as usize)
}

/// Subscript access: `object[index]`.
pub fn subscript(object: &Value, index: &Value) -> EvalResult<Value> {
    match object {
        Value::List(items) | Value::Tuple(items) => {
            Ok(items[normalize_index(index, items.len())?].clone())
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let i = normalize_index(index, chars.len())?;
            Ok(Value::str(chars[i].to_string()))
        }
        Value::Array(a) => {
            let i = normalize_index(index, a.len())?;
            a.get(i as i64).ok_or(EvalError::Index(i as i64))
        }
        Value::Dict(entries) => entries
            .iter()
            .find(|(k, _)| k == index)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| EvalError::Key(index.repr())),
        other => Err(EvalError::type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

// ============================================================================
// Script-defined functions
// ============================================================================

/// A function created by `def` or `lambda`.
pub struct UserFunction {
    def: Arc<FunctionDef>,
    /// Default values evaluated at definition time, one slot per parameter.
    defaults: Vec<Option<Value>>,
    /// Enclosing local frame, captured when defined inside another function.
    closure: Frame,
}

impl UserFunction {
    pub fn definition(&self) -> &FunctionDef {
        &self.def
    }

    fn bind_args(&self, args: Args) -> EvalResult<Frame> {
        let params = &self.def.params;
        if args.positional.len() > params.len() {
            return Err(EvalError::Arity {
                name: self.def.name.to_string(),
                expected: params.len().to_string(),
                given: args.positional.len(),
            });
        }
        let mut slots: Vec<Option<Value>> = vec![None; params.len()];
        for (slot, value) in slots.iter_mut().zip(args.positional) {
            *slot = Some(value);
        }
        for (name, value) in args.keywords {
            let index = params
                .iter()
                .position(|p| *p.name == *name)
                .ok_or_else(|| {
                    EvalError::type_error(format!(
                        "{}() got an unexpected keyword argument '{}'",
                        self.def.name, name
                    ))
                })?;
            if slots[index].is_some() {
                return Err(EvalError::type_error(format!(
                    "{}() got multiple values for argument '{}'",
                    self.def.name, name
                )));
            }
            slots[index] = Some(value);
        }

        let mut frame = self.closure.clone();
        for ((param, slot), default) in params.iter().zip(slots).zip(&self.defaults) {
            let value = slot.or_else(|| default.clone()).ok_or_else(|| {
                EvalError::type_error(format!(
                    "{}() missing required positional argument: '{}'",
                    self.def.name, param.name
                ))
            })?;
            frame.insert(param.name.clone(), value);
        }
        Ok(frame)
    }
}

impl fmt::Debug for UserFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.def.name)
    }
}

impl Callable for UserFunction {
    fn name(&self) -> &str {
        &self.def.name
    }

    fn required_positional_arity(&self) -> Option<usize> {
        Some(self.def.params.iter().filter(|p| p.default.is_none()).count())
    }

    fn call(&self, args: Args, namespace: &mut Namespace) -> EvalResult<Value> {
        let _guard = DepthGuard::enter()?;
        let frame = self.bind_args(args)?;
        let mut interp = Interpreter::with_frame(namespace, frame);
        match interp.exec_block(&self.def.body)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::None),
            Flow::Break | Flow::Continue => Err(EvalError::syntax("'break' outside loop")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{Evaluator, ScriptEvaluator};

    fn run(src: &str) -> Namespace {
        let mut ns = Namespace::with_builtins();
        ScriptEvaluator.execute(src, &mut ns).unwrap();
        ns
    }

    fn eval(ns: &mut Namespace, src: &str) -> EvalResult<Value> {
        ScriptEvaluator.evaluate(src, ns)
    }

    #[test]
    fn defines_and_calls_functions() {
        let mut ns = run("def area(w, h=2): return w * h");
        assert_eq!(eval(&mut ns, "area(3)").unwrap(), Value::int(6));
        assert_eq!(eval(&mut ns, "area(3, h=4)").unwrap(), Value::int(12));
        let f = ns.get("area").and_then(Value::as_callable).unwrap();
        assert_eq!(f.required_positional_arity(), Some(1));
    }

    #[test]
    fn block_function_with_loop() {
        let mut ns = run("def tri(n):\n    total = 0\n    for i in range(n + 1):\n        total += i\n    return total");
        assert_eq!(eval(&mut ns, "tri(4)").unwrap(), Value::int(10));
        // locals do not leak into globals
        assert!(!ns.contains("total"));
    }

    #[test]
    fn recursion_and_while() {
        let mut ns = run("def fact(n):\n  if n <= 1:\n    return 1\n  return n * fact(n - 1)");
        assert_eq!(eval(&mut ns, "fact(10)").unwrap(), Value::int(3628800));
        let mut ns = run("i = 0\nwhile i < 5:\n  i += 1\n  if i == 3:\n    break");
        assert_eq!(eval(&mut ns, "i").unwrap(), Value::int(3));
    }

    #[test]
    fn runaway_recursion_is_an_error() {
        let mut ns = run("def loop(n): return loop(n + 1)");
        assert!(matches!(eval(&mut ns, "loop(0)"), Err(EvalError::Overflow(_))));
    }

    #[test]
    fn lambdas_capture_enclosing_locals() {
        let mut ns = run("def adder(n): return lambda x: x + n");
        assert_eq!(eval(&mut ns, "adder(3)(4)").unwrap(), Value::int(7));
        assert_eq!(eval(&mut ns, "(lambda a, b=1: a - b)(5)").unwrap(), Value::int(4));
    }

    #[test]
    fn argument_errors() {
        let mut ns = run("def f(a, b): return a");
        assert!(matches!(eval(&mut ns, "f(1)"), Err(EvalError::Type(_))));
        assert!(matches!(eval(&mut ns, "f(1, 2, 3)"), Err(EvalError::Arity { .. })));
        assert!(matches!(eval(&mut ns, "f(1, c=2)"), Err(EvalError::Type(_))));
    }

    #[test]
    fn imports_bind_with_import_origin() {
        let mut ns = run("import random\nfrom math import sqrt as root");
        assert_eq!(ns.origin("random"), Some(Origin::Import));
        assert_eq!(ns.origin("root"), Some(Origin::Import));
        assert_eq!(eval(&mut ns, "root(16)").unwrap(), Value::float(4.0));
        let mut bad = Namespace::new();
        assert_eq!(
            ScriptEvaluator.execute("import nothing_here", &mut bad),
            Err(EvalError::Import("nothing_here".into()))
        );
    }

    #[test]
    fn subscripts_and_attributes() {
        let mut ns = run("xs = [1, 2, 3]\nd = {'k': 'v'}");
        assert_eq!(eval(&mut ns, "xs[-1]").unwrap(), Value::int(3));
        assert_eq!(eval(&mut ns, "d['k']").unwrap(), Value::str("v"));
        assert!(matches!(eval(&mut ns, "xs[3]"), Err(EvalError::Index(3))));
        assert!(matches!(eval(&mut ns, "d['x']"), Err(EvalError::Key(_))));
        assert!(matches!(eval(&mut ns, "math.nope"), Err(EvalError::Name(_))));
    }

    #[test]
    fn boolean_logic_short_circuits() {
        let mut ns = Namespace::with_builtins();
        assert_eq!(eval(&mut ns, "0 or 'x'").unwrap(), Value::str("x"));
        assert_eq!(eval(&mut ns, "0 and undefined_name").unwrap(), Value::int(0));
        assert_eq!(eval(&mut ns, "not 1 < 2 < 3").unwrap(), Value::Bool(false));
    }

    #[test]
    fn del_removes_names() {
        let mut ns = run("a = 1\ndel a");
        assert!(!ns.contains("a"));
        assert!(ScriptEvaluator.execute("del a", &mut ns).is_err());
    }
}
