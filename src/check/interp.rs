#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::BTreeMap;

use itertools::Itertools;

use super::{
    ast::{Arg, BinOp, CmpOp, Expr, FPart, Stmt, UnaryOp},
    value::{Builtin, EvalResult, RuntimeError, Value},
};

/// Evaluated call arguments.
struct CallArgs {
    /// Positional arguments in order.
    positional: Vec<Value>,
    /// Keyword arguments in order.
    keywords:   Vec<(String, Value)>,
}

impl CallArgs {
    /// Rejects keyword arguments for functions that take none.
    fn no_keywords(&self, func: &str) -> EvalResult<()> {
        if self.keywords.is_empty() {
            Ok(())
        } else {
            Err(RuntimeError::Type(format!("{func}() takes no keyword arguments")))
        }
    }

    /// Checks the positional count is within `min..=max`.
    fn arity(&self, func: &str, min: usize, max: usize) -> EvalResult<()> {
        let n = self.positional.len();
        if n < min || n > max {
            let expected = if min == max {
                format!("exactly {min}")
            } else {
                format!("from {min} to {max}")
            };
            return Err(RuntimeError::Type(format!(
                "{func}() takes {expected} arguments ({n} given)"
            )));
        }
        Ok(())
    }

    /// Positional argument `i`, if given.
    fn get(&self, i: usize) -> Option<&Value> {
        self.positional.get(i)
    }

    /// Keyword argument `name`, if given.
    fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }
}

/// Runs check code against a fixed set of bindings.
///
/// Names resolve against the bindings (plus anything the code assigns),
/// then against the pure builtins. Nothing else is reachable.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    /// Current variables.
    scope: BTreeMap<String, Value>,
}

impl Interpreter {
    /// Creates an interpreter whose only variables are `bindings`.
    pub fn new(bindings: BTreeMap<String, Value>) -> Self {
        Self { scope: bindings }
    }

    /// Current value of a variable.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.scope.get(name)
    }

    /// Executes statements in order, stopping at the first error.
    pub fn run(&mut self, program: &[Stmt]) -> EvalResult<()> {
        program.iter().try_for_each(|stmt| self.exec(stmt))
    }

    /// Executes one statement.
    fn exec(&mut self, stmt: &Stmt) -> EvalResult<()> {
        match stmt {
            Stmt::Pass => Ok(()),
            Stmt::Expr(expr) => self.eval(expr).map(drop),
            Stmt::Assert { test, msg } => {
                if self.eval(test)?.truthy() {
                    return Ok(());
                }
                let message = match msg {
                    Some(msg) => Some(self.eval(msg)?.to_string()),
                    None => None,
                };
                Err(RuntimeError::Assertion(message))
            }
            Stmt::Assign { targets, value } => {
                let value = self.eval(value)?;
                self.bind(targets, value)
            }
            Stmt::AugAssign { target, op, value } => {
                let current = self.lookup(target)?;
                let rhs = self.eval(value)?;
                let updated = current.binary(*op, &rhs)?;
                self.scope.insert(target.clone(), updated);
                Ok(())
            }
            Stmt::If { branches, orelse } => {
                for (cond, body) in branches {
                    if self.eval(cond)?.truthy() {
                        return self.run(body);
                    }
                }
                self.run(orelse)
            }
            Stmt::For {
                targets,
                iter,
                body,
            } => {
                for item in self.eval(iter)?.iterate()? {
                    self.bind(targets, item)?;
                    self.run(body)?;
                }
                Ok(())
            }
        }
    }

    /// Assigns `value` to one name, or unpacks it over several.
    fn bind(&mut self, targets: &[String], value: Value) -> EvalResult<()> {
        if let [single] = targets {
            self.scope.insert(single.clone(), value);
            return Ok(());
        }
        let items = value.iterate().map_err(|_| {
            RuntimeError::Type(format!(
                "cannot unpack non-iterable {} object",
                value.type_name()
            ))
        })?;
        if items.len() != targets.len() {
            return Err(RuntimeError::Value(format!(
                "expected {} values to unpack, got {}",
                targets.len(),
                items.len()
            )));
        }
        for (name, item) in targets.iter().zip(items) {
            self.scope.insert(name.clone(), item);
        }
        Ok(())
    }

    /// Resolves a name.
    fn lookup(&self, name: &str) -> EvalResult<Value> {
        if let Some(value) = self.scope.get(name) {
            return Ok(value.clone());
        }
        Builtin::lookup(name)
            .map(Value::Builtin)
            .ok_or_else(|| RuntimeError::Name(name.to_string()))
    }

    /// Evaluates an expression.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        Ok(match expr {
            Expr::None => Value::None,
            Expr::Bool(b) => Value::Bool(*b),
            Expr::Int(i) => Value::Int(*i),
            Expr::Float(f) => Value::Float(*f),
            Expr::Str(s) => Value::Str(s.clone()),
            Expr::FStr(parts) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        FPart::Lit(text) => out.push_str(text),
                        FPart::Expr(expr, spec) => {
                            let value = self.eval(expr)?;
                            out.push_str(&format_spec(&value, spec.as_deref()));
                        }
                    }
                }
                Value::Str(out)
            }
            Expr::List(items) => Value::List(self.eval_all(items)?),
            Expr::Tuple(items) => Value::Tuple(self.eval_all(items)?),
            Expr::Dict(entries) => {
                let mut out: Vec<(Value, Value)> = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    let key = self.eval(k)?;
                    let value = self.eval(v)?;
                    match out.iter_mut().find(|slot| slot.0.py_eq(&key)) {
                        Some(slot) => slot.1 = value,
                        None => out.push((key, value)),
                    }
                }
                Value::Dict(out)
            }
            Expr::Comp {
                element,
                targets,
                iter,
                cond,
            } => {
                let items = self.eval(iter)?.iterate()?;
                // Loop variables do not leak out of the comprehension.
                let saved = self.scope.clone();
                let result = self.comprehension(element, targets, items, cond.as_deref());
                self.scope = saved;
                Value::List(result?)
            }
            Expr::Name(name) => self.lookup(name)?,
            Expr::Attr(target, name) => self.eval(target)?.get_attr(name)?,
            Expr::Index(target, index) => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                target.get_item(&index)?
            }
            Expr::Slice(target, lo, hi) => {
                let target = self.eval(target)?;
                let lo = lo.as_deref().map(|e| self.eval(e)).transpose()?;
                let hi = hi.as_deref().map(|e| self.eval(e)).transpose()?;
                target.slice(lo.as_ref(), hi.as_ref())?
            }
            Expr::Call(callee, args) => {
                let callee = self.eval(callee)?;
                let args = self.eval_args(args)?;
                call(callee, args)?
            }
            Expr::Unary(op, operand) => {
                let value = self.eval(operand)?;
                match (op, &value) {
                    (UnaryOp::Not, _) => Value::Bool(!value.truthy()),
                    (UnaryOp::Neg, Value::Int(_) | Value::Float(_) | Value::Bool(_)) => {
                        Value::Int(0).binary(BinOp::Sub, &value)?
                    }
                    (UnaryOp::Pos, Value::Int(_) | Value::Float(_) | Value::Bool(_)) => {
                        Value::Int(0).binary(BinOp::Add, &value)?
                    }
                    (UnaryOp::Neg | UnaryOp::Pos, other) => {
                        let sign = if *op == UnaryOp::Neg { '-' } else { '+' };
                        return Err(RuntimeError::Type(format!(
                            "bad operand type for unary {sign}: '{}'",
                            other.type_name()
                        )));
                    }
                }
            }
            Expr::Binary(op, lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                lhs.binary(*op, &rhs)?
            }
            Expr::Compare(first, rest) => {
                let mut left = self.eval(first)?;
                for (op, right) in rest {
                    let right = self.eval(right)?;
                    if !compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Value::Bool(true)
            }
            Expr::And(lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                if lhs.truthy() { self.eval(rhs)? } else { lhs }
            }
            Expr::Or(lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                if lhs.truthy() { lhs } else { self.eval(rhs)? }
            }
            Expr::Conditional { cond, then, orelse } => {
                if self.eval(cond)?.truthy() {
                    self.eval(then)?
                } else {
                    self.eval(orelse)?
                }
            }
        })
    }

    /// Builds a comprehension's list; the caller restores the scope.
    fn comprehension(
        &mut self,
        element: &Expr,
        targets: &[String],
        items: Vec<Value>,
        cond: Option<&Expr>,
    ) -> EvalResult<Vec<Value>> {
        let mut out = Vec::new();
        for item in items {
            self.bind(targets, item)?;
            if let Some(cond) = cond
                && !self.eval(cond)?.truthy()
            {
                continue;
            }
            out.push(self.eval(element)?);
        }
        Ok(out)
    }

    /// Evaluates a list of expressions.
    fn eval_all(&mut self, items: &[Expr]) -> EvalResult<Vec<Value>> {
        items.iter().map(|e| self.eval(e)).collect()
    }

    /// Evaluates call arguments.
    fn eval_args(&mut self, args: &[Arg]) -> EvalResult<CallArgs> {
        let mut out = CallArgs {
            positional: Vec::new(),
            keywords:   Vec::new(),
        };
        for arg in args {
            match arg {
                Arg::Positional(e) => out.positional.push(self.eval(e)?),
                Arg::Keyword(name, e) => out.keywords.push((name.clone(), self.eval(e)?)),
            }
        }
        Ok(out)
    }
}

/// Applies one comparison operator.
fn compare(op: CmpOp, left: &Value, right: &Value) -> EvalResult<bool> {
    use std::cmp::Ordering::{Greater, Less};

    Ok(match op {
        CmpOp::Eq => left.py_eq(right),
        CmpOp::NotEq => !left.py_eq(right),
        CmpOp::Lt => left.py_cmp(right, "<")? == Less,
        CmpOp::LtE => left.py_cmp(right, "<=")? != Greater,
        CmpOp::Gt => left.py_cmp(right, ">")? == Greater,
        CmpOp::GtE => left.py_cmp(right, ">=")? != Less,
        CmpOp::In => right.contains(left)?,
        CmpOp::NotIn => !right.contains(left)?,
        CmpOp::Is => left.py_is(right),
        CmpOp::IsNot => !left.py_is(right),
    })
}

/// Renders a value for an f-string replacement field.
fn format_spec(value: &Value, spec: Option<&str>) -> String {
    let precision = spec
        .and_then(|s| s.strip_prefix('.'))
        .and_then(|s| s.strip_suffix('f'))
        .and_then(|digits| digits.parse::<usize>().ok());
    match (precision, value) {
        (Some(p), Value::Float(x)) => format!("{x:.p$}"),
        (Some(p), Value::Int(i)) => format!("{:.p$}", *i as f64),
        _ => value.to_string(),
    }
}

/// Calls a callable value.
fn call(callee: Value, args: CallArgs) -> EvalResult<Value> {
    match callee {
        Value::Builtin(builtin) => call_builtin(builtin, args),
        Value::Method(receiver, name) => call_method(*receiver, &name, args),
        other => Err(RuntimeError::Type(format!(
            "'{}' object is not callable",
            other.type_name()
        ))),
    }
}

/// Items for `min`/`max`: one iterable argument, or several values.
fn extremum_items(func: &str, args: &CallArgs) -> EvalResult<Vec<Value>> {
    args.no_keywords(func)?;
    match args.positional.as_slice() {
        [] => Err(RuntimeError::Type(format!("{func} expected at least 1 argument, got 0"))),
        [single] => single.iterate(),
        many => Ok(many.to_vec()),
    }
}

/// Picks the smallest (or largest) item.
fn extremum(func: &str, items: Vec<Value>, want: std::cmp::Ordering) -> EvalResult<Value> {
    let mut iter = items.into_iter();
    let mut best = iter
        .next()
        .ok_or_else(|| RuntimeError::Value(format!("{func}() arg is an empty sequence")))?;
    for item in iter {
        if item.py_cmp(&best, if want.is_lt() { "<" } else { ">" })? == want {
            best = item;
        }
    }
    Ok(best)
}

/// Dispatches a builtin function.
fn call_builtin(builtin: Builtin, args: CallArgs) -> EvalResult<Value> {
    let name = builtin.name();
    match builtin {
        Builtin::Report => Ok(Value::None),
        Builtin::Print => {
            let sep = args
                .keyword("sep")
                .map(Value::to_string)
                .unwrap_or_else(|| " ".to_string());
            tracing::info!("{}", args.positional.iter().join(&sep));
            Ok(Value::None)
        }
        Builtin::Len => {
            args.no_keywords(name)?;
            args.arity(name, 1, 1)?;
            let len = args.positional[0].len()?;
            Ok(Value::Int(len as i64))
        }
        Builtin::Str => {
            args.no_keywords(name)?;
            args.arity(name, 0, 1)?;
            Ok(Value::Str(args.get(0).map(Value::to_string).unwrap_or_default()))
        }
        Builtin::Bool => {
            args.no_keywords(name)?;
            args.arity(name, 0, 1)?;
            Ok(Value::Bool(args.get(0).is_some_and(Value::truthy)))
        }
        Builtin::Int => {
            args.no_keywords(name)?;
            args.arity(name, 0, 1)?;
            match args.get(0) {
                None => Ok(Value::Int(0)),
                Some(Value::Int(i)) => Ok(Value::Int(*i)),
                Some(Value::Bool(b)) => Ok(Value::Int(i64::from(*b))),
                Some(Value::Float(f)) if f.is_finite() => Ok(Value::Int(f.trunc() as i64)),
                Some(Value::Str(s)) => s.trim().parse().map(Value::Int).map_err(|_| {
                    RuntimeError::Value(format!(
                        "invalid literal for int() with base 10: {}",
                        Value::Str(s.clone()).repr()
                    ))
                }),
                Some(other) => Err(RuntimeError::Type(format!(
                    "int() argument must be a string or a number, not '{}'",
                    other.type_name()
                ))),
            }
        }
        Builtin::Float => {
            args.no_keywords(name)?;
            args.arity(name, 0, 1)?;
            match args.get(0) {
                None => Ok(Value::Float(0.0)),
                Some(Value::Int(i)) => Ok(Value::Float(*i as f64)),
                Some(Value::Bool(b)) => Ok(Value::Float(f64::from(u8::from(*b)))),
                Some(Value::Float(f)) => Ok(Value::Float(*f)),
                Some(Value::Str(s)) => s.trim().parse().map(Value::Float).map_err(|_| {
                    RuntimeError::Value(format!(
                        "could not convert string to float: {}",
                        Value::Str(s.clone()).repr()
                    ))
                }),
                Some(other) => Err(RuntimeError::Type(format!(
                    "float() argument must be a string or a real number, not '{}'",
                    other.type_name()
                ))),
            }
        }
        Builtin::List => {
            args.no_keywords(name)?;
            args.arity(name, 0, 1)?;
            match args.get(0) {
                None => Ok(Value::List(Vec::new())),
                Some(v) => Ok(Value::List(v.iterate()?)),
            }
        }
        Builtin::Sorted => {
            if let Some((key, _)) = args.keywords.iter().find(|(k, _)| k != "reverse") {
                return Err(RuntimeError::Type(format!(
                    "'{key}' is an invalid keyword argument for sort()"
                )));
            }
            args.arity(name, 1, 1)?;
            let mut items = args.positional[0].iterate()?;
            let mut failure = None;
            items.sort_by(|a, b| {
                a.py_cmp(b, "<").unwrap_or_else(|e| {
                    failure.get_or_insert(e);
                    std::cmp::Ordering::Equal
                })
            });
            if let Some(e) = failure {
                return Err(e);
            }
            if args.keyword("reverse").is_some_and(Value::truthy) {
                items.reverse();
            }
            Ok(Value::List(items))
        }
        Builtin::Min => extremum(name, extremum_items(name, &args)?, std::cmp::Ordering::Less),
        Builtin::Max => extremum(name, extremum_items(name, &args)?, std::cmp::Ordering::Greater),
        Builtin::Abs => {
            args.no_keywords(name)?;
            args.arity(name, 1, 1)?;
            match &args.positional[0] {
                Value::Int(i) => i.checked_abs().map(Value::Int).ok_or_else(|| {
                    RuntimeError::Value("integer result too large".to_string())
                }),
                Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
                Value::Float(f) => Ok(Value::Float(f.abs())),
                other => Err(RuntimeError::Type(format!(
                    "bad operand type for abs(): '{}'",
                    other.type_name()
                ))),
            }
        }
        Builtin::Any | Builtin::All => {
            args.no_keywords(name)?;
            args.arity(name, 1, 1)?;
            let items = args.positional[0].iterate()?;
            Ok(Value::Bool(if builtin == Builtin::Any {
                items.iter().any(Value::truthy)
            } else {
                items.iter().all(Value::truthy)
            }))
        }
    }
}

/// Expects a string argument.
fn str_arg<'a>(func: &str, value: Option<&'a Value>) -> EvalResult<&'a str> {
    match value {
        Some(Value::Str(s)) => Ok(s),
        Some(other) => Err(RuntimeError::Type(format!(
            "{func}() argument must be str, not {}",
            other.type_name()
        ))),
        None => Err(RuntimeError::Type(format!("{func}() missing required argument"))),
    }
}

/// Strips `chars` (or whitespace) from one or both ends.
fn strip(s: &str, chars: Option<&Value>, left: bool, right: bool) -> EvalResult<Value> {
    let set: Option<Vec<char>> = match chars {
        None | Some(Value::None) => None,
        Some(Value::Str(c)) => Some(c.chars().collect()),
        Some(other) => {
            return Err(RuntimeError::Type(format!(
                "strip arg must be None or str, not {}",
                other.type_name()
            )));
        }
    };
    let matches = |c: char| match &set {
        Some(set) => set.contains(&c),
        None => c.is_whitespace(),
    };
    let mut out = s;
    if left {
        out = out.trim_start_matches(matches);
    }
    if right {
        out = out.trim_end_matches(matches);
    }
    Ok(Value::Str(out.to_string()))
}

/// `prefix` may be one string or a tuple of strings.
fn affix_matches(
    func: &str,
    affix: Option<&Value>,
    test: impl Fn(&str) -> bool,
) -> EvalResult<Value> {
    match affix {
        Some(Value::Tuple(options)) => {
            for option in options {
                if test(str_arg(func, Some(option))?) {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        other => Ok(Value::Bool(test(str_arg(func, other)?))),
    }
}

/// Dispatches a method call on a value.
fn call_method(receiver: Value, name: &str, args: CallArgs) -> EvalResult<Value> {
    args.no_keywords(name)?;
    match (&receiver, name) {
        (Value::Str(s), "strip") => strip(s, args.get(0), true, true),
        (Value::Str(s), "lstrip") => strip(s, args.get(0), true, false),
        (Value::Str(s), "rstrip") => strip(s, args.get(0), false, true),
        (Value::Str(s), "lower") => Ok(Value::Str(s.to_lowercase())),
        (Value::Str(s), "upper") => Ok(Value::Str(s.to_uppercase())),
        (Value::Str(s), "isdigit") => Ok(Value::Bool(
            !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()),
        )),
        (Value::Str(s), "startswith") => affix_matches(name, args.get(0), |p| s.starts_with(p)),
        (Value::Str(s), "endswith") => affix_matches(name, args.get(0), |p| s.ends_with(p)),
        (Value::Str(s), "split") => {
            let parts: Vec<Value> = match args.get(0) {
                None | Some(Value::None) => s
                    .split_whitespace()
                    .map(|p| Value::Str(p.to_string()))
                    .collect(),
                sep => {
                    let sep = str_arg(name, sep)?;
                    if sep.is_empty() {
                        return Err(RuntimeError::Value("empty separator".to_string()));
                    }
                    s.split(sep).map(|p| Value::Str(p.to_string())).collect()
                }
            };
            Ok(Value::List(parts))
        }
        (Value::Str(s), "splitlines") => Ok(Value::List(
            s.lines().map(|l| Value::Str(l.to_string())).collect(),
        )),
        (Value::Str(s), "count") => {
            let needle = str_arg(name, args.get(0))?;
            let count = if needle.is_empty() {
                s.chars().count() + 1
            } else {
                s.matches(needle).count()
            };
            Ok(Value::Int(count as i64))
        }
        (Value::Str(s), "find") => {
            let needle = str_arg(name, args.get(0))?;
            Ok(Value::Int(match s.find(needle) {
                Some(byte) => s[..byte].chars().count() as i64,
                None => -1,
            }))
        }
        (Value::Str(s), "replace") => {
            let old = str_arg(name, args.get(0))?;
            let new = str_arg(name, args.get(1))?;
            Ok(Value::Str(s.replace(old, new)))
        }
        (Value::Str(s), "join") => {
            let items = args
                .get(0)
                .ok_or_else(|| RuntimeError::Type("join() takes exactly one argument".into()))?
                .iterate()?;
            let parts = items
                .iter()
                .map(|item| match item {
                    Value::Str(p) => Ok(p.as_str()),
                    other => Err(RuntimeError::Type(format!(
                        "sequence item: expected str instance, {} found",
                        other.type_name()
                    ))),
                })
                .collect::<EvalResult<Vec<_>>>()?;
            Ok(Value::Str(parts.join(s)))
        }
        (Value::Dict(entries), "get") => {
            let key = args
                .get(0)
                .ok_or_else(|| RuntimeError::Type("get expected at least 1 argument".into()))?;
            Ok(entries
                .iter()
                .find(|(k, _)| k.py_eq(key))
                .map(|(_, v)| v.clone())
                .unwrap_or_else(|| args.get(1).cloned().unwrap_or(Value::None)))
        }
        (Value::Dict(entries), "keys") => {
            Ok(Value::List(entries.iter().map(|(k, _)| k.clone()).collect()))
        }
        (Value::Dict(entries), "values") => {
            Ok(Value::List(entries.iter().map(|(_, v)| v.clone()).collect()))
        }
        (Value::Dict(entries), "items") => Ok(Value::List(
            entries
                .iter()
                .map(|(k, v)| Value::Tuple(vec![k.clone(), v.clone()]))
                .collect(),
        )),
        (Value::List(items) | Value::Tuple(items), "count") => {
            let needle = args
                .get(0)
                .ok_or_else(|| RuntimeError::Type("count() takes exactly one argument".into()))?;
            Ok(Value::Int(items.iter().filter(|v| v.py_eq(needle)).count() as i64))
        }
        (Value::List(items) | Value::Tuple(items), "index") => {
            let needle = args
                .get(0)
                .ok_or_else(|| RuntimeError::Type("index() takes exactly one argument".into()))?;
            items
                .iter()
                .position(|v| v.py_eq(needle))
                .map(|i| Value::Int(i as i64))
                .ok_or_else(|| RuntimeError::Value(format!("{} is not in list", needle.repr())))
        }
        _ => Err(RuntimeError::Attribute(format!(
            "'{}' object has no attribute '{name}'",
            receiver.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::parser::parse_program;

    fn run(source: &str) -> Result<Interpreter, RuntimeError> {
        let mut interp = Interpreter::new(BTreeMap::new());
        interp.run(&parse_program(source)?)?;
        Ok(interp)
    }

    fn var(interp: &Interpreter, name: &str) -> String {
        interp.variable(name).expect("variable is bound").repr()
    }

    #[test]
    fn loops_and_unpacking() {
        let interp = run("total = 0\nfor k, v in {'a': 1, 'b': 2}.items():\n    total += v\n")
            .expect("program runs");
        assert_eq!(var(&interp, "total"), "3");
        assert_eq!(var(&interp, "k"), "'b'");
    }

    #[test]
    fn comprehension_variables_stay_local() {
        let interp = run("xs = [i * 2 for i in [1, 2, 3] if i > 1]")
            .expect("program runs");
        assert_eq!(var(&interp, "xs"), "[4, 6]");
        assert!(interp.variable("i").is_none());
    }

    #[test]
    fn short_circuit_returns_operands() {
        let interp = run("a = 0 or 'x'\nb = [] and missing\nc = 1 < 2 <= 2 != 3").expect("program runs");
        assert_eq!(var(&interp, "a"), "'x'");
        assert_eq!(var(&interp, "b"), "[]");
        assert_eq!(var(&interp, "c"), "True");
    }

    #[test]
    fn failed_assert_carries_message() {
        let err = run("x = 2\nassert x == 3, f'x was {x}'").expect_err("assert fails");
        assert_eq!(err, RuntimeError::Assertion(Some("x was 2".to_string())));
        assert_eq!(err.to_string(), "AssertionError: x was 2");
    }

    #[test]
    fn unknown_names_raise_name_error() {
        let err = run("open('/etc/passwd')").expect_err("open is not available");
        assert_eq!(err, RuntimeError::Name("open".to_string()));
    }

    #[test]
    fn builtins_and_methods() {
        let interp = run(concat!(
            "s = ' Hello World '.strip().lower()\n",
            "words = sorted(s.split(), reverse=True)\n",
            "n = len(words) + int('4') + max(1, 7, 3)\n",
            "ok = all([s.startswith('hello'), 'world' in s, not any([])])\n",
            "pct = f'{2 / 3:.2f}'\n",
        ))
        .expect("program runs");
        assert_eq!(var(&interp, "words"), "['world', 'hello']");
        assert_eq!(var(&interp, "n"), "13");
        assert_eq!(var(&interp, "ok"), "True");
        assert_eq!(var(&interp, "pct"), "'0.67'");
    }

    #[test]
    fn if_elif_else_picks_one_branch() {
        let interp = run("x = 5\nif x < 3:\n    y = 'small'\nelif x < 10:\n    y = 'medium'\nelse:\n    y = 'large'\n")
            .expect("program runs");
        assert_eq!(var(&interp, "y"), "'medium'");
    }

    #[test]
    fn integer_overflow_raises_instead_of_panicking() {
        for program in [
            "x = -9223372036854775807 - 1\ny = x // -1",
            "x = -9223372036854775807 - 1\ny = x % -1",
            "x = -9223372036854775807 - 1\ny = abs(x)",
            "s = 'ab' * 9223372036854775807",
        ] {
            let err = run(program).expect_err("overflow is an error");
            assert!(matches!(err, RuntimeError::Value(_)), "{program}: {err}");
        }
    }

    #[test]
    fn one_line_blocks_and_percent_formatting() {
        let interp = run(concat!(
            "n = 3\n",
            "if n > 2: msg = 'got %d items' % n\n",
            "else: msg = 'few'\n",
            "for i in [1, 2]: n += i\n",
        ))
        .expect("program runs");
        assert_eq!(var(&interp, "msg"), "'got 3 items'");
        assert_eq!(var(&interp, "n"), "6");
    }
}
