#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{cmp::Ordering, collections::BTreeMap, fmt, rc::Rc};

use itertools::Itertools;

use super::ast::BinOp;

/// Errors raised by check code, named after the Python exceptions they
/// mirror.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Code outside the supported language subset.
    #[error("SyntaxError: {message} (line {line})")]
    Syntax {
        /// 1-based line of the offending statement.
        line:    usize,
        /// What went wrong.
        message: String,
    },
    /// A failed `assert`.
    #[error("AssertionError{}", .0.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Assertion(Option<String>),
    /// Unbound name.
    #[error("NameError: name '{0}' is not defined")]
    Name(String),
    /// Missing attribute.
    #[error("AttributeError: {0}")]
    Attribute(String),
    /// Missing dict key.
    #[error("KeyError: {0}")]
    Key(String),
    /// Sequence index out of range.
    #[error("IndexError: {0}")]
    Index(String),
    /// Operation applied to the wrong kind of value.
    #[error("TypeError: {0}")]
    Type(String),
    /// Right type, wrong value.
    #[error("ValueError: {0}")]
    Value(String),
    /// Division or modulo by zero.
    #[error("ZeroDivisionError: {0}")]
    ZeroDivision(String),
}

/// Shorthand for fallible evaluation.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// Built-in callables available to check code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// Accepts anything, does nothing.
    Report,
    /// Writes its arguments to the log.
    Print,
    /// `len(x)`
    Len,
    /// `str(x)`
    Str,
    /// `int(x)`
    Int,
    /// `float(x)`
    Float,
    /// `bool(x)`
    Bool,
    /// `list(x)`
    List,
    /// `sorted(x, reverse=False)`
    Sorted,
    /// `min(...)`
    Min,
    /// `max(...)`
    Max,
    /// `abs(x)`
    Abs,
    /// `any(x)`
    Any,
    /// `all(x)`
    All,
}

impl Builtin {
    /// Looks a builtin up by name. `report` is not here; it only exists
    /// when bound into the namespace.
    pub fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "print" => Self::Print,
            "len" => Self::Len,
            "str" => Self::Str,
            "int" => Self::Int,
            "float" => Self::Float,
            "bool" => Self::Bool,
            "list" => Self::List,
            "sorted" => Self::Sorted,
            "min" => Self::Min,
            "max" => Self::Max,
            "abs" => Self::Abs,
            "any" => Self::Any,
            "all" => Self::All,
            _ => return None,
        })
    }

    /// Python-visible name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Print => "print",
            Self::Len => "len",
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::List => "list",
            Self::Sorted => "sorted",
            Self::Min => "min",
            Self::Max => "max",
            Self::Abs => "abs",
            Self::Any => "any",
            Self::All => "all",
        }
    }
}

/// Runtime values.
#[derive(Debug, Clone)]
pub enum Value {
    /// `None`
    None,
    /// `True` / `False`
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// String.
    Str(String),
    /// List.
    List(Vec<Value>),
    /// Tuple.
    Tuple(Vec<Value>),
    /// Dict with insertion-ordered entries.
    Dict(Vec<(Value, Value)>),
    /// Read-only attribute bag, like `types.SimpleNamespace`.
    Object(Rc<BTreeMap<String, Value>>),
    /// Built-in function.
    Builtin(Builtin),
    /// Method looked up on a value, waiting to be called.
    Method(Box<Value>, String),
}

/// Numeric view of a value, with `bool` counting as an integer.
#[derive(Debug, Clone, Copy)]
enum Num {
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
}

impl Num {
    /// Widens to float.
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Dict(
                map.into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Value {
    /// Builds a read-only object from attribute pairs.
    pub fn object<I, K>(attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Object(Rc::new(
            attrs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Python type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Object(_) => "types.SimpleNamespace",
            Value::Builtin(_) => "builtin_function_or_method",
            Value::Method(..) => "method",
        }
    }

    /// Python truthiness.
    pub fn truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) | Value::Tuple(items) => !items.is_empty(),
            Value::Dict(entries) => !entries.is_empty(),
            Value::Object(_) | Value::Builtin(_) | Value::Method(..) => true,
        }
    }

    /// Numeric view, if any.
    fn num(&self) -> Option<Num> {
        match self {
            Value::Bool(b) => Some(Num::Int(i64::from(*b))),
            Value::Int(i) => Some(Num::Int(*i)),
            Value::Float(f) => Some(Num::Float(*f)),
            _ => None,
        }
    }

    /// `==`
    pub fn py_eq(&self, other: &Value) -> bool {
        if let (Some(a), Some(b)) = (self.num(), other.num()) {
            return match (a, b) {
                (Num::Int(a), Num::Int(b)) => a == b,
                (a, b) => a.as_f64() == b.as_f64(),
            };
        }
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.py_eq(y))
            }
            (Value::Dict(a), Value::Dict(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| {
                        b.iter()
                            .find(|(k2, _)| k.py_eq(k2))
                            .is_some_and(|(_, v2)| v.py_eq(v2))
                    })
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|v2| v.py_eq(v2)))
            }
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }

    /// `is`; identity is only observable for singletons here.
    pub fn py_is(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Ordering for `<`, `<=`, `>`, `>=`, `sorted`, `min`, `max`.
    pub fn py_cmp(&self, other: &Value, op: &str) -> EvalResult<Ordering> {
        if let (Some(a), Some(b)) = (self.num(), other.num()) {
            let ord = match (a, b) {
                (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
                (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
            };
            // NaN orders as equal.
            return Ok(ord.unwrap_or(Ordering::Equal));
        }
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
                for (x, y) in a.iter().zip(b) {
                    if !x.py_eq(y) {
                        return x.py_cmp(y, op);
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            _ => Err(RuntimeError::Type(format!(
                "'{op}' not supported between instances of '{}' and '{}'",
                self.type_name(),
                other.type_name()
            ))),
        }
    }

    /// `needle in self`
    pub fn contains(&self, needle: &Value) -> EvalResult<bool> {
        match self {
            Value::Str(haystack) => match needle {
                Value::Str(n) => Ok(haystack.contains(n.as_str())),
                other => Err(RuntimeError::Type(format!(
                    "'in <string>' requires string as left operand, not {}",
                    other.type_name()
                ))),
            },
            Value::List(items) | Value::Tuple(items) => Ok(items.iter().any(|v| v.py_eq(needle))),
            Value::Dict(entries) => Ok(entries.iter().any(|(k, _)| k.py_eq(needle))),
            other => Err(RuntimeError::Type(format!(
                "argument of type '{}' is not iterable",
                other.type_name()
            ))),
        }
    }

    /// Items produced by iterating over the value.
    pub fn iterate(&self) -> EvalResult<Vec<Value>> {
        match self {
            Value::List(items) | Value::Tuple(items) => Ok(items.clone()),
            Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
            Value::Dict(entries) => Ok(entries.iter().map(|(k, _)| k.clone()).collect()),
            other => Err(RuntimeError::Type(format!(
                "'{}' object is not iterable",
                other.type_name()
            ))),
        }
    }

    /// `len(x)`
    pub fn len(&self) -> EvalResult<usize> {
        match self {
            Value::Str(s) => Ok(s.chars().count()),
            Value::List(items) | Value::Tuple(items) => Ok(items.len()),
            Value::Dict(entries) => Ok(entries.len()),
            other => Err(RuntimeError::Type(format!(
                "object of type '{}' has no len()",
                other.type_name()
            ))),
        }
    }

    /// `self[index]`
    pub fn get_item(&self, index: &Value) -> EvalResult<Value> {
        match self {
            Value::List(items) | Value::Tuple(items) => {
                let i = seq_index(index, items.len(), self.type_name())?;
                Ok(items[i].clone())
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let i = seq_index(index, chars.len(), "string")?;
                Ok(Value::Str(chars[i].to_string()))
            }
            Value::Dict(entries) => entries
                .iter()
                .find(|(k, _)| k.py_eq(index))
                .map(|(_, v)| v.clone())
                .ok_or_else(|| RuntimeError::Key(index.repr())),
            other => Err(RuntimeError::Type(format!(
                "'{}' object is not subscriptable",
                other.type_name()
            ))),
        }
    }

    /// `self[lo:hi]`
    pub fn slice(&self, lo: Option<&Value>, hi: Option<&Value>) -> EvalResult<Value> {
        /// Resolves one slice bound, clamping like Python.
        fn bound(v: Option<&Value>, len: usize, default: usize) -> EvalResult<usize> {
            match v {
                None | Some(Value::None) => Ok(default),
                Some(v) => match v.num() {
                    Some(Num::Int(i)) => {
                        let len = len as i64;
                        let i = if i < 0 { (len + i).max(0) } else { i.min(len) };
                        Ok(i as usize)
                    }
                    _ => Err(RuntimeError::Type(
                        "slice indices must be integers or None".to_string(),
                    )),
                },
            }
        }

        match self {
            Value::List(items) | Value::Tuple(items) => {
                let start = bound(lo, items.len(), 0)?;
                let end = bound(hi, items.len(), items.len())?.max(start);
                let part = items[start..end].to_vec();
                Ok(if matches!(self, Value::List(_)) {
                    Value::List(part)
                } else {
                    Value::Tuple(part)
                })
            }
            Value::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                let start = bound(lo, chars.len(), 0)?;
                let end = bound(hi, chars.len(), chars.len())?.max(start);
                Ok(Value::Str(chars[start..end].iter().collect()))
            }
            other => Err(RuntimeError::Type(format!(
                "'{}' object is not subscriptable",
                other.type_name()
            ))),
        }
    }

    /// `self.name`, without calling.
    pub fn get_attr(&self, name: &str) -> EvalResult<Value> {
        if let Value::Object(attrs) = self {
            return attrs.get(name).cloned().ok_or_else(|| {
                RuntimeError::Attribute(format!(
                    "'types.SimpleNamespace' object has no attribute '{name}'"
                ))
            });
        }
        if has_method(self, name) {
            return Ok(Value::Method(Box::new(self.clone()), name.to_string()));
        }
        Err(RuntimeError::Attribute(format!(
            "'{}' object has no attribute '{name}'",
            self.type_name()
        )))
    }

    /// Arithmetic.
    pub fn binary(&self, op: BinOp, rhs: &Value) -> EvalResult<Value> {
        if let (Some(a), Some(b)) = (self.num(), rhs.num()) {
            return numeric(op, a, b);
        }
        match (op, self, rhs) {
            (BinOp::Add, Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            (BinOp::Add, Value::List(a), Value::List(b)) => {
                Ok(Value::List(a.iter().chain(b).cloned().collect()))
            }
            (BinOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
                Ok(Value::Tuple(a.iter().chain(b).cloned().collect()))
            }
            (BinOp::Mod, Value::Str(template), args) => percent_format(template, args),
            (BinOp::Mul, Value::Str(s), n) | (BinOp::Mul, n, Value::Str(s))
                if matches!(n.num(), Some(Num::Int(_))) =>
            {
                let count = repeat_count(n, s.len())?;
                Ok(Value::Str(s.repeat(count)))
            }
            (BinOp::Mul, Value::List(items), n) | (BinOp::Mul, n, Value::List(items))
                if matches!(n.num(), Some(Num::Int(_))) =>
            {
                let count = repeat_count(n, items.len())?;
                Ok(Value::List(
                    std::iter::repeat_n(items.iter().cloned(), count)
                        .flatten()
                        .collect(),
                ))
            }
            _ => Err(RuntimeError::Type(format!(
                "unsupported operand type(s) for {}: '{}' and '{}'",
                op_symbol(op),
                self.type_name(),
                rhs.type_name()
            ))),
        }
    }

    /// `repr(x)`
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => {
                let escaped = s
                    .replace('\\', "\\\\")
                    .replace('\'', "\\'")
                    .replace('\n', "\\n")
                    .replace('\t', "\\t");
                format!("'{escaped}'")
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    /// `str(x)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{}", float_repr(*x)),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => write!(f, "[{}]", items.iter().map(Value::repr).join(", ")),
            Value::Tuple(items) if items.len() == 1 => write!(f, "({},)", items[0].repr()),
            Value::Tuple(items) => write!(f, "({})", items.iter().map(Value::repr).join(", ")),
            Value::Dict(entries) => write!(
                f,
                "{{{}}}",
                entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.repr(), v.repr()))
                    .join(", ")
            ),
            Value::Object(attrs) => write!(
                f,
                "namespace({})",
                attrs
                    .iter()
                    .map(|(k, v)| format!("{k}={}", v.repr()))
                    .join(", ")
            ),
            Value::Builtin(b) => write!(f, "<built-in function {}>", b.name()),
            Value::Method(recv, name) => {
                write!(f, "<built-in method {name} of {} object>", recv.type_name())
            }
        }
    }
}

/// Python's float formatting: integral values keep a `.0`.
pub fn float_repr(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x.is_infinite() {
        (if x > 0.0 { "inf" } else { "-inf" }).to_string()
    } else if x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

/// Operator spelling for error messages.
fn op_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::FloorDiv => "//",
        BinOp::Mod => "%",
    }
}

/// printf-style `str % args` with the `%s %r %d %i %f %%` conversions.
fn percent_format(template: &str, args: &Value) -> EvalResult<Value> {
    let mut args = match args {
        Value::Tuple(items) => items.iter().collect::<Vec<_>>(),
        other => vec![other],
    }
    .into_iter();
    let mut out = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut precision = None;
        if chars.next_if_eq(&'.').is_some() {
            let mut digits = String::new();
            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                digits.push(d);
            }
            precision = Some(digits.parse::<usize>().unwrap_or(0));
        }
        let conversion = chars
            .next()
            .ok_or_else(|| RuntimeError::Value("incomplete format".to_string()))?;
        if conversion == '%' {
            out.push('%');
            continue;
        }
        let arg = args.next().ok_or_else(|| {
            RuntimeError::Type("not enough arguments for format string".to_string())
        })?;
        match (conversion, arg.num()) {
            ('s', _) => out.push_str(&arg.to_string()),
            ('r', _) => out.push_str(&arg.repr()),
            ('d' | 'i', Some(Num::Int(i))) => out.push_str(&i.to_string()),
            ('d' | 'i', Some(Num::Float(x))) => out.push_str(&format!("{}", x.trunc())),
            ('f', Some(n)) => out.push_str(&format!("{:.*}", precision.unwrap_or(6), n.as_f64())),
            ('d' | 'i' | 'f', None) => {
                return Err(RuntimeError::Type(format!(
                    "%{conversion} format: a real number is required, not {}",
                    arg.type_name()
                )));
            }
            (other, _) => {
                return Err(RuntimeError::Value(format!(
                    "unsupported format character '{other}'"
                )));
            }
        }
    }

    if args.next().is_some() {
        return Err(RuntimeError::Type(
            "not all arguments converted during string formatting".to_string(),
        ));
    }
    Ok(Value::Str(out))
}

/// Longest string or list that `*` repetition may build.
const MAX_REPEAT_LEN: usize = 1 << 24;

/// Non-negative repetition count for `str * int` and `list * int`.
fn repeat_count(n: &Value, len: usize) -> EvalResult<usize> {
    let count = match n.num() {
        Some(Num::Int(i)) if i > 0 => usize::try_from(i).unwrap_or(usize::MAX),
        _ => return Ok(0),
    };
    match len.checked_mul(count) {
        Some(total) if total <= MAX_REPEAT_LEN => Ok(count),
        _ => Err(RuntimeError::Value("repeated sequence is too large".to_string())),
    }
}

/// Numeric arithmetic with Python's int/float rules.
fn numeric(op: BinOp, a: Num, b: Num) -> EvalResult<Value> {
    let overflow = || RuntimeError::Value("integer result too large".to_string());
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => match op {
            BinOp::Add => x.checked_add(y).map(Value::Int).ok_or_else(overflow),
            BinOp::Sub => x.checked_sub(y).map(Value::Int).ok_or_else(overflow),
            BinOp::Mul => x.checked_mul(y).map(Value::Int).ok_or_else(overflow),
            BinOp::Div if y == 0 => Err(RuntimeError::ZeroDivision("division by zero".into())),
            BinOp::Div => Ok(Value::Float(x as f64 / y as f64)),
            BinOp::FloorDiv | BinOp::Mod if y == 0 => Err(RuntimeError::ZeroDivision(
                "integer division or modulo by zero".into(),
            )),
            BinOp::FloorDiv => {
                let q = x.checked_div(y).ok_or_else(overflow)?;
                let r = x.checked_rem(y).ok_or_else(overflow)?;
                Ok(Value::Int(if r != 0 && ((x < 0) != (y < 0)) { q - 1 } else { q }))
            }
            BinOp::Mod => {
                let r = x.checked_rem(y).ok_or_else(overflow)?;
                Ok(Value::Int(if r != 0 && ((r < 0) != (y < 0)) { r + y } else { r }))
            }
        },
        (a, b) => {
            let (x, y) = (a.as_f64(), b.as_f64());
            match op {
                BinOp::Add => Ok(Value::Float(x + y)),
                BinOp::Sub => Ok(Value::Float(x - y)),
                BinOp::Mul => Ok(Value::Float(x * y)),
                BinOp::Div | BinOp::FloorDiv | BinOp::Mod if y == 0.0 => {
                    Err(RuntimeError::ZeroDivision("float division by zero".into()))
                }
                BinOp::Div => Ok(Value::Float(x / y)),
                BinOp::FloorDiv => Ok(Value::Float((x / y).floor())),
                BinOp::Mod => {
                    let r = x % y;
                    Ok(Value::Float(if r != 0.0 && ((r < 0.0) != (y < 0.0)) { r + y } else { r }))
                }
            }
        }
    }
}

/// Resolves a possibly negative sequence index.
fn seq_index(index: &Value, len: usize, kind: &str) -> EvalResult<usize> {
    let i = match index.num() {
        Some(Num::Int(i)) => i,
        _ => {
            return Err(RuntimeError::Type(format!(
                "{kind} indices must be integers, not {}",
                index.type_name()
            )));
        }
    };
    let resolved = if i < 0 { len as i64 + i } else { i };
    if resolved < 0 || resolved >= len as i64 {
        return Err(RuntimeError::Index(format!("{kind} index out of range")));
    }
    Ok(resolved as usize)
}

/// Whether `value.name(...)` is a supported method.
fn has_method(value: &Value, name: &str) -> bool {
    match value {
        Value::Str(_) => matches!(
            name,
            "strip"
                | "lstrip"
                | "rstrip"
                | "lower"
                | "upper"
                | "startswith"
                | "endswith"
                | "split"
                | "splitlines"
                | "count"
                | "find"
                | "replace"
                | "join"
                | "isdigit"
        ),
        Value::Dict(_) => matches!(name, "get" | "keys" | "values" | "items"),
        Value::List(_) | Value::Tuple(_) => matches!(name, "count" | "index"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_objects_become_dicts() {
        let v = Value::from(serde_json::json!({"passed": true, "score": 1.5, "n": 2}));
        assert!(v.get_item(&Value::Str("passed".into())).unwrap().truthy());
        assert_eq!(v.get_item(&Value::Str("n".into())).unwrap().to_string(), "2");
        assert!(matches!(
            v.get_item(&Value::Str("missing".into())),
            Err(RuntimeError::Key(k)) if k == "'missing'"
        ));
    }

    #[test]
    fn python_style_rendering() {
        let v = Value::List(vec![Value::Str("a".into()), Value::Float(2.0), Value::None]);
        assert_eq!(v.to_string(), "['a', 2.0, None]");
        assert_eq!(Value::Tuple(vec![Value::Int(1)]).to_string(), "(1,)");
    }

    #[test]
    fn floor_division_and_modulo_round_toward_negative_infinity() {
        let r = Value::Int(-7).binary(BinOp::FloorDiv, &Value::Int(2)).unwrap();
        assert!(r.py_eq(&Value::Int(-4)));
        let r = Value::Int(-7).binary(BinOp::Mod, &Value::Int(2)).unwrap();
        assert!(r.py_eq(&Value::Int(1)));
    }

    #[test]
    fn integer_overflow_is_a_value_error() {
        for op in [BinOp::FloorDiv, BinOp::Mod] {
            let r = Value::Int(i64::MIN).binary(op, &Value::Int(-1));
            assert!(matches!(r, Err(RuntimeError::Value(_))), "{op:?}: {r:?}");
        }
        let r = Value::Int(i64::MIN).binary(BinOp::Sub, &Value::Int(1));
        assert!(matches!(r, Err(RuntimeError::Value(_))));
    }

    #[test]
    fn oversized_repetition_is_a_value_error() {
        let r = Value::Str("ab".into()).binary(BinOp::Mul, &Value::Int(i64::MAX));
        assert!(matches!(r, Err(RuntimeError::Value(_))));
        let r = Value::Int(1 << 40).binary(BinOp::Mul, &Value::List(vec![Value::None]));
        assert!(matches!(r, Err(RuntimeError::Value(_))));
        let r = Value::Str("ab".into()).binary(BinOp::Mul, &Value::Int(3)).unwrap();
        assert_eq!(r.to_string(), "ababab");
        let r = Value::List(vec![Value::Int(1)]).binary(BinOp::Mul, &Value::Int(-2)).unwrap();
        assert_eq!(r.to_string(), "[]");
    }

    #[test]
    fn percent_formatting() {
        let fmt = |template: &str, args: Value| {
            Value::Str(template.into()).binary(BinOp::Mod, &args)
        };
        let r = fmt("got %d of %s (%.1f%%)", Value::Tuple(vec![
            Value::Int(3),
            Value::Str("4".into()),
            Value::Float(75.0),
        ]))
        .unwrap();
        assert_eq!(r.to_string(), "got 3 of 4 (75.0%)");
        assert_eq!(fmt("%r", Value::Str("x".into())).unwrap().to_string(), "'x'");
        assert!(matches!(fmt("%d %d", Value::Int(1)), Err(RuntimeError::Type(_))));
        assert!(matches!(fmt("%d", Value::Tuple(vec![Value::Int(1), Value::Int(2)])), Err(RuntimeError::Type(_))));
        assert!(matches!(fmt("%d", Value::Str("x".into())), Err(RuntimeError::Type(_))));
    }
}
