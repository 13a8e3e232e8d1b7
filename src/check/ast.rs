#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `//`
    FloorDiv,
    /// `%`
    Mod,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `+x`
    Pos,
    /// `not x`
    Not,
}

/// Comparison operators; a chain like `a < b <= c` holds several.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtE,
    /// `>`
    Gt,
    /// `>=`
    GtE,
    /// `in`
    In,
    /// `not in`
    NotIn,
    /// `is`
    Is,
    /// `is not`
    IsNot,
}

/// Piece of an f-string.
#[derive(Debug, Clone, PartialEq)]
pub enum FPart {
    /// Literal text.
    Lit(String),
    /// `{expr}` or `{expr:spec}`
    Expr(Expr, Option<String>),
}

/// Call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// `f(x)`
    Positional(Expr),
    /// `f(name=x)`
    Keyword(String, Expr),
}

/// Expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `None`
    None,
    /// `True` / `False`
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    Str(String),
    /// f-string.
    FStr(Vec<FPart>),
    /// `[a, b]`
    List(Vec<Expr>),
    /// `(a, b)` or a bare `a, b`.
    Tuple(Vec<Expr>),
    /// `{k: v}`
    Dict(Vec<(Expr, Expr)>),
    /// `[elt for targets in iter if cond]`, also used for generator
    /// arguments.
    Comp {
        /// Produced element.
        element: Box<Expr>,
        /// Loop variables.
        targets: Vec<String>,
        /// Iterable.
        iter:    Box<Expr>,
        /// Optional filter.
        cond:    Option<Box<Expr>>,
    },
    /// Variable reference.
    Name(String),
    /// `x.attr`
    Attr(Box<Expr>, String),
    /// `x[i]`
    Index(Box<Expr>, Box<Expr>),
    /// `x[lo:hi]`
    Slice(Box<Expr>, Option<Box<Expr>>, Option<Box<Expr>>),
    /// `f(args)`
    Call(Box<Expr>, Vec<Arg>),
    /// Unary operation.
    Unary(UnaryOp, Box<Expr>),
    /// Arithmetic.
    Binary(BinOp, Box<Expr>, Box<Expr>),
    /// Comparison chain.
    Compare(Box<Expr>, Vec<(CmpOp, Expr)>),
    /// Short-circuit `and`.
    And(Box<Expr>, Box<Expr>),
    /// Short-circuit `or`.
    Or(Box<Expr>, Box<Expr>),
    /// `a if cond else b`
    Conditional {
        /// Tested condition.
        cond: Box<Expr>,
        /// Value when true.
        then: Box<Expr>,
        /// Value when false.
        orelse: Box<Expr>,
    },
}

/// Postfix operation applied to a primary expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Trailer {
    /// `.name`
    Attr(String),
    /// `(args)`
    Call(Vec<Arg>),
    /// `[index]`
    Index(Expr),
    /// `[lo:hi]`
    Slice(Option<Expr>, Option<Expr>),
}

impl Trailer {
    /// Wraps `target` in this trailer.
    pub fn apply(self, target: Expr) -> Expr {
        let target = Box::new(target);
        match self {
            Trailer::Attr(name) => Expr::Attr(target, name),
            Trailer::Call(args) => Expr::Call(target, args),
            Trailer::Index(index) => Expr::Index(target, Box::new(index)),
            Trailer::Slice(lo, hi) => Expr::Slice(target, lo.map(Box::new), hi.map(Box::new)),
        }
    }
}

/// Statements.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Expression evaluated for its effect.
    Expr(Expr),
    /// `assert test, msg`
    Assert {
        /// Condition that must be truthy.
        test: Expr,
        /// Message evaluated only on failure.
        msg:  Option<Expr>,
    },
    /// `a = x` or `a, b = x`
    Assign {
        /// Names bound, more than one means unpacking.
        targets: Vec<String>,
        /// Assigned value.
        value:   Expr,
    },
    /// `a += x` and friends.
    AugAssign {
        /// Updated name.
        target: String,
        /// Operator.
        op:     BinOp,
        /// Right-hand side.
        value:  Expr,
    },
    /// `pass`
    Pass,
    /// `if`/`elif`/`else`
    If {
        /// Condition and body for `if` and every `elif`.
        branches: Vec<(Expr, Vec<Stmt>)>,
        /// `else` body, possibly empty.
        orelse:   Vec<Stmt>,
    },
    /// `for targets in iter:`
    For {
        /// Loop variables.
        targets: Vec<String>,
        /// Iterable.
        iter:    Expr,
        /// Loop body.
        body:    Vec<Stmt>,
    },
}

/// One parsed logical line, before indentation is resolved into blocks.
///
/// Header lines carry the statements written after their colon; the list is
/// empty when the body is an indented block.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// Simple statements separated by `;`.
    Simple(Vec<Stmt>),
    /// `if cond:`
    If(Expr, Vec<Stmt>),
    /// `elif cond:`
    Elif(Expr, Vec<Stmt>),
    /// `else:`
    Else(Vec<Stmt>),
    /// `for targets in iter:`
    For(Vec<String>, Expr, Vec<Stmt>),
}
