#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Parser for check code: a small, Python-compatible statement language.

use super::{
    ast::{Arg, BinOp, CmpOp, Expr, FPart, Line, Stmt, Trailer, UnaryOp},
    value::RuntimeError,
};

/// Words that can never be identifiers.
const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "False", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "None",
    "nonlocal", "not", "or", "pass", "raise", "return", "True", "try", "while", "with", "yield",
];

/// Folds `first (op rest)*` into a left-leaning tree.
fn fold_left(first: Expr, rest: Vec<Expr>, make: fn(Box<Expr>, Box<Expr>) -> Expr) -> Expr {
    rest.into_iter()
        .fold(first, |acc, next| make(Box::new(acc), Box::new(next)))
}

/// Builds a binary arithmetic node.
fn bin(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary(op, Box::new(lhs), Box::new(rhs))
}

/// Builds a unary node.
fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Expr::Unary(op, Box::new(operand))
}

peg::parser! {
    /// Grammar for one logical line of check code.
    pub grammar check_parser() for str {
        /// whitespace; logical lines never contain newlines
        rule _() = quiet!{[' ' | '\t' | '\n' | '\r']*}

        /// trailing comment
        rule comment() = "#" [_]*

        /// first character of an identifier
        rule ident_start() = ['a'..='z' | 'A'..='Z' | '_']

        /// remaining characters of an identifier
        rule ident_char() = ['a'..='z' | 'A'..='Z' | '0'..='9' | '_']

        /// matches exactly the keyword `k`
        rule kw(k: &'static str)
            = w:$(ident_start() ident_char()*) {? if w == k { Ok(()) } else { Err(k) } }

        /// a non-keyword identifier
        rule ident() -> String
            = w:$(ident_start() ident_char()*)
            {? if KEYWORDS.contains(&w) { Err("identifier") } else { Ok(w.to_string()) } }

        /// one or more comma separated names, as bound by `=` and `for`
        rule targets() -> Vec<String>
            = t:(ident() ++ (_ "," _)) { t }

        /// parses a full logical line
        pub rule line() -> Line
            = _ l:(header() / simple()) _ comment()? ![_] { l }

        /// block-opening lines
        rule header() -> Line
            = kw("if") _ e:expr() _ ":" b:inline() { Line::If(e, b) }
            / kw("elif") _ e:expr() _ ":" b:inline() { Line::Elif(e, b) }
            / kw("else") _ ":" b:inline() { Line::Else(b) }
            / kw("for") _ t:targets() _ kw("in") _ e:expr_list() _ ":" b:inline()
            { Line::For(t, e, b) }

        /// statements after a header's colon, if any
        rule inline() -> Vec<Stmt>
            = _ s:suite()? { s.unwrap_or_default() }

        /// `stmt; stmt`
        rule suite() -> Vec<Stmt>
            = s:(simple_stmt() ++ (_ ";" _)) (_ ";")? { s }

        /// simple statements
        rule simple() -> Line
            = s:suite() { Line::Simple(s) }

        /// simple statement body
        rule simple_stmt() -> Stmt
            = kw("pass") { Stmt::Pass }
            / kw("assert") _ t:expr() m:(_ "," _ m:expr() { m })? { Stmt::Assert { test: t, msg: m } }
            / t:targets() _ "=" !"=" _ v:expr_list() { Stmt::Assign { targets: t, value: v } }
            / t:ident() _ op:aug_op() "=" _ v:expr() { Stmt::AugAssign { target: t, op, value: v } }
            / e:expr_list() { Stmt::Expr(e) }

        /// operator part of `+=` and friends
        rule aug_op() -> BinOp
            = "+" { BinOp::Add }
            / "-" { BinOp::Sub }
            / "*" { BinOp::Mul }
            / "//" { BinOp::FloorDiv }
            / "/" { BinOp::Div }
            / "%" { BinOp::Mod }

        /// `a, b, c` (a tuple) or a single expression
        rule expr_list() -> Expr
            = first:expr() rest:(_ "," _ e:expr() { e })* trailing:(_ "," { () })?
            {
                if rest.is_empty() && trailing.is_none() {
                    first
                } else {
                    let mut items = vec![first];
                    items.extend(rest);
                    Expr::Tuple(items)
                }
            }

        /// any expression, including `a if cond else b`
        pub rule expr() -> Expr
            = body:disjunction()
              tail:(_ kw("if") _ c:disjunction() _ kw("else") _ o:expr() { (c, o) })?
            {
                match tail {
                    Some((cond, orelse)) => Expr::Conditional {
                        cond:   Box::new(cond),
                        then:   Box::new(body),
                        orelse: Box::new(orelse),
                    },
                    None => body,
                }
            }

        /// `a or b`
        rule disjunction() -> Expr
            = first:conjunction() rest:(_ kw("or") _ e:conjunction() { e })*
            { fold_left(first, rest, Expr::Or) }

        /// `a and b`
        rule conjunction() -> Expr
            = first:inversion() rest:(_ kw("and") _ e:inversion() { e })*
            { fold_left(first, rest, Expr::And) }

        /// `not a`
        rule inversion() -> Expr
            = kw("not") _ e:inversion() { unary(UnaryOp::Not, e) }
            / comparison()

        /// comparison chains
        rule comparison() -> Expr
            = first:arith() rest:(_ op:cmp_op() _ e:arith() { (op, e) })*
            {
                if rest.is_empty() { first } else { Expr::Compare(Box::new(first), rest) }
            }

        /// comparison operators
        rule cmp_op() -> CmpOp
            = "==" { CmpOp::Eq }
            / "!=" { CmpOp::NotEq }
            / "<=" { CmpOp::LtE }
            / ">=" { CmpOp::GtE }
            / "<" { CmpOp::Lt }
            / ">" { CmpOp::Gt }
            / kw("not") _ kw("in") { CmpOp::NotIn }
            / kw("in") { CmpOp::In }
            / kw("is") _ kw("not") { CmpOp::IsNot }
            / kw("is") { CmpOp::Is }

        /// arithmetic with the usual precedence
        rule arith() -> Expr = precedence!{
            x:(@) _ "+" !"=" _ y:@ { bin(BinOp::Add, x, y) }
            x:(@) _ "-" !"=" _ y:@ { bin(BinOp::Sub, x, y) }
            --
            x:(@) _ "*" !['*' | '='] _ y:@ { bin(BinOp::Mul, x, y) }
            x:(@) _ "//" !"=" _ y:@ { bin(BinOp::FloorDiv, x, y) }
            x:(@) _ "/" !['/' | '='] _ y:@ { bin(BinOp::Div, x, y) }
            x:(@) _ "%" !"=" _ y:@ { bin(BinOp::Mod, x, y) }
            --
            "-" _ x:@ { unary(UnaryOp::Neg, x) }
            "+" _ x:@ { unary(UnaryOp::Pos, x) }
            --
            p:postfix() { p }
        }

        /// an atom followed by attribute, call, and subscript trailers
        #[cache]
        rule postfix() -> Expr
            = a:atom() t:trailer()* { t.into_iter().fold(a, |acc, t| t.apply(acc)) }

        /// `.name`, `(args)`, `[index]`, `[lo:hi]`
        rule trailer() -> Trailer
            = _ "." _ n:ident() { Trailer::Attr(n) }
            / _ "(" _ c:comprehension() _ ")" { Trailer::Call(vec![Arg::Positional(c)]) }
            / _ "(" _ args:(arg() ** (_ "," _)) _ ","? _ ")" { Trailer::Call(args) }
            / _ "[" _ lo:expr()? _ ":" _ hi:expr()? _ "]" { Trailer::Slice(lo, hi) }
            / _ "[" _ i:expr_list() _ "]" { Trailer::Index(i) }

        /// call argument
        rule arg() -> Arg
            = n:ident() _ "=" !"=" _ v:expr() { Arg::Keyword(n, v) }
            / e:expr() { Arg::Positional(e) }

        /// `elt for x in it if cond`
        rule comprehension() -> Expr
            = element:expr() _ kw("for") _ t:targets() _ kw("in") _ iter:disjunction()
              cond:(_ kw("if") _ c:disjunction() { c })?
            {
                Expr::Comp {
                    element: Box::new(element),
                    targets: t,
                    iter:    Box::new(iter),
                    cond:    cond.map(Box::new),
                }
            }

        /// literals, displays, names, parenthesised expressions
        #[cache]
        rule atom() -> Expr
            = kw("None") { Expr::None }
            / kw("True") { Expr::Bool(true) }
            / kw("False") { Expr::Bool(false) }
            / number()
            / string()
            / "(" _ ")" { Expr::Tuple(vec![]) }
            / "(" _ c:comprehension() _ ")" { c }
            / "(" _ e:expr_list() _ ")" { e }
            / "[" _ c:comprehension() _ "]" { c }
            / "[" _ items:(expr() ** (_ "," _)) _ ","? _ "]" { Expr::List(items) }
            / "{" _ items:(key_value() ** (_ "," _)) _ ","? _ "}" { Expr::Dict(items) }
            / n:ident() { Expr::Name(n) }

        /// `key: value` inside a dict display
        rule key_value() -> (Expr, Expr)
            = k:expr() _ ":" _ v:expr() { (k, v) }

        /// integer and float literals
        rule number() -> Expr
            = n:$(['0'..='9']+ ("." ['0'..='9']*)? (['e' | 'E'] ['+' | '-']? ['0'..='9']+)?) !ident_char()
            {?
                if n.contains(['.', 'e', 'E']) {
                    n.parse().map(Expr::Float).or(Err("float"))
                } else {
                    n.parse().map(Expr::Int).or(Err("integer"))
                }
            }

        /// string literals, plain, raw, or formatted
        rule string() -> Expr
            = ['f' | 'F'] "'" p:fpart('\'')* "'" { Expr::FStr(p) }
            / ['f' | 'F'] "\"" p:fpart('"')* "\"" { Expr::FStr(p) }
            / ['r' | 'R'] "'" s:$([c if c != '\'']*) "'" { Expr::Str(s.to_string()) }
            / ['r' | 'R'] "\"" s:$([c if c != '"']*) "\"" { Expr::Str(s.to_string()) }
            / "'" s:str_char('\'')* "'" { Expr::Str(s.concat()) }
            / "\"" s:str_char('"')* "\"" { Expr::Str(s.concat()) }

        /// one (possibly escaped) character of a string quoted with `q`
        rule str_char(q: char) -> String
            = "\\" e:escape() { e }
            / c:[c if c != q && c != '\\'] { c.to_string() }

        /// backslash escapes; unknown escapes keep their backslash
        rule escape() -> String
            = "n" { "\n".to_string() }
            / "t" { "\t".to_string() }
            / "r" { "\r".to_string() }
            / "0" { "\0".to_string() }
            / "\\" { "\\".to_string() }
            / "'" { "'".to_string() }
            / "\"" { "\"".to_string() }
            / c:[_] { format!("\\{c}") }

        /// piece of an f-string quoted with `q`
        rule fpart(q: char) -> FPart
            = "{{" { FPart::Lit("{".to_string()) }
            / "}}" { FPart::Lit("}".to_string()) }
            / "{" _ e:expr() _ ("!" ['r' | 's'])? _ spec:(":" s:$([c if c != '}']*) { s.to_string() })? "}"
            { FPart::Expr(e, spec) }
            / s:fstr_char(q)+ { FPart::Lit(s.concat()) }

        /// literal character inside an f-string
        rule fstr_char(q: char) -> String
            = "\\" e:escape() { e }
            / c:[c if c != q && c != '\\' && c != '{' && c != '}'] { c.to_string() }
    }
}

/// A logical line: physical lines joined across brackets and `\`
/// continuations, comments removed.
#[derive(Debug, Clone, PartialEq)]
struct LogicalLine {
    /// 1-based number of the first physical line.
    number: usize,
    /// Indentation width of the first physical line.
    indent: usize,
    /// Code with indentation and comments removed.
    text:   String,
}

/// Indentation width, tabs advancing to the next multiple of eight.
fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / 8 + 1) * 8,
            _ => break,
        }
    }
    width
}

/// Splits source into logical lines, skipping blank and comment-only ones.
fn logical_lines(source: &str) -> Vec<LogicalLine> {
    let mut out = Vec::new();
    let mut current: Option<LogicalLine> = None;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (idx, physical) in source.lines().enumerate() {
        let mut stripped = String::new();
        let mut escaped = false;
        let mut continued = false;
        let mut chars = physical.chars().peekable();

        while let Some(c) = chars.next() {
            if let Some(q) = quote {
                stripped.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '#' => break,
                '\'' | '"' => {
                    quote = Some(c);
                    stripped.push(c);
                }
                '(' | '[' | '{' => {
                    depth += 1;
                    stripped.push(c);
                }
                ')' | ']' | '}' => {
                    depth = depth.saturating_sub(1);
                    stripped.push(c);
                }
                '\\' if chars.peek().is_none() => continued = true,
                _ => stripped.push(c),
            }
        }
        // Strings never span physical lines.
        quote = None;

        match current.as_mut() {
            Some(line) => {
                line.text.push(' ');
                line.text.push_str(stripped.trim());
            }
            None => {
                if stripped.trim().is_empty() && depth == 0 && !continued {
                    continue;
                }
                current = Some(LogicalLine {
                    number: idx + 1,
                    indent: indent_width(physical),
                    text:   stripped.trim().to_string(),
                });
            }
        }

        if depth == 0 && !continued
            && let Some(line) = current.take()
        {
            out.push(line);
        }
    }

    out.extend(current);
    out
}

/// Parses one logical line.
fn parse_line(line: &LogicalLine) -> Result<(usize, usize, Line), RuntimeError> {
    check_parser::line(&line.text)
        .map(|parsed| (line.number, line.indent, parsed))
        .map_err(|e| RuntimeError::Syntax {
            line:    line.number,
            message: format!("expected {} in `{}`", e.expected, line.text),
        })
}

/// Parses check code into a statement list.
pub fn parse_program(source: &str) -> Result<Vec<Stmt>, RuntimeError> {
    let lines = logical_lines(source)
        .iter()
        .map(parse_line)
        .collect::<Result<Vec<_>, _>>()?;

    let mut pos = 0;
    let indent = lines.first().map(|(_, indent, _)| *indent).unwrap_or(0);
    let program = block(&lines, &mut pos, indent)?;
    match lines.get(pos) {
        None => Ok(program),
        Some((number, ..)) => Err(RuntimeError::Syntax {
            line:    *number,
            message: "unindent does not match any outer indentation level".to_string(),
        }),
    }
}

/// Parses statements at exactly `indent` until a shallower line.
fn block(
    lines: &[(usize, usize, Line)],
    pos: &mut usize,
    indent: usize,
) -> Result<Vec<Stmt>, RuntimeError> {
    let mut out = Vec::new();

    while let Some((number, line_indent, line)) = lines.get(*pos) {
        if *line_indent < indent {
            break;
        }
        if *line_indent > indent {
            return Err(RuntimeError::Syntax {
                line:    *number,
                message: "unexpected indent".to_string(),
            });
        }
        *pos += 1;

        match line.clone() {
            Line::Simple(stmts) => out.extend(stmts),
            Line::If(cond, inline) => {
                let mut branches = vec![(cond, body(lines, pos, indent, *number, inline)?)];
                let mut orelse = Vec::new();
                while let Some((number, line_indent, next)) = lines.get(*pos)
                    && *line_indent == indent
                {
                    match next {
                        Line::Elif(cond, inline) => {
                            *pos += 1;
                            let stmts = body(lines, pos, indent, *number, inline.clone())?;
                            branches.push((cond.clone(), stmts));
                        }
                        Line::Else(inline) => {
                            *pos += 1;
                            orelse = body(lines, pos, indent, *number, inline.clone())?;
                            break;
                        }
                        _ => break,
                    }
                }
                out.push(Stmt::If { branches, orelse });
            }
            Line::For(targets, iter, inline) => {
                let body = body(lines, pos, indent, *number, inline)?;
                out.push(Stmt::For {
                    targets,
                    iter,
                    body,
                });
            }
            Line::Elif(..) | Line::Else(_) => {
                return Err(RuntimeError::Syntax {
                    line:    *number,
                    message: "`elif`/`else` without a matching `if`".to_string(),
                });
            }
        }
    }

    Ok(out)
}

/// Parses the body of a header line: its inline statements, or else the
/// indented block that follows.
fn body(
    lines: &[(usize, usize, Line)],
    pos: &mut usize,
    parent_indent: usize,
    header_line: usize,
    inline: Vec<Stmt>,
) -> Result<Vec<Stmt>, RuntimeError> {
    if !inline.is_empty() {
        return Ok(inline);
    }
    match lines.get(*pos) {
        Some((_, indent, _)) if *indent > parent_indent => block(lines, pos, *indent),
        _ => Err(RuntimeError::Syntax {
            line:    header_line,
            message: "expected an indented block".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_and_backslashes_join_lines() {
        let lines = logical_lines("x = [1,\n     2]  # two\ny = 1 + \\\n  2\n\n# only a comment\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "x = [1, 2]");
        assert_eq!(lines[1].number, 3);
        assert_eq!(lines[1].text, "y = 1 + 2");
    }

    #[test]
    fn hash_inside_string_is_not_a_comment() {
        let lines = logical_lines("assert '#' in s  # real comment");
        assert_eq!(lines[0].text, "assert '#' in s");
    }

    #[test]
    fn nested_blocks_follow_indentation() {
        let program =
            parse_program("for k, v in d.items():\n    if v:\n        pass\n    else:\n        x = 1\ny = 2\n")
                .unwrap();
        assert_eq!(program.len(), 2);
        match &program[0] {
            Stmt::For { targets, body, .. } => {
                assert_eq!(targets, &vec!["k".to_string(), "v".to_string()]);
                assert!(matches!(&body[0], Stmt::If { orelse, .. } if orelse.len() == 1));
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn header_may_carry_its_body_on_the_same_line() {
        let program = parse_program("if x: y = 1; z = 2\nelse: pass\nfor i in xs: n += i\n").unwrap();
        assert_eq!(program.len(), 2);
        match &program[0] {
            Stmt::If { branches, orelse } => {
                assert_eq!(branches[0].1.len(), 2);
                assert_eq!(orelse, &vec![Stmt::Pass]);
            }
            other => panic!("unexpected statement {other:?}"),
        }
        assert!(matches!(&program[1], Stmt::For { body, .. } if body.len() == 1));
    }

    #[test]
    fn inline_body_rejects_a_following_indented_block() {
        let err = parse_program("if x: y = 1\n    z = 2\n").unwrap_err();
        assert!(matches!(err, RuntimeError::Syntax { line: 2, .. }));
    }

    #[test]
    fn missing_body_is_a_syntax_error() {
        let err = parse_program("if x:\ny = 1\n").unwrap_err();
        assert!(matches!(err, RuntimeError::Syntax { line: 1, .. }));
    }
}
