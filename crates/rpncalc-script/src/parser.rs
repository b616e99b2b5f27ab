//! Parser for script text.
//!
//! Expressions use recursive descent with precedence climbing for the
//! arithmetic operators. Operator precedence (highest to lowest):
//! - Calls, attribute access, subscripts
//! - Power: `**` (right associative, binds tighter than a unary minus on its left)
//! - Unary: `-`, `+`
//! - Multiplicative: `*`, `/`, `//`, `%`
//! - Additive: `+`, `-`
//! - Comparisons (chained): `==`, `!=`, `<`, `<=`, `>`, `>=`, `in`, `not in`
//! - `not`, `and`, `or`, `lambda`
//!
//! Statements are line based. A compound statement header (`def`, `if`,
//! `for`, `while`) takes either an inline body after its colon or an
//! indented block on the following lines.

use std::sync::Arc;

use crate::ast::{BinOp, CmpOp, Expr, FunctionDef, ImportNames, Param, Stmt, UnaryOp};
use crate::error::{EvalError, EvalResult};
use crate::lexer::{Token, tokenize};
use crate::value::Value;

const KEYWORDS: &[&str] = &[
    "and", "as", "break", "class", "continue", "def", "del", "elif", "else", "for", "from",
    "global", "if", "import", "in", "is", "lambda", "not", "or", "pass", "return", "while",
    "with", "yield",
];

fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Parse a single expression (the `eval` form).
pub fn parse_expression(source: &str) -> EvalResult<Expr> {
    let mut parser = Parser::new(tokenize(source.trim())?);
    let expr = parser.parse_expr_list()?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parse one or more statements (the `exec` form).
pub fn parse_program(source: &str) -> EvalResult<Vec<Stmt>> {
    let mut blocks = BlockParser::new(source);
    let base = match blocks.lines.first() {
        Some(line) => line.indent,
        None => return Ok(Vec::new()),
    };
    let stmts = blocks.parse_block(base)?;
    if blocks.pos < blocks.lines.len() {
        return Err(EvalError::syntax("unindent does not match any outer indentation level"));
    }
    Ok(stmts)
}

// ============================================================================
// Token-level parser
// ============================================================================

/// Deepest expression nesting the parser accepts.
const MAX_NESTING: usize = 100;

/// Parser state for one line of tokens.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Nested expressions currently being parsed.
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Run `parse` one nesting level deeper.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> EvalResult<T>) -> EvalResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(EvalError::syntax("too many nested parentheses"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Peek at the current token.
    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&Token::End)
    }

    /// Advance and return the current token.
    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, context: &str) -> EvalResult<()> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(EvalError::syntax(format!(
                "expected {} {}, found {}",
                describe(&token),
                context,
                describe(self.peek())
            )))
        }
    }

    fn expect_end(&self) -> EvalResult<()> {
        match self.peek() {
            Token::End => Ok(()),
            other => Err(EvalError::syntax(format!("unexpected {}", describe(other)))),
        }
    }

    fn at_end(&self) -> bool {
        matches!(self.peek(), Token::End)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Token::Name(n) if n == keyword)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> EvalResult<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(EvalError::syntax(format!(
                "expected '{}', found {}",
                keyword,
                describe(self.peek())
            )))
        }
    }

    fn expect_name(&mut self) -> EvalResult<String> {
        match self.advance() {
            Token::Name(n) if !is_keyword(&n) => Ok(n),
            other => Err(EvalError::syntax(format!(
                "expected a name, found {}",
                describe(&other)
            ))),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Parse an expression, collecting a bare comma list into a tuple.
    fn parse_expr_list(&mut self) -> EvalResult<Expr> {
        let first = self.parse_expr()?;
        if !matches!(self.peek(), Token::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if self.starts_expression() {
                items.push(self.parse_expr()?);
            } else {
                break;
            }
        }
        Ok(Expr::Tuple(items))
    }

    fn starts_expression(&self) -> bool {
        match self.peek() {
            Token::Int(_) | Token::Float(_) | Token::Str(_) => true,
            Token::Name(n) => !is_keyword(n) || matches!(n.as_str(), "not" | "lambda"),
            Token::Minus | Token::Plus | Token::LParen | Token::LBracket | Token::LBrace => true,
            _ => false,
        }
    }

    fn parse_expr(&mut self) -> EvalResult<Expr> {
        self.nested(Self::parse_test)
    }

    fn parse_test(&mut self) -> EvalResult<Expr> {
        if self.eat_keyword("lambda") {
            let params = self.parse_params(&Token::Colon)?;
            self.expect(Token::Colon, "after lambda parameters")?;
            let body = self.parse_expr()?;
            return Ok(Expr::Lambda(Arc::new(FunctionDef {
                name: "<lambda>".into(),
                params,
                body: vec![Stmt::Return(Some(body))],
            })));
        }
        self.parse_or()
    }

    fn parse_or(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_not()?;
        while self.eat_keyword("and") {
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> EvalResult<Expr> {
        if self.eat_keyword("not") {
            let operand = self.nested(Self::parse_not)?;
            return Ok(Expr::unary(UnaryOp::Not, operand));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> EvalResult<Expr> {
        let left = self.parse_arith(1)?;
        let mut links = Vec::new();
        loop {
            let op = match self.peek().clone() {
                Token::EqEq => CmpOp::Eq,
                Token::NotEq => CmpOp::NotEq,
                Token::Lt => CmpOp::Lt,
                Token::Le => CmpOp::Le,
                Token::Gt => CmpOp::Gt,
                Token::Ge => CmpOp::Ge,
                Token::Name(n) if n == "in" => CmpOp::In,
                Token::Name(n) if n == "not" && matches!(self.peek_at(1), Token::Name(m) if m == "in") => {
                    self.advance();
                    CmpOp::NotIn
                }
                Token::Name(n) if n == "is" => {
                    if matches!(self.peek_at(1), Token::Name(m) if m == "not") {
                        self.advance();
                        CmpOp::NotEq
                    } else {
                        CmpOp::Eq
                    }
                }
                _ => break,
            };
            self.advance();
            links.push((op, self.parse_arith(1)?));
        }
        if links.is_empty() {
            Ok(left)
        } else {
            Ok(Expr::Compare(Box::new(left), links))
        }
    }

    /// Parse additive and multiplicative operators with the given minimum precedence.
    fn parse_arith(&mut self, min_prec: u8) -> EvalResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::DoubleSlash => BinOp::FloorDiv,
                Token::Percent => BinOp::Mod,
                _ => break,
            };

            let prec = op.precedence();
            if prec < min_prec {
                break;
            }

            self.advance(); // consume operator

            let next_min_prec = if op.is_right_assoc() { prec } else { prec + 1 };
            let right = self.parse_arith(next_min_prec)?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> EvalResult<Expr> {
        if self.eat(&Token::Minus) {
            let operand = self.nested(Self::parse_unary)?;
            return Ok(match operand {
                Expr::Literal(Value::Int(n)) => Expr::Literal(Value::Int(-n)),
                Expr::Literal(Value::Float(f)) => Expr::Literal(Value::Float(-f)),
                other => Expr::unary(UnaryOp::Neg, other),
            });
        }
        if self.eat(&Token::Plus) {
            let operand = self.nested(Self::parse_unary)?;
            return Ok(Expr::unary(UnaryOp::Pos, operand));
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> EvalResult<Expr> {
        let base = self.parse_postfix()?;
        if self.eat(&Token::DoubleStar) {
            // The exponent may itself carry a sign: 2**-1.
            let exponent = self.nested(Self::parse_unary)?;
            return Ok(Expr::binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> EvalResult<Expr> {
        let mut expr = self.parse_atom()?;
        loop {
            match self.peek() {
                Token::LParen => {
                    self.advance();
                    let (args, keywords) = self.parse_call_args()?;
                    self.expect(Token::RParen, "after call arguments")?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        keywords,
                    };
                }
                Token::Dot => {
                    self.advance();
                    let attr = self.expect_name()?;
                    expr = Expr::Attribute(Box::new(expr), attr.into());
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_expr_list()?;
                    self.expect(Token::RBracket, "after subscript")?;
                    expr = Expr::Subscript(Box::new(expr), Box::new(index));
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Parse an atomic expression (literal, name, or bracketed form).
    fn parse_atom(&mut self) -> EvalResult<Expr> {
        match self.advance() {
            Token::Int(n) => Ok(Expr::Literal(Value::Int(n))),
            Token::Float(f) => Ok(Expr::Literal(Value::Float(f))),
            Token::Str(mut s) => {
                while let Token::Str(next) = self.peek() {
                    s.push_str(next);
                    self.advance();
                }
                Ok(Expr::Literal(Value::str(s)))
            }
            Token::Name(name) => match name.as_str() {
                "True" => Ok(Expr::Literal(Value::Bool(true))),
                "False" => Ok(Expr::Literal(Value::Bool(false))),
                "None" => Ok(Expr::Literal(Value::None)),
                n if is_keyword(n) => Err(EvalError::syntax(format!("unexpected keyword '{}'", n))),
                _ => Ok(Expr::Name(name.into())),
            },
            Token::LParen => {
                if self.eat(&Token::RParen) {
                    return Ok(Expr::Tuple(Vec::new()));
                }
                let first = self.parse_expr()?;
                if self.eat(&Token::RParen) {
                    return Ok(first);
                }
                let mut items = vec![first];
                while self.eat(&Token::Comma) {
                    if matches!(self.peek(), Token::RParen) {
                        break;
                    }
                    items.push(self.parse_expr()?);
                }
                self.expect(Token::RParen, "to close '('")?;
                Ok(Expr::Tuple(items))
            }
            Token::LBracket => {
                let items = self.parse_items(&Token::RBracket)?;
                self.expect(Token::RBracket, "to close '['")?;
                Ok(Expr::List(items))
            }
            Token::LBrace => self.parse_brace(),
            Token::End => Err(EvalError::syntax("unexpected end of input")),
            other => Err(EvalError::syntax(format!("unexpected {}", describe(&other)))),
        }
    }

    /// Parse a dict or set display after its opening brace.
    fn parse_brace(&mut self) -> EvalResult<Expr> {
        if self.eat(&Token::RBrace) {
            return Ok(Expr::Dict(Vec::new()));
        }
        let first = self.parse_expr()?;
        if self.eat(&Token::Colon) {
            let value = self.parse_expr()?;
            let mut entries = vec![(first, value)];
            while self.eat(&Token::Comma) {
                if matches!(self.peek(), Token::RBrace) {
                    break;
                }
                let key = self.parse_expr()?;
                self.expect(Token::Colon, "in dict display")?;
                entries.push((key, self.parse_expr()?));
            }
            self.expect(Token::RBrace, "to close '{'")?;
            return Ok(Expr::Dict(entries));
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if matches!(self.peek(), Token::RBrace) {
                break;
            }
            items.push(self.parse_expr()?);
        }
        self.expect(Token::RBrace, "to close '{'")?;
        Ok(Expr::Set(items))
    }

    /// Parse comma-separated expressions up to (not including) `close`.
    fn parse_items(&mut self, close: &Token) -> EvalResult<Vec<Expr>> {
        let mut items = Vec::new();
        while self.peek() != close {
            items.push(self.parse_expr()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(items)
    }

    /// Parse call arguments: positional expressions then `name=value` keywords.
    fn parse_call_args(&mut self) -> EvalResult<(Vec<Expr>, Vec<(String, Expr)>)> {
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        while !matches!(self.peek(), Token::RParen) {
            if let Token::Name(name) = self.peek().clone()
                && matches!(self.peek_at(1), Token::Assign)
            {
                self.advance();
                self.advance();
                keywords.push((name, self.parse_expr()?));
            } else if keywords.is_empty() {
                args.push(self.parse_expr()?);
            } else {
                return Err(EvalError::syntax(
                    "positional argument follows keyword argument",
                ));
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok((args, keywords))
    }

    /// Parse parameters up to (not including) `close`.
    fn parse_params(&mut self, close: &Token) -> EvalResult<Vec<Param>> {
        let mut params: Vec<Param> = Vec::new();
        while self.peek() != close {
            let name = self.expect_name()?;
            let default = if self.eat(&Token::Assign) {
                Some(self.parse_expr()?)
            } else if params.iter().any(|p| p.default.is_some()) {
                return Err(EvalError::syntax(
                    "non-default argument follows default argument",
                ));
            } else {
                None
            };
            params.push(Param {
                name: name.into(),
                default,
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(params)
    }

    // ========================================================================
    // Simple statements
    // ========================================================================

    /// Parse `;`-separated simple statements up to the end of the line.
    fn parse_simple_statements(&mut self) -> EvalResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            if self.at_end() {
                break;
            }
            stmts.push(self.parse_simple_statement()?);
            if !self.eat(&Token::Semicolon) {
                break;
            }
        }
        self.expect_end()?;
        Ok(stmts)
    }

    fn parse_simple_statement(&mut self) -> EvalResult<Stmt> {
        if let Token::Name(word) = self.peek().clone() {
            match word.as_str() {
                "pass" => {
                    self.advance();
                    return Ok(Stmt::Pass);
                }
                "break" => {
                    self.advance();
                    return Ok(Stmt::Break);
                }
                "continue" => {
                    self.advance();
                    return Ok(Stmt::Continue);
                }
                "return" => {
                    self.advance();
                    if self.at_end() || matches!(self.peek(), Token::Semicolon) {
                        return Ok(Stmt::Return(None));
                    }
                    return Ok(Stmt::Return(Some(self.parse_expr_list()?)));
                }
                "del" => {
                    self.advance();
                    let mut names = vec![self.expect_name()?.into()];
                    while self.eat(&Token::Comma) {
                        names.push(self.expect_name()?.into());
                    }
                    return Ok(Stmt::Del(names));
                }
                "import" => {
                    self.advance();
                    let module = self.parse_dotted_name()?;
                    let alias = if self.eat_keyword("as") {
                        Some(self.expect_name()?)
                    } else {
                        None
                    };
                    return Ok(Stmt::Import { module, alias });
                }
                "from" => {
                    self.advance();
                    let module = self.parse_dotted_name()?;
                    self.expect_keyword("import")?;
                    if self.eat(&Token::Star) {
                        return Ok(Stmt::FromImport {
                            module,
                            names: ImportNames::All,
                        });
                    }
                    let parenthesized = self.eat(&Token::LParen);
                    let mut names = Vec::new();
                    loop {
                        let name = self.expect_name()?;
                        let alias = if self.eat_keyword("as") {
                            Some(self.expect_name()?)
                        } else {
                            None
                        };
                        names.push((name, alias));
                        if !self.eat(&Token::Comma) || matches!(self.peek(), Token::RParen) {
                            break;
                        }
                    }
                    if parenthesized {
                        self.expect(Token::RParen, "to close import list")?;
                    }
                    return Ok(Stmt::FromImport {
                        module,
                        names: ImportNames::Names(names),
                    });
                }
                _ => {}
            }

            let aug = match self.peek_at(1) {
                Token::Assign => None,
                Token::PlusAssign => Some(BinOp::Add),
                Token::MinusAssign => Some(BinOp::Sub),
                Token::StarAssign => Some(BinOp::Mul),
                Token::SlashAssign => Some(BinOp::Div),
                _ => return Ok(Stmt::Expr(self.parse_expr_list()?)),
            };
            if is_keyword(&word) {
                return Err(EvalError::syntax(format!("cannot assign to keyword '{}'", word)));
            }
            self.advance();
            self.advance();
            let value = self.parse_expr_list()?;
            return Ok(match aug {
                None => Stmt::Assign(word.into(), value),
                Some(op) => Stmt::AugAssign(word.into(), op, value),
            });
        }

        let expr = self.parse_expr_list()?;
        if matches!(
            self.peek(),
            Token::Assign | Token::PlusAssign | Token::MinusAssign | Token::StarAssign | Token::SlashAssign
        ) {
            return Err(EvalError::syntax("cannot assign to expression"));
        }
        Ok(Stmt::Expr(expr))
    }

    fn parse_dotted_name(&mut self) -> EvalResult<String> {
        let mut name = self.expect_name()?;
        while self.eat(&Token::Dot) {
            name.push('.');
            name.push_str(&self.expect_name()?);
        }
        Ok(name)
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Int(n) => format!("number {}", n),
        Token::Float(f) => format!("number {}", f),
        Token::Str(_) => "string".into(),
        Token::Name(n) => format!("'{}'", n),
        Token::End => "end of input".into(),
        other => format!("{:?}", other),
    }
}

// ============================================================================
// Line and block structure
// ============================================================================

#[derive(Clone, Copy)]
struct Line<'a> {
    indent: usize,
    text: &'a str,
}

struct BlockParser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
}

impl<'a> BlockParser<'a> {
    fn new(source: &'a str) -> Self {
        let lines = source
            .lines()
            .filter_map(|raw| {
                let text = raw.trim_start();
                if text.is_empty() || text.starts_with('#') {
                    return None;
                }
                let indent = raw[..raw.len() - text.len()]
                    .chars()
                    .map(|c| if c == '\t' { 4 } else { 1 })
                    .sum();
                Some(Line { indent, text })
            })
            .collect();
        Self { lines, pos: 0 }
    }

    /// Parse consecutive lines at exactly `indent`.
    fn parse_block(&mut self, indent: usize) -> EvalResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while let Some(line) = self.lines.get(self.pos).copied() {
            if line.indent < indent {
                break;
            }
            if line.indent > indent {
                return Err(EvalError::syntax("unexpected indent"));
            }
            self.pos += 1;
            stmts.extend(self.parse_line(line)?);
        }
        Ok(stmts)
    }

    fn parse_line(&mut self, line: Line<'a>) -> EvalResult<Vec<Stmt>> {
        let mut p = Parser::new(tokenize(line.text)?);
        let keyword = match p.peek() {
            Token::Name(n) => n.clone(),
            _ => String::new(),
        };
        match keyword.as_str() {
            "def" => {
                p.advance();
                let name = p.expect_name()?;
                p.expect(Token::LParen, "after function name")?;
                let params = p.parse_params(&Token::RParen)?;
                p.expect(Token::RParen, "after parameters")?;
                p.expect(Token::Colon, "after function signature")?;
                let body = self.parse_body(&mut p, line.indent)?;
                Ok(vec![Stmt::Def(Arc::new(FunctionDef {
                    name: name.into(),
                    params,
                    body,
                }))])
            }
            "if" => {
                p.advance();
                let cond = p.parse_expr()?;
                p.expect(Token::Colon, "after condition")?;
                let body = self.parse_body(&mut p, line.indent)?;
                let mut branches = vec![(cond, body)];
                let mut orelse = Vec::new();
                while let Some(next) = self.lines.get(self.pos).copied() {
                    if next.indent != line.indent {
                        break;
                    }
                    let mut q = Parser::new(tokenize(next.text)?);
                    if q.eat_keyword("elif") {
                        self.pos += 1;
                        let cond = q.parse_expr()?;
                        q.expect(Token::Colon, "after condition")?;
                        let body = self.parse_body(&mut q, next.indent)?;
                        branches.push((cond, body));
                    } else if q.eat_keyword("else") {
                        self.pos += 1;
                        q.expect(Token::Colon, "after 'else'")?;
                        orelse = self.parse_body(&mut q, next.indent)?;
                        break;
                    } else {
                        break;
                    }
                }
                Ok(vec![Stmt::If { branches, orelse }])
            }
            "for" => {
                p.advance();
                let target = p.expect_name()?;
                p.expect_keyword("in")?;
                let iter = p.parse_expr_list()?;
                p.expect(Token::Colon, "after for clause")?;
                let body = self.parse_body(&mut p, line.indent)?;
                Ok(vec![Stmt::For {
                    target: target.into(),
                    iter,
                    body,
                }])
            }
            "while" => {
                p.advance();
                let cond = p.parse_expr()?;
                p.expect(Token::Colon, "after condition")?;
                let body = self.parse_body(&mut p, line.indent)?;
                Ok(vec![Stmt::While { cond, body }])
            }
            "elif" | "else" => Err(EvalError::syntax(format!("'{}' without 'if'", keyword))),
            _ => p.parse_simple_statements(),
        }
    }

    /// Parse the body after a header's colon: inline statements or an indented block.
    fn parse_body(&mut self, p: &mut Parser, header_indent: usize) -> EvalResult<Vec<Stmt>> {
        if !p.at_end() {
            return p.parse_simple_statements();
        }
        match self.lines.get(self.pos).copied() {
            Some(next) if next.indent > header_indent => self.parse_block(next.indent),
            _ => Err(EvalError::syntax("expected an indented block")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Expr {
        parse_expression(s).unwrap()
    }

    #[test]
    fn parse_precedence() {
        // 1+2*3 should parse as 1+(2*3)
        assert_eq!(
            parse("1+2*3"),
            Expr::binary(
                BinOp::Add,
                Expr::int(1),
                Expr::binary(BinOp::Mul, Expr::int(2), Expr::int(3))
            )
        );
    }

    #[test]
    fn parse_left_assoc() {
        assert_eq!(
            parse("a-b-c"),
            Expr::binary(
                BinOp::Sub,
                Expr::binary(BinOp::Sub, Expr::name("a"), Expr::name("b")),
                Expr::name("c")
            )
        );
    }

    #[test]
    fn parse_right_assoc_pow() {
        assert_eq!(
            parse("a**b**c"),
            Expr::binary(
                BinOp::Pow,
                Expr::name("a"),
                Expr::binary(BinOp::Pow, Expr::name("b"), Expr::name("c"))
            )
        );
    }

    #[test]
    fn unary_minus_binds_looser_than_pow() {
        assert_eq!(
            parse("-x**2"),
            Expr::unary(
                UnaryOp::Neg,
                Expr::binary(BinOp::Pow, Expr::name("x"), Expr::int(2))
            )
        );
        assert_eq!(
            parse("2**-1"),
            Expr::binary(BinOp::Pow, Expr::int(2), Expr::int(-1))
        );
    }

    #[test]
    fn parse_call_with_keywords() {
        match parse("np.linspace(0, 1, num=5)") {
            Expr::Call { callee, args, keywords } => {
                assert_eq!(
                    *callee,
                    Expr::Attribute(Box::new(Expr::name("np")), "linspace".into())
                );
                assert_eq!(args.len(), 2);
                assert_eq!(keywords[0].0, "num");
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn parse_displays() {
        assert!(matches!(parse("[1, 2, 3]"), Expr::List(items) if items.len() == 3));
        assert!(matches!(parse("(1,)"), Expr::Tuple(items) if items.len() == 1));
        assert!(matches!(parse("1, 2"), Expr::Tuple(items) if items.len() == 2));
        assert!(matches!(parse("{1, 2}"), Expr::Set(items) if items.len() == 2));
        assert!(matches!(parse("{'a': 1}"), Expr::Dict(entries) if entries.len() == 1));
        assert!(matches!(parse("{}"), Expr::Dict(entries) if entries.is_empty()));
    }

    #[test]
    fn parse_chained_comparison() {
        match parse("1 < x <= 3") {
            Expr::Compare(_, links) => {
                assert_eq!(links.len(), 2);
                assert_eq!(links[0].0, CmpOp::Lt);
                assert_eq!(links[1].0, CmpOp::Le);
            }
            other => panic!("expected comparison, got {:?}", other),
        }
        assert!(matches!(parse("x not in y"), Expr::Compare(_, l) if l[0].0 == CmpOp::NotIn));
    }

    #[test]
    fn statements_are_not_expressions() {
        assert!(parse_expression("a = 5").is_err());
        assert!(parse_expression("import math").is_err());
        assert!(parse_expression("def f(x): return x").is_err());
        assert!(parse_expression("(1 + 2").is_err());
    }

    #[test]
    fn parse_assignments() {
        let stmts = parse_program("a = 1; b += 2").unwrap();
        assert_eq!(stmts[0], Stmt::Assign("a".into(), Expr::int(1)));
        assert_eq!(stmts[1], Stmt::AugAssign("b".into(), BinOp::Add, Expr::int(2)));
    }

    #[test]
    fn parse_inline_def() {
        let stmts = parse_program("def f(x, y=2): return x * y").unwrap();
        match &stmts[0] {
            Stmt::Def(def) => {
                assert_eq!(&*def.name, "f");
                assert_eq!(def.params.len(), 2);
                assert!(def.params[1].default.is_some());
                assert_eq!(def.body.len(), 1);
            }
            other => panic!("expected def, got {:?}", other),
        }
    }

    #[test]
    fn parse_block_def() {
        let src = "def g(n):\n    total = 0\n    for i in range(n):\n        total += i\n    return total\n";
        let stmts = parse_program(src).unwrap();
        match &stmts[0] {
            Stmt::Def(def) => {
                assert_eq!(def.body.len(), 3);
                assert!(matches!(&def.body[1], Stmt::For { body, .. } if body.len() == 1));
            }
            other => panic!("expected def, got {:?}", other),
        }
    }

    #[test]
    fn parse_if_elif_else() {
        let src = "if x > 1:\n  y = 1\nelif x > 0:\n  y = 2\nelse:\n  y = 3";
        match &parse_program(src).unwrap()[0] {
            Stmt::If { branches, orelse } => {
                assert_eq!(branches.len(), 2);
                assert_eq!(orelse.len(), 1);
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn parse_imports() {
        assert_eq!(
            parse_program("import numpy as np").unwrap()[0],
            Stmt::Import {
                module: "numpy".into(),
                alias: Some("np".into())
            }
        );
        assert_eq!(
            parse_program("from math import *").unwrap()[0],
            Stmt::FromImport {
                module: "math".into(),
                names: ImportNames::All
            }
        );
        match &parse_program("from math import sin, cos as c").unwrap()[0] {
            Stmt::FromImport {
                names: ImportNames::Names(names),
                ..
            } => {
                assert_eq!(names[1], ("cos".to_string(), Some("c".to_string())));
            }
            other => panic!("expected from-import, got {:?}", other),
        }
    }

    #[test]
    fn block_errors() {
        assert!(parse_program("def f(x):").is_err());
        assert!(parse_program("x = 1\n    y = 2").is_err());
        assert!(parse_program("else:\n  pass").is_err());
    }

    #[test]
    fn deep_nesting_is_a_syntax_error() {
        let nested = |n: usize| format!("{}1{}", "(".repeat(n), ")".repeat(n));
        assert_eq!(parse(&nested(50)), Expr::Literal(Value::Int(1)));
        assert_eq!(
            parse_expression(&nested(50_000)),
            Err(EvalError::syntax("too many nested parentheses"))
        );
        assert!(parse_expression(&"-".repeat(50_000)).is_err());
        assert!(parse_expression(&format!("{}x", "not ".repeat(50_000))).is_err());
        assert!(parse_program(&format!("y = {}", nested(50_000))).is_err());
    }
}
