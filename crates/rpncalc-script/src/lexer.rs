//! Tokenizer for one line of script text.
//!
//! Keywords are returned as `Name` tokens; the parser decides what they mean.
//! A `#` outside a string starts a comment that runs to the end of the line.

use crate::error::{EvalError, EvalResult};

/// A lexical token.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Name(String),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Semicolon,
    End,
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `name` lexes as a single name token.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_identifier_start) && chars.all(is_identifier_char)
}

/// Tokenize a single line.
pub fn tokenize(input: &str) -> EvalResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            ' ' | '\t' | '\r' | '\n' => {
                chars.next();
            }
            '#' => break,
            '0'..='9' => tokens.push(lex_number(&mut chars)?),
            '.' => {
                chars.next();
                if chars.peek().is_some_and(char::is_ascii_digit) {
                    let mut text = String::from("0.");
                    take_digits(&mut chars, &mut text);
                    take_exponent(&mut chars, &mut text)?;
                    tokens.push(float_token(&text)?);
                } else {
                    tokens.push(Token::Dot);
                }
            }
            c if is_identifier_start(c) => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if is_identifier_char(c) {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Name(ident));
            }
            '\'' | '"' => {
                chars.next();
                tokens.push(Token::Str(lex_string(&mut chars, ch)?));
            }
            _ => {
                chars.next();
                let next = chars.peek().copied();
                let (token, two_char) = match (ch, next) {
                    ('*', Some('*')) => (Token::DoubleStar, true),
                    ('*', Some('=')) => (Token::StarAssign, true),
                    ('*', _) => (Token::Star, false),
                    ('/', Some('/')) => (Token::DoubleSlash, true),
                    ('/', Some('=')) => (Token::SlashAssign, true),
                    ('/', _) => (Token::Slash, false),
                    ('+', Some('=')) => (Token::PlusAssign, true),
                    ('+', _) => (Token::Plus, false),
                    ('-', Some('=')) => (Token::MinusAssign, true),
                    ('-', _) => (Token::Minus, false),
                    ('%', _) => (Token::Percent, false),
                    ('=', Some('=')) => (Token::EqEq, true),
                    ('=', _) => (Token::Assign, false),
                    ('!', Some('=')) => (Token::NotEq, true),
                    ('<', Some('=')) => (Token::Le, true),
                    ('<', _) => (Token::Lt, false),
                    ('>', Some('=')) => (Token::Ge, true),
                    ('>', _) => (Token::Gt, false),
                    ('(', _) => (Token::LParen, false),
                    (')', _) => (Token::RParen, false),
                    ('[', _) => (Token::LBracket, false),
                    (']', _) => (Token::RBracket, false),
                    ('{', _) => (Token::LBrace, false),
                    ('}', _) => (Token::RBrace, false),
                    (',', _) => (Token::Comma, false),
                    (':', _) => (Token::Colon, false),
                    (';', _) => (Token::Semicolon, false),
                    _ => {
                        return Err(EvalError::syntax(format!("invalid character '{}'", ch)));
                    }
                };
                if two_char {
                    chars.next();
                }
                tokens.push(token);
            }
        }
    }

    tokens.push(Token::End);
    Ok(tokens)
}

type Chars<'a> = std::iter::Peekable<std::str::Chars<'a>>;

fn take_digits(chars: &mut Chars<'_>, text: &mut String) {
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            text.push(c);
            chars.next();
        } else if c == '_' {
            chars.next();
        } else {
            break;
        }
    }
}

fn take_exponent(chars: &mut Chars<'_>, text: &mut String) -> EvalResult<bool> {
    if !matches!(chars.peek(), Some('e') | Some('E')) {
        return Ok(false);
    }
    chars.next();
    text.push('e');
    if let Some(&sign) = chars.peek()
        && (sign == '+' || sign == '-')
    {
        text.push(sign);
        chars.next();
    }
    if !chars.peek().is_some_and(char::is_ascii_digit) {
        return Err(EvalError::syntax("invalid decimal literal"));
    }
    take_digits(chars, text);
    Ok(true)
}

fn float_token(text: &str) -> EvalResult<Token> {
    text.parse::<f64>()
        .map(Token::Float)
        .map_err(|_| EvalError::syntax(format!("invalid number: {}", text)))
}

fn lex_number(chars: &mut Chars<'_>) -> EvalResult<Token> {
    let mut text = String::new();
    take_digits(chars, &mut text);
    let mut is_float = false;
    if chars.peek() == Some(&'.') {
        is_float = true;
        text.push('.');
        chars.next();
        take_digits(chars, &mut text);
    }
    if take_exponent(chars, &mut text)? {
        is_float = true;
    }
    if chars.peek().is_some_and(|c| c.is_alphabetic() || *c == '_') {
        return Err(EvalError::syntax("invalid decimal literal"));
    }
    if is_float {
        return float_token(&text);
    }
    // Integer literals too large for i64 degrade to floats.
    match text.parse::<i64>() {
        Ok(n) => Ok(Token::Int(n)),
        Err(_) => float_token(&text),
    }
}

fn lex_string(chars: &mut Chars<'_>, quote: char) -> EvalResult<String> {
    let mut out = String::new();
    loop {
        match chars.next() {
            None => return Err(EvalError::syntax("unterminated string literal")),
            Some(c) if c == quote => return Ok(out),
            Some('\\') => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('0') => out.push('\0'),
                Some('\\') => out.push('\\'),
                Some('\'') => out.push('\''),
                Some('"') => out.push('"'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => return Err(EvalError::syntax("unterminated string literal")),
            },
            Some(c) => out.push(c),
        }
    }
}
