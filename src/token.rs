use std::fmt;
use std::iter::Peekable;

use crate::error::{CalcError, PartialComp};

/// Tokens used for parsing a normalized arithmetic expression
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Plus,
    Minus,
    Divide,
    Multiply,
    Exponent,
    Percent,
    OpenParen,
    CloseParen,
    Number(f64),
    Atom(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Token::Plus => write!(f, "Plus"),
            Token::Minus => write!(f, "Minus"),
            Token::Divide => write!(f, "Divide"),
            Token::Multiply => write!(f, "Multiply"),
            Token::Exponent => write!(f, "Exponent"),
            Token::Percent => write!(f, "Percent"),
            Token::OpenParen => write!(f, "OpenParen"),
            Token::CloseParen => write!(f, "CloseParen"),
            Token::Number(ref n) => write!(f, "'{}'", n),
            Token::Atom(ref s) => write!(f, "'{}'", s),
        }
    }
}

trait IsOperator {
    fn is_operator(self) -> bool;
}

impl IsOperator for char {
    fn is_operator(self) -> bool {
        self.operator_type().is_some()
    }
}

trait OperatorMatch {
    fn operator_type(self) -> Option<Token>;
}

impl OperatorMatch for char {
    fn operator_type(self) -> Option<Token> {
        match self {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '/' => Some(Token::Divide),
            '*' => Some(Token::Multiply),
            '^' => Some(Token::Exponent),
            '%' => Some(Token::Percent),
            '(' => Some(Token::OpenParen),
            ')' => Some(Token::CloseParen),
            _ => None,
        }
    }
}

/// Split normalized text into tokens. Calculator key symbols (`×`, `π`,
/// `!`, ...) are not accepted here; run the input through
/// [`normalize`](crate::normalize) first.
pub fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphabetic() {
            tokens.push(Token::Atom(consume_atom(&mut chars)));
        } else if c.is_ascii_digit() || c == '.' {
            tokens.push(consume_number(&mut chars)?);
        } else if let Some(token) = c.operator_type() {
            tokens.push(token);
            chars.next();
        } else if c.is_whitespace() {
            chars.next();
        } else {
            let token_string = consume_until_new_token(&mut chars);
            return Err(CalcError::UnrecognizedToken(token_string));
        }
    }
    Ok(tokens)
}

fn digits<I>(input: &mut Peekable<I>, number: &mut String)
where
    I: Iterator<Item = char>,
{
    while let Some(&c) = input.peek() {
        if c.is_ascii_digit() {
            number.push(c);
        } else {
            break;
        }
        input.next();
    }
}

/// Consume a decimal number with an optional fraction and an optional
/// signed `E`-marked exponent (`2.5E-3`). An unsigned `1E5` is rejected,
/// just like `1e5`.
fn consume_number<I>(input: &mut Peekable<I>) -> Result<Token, CalcError>
where
    I: Iterator<Item = char>,
{
    let mut number = String::new();
    digits(input, &mut number);
    if let Some(&'.') = input.peek() {
        input.next();
        number.push('.');
        digits(input, &mut number);
    }
    if let Some(&'E') = input.peek() {
        input.next();
        // the marker only ever comes from `e+`/`e-`, so a sign must follow
        match input.peek() {
            Some(&sign) if sign == '+' || sign == '-' => {
                input.next();
                number.push('e');
                number.push(sign);
            }
            _ => return Err(CalcError::InvalidNumber(format!("{}E", number))),
        }
        digits(input, &mut number);
    }
    let n: f64 = number.parse()?;
    if n.is_infinite() {
        return Err(CalcError::WouldOverflow(PartialComp::unary("literal", number)));
    }
    Ok(Token::Number(n))
}

/// Consume a valid atom. An atom is defined by:
/// - Starting with an alphabetic character
/// - Consisting of alphanumeric characters or underscores
fn consume_atom<I: Iterator<Item = char>>(input: &mut Peekable<I>) -> String {
    let mut atom = String::new();
    while let Some(&c) = input.peek() {
        if c.is_ascii_alphanumeric() || c == '_' {
            atom.push(c);
            input.next();
        } else {
            break;
        }
    }
    atom
}

fn consume_until_new_token<I: Iterator<Item = char>>(input: &mut I) -> String {
    input
        .take_while(|c| !(c.is_whitespace() || c.is_operator() || c.is_ascii_digit()))
        .collect()
}
