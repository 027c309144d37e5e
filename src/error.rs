use std::fmt;
use std::num::ParseFloatError;

use thiserror::Error;

/// Represents a partial computation that can be captured as part of an
/// error message.
#[derive(Debug, Clone, PartialEq)]
pub enum PartialComp {
    Unary { op: String, arg: String },
    Binary { op: String, lhs: String, rhs: String },
}

impl PartialComp {
    pub fn unary<T, U>(op: T, arg: U) -> Self
    where
        T: ToString,
        U: ToString,
    {
        PartialComp::Unary {
            op: op.to_string(),
            arg: arg.to_string(),
        }
    }

    pub fn binary<T, U, V>(op: T, lhs: U, rhs: V) -> Self
    where
        T: ToString,
        U: ToString,
        V: ToString,
    {
        PartialComp::Binary {
            op: op.to_string(),
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
        }
    }
}

impl fmt::Display for PartialComp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PartialComp::Unary { ref op, ref arg } => write!(f, "{} {}", op, arg),
            PartialComp::Binary {
                ref op,
                ref lhs,
                ref rhs,
            } => write!(f, "{} {} {}", lhs, op, rhs),
        }
    }
}

/// The three failure classes a caller may want to tell apart. The
/// composer itself collapses all of them into a single error display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: bad tokens, unbalanced parentheses, dangling
    /// operators, empty function arguments.
    Syntax,
    /// Mathematically undefined for the given inputs.
    Domain,
    /// Result or input exceeds what the engine will represent.
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("attempted to divide by zero")]
    DivideByZero,
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error("unrecognized token: {0}")]
    UnrecognizedToken(String),
    #[error("expected {1} token, got {0} instead")]
    UnexpectedToken(String, &'static str),
    #[error("unknown constant or function '{0}'")]
    UnknownAtom(String),
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("unmatched parenthesis")]
    UnmatchedParenthesis,
    #[error("no bracketed function argument")]
    NoFunctionArgument,
    #[error("expression '{0}' is undefined")]
    Undefined(PartialComp),
    #[error("expression '{0}' would overflow")]
    WouldOverflow(PartialComp),
    #[error("expression nesting exceeds {0} levels")]
    TooDeep(usize),
    #[error("expression longer than {0} characters")]
    TooLong(usize),
}

impl CalcError {
    pub fn kind(&self) -> ErrorKind {
        use self::CalcError::*;
        match *self {
            InvalidNumber(_)
            | UnrecognizedToken(_)
            | UnexpectedToken(..)
            | UnknownAtom(_)
            | UnexpectedEndOfInput
            | UnmatchedParenthesis
            | NoFunctionArgument => ErrorKind::Syntax,
            DivideByZero | Undefined(_) => ErrorKind::Domain,
            WouldOverflow(_) | TooDeep(_) | TooLong(_) => ErrorKind::Overflow,
        }
    }
}

impl From<ParseFloatError> for CalcError {
    fn from(data: ParseFloatError) -> CalcError {
        CalcError::InvalidNumber(data.to_string())
    }
}
