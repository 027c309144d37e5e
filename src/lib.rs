//! A scientific calculator engine.
//!
//! [`Composer`] turns key presses into an expression buffer. [`eval`] and
//! friends turn such a buffer into a number without ever executing it as
//! code: the text is normalized, tokenized, parsed into a [`Node`] tree and
//! walked.

#[cfg(test)]
mod tests;

mod ast;
mod composer;
mod env;
mod error;
mod normalize;
mod outcome;
mod parse;
mod token;
mod value;

pub use ast::{BinaryOp, Node, UnaryOp};
pub use composer::{
    Composer, ComposerState, ConstantKey, DisplayState, FunctionKey, Input, ModeFlags, Operator,
    ERROR_DISPLAY,
};
pub use env::{
    factorial, AngleMode, Environment, ScientificEnvironment, CONSTANT_NAMES, DEFAULT_MAX_DEPTH,
    FUNCTION_NAMES,
};
pub use error::{CalcError, ErrorKind, PartialComp};
pub use normalize::normalize;
pub use outcome::{EvaluationOutcome, Explanation, ResultSink};
pub use value::Value;

use tracing::debug;

/// Longest expression, in characters, that will be evaluated.
pub const MAX_INPUT_LEN: usize = 1024;

/// Evaluate an expression with trigonometry in radians.
pub fn eval(input: &str) -> Result<Value, CalcError> {
    eval_with_mode(input, AngleMode::Radians)
}

pub fn eval_with_mode(input: &str, angle_mode: AngleMode) -> Result<Value, CalcError> {
    eval_with_env(input, &ScientificEnvironment::new(angle_mode))
}

pub fn eval_with_env<E>(input: &str, env: &E) -> Result<Value, CalcError>
where
    E: Environment,
{
    let raw = parse(input, env)?.eval(env)?;
    debug!(input, raw, "evaluated expression");
    Ok(Value::from(raw))
}

/// Normalize, tokenize and parse an expression without evaluating it.
pub fn parse<E>(input: &str, env: &E) -> Result<Node, CalcError>
where
    E: Environment,
{
    if input.chars().count() > MAX_INPUT_LEN {
        return Err(CalcError::TooLong(MAX_INPUT_LEN));
    }
    let normalized = normalize(input);
    token::tokenize(&normalized).and_then(|x| parse::parse(&x, env))
}
