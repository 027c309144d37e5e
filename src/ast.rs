use std::fmt;

use crate::env::Environment;
use crate::error::{CalcError, PartialComp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match *self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Power => "^",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Plus,
    /// Postfix `%`, divides its operand by one hundred.
    Percent,
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(f64),
    BinaryOp(BinaryOp, Box<Node>, Box<Node>),
    UnaryOp(UnaryOp, Box<Node>),
    FunctionCall(String, Box<Node>),
    Constant(String),
}

impl Node {
    pub fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> Self {
        Node::BinaryOp(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn unary(op: UnaryOp, operand: Node) -> Self {
        Node::UnaryOp(op, Box::new(operand))
    }

    /// Evaluate the tree against `env`. Every intermediate result must be
    /// finite: NaN is reported as undefined and infinity as an overflow.
    pub fn eval<E>(&self, env: &E) -> Result<f64, CalcError>
    where
        E: Environment,
    {
        match *self {
            Node::Literal(n) => Ok(n),
            Node::Constant(ref name) => env.resolve(name, &[]),
            Node::UnaryOp(op, ref operand) => {
                let x = operand.eval(env)?;
                Ok(match op {
                    UnaryOp::Negate => -x,
                    UnaryOp::Plus => x,
                    UnaryOp::Percent => x / 100.0,
                })
            }
            Node::FunctionCall(ref name, ref arg) => {
                let x = arg.eval(env)?;
                let value = env.resolve(name, &[x])?;
                finite(value, || PartialComp::unary(name, x))
            }
            Node::BinaryOp(op, ref lhs, ref rhs) => {
                let x = lhs.eval(env)?;
                let y = rhs.eval(env)?;
                let value = match op {
                    BinaryOp::Add => x + y,
                    BinaryOp::Subtract => x - y,
                    BinaryOp::Multiply => x * y,
                    BinaryOp::Divide => {
                        if y == 0.0 {
                            return Err(CalcError::DivideByZero);
                        }
                        x / y
                    }
                    BinaryOp::Power => {
                        if x == 0.0 && y < 0.0 {
                            return Err(CalcError::DivideByZero);
                        }
                        x.powf(y)
                    }
                };
                finite(value, || PartialComp::binary(op, x, y))
            }
        }
    }
}

fn finite<F>(value: f64, comp: F) -> Result<f64, CalcError>
where
    F: FnOnce() -> PartialComp,
{
    if value.is_nan() {
        Err(CalcError::Undefined(comp()))
    } else if value.is_infinite() {
        Err(CalcError::WouldOverflow(comp()))
    } else {
        Ok(value)
    }
}
