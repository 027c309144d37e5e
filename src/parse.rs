use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::env::Environment;
use crate::error::CalcError;
use crate::token::Token;

/// A subtree together with the number of tokens it was built from.
#[derive(Clone, Debug)]
pub struct IntermediateResult {
    node: Node,
    tokens_read: usize,
}

impl IntermediateResult {
    pub fn new(node: Node, tokens_read: usize) -> Self {
        IntermediateResult { node, tokens_read }
    }
}

/// Every nested parenthesis, function argument, sign and power operand
/// costs one level. Running out of levels is an overflow, not a crash.
fn descend<E>(depth: usize, env: &E) -> Result<usize, CalcError>
where
    E: Environment,
{
    let max = env.max_depth();
    if depth >= max {
        Err(CalcError::TooDeep(max))
    } else {
        Ok(depth + 1)
    }
}

// Addition and subtraction
fn e_expr<E>(token_list: &[Token], env: &E, depth: usize) -> Result<IntermediateResult, CalcError>
where
    E: Environment,
{
    let mut t1 = t_expr(token_list, env, depth)?;
    let mut index = t1.tokens_read;

    while index < token_list.len() {
        let op = match token_list[index] {
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Subtract,
            _ => break,
        };
        let t2 = t_expr(&token_list[index + 1..], env, depth)?;
        t1.node = Node::binary(op, t1.node, t2.node);
        t1.tokens_read += t2.tokens_read + 1;
        index = t1.tokens_read;
    }
    Ok(t1)
}

// Multiplication and division
fn t_expr<E>(token_list: &[Token], env: &E, depth: usize) -> Result<IntermediateResult, CalcError>
where
    E: Environment,
{
    let mut f1 = f_expr(token_list, env, depth)?;
    let mut index = f1.tokens_read;

    while index < token_list.len() {
        let op = match token_list[index] {
            Token::Multiply => BinaryOp::Multiply,
            Token::Divide => BinaryOp::Divide,
            _ => break,
        };
        let f2 = f_expr(&token_list[index + 1..], env, depth)?;
        f1.node = Node::binary(op, f1.node, f2.node);
        f1.tokens_read += f2.tokens_read + 1;
        index = f1.tokens_read;
    }
    Ok(f1)
}

// Exponentiation, right associative
fn f_expr<E>(token_list: &[Token], env: &E, depth: usize) -> Result<IntermediateResult, CalcError>
where
    E: Environment,
{
    let mut u1 = u_expr(token_list, env, depth)?;
    let index = u1.tokens_read;

    if let Some(Token::Exponent) = token_list.get(index) {
        let f = f_expr(&token_list[index + 1..], env, descend(depth, env)?)?;
        u1.node = Node::binary(BinaryOp::Power, u1.node, f.node);
        u1.tokens_read += f.tokens_read + 1;
    }
    Ok(u1)
}

// Signs, which bind tighter than exponentiation: -2^2 is (-2)^2
fn u_expr<E>(token_list: &[Token], env: &E, depth: usize) -> Result<IntermediateResult, CalcError>
where
    E: Environment,
{
    let op = match token_list.first() {
        Some(Token::Minus) => UnaryOp::Negate,
        Some(Token::Plus) => UnaryOp::Plus,
        _ => return p_expr(token_list, env, depth),
    };
    let mut ir = u_expr(&token_list[1..], env, descend(depth, env)?)?;
    ir.node = Node::unary(op, ir.node);
    ir.tokens_read += 1;
    Ok(ir)
}

// Postfix percent
fn p_expr<E>(token_list: &[Token], env: &E, depth: usize) -> Result<IntermediateResult, CalcError>
where
    E: Environment,
{
    let mut g1 = g_expr(token_list, env, depth)?;
    while let Some(Token::Percent) = token_list.get(g1.tokens_read) {
        g1.node = Node::unary(UnaryOp::Percent, g1.node);
        g1.tokens_read += 1;
    }
    Ok(g1)
}

// Numbers, parenthesized expressions, constants and function calls
fn g_expr<E>(token_list: &[Token], env: &E, depth: usize) -> Result<IntermediateResult, CalcError>
where
    E: Environment,
{
    match token_list.first() {
        Some(&Token::Number(n)) => Ok(IntermediateResult::new(Node::Literal(n), 1)),
        Some(Token::Atom(s)) => match env.arity(s) {
            Some(0) => Ok(IntermediateResult::new(Node::Constant(s.clone()), 1)),
            Some(1) => {
                match token_list.get(1) {
                    Some(Token::OpenParen) => (),
                    _ => return Err(CalcError::NoFunctionArgument),
                }
                if let Some(Token::CloseParen) = token_list.get(2) {
                    return Err(CalcError::NoFunctionArgument);
                }
                let arg = parenthesized(&token_list[1..], env, depth)?;
                Ok(IntermediateResult::new(
                    Node::FunctionCall(s.clone(), Box::new(arg.node)),
                    arg.tokens_read + 1,
                ))
            }
            _ => Err(CalcError::UnknownAtom(s.clone())),
        },
        Some(Token::OpenParen) => parenthesized(token_list, env, depth),
        Some(token) => Err(CalcError::UnexpectedToken(token.to_string(), "number")),
        None => Err(CalcError::UnexpectedEndOfInput),
    }
}

/// Parse `( expr )` starting at the open parenthesis.
fn parenthesized<E>(
    token_list: &[Token],
    env: &E,
    depth: usize,
) -> Result<IntermediateResult, CalcError>
where
    E: Environment,
{
    let ir = e_expr(&token_list[1..], env, descend(depth, env)?)?;
    let close_paren = ir.tokens_read + 1;
    match token_list.get(close_paren) {
        Some(Token::CloseParen) => Ok(IntermediateResult::new(ir.node, close_paren + 1)),
        Some(token) => Err(CalcError::UnexpectedToken(token.to_string(), ")")),
        None => Err(CalcError::UnmatchedParenthesis),
    }
}

/// Build the expression tree for a complete token stream. Atoms are
/// classified as constants or functions through `env`.
pub fn parse<E>(tokens: &[Token], env: &E) -> Result<Node, CalcError>
where
    E: Environment,
{
    let ir = e_expr(tokens, env, 0)?;
    match tokens.get(ir.tokens_read) {
        None => Ok(ir.node),
        Some(Token::CloseParen) => Err(CalcError::UnmatchedParenthesis),
        Some(token) => Err(CalcError::UnexpectedToken(token.to_string(), "operator")),
    }
}
