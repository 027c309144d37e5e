//! Rewrites the symbols shown on calculator keys into the plain ASCII
//! notation understood by the tokenizer.
//!
//! The rewrites run in a fixed order:
//!
//! 1. `×` and `÷` become `*` and `/`.
//! 2. `π` becomes the atom `pi`. An `e` sitting between a digit and a
//!    signed digit (`1e+5`) is scientific notation and becomes the exponent
//!    marker `E`; every other `e` is left alone and later resolves to
//!    Euler's number.
//! 3. `^` is already the canonical power operator.
//! 4. `√(` becomes `sqrt(`.
//! 5. `ln(` and `log(` are already canonical function names.
//! 6. A run of digits followed by `!` becomes `fact(<digits>)`. Only a
//!    literal digit run is rewritten, so `(2+3)!` keeps its `!` and is
//!    rejected by the tokenizer.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref SCIENTIFIC: Regex = Regex::new(r"([0-9.])e([+-][0-9])").expect("valid regex");
    static ref FACTORIAL: Regex = Regex::new(r"([0-9]+)!").expect("valid regex");
}

pub fn normalize(input: &str) -> String {
    let mut expr = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '×' => expr.push('*'),
            '÷' => expr.push('/'),
            'π' => expr.push_str("pi"),
            _ => expr.push(c),
        }
    }

    let expr = SCIENTIFIC.replace_all(&expr, "${1}E${2}");
    let expr = expr.replace("√(", "sqrt(");
    let expr = FACTORIAL.replace_all(&expr, "fact(${1})").into_owned();

    debug!(input, normalized = %expr, "normalized expression");
    expr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_symbols() {
        assert_eq!(normalize("6×7÷2"), "6*7/2");
        assert_eq!(normalize("2^3"), "2^3");
    }

    #[test]
    fn constants() {
        assert_eq!(normalize("π×2"), "pi*2");
        assert_eq!(normalize("e^2"), "e^2");
        assert_eq!(normalize("2×e"), "2*e");
    }

    #[test]
    fn scientific_notation() {
        assert_eq!(normalize("1e+5"), "1E+5");
        assert_eq!(normalize("2.5e-3×4"), "2.5E-3*4");
        // no digit on the left: the constant plus five
        assert_eq!(normalize("e+5"), "e+5");
        // no sign: the constant
        assert_eq!(normalize("1e5"), "1e5");
    }

    #[test]
    fn functions() {
        assert_eq!(normalize("√(16)"), "sqrt(16)");
        assert_eq!(normalize("ln(e)+log(100)"), "ln(e)+log(100)");
    }

    #[test]
    fn factorial() {
        assert_eq!(normalize("5!"), "fact(5)");
        assert_eq!(normalize("12!+3!"), "fact(12)+fact(3)");
        assert_eq!(normalize("(2+3)!"), "(2+3)!");
        assert_eq!(normalize("2.5!"), "2.fact(5)");
    }
}
