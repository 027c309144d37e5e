use std::f64::consts;
use std::fmt;

use num::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{CalcError, PartialComp};

/// Default cap on how deeply parentheses, function calls, signs and powers
/// may nest.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Largest integer whose factorial is still a finite `f64`.
const MAX_FACTORIAL: u32 = 170;

/// Names understood by [`ScientificEnvironment`].
pub const FUNCTION_NAMES: &[&str] = &[
    "sin", "cos", "tan", "asin", "acos", "atan", "sinh", "cosh", "tanh", "asinh", "acosh",
    "atanh", "ln", "log", "sqrt", "cbrt", "fact", "recip",
];
pub const CONSTANT_NAMES: &[&str] = &["pi", "e"];

/// How trigonometric arguments and results are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AngleMode {
    #[default]
    Radians,
    Degrees,
}

impl AngleMode {
    pub fn toggle(self) -> Self {
        match self {
            AngleMode::Radians => AngleMode::Degrees,
            AngleMode::Degrees => AngleMode::Radians,
        }
    }

    /// Convert an angle in this mode to radians.
    pub fn to_radians(self, x: f64) -> f64 {
        match self {
            AngleMode::Radians => x,
            AngleMode::Degrees => x.to_radians(),
        }
    }

    /// Convert an angle in radians to this mode.
    pub fn from_radians(self, x: f64) -> f64 {
        match self {
            AngleMode::Radians => x,
            AngleMode::Degrees => x.to_degrees(),
        }
    }
}

impl fmt::Display for AngleMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AngleMode::Radians => write!(f, "Radians"),
            AngleMode::Degrees => write!(f, "Degrees"),
        }
    }
}

/// Represents an environment for evaluating a mathematical expression
pub trait Environment {
    /// Look up the arity of an atom:
    /// - Constants have an arity of zero
    /// - Functions take exactly one bracketed argument
    /// - If a symbol is not defined, return None
    fn arity(&self, atom: &str) -> Option<usize>;

    /// Resolve an atom given the name of the atom and its arguments
    /// Precondition: `args.len() == self.arity(atom)`
    fn resolve(&self, atom: &str, args: &[f64]) -> Result<f64, CalcError>;

    /// Deepest nesting the parser will accept before giving up.
    fn max_depth(&self) -> usize {
        DEFAULT_MAX_DEPTH
    }
}

/// The constants and functions found on a scientific calculator keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScientificEnvironment {
    pub angle_mode: AngleMode,
    pub max_depth: usize,
}

impl ScientificEnvironment {
    pub fn new(angle_mode: AngleMode) -> Self {
        ScientificEnvironment {
            angle_mode,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn tan(&self, x: f64) -> Result<f64, CalcError> {
        if self.angle_mode == AngleMode::Degrees && (x - 90.0).rem_euclid(180.0) == 0.0 {
            return Err(CalcError::Undefined(PartialComp::unary("tan", x)));
        }
        Ok(self.angle_mode.to_radians(x).tan())
    }

    fn inverse_trig(&self, name: &str, x: f64, f: fn(f64) -> f64) -> Result<f64, CalcError> {
        if !(-1.0..=1.0).contains(&x) {
            return Err(CalcError::Undefined(PartialComp::unary(name, x)));
        }
        Ok(self.angle_mode.from_radians(f(x)))
    }
}

impl Default for ScientificEnvironment {
    fn default() -> Self {
        ScientificEnvironment::new(AngleMode::default())
    }
}

fn undefined_unless(name: &str, x: f64, defined: bool) -> Result<f64, CalcError> {
    if defined {
        Ok(x)
    } else {
        Err(CalcError::Undefined(PartialComp::unary(name, x)))
    }
}

impl Environment for ScientificEnvironment {
    fn arity(&self, atom: &str) -> Option<usize> {
        if CONSTANT_NAMES.contains(&atom) {
            Some(0)
        } else if FUNCTION_NAMES.contains(&atom) {
            Some(1)
        } else {
            None
        }
    }

    fn resolve(&self, atom: &str, args: &[f64]) -> Result<f64, CalcError> {
        match (atom, args) {
            ("pi", &[]) => Ok(consts::PI),
            ("e", &[]) => Ok(consts::E),
            ("sin", &[x]) => Ok(self.angle_mode.to_radians(x).sin()),
            ("cos", &[x]) => Ok(self.angle_mode.to_radians(x).cos()),
            ("tan", &[x]) => self.tan(x),
            ("asin", &[x]) => self.inverse_trig(atom, x, f64::asin),
            ("acos", &[x]) => self.inverse_trig(atom, x, f64::acos),
            ("atan", &[x]) => Ok(self.angle_mode.from_radians(x.atan())),
            ("sinh", &[x]) => Ok(x.sinh()),
            ("cosh", &[x]) => Ok(x.cosh()),
            ("tanh", &[x]) => Ok(x.tanh()),
            ("asinh", &[x]) => Ok(x.asinh()),
            ("acosh", &[x]) => undefined_unless(atom, x, x >= 1.0).map(f64::acosh),
            ("atanh", &[x]) => undefined_unless(atom, x, x.abs() < 1.0).map(f64::atanh),
            ("ln", &[x]) => undefined_unless(atom, x, x > 0.0).map(f64::ln),
            ("log", &[x]) => undefined_unless(atom, x, x > 0.0).map(f64::log10),
            ("sqrt", &[x]) => undefined_unless(atom, x, x >= 0.0).map(f64::sqrt),
            ("cbrt", &[x]) => Ok(x.cbrt()),
            ("fact", &[x]) => factorial(x),
            ("recip", &[x]) => {
                if x == 0.0 {
                    Err(CalcError::DivideByZero)
                } else {
                    Ok(1.0 / x)
                }
            }
            _ => Err(CalcError::UnknownAtom(atom.to_owned())),
        }
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// `n!` for a non-negative integer `n`. The argument range is checked
/// before recursing, so the recursion is never deeper than 170 frames.
pub fn factorial(n: f64) -> Result<f64, CalcError> {
    if n < 0.0 || n.fract() != 0.0 {
        return Err(CalcError::Undefined(PartialComp::unary("fact", n)));
    }
    match n.to_u32() {
        Some(k) if k <= MAX_FACTORIAL => Ok(factorial_of(k)),
        _ => Err(CalcError::WouldOverflow(PartialComp::unary("fact", n))),
    }
}

fn factorial_of(n: u32) -> f64 {
    if n <= 1 {
        1.0
    } else {
        f64::from(n) * factorial_of(n - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn factorials() {
        assert_eq!(factorial(0.0), Ok(1.0));
        assert_eq!(factorial(1.0), Ok(1.0));
        assert_eq!(factorial(5.0), Ok(120.0));
        assert_eq!(factorial(-1.0).map_err(|e| e.kind()), Err(ErrorKind::Domain));
        assert_eq!(factorial(2.5).map_err(|e| e.kind()), Err(ErrorKind::Domain));
        assert!(factorial(170.0).map(f64::is_finite).unwrap_or(false));
        assert_eq!(factorial(171.0).map_err(|e| e.kind()), Err(ErrorKind::Overflow));
    }

    #[test]
    fn arity() {
        let env = ScientificEnvironment::default();
        assert_eq!(env.arity("pi"), Some(0));
        assert_eq!(env.arity("e"), Some(0));
        assert_eq!(env.arity("asinh"), Some(1));
        assert_eq!(env.arity("x"), None);
    }

    #[test]
    fn degrees() {
        let env = ScientificEnvironment::new(AngleMode::Degrees);
        let sin = env.resolve("sin", &[90.0]).unwrap();
        assert!((sin - 1.0).abs() < 1e-12);
        let asin = env.resolve("asin", &[1.0]).unwrap();
        assert!((asin - 90.0).abs() < 1e-9);
        assert_eq!(
            env.resolve("tan", &[270.0]).map_err(|e| e.kind()),
            Err(ErrorKind::Domain)
        );
        assert_eq!(
            env.resolve("tan", &[-90.0]).map_err(|e| e.kind()),
            Err(ErrorKind::Domain)
        );
        assert!(env.resolve("tan", &[45.0]).is_ok());
    }

    #[test]
    fn hyperbolic_ignores_angle_mode() {
        let rad = ScientificEnvironment::new(AngleMode::Radians);
        let deg = ScientificEnvironment::new(AngleMode::Degrees);
        for name in &["sinh", "cosh", "tanh", "asinh"] {
            assert_eq!(rad.resolve(name, &[0.5]), deg.resolve(name, &[0.5]));
        }
    }

    #[test]
    fn domains() {
        let env = ScientificEnvironment::default();
        let cases: &[(&str, f64)] = &[
            ("asin", 1.5),
            ("acos", -2.0),
            ("ln", 0.0),
            ("log", -10.0),
            ("sqrt", -4.0),
            ("acosh", 0.5),
            ("atanh", 1.0),
        ];
        for &(name, x) in cases {
            assert_eq!(
                env.resolve(name, &[x]).map_err(|e| e.kind()),
                Err(ErrorKind::Domain),
                "{}({})",
                name,
                x
            );
        }
        assert_eq!(env.resolve("recip", &[0.0]), Err(CalcError::DivideByZero));
        assert_eq!(env.resolve("recip", &[4.0]), Ok(0.25));
    }
}
