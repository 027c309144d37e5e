//! The calculator session: one expression buffer, the mode flags, the
//! memory register and the rules that turn key presses into edits.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::env::{AngleMode, ScientificEnvironment, DEFAULT_MAX_DEPTH};
use crate::error::CalcError;
use crate::outcome::{EvaluationOutcome, Explanation, ResultSink};
use crate::value::Value;

/// Shown in the buffer after a failed evaluation.
pub const ERROR_DISPLAY: &str = "Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComposerState {
    /// Keys extend the buffer.
    Composing,
    /// Just evaluated or cleared; the next digit starts a new buffer.
    FreshResult,
    /// The last evaluation failed.
    ErrorState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModeFlags {
    pub angle_mode: AngleMode,
    pub inverse: bool,
    pub hyperbolic: bool,
    /// The next digit replaces the buffer instead of extending it.
    pub fresh_entry: bool,
}

/// Everything a front end needs to draw the calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    pub buffer: String,
    pub history: String,
    pub flags: ModeFlags,
    pub state: ComposerState,
    pub memory: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantKey {
    Pi,
    Euler,
}

impl ConstantKey {
    pub fn symbol(self) -> &'static str {
        match self {
            ConstantKey::Pi => "π",
            ConstantKey::Euler => "e",
        }
    }
}

/// Keys that append their symbol to whatever is already in the buffer.
/// `eⁿ` is the exception: it opens a new operand like a digit does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Percent,
    Factorial,
    /// `EXP`: scientific-notation exponent.
    Exponent,
    /// `eⁿ`: Euler's number raised to what follows.
    NaturalPower,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
            Operator::Power => "^",
            Operator::Percent => "%",
            Operator::Factorial => "!",
            Operator::Exponent => "e+",
            Operator::NaturalPower => "e^",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKey {
    Sin,
    Cos,
    Tan,
    Ln,
    Log,
    Sqrt,
    Cbrt,
    Reciprocal,
}

impl FunctionKey {
    /// The text a key press opens, e.g. `asinh(` for `Sin` with both the
    /// inverse and hyperbolic flags set.
    pub fn opening(self, inverse: bool, hyperbolic: bool) -> String {
        let base = match self {
            FunctionKey::Sin => "sin",
            FunctionKey::Cos => "cos",
            FunctionKey::Tan => "tan",
            FunctionKey::Ln => return "ln(".to_owned(),
            FunctionKey::Log => return "log(".to_owned(),
            FunctionKey::Sqrt => return "√(".to_owned(),
            FunctionKey::Cbrt => return "cbrt(".to_owned(),
            FunctionKey::Reciprocal => return "recip(".to_owned(),
        };
        format!(
            "{}{}{}(",
            if inverse { "a" } else { "" },
            base,
            if hyperbolic { "h" } else { "" }
        )
    }
}

/// A discrete key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// `0`-`9` or `.`
    Digit(char),
    Constant(ConstantKey),
    OpenParen,
    CloseParen,
    Operator(Operator),
    Function(FunctionKey),
    ToggleInverse,
    ToggleHyperbolic,
    ToggleAngleMode,
    Backspace,
    Clear,
    Evaluate,
    MemoryClear,
    MemoryAdd,
    MemorySubtract,
    MemoryRecall,
    /// Recall the last result.
    Answer,
    /// A random number in [0, 1) with three decimals.
    Random,
}

pub struct Composer {
    buffer: String,
    history: String,
    flags: ModeFlags,
    state: ComposerState,
    memory: f64,
    last_result: Option<Value>,
    max_depth: usize,
    rng: StdRng,
    sink: Option<Box<dyn ResultSink>>,
}

impl Default for Composer {
    fn default() -> Self {
        Composer::new()
    }
}

impl Composer {
    pub fn new() -> Self {
        Composer::with_rng(StdRng::from_entropy())
    }

    /// A session whose `Random` key is reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Composer::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Composer {
            buffer: "0".to_owned(),
            history: String::new(),
            flags: ModeFlags {
                fresh_entry: true,
                ..ModeFlags::default()
            },
            state: ComposerState::FreshResult,
            memory: 0.0,
            last_result: None,
            max_depth: DEFAULT_MAX_DEPTH,
            rng,
            sink: None,
        }
    }

    pub fn with_angle_mode(mut self, angle_mode: AngleMode) -> Self {
        self.flags.angle_mode = angle_mode;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Register the receiver of successful evaluations.
    pub fn set_sink(&mut self, sink: Box<dyn ResultSink>) {
        self.sink = Some(sink);
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn history(&self) -> &str {
        &self.history
    }

    pub fn state(&self) -> ComposerState {
        self.state
    }

    pub fn flags(&self) -> ModeFlags {
        self.flags
    }

    pub fn memory(&self) -> f64 {
        self.memory
    }

    pub fn display(&self) -> DisplayState {
        DisplayState {
            buffer: self.buffer.clone(),
            history: self.history.clone(),
            flags: self.flags,
            state: self.state,
            memory: self.memory,
        }
    }

    /// Apply one key press and return what the display should show.
    pub fn compose(&mut self, input: Input) -> DisplayState {
        match input {
            Input::Digit(d) => self.digit(d),
            Input::Constant(key) => self.insert(key.symbol()),
            Input::OpenParen => self.insert("("),
            Input::CloseParen => self.insert(")"),
            Input::Operator(op) => self.operator(op),
            Input::Function(key) => self.function(key),
            Input::ToggleInverse => self.flags.inverse = !self.flags.inverse,
            Input::ToggleHyperbolic => self.flags.hyperbolic = !self.flags.hyperbolic,
            Input::ToggleAngleMode => self.flags.angle_mode = self.flags.angle_mode.toggle(),
            Input::Backspace => self.backspace(),
            Input::Clear => self.clear(),
            Input::Evaluate => {
                // the outcome reaches the sink; the display shows the rest
                let _ = self.evaluate();
            }
            Input::MemoryClear => self.memory = 0.0,
            Input::MemoryAdd => self.memory_update(1.0),
            Input::MemorySubtract => self.memory_update(-1.0),
            Input::MemoryRecall => {
                let recalled = Value::from(self.memory).to_string();
                self.insert(&recalled);
            }
            Input::Answer => {
                if let Some(answer) = self.last_result {
                    self.insert(&answer.to_string());
                }
            }
            Input::Random => {
                let x: f64 = self.rng.gen();
                self.insert(&format!("{:.3}", x));
            }
        }
        trace!(?input, buffer = %self.buffer, state = ?self.state, "composed");
        self.display()
    }

    fn set_state(&mut self, state: ComposerState) {
        self.state = state;
        self.flags.fresh_entry = state != ComposerState::Composing;
    }

    /// Digits and everything that behaves like one: replace the buffer on
    /// a fresh entry, after an error or over a lone zero, otherwise append.
    fn insert(&mut self, text: &str) {
        if self.state != ComposerState::Composing || self.buffer == "0" {
            self.buffer.clear();
            if text.starts_with('.') {
                self.buffer.push('0');
            }
        }
        self.buffer.push_str(text);
        self.set_state(ComposerState::Composing);
    }

    /// Whether the number at the end of the buffer already has a point.
    fn has_decimal_point(&self) -> bool {
        self.state == ComposerState::Composing
            && self
                .buffer
                .chars()
                .rev()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .any(|c| c == '.')
    }

    fn digit(&mut self, d: char) {
        if d == '.' && self.has_decimal_point() {
            debug!(buffer = %self.buffer, "number already has a decimal point");
        } else if d.is_ascii_digit() || d == '.' {
            let mut text = [0u8; 4];
            self.insert(d.encode_utf8(&mut text));
        } else {
            debug!(digit = %d, "ignoring non-digit key");
        }
    }

    fn operator(&mut self, op: Operator) {
        if op == Operator::NaturalPower {
            // starts a new operand rather than continuing one
            self.insert(op.symbol());
            return;
        }
        if self.state == ComposerState::ErrorState {
            self.buffer = "0".to_owned();
        }
        self.buffer.push_str(op.symbol());
        self.set_state(ComposerState::Composing);
    }

    fn function(&mut self, key: FunctionKey) {
        let opening = key.opening(self.flags.inverse, self.flags.hyperbolic);
        self.insert(&opening);
    }

    fn backspace(&mut self) {
        if self.state == ComposerState::ErrorState {
            self.buffer = "0".to_owned();
            self.set_state(ComposerState::FreshResult);
            return;
        }
        self.buffer.pop();
        if self.buffer.is_empty() {
            self.buffer.push('0');
        }
    }

    pub fn clear(&mut self) {
        self.buffer = "0".to_owned();
        self.history.clear();
        self.set_state(ComposerState::FreshResult);
    }

    /// Replace the buffer with typed or pasted text.
    pub fn paste(&mut self, text: &str) -> DisplayState {
        self.buffer = text.trim().to_owned();
        if self.buffer.is_empty() {
            self.buffer.push('0');
        }
        self.set_state(ComposerState::Composing);
        self.display()
    }

    /// The number the memory keys act on: the shown result or a plain
    /// number being typed. Partial expressions have no value yet.
    fn current_value(&self) -> Option<f64> {
        match self.state {
            ComposerState::ErrorState => None,
            _ => self.buffer.parse::<Value>().ok().map(|v| v.as_float()),
        }
    }

    fn memory_update(&mut self, sign: f64) {
        match self.current_value() {
            Some(x) => self.memory += sign * x,
            None => debug!(buffer = %self.buffer, "no value for memory update"),
        }
    }

    /// Evaluate the buffer in the current angle mode.
    ///
    /// On success the buffer shows the formatted result, the history shows
    /// the consumed expression and the registered sink receives the outcome.
    /// On failure the buffer shows `Error`.
    pub fn evaluate(&mut self) -> Result<EvaluationOutcome, CalcError> {
        let angle_mode = self.flags.angle_mode;
        let env = ScientificEnvironment::new(angle_mode).with_max_depth(self.max_depth);
        match crate::eval_with_env(&self.buffer, &env) {
            Ok(value) => {
                let outcome = EvaluationOutcome::new(&self.buffer, &value);
                self.history = format!("{} =", self.buffer);
                self.buffer = outcome.formatted_result.clone();
                self.last_result = Some(value);
                self.set_state(ComposerState::FreshResult);
                if let Some(sink) = self.sink.as_mut() {
                    let explanation = Explanation::new(&outcome, angle_mode);
                    sink.on_result(&outcome, &explanation);
                }
                Ok(outcome)
            }
            Err(err) => {
                debug!(buffer = %self.buffer, error = %err, "evaluation failed");
                self.buffer = ERROR_DISPLAY.to_owned();
                self.set_state(ComposerState::ErrorState);
                Err(err)
            }
        }
    }
}
