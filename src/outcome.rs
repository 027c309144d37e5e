use serde::{Deserialize, Serialize};

use crate::env::AngleMode;
use crate::value::Value;

/// A successful evaluation, as handed to whoever renders results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    /// Rounded to ten decimal places with insignificant zeros dropped.
    pub formatted_result: String,
    /// The value before rounding.
    pub raw_value: f64,
    /// The expression exactly as it stood in the buffer.
    pub consumed_expression: String,
}

impl EvaluationOutcome {
    pub fn new(expression: &str, value: &Value) -> Self {
        EvaluationOutcome {
            formatted_result: value.to_string(),
            raw_value: value.raw(),
            consumed_expression: expression.to_owned(),
        }
    }
}

/// How a result was obtained, in words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub formula: String,
    pub method: String,
    pub steps: Vec<String>,
}

impl Explanation {
    pub fn new(outcome: &EvaluationOutcome, angle_mode: AngleMode) -> Self {
        let unit = match angle_mode {
            AngleMode::Radians => "radian",
            AngleMode::Degrees => "degree",
        };
        Explanation {
            formula: outcome.consumed_expression.clone(),
            method: format!(
                "Standard order of operations. Trigonometric functions use {}.",
                angle_mode
            ),
            steps: vec![
                "1. Rewrite the keypad symbols (×, ÷, π, √, !) as operators, constants and functions."
                    .to_owned(),
                format!("2. Interpret trigonometric arguments and results in {} units.", unit),
                "3. Evaluate parentheses, then exponents, then multiplication and division, then addition and subtraction."
                    .to_owned(),
                format!(
                    "4. Round to 10 decimal places: {}.",
                    outcome.formatted_result
                ),
            ],
        }
    }
}

/// Receives every successful evaluation made by a
/// [`Composer`](crate::Composer).
pub trait ResultSink {
    fn on_result(&mut self, outcome: &EvaluationOutcome, explanation: &Explanation);
}

impl<F> ResultSink for F
where
    F: FnMut(&EvaluationOutcome, &Explanation),
{
    fn on_result(&mut self, outcome: &EvaluationOutcome, explanation: &Explanation) {
        self(outcome, explanation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explanation_names_the_angle_mode() {
        let outcome = EvaluationOutcome::new("sin(30)", &Value::from(0.49999999999999994));
        assert_eq!(outcome.formatted_result, "0.5");
        assert_eq!(outcome.raw_value, 0.49999999999999994);

        let explanation = Explanation::new(&outcome, AngleMode::Degrees);
        assert_eq!(explanation.formula, "sin(30)");
        assert!(explanation.method.contains("Degrees"));
        assert_eq!(explanation.steps.len(), 4);
        assert!(explanation.steps[1].contains("degree"));
        assert!(explanation.steps[3].ends_with("0.5."));
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |outcome: &EvaluationOutcome, _: &Explanation| {
                seen.push(outcome.formatted_result.clone())
            };
            let outcome = EvaluationOutcome::new("1+1", &Value::from(2.0));
            let explanation = Explanation::new(&outcome, AngleMode::Radians);
            sink.on_result(&outcome, &explanation);
        }
        assert_eq!(seen, vec!["2".to_owned()]);
    }
}
