use super::*;
use proptest::prelude::*;

/// For some string input, compare the formatted `eval(_)` against the
/// expected output
fn compare(input: &str, mode: AngleMode, expected: &str) {
    match eval_with_mode(input, mode) {
        Ok(output) => assert_eq!(output.to_string(), expected, "{}", input),
        Err(err) => panic!("{} failed: {}", input, err),
    }
}

fn kind_of(input: &str) -> Option<ErrorKind> {
    eval(input).err().map(|e| e.kind())
}

fn press(composer: &mut Composer, inputs: &[Input]) -> DisplayState {
    let mut display = composer.display();
    for &input in inputs {
        display = composer.compose(input);
    }
    display
}

#[test]
fn basics() {
    let cases = vec![
        ("1 + 1", "2"),
        ("4×7-14", "14"),
        ("((4 × 18) ÷ 16) / 3", "1.5"),
        ("2^3^2", "512"),
        ("-2^2", "4"),
        ("2^-1", "0.5"),
        ("0.1+0.2", "0.3"),
        ("1000000.1+0.2", "1000000.3"),
        ("50%", "0.5"),
        ("200×10%", "20"),
        ("√(16)+2^3", "12"),
        ("cbrt(27)", "3"),
        ("recip(8)", "0.125"),
        ("π", "3.1415926536"),
        ("e", "2.7182818285"),
        ("ln(e^2)", "2"),
        ("log(1000)", "3"),
        ("1e+3+1", "1001"),
        ("2.5e-3×4", "0.01"),
        ("1e+21", "1e+21"),
    ];
    for (input, expected) in cases {
        compare(input, AngleMode::Radians, expected);
    }
}

#[test]
fn random() {
    let cases = vec![
        ("((15 × 10) - 26 × 19 - 30 ÷ ((57 × 79 + 93 ÷ 87 ÷ 47))) ÷ 8", "-43.0008327739"),
        ("(3 × 6) × 7 + (40 ÷ 3)", "139.3333333333"),
        ("(21 - (5) + (20 × 81)) ÷ (25 × 3)", "21.8133333333"),
    ];
    for (input, expected) in cases {
        compare(input, AngleMode::Radians, expected);
    }
}

#[test]
fn trigonometry() {
    compare("sin(30)", AngleMode::Degrees, "0.5");
    compare("cos(60)", AngleMode::Degrees, "0.5");
    compare("tan(45)", AngleMode::Degrees, "1");
    compare("acos(0.5)", AngleMode::Degrees, "60");
    compare("atan(1)", AngleMode::Degrees, "45");
    compare("atan(1)×4", AngleMode::Radians, "3.1415926536");
    compare("sinh(0)+cosh(0)", AngleMode::Degrees, "1");
    compare("atanh(tanh(0.5))", AngleMode::Degrees, "0.5");

    let degrees = eval_with_mode("sin(90)", AngleMode::Degrees).unwrap();
    let radians = eval_with_mode("sin(π/2)", AngleMode::Radians).unwrap();
    assert_eq!(degrees.as_float(), radians.as_float());
}

#[test]
fn factorials() {
    compare("fact(0)", AngleMode::Radians, "1");
    compare("5!", AngleMode::Radians, "120");
    compare("3!+4!", AngleMode::Radians, "30");
    assert_eq!(kind_of("fact(-1)"), Some(ErrorKind::Domain));
    assert_eq!(kind_of("fact(2.5)"), Some(ErrorKind::Domain));
    assert_eq!(kind_of("171!"), Some(ErrorKind::Overflow));
    // only literal digit runs take a postfix factorial
    assert_eq!(kind_of("(2+3)!"), Some(ErrorKind::Syntax));
}

#[test]
fn error_kinds() {
    assert_eq!(eval("5/0"), Err(CalcError::DivideByZero));
    assert_eq!(kind_of("ln(0)"), Some(ErrorKind::Domain));
    assert_eq!(kind_of("asin(2)"), Some(ErrorKind::Domain));
    assert_eq!(kind_of("√(-1)"), Some(ErrorKind::Domain));
    assert_eq!(kind_of("10^400"), Some(ErrorKind::Overflow));
    assert_eq!(kind_of("1+"), Some(ErrorKind::Syntax));
    assert_eq!(kind_of("sin(30"), Some(ErrorKind::Syntax));
    assert_eq!(kind_of("sin()"), Some(ErrorKind::Syntax));
    assert_eq!(kind_of("2π"), Some(ErrorKind::Syntax));
    assert_eq!(kind_of("Error"), Some(ErrorKind::Syntax));
    assert_eq!(kind_of("1e5"), Some(ErrorKind::Syntax));
    assert_eq!(kind_of("1E5"), Some(ErrorKind::Syntax));
    let long = "1+".repeat(MAX_INPUT_LEN) + "1";
    assert_eq!(eval(&long), Err(CalcError::TooLong(MAX_INPUT_LEN)));
}

#[test]
fn nesting_depth() {
    let at_cap = format!("{}1{}", "(".repeat(DEFAULT_MAX_DEPTH), ")".repeat(DEFAULT_MAX_DEPTH));
    compare(&at_cap, AngleMode::Radians, "1");
    let over = format!("({})", at_cap);
    assert_eq!(eval(&over), Err(CalcError::TooDeep(DEFAULT_MAX_DEPTH)));

    let functions = format!("{}0{}", "sin(".repeat(65), ")".repeat(65));
    assert_eq!(kind_of(&functions), Some(ErrorKind::Overflow));
    let signs = format!("{}1", "-".repeat(65));
    assert_eq!(kind_of(&signs), Some(ErrorKind::Overflow));
    let powers = format!("1{}", "^1".repeat(65));
    assert_eq!(kind_of(&powers), Some(ErrorKind::Overflow));
}

#[test]
fn custom_environment() {
    struct Shallow;
    impl Environment for Shallow {
        fn arity(&self, atom: &str) -> Option<usize> {
            ScientificEnvironment::default().arity(atom)
        }
        fn resolve(&self, atom: &str, args: &[f64]) -> Result<f64, CalcError> {
            ScientificEnvironment::default().resolve(atom, args)
        }
        fn max_depth(&self) -> usize {
            2
        }
    }
    assert!(eval_with_env("((1))", &Shallow).is_ok());
    assert_eq!(eval_with_env("(((1)))", &Shallow), Err(CalcError::TooDeep(2)));
}

#[test]
fn scenario_addition() {
    let mut composer = Composer::new();
    let display = press(
        &mut composer,
        &[
            Input::Digit('1'),
            Input::Digit('2'),
            Input::Operator(Operator::Add),
            Input::Digit('8'),
            Input::Evaluate,
        ],
    );
    assert_eq!(display.buffer, "20");
    assert_eq!(display.history, "12+8 =");
    assert_eq!(display.state, ComposerState::FreshResult);

    // the next digit starts over
    let display = press(&mut composer, &[Input::Digit('3')]);
    assert_eq!(display.buffer, "3");
}

#[test]
fn scenario_factorial_key() {
    let mut composer = Composer::new();
    press(&mut composer, &[Input::Digit('5'), Input::Operator(Operator::Factorial)]);
    assert_eq!(normalize(composer.buffer()), "fact(5)");
    let outcome = composer.evaluate().unwrap();
    assert_eq!(outcome.formatted_result, "120");
    assert_eq!(outcome.raw_value, 120.0);
    assert_eq!(outcome.consumed_expression, "5!");
}

#[test]
fn scenario_degrees() {
    let mut composer = Composer::new();
    let display = press(
        &mut composer,
        &[
            Input::ToggleAngleMode,
            Input::Function(FunctionKey::Sin),
            Input::Digit('3'),
            Input::Digit('0'),
            Input::CloseParen,
            Input::Evaluate,
        ],
    );
    assert_eq!(display.buffer, "0.5");
    assert_eq!(display.history, "sin(30) =");
    assert_eq!(display.flags.angle_mode, AngleMode::Degrees);
}

#[test]
fn scenario_division_by_zero() {
    let mut composer = Composer::new();
    press(
        &mut composer,
        &[Input::Digit('5'), Input::Operator(Operator::Divide), Input::Digit('0')],
    );
    let err = composer.evaluate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Domain);
    assert_eq!(composer.state(), ComposerState::ErrorState);
    assert_eq!(composer.buffer(), ERROR_DISPLAY);
    assert_eq!(composer.history(), "");
}

#[test]
fn scenario_clear_from_every_state() {
    let mut composer = Composer::new();
    for setup in &["7", "7+", "7÷0"] {
        composer.paste(setup);
        if setup.ends_with('0') {
            let _ = composer.evaluate();
        }
        let display = composer.compose(Input::Clear);
        assert_eq!(display.buffer, "0");
        assert_eq!(display.state, ComposerState::FreshResult);
    }
}

#[test]
fn scenario_scientific_keys() {
    let mut composer = Composer::new();
    let display = press(
        &mut composer,
        &[
            Input::Digit('2'),
            Input::Operator(Operator::Exponent),
            Input::Digit('3'),
            Input::Evaluate,
        ],
    );
    assert_eq!(display.history, "2e+3 =");
    assert_eq!(display.buffer, "2000");

    let display = press(
        &mut composer,
        &[
            Input::Operator(Operator::NaturalPower),
            Input::Digit('0'),
            Input::Evaluate,
        ],
    );
    assert_eq!(display.buffer, "1");

    let display = press(
        &mut composer,
        &[
            Input::Function(FunctionKey::Reciprocal),
            Input::Digit('4'),
            Input::CloseParen,
            Input::Operator(Operator::Add),
            Input::Constant(ConstantKey::Pi),
            Input::Operator(Operator::Subtract),
            Input::Constant(ConstantKey::Pi),
            Input::Evaluate,
        ],
    );
    assert_eq!(display.history, "recip(4)+π-π =");
    assert_eq!(display.buffer, "0.25");
}

#[test]
fn results_can_be_evaluated_again() {
    let mut composer = Composer::new();
    composer.paste("2^100");
    let first = composer.evaluate().unwrap();
    assert_eq!(first.formatted_result, "1.2676506002282294e+30");
    let second = composer.evaluate().unwrap();
    assert_eq!(second.consumed_expression, first.formatted_result);
    assert_eq!(second.formatted_result, first.formatted_result);
}

fn flat_and_parenthesized(numbers: &[u32], ops: &[char]) -> (String, String) {
    let mut flat = numbers[0].to_string();
    for (op, n) in ops.iter().zip(&numbers[1..]) {
        flat.push(*op);
        flat.push_str(&n.to_string());
    }

    // group multiplicative runs into terms, then chain the terms
    let mut terms = vec![numbers[0].to_string()];
    let mut additive = Vec::new();
    for (op, n) in ops.iter().zip(&numbers[1..]) {
        match *op {
            '*' | '/' => {
                let last = terms.pop().unwrap_or_default();
                terms.push(format!("({}{}{})", last, op, n));
            }
            _ => {
                additive.push(*op);
                terms.push(n.to_string());
            }
        }
    }
    let mut full = terms[0].clone();
    for (op, term) in additive.iter().zip(&terms[1..]) {
        full = format!("({}{}{})", full, op, term);
    }
    (flat, full)
}

proptest! {
    #[test]
    fn parenthesization_preserves_precedence(
        numbers in prop::collection::vec(1u32..1000, 2..12),
        ops in prop::collection::vec(prop_oneof![Just('+'), Just('-'), Just('*'), Just('/')], 11),
    ) {
        let ops = &ops[..numbers.len() - 1];
        let (flat, full) = flat_and_parenthesized(&numbers, ops);
        prop_assert_eq!(eval(&flat), eval(&full), "{} vs {}", flat, full);
    }

    #[test]
    fn formatting_is_idempotent(x in -1e30f64..1e30) {
        let once = Value::from(x).to_string();
        let twice = once.parse::<Value>().map(|v| v.to_string());
        prop_assert_eq!(Ok(once.clone()), twice);
    }

    #[test]
    fn nesting_within_cap_terminates(depth in 0usize..=DEFAULT_MAX_DEPTH) {
        let input = format!("{}2{}", "(".repeat(depth), ")".repeat(depth));
        prop_assert!(eval(&input).is_ok());
        let over = format!("{}2{}", "(".repeat(depth + DEFAULT_MAX_DEPTH + 1), ")".repeat(depth + DEFAULT_MAX_DEPTH + 1));
        prop_assert_eq!(eval(&over).map_err(|e| e.kind()), Err(ErrorKind::Overflow));
    }
}
