use std::io::{self, stdin, stdout, BufRead, Write};
use std::process::exit;

use clap::{crate_version, value_t, App, Arg};
use liner::{BasicCompleter, Context, Prompt};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use scicalc::{
    eval_with_env, AngleMode, CalcError, Composer, EvaluationOutcome, Input, ScientificEnvironment,
    Value, DEFAULT_MAX_DEPTH, ERROR_DISPLAY, FUNCTION_NAMES,
};

const PROMPT: &str = "[]> ";

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("scicalc: {0}")]
    Calc(#[from] CalcError),
    #[error("scicalc: {0}")]
    IO(#[from] io::Error),
    #[error("scicalc: {0}")]
    Json(#[from] serde_json::Error),
}

struct Settings {
    angle_mode: AngleMode,
    max_depth: usize,
    json: bool,
}

fn init_tracing(verbosity: u64) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Evaluate a single expression given on the command line.
fn one_shot<W: Write>(out: &mut W, expr: &str, settings: &Settings) -> Result<(), RuntimeError> {
    let env = ScientificEnvironment::new(settings.angle_mode).with_max_depth(settings.max_depth);
    let value = eval_with_env(expr, &env)?;
    if settings.json {
        let outcome = EvaluationOutcome::new(expr, &value);
        writeln!(out, "{}", serde_json::to_string(&outcome)?)?;
    } else {
        writeln!(out, "{}", value)?;
    }
    Ok(())
}

/// Run one line of a session. Returns false once the user asks to leave.
fn session_line<W: Write>(
    out: &mut W,
    composer: &mut Composer,
    line: &str,
) -> Result<bool, RuntimeError> {
    let command = match line.trim() {
        "" => return Ok(true),
        "exit" | "quit" => return Ok(false),
        "deg" | "rad" => {
            let wanted = if line.trim() == "deg" {
                AngleMode::Degrees
            } else {
                AngleMode::Radians
            };
            if composer.flags().angle_mode != wanted {
                composer.compose(Input::ToggleAngleMode);
            }
            writeln!(out, "{}", wanted)?;
            return Ok(true);
        }
        "mc" => Input::MemoryClear,
        "m+" => Input::MemoryAdd,
        "m-" => Input::MemorySubtract,
        "mr" => Input::MemoryRecall,
        "ans" => Input::Answer,
        "rnd" => Input::Random,
        "clear" => Input::Clear,
        expr => {
            composer.paste(expr);
            match composer.evaluate() {
                Ok(outcome) => writeln!(out, "{}", outcome.formatted_result)?,
                Err(err) => writeln!(out, "{}: {}", ERROR_DISPLAY, err)?,
            }
            return Ok(true);
        }
    };

    let display = composer.compose(command);
    match command {
        Input::MemoryClear | Input::MemoryAdd | Input::MemorySubtract => {
            writeln!(out, "M = {}", Value::from(display.memory))?
        }
        _ => writeln!(out, "{}", display.buffer)?,
    }
    Ok(true)
}

fn batch<W: Write>(out: &mut W, composer: &mut Composer) -> Result<(), RuntimeError> {
    let stdin = stdin();
    for line in stdin.lock().lines() {
        if !session_line(out, composer, &line?)? {
            break;
        }
    }
    Ok(())
}

fn interactive<W: Write>(out: &mut W, composer: &mut Composer) -> Result<(), RuntimeError> {
    let mut con = Context::new();
    let mut completer = BasicCompleter::new(FUNCTION_NAMES.to_vec());
    loop {
        let line = match con.read_line(Prompt::from(PROMPT), None, &mut completer) {
            Ok(line) => line,
            Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(ref err) if err.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err.into()),
        };
        if !session_line(out, composer, &line)? {
            break;
        }
        out.flush()?;
        con.history.push(line.into())?;
    }
    Ok(())
}

pub fn calc() -> Result<(), RuntimeError> {
    let matches = App::new("scicalc")
        .version(crate_version!())
        .about("Scientific calculator")
        .arg(
            Arg::with_name("degrees")
                .short("d")
                .long("degrees")
                .help("Interpret trigonometric angles in degrees"),
        )
        .arg(
            Arg::with_name("max-depth")
                .long("max-depth")
                .takes_value(true)
                .value_name("N")
                .help("Deepest nesting of parentheses and functions to accept"),
        )
        .arg(
            Arg::with_name("json")
                .short("j")
                .long("json")
                .help("Print the result of an expression as JSON"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Log more; repeat for more detail"),
        )
        .arg(
            Arg::with_name("expr")
                .multiple(true)
                .allow_hyphen_values(true)
                .help("Expression to evaluate; starts a session when omitted"),
        )
        .get_matches();

    init_tracing(matches.occurrences_of("verbose"));

    let max_depth = if matches.is_present("max-depth") {
        value_t!(matches, "max-depth", usize).unwrap_or_else(|e| e.exit())
    } else {
        DEFAULT_MAX_DEPTH
    };
    let settings = Settings {
        angle_mode: if matches.is_present("degrees") {
            AngleMode::Degrees
        } else {
            AngleMode::Radians
        },
        max_depth,
        json: matches.is_present("json"),
    };

    let stdout = stdout();
    let mut stdout = stdout.lock();

    if let Some(args) = matches.values_of("expr") {
        let expr = args.collect::<Vec<_>>().join(" ");
        return one_shot(&mut stdout, &expr, &settings);
    }

    let mut composer = Composer::new()
        .with_angle_mode(settings.angle_mode)
        .with_max_depth(settings.max_depth);
    if atty::is(atty::Stream::Stdin) {
        interactive(&mut stdout, &mut composer)
    } else {
        batch(&mut stdout, &mut composer)
    }
}

fn main() {
    let code = match calc() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    };
    exit(code)
}
