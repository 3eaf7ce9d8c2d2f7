mod debug_report;

use chrono::NaiveDateTime;
use recurrent::{Context, ProcessorOptions, process_verbose_with};
use std::collections::BTreeSet;
use std::io::{self, IsTerminal, Read};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const DEFAULT_REFERENCE: &str = "2013-02-12T04:30:00";

const HANDLER_NAMES: [&str; 5] = ["frequency", "interval", "weekday", "month_day", "end_date"];

#[derive(Debug, Error)]
enum CliError {
    #[error("error: {0} expects a value")]
    MissingValue(&'static str),
    #[error("error: invalid --reference '{0}' (expected YYYY-MM-DDTHH:MM:SS)")]
    InvalidReference(String),
    #[error("error: unknown handler '{0}' (expected one of: {names})", names = HANDLER_NAMES.join(", "))]
    UnknownHandler(String),
    #[error("error: unknown option '{0}'")]
    UnknownOption(String),
    #[error("error: input provided multiple times")]
    DuplicateInput,
    #[error("error: no input provided\n\n{}", help_text())]
    NoInput,
    #[error("error: failed to read stdin: {0}")]
    Stdin(#[from] io::Error),
}

fn main() {
    init_logging();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let ctx = Context { reference_time: config.reference_time };
    let opts = ProcessorOptions {
        use_cache: config.use_cache,
        force_handlers: config.only,
        ..ProcessorOptions::default()
    };
    let details = process_verbose_with(&config.input, &ctx, &opts);

    if config.json {
        match serde_json::to_string_pretty(&details.result) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: failed to serialize result: {err}");
                std::process::exit(1);
            }
        }
    } else {
        debug_report::print_run(&details, config.color);
    }

    if details.result.is_none() {
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr so `--json` output stays clean. `RUST_LOG`
/// overrides the default `warn` level.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(io::stderr).init();
}

struct CliConfig {
    input: String,
    reference_time: NaiveDateTime,
    color: bool,
    json: bool,
    use_cache: bool,
    only: Option<BTreeSet<String>>,
}

fn parse_args() -> Result<CliConfig, CliError> {
    let mut input: Option<String> = None;
    let mut reference_time = parse_reference(DEFAULT_REFERENCE)?;
    let mut color = io::stdout().is_terminal();
    let mut json = false;
    let mut use_cache = true;
    let mut only: Option<BTreeSet<String>> = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("recurrent {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--json" => json = true,
            "--no-cache" => use_cache = false,
            "--reference" => {
                let value = args.next().ok_or(CliError::MissingValue("--reference"))?;
                reference_time = parse_reference(&value)?;
            }
            "--only" => {
                let value = args.next().ok_or(CliError::MissingValue("--only"))?;
                only.get_or_insert_with(BTreeSet::new).insert(parse_handler(&value)?);
            }
            "--input" | "-i" => {
                let value = args.next().ok_or(CliError::MissingValue("--input"))?;
                set_input(&mut input, value)?;
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    set_input(&mut input, rest)?;
                }
                break;
            }
            _ if arg.starts_with("--reference=") => {
                reference_time = parse_reference(arg.trim_start_matches("--reference="))?;
            }
            _ if arg.starts_with("--only=") => {
                let value = parse_handler(arg.trim_start_matches("--only="))?;
                only.get_or_insert_with(BTreeSet::new).insert(value);
            }
            _ if arg.starts_with("--input=") => {
                set_input(&mut input, arg.trim_start_matches("--input=").to_string())?;
            }
            _ if arg.starts_with('-') => {
                return Err(CliError::UnknownOption(arg));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                set_input(&mut input, rest)?;
                break;
            }
        }
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(CliError::NoInput);
    }

    Ok(CliConfig { input, reference_time, color, json, use_cache, only })
}

fn set_input(input: &mut Option<String>, value: String) -> Result<(), CliError> {
    if input.is_some() {
        return Err(CliError::DuplicateInput);
    }
    *input = Some(value);
    Ok(())
}

fn read_stdin_input() -> Result<String, CliError> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn parse_reference(value: &str) -> Result<NaiveDateTime, CliError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .map_err(|_| CliError::InvalidReference(value.to_string()))
}

fn parse_handler(value: &str) -> Result<String, CliError> {
    let name = value.trim().to_lowercase().replace('-', "_");
    if HANDLER_NAMES.contains(&name.as_str()) { Ok(name) } else { Err(CliError::UnknownHandler(value.to_string())) }
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "recurrent {version}

Turn a natural-language recurrence phrase into an RRULE.

Usage:
  recurrent [OPTIONS] [--] <pattern...>
  recurrent [OPTIONS] --input <text>

Options:
  -i, --input <text>         Pattern to process. If omitted, reads remaining args
                             or stdin when no args are provided.
  --reference <timestamp>    Reference time in YYYY-MM-DDTHH:MM:SS, used for
                             relative end dates. Default: {default_reference}
  --only <handler>           Only run this handler (repeatable): {handlers}.
  --no-cache                 Bypass the result cache.
  --json                     Print the result as JSON instead of a report.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  RUST_LOG                   Log filter for diagnostics on stderr (default: warn),
                             e.g. RUST_LOG=recurrent=debug.

Exit codes:
  0  Pattern understood.
  1  Pattern not understood.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        default_reference = DEFAULT_REFERENCE,
        handlers = HANDLER_NAMES.join(", "),
    )
}
