//! conninfo-parse CLI Entry Point
//!
//! Parses one conninfo string and prints the recognized parameters in
//! delimited (default), shell or JSON format.
//!
//! Exit statuses follow `sysexits.h`: 0 success, 1 parse error, 64 usage
//! error, 69 output format unavailable. Rendered output goes to stdout;
//! diagnostics and logs go to stderr.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use conninfo_parse::{
    parse, Capabilities, Catalog, ConninfoError, ExitStatus, ProcessEnv, Renderer,
    DEFAULT_DELIMITER,
};

const NAME: &str = "conninfo-parse";
const SHORT_USAGE: &str = "[-h|-V] [-q] [-d <dc>|-j|-s] <conninfo>";

/// Log filter directives, e.g. `conninfo_parse=debug`
const LOG_ENV: &str = "CONNINFO_PARSE_LOG";
/// Log format: `compact` (default), `pretty` or `json`
const LOG_FORMAT_ENV: &str = "CONNINFO_PARSE_LOG_FORMAT";

/// Parse a PostgreSQL conninfo string and output the result
#[derive(Parser, Debug)]
#[command(name = NAME)]
#[command(about = "Parse a PostgreSQL conninfo string and output the result")]
#[command(override_usage = "conninfo-parse [-h|-V] [-q] [-d <dc>|-j|-s] <conninfo>")]
#[command(version)]
#[command(args_override_self = true)]
struct Cli {
    /// Suppress normal output (validate only)
    #[arg(short, long)]
    quiet: bool,

    /// Output in delimited format, where <dc> delimits columns and \n delimits rows
    #[arg(
        short = 'd',
        long = "delimited",
        visible_alias = "delimiter",
        value_name = "dc",
        value_parser = delimiter,
        allow_hyphen_values = true,
        overrides_with_all = ["json", "shell"]
    )]
    delimited: Option<String>,

    /// Output in JSON format
    #[arg(short, long, overrides_with_all = ["delimited", "shell"])]
    json: bool,

    /// Output in shell variable format
    #[arg(short, long, overrides_with_all = ["delimited", "json"])]
    shell: bool,

    /// conninfo string to parse
    #[arg(value_name = "conninfo")]
    inputs: Vec<String>,
}

impl Cli {
    fn renderer(&self, caps: &Capabilities) -> conninfo_parse::Result<Renderer> {
        if self.json {
            Renderer::json(caps)
        } else if self.shell {
            Ok(Renderer::shell())
        } else {
            Renderer::delimited(self.delimited.as_deref().unwrap_or(DEFAULT_DELIMITER))
        }
    }

    fn input(&self) -> conninfo_parse::Result<&str> {
        match self.inputs.as_slice() {
            [] => Err(ConninfoError::usage("expected conninfo string")),
            [input] => Ok(input.as_str()),
            [_, extra, ..] => Err(ConninfoError::usage(format!(
                "unexpected argument: {extra}"
            ))),
        }
    }
}

/// Reject an empty `-d` as soon as it is seen, even if a later flag overrides it
fn delimiter(value: &str) -> conninfo_parse::Result<String> {
    Renderer::delimited(value).map(|_| value.to_string())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit(ExitStatus::Ok),
                _ => exit(ExitStatus::Usage),
            };
        }
    };

    init_logging();

    match run(&cli) {
        Ok(()) => exit(ExitStatus::Ok),
        Err(err) => report(&err, cli.quiet),
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let renderer = cli.renderer(&Capabilities::detect())?;
    let input = cli.input()?;
    debug!(format = %renderer.format(), quiet = cli.quiet, "parsing conninfo string");

    let catalog = Catalog::standard();
    let params = parse(input, &catalog, &ProcessEnv)?;
    if cli.quiet {
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(renderer.render(&params).as_bytes())
        .context("Could not write output")?;
    stdout.flush().context("Could not flush output")?;
    Ok(())
}

fn report(err: &anyhow::Error, quiet: bool) -> ExitCode {
    let Some(err) = err.downcast_ref::<ConninfoError>() else {
        eprintln!("{NAME}: {err:#}");
        return exit(ExitStatus::Error);
    };

    debug!(code = err.error_code(), position = ?err.position(), "conninfo-parse failed");
    match err {
        ConninfoError::Parse { .. } => {
            if !quiet {
                eprintln!("{NAME}: parse error: {err}");
            }
        }
        ConninfoError::Usage(_) => {
            eprintln!("{NAME}: {err}");
            eprintln!("usage: {NAME} {SHORT_USAGE}");
        }
        ConninfoError::Unavailable(_) | ConninfoError::Config(_) => {
            eprintln!("{NAME}: {err}");
        }
    }
    exit(err.exit_status())
}

fn exit(status: ExitStatus) -> ExitCode {
    ExitCode::from(status.code())
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true);

    let _ = match std::env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => builder.json().try_init(),
        Ok("pretty") => builder.pretty().try_init(),
        _ => builder.compact().try_init(),
    };
}
