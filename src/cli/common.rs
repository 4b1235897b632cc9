//! Common helper functions shared across the command frontends
//!
//! This module provides the exit codes, the usage block printed with every
//! error, error reporting on stderr, configuration loading and logging setup.

use crate::cli::args::{ColorChoice, CommonArgs};
use crate::config::ToolConfig;
use crate::error::ToolError;
use std::io::{self, IsTerminal, Write};
use termcolor::{Color, ColorSpec, StandardStream, WriteColor};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

/// Exit codes shared by both tools
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_BAD_ARGS: i32 = 0xA0;
pub const EXIT_BAD_FILENAME: i32 = 0xA1;
pub const EXIT_BAD_PATH: i32 = 0xA2;
pub const EXIT_NO_VERSION: i32 = 0xA3;
pub const EXIT_EXCEPTION: i32 = 0xFF;

/// Positional arguments of a tool, used for argument validation and for the
/// usage block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    /// Tool name as invoked
    pub program: &'static str,
    /// Argument names in order
    pub arg_names: &'static [&'static str],
    /// One example value per argument
    pub arg_examples: &'static [&'static str],
}

impl Usage {
    /// Checks the positional argument count
    pub fn validate_args(&self, args: &[String]) -> Result<(), ToolError> {
        if args.len() == self.arg_names.len() {
            Ok(())
        } else {
            Err(ToolError::BadArgs {
                received: args.len(),
                expected: self.arg_names.len(),
            })
        }
    }

    /// Writes the USAGE and EXAMPLE block
    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "USAGE:")?;
        writeln!(out)?;
        writeln!(out, "    {} {}", self.program, self.arg_names.join(" "))?;
        writeln!(out)?;
        writeln!(out, "EXAMPLE:")?;
        writeln!(out)?;
        writeln!(out, "    {} {}", self.program, self.arg_examples.join(" "))?;
        writeln!(out)
    }
}

/// Writes `ERROR: <message>` followed by the usage block
pub fn write_error<W: WriteColor>(out: &mut W, usage: &Usage, message: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(out, "ERROR:")?;
    out.reset()?;
    writeln!(out, " {}", message)?;
    writeln!(out)?;
    usage.write_to(out)
}

/// Reports `err` on stderr and returns the exit code for it
pub fn report_error(usage: &Usage, err: &ToolError, color: ColorChoice) -> i32 {
    let mut stderr = StandardStream::stderr(color_choice(color));
    // Nothing sensible is left to do if stderr itself is gone
    let _ = write_error(&mut stderr, usage, &err.to_string());
    err.exit_code()
}

/// Reports an argument parser failure as a bad-arguments error
pub fn report_parse_error(usage: &Usage, err: &clap::Error) -> i32 {
    let rendered = err.to_string();
    let message = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string();
    report_error(usage, &ToolError::InvalidOption(message), ColorChoice::Auto)
}

fn color_choice(choice: ColorChoice) -> termcolor::ColorChoice {
    match choice {
        ColorChoice::Always => termcolor::ColorChoice::Always,
        ColorChoice::Never => termcolor::ColorChoice::Never,
        ColorChoice::Auto if io::stderr().is_terminal() => termcolor::ColorChoice::Auto,
        ColorChoice::Auto => termcolor::ColorChoice::Never,
    }
}

/// Load the configuration named by `--config`, or the defaults
pub(crate) fn load_config(common: &CommonArgs) -> Result<ToolConfig, ToolError> {
    Ok(ToolConfig::load_or_default(common.config.as_deref())?)
}

/// Install a stderr logger; `verbosity` is the number of `-v` flags
pub fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(true)
        .without_time();

    // A subscriber may already be installed when called more than once
    let _ = tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .try_init();
}
