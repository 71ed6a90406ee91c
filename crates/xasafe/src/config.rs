//! Command-line and environment configuration.
//!
//! Everything from the first positional argument on belongs to the child, so
//! `xasafe sh -c 'exit 3'` passes `-c` through untouched.

use std::ffi::OsString;

use clap::Parser;

use crate::dispatch::ForwardMode;

#[derive(Debug, Parser)]
#[command(name = "xasafe", version)]
#[command(about = "Run one command and relay SIGINT/SIGTERM to it; safe to use under xargs")]
pub struct Cli {
    /// Signal sent to the child when a termination request arrives
    #[arg(long, value_enum, env = "XASAFE_FORWARD", default_value_t = ForwardMode::Term)]
    pub forward: ForwardMode,

    /// Enable protocol logging on stderr at this level (error..trace)
    #[arg(long, env = "XASAFE_LOG", value_name = "LEVEL")]
    pub log: Option<tracing::Level>,

    /// Do not print the note about a non-zero child status
    #[arg(short, long, env = "XASAFE_QUIET")]
    pub quiet: bool,

    /// Program to run, followed by its arguments
    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}

pub const USAGE: &str = "xasafe [OPTIONS] COMMAND [ARG]...";

/// One-line message for a parse failure, e.g.
/// `usage: xasafe [OPTIONS] COMMAND [ARG]... (invalid value for one of the arguments)`.
pub fn usage_error(err: &clap::Error) -> String {
    match err.kind().as_str() {
        Some(cause) => format!("usage: {USAGE} ({cause})"),
        None => format!("usage: {USAGE}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("xasafe").chain(args.iter().copied()))
    }

    #[test]
    fn child_flags_are_not_parsed_as_ours() {
        let cli = parse(&["sh", "-c", "exit 3", "--quiet"]).unwrap();
        assert_eq!(cli.command, ["sh", "-c", "exit 3", "--quiet"]);
        assert!(!cli.quiet);
        assert_eq!(cli.forward, ForwardMode::Term);
        assert_eq!(cli.log, None);
    }

    #[test]
    fn options_before_command() {
        let cli = parse(&["--forward", "same", "--log", "debug", "-q", "sleep", "1"]).unwrap();
        assert_eq!(cli.forward, ForwardMode::Same);
        assert_eq!(cli.log, Some(tracing::Level::DEBUG));
        assert!(cli.quiet);
        assert_eq!(cli.command, ["sleep", "1"]);
    }

    #[test]
    fn double_dash_allows_dash_named_program() {
        let cli = parse(&["--", "-weird", "arg"]).unwrap();
        assert_eq!(cli.command, ["-weird", "arg"]);
    }

    #[test]
    fn missing_command_is_an_error() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(parse(&["--quiet"]).is_err());
    }

    #[test]
    fn usage_error_is_one_line() {
        let err = parse(&[]).unwrap_err();
        let msg = usage_error(&err);
        assert!(msg.starts_with("usage: xasafe [OPTIONS] COMMAND"), "{msg}");
        assert!(!msg.contains('\n'));
    }

    #[test]
    fn unknown_forward_mode_is_rejected() {
        let err = parse(&["--forward", "kill", "true"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }
}
