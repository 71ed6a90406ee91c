//! Single-line diagnostics on stderr, prefixed with the program name.
//!
//! These are user-facing and never go through `tracing`, so their format does
//! not depend on the configured log level.

use std::fmt::Display;

use anyhow::anyhow;
use nix::errno::Errno;

pub const PROG_NAME: &str = "xasafe";

/// Error for a failed OS call: `<op>: <description>`.
pub fn os_error(op: impl Display, errno: Errno) -> anyhow::Error {
    anyhow!("{op}: {}", errno.desc())
}

pub fn format_line(msg: impl Display) -> String {
    format!("{PROG_NAME}: {msg}")
}

pub fn report(msg: impl Display) {
    eprintln!("{}", format_line(msg));
}

/// Print the whole error chain on one line.
pub fn report_error(err: &anyhow::Error) {
    report(format_args!("{err:#}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn os_error_appends_description() {
        let err = os_error("sigprocmask", Errno::EINVAL);
        assert_eq!(err.to_string(), "sigprocmask: Invalid argument");
    }

    #[test]
    fn chain_renders_on_one_line() {
        let err = Err::<(), _>(os_error("fork", Errno::EAGAIN))
            .context("launching child")
            .unwrap_err();
        let line = format_line(format_args!("{err:#}"));
        assert!(line.starts_with("xasafe: launching child: fork: "));
        assert!(!line.contains('\n'));
    }
}
