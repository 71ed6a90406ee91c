//! The supervision protocol, in order.
//!
//! 1. Block SIGINT/SIGTERM and make SIGCHLD queueable.
//! 2. Fork; the child clears its mask and execs.
//! 3. In the parent, extend the mask with SIGCHLD.
//! 4. Run the dispatch loop until the child is reaped.
//!
//! SIGINT/SIGTERM stay blocked from step 1 until the child execs (child side)
//! or until `sigwait` consumes them (parent side).

use anyhow::Result;

use crate::config::Cli;
use crate::diag;
use crate::dispatch::{self, ForwardMode};
use crate::gate::{SignalGate, CHILD_DEATH, TERMINATION};
use crate::launcher::{self, Argv};
use crate::outcome::Outcome;

/// Launch `argv` and relay termination requests until it ends.
pub fn supervise(argv: &Argv, forward: ForwardMode) -> Result<Outcome> {
    let mut gate = SignalGate::new();
    gate.block(&TERMINATION)?;
    gate.make_child_death_queueable()?;

    let child = launcher::launch(&mut gate, argv)?;
    gate.block(&[CHILD_DEATH, TERMINATION[0], TERMINATION[1]])?;

    let outcome = dispatch::run(&gate, &child, forward)?;
    tracing::info!(program = child.program(), ?outcome, "done");
    Ok(outcome)
}

/// Run the configured command and return the status to exit with, printing
/// the diagnostics for fatal errors and non-zero child outcomes.
pub fn run(cli: &Cli) -> i32 {
    let argv = match Argv::new(cli.command.iter().cloned()) {
        Ok(argv) => argv,
        Err(err) => {
            diag::report_error(&err);
            return Outcome::SupervisorError.exit_status();
        }
    };
    let outcome = supervise(&argv, cli.forward).unwrap_or_else(|err| {
        diag::report_error(&err);
        Outcome::SupervisorError
    });
    let status = outcome.exit_status();
    if outcome.is_child_failure() && !cli.quiet {
        diag::report(format_args!(
            "{}: exit status {status}",
            argv.program().to_string_lossy()
        ));
    }
    status
}
