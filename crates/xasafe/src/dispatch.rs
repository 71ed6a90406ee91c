//! Dispatch Loop: wait for the next signal and react, until the child is reaped.
//!
//! States
//! - `Waiting`: block in `sigwait` on {SIGCHLD, SIGINT, SIGTERM}.
//!   SIGCHLD reaps the child (non-blocking); a termination request is
//!   forwarded to the child and the loop keeps waiting, so the final status
//!   is always the child's own.
//! - `Done`: the child's outcome is known; the loop returns it.

use anyhow::Result;
use clap::ValueEnum;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag};

use crate::diag::os_error;
use crate::gate::{SignalGate, CHILD_DEATH, TERMINATION};
use crate::launcher::ChildHandle;
use crate::outcome::Outcome;

/// Signal sent to the child when the supervisor receives SIGINT or SIGTERM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ForwardMode {
    /// Always send SIGTERM.
    #[default]
    Term,
    /// Send the signal that was received.
    Same,
}

impl ForwardMode {
    pub fn signal_for(self, received: Signal) -> Signal {
        match self {
            Self::Term => Signal::SIGTERM,
            Self::Same => received,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Waiting,
    Done(Outcome),
}

/// Run the loop for `child`. The gate must already block SIGCHLD, SIGINT and
/// SIGTERM.
pub fn run(gate: &SignalGate, child: &ChildHandle, forward: ForwardMode) -> Result<Outcome> {
    let watched = [CHILD_DEATH, TERMINATION[0], TERMINATION[1]];

    // A child that died before SIGCHLD was blocked had its notification
    // delivered to the empty handler; only its zombie is left.
    let mut state = reap(child)?.map_or(State::Waiting, State::Done);
    loop {
        state = match state {
            State::Done(outcome) => {
                tracing::debug!(?outcome, "child reaped");
                return Ok(outcome);
            }
            State::Waiting => match gate.wait_for_one_of(&watched)? {
                CHILD_DEATH => reap(child)?.map_or(State::Waiting, State::Done),
                received => {
                    forward_to(child, forward.signal_for(received))?;
                    State::Waiting
                }
            },
        };
    }
}

/// Non-blocking reap of `child` only.
fn reap(child: &ChildHandle) -> Result<Option<Outcome>> {
    let status =
        waitpid(child.pid(), Some(WaitPidFlag::WNOHANG)).map_err(|e| os_error("wait", e))?;
    tracing::trace!(?status, "waitpid");
    Ok(Outcome::from_wait_status(status))
}

/// Best effort: a child that is already gone is not an error.
fn forward_to(child: &ChildHandle, signal: Signal) -> Result<()> {
    tracing::debug!(pid = child.pid().as_raw(), %signal, "forwarding");
    match kill(child.pid(), signal) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(os_error("kill", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_mode_always_sends_sigterm() {
        for received in TERMINATION {
            assert_eq!(ForwardMode::Term.signal_for(received), Signal::SIGTERM);
        }
    }

    #[test]
    fn same_mode_relays_received_signal() {
        for received in TERMINATION {
            assert_eq!(ForwardMode::Same.signal_for(received), received);
        }
    }

    #[test]
    fn default_mode_is_term() {
        assert_eq!(ForwardMode::default(), ForwardMode::Term);
    }
}
