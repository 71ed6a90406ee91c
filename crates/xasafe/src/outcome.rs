//! Exit outcome of the supervised child and its mapping to our own status.
//!
//! Policy
//! - Exactly one `Outcome` is produced per run.
//! - Normal exit relays the code, signal death follows the shell convention
//!   `128 + signo`, and supervisor failures use [`SUPERVISOR_ERROR`].

use nix::sys::wait::WaitStatus;

/// Status reserved for supervisor-level failures (usage, launch, OS errors).
/// xargs(1) stops reading input once a command exits with it.
pub const SUPERVISOR_ERROR: i32 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The child called `exit` with this code.
    Exited(i32),
    /// The child was terminated by this signal number.
    Signaled(i32),
    /// The supervisor itself failed.
    SupervisorError,
}

impl Outcome {
    /// Outcome for a reaped wait status, or `None` if the status does not end
    /// the child (still alive, stopped, continued).
    pub fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(Self::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(Self::Signaled(signal as i32)),
            _ => None,
        }
    }

    /// Status the supervisor exits with.
    pub fn exit_status(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Signaled(signo) => 128 + signo,
            Self::SupervisorError => SUPERVISOR_ERROR,
        }
    }

    /// True when the child's own outcome was non-zero (not a supervisor failure).
    pub fn is_child_failure(self) -> bool {
        !matches!(self, Self::SupervisorError) && self.exit_status() != 0
    }
}
