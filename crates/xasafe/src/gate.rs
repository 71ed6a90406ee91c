//! Signal Mask Controller.
//!
//! Policy
//! - Every change to the signal mask goes through a [`SignalGate`]; nothing
//!   else in the crate calls `sigprocmask`.
//! - Only SIGINT, SIGTERM and SIGCHLD are touched.
//! - In the supervisor the mask only grows. It is cleared once, in the forked
//!   child, right before exec.
//! - Signals are consumed synchronously with `sigwait`. The only handler ever
//!   installed is an empty one for SIGCHLD, which exists solely to replace an
//!   inherited SIG_IGN so that the signal can be queued.

use std::ffi::c_int;

use anyhow::Result;
use nix::errno::Errno;
use nix::sys::signal::{
    sigaction, sigprocmask, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal,
};

use crate::diag::os_error;

/// Termination requests relayed to the child.
pub const TERMINATION: [Signal; 2] = [Signal::SIGINT, Signal::SIGTERM];
/// Child-death notification.
pub const CHILD_DEATH: Signal = Signal::SIGCHLD;

/// Process signal mask, as far as this crate has changed it.
#[derive(Debug)]
pub struct SignalGate {
    blocked: SigSet,
}

impl SignalGate {
    pub fn new() -> Self {
        Self {
            blocked: SigSet::empty(),
        }
    }

    /// Signals this gate has blocked.
    pub fn blocked(&self) -> &SigSet {
        &self.blocked
    }

    /// Add `signals` to the blocked set.
    pub fn block(&mut self, signals: &[Signal]) -> Result<()> {
        let set = signal_set(signals);
        sigprocmask(SigmaskHow::SIG_BLOCK, Some(&set), None)
            .map_err(|e| os_error("sigprocmask", e))?;
        for &signal in signals {
            self.blocked.add(signal);
        }
        tracing::debug!(?signals, "blocked");
        Ok(())
    }

    /// Clear the blocked set. Only called in the child before exec.
    pub fn reset(&mut self) -> Result<()> {
        let empty = SigSet::empty();
        sigprocmask(SigmaskHow::SIG_SETMASK, Some(&empty), None)
            .map_err(|e| os_error("sigprocmask", e))?;
        self.blocked = empty;
        Ok(())
    }

    /// Suspend until one of `signals` is pending, consume it and return it.
    ///
    /// All of `signals` must already be blocked, otherwise they could be
    /// delivered asynchronously instead of being returned here.
    pub fn wait_for_one_of(&self, signals: &[Signal]) -> Result<Signal> {
        debug_assert!(signals.iter().all(|&s| self.blocked.contains(s)));
        let set = signal_set(signals);
        loop {
            match set.wait() {
                Ok(signal) => {
                    tracing::trace!(%signal, "sigwait");
                    return Ok(signal);
                }
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(os_error("sigwait", e)),
            }
        }
    }

    /// Install the empty SIGCHLD handler (with SA_NOCLDSTOP).
    ///
    /// A SIGCHLD that is ignored also makes the kernel reap children on its
    /// own, which would leave nothing for `waitpid` to collect.
    pub fn make_child_death_queueable(&self) -> Result<()> {
        let action = SigAction::new(
            SigHandler::Handler(on_child_death),
            SaFlags::SA_NOCLDSTOP,
            SigSet::empty(),
        );
        // SAFETY: the handler has an empty body, so it is async-signal-safe.
        unsafe { sigaction(CHILD_DEATH, &action) }.map_err(|e| os_error("sigaction", e))?;
        Ok(())
    }
}

extern "C" fn on_child_death(_: c_int) {}

fn signal_set(signals: &[Signal]) -> SigSet {
    let mut set = SigSet::empty();
    for &signal in signals {
        set.add(signal);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::pthread::{pthread_kill, pthread_self};

    // The test harness runs each test on its own thread and `sigprocmask`
    // only affects the calling thread, so these tests do not interfere.

    #[test]
    fn block_then_reset_round_trips_thread_mask() {
        let mut gate = SignalGate::new();
        gate.block(&TERMINATION).unwrap();
        let mask = SigSet::thread_get_mask().unwrap();
        assert!(mask.contains(Signal::SIGINT));
        assert!(mask.contains(Signal::SIGTERM));
        assert!(!mask.contains(CHILD_DEATH));

        gate.block(&[CHILD_DEATH]).unwrap();
        assert!(SigSet::thread_get_mask().unwrap().contains(CHILD_DEATH));
        assert!(gate.blocked().contains(Signal::SIGINT));

        gate.reset().unwrap();
        let mask = SigSet::thread_get_mask().unwrap();
        for signal in [Signal::SIGINT, Signal::SIGTERM, CHILD_DEATH] {
            assert!(!mask.contains(signal));
            assert!(!gate.blocked().contains(signal));
        }
    }

    #[test]
    fn wait_consumes_pending_blocked_signal() {
        let mut gate = SignalGate::new();
        gate.block(&[CHILD_DEATH]).unwrap();
        pthread_kill(pthread_self(), CHILD_DEATH).unwrap();
        let got = gate.wait_for_one_of(&[CHILD_DEATH]).unwrap();
        assert_eq!(got, CHILD_DEATH);
        gate.reset().unwrap();
    }
}
