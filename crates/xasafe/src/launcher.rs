//! Process Launcher: fork one child, clear its mask and exec the target.

use std::ffi::{CStr, CString, OsString};
use std::os::unix::ffi::OsStringExt;
use std::process;

use anyhow::{bail, Context, Result};
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::unistd::{execvp, fork, ForkResult, Pid};

use crate::diag::{self, os_error};
use crate::gate::SignalGate;
use crate::outcome::SUPERVISOR_ERROR;

/// Signals whose disposition the child resets to the default before exec.
const CHILD_DEFAULTS: [Signal; 3] = [Signal::SIGINT, Signal::SIGTERM, Signal::SIGPIPE];

/// Argument vector of the child; `args[0]` is the program, looked up in `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argv {
    args: Vec<CString>,
}

impl Argv {
    /// Fails on an empty vector or an argument with an interior NUL byte.
    pub fn new<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = OsString>,
    {
        let args = args
            .into_iter()
            .map(|arg| {
                let shown = arg.to_string_lossy().into_owned();
                CString::new(arg.into_vec())
                    .with_context(|| format!("argument contains a NUL byte: {shown:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        if args.is_empty() {
            bail!("no command given");
        }
        Ok(Self { args })
    }

    pub fn program(&self) -> &CStr {
        &self.args[0]
    }

    pub fn args(&self) -> &[CString] {
        &self.args
    }
}

/// The single child, owned by the supervisor until reaped.
#[derive(Debug)]
pub struct ChildHandle {
    pid: Pid,
    program: String,
}

impl ChildHandle {
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Program name, for diagnostics.
    pub fn program(&self) -> &str {
        &self.program
    }
}

/// Fork and exec `argv`. Returns only in the parent.
///
/// The child inherits the gate's blocked set and clears it right before
/// exec; if exec fails the child reports the error and exits with
/// [`SUPERVISOR_ERROR`], which the parent later observes as an ordinary exit.
pub fn launch(gate: &mut SignalGate, argv: &Argv) -> Result<ChildHandle> {
    let program = argv.program().to_string_lossy().into_owned();
    // SAFETY: the supervisor is single-threaded. The child only changes its
    // signal state and execs, or writes one line and exits.
    match unsafe { fork() }.map_err(|e| os_error("fork", e))? {
        ForkResult::Parent { child } => {
            tracing::debug!(pid = child.as_raw(), program, "forked");
            Ok(ChildHandle {
                pid: child,
                program,
            })
        }
        ForkResult::Child => exec_child(gate, argv, &program),
    }
}

fn exec_child(gate: &mut SignalGate, argv: &Argv, program: &str) -> ! {
    // Dispositions of ignored signals survive exec. SIGINT/SIGTERM may have
    // been ignored by whoever started us, and the Rust runtime ignores SIGPIPE.
    // Reset them while still blocked: a pending request that is ignored at
    // unblock time is discarded.
    for sig in CHILD_DEFAULTS {
        // SAFETY: restores the default disposition, no handler is involved.
        if let Err(e) = unsafe { signal(sig, SigHandler::SigDfl) } {
            diag::report_error(&os_error("signal", e));
            process::exit(SUPERVISOR_ERROR);
        }
    }
    if let Err(err) = gate.reset() {
        diag::report_error(&err);
        process::exit(SUPERVISOR_ERROR);
    }
    let errno = match execvp(argv.program(), argv.args()) {
        Ok(never) => match never {},
        Err(errno) => errno,
    };
    diag::report_error(&os_error(format_args!("exec: {program}"), errno));
    process::exit(SUPERVISOR_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn argv_keeps_program_first() {
        let argv = Argv::new(os(&["sh", "-c", "exit 3"])).unwrap();
        assert_eq!(argv.program().to_str().unwrap(), "sh");
        assert_eq!(argv.args().len(), 3);
        assert_eq!(argv.args()[2].to_str().unwrap(), "exit 3");
    }

    #[test]
    fn argv_rejects_empty() {
        let err = Argv::new(Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "no command given");
    }

    #[test]
    fn argv_rejects_interior_nul() {
        let err = Argv::new(os(&["echo", "a\0b"])).unwrap_err();
        assert!(err.to_string().contains("NUL"));
    }
}
