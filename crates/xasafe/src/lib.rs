//! Run a single command and relay SIGINT/SIGTERM to it without a race window.
//!
//! Intended as the command `xargs` runs per input line: an interrupt aimed at
//! `xasafe` becomes a SIGTERM to the child, and `xasafe` exits only once the
//! child has, with a status that encodes how the child ended.
//!
//! Modules
//! - `gate`: the only place the signal mask changes.
//! - `launcher`: fork + exec of the child.
//! - `dispatch`: `sigwait`-driven state machine until the child is reaped.
//! - `outcome`: child outcome to exit status.
//! - `supervisor`: the protocol sequence tying the above together.

pub mod config;
pub mod diag;
pub mod dispatch;
pub mod gate;
pub mod launcher;
pub mod outcome;
pub mod supervisor;

pub use config::Cli;
pub use dispatch::ForwardMode;
pub use launcher::{Argv, ChildHandle};
pub use outcome::{Outcome, SUPERVISOR_ERROR};
pub use supervisor::supervise;
