use std::fmt;

use crate::log::dev_warn;
use crate::system::ProcessId;
use crate::system::signal::SignalNumber;
use crate::system::wait::{Wait, WaitError, WaitOptions, WaitStatus};

/// Session-wide launch policy, toggled by SIGTSTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Normal,
    /// The background marker is ignored and every launch blocks until completion.
    ForegroundOnly,
}

/// Classification of a completed child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommandStatus {
    Exited(i32),
    Signaled(SignalNumber),
}

impl CommandStatus {
    /// Classify a wait status. Returns `None` for state changes that are not
    /// terminations (those cannot occur without `WUNTRACED`, but the kernel
    /// has the last word).
    pub(crate) fn from_wait(status: &WaitStatus) -> Option<Self> {
        if let Some(code) = status.exit_status() {
            Some(Self::Exited(code))
        } else {
            status.term_signal().map(Self::Signaled)
        }
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit value {code}"),
            Self::Signaled(signal) => write!(f, "terminated by signal {signal}"),
        }
    }
}

/// Mutable state shared by the dispatcher, the launcher and the signal
/// controller for the lifetime of the interactive session.
pub(crate) struct Session {
    pub(crate) mode: Mode,
    last_status: CommandStatus,
    jobs: Vec<ProcessId>,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self {
            mode: Mode::Normal,
            last_status: CommandStatus::Exited(0),
            jobs: Vec::new(),
        }
    }

    /// The most recent foreground completion; background completions never
    /// show up here.
    pub(crate) fn last_status(&self) -> CommandStatus {
        self.last_status
    }

    pub(crate) fn set_last_status(&mut self, status: CommandStatus) {
        self.last_status = status;
    }

    /// Track a detached child until it is reaped.
    pub(crate) fn add_job(&mut self, pid: ProcessId) {
        self.jobs.push(pid);
    }

    /// Flip between normal and foreground-only mode, returning the notice to
    /// show the user.
    pub(crate) fn toggle_mode(&mut self) -> &'static str {
        match self.mode {
            Mode::Normal => {
                self.mode = Mode::ForegroundOnly;
                "Entering foreground-only mode (& is now ignored)"
            }
            Mode::ForegroundOnly => {
                self.mode = Mode::Normal;
                "Exiting foreground-only mode"
            }
        }
    }

    /// Collect every tracked background child that has terminated by now.
    ///
    /// Each pid is waited on individually with `WNOHANG`, so an in-flight
    /// foreground wait can never be stolen and every termination is collected
    /// exactly once. Children that have not terminated stay in the table.
    pub(crate) fn reap_jobs(&mut self) -> Vec<(ProcessId, CommandStatus)> {
        let mut reaped = Vec::new();

        self.jobs.retain(|&pid| match pid.wait(WaitOptions::new().no_hang()) {
            Ok((_, status)) => match CommandStatus::from_wait(&status) {
                Some(classified) => {
                    reaped.push((pid, classified));
                    false
                }
                None => true,
            },
            Err(WaitError::NotReady) => true,
            Err(WaitError::Io(err)) => {
                // ECHILD and friends: nothing left to report for this entry.
                dev_warn!("cannot wait for background child {pid}: {err}");
                false
            }
        });

        reaped
    }
}
