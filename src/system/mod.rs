use std::{fmt, io};

use crate::cutils::cerr;

use self::signal::SignalNumber;

pub(crate) mod signal;
pub(crate) mod wait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct ProcessId(libc::pid_t);

impl ProcessId {
    pub(crate) fn new(id: libc::pid_t) -> Self {
        Self(id)
    }

    pub(crate) fn get(&self) -> libc::pid_t {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Get the process ID of the calling process.
pub(crate) fn getpid() -> ProcessId {
    // SAFETY: `getpid` cannot fail.
    ProcessId::new(unsafe { libc::getpid() })
}

pub(crate) enum ForkResult {
    // Parent process branch with the child process' PID.
    Parent(ProcessId),
    // Child process branch.
    Child,
}

/// Create a new process.
pub(crate) fn fork() -> io::Result<ForkResult> {
    // SAFETY: this process is single threaded, so the child can continue to
    // run regular Rust code until it calls `execve` or `_exit`.
    let pid = cerr(unsafe { libc::fork() })?;
    if pid == 0 {
        Ok(ForkResult::Child)
    } else {
        Ok(ForkResult::Parent(ProcessId::new(pid)))
    }
}

/// Send a signal to a process with the specified ID.
pub(crate) fn kill(pid: ProcessId, signal: SignalNumber) -> io::Result<()> {
    // SAFETY: This function cannot cause UB even if `pid` is not a valid process ID or if
    // `signal` is not a valid signal code.
    cerr(unsafe { libc::kill(pid.get(), signal) }).map(|_| ())
}

/// Terminate the process immediately, without running destructors or at-exit hooks.
pub(crate) fn _exit(status: libc::c_int) -> ! {
    unsafe { libc::_exit(status) }
}

pub(crate) fn make_zeroed_sigaction() -> libc::sigaction {
    // SAFETY: `sigaction` is POD, the all-zeroes bit pattern is a valid value.
    unsafe { std::mem::zeroed() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn getpid_matches_std() {
        assert_eq!(getpid().get(), std::process::id() as libc::pid_t);
    }

    #[test]
    fn kill_test() {
        let mut child = std::process::Command::new("/bin/sleep")
            .arg("1")
            .spawn()
            .unwrap();
        let pid = ProcessId::new(child.id() as libc::pid_t);
        kill(pid, signal::consts::SIGKILL).unwrap();
        assert!(!child.wait().unwrap().success());
    }
}
