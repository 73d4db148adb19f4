use std::io::{self, Write};
use std::os::unix::process::CommandExt;
use std::process::Command;

use crate::log::{dev_info, dev_warn, user_error};
use crate::session::{CommandStatus, Mode, Session};
use crate::signals::SignalController;
use crate::system::signal::{consts::*, SignalHandler, SignalHandlerBehavior};
use crate::system::wait::{Wait, WaitError, WaitOptions};
use crate::system::{_exit, fork, ForkResult, ProcessId};
use crate::tokenize::Commandline;

/// Lines carrying redirection tokens are handed to the system shell wholesale
/// instead of being launched directly.
const DELEGATE_SHELL: &str = "/bin/sh";

/// Spawn the external command described by `cmd`, detaching or blocking
/// according to the background flag and the mode read at launch time.
pub(crate) fn launch(
    cmd: &Commandline,
    session: &mut Session,
    controller: &mut SignalController,
) -> io::Result<()> {
    // The mode is sampled exactly once; a toggle arriving later applies to the
    // next launch, never retroactively.
    let detached = cmd.background && session.mode == Mode::Normal;

    let mut command = build_command(cmd);

    let ForkResult::Parent(child_pid) = fork()? else {
        prepare_child_signals(detached);

        let err = command.exec();

        // `exec` only returns on failure. Report from the child and die with a
        // distinguished status; the parent classifies this like any other
        // completion.
        user_error!("{}: {err}", command.get_program().to_string_lossy());
        _exit(1);
    };

    dev_info!("launched {} with pid {child_pid}", cmd.argv[0]);

    if detached {
        let mut stdout = io::stdout();
        writeln!(stdout, "background pid is {child_pid}")?;
        stdout.flush()?;
        session.add_job(child_pid);
        return Ok(());
    }

    let status = wait_foreground(child_pid, session, controller)?;
    session.set_last_status(status);
    Ok(())
}

fn build_command(cmd: &Commandline) -> Command {
    if cmd.redirected {
        let mut command = Command::new(DELEGATE_SHELL);
        command.arg("-c").arg(cmd.argv.join(" "));
        command
    } else {
        let mut command = Command::new(&cmd.argv[0]);
        command.args(&cmd.argv[1..]);
        command
    }
}

/// Adjust signal dispositions between `fork` and `exec`.
///
/// The streamed handlers installed by the parent reset to their defaults on
/// `exec`, so a foreground child sees the default interrupt action. `SIG_IGN`
/// survives `exec`: detached children are shielded from terminal interrupts,
/// and no child reacts to the suspend key the session uses for mode toggling.
fn prepare_child_signals(detached: bool) {
    if detached {
        match SignalHandler::register(SIGINT, SignalHandlerBehavior::Ignore) {
            Ok(handler) => handler.forget(),
            Err(err) => dev_warn!("cannot ignore SIGINT in background child: {err}"),
        }
    }

    match SignalHandler::register(SIGTSTP, SignalHandlerBehavior::Ignore) {
        Ok(handler) => handler.forget(),
        Err(err) => dev_warn!("cannot ignore SIGTSTP in child: {err}"),
    }
}

/// Block until exactly `pid` terminates, classifying the result.
///
/// A signal landing mid-wait interrupts `waitpid`; pending events are
/// dispatched right away (so a mode toggle is never lost) and the same wait is
/// resumed.
fn wait_foreground(
    pid: ProcessId,
    session: &mut Session,
    controller: &mut SignalController,
) -> io::Result<CommandStatus> {
    loop {
        match pid.wait(WaitOptions::new()) {
            Ok((_, status)) => {
                if let Some(classified) = CommandStatus::from_wait(&status) {
                    return Ok(classified);
                }
                dev_warn!("unexpected wait status for {pid}, still waiting");
            }
            Err(WaitError::Io(err)) if err.kind() == io::ErrorKind::Interrupted => {
                controller.dispatch_pending(session)?;
            }
            Err(WaitError::Io(err)) => return Err(err),
            // not possible without WNOHANG
            Err(WaitError::NotReady) => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use pretty_assertions::assert_eq;

    use super::{build_command, DELEGATE_SHELL};
    use crate::session::Mode;
    use crate::system::getpid;
    use crate::tokenize;

    fn parse(line: &str) -> tokenize::Commandline {
        tokenize::parse(line, getpid(), Mode::Normal).unwrap()
    }

    #[test]
    fn plain_lines_launch_the_named_program() {
        let command = build_command(&parse("ls -l -a /tmp"));
        assert_eq!(command.get_program(), OsStr::new("ls"));
        let argv: Vec<&OsStr> = command.get_args().collect();
        assert_eq!(argv, [OsStr::new("-l"), OsStr::new("-a"), OsStr::new("/tmp")]);
    }

    #[test]
    fn redirected_lines_are_delegated_whole() {
        let command = build_command(&parse("wc -l < input.txt &"));
        assert_eq!(command.get_program(), OsStr::new(DELEGATE_SHELL));
        let argv: Vec<&OsStr> = command.get_args().collect();
        assert_eq!(argv, [OsStr::new("-c"), OsStr::new("wc -l < input.txt")]);
    }
}
