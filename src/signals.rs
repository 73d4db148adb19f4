use std::io::{self, Write};

use crate::log::{dev_info, dev_warn};
use crate::session::Session;
use crate::system::signal::{
    consts::*, register_handlers, signal_name, SignalHandler, SignalNumber, SignalSet,
    SignalStream,
};

/// Owner of the session's signal handlers.
///
/// The handlers themselves only forward `siginfo_t` over a socketpair; every
/// state mutation and every line of output happens in the main flow, inside
/// [`SignalController::dispatch_pending`]. That keeps the asynchronous path
/// free of reentrancy hazards: nothing it runs touches the session state.
pub(crate) struct SignalController {
    stream: &'static SignalStream,
    _handlers: [SignalHandler; SignalController::SIGNALS.len()],
}

impl SignalController {
    const SIGNALS: [SignalNumber; 3] = [SIGINT, SIGTSTP, SIGCHLD];

    /// Install the handlers for the whole session.
    ///
    /// All signals are blocked while the handlers are swapped in, so no
    /// delivery can slip through half-registered.
    pub(crate) fn register() -> io::Result<Self> {
        let original_set = match SignalSet::full().and_then(|set| set.block()) {
            Ok(original_set) => Some(original_set),
            Err(err) => {
                dev_warn!("cannot block signals during setup: {err}");
                None
            }
        };

        let stream = SignalStream::init()?;
        let handlers = register_handlers(Self::SIGNALS)?;

        if let Some(set) = original_set {
            if let Err(err) = set.set_mask() {
                dev_warn!("cannot restore signal mask: {err}");
            }
        }

        Ok(Self {
            stream,
            _handlers: handlers,
        })
    }

    /// Drain every signal that arrived since the last call and act on each.
    ///
    /// Called right before each prompt and whenever a blocking read or wait is
    /// interrupted. An empty drain does nothing observable; every message is
    /// flushed before this returns so lines never interleave with the prompt
    /// or a foreground child's output.
    pub(crate) fn dispatch_pending(&mut self, session: &mut Session) -> io::Result<()> {
        loop {
            let info = match self.stream.try_recv() {
                Ok(Some(info)) => info,
                Ok(None) => return Ok(()),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };

            dev_info!(
                "received {} from {}",
                signal_name(info.signal()),
                info.pid()
            );

            let mut stdout = io::stdout();
            match info.signal() {
                // the foreground child owns interrupts; the session ignores them
                SIGINT => {}
                SIGTSTP => {
                    writeln!(stdout, "{}", session.toggle_mode())?;
                    stdout.flush()?;
                }
                SIGCHLD => {
                    for (pid, status) in session.reap_jobs() {
                        writeln!(stdout, "background pid {pid} is done: {status}")?;
                    }
                    stdout.flush()?;
                }
                other => dev_warn!("ignoring unexpected {}", signal_name(other)),
            }
        }
    }
}
