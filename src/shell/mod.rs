use std::io::{self, Write};
use std::ops::ControlFlow;

use crate::builtins::Builtin;
use crate::exec;
use crate::log::{user_error, ShellLogger};
use crate::session::Session;
use crate::signals::SignalController;
use crate::system::getpid;
use crate::tokenize;

mod reader;

use reader::LineReader;

const PROMPT: &str = ": ";

pub fn main() {
    ShellLogger::new("smallsh: ").into_global_logger();

    match run() {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            user_error!("{err}");
            std::process::exit(1);
        }
    }
}

/// The prompt cycle: dispatch pending signal events, prompt, read, parse,
/// run. Ends on `exit` or end of input, both with success.
fn run() -> io::Result<()> {
    let mut session = Session::new();
    let mut controller = SignalController::register()?;
    let mut reader = LineReader::new();
    let pid = getpid();

    loop {
        controller.dispatch_pending(&mut session)?;

        let mut stdout = io::stdout();
        stdout.write_all(PROMPT.as_bytes())?;
        stdout.flush()?;

        let Some(line) = reader.next_line(&mut controller, &mut session)? else {
            // end of input behaves exactly like the exit built-in
            break;
        };

        let Some(cmd) = tokenize::parse(&line, pid, session.mode) else {
            continue;
        };

        if let Some(builtin) = Builtin::recognize(&cmd.argv) {
            if let ControlFlow::Break(()) = builtin.run(&session)? {
                break;
            }
        } else {
            exec::launch(&cmd, &mut session, &mut controller)?;
        }
    }

    Ok(())
}
