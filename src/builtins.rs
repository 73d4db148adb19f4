use std::{
    env,
    io::{self, Write},
    ops::ControlFlow,
    path::PathBuf,
};

use crate::session::Session;

/// The commands executed inside the interpreter's own process.
///
/// Everything else falls through to the process launcher.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Builtin {
    Cd(Option<String>),
    Exit,
    Status,
}

impl Builtin {
    /// Match the first token exactly against the built-in names.
    pub(crate) fn recognize(argv: &[String]) -> Option<Self> {
        match argv.first()?.as_str() {
            "cd" => Some(Self::Cd(argv.get(1).cloned())),
            "exit" => Some(Self::Exit),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    /// Execute the built-in. `Break` asks the caller to end the session.
    pub(crate) fn run(self, session: &Session) -> io::Result<ControlFlow<()>> {
        let mut stdout = io::stdout();

        match self {
            Self::Exit => return Ok(ControlFlow::Break(())),
            Self::Status => writeln!(stdout, "{}", session.last_status())?,
            Self::Cd(target) => cd(&mut stdout, target)?,
        }

        stdout.flush()?;
        Ok(ControlFlow::Continue(()))
    }
}

/// Change the working directory, reporting failures inline rather than
/// propagating them; a failed `cd` must not end the session or disturb the
/// last-status.
fn cd(stdout: &mut io::Stdout, target: Option<String>) -> io::Result<()> {
    let path = match target {
        Some(dir) => PathBuf::from(dir),
        None => match env::var_os("HOME") {
            Some(home) => PathBuf::from(home),
            None => {
                writeln!(stdout, "cd: HOME is not set")?;
                return Ok(());
            }
        },
    };

    match env::set_current_dir(&path) {
        Ok(()) => writeln!(stdout, "{}", env::current_dir()?.display())?,
        Err(err) => writeln!(stdout, "cd: {}: {err}", path.display())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::ops::ControlFlow;

    use pretty_assertions::assert_eq;

    use super::Builtin;
    use crate::session::Session;

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn recognizes_the_three_builtins() {
        assert_eq!(Builtin::recognize(&argv(&["exit"])), Some(Builtin::Exit));
        assert_eq!(Builtin::recognize(&argv(&["status"])), Some(Builtin::Status));
        assert_eq!(Builtin::recognize(&argv(&["cd"])), Some(Builtin::Cd(None)));
        assert_eq!(
            Builtin::recognize(&argv(&["cd", "/tmp"])),
            Some(Builtin::Cd(Some("/tmp".into())))
        );
    }

    #[test]
    fn everything_else_falls_through() {
        for name in ["ls", "cdd", "Status", "exit2", "echo"] {
            assert_eq!(Builtin::recognize(&argv(&[name])), None, "name {name:?}");
        }
        assert_eq!(Builtin::recognize(&[]), None);
    }

    #[test]
    fn exit_breaks_the_session() {
        let session = Session::new();
        let flow = Builtin::Exit.run(&session).unwrap();
        assert_eq!(flow, ControlFlow::Break(()));
    }

    #[test]
    fn status_continues_the_session() {
        let session = Session::new();
        let flow = Builtin::Status.run(&session).unwrap();
        assert_eq!(flow, ControlFlow::Continue(()));
    }

    // one test so the process-wide working directory is not raced
    #[test]
    fn cd_goes_home_stays_put_on_failure() {
        let session = Session::new();
        let home = env::var("HOME").expect("HOME must be set for this test");

        Builtin::Cd(None).run(&session).unwrap();
        assert_eq!(env::current_dir().unwrap(), std::path::Path::new(&home));

        // idempotent
        Builtin::Cd(None).run(&session).unwrap();
        assert_eq!(env::current_dir().unwrap(), std::path::Path::new(&home));

        // a failed cd reports inline and leaves the directory alone
        let flow = Builtin::Cd(Some("/definitely/not/a/directory".into()))
            .run(&session)
            .unwrap();
        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(env::current_dir().unwrap(), std::path::Path::new(&home));
    }
}
