use crate::session::Mode;
use crate::system::ProcessId;

/// One parsed input line, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Commandline {
    /// The command name followed by its arguments; never empty.
    pub(crate) argv: Vec<String>,
    /// Whether the line asked for (and the current mode allows) detached
    /// execution.
    pub(crate) background: bool,
    /// Whether a redirection token appeared anywhere in the line.
    pub(crate) redirected: bool,
}

/// Replace every `$$` pair with the decimal form of `pid`.
///
/// Pairs are consumed left to right during a single pass, so `$$$` expands to
/// the pid followed by a literal `$`. A lone `$` is copied verbatim.
pub(crate) fn expand(line: &str, pid: ProcessId) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'$') {
            chars.next();
            out.push_str(&pid.to_string());
        } else {
            out.push(c);
        }
    }

    out
}

/// Turn a raw input line into a [`Commandline`].
///
/// Returns `None` for lines that produce nothing to run: empty lines,
/// all-whitespace lines, comment lines, and a bare `&`. A trailing `&` is
/// always stripped; it only sets the background flag while the session is in
/// normal mode.
pub(crate) fn parse(line: &str, pid: ProcessId, mode: Mode) -> Option<Commandline> {
    let expanded = expand(line, pid);
    let mut argv: Vec<String> = expanded.split_whitespace().map(String::from).collect();

    match argv.first() {
        None => return None,
        Some(first) if first.starts_with('#') => return None,
        Some(_) => {}
    }

    let mut background = false;
    if argv.last().is_some_and(|token| token == "&") {
        argv.pop();
        background = mode == Mode::Normal;
        if argv.is_empty() {
            return None;
        }
    }

    let redirected = argv.iter().any(|token| token == "<" || token == ">");

    Some(Commandline {
        argv,
        background,
        redirected,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{expand, parse};
    use crate::session::Mode;
    use crate::system::getpid;

    fn args(line: &str, mode: Mode) -> Vec<String> {
        parse(line, getpid(), mode).unwrap().argv
    }

    #[test]
    fn expansion_is_identity_without_pairs() {
        let pid = getpid();
        for line in ["", "echo hello", "a $ b $ c", "price is 5$", "$ $ $"] {
            assert_eq!(expand(line, pid), line);
        }
    }

    #[test]
    fn expansion_replaces_pairs() {
        let pid = getpid();
        let decimal = std::process::id().to_string();

        assert_eq!(expand("$$", pid), decimal);
        assert_eq!(expand("$$$", pid), format!("{decimal}$"));
        assert_eq!(expand("$$$$", pid), format!("{decimal}{decimal}"));
        assert_eq!(expand("log.$$.txt", pid), format!("log.{decimal}.txt"));
    }

    #[test]
    fn background_marker_depends_on_mode() {
        let cmd = parse("ls -la &", getpid(), Mode::Normal).unwrap();
        assert_eq!(cmd.argv, ["ls", "-la"]);
        assert!(cmd.background);

        let cmd = parse("ls -la &", getpid(), Mode::ForegroundOnly).unwrap();
        assert_eq!(cmd.argv, ["ls", "-la"]);
        assert!(!cmd.background);
    }

    #[test]
    fn marker_elsewhere_is_a_literal_argument() {
        let cmd = parse("echo a & b", getpid(), Mode::Normal).unwrap();
        assert_eq!(cmd.argv, ["echo", "a", "&", "b"]);
        assert!(!cmd.background);
    }

    #[test]
    fn blank_and_comment_lines_produce_nothing() {
        for line in ["", "   ", "\t", "# a comment", "#comment", "  # indented", "&"] {
            assert!(parse(line, getpid(), Mode::Normal).is_none(), "line {line:?}");
        }
    }

    #[test]
    fn redirection_tokens_are_flagged() {
        assert!(parse("wc -l < in.txt", getpid(), Mode::Normal).unwrap().redirected);
        assert!(parse("ls > out.txt", getpid(), Mode::Normal).unwrap().redirected);
        assert!(!parse("ls out.txt", getpid(), Mode::Normal).unwrap().redirected);
        // the token has to stand alone to count
        assert!(!parse("echo a<b", getpid(), Mode::Normal).unwrap().redirected);
    }

    #[test]
    fn whitespace_runs_split_into_single_tokens() {
        assert_eq!(args("  echo \t hello   world  ", Mode::Normal), [
            "echo", "hello", "world"
        ]);
    }
}
