use std::io;

use crate::cutils::cerr;
use crate::session::Session;
use crate::signals::SignalController;

/// Line reader over the raw standard input descriptor.
///
/// `read(2)` is used directly instead of `BufRead` because the standard
/// library transparently retries `EINTR`; this loop must instead hand control
/// to the signal controller the moment a blocking read is interrupted, so
/// mode notices and background completion reports appear without waiting for
/// the user to finish the line.
pub(super) struct LineReader {
    buf: Vec<u8>,
    eof: bool,
}

impl LineReader {
    pub(super) fn new() -> Self {
        Self {
            buf: Vec::new(),
            eof: false,
        }
    }

    /// Read the next input line, without its terminator.
    ///
    /// Returns `Ok(None)` once the input stream is exhausted; a final
    /// unterminated line is still returned first.
    pub(super) fn next_line(
        &mut self,
        controller: &mut SignalController,
        session: &mut Session,
    ) -> io::Result<Option<String>> {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let rest = self.buf.split_off(pos + 1);
                let mut line = std::mem::replace(&mut self.buf, rest);
                line.pop();
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }

            if self.eof {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                let line = std::mem::take(&mut self.buf);
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }

            let mut chunk = [0u8; 512];
            // SAFETY: `chunk` provides valid storage for up to `chunk.len()` bytes.
            match cerr(unsafe {
                libc::read(libc::STDIN_FILENO, chunk.as_mut_ptr().cast(), chunk.len())
            }) {
                Ok(0) => self.eof = true,
                Ok(n) => self.buf.extend_from_slice(&chunk[..n as usize]),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                    controller.dispatch_pending(session)?;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
