use std::io::Write;
use std::sync::Mutex;

#[cfg(feature = "dev")]
use std::{fs::File, path::Path};

use log::Log;

/// One prefixed line per record, written under a lock so records never
/// interleave.
pub struct SimpleLogger<W: Write + Send> {
    target: Mutex<W>,
    prefix: &'static str,
}

impl<W: Write + Send> Log for SimpleLogger<W> {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level() && metadata.level() <= log::STATIC_MAX_LEVEL
    }

    fn log(&self, record: &log::Record) {
        if let Ok(mut target) = self.target.lock() {
            let _ = writeln!(target, "{}{}", self.prefix, record.args());
        }
    }

    fn flush(&self) {
        if let Ok(mut target) = self.target.lock() {
            let _ = target.flush();
        }
    }
}

impl SimpleLogger<std::io::Stderr> {
    pub fn to_stderr(prefix: &'static str) -> Self {
        Self {
            target: Mutex::new(std::io::stderr()),
            prefix,
        }
    }
}

#[cfg(feature = "dev")]
impl SimpleLogger<File> {
    pub fn to_file<P: AsRef<Path>>(name: P, prefix: &'static str) -> std::io::Result<Self> {
        let target = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(name)?;
        Ok(Self {
            target: Mutex::new(target),
            prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use log::{Level, LevelFilter, Log};
    use pretty_assertions::assert_eq;

    use super::SimpleLogger;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn records_become_prefixed_lines() {
        let buf = SharedBuf::default();
        let logger = SimpleLogger {
            target: Mutex::new(buf.clone()),
            prefix: "smallsh: ",
        };

        let record = log::Record::builder()
            .args(format_args!("cannot run that"))
            .level(Level::Error)
            .build();
        logger.log(&record);
        logger.log(&record);

        assert_eq!(
            buf.contents(),
            "smallsh: cannot run that\nsmallsh: cannot run that\n"
        );
    }

    #[test]
    fn level_filter_is_respected() {
        let logger = SimpleLogger::to_stderr("smallsh: ");
        let trace = log::Metadata::builder().level(Level::Trace).build();

        log::set_max_level(LevelFilter::Trace);
        assert!(logger.enabled(&trace));

        log::set_max_level(LevelFilter::Info);
        assert!(!logger.enabled(&trace));
    }
}
