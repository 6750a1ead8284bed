// Copyright (C) 2019-2021  Pierre Krieger
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Sinks that deliver the entries of the device to the host.

use kmsg_writer_core::KernelLogSink;
use kmsg_writer_interface::{Severity, MAX_PRINTK_RECORD_LENGTH};
use parking_lot::Mutex;
use std::{
    borrow::Cow,
    fs,
    io::{self, Write as _},
    path::Path,
};

/// Path to the kernel log device of the host.
pub const DEFAULT_DEV_KMSG: &str = "/dev/kmsg";

/// Syslog facility used for the records written to `/dev/kmsg`.
const LOG_SYSLOG: u8 = 5;

/// Writes entries to a `/dev/kmsg`-like device, one record per line.
pub struct DevKmsgSink<W> {
    writer: Mutex<W>,
}

impl DevKmsgSink<fs::File> {
    /// Opens the given device node for writing.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = fs::OpenOptions::new().write(true).open(path)?;
        Ok(DevKmsgSink::new(file))
    }
}

impl<W: io::Write> DevKmsgSink<W> {
    /// Wraps a writer. Each record is written to it with a single `write_all`.
    pub fn new(writer: W) -> Self {
        DevKmsgSink {
            writer: Mutex::new(writer),
        }
    }

    /// Writes a message, one record per line. An empty message writes nothing.
    pub fn write_message(&self, severity: Severity, text: &[u8]) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        let text = text.strip_suffix(b"\n").unwrap_or(text);
        let prefix = LOG_SYSLOG * 8 + u8::from(severity);

        let mut writer = self.writer.lock();
        for line in text.split(|b| *b == b'\n') {
            writer.write_all(&build_kmsg_line(prefix, line))?;
        }
        writer.flush()
    }

    /// Destroys the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: io::Write + Send> KernelLogSink for DevKmsgSink<W> {
    fn emit(&self, severity: Severity, text: &[u8]) {
        if let Err(err) = self.write_message(severity, text) {
            log::warn!("failed to write to kmsg: {}", err);
        }
    }
}

/// Builds a single `/dev/kmsg` record out of a line.
///
/// Tabs are replaced with spaces and a trailing newline is ignored. The record is cut so that
/// it never exceeds [`MAX_PRINTK_RECORD_LENGTH`], in which case it ends with `...`.
pub fn build_kmsg_line(prefix: u8, line: &[u8]) -> Vec<u8> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);

    let mut record = format!("<{}>", prefix).into_bytes();
    record.extend(line.iter().map(|b| if *b == b'\t' { b' ' } else { *b }));
    record.push(b'\n');

    if record.len() > MAX_PRINTK_RECORD_LENGTH {
        record.truncate(MAX_PRINTK_RECORD_LENGTH - 4);
        record.extend_from_slice(b"...\n");
    }

    record
}

/// Sink that drops everything.
#[derive(Debug, Default)]
pub struct NoopSink;

impl KernelLogSink for NoopSink {
    fn emit(&self, _: Severity, _: &[u8]) {}
}

/// Opens the kernel log device at `path`, or returns a sink that drops everything if it can't be
/// opened for writing.
pub fn open_sink(path: impl AsRef<Path>) -> Box<dyn KernelLogSink> {
    let path = path.as_ref();
    match DevKmsgSink::open(path) {
        Ok(sink) => Box::new(sink),
        Err(err) => {
            log::warn!(
                "failed to open {} for writing ({}); kernel log entries are dropped",
                path.display(),
                err
            );
            Box::new(NoopSink)
        }
    }
}

/// Prints entries to stdout.
pub struct StdoutSink {
    /// If true, enable terminal colors when printing the log messages.
    enable_colors: bool,
}

impl StdoutSink {
    /// Colors are enabled if stdout is a terminal.
    pub fn new() -> Self {
        StdoutSink {
            enable_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelLogSink for StdoutSink {
    fn emit(&self, severity: Severity, text: &[u8]) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let outcome = write_stdout_entry(&mut out, self.enable_colors, severity, text)
            .and_then(|()| out.flush());
        if let Err(err) = outcome {
            log::warn!("failed to print kernel log entry: {}", err);
        }
    }
}

/// Writes one line made of a header with the severity and the text of the entry.
fn write_stdout_entry(
    mut out: impl io::Write,
    enable_colors: bool,
    severity: Severity,
    text: &[u8],
) -> io::Result<()> {
    let text = String::from_utf8_lossy(text);
    // Remove any control character from log messages, in order to prevent writers
    // from polluting the terminal.
    let text = if text.chars().any(|c| c.is_control()) {
        Cow::Owned(text.chars().filter(|c| !c.is_control()).collect())
    } else {
        text
    };

    let mut header_style = ansi_term::Style::default();
    if enable_colors {
        header_style.is_dimmed = true;
    }

    writeln!(
        out,
        "{}[{}]{} {}",
        header_style.prefix(),
        severity.label(),
        header_style.suffix(),
        text
    )
}

/// Forwards entries to the `log` crate, with the `kmsg` target.
#[derive(Debug, Default)]
pub struct LogFacadeSink;

impl KernelLogSink for LogFacadeSink {
    fn emit(&self, severity: Severity, text: &[u8]) {
        log::log!(
            target: "kmsg",
            log::Level::from(severity),
            "{}",
            String::from_utf8_lossy(text)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{build_kmsg_line, open_sink, write_stdout_entry, DevKmsgSink, LogFacadeSink};
    use kmsg_writer_core::KernelLogSink as _;
    use kmsg_writer_interface::{Severity, MAX_PRINTK_RECORD_LENGTH};
    use parking_lot::Mutex;
    use std::io;

    fn written(severity: Severity, text: &[u8]) -> String {
        let sink = DevKmsgSink::new(Vec::new());
        sink.write_message(severity, text).unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn simple_message() {
        assert_eq!(written(Severity::Info, b"test message"), "<46>test message\n");
    }

    #[test]
    fn one_record_per_line() {
        assert_eq!(
            written(Severity::Error, b"line1\nline2\n"),
            "<43>line1\n<43>line2\n"
        );
        assert_eq!(
            written(Severity::Info, b"line1\nline2\nline3"),
            "<46>line1\n<46>line2\n<46>line3\n"
        );
    }

    #[test]
    fn tabs_become_spaces() {
        assert_eq!(
            written(Severity::Warning, b"message\twith\ttabs"),
            "<44>message with tabs\n"
        );
        assert_eq!(
            written(Severity::Critical, b"error:\n\tdetail1\n\tdetail2\n"),
            "<42>error:\n<42> detail1\n<42> detail2\n"
        );
    }

    #[test]
    fn empty_message_writes_nothing() {
        assert_eq!(written(Severity::Debug, b""), "");
    }

    #[test]
    fn only_newlines() {
        assert_eq!(written(Severity::Info, b"\n\n\n"), "<46>\n<46>\n<46>\n");
    }

    #[test]
    fn long_line_is_truncated() {
        let text = vec![b'a'; MAX_PRINTK_RECORD_LENGTH + 100];
        let out = written(Severity::Info, &text);
        assert_eq!(out.len(), MAX_PRINTK_RECORD_LENGTH);
        assert!(out.starts_with("<46>aaa"));
        assert!(out.ends_with("...\n"));
    }

    #[test]
    fn build_line() {
        assert_eq!(build_kmsg_line(46, b"test message"), b"<46>test message\n");
        assert_eq!(build_kmsg_line(43, b"test message\n"), b"<43>test message\n");
        assert_eq!(build_kmsg_line(46, b""), b"<46>\n");
        assert_eq!(
            build_kmsg_line(42, b"\terror:\t\tdetails\t"),
            b"<42> error:  details \n"
        );
    }

    struct FailingWriter;

    impl io::Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "write error"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_error_is_reported() {
        let sink = DevKmsgSink::new(FailingWriter);
        let err = sink.write_message(Severity::Info, b"test").unwrap_err();
        assert_eq!(err.to_string(), "write error");

        // Emitting swallows the error.
        sink.emit(Severity::Info, b"test");
    }

    #[test]
    fn open_missing_device() {
        assert!(DevKmsgSink::open("/non/existent/kmsg").is_err());

        // Falls back to a sink that accepts everything.
        let sink = open_sink("/non/existent/kmsg");
        sink.emit(Severity::Info, b"dropped");
    }

    fn stdout_entry(enable_colors: bool, severity: Severity, text: &[u8]) -> String {
        let mut out = Vec::new();
        write_stdout_entry(&mut out, enable_colors, severity, text).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn stdout_entry_format() {
        assert_eq!(
            stdout_entry(false, Severity::Error, b"disk failure"),
            "[ERR] disk failure\n"
        );
        assert_eq!(stdout_entry(false, Severity::Info, b""), "[INFO] \n");
    }

    #[test]
    fn stdout_entry_strips_control_characters() {
        assert_eq!(
            stdout_entry(false, Severity::Warning, b"a\x1b[31mred\x07\tb\nc"),
            "[WARN] a[31mredbc\n"
        );
    }

    #[test]
    fn stdout_entry_non_utf8() {
        assert_eq!(
            stdout_entry(false, Severity::Debug, b"ok\xff"),
            "[DEBUG] ok\u{fffd}\n"
        );
    }

    #[test]
    fn stdout_entry_dimmed_header() {
        let dimmed = ansi_term::Style::default().dimmed();
        assert_eq!(
            stdout_entry(true, Severity::Notice, b"hello"),
            format!("{}[NOTICE]{} hello\n", dimmed.prefix(), dimmed.suffix())
        );
    }

    #[test]
    fn stdout_entry_write_error() {
        assert!(write_stdout_entry(FailingWriter, false, Severity::Info, b"x").is_err());
    }

    /// Logger that keeps the records with the `kmsg` target.
    struct CapturingLogger {
        records: Mutex<Vec<(log::Level, String)>>,
    }

    impl log::Log for CapturingLogger {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            if record.target() == "kmsg" {
                self.records
                    .lock()
                    .push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CapturingLogger = CapturingLogger {
        records: parking_lot::const_mutex(Vec::new()),
    };

    #[test]
    fn log_facade_forwards_at_mapped_level() {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(log::LevelFilter::Trace);

        let sink = LogFacadeSink;
        sink.emit(Severity::Critical, b"fan failure");
        sink.emit(Severity::Warning, b"temperature high");
        sink.emit(Severity::Notice, b"link up");
        sink.emit(Severity::Debug, b"scan \xff");

        assert_eq!(
            *LOGGER.records.lock(),
            vec![
                (log::Level::Error, "fan failure".to_owned()),
                (log::Level::Warn, "temperature high".to_owned()),
                (log::Level::Info, "link up".to_owned()),
                (log::Level::Debug, "scan \u{fffd}".to_owned()),
            ]
        );
    }
}
