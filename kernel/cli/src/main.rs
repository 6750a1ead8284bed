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

use kmsg_writer_core::{Config, KernelLogSink, KmsgWriterModule, WriteError};
use kmsg_writer_hosted::{
    open_sink, DeviceTable, DeviceWriteError, LogFacadeSink, RegisterError, StdoutSink,
};
use kmsg_writer_interface::{KernelMessage, Priority, ValidateError};
use std::{
    fs,
    io::{self, BufRead, Write as _},
    path::{Path, PathBuf},
    process, thread,
    time::Duration,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "kmsg-writer", about = "Injects messages in the kernel logs.")]
enum CliOptions {
    /// Prints the severity and text the device would log for a message.
    Parse {
        /// Message, as it would be written to the device.
        message: String,
    },

    /// Writes a message to the device.
    Inject {
        /// Path to the device node.
        #[structopt(long, parse(from_os_str), default_value = "/dev/kmsg_writer")]
        device: PathBuf,
        /// Priority of the message, for example `KERN_WARNING` or `kern.warn`.
        #[structopt(long, conflicts_with = "json")]
        priority: Option<String>,
        /// Text of the message.
        #[structopt(long, conflicts_with = "json")]
        message: Option<String>,
        /// Whole message as JSON, for example `{"priority":"KERN_INFO","message":"hello"}`.
        #[structopt(long)]
        json: Option<String>,
    },

    /// Hosts the device in this process and writes every line of stdin to it.
    Pipe {
        /// Name to register the device under.
        #[structopt(long, default_value = "kmsg_writer")]
        name: String,
        /// Kernel log device the entries are written to.
        #[structopt(long, parse(from_os_str), conflicts_with_all = &["stdout", "log"])]
        kmsg: Option<PathBuf>,
        /// Print the entries on stdout. This is the default.
        #[structopt(long, conflicts_with = "log")]
        stdout: bool,
        /// Forward the entries to the logger, with the `kmsg` target.
        #[structopt(long)]
        log: bool,
    },
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("Either --json or --message must be passed")]
    MissingMessage,

    #[error("Invalid JSON message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validate(ValidateError),

    #[error("Failed to open {}: {}", .0.display(), .1)]
    OpenDevice(PathBuf, io::Error),

    #[error("Failed to write to the device: {0}")]
    WriteDevice(io::Error),

    #[error("Failed to register the device: {0}")]
    Register(#[from] RegisterError),

    #[error("{0}")]
    Device(#[from] DeviceWriteError),

    #[error("{0}")]
    Io(#[from] io::Error),
}

fn main() {
    env_logger::init();

    if let Err(err) = run(CliOptions::from_args()) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn run(cli_opts: CliOptions) -> Result<(), Error> {
    match cli_opts {
        CliOptions::Parse { message } => {
            let parsed = kmsg_writer_interface::parse(message.as_bytes());
            println!(
                "{}\t{}",
                parsed.severity.macro_name(),
                String::from_utf8_lossy(parsed.text)
            );
            Ok(())
        }
        CliOptions::Inject {
            device,
            priority,
            message,
            json,
        } => {
            let message = build_message(priority, message, json)?;
            inject(&device, &message)
        }
        CliOptions::Pipe {
            name,
            kmsg,
            stdout,
            log,
        } => {
            let sink: Box<dyn KernelLogSink> = match kmsg {
                Some(path) => open_sink(path),
                None if log && !stdout => Box::new(LogFacadeSink),
                None => Box::new(StdoutSink::new()),
            };
            pipe(&name, sink)
        }
    }
}

/// Builds the message to inject from the command line arguments.
fn build_message(
    priority: Option<String>,
    message: Option<String>,
    json: Option<String>,
) -> Result<KernelMessage, Error> {
    let message = match (json, message) {
        (Some(json), _) => serde_json::from_str::<KernelMessage>(&json)?,
        (None, Some(message)) => {
            let priority = priority
                .as_deref()
                .map(Priority::from_name)
                .unwrap_or_default();
            KernelMessage::new(priority, message)
        }
        (None, None) => return Err(Error::MissingMessage),
    };

    message.validate().map_err(Error::Validate)?;
    Ok(message)
}

fn inject(device: &Path, message: &KernelMessage) -> Result<(), Error> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .open(device)
        .map_err(|err| Error::OpenDevice(device.to_path_buf(), err))?;

    // One write per message; the device treats every write as a separate entry.
    let wire = message.to_wire();
    let written = file.write(wire.as_bytes()).map_err(Error::WriteDevice)?;
    if written < wire.len() {
        log::warn!("device accepted {} bytes out of {}", written, wire.len());
    }

    log::debug!("injected {:?} into {}", wire, device.display());
    Ok(())
}

fn pipe(name: &str, sink: Box<dyn KernelLogSink>) -> Result<(), Error> {
    let table = DeviceTable::new();
    let module = KmsgWriterModule::init(&table, sink, Config { device_name: name })?;
    log::info!("hosting {} with major number {}", name, module.major());

    let outcome = pump_stdin(&table, name);
    module.teardown();
    outcome
}

fn pump_stdin(table: &DeviceTable, name: &str) -> Result<(), Error> {
    let stdin = io::stdin();
    let input = stdin.lock();
    pump_lines(input, table, name)
}

/// Writes every line of `input` to the device, retrying as long as the device is busy.
///
/// Lines are passed as raw bytes, without their line terminator.
fn pump_lines(input: impl BufRead, table: &DeviceTable, name: &str) -> Result<(), Error> {
    for line in input.split(b'\n') {
        let line = line?;
        let line = line.strip_suffix(b"\r").unwrap_or(&line[..]);
        loop {
            match table.write(name, line) {
                Ok(_) => break,
                Err(DeviceWriteError::Write(WriteError::Busy)) => {
                    thread::sleep(Duration::from_millis(1))
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{build_message, pump_lines, Error};
    use kmsg_writer_core::{Config, KernelLogSink, KmsgWriterModule};
    use kmsg_writer_hosted::DeviceTable;
    use kmsg_writer_interface::{Priority, Severity};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<(Severity, Vec<u8>)>>);

    impl KernelLogSink for RecordingSink {
        fn emit(&self, severity: Severity, text: &[u8]) {
            self.0.lock().unwrap().push((severity, text.to_vec()));
        }
    }

    #[test]
    fn pumped_lines_keep_raw_bytes() {
        let table = DeviceTable::new();
        let sink = Arc::new(RecordingSink::default());
        let module = KmsgWriterModule::init(&table, sink.clone(), Config::default()).unwrap();

        let input: &[u8] = b"KERN_ERR,ok\n\xff\xfe\nKERN_INFO,after\r\nlast";
        pump_lines(input, &table, "kmsg_writer").unwrap();
        module.teardown();

        let entries = sink.0.lock().unwrap();
        assert_eq!(
            entries[1..5],
            [
                (Severity::Error, b"ok".to_vec()),
                (Severity::Info, b"\xff\xfe".to_vec()),
                (Severity::Info, b"after".to_vec()),
                (Severity::Info, b"last".to_vec()),
            ]
        );
        assert_eq!(entries.len(), 6);
    }

    #[test]
    fn pump_to_missing_device() {
        let table = DeviceTable::new();
        let input: &[u8] = b"hello\n";
        assert!(matches!(
            pump_lines(input, &table, "kmsg_writer"),
            Err(Error::Device(_))
        ));
    }

    #[test]
    fn message_from_arguments() {
        let message = build_message(
            Some("kern.warn".to_owned()),
            Some("fan speed low".to_owned()),
            None,
        )
        .unwrap();
        assert_eq!(message.priority, Priority::Severity(Severity::Warning));
        assert_eq!(message.to_wire(), "KERN_WARNING,fan speed low");
    }

    #[test]
    fn priority_defaults_to_info() {
        let message = build_message(None, Some("hello".to_owned()), None).unwrap();
        assert_eq!(message.to_wire(), "KERN_INFO,hello");
    }

    #[test]
    fn message_from_json() {
        let json = r#"{"priority":"KERN_ERR","message":"xid 79"}"#.to_owned();
        let message = build_message(None, None, Some(json)).unwrap();
        assert_eq!(message.to_wire(), "KERN_ERR,xid 79");
    }

    #[test]
    fn bad_json() {
        assert!(matches!(
            build_message(None, None, Some("{".to_owned())),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn missing_message() {
        assert!(matches!(
            build_message(Some("KERN_ERR".to_owned()), None, None),
            Err(Error::MissingMessage)
        ));
    }

    #[test]
    fn too_long() {
        let err = build_message(None, Some("a".repeat(977)), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "message length exceeds the maximum length of 976"
        );
    }
}
