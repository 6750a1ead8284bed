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

//! Definitions shared between the writers and the device.
//!
//! A message written to the device consists of an optional tag naming the severity, followed
//! with a comma, followed with the text to log:
//!
//! ```text
//! [<tag>,]<text>
//! ```
//!
//! Each severity has two spellings, matched case-sensitively:
//!
//! - Emergency: `KERN_EMERG`, `kern.emerg` (0)
//! - Alert: `KERN_ALERT`, `kern.alert` (1)
//! - Critical: `KERN_CRIT`, `kern.crit` (2)
//! - Error: `KERN_ERR`, `kern.err` (3)
//! - Warning: `KERN_WARNING`, `kern.warning` (4)
//! - Notice: `KERN_NOTICE`, `kern.notice` (5)
//! - Info: `KERN_INFO`, `kern.info` (6)
//! - Debug: `KERN_DEBUG`, `kern.debug` (7)
//!

use core::{convert::TryFrom, fmt};

/// Size of the staging buffer of the device. A single write accepts at most `MAX_LEN - 1`
/// bytes, the last byte being reserved for the terminating NUL.
pub const MAX_LEN: usize = 1000;

/// Tags longer than this are cut down to this length before being looked up.
///
/// Since no valid spelling is that long, such tags never match.
pub const MAX_TAG_LEN: usize = 31;

/// Severity of a kernel log line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Severity {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Severity {
    /// List of all the severities, from the most to the least urgent.
    pub const ALL: [Severity; 8] = [
        Severity::Emergency,
        Severity::Alert,
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Notice,
        Severity::Info,
        Severity::Debug,
    ];

    /// Looks up a tag among the 16 recognized spellings.
    pub fn from_tag(tag: &[u8]) -> Option<Severity> {
        Some(match tag {
            b"KERN_EMERG" | b"kern.emerg" => Severity::Emergency,
            b"KERN_ALERT" | b"kern.alert" => Severity::Alert,
            b"KERN_CRIT" | b"kern.crit" => Severity::Critical,
            b"KERN_ERR" | b"kern.err" => Severity::Error,
            b"KERN_WARNING" | b"kern.warning" => Severity::Warning,
            b"KERN_NOTICE" | b"kern.notice" => Severity::Notice,
            b"KERN_INFO" | b"kern.info" => Severity::Info,
            b"KERN_DEBUG" | b"kern.debug" => Severity::Debug,
            _ => return None,
        })
    }

    /// Returns the C-macro spelling of the severity, such as `KERN_ERR`.
    pub fn macro_name(&self) -> &'static str {
        match self {
            Severity::Emergency => "KERN_EMERG",
            Severity::Alert => "KERN_ALERT",
            Severity::Critical => "KERN_CRIT",
            Severity::Error => "KERN_ERR",
            Severity::Warning => "KERN_WARNING",
            Severity::Notice => "KERN_NOTICE",
            Severity::Info => "KERN_INFO",
            Severity::Debug => "KERN_DEBUG",
        }
    }

    /// Returns the syslog-style spelling of the severity, such as `kern.err`.
    pub fn dotted_name(&self) -> &'static str {
        match self {
            Severity::Emergency => "kern.emerg",
            Severity::Alert => "kern.alert",
            Severity::Critical => "kern.crit",
            Severity::Error => "kern.err",
            Severity::Warning => "kern.warning",
            Severity::Notice => "kern.notice",
            Severity::Info => "kern.info",
            Severity::Debug => "kern.debug",
        }
    }

    /// Short upper-case label, used when printing.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Emergency => "EMERG",
            Severity::Alert => "ALERT",
            Severity::Critical => "CRIT",
            Severity::Error => "ERR",
            Severity::Warning => "WARN",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Info
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.macro_name())
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> u8 {
        match severity {
            Severity::Emergency => 0,
            Severity::Alert => 1,
            Severity::Critical => 2,
            Severity::Error => 3,
            Severity::Warning => 4,
            Severity::Notice => 5,
            Severity::Info => 6,
            Severity::Debug => 7,
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = InvalidSeverityError;

    fn try_from(value: u8) -> Result<Self, InvalidSeverityError> {
        Ok(match value {
            0 => Severity::Emergency,
            1 => Severity::Alert,
            2 => Severity::Critical,
            3 => Severity::Error,
            4 => Severity::Warning,
            5 => Severity::Notice,
            6 => Severity::Info,
            7 => Severity::Debug,
            n => return Err(InvalidSeverityError(n)),
        })
    }
}

impl From<Severity> for log::Level {
    fn from(severity: Severity) -> log::Level {
        match severity {
            Severity::Emergency | Severity::Alert | Severity::Critical | Severity::Error => {
                log::Level::Error
            }
            Severity::Warning => log::Level::Warn,
            Severity::Notice | Severity::Info => log::Level::Info,
            Severity::Debug => log::Level::Debug,
        }
    }
}

/// Error that can happen when decoding a [`Severity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSeverityError(u8);

impl InvalidSeverityError {
    /// Returns the value that failed to decode.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for InvalidSeverityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid kernel log level: {}", self.0)
    }
}
