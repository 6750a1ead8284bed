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

//! Messages as built by the programs that write to the device.

use crate::ffi::Severity;
use alloc::{format, string::String};
use core::fmt;

/// Maximum length of the text of a printk record. Longer messages are rejected by
/// [`KernelMessage::validate`].
pub const MAX_PRINTK_RECORD_LENGTH: usize = 1024 - 48;

/// Priority requested by a writer.
///
/// Contrary to [`Severity`], this also contains [`Priority::Default`], which lets the device
/// pick the default severity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Corresponds to `KERN_DEFAULT`.
    Default,
    Severity(Severity),
}

impl Priority {
    /// Normalizes a priority name.
    ///
    /// Accepts the device spellings, `kern.warn`, `KERN_DEFAULT` and `kern.default`. Anything
    /// else, including names in the wrong case, results in `KERN_INFO`.
    pub fn from_name(name: &str) -> Priority {
        match name {
            "KERN_DEFAULT" | "kern.default" => Priority::Default,
            "kern.warn" => Priority::Severity(Severity::Warning),
            other => Priority::Severity(Severity::from_tag(other.as_bytes()).unwrap_or_default()),
        }
    }

    /// Returns the C-macro spelling of the priority, such as `KERN_ERR`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Default => "KERN_DEFAULT",
            Priority::Severity(severity) => severity.macro_name(),
        }
    }

    /// Returns the severity this priority selects, or `None` for [`Priority::Default`].
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Priority::Default => None,
            Priority::Severity(severity) => Some(*severity),
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Severity(Severity::Info)
    }
}

impl From<Severity> for Priority {
    fn from(severity: Severity) -> Self {
        Priority::Severity(severity)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Priority {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Priority {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Priority::from_name(&name))
    }
}

/// Message to inject in the kernel logs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KernelMessage {
    pub priority: Priority,
    pub message: String,
}

impl KernelMessage {
    pub fn new(priority: impl Into<Priority>, message: impl Into<String>) -> Self {
        KernelMessage {
            priority: priority.into(),
            message: message.into(),
        }
    }

    /// Checks that the message fits in a printk record.
    pub fn validate(&self) -> Result<(), ValidateError> {
        if self.message.len() > MAX_PRINTK_RECORD_LENGTH {
            return Err(ValidateError::MessageTooLong {
                len: self.message.len(),
                max: MAX_PRINTK_RECORD_LENGTH,
            });
        }

        Ok(())
    }

    /// Builds the bytes to write to the device.
    pub fn to_wire(&self) -> String {
        format!("{},{}", self.priority.as_str(), self.message)
    }
}

/// Error that can happen when validating a [`KernelMessage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateError {
    MessageTooLong { len: usize, max: usize },
}

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidateError::MessageTooLong { max, .. } => {
                write!(f, "message length exceeds the maximum length of {}", max)
            }
        }
    }
}
