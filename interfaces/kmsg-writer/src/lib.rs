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

//! Kernel log injection.
//!
//! This interface describes what programs write to the kernel log writer device, and how the
//! device interprets it. Each write is a single entry of the kernel logs, whose severity is
//! selected by an optional tag at the start of the message.
//!
//! ```
//! use kmsg_writer_interface::{parse, Severity};
//!
//! let msg = parse(b"KERN_ERR, disk failure on sdb");
//! assert_eq!(msg.severity, Severity::Error);
//! assert_eq!(msg.text, b"disk failure on sdb");
//! ```

#![no_std]

extern crate alloc;

pub mod ffi;
pub mod message;
pub mod parse;

pub use ffi::{InvalidSeverityError, Severity, MAX_LEN, MAX_TAG_LEN};
pub use message::{KernelMessage, Priority, ValidateError, MAX_PRINTK_RECORD_LENGTH};
pub use parse::{parse, ParsedMessage};
