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

//! Kernel log writer device.
//!
//! This crate contains the kernel side of the kernel log writer: a write-only device that turns
//! every write into one entry of the kernel logs.
//!
//! The environment hosting the device is abstracted away behind two traits:
//!
//! - [`DeviceRegistry`](module::DeviceRegistry), which makes the device reachable by name.
//! - [`KernelLogSink`](sink::KernelLogSink), where the log entries end up.
//!
//! The [`KmsgWriterModule`](module::KmsgWriterModule) ties everything together and should be
//! initialized when the environment starts and torn down when it stops.

#![no_std]
#![warn(missing_docs)]
#![deny(unsafe_code)]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod buffer;
pub mod device;
pub mod module;
pub mod sink;

pub use buffer::{CopyFault, UserBuffer};
pub use device::{KmsgWriterDevice, WriteError, WriteHandler};
pub use kmsg_writer_interface::{ParsedMessage, Severity, MAX_LEN};
pub use module::{Config, DeviceHandle, DeviceRegistry, KmsgWriterModule, DEFAULT_DEVICE_NAME};
pub use sink::KernelLogSink;
