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

//! Hosts the kernel log writer on top of a regular operating system.
//!
//! Provides a [`DeviceTable`] where the device can be registered, and a few implementations of
//! [`KernelLogSink`](kmsg_writer_core::KernelLogSink): the host's `/dev/kmsg`, stdout, or the
//! `log` crate.

pub mod device_table;
pub mod sink;

pub use device_table::{DeviceTable, DeviceWriteError, RegisterError, TableHandle};
pub use sink::{open_sink, DevKmsgSink, LogFacadeSink, NoopSink, StdoutSink};
