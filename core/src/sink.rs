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

//! Output of the device.

use alloc::{boxed::Box, sync::Arc};
use kmsg_writer_interface::Severity;

/// Destination of the log entries produced by the device.
///
/// Emitting is fire-and-forget: the device has no way to report a failure back to the writer,
/// and implementations are expected to deal with their own errors.
pub trait KernelLogSink: Send + Sync {
    /// Appends one entry to the kernel logs.
    ///
    /// The text is passed as raw bytes, exactly as written to the device minus the tag. How the
    /// severity gets rendered is up to the implementation.
    fn emit(&self, severity: Severity, text: &[u8]);
}

impl<T: ?Sized + KernelLogSink> KernelLogSink for Arc<T> {
    fn emit(&self, severity: Severity, text: &[u8]) {
        (**self).emit(severity, text)
    }
}

impl<T: ?Sized + KernelLogSink> KernelLogSink for Box<T> {
    fn emit(&self, severity: Severity, text: &[u8]) {
        (**self).emit(severity, text)
    }
}
