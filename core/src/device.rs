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

//! Write side of the device.
//!
//! The device owns a single staging buffer of [`MAX_LEN`] bytes, protected by a spinlock. A
//! write claims the buffer, copies the caller's data in it, parses it, hands the result to the
//! [`KernelLogSink`], and releases the buffer.
//!
//! Writes never wait for each other. If the buffer is already claimed, the write immediately
//! fails with [`WriteError::Busy`] and it is the responsibility of the caller to try again.

use crate::{buffer::UserBuffer, sink::KernelLogSink};

use core::fmt;
use kmsg_writer_interface::{parse, MAX_LEN};
use spinning_top::Spinlock;


/// Kernel log writer device.
pub struct KmsgWriterDevice<S> {
    /// Buffer where the data of the write in progress is copied. Its content is meaningless
    /// outside of [`KmsgWriterDevice::write`].
    staging: Spinlock<[u8; MAX_LEN]>,
    /// Where the parsed messages go.
    sink: S,
}

impl<S: KernelLogSink> KmsgWriterDevice<S> {
    /// Initializes a new device that emits to the given sink.
    pub fn new(sink: S) -> Self {
        KmsgWriterDevice {
            staging: Spinlock::new([0; MAX_LEN]),
            sink,
        }
    }

    /// Returns the sink passed at initialization.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Handles a write of `requested_len` bytes from `source`.
    ///
    /// At most `MAX_LEN - 1` bytes are accepted; anything past that is silently ignored. On
    /// success, returns the number of bytes that were accepted.
    pub fn write<B>(&self, source: &B, requested_len: usize) -> Result<usize, WriteError>
    where
        B: ?Sized + UserBuffer,
    {
        let len = requested_len.min(MAX_LEN - 1);

        // The guard is released when it goes out of scope, including on the error path below.
        let mut staging = self.staging.try_lock().ok_or(WriteError::Busy)?;

        source
            .copy_to(&mut staging[..len])
            .map_err(|_| WriteError::FaultyInput)?;
        staging[len] = 0;

        let message = parse(&staging[..=len]);
        log::trace!(
            "write of {} bytes, severity {}, text length {}",
            len,
            message.severity,
            message.text.len()
        );
        self.sink.emit(message.severity, message.text);

        Ok(len)
    }
}

impl<S> fmt::Debug for KmsgWriterDevice<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("KmsgWriterDevice").finish()
    }
}

/// Object-safe access to a device that accepts writes.
///
/// This is what gets registered towards the [`DeviceRegistry`](crate::module::DeviceRegistry).
pub trait WriteHandler: Send + Sync {
    /// Handles a write of `requested_len` bytes from `source`, and returns the number of bytes
    /// that were accepted.
    fn write(&self, source: &dyn UserBuffer, requested_len: usize) -> Result<usize, WriteError>;
}

impl<S: KernelLogSink> WriteHandler for KmsgWriterDevice<S> {
    fn write(&self, source: &dyn UserBuffer, requested_len: usize) -> Result<usize, WriteError> {
        KmsgWriterDevice::write(self, source, requested_len)
    }
}

/// Error that can happen when writing to the device.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// Another write is in progress. The write can be tried again later.
    Busy,
    /// The data of the writer couldn't be read.
    FaultyInput,
}

impl WriteError {
    /// Returns the `errno` value a character device reports for this error.
    pub fn errno(&self) -> i32 {
        match self {
            WriteError::Busy => 16,
            WriteError::FaultyInput => 14,
        }
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WriteError::Busy => write!(f, "Device or resource busy"),
            WriteError::FaultyInput => write!(f, "Bad address"),
        }
    }
}
