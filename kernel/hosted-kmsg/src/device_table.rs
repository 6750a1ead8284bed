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

//! In-process list of character devices.
//!
//! Devices are identified by their name, and get a major number from the range the host kernel
//! reserves for dynamic assignment.

use hashbrown::HashMap;
use kmsg_writer_core::{DeviceHandle, DeviceRegistry, WriteError, WriteHandler};
use parking_lot::Mutex;
use std::{ops::RangeInclusive, sync::Arc};

/// Major numbers handed out to devices.
const DYNAMIC_MAJORS: RangeInclusive<u32> = 234..=254;

/// List of registered devices.
pub struct DeviceTable {
    devices: Mutex<HashMap<String, Registered>>,
}

struct Registered {
    major: u32,
    handler: Arc<dyn WriteHandler>,
}

/// Handle to a device registered in a [`DeviceTable`].
#[derive(Debug, PartialEq, Eq)]
pub struct TableHandle {
    name: String,
    major: u32,
}

impl TableHandle {
    /// Returns the name the device was registered with.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl DeviceHandle for TableHandle {
    fn major(&self) -> u32 {
        self.major
    }
}

impl DeviceTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        DeviceTable {
            devices: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the major number of the device with the given name.
    pub fn major_of(&self, name: &str) -> Option<u32> {
        self.devices.lock().get(name).map(|d| d.major)
    }

    /// Writes `data` to the device with the given name.
    ///
    /// The table isn't locked during the write itself.
    pub fn write(&self, name: &str, data: &[u8]) -> Result<usize, DeviceWriteError> {
        let handler = self
            .devices
            .lock()
            .get(name)
            .map(|d| d.handler.clone())
            .ok_or(DeviceWriteError::NoSuchDevice)?;

        handler
            .write(&data, data.len())
            .map_err(DeviceWriteError::Write)
    }
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRegistry for DeviceTable {
    type Handle = TableHandle;
    type Error = RegisterError;

    fn register_writable_device(
        &self,
        name: &str,
        handler: Arc<dyn WriteHandler>,
    ) -> Result<TableHandle, RegisterError> {
        let mut devices = self.devices.lock();
        if devices.contains_key(name) {
            return Err(RegisterError::NameTaken(name.to_owned()));
        }

        let major = DYNAMIC_MAJORS
            .clone()
            .find(|major| devices.values().all(|d| d.major != *major))
            .ok_or(RegisterError::NoMajorAvailable)?;

        log::debug!("device {} registered with major {}", name, major);
        devices.insert(name.to_owned(), Registered { major, handler });
        Ok(TableHandle {
            name: name.to_owned(),
            major,
        })
    }

    fn unregister_device(&self, handle: TableHandle) {
        let mut devices = self.devices.lock();
        let known = devices
            .get(&handle.name)
            .map_or(false, |d| d.major == handle.major);
        if known {
            devices.remove(&handle.name);
            log::debug!("device {} unregistered", handle.name);
        } else {
            log::warn!("unregistering unknown device {}", handle.name);
        }
    }
}

/// Error that can happen when registering a device.
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("A device named {0:?} is already registered")]
    NameTaken(String),

    #[error("No major number available")]
    NoMajorAvailable,
}

/// Error that can happen when writing to a device of the table.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DeviceWriteError {
    #[error("No such device")]
    NoSuchDevice,

    #[error("{0}")]
    Write(WriteError),
}

impl DeviceWriteError {
    /// Returns the `errno` value matching this error.
    pub fn errno(&self) -> i32 {
        match self {
            DeviceWriteError::NoSuchDevice => 19,
            DeviceWriteError::Write(err) => err.errno(),
        }
    }
}
