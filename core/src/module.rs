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

//! Lifetime of the device.
//!
//! The hosting environment is expected to call [`KmsgWriterModule::init`] when it starts and
//! [`KmsgWriterModule::teardown`] when it stops. The staging buffer of the device lives exactly
//! between these two calls.

use crate::{
    device::{KmsgWriterDevice, WriteHandler},
    sink::KernelLogSink,
};

use alloc::{format, string::String, sync::Arc};
use core::fmt;
use kmsg_writer_interface::Severity;

/// Name under which the device is registered by default.
pub const DEFAULT_DEVICE_NAME: &str = "kmsg_writer";

/// Access to the list of devices of the hosting environment.
pub trait DeviceRegistry {
    /// Identifies a registered device.
    type Handle: DeviceHandle;
    /// Error that can happen during the registration.
    type Error;

    /// Makes the handler reachable under the given name.
    fn register_writable_device(
        &self,
        name: &str,
        handler: Arc<dyn WriteHandler>,
    ) -> Result<Self::Handle, Self::Error>;

    /// Removes a device that was previously registered.
    fn unregister_device(&self, handle: Self::Handle);
}

impl<'a, T: ?Sized + DeviceRegistry> DeviceRegistry for &'a T {
    type Handle = T::Handle;
    type Error = T::Error;

    fn register_writable_device(
        &self,
        name: &str,
        handler: Arc<dyn WriteHandler>,
    ) -> Result<Self::Handle, Self::Error> {
        (**self).register_writable_device(name, handler)
    }

    fn unregister_device(&self, handle: Self::Handle) {
        (**self).unregister_device(handle)
    }
}

/// Handle returned by a [`DeviceRegistry`].
pub trait DeviceHandle {
    /// Major number assigned to the device.
    fn major(&self) -> u32;
}

/// Configuration of the module.
#[derive(Debug, Clone)]
pub struct Config<'a> {
    /// Name to register the device under.
    pub device_name: &'a str,
}

impl Default for Config<'static> {
    fn default() -> Self {
        Config {
            device_name: DEFAULT_DEVICE_NAME,
        }
    }
}

/// Kernel log writer, registered towards a [`DeviceRegistry`].
pub struct KmsgWriterModule<R: DeviceRegistry, S> {
    registry: R,
    device: Arc<KmsgWriterDevice<S>>,
    handle: R::Handle,
    device_name: String,
}

impl<R, S> KmsgWriterModule<R, S>
where
    R: DeviceRegistry,
    S: KernelLogSink + 'static,
{
    /// Creates the device and registers it.
    ///
    /// On success, a line announcing the major number of the device is emitted to the sink.
    /// If the registration fails, the error is returned and nothing is emitted.
    pub fn init(registry: R, sink: S, config: Config) -> Result<Self, R::Error> {
        let device = Arc::new(KmsgWriterDevice::new(sink));
        let handle = registry.register_writable_device(config.device_name, device.clone())?;

        let major = handle.major();
        log::debug!("registered {} with major number {}", config.device_name, major);

        let announcement = format!(
            "{}: module loaded with device major number {}",
            config.device_name, major
        );
        device.sink().emit(Severity::Info, announcement.as_bytes());

        Ok(KmsgWriterModule {
            registry,
            device,
            handle,
            device_name: String::from(config.device_name),
        })
    }

    /// Returns the device. Writes can be made directly on it.
    pub fn device(&self) -> &Arc<KmsgWriterDevice<S>> {
        &self.device
    }

    /// Returns the name the device was registered with.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Returns the major number assigned by the registry.
    pub fn major(&self) -> u32 {
        self.handle.major()
    }

    /// Unregisters the device and destroys it.
    pub fn teardown(self) {
        let KmsgWriterModule {
            registry,
            device,
            handle,
            device_name,
        } = self;

        registry.unregister_device(handle);
        log::debug!("unregistered {}", device_name);

        let farewell = format!("{}: module unloaded", device_name);
        device.sink().emit(Severity::Info, farewell.as_bytes());
    }
}

impl<R, S> fmt::Debug for KmsgWriterModule<R, S>
where
    R: DeviceRegistry,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("KmsgWriterModule")
            .field("device_name", &self.device_name)
            .field("major", &self.handle.major())
            .finish()
    }
}
