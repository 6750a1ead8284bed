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

//! Access to the memory of the writer.

use core::fmt;

/// Memory provided by the caller of a write.
///
/// The memory is not trusted: the caller might have passed a buffer that is shorter than it
/// claims, or that has been unmapped in the meanwhile.
pub trait UserBuffer {
    /// Copies the first `dst.len()` bytes of the buffer into `dst`.
    ///
    /// On error, the content of `dst` is unspecified.
    fn copy_to(&self, dst: &mut [u8]) -> Result<(), CopyFault>;
}

impl UserBuffer for [u8] {
    fn copy_to(&self, dst: &mut [u8]) -> Result<(), CopyFault> {
        let src = self.get(..dst.len()).ok_or(CopyFault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

impl<'a, T: ?Sized + UserBuffer> UserBuffer for &'a T {
    fn copy_to(&self, dst: &mut [u8]) -> Result<(), CopyFault> {
        (**self).copy_to(dst)
    }
}

/// Part of the caller's memory couldn't be accessed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CopyFault;

impl fmt::Display for CopyFault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Bad address")
    }
}
