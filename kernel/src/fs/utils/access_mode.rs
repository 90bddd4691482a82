// SPDX-License-Identifier: MPL-2.0

use crate::prelude::*;

#[expect(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum AccessMode {
    /// read only
    O_RDONLY = 0,
    /// write only
    O_WRONLY = 1,
    /// read write
    O_RDWR = 2,
}

impl AccessMode {
    /// The bits of the open flags that encode the access mode.
    pub const O_ACCMODE: u32 = 0o3;

    pub fn is_readable(&self) -> bool {
        matches!(*self, AccessMode::O_RDONLY | AccessMode::O_RDWR)
    }

    pub fn is_writable(&self) -> bool {
        matches!(*self, AccessMode::O_WRONLY | AccessMode::O_RDWR)
    }

    /// Extracts the access mode from the open flags.
    ///
    /// `O_ACCMODE` itself (both bits set) is not a valid access mode.
    pub fn from_u32(flags: u32) -> Result<Self> {
        match flags & Self::O_ACCMODE {
            0 => Ok(AccessMode::O_RDONLY),
            1 => Ok(AccessMode::O_WRONLY),
            2 => Ok(AccessMode::O_RDWR),
            _ => return_errno_with_message!(Errno::EINVAL, "invalid access mode"),
        }
    }
}
