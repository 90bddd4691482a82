// SPDX-License-Identifier: MPL-2.0

use super::{AccessMode, CreationFlags, InodeMode, StatusFlags};
use crate::prelude::*;

/// Arguments for an open request.
#[derive(Debug, Clone, Copy)]
pub struct OpenArgs {
    pub creation_flags: CreationFlags,
    pub status_flags: StatusFlags,
    pub access_mode: AccessMode,
    pub inode_mode: InodeMode,
}

impl OpenArgs {
    /// Decodes and validates the `flags` and `mode` arguments of `open`.
    ///
    /// Besides the access mode, only the creation flags and `O_APPEND` are accepted.
    pub fn from_flags_and_mode(flags: u32, mode: u16) -> Result<Self> {
        let known_bits =
            AccessMode::O_ACCMODE | CreationFlags::all().bits() | StatusFlags::all().bits();
        if flags & !known_bits != 0 {
            return_errno_with_message!(Errno::EINVAL, "unknown open flags");
        }
        // Every bit set at once can only be a garbage argument, and it also encodes
        // the invalid access mode.
        if flags == known_bits {
            return_errno_with_message!(Errno::EINVAL, "all open flags are set");
        }

        let creation_flags = CreationFlags::from_bits_truncate(flags);
        let status_flags = StatusFlags::from_bits_truncate(flags);
        let access_mode = AccessMode::from_u32(flags)?;
        let inode_mode = InodeMode::from_bits_truncate(mode);
        Ok(Self {
            creation_flags,
            status_flags,
            access_mode,
            inode_mode,
        })
    }

    /// Creates the arguments directly, as in-kernel callers do.
    pub fn new(
        access_mode: AccessMode,
        creation_flags: CreationFlags,
        status_flags: StatusFlags,
        inode_mode: InodeMode,
    ) -> Self {
        Self {
            creation_flags,
            status_flags,
            access_mode,
            inode_mode,
        }
    }
}
