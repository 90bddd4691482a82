// SPDX-License-Identifier: MPL-2.0

use crate::prelude::*;

bitflags! {
    /// The permission bits of a file.
    pub struct InodeMode: u16 {
        /// set-user-ID
        const S_ISUID = 0o4000;
        /// set-group-ID
        const S_ISGID = 0o2000;
        /// sticky bit
        const S_ISVTX = 0o1000;
        /// read by owner
        const S_IRUSR = 0o0400;
        /// write by owner
        const S_IWUSR = 0o0200;
        /// execute/search by owner
        const S_IXUSR = 0o0100;
        /// read by group
        const S_IRGRP = 0o0040;
        /// write by group
        const S_IWGRP = 0o0020;
        /// execute/search by group
        const S_IXGRP = 0o0010;
        /// read by others
        const S_IROTH = 0o0004;
        /// write by others
        const S_IWOTH = 0o0002;
        /// execute/search by others
        const S_IXOTH = 0o0001;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    /// The inode number.
    pub ino: u64,
    /// The length of the file content in bytes.
    pub size: usize,
    pub mode: InodeMode,
}

/// A file as seen by the file-descriptor layer.
///
/// All I/O happens at explicit offsets; the position of an open file is kept by
/// the open file, never by the vnode.
pub trait Vnode: Sync + Send {
    /// Reads at most `buf.len()` bytes at `offset`.
    ///
    /// Returns the number of bytes read, which is zero at or past the end of file.
    fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<usize>;

    /// Writes `buf` at `offset`, growing the file if needed.
    ///
    /// Returns the number of bytes written.
    fn write_at(&self, offset: usize, buf: &[u8]) -> Result<usize>;

    fn metadata(&self) -> Result<Metadata>;

    fn size(&self) -> Result<usize> {
        Ok(self.metadata()?.size)
    }
}

impl Debug for dyn Vnode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Vnode")
            .field("metadata", &self.metadata())
            .finish()
    }
}
