// SPDX-License-Identifier: MPL-2.0

//! Open files

use core::ops::Deref;

use crate::{
    fs::utils::{AccessMode, Metadata, SeekFrom, StatusFlags, Vnode},
    prelude::*,
};

/// One open instance of a file.
///
/// An open file is shared through [`FileRef`]s. It keeps the vnode alive and
/// owns the seek position; the position is only touched with the offset lock held.
pub struct OpenFile {
    vnode: Arc<dyn Vnode>,
    access_mode: AccessMode,
    status_flags: StatusFlags,
    offset: Mutex<usize>,
}

impl OpenFile {
    /// Creates an open file at offset zero and returns the only reference to it.
    pub fn create(
        vnode: Arc<dyn Vnode>,
        access_mode: AccessMode,
        status_flags: StatusFlags,
    ) -> FileRef {
        let file = Self {
            vnode,
            access_mode,
            status_flags,
            offset: Mutex::new(0),
        };
        trace!("open file created: {:?}", file);
        FileRef(Arc::new(file))
    }

    /// Runs `body` with the offset lock held.
    ///
    /// The lock is released when `body` returns, whichever way it returns.
    pub fn with_offset_locked<R>(&self, body: impl FnOnce(&mut usize) -> R) -> R {
        let mut offset = self.offset.lock();
        body(&mut offset)
    }

    /// Reads from the current offset and advances it by the bytes read.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        if !self.access_mode.is_readable() {
            return_errno_with_message!(Errno::EACCES, "the file is not opened for reading");
        }

        self.with_offset_locked(|offset: &mut usize| -> Result<usize> {
            let len = self.vnode.read_at(*offset, buf)?;
            *offset += len;
            Ok(len)
        })
    }

    /// Writes at the current offset and advances it by the bytes written.
    ///
    /// With `O_APPEND`, the offset moves to the end of file first.
    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        if !self.access_mode.is_writable() {
            return_errno_with_message!(Errno::EACCES, "the file is not opened for writing");
        }

        self.with_offset_locked(|offset: &mut usize| -> Result<usize> {
            if self.status_flags.contains(StatusFlags::O_APPEND) {
                *offset = self.vnode.size()?;
            }
            let len = self.vnode.write_at(*offset, buf)?;
            *offset += len;
            Ok(len)
        })
    }

    pub fn seek(&self, pos: SeekFrom) -> Result<usize> {
        self.with_offset_locked(|offset: &mut usize| -> Result<usize> {
            let new_offset: isize = match pos {
                SeekFrom::Start(off /* as usize */) => {
                    if off > isize::MAX as usize {
                        return_errno_with_message!(Errno::EINVAL, "file offset is too large");
                    }
                    off as isize
                }
                SeekFrom::End(off /* as isize */) => {
                    let file_size = isize::try_from(self.vnode.size()?).map_err(|_| {
                        Error::with_message(Errno::EOVERFLOW, "file size is too large")
                    })?;
                    file_size.checked_add(off).ok_or_else(|| {
                        Error::with_message(Errno::EOVERFLOW, "file offset overflow")
                    })?
                }
                SeekFrom::Current(off /* as isize */) => (*offset as isize)
                    .checked_add(off)
                    .ok_or_else(|| Error::with_message(Errno::EOVERFLOW, "file offset overflow"))?,
            };
            if new_offset < 0 {
                return_errno_with_message!(Errno::EINVAL, "file offset must not be negative");
            }
            // Invariant: 0 <= new_offset <= isize::MAX
            let new_offset = new_offset as usize;
            *offset = new_offset;
            Ok(new_offset)
        })
    }

    pub fn offset(&self) -> usize {
        self.with_offset_locked(|offset| *offset)
    }

    pub fn metadata(&self) -> Result<Metadata> {
        self.vnode.metadata()
    }

    pub fn vnode(&self) -> &Arc<dyn Vnode> {
        &self.vnode
    }

    pub fn access_mode(&self) -> AccessMode {
        self.access_mode
    }

    pub fn status_flags(&self) -> StatusFlags {
        self.status_flags
    }
}

impl Debug for OpenFile {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OpenFile")
            .field("access_mode", &self.access_mode)
            .field("status_flags", &self.status_flags)
            .finish_non_exhaustive()
    }
}

impl Drop for OpenFile {
    fn drop(&mut self) {
        trace!("open file destroyed: {:?}", self);
    }
}

/// A counted reference to an [`OpenFile`].
///
/// Every table slot and every in-use handle owns one. The open file, and with it
/// the vnode reference, is destroyed when the last `FileRef` goes away.
#[derive(Debug)]
pub struct FileRef(Arc<OpenFile>);

impl FileRef {
    /// Takes another reference to the same open file.
    pub fn dup(&self) -> FileRef {
        FileRef(self.0.clone())
    }

    /// Gives up this reference.
    ///
    /// Returns `true` if it was the last one, in which case the open file has
    /// been destroyed.
    pub fn release(self) -> bool {
        Arc::into_inner(self.0).is_some()
    }

    /// Returns the number of live references to the open file.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Returns whether both references point to the same open file.
    pub fn is_same(&self, other: &FileRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for FileRef {
    type Target = OpenFile;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
