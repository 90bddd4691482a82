// SPDX-License-Identifier: MPL-2.0

//! Per-process file tables

use super::open_file::FileRef;
use crate::{config::FdParams, prelude::*};

pub type FileDesc = i32;

/// A fixed-capacity map from file descriptors to open files.
///
/// The table itself is not synchronized. A process keeps it behind a reader-writer
/// lock: `place`, `place_at`, the reservation methods and `close_all` need the
/// write lock, while `get`, `put` and `is_valid` only need the read lock. No method
/// ever takes the offset lock of an open file, so callers may do I/O only after
/// dropping the table lock.
pub struct FileTable {
    slots: Vec<Slot>,
}

enum Slot {
    Free,
    /// Held for an open file that is still being opened.
    Reserved,
    Used(FileRef),
}

impl Slot {
    fn file(&self) -> Option<&FileRef> {
        match self {
            Slot::Used(file) => Some(file),
            _ => None,
        }
    }

    fn from_file(file: Option<FileRef>) -> Self {
        match file {
            Some(file) => Slot::Used(file),
            None => Slot::Free,
        }
    }
}

impl FileTable {
    /// Creates an empty table with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        let slots = core::iter::repeat_with(|| Slot::Free).take(capacity).collect();
        Self { slots }
    }

    pub fn with_params(params: &FdParams) -> Self {
        Self::new(params.max_files())
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of open descriptors.
    pub fn len(&self) -> usize {
        self.slots.iter().filter_map(Slot::file).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Installs `file` in the lowest free slot and returns its descriptor.
    ///
    /// The table takes over the caller's reference. If the table is full, the
    /// reference is handed back with `EMFILE` and the caller must release it.
    pub fn place(&mut self, file: FileRef) -> core::result::Result<FileDesc, (Error, FileRef)> {
        let Some(idx) = self.lowest_free() else {
            return Err((
                Error::with_message(Errno::EMFILE, "the file table is full"),
                file,
            ));
        };
        self.slots[idx] = Slot::Used(file);
        Ok(idx as FileDesc)
    }

    /// Replaces the content of slot `fd` and returns what it held before.
    ///
    /// The previous occupant, if any, becomes the caller's reference. Passing `None`
    /// empties the slot. A reserved slot cannot be replaced (`EBUSY`).
    pub fn place_at(&mut self, file: Option<FileRef>, fd: FileDesc) -> Result<Option<FileRef>> {
        let idx = self.slot_index(fd)?;
        if matches!(self.slots[idx], Slot::Reserved) {
            return_errno_with_message!(Errno::EBUSY, "the fd is being opened");
        }
        match core::mem::replace(&mut self.slots[idx], Slot::from_file(file)) {
            Slot::Used(old) => Ok(Some(old)),
            _ => Ok(None),
        }
    }

    /// Reserves the lowest free slot, so that a file can be opened knowing that
    /// it will get a descriptor.
    ///
    /// The reservation ends with [`FileTable::install`] or [`FileTable::unreserve`].
    pub fn reserve(&mut self) -> Result<FileDesc> {
        let Some(idx) = self.lowest_free() else {
            return_errno_with_message!(Errno::EMFILE, "the file table is full");
        };
        self.slots[idx] = Slot::Reserved;
        Ok(idx as FileDesc)
    }

    /// Installs `file` in the slot reserved at `fd`.
    ///
    /// If the reservation is gone, e.g., because the process has exited meanwhile,
    /// the reference is handed back with `EBADF`.
    pub fn install(
        &mut self,
        fd: FileDesc,
        file: FileRef,
    ) -> core::result::Result<(), (Error, FileRef)> {
        let Ok(idx) = self.slot_index(fd) else {
            return Err((Error::with_message(Errno::EBADF, "fd is out of range"), file));
        };
        if !matches!(self.slots[idx], Slot::Reserved) {
            return Err((
                Error::with_message(Errno::EBADF, "the fd is not reserved"),
                file,
            ));
        }
        self.slots[idx] = Slot::Used(file);
        Ok(())
    }

    /// Gives up the reservation of `fd`.
    pub fn unreserve(&mut self, fd: FileDesc) {
        if let Ok(idx) = self.slot_index(fd) {
            if matches!(self.slots[idx], Slot::Reserved) {
                self.slots[idx] = Slot::Free;
            }
        }
    }

    /// Returns an in-use reference to the open file at `fd`.
    ///
    /// The reference keeps the open file alive even if the descriptor is closed
    /// meanwhile. Give it back with [`FileTable::put`].
    pub fn get(&self, fd: FileDesc) -> Result<FileRef> {
        let idx = self.slot_index(fd)?;
        self.slots[idx]
            .file()
            .map(FileRef::dup)
            .ok_or_else(|| Error::with_message(Errno::EBADF, "the fd is not open"))
    }

    /// Returns an in-use reference obtained from [`FileTable::get`].
    pub fn put(&self, fd: FileDesc, file: FileRef) {
        if file.release() {
            trace!("fd {} was closed while in use", fd);
        }
    }

    pub fn is_valid(&self, fd: FileDesc) -> bool {
        self.slot_index(fd)
            .is_ok_and(|idx| self.slots[idx].file().is_some())
    }

    /// Returns the open descriptors in increasing order.
    pub fn fds(&self) -> impl Iterator<Item = FileDesc> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.file().is_some())
            .map(|(idx, _)| idx as FileDesc)
    }

    /// Empties every slot and returns the references they held.
    ///
    /// Pending reservations are dropped as well.
    pub fn close_all(&mut self) -> Vec<FileRef> {
        self.slots
            .iter_mut()
            .filter_map(|slot| match core::mem::replace(slot, Slot::Free) {
                Slot::Used(file) => Some(file),
                _ => None,
            })
            .collect()
    }

    fn lowest_free(&self) -> Option<usize> {
        self.slots.iter().position(|slot| matches!(slot, Slot::Free))
    }

    fn slot_index(&self, fd: FileDesc) -> Result<usize> {
        usize::try_from(fd)
            .ok()
            .filter(|idx| *idx < self.slots.len())
            .ok_or_else(|| Error::with_message(Errno::EBADF, "fd is out of range"))
    }
}

impl Clone for FileTable {
    /// Copies the table for a forked process. Both tables share the open files.
    ///
    /// Reservations are not inherited.
    fn clone(&self) -> Self {
        let slots = self
            .slots
            .iter()
            .map(|slot| Slot::from_file(slot.file().map(FileRef::dup)))
            .collect();
        Self { slots }
    }
}

impl Debug for FileTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FileTable")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}
