// SPDX-License-Identifier: MPL-2.0

//! User address spaces.
//!
//! A [`VmSpace`] is the part of a process that system calls copy strings and buffers
//! from and to. It is a set of disjoint mapped regions; any access that is not fully
//! covered by one region fails with `EFAULT`, like a fault on an unmapped page would.

use core::ops::Range;

use crate::prelude::*;

/// Virtual addresses.
pub type Vaddr = usize;

/// The highest virtual address (exclusive) available to user space.
pub const MAX_USERSPACE_VADDR: Vaddr = 0x0000_8000_0000_0000 - PAGE_SIZE;

/// The size of a page; mapped regions start at page-aligned addresses.
pub const PAGE_SIZE: usize = 4096;

/// A user address space.
#[derive(Debug, Default)]
pub struct VmSpace {
    /// Mapped regions keyed by their start address.
    regions: RwLock<BTreeMap<Vaddr, Box<[u8]>>>,
}

impl VmSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `len` zero-filled bytes at `vaddr`.
    pub fn map(&self, vaddr: Vaddr, len: usize) -> Result<()> {
        if len == 0 || vaddr % PAGE_SIZE != 0 {
            return_errno_with_message!(Errno::EINVAL, "the mapping is empty or misaligned");
        }
        let end = vaddr
            .checked_add(len)
            .filter(|end| *end <= MAX_USERSPACE_VADDR)
            .ok_or_else(|| Error::with_message(Errno::EINVAL, "the mapping exceeds user space"))?;

        let mut regions = self.regions.write();
        let overlaps = regions
            .range(..end)
            .next_back()
            .is_some_and(|(start, bytes)| start + bytes.len() > vaddr);
        if overlaps {
            return_errno_with_message!(Errno::EINVAL, "the mapping overlaps an existing one");
        }

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(len)?;
        bytes.resize(len, 0);
        regions.insert(vaddr, bytes.into_boxed_slice());
        Ok(())
    }

    /// Unmaps the region that starts at `vaddr`.
    pub fn unmap(&self, vaddr: Vaddr) -> Result<()> {
        self.regions
            .write()
            .remove(&vaddr)
            .map(|_| ())
            .ok_or_else(|| Error::with_message(Errno::EINVAL, "no mapping starts at the address"))
    }

    /// Copies `dest.len()` bytes starting at `vaddr` into `dest`.
    pub fn read(&self, vaddr: Vaddr, dest: &mut [u8]) -> Result<()> {
        let regions = self.regions.read();
        let (bytes, range) = lookup(&regions, vaddr, dest.len())?;
        dest.copy_from_slice(&bytes[range]);
        Ok(())
    }

    /// Copies `src` into the memory starting at `vaddr`.
    pub fn write(&self, vaddr: Vaddr, src: &[u8]) -> Result<()> {
        let mut regions = self.regions.write();
        let (start, bytes) = regions
            .range_mut(..=vaddr)
            .next_back()
            .ok_or_else(|| Error::with_message(Errno::EFAULT, "the address is not mapped"))?;
        let offset = vaddr - *start;
        let range = offset..offset.checked_add(src.len()).unwrap_or(usize::MAX);
        if range.end > bytes.len() {
            return_errno_with_message!(Errno::EFAULT, "the buffer is not fully mapped");
        }
        bytes[range].copy_from_slice(src);
        Ok(())
    }

    /// Reads the bytes starting at `vaddr` up to the first nul byte (inclusive).
    ///
    /// At most `max_len` bytes are examined. Returns `Ok(None)` if no nul byte is found
    /// within `max_len` bytes, and `EFAULT` if the mapping ends before either.
    pub fn read_until_nul(&self, vaddr: Vaddr, max_len: usize) -> Result<Option<Vec<u8>>> {
        let regions = self.regions.read();
        let (bytes, mut range) = lookup(&regions, vaddr, 0)?;
        range.end = bytes.len().min(range.start.saturating_add(max_len));

        let window = &bytes[range.clone()];
        if let Some(nul_idx) = window.iter().position(|&b| b == 0) {
            return Ok(Some(window[..=nul_idx].to_vec()));
        }
        if range.len() < max_len {
            return_errno_with_message!(Errno::EFAULT, "the string runs past the mapping");
        }
        Ok(None)
    }
}

impl Clone for VmSpace {
    /// Duplicates the address space, as `fork` does.
    fn clone(&self) -> Self {
        Self {
            regions: RwLock::new(self.regions.read().clone()),
        }
    }
}

/// Finds the region that contains `[vaddr, vaddr + len)`.
///
/// Returns the region and the byte range inside it.
fn lookup(
    regions: &BTreeMap<Vaddr, Box<[u8]>>,
    vaddr: Vaddr,
    len: usize,
) -> Result<(&[u8], Range<usize>)> {
    let (start, bytes) = regions
        .range(..=vaddr)
        .next_back()
        .ok_or_else(|| Error::with_message(Errno::EFAULT, "the address is not mapped"))?;
    let offset = vaddr - start;
    let end = offset.checked_add(len).unwrap_or(usize::MAX);
    if offset >= bytes.len() || end > bytes.len() {
        return_errno_with_message!(Errno::EFAULT, "the buffer is not fully mapped");
    }
    Ok((bytes, offset..end))
}
