// SPDX-License-Identifier: MPL-2.0

//! The context that system call handlers run in.

use crate::{fs::utils::PATH_MAX, prelude::*, process::Process, vm::VmSpace};

/// The context that can be accessed from the calling thread.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub process: &'a Process,
}

impl<'a> Context<'a> {
    pub fn new(process: &'a Process) -> Self {
        Self { process }
    }

    /// Gets the user space of the calling process.
    pub fn user_space(&self) -> CurrentUserSpace<'a> {
        CurrentUserSpace(self.process.vm())
    }
}

/// The user's memory space of the calling process.
///
/// It provides methods to copy data between the user space and kernel buffers.
pub struct CurrentUserSpace<'a>(&'a VmSpace);

impl CurrentUserSpace<'_> {
    /// Reads `dest.len()` bytes from the user space into `dest`.
    ///
    /// Returns `EFAULT` unless the whole range is mapped.
    pub fn read_bytes(&self, src: Vaddr, dest: &mut [u8]) -> Result<()> {
        if dest.is_empty() {
            return Ok(());
        }
        check_vaddr(src)?;
        self.0.read(src, dest)
    }

    /// Writes `src` into the user space at `dest`.
    ///
    /// Returns `EFAULT` unless the whole range is mapped.
    pub fn write_bytes(&self, dest: Vaddr, src: &[u8]) -> Result<()> {
        if src.is_empty() {
            return Ok(());
        }
        check_vaddr(dest)?;
        self.0.write(dest, src)
    }

    /// Reads a C string from the user space of the calling process.
    ///
    /// The length of the string should not exceed `max_len`, including the final `\0`
    /// byte. A string without a terminator within `max_len` bytes is rejected with
    /// `ENAMETOOLONG`; an invalid address with `EFAULT`.
    pub fn read_cstring(&self, vaddr: Vaddr, max_len: usize) -> Result<CString> {
        check_vaddr(vaddr)?;

        match self.0.read_until_nul(vaddr, max_len)? {
            Some(bytes) => Ok(CString::from_vec_with_nul(bytes).map_err(|_| {
                Error::with_message(Errno::EINVAL, "Cannot find null in cstring")
            })?),
            None => return_errno_with_message!(
                Errno::ENAMETOOLONG,
                "no nul terminator is present before reaching the length limit"
            ),
        }
    }

    /// Reads a path name and checks that it is valid UTF-8.
    pub fn read_path(&self, vaddr: Vaddr) -> Result<String> {
        let cstring = self.read_cstring(vaddr, PATH_MAX)?;
        Ok(cstring.to_str()?.to_string())
    }
}

/// Checks if the user space pointer is below the lowest userspace address.
///
/// If a pointer is below the lowest userspace address, it is likely to be a
/// NULL pointer. Reading from or writing to a NULL pointer should trigger a
/// segmentation fault.
fn check_vaddr(va: Vaddr) -> Result<()> {
    if va < crate::vm::PAGE_SIZE {
        return_errno_with_message!(Errno::EFAULT, "Bad user space pointer specified");
    }
    Ok(())
}
