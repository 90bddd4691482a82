// SPDX-License-Identifier: MPL-2.0

use core::fmt;

/// Error number.
///
/// Only the numbers this subsystem can produce are listed. The values are the
/// Linux ones so that a negated `Errno` is a valid system call return value.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Errno {
    ENOENT = 2,        /* No such file or directory */
    EIO = 5,           /* I/O error */
    EBADF = 9,         /* Bad file number */
    ENOMEM = 12,       /* Out of memory */
    EACCES = 13,       /* Permission denied */
    EFAULT = 14,       /* Bad address */
    EBUSY = 16,        /* Device or resource busy */
    EEXIST = 17,       /* File exists */
    ENOTDIR = 20,      /* Not a directory */
    EINVAL = 22,       /* Invalid argument */
    EMFILE = 24,       /* Too many open files */
    EFBIG = 27,        /* File too large */
    ENAMETOOLONG = 36, /* File name too long */
    ENOSYS = 38,       /* Invalid system call number */
    EOVERFLOW = 75,    /* Value too large for defined data type */
}

impl Errno {
    /// Returns the value reported to user space, i.e., the negated error number.
    pub const fn as_syscall_return(self) -> isize {
        -(self as i32 as isize)
    }
}

/// error used in this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    errno: Errno,
    msg: Option<&'static str>,
}

impl Error {
    pub const fn new(errno: Errno) -> Self {
        Error { errno, msg: None }
    }

    pub const fn with_message(errno: Errno, msg: &'static str) -> Self {
        Error {
            errno,
            msg: Some(msg),
        }
    }

    pub const fn error(&self) -> Errno {
        self.errno
    }

    pub const fn message(&self) -> Option<&'static str> {
        self.msg
    }
}

impl From<Errno> for Error {
    fn from(errno: Errno) -> Self {
        Error::new(errno)
    }
}

impl AsRef<Error> for Error {
    fn as_ref(&self) -> &Error {
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.msg {
            Some(msg) => write!(f, "{:?}: {}", self.errno, msg),
            None => write!(f, "{:?}", self.errno),
        }
    }
}

impl From<core::str::Utf8Error> for Error {
    fn from(_: core::str::Utf8Error) -> Self {
        Error::with_message(Errno::EINVAL, "Invalid utf-8 string")
    }
}

impl From<alloc::ffi::NulError> for Error {
    fn from(_: alloc::ffi::NulError) -> Self {
        Error::with_message(Errno::EINVAL, "Unexpected null in cstring")
    }
}

impl From<core::ffi::FromBytesWithNulError> for Error {
    fn from(_: core::ffi::FromBytesWithNulError) -> Self {
        Error::with_message(Errno::EINVAL, "Cannot find null in cstring")
    }
}

impl From<alloc::collections::TryReserveError> for Error {
    fn from(_: alloc::collections::TryReserveError) -> Self {
        Error::with_message(Errno::ENOMEM, "Cannot allocate the kernel buffer")
    }
}

#[macro_export]
macro_rules! return_errno {
    ($errno: expr) => {
        return Err($crate::error::Error::new($errno))
    };
}

#[macro_export]
macro_rules! return_errno_with_message {
    ($errno: expr, $message: expr) => {
        return Err($crate::error::Error::with_message($errno, $message))
    };
}
