// SPDX-License-Identifier: MPL-2.0

//! VFS components

pub use access_mode::AccessMode;
pub use creation_flags::CreationFlags;
pub use fs::FileSystem;
pub use open_args::OpenArgs;
pub use status_flags::StatusFlags;
pub use vnode::{InodeMode, Metadata, Vnode};

mod access_mode;
mod creation_flags;
mod fs;
mod open_args;
mod status_flags;
mod vnode;

#[derive(Copy, PartialEq, Eq, Clone, Debug)]
pub enum SeekFrom {
    Start(usize),
    End(isize),
    Current(isize),
}

/// Maximum bytes in a path
pub const PATH_MAX: usize = 4096;

/// Maximum bytes in a file name
pub const NAME_MAX: usize = 255;
