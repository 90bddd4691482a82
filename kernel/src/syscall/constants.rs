// SPDX-License-Identifier: MPL-2.0

//! constants used in syscall

use crate::fs::utils::PATH_MAX;

/// LONGEST ALLOWED FILENAME
pub const MAX_FILENAME_LEN: usize = PATH_MAX;

/// The bytes taken from each input file per `meld` step.
pub const MELD_CHUNK_SIZE: usize = 4;

/// The permission bits of a file created by `meld`.
pub const MELD_FILE_MODE: u16 = 0o664;

pub const SEEK_SET: u32 = 0;
pub const SEEK_CUR: u32 = 1;
pub const SEEK_END: u32 = 2;
