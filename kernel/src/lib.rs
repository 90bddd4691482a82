// SPDX-License-Identifier: MPL-2.0

//! The file-descriptor subsystem of a kernel.
//!
//! Each [`Process`] owns a [`FileTable`] that maps small integer descriptors to
//! shared, reference-counted [`OpenFile`]s. The system calls in [`syscall`] work on
//! the table and the open files: `open`, `read`, `write`, `close`, `lseek`, `dup2`,
//! `unlink` and `meld`, which interleaves two files into a new one.
//!
//! [`Process`]: process::Process
//! [`FileTable`]: fs::file_table::FileTable
//! [`OpenFile`]: fs::open_file::OpenFile

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod config;
pub mod context;
pub mod error;
pub mod fs;
pub mod logger;
mod prelude;
pub mod process;
pub mod syscall;
pub mod vm;

use crate::{config::FdParams, logger::ConsoleSink};

/// Initializes the subsystem from the kernel command line.
///
/// The logger starts writing to `console`. Returns the parameters that new
/// processes should be created with.
pub fn init(cmdline: &str, console: ConsoleSink) -> FdParams {
    let params = FdParams::from(cmdline);
    logger::init(console, &params);
    log::info!(
        "fd subsystem: {} slots per table, log level {}",
        params.max_files(),
        params.log_level()
    );
    params
}
