// SPDX-License-Identifier: MPL-2.0

//! Boot-time parameters of the file-descriptor subsystem.
//!
//! The parameters are taken from a kernel command line, whose format follows the
//! Linux kernel command line rules:
//!
//! <https://www.kernel.org/doc/html/v6.4/admin-guide/kernel-parameters.html>
//!
//! Only `module.option=value` entries are interpreted. The recognized ones are:
//!
//! ```text
//! fdtable.max_files=<1..=1024>                    # slots of every file table
//! log.level=<off|error|warn|info|debug|trace>     # maximum log level
//! ```
//!
//! Any other entry is ignored so that the same command line can be shared with the rest
//! of the kernel.

use core::str::FromStr;

use log::LevelFilter;

use crate::prelude::*;

/// The default number of slots in a file table.
pub const OPEN_MAX: usize = 128;

/// The largest value accepted for `fdtable.max_files`.
pub const OPEN_MAX_LIMIT: usize = 1024;

/// The parsed parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdParams {
    max_files: usize,
    log_level: LevelFilter,
}

impl FdParams {
    /// Returns the number of slots of a newly created file table.
    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Returns the maximum log level.
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    /// Returns a copy of the parameters with another file table size.
    pub fn with_max_files(mut self, max_files: usize) -> Result<Self> {
        if max_files == 0 || max_files > OPEN_MAX_LIMIT {
            return_errno_with_message!(Errno::EINVAL, "the file table size is out of range");
        }
        self.max_files = max_files;
        Ok(self)
    }

    fn apply(&mut self, module: &str, option: &str, value: &str) -> Result<()> {
        match (module, option) {
            ("fdtable", "max_files") => {
                let max_files = usize::from_str(value)
                    .map_err(|_| Error::with_message(Errno::EINVAL, "invalid file table size"))?;
                *self = self.with_max_files(max_files)?;
            }
            ("log", "level") => {
                self.log_level = LevelFilter::from_str(value)
                    .map_err(|_| Error::with_message(Errno::EINVAL, "invalid log level"))?;
            }
            _ => {}
        }
        Ok(())
    }
}

impl Default for FdParams {
    fn default() -> Self {
        Self {
            max_files: OPEN_MAX,
            log_level: LevelFilter::Warn,
        }
    }
}

// Splits the command line string by spaces but preserve
// ones that are protected by double quotes(`"`).
fn split_arg(input: &str) -> impl Iterator<Item = &str> {
    let mut inside_quotes = false;

    input.split(move |c: char| {
        if c == '"' {
            inside_quotes = !inside_quotes;
        }

        !inside_quotes && c.is_whitespace()
    })
}

impl From<&str> for FdParams {
    fn from(cmdline: &str) -> Self {
        let mut params = FdParams::default();

        for arg in split_arg(cmdline) {
            // Everything after the "--" mark belongs to the init process.
            if arg == "--" {
                break;
            }
            if arg.is_empty() {
                continue;
            }

            // Arg => Entry "=" Value
            let Some((entry, value)) = arg.split_once('=') else {
                continue;
            };
            // Entry => Module "." OptionName
            let Some((module, option)) = entry.split_once('.') else {
                continue;
            };
            let value = value.trim_matches('"');

            if let Err(err) = params.apply(module, option, value) {
                warn!("[cmdline] skip argument {}: {}", arg, err);
            }
        }

        params
    }
}
