// SPDX-License-Identifier: MPL-2.0

pub mod file_table;
pub mod open_file;
pub mod ramfs;
pub mod utils;
