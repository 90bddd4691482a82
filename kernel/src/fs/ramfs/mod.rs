// SPDX-License-Identifier: MPL-2.0

//! Ramfs with a flat namespace

pub use fs::{RamFs, RamInode};

mod fs;

const ROOT_INO: u64 = 1;
