// SPDX-License-Identifier: MPL-2.0

use crate::prelude::*;

bitflags! {
    pub struct StatusFlags: u32 {
        /// append on each write
        const O_APPEND = 1 << 10;
    }
}
