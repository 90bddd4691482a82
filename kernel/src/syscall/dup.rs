// SPDX-License-Identifier: MPL-2.0

use super::SyscallReturn;
use crate::{fs::file_table::FileDesc, prelude::*};

pub fn sys_dup2(old_fd: FileDesc, new_fd: FileDesc, ctx: &Context) -> Result<SyscallReturn> {
    debug!("old_fd = {}, new_fd = {}", old_fd, new_fd);

    let replaced = {
        let mut file_table = ctx.process.file_table().write();
        let file = file_table.get(old_fd)?;
        if old_fd == new_fd {
            file_table.put(old_fd, file);
            return Ok(SyscallReturn::Return(new_fd as _));
        }
        // The in-use reference becomes the reference of the new slot.
        file_table.place_at(Some(file), new_fd)?
    };

    if let Some(replaced) = replaced {
        replaced.release();
    }
    Ok(SyscallReturn::Return(new_fd as _))
}
