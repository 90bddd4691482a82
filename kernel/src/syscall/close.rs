// SPDX-License-Identifier: MPL-2.0

use super::SyscallReturn;
use crate::{fs::file_table::FileDesc, prelude::*};

pub fn sys_close(fd: FileDesc, ctx: &Context) -> Result<SyscallReturn> {
    debug!("fd = {}", fd);

    let file = {
        let mut file_table = ctx.process.file_table().write();
        if !file_table.is_valid(fd) {
            return_errno_with_message!(Errno::EBADF, "the fd is not open");
        }
        file_table.place_at(None, fd)?
    };
    let Some(file) = file else {
        return_errno_with_message!(Errno::ENOENT, "the fd was empty");
    };

    // An in-use reference held by a concurrent read or write keeps the file
    // alive until that operation completes.
    if file.release() {
        trace!("fd {} closed the last reference", fd);
    }

    Ok(SyscallReturn::Return(0))
}
