// SPDX-License-Identifier: MPL-2.0

use super::{
    constants::{SEEK_CUR, SEEK_END, SEEK_SET},
    SyscallReturn,
};
use crate::{
    fs::{file_table::FileDesc, utils::SeekFrom},
    prelude::*,
};

pub fn sys_lseek(fd: FileDesc, offset: isize, whence: u32, ctx: &Context) -> Result<SyscallReturn> {
    debug!("fd = {}, offset = {}, whence = {}", fd, offset, whence);

    let seek_from = match whence {
        SEEK_SET => {
            if offset < 0 {
                return_errno!(Errno::EINVAL);
            }
            SeekFrom::Start(offset as usize)
        }
        SEEK_CUR => SeekFrom::Current(offset),
        SEEK_END => SeekFrom::End(offset),
        _ => return_errno!(Errno::EINVAL),
    };

    let file = ctx.process.file_table().read().get(fd)?;
    let res = file.seek(seek_from);
    ctx.process.file_table().read().put(fd, file);

    let offset = res?;
    Ok(SyscallReturn::Return(offset as _))
}
