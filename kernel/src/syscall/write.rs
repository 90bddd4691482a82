// SPDX-License-Identifier: MPL-2.0

use super::SyscallReturn;
use crate::{
    fs::{file_table::FileDesc, open_file::OpenFile},
    prelude::*,
};

pub fn sys_write(
    fd: FileDesc,
    user_buf_ptr: Vaddr,
    user_buf_len: usize,
    ctx: &Context,
) -> Result<SyscallReturn> {
    debug!(
        "fd = {}, user_buf_ptr = 0x{:x}, user_buf_len = 0x{:x}",
        fd, user_buf_ptr, user_buf_len
    );

    let file = ctx.process.file_table().read().get(fd)?;
    let res = do_write(&file, user_buf_ptr, user_buf_len, ctx);
    ctx.process.file_table().read().put(fd, file);

    let write_len = res?;
    Ok(SyscallReturn::Return(write_len as _))
}

fn do_write(
    file: &OpenFile,
    user_buf_ptr: Vaddr,
    user_buf_len: usize,
    ctx: &Context,
) -> Result<usize> {
    if !file.access_mode().is_writable() {
        return_errno_with_message!(Errno::EACCES, "the file is not opened for writing");
    }
    if user_buf_len == 0 {
        return Ok(0);
    }

    let mut buf = Vec::new();
    buf.try_reserve_exact(user_buf_len)?;
    buf.resize(user_buf_len, 0);
    ctx.user_space().read_bytes(user_buf_ptr, &mut buf)?;

    file.write(&buf)
}
