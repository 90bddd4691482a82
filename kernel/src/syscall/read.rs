// SPDX-License-Identifier: MPL-2.0

use super::SyscallReturn;
use crate::{
    fs::{file_table::FileDesc, open_file::OpenFile},
    prelude::*,
};

pub fn sys_read(
    fd: FileDesc,
    user_buf_addr: Vaddr,
    buf_len: usize,
    ctx: &Context,
) -> Result<SyscallReturn> {
    debug!(
        "fd = {}, user_buf_ptr = 0x{:x}, buf_len = 0x{:x}",
        fd, user_buf_addr, buf_len
    );

    let file = ctx.process.file_table().read().get(fd)?;
    let res = do_read(&file, user_buf_addr, buf_len, ctx);
    ctx.process.file_table().read().put(fd, file);

    let read_len = res?;
    Ok(SyscallReturn::Return(read_len as _))
}

fn do_read(file: &OpenFile, user_buf_addr: Vaddr, buf_len: usize, ctx: &Context) -> Result<usize> {
    if !file.access_mode().is_readable() {
        return_errno_with_message!(Errno::EACCES, "the file is not opened for reading");
    }
    if buf_len == 0 {
        return Ok(0);
    }

    let mut buf = Vec::new();
    buf.try_reserve_exact(buf_len)?;
    buf.resize(buf_len, 0);

    let read_len = file.read(&mut buf)?;
    ctx.user_space().write_bytes(user_buf_addr, &buf[..read_len])?;
    Ok(read_len)
}
