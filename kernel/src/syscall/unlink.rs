// SPDX-License-Identifier: MPL-2.0

use super::SyscallReturn;
use crate::prelude::*;

pub fn sys_unlink(path_addr: Vaddr, ctx: &Context) -> Result<SyscallReturn> {
    let path = ctx.user_space().read_path(path_addr)?;
    debug!("path = {:?}", path);

    ctx.process.fs().unlink(&path)?;
    Ok(SyscallReturn::Return(0))
}
