// SPDX-License-Identifier: MPL-2.0

use super::{constants::MAX_FILENAME_LEN, SyscallReturn};
use crate::{
    fs::{
        file_table::FileDesc,
        open_file::{FileRef, OpenFile},
        utils::{OpenArgs, Vnode},
    },
    prelude::*,
};

pub fn sys_open(path_addr: Vaddr, flags: u32, mode: u16, ctx: &Context) -> Result<SyscallReturn> {
    let path = ctx.user_space().read_cstring(path_addr, MAX_FILENAME_LEN)?;
    debug!("path = {:?}, flags = {:#o}, mode = {:#o}", path, flags, mode);

    let open_args = OpenArgs::from_flags_and_mode(flags, mode)?;
    let (fd, file) = do_open(path.to_str()?, &open_args, ctx)?;
    ctx.process.file_table().read().put(fd, file);
    Ok(SyscallReturn::Return(fd as _))
}

/// Opens `path` and installs the open file in the lowest free descriptor.
///
/// Returns the descriptor together with an in-use reference to the open file.
pub(super) fn do_open(
    path: &str,
    open_args: &OpenArgs,
    ctx: &Context,
) -> Result<(FileDesc, FileRef)> {
    open_in_free_fd(open_args, ctx, || ctx.process.fs().open(path, open_args))
}

/// Reserves the lowest free descriptor, then opens the vnode returned by
/// `open_vnode` there.
///
/// `open_vnode` is not called if the file table is full, so a file is never
/// created for a descriptor that cannot exist.
pub(super) fn open_in_free_fd<F>(
    open_args: &OpenArgs,
    ctx: &Context,
    open_vnode: F,
) -> Result<(FileDesc, FileRef)>
where
    F: FnOnce() -> Result<Arc<dyn Vnode>>,
{
    let fd = ctx.process.file_table().write().reserve()?;
    let vnode = match open_vnode() {
        Ok(vnode) => vnode,
        Err(err) => {
            ctx.process.file_table().write().unreserve(fd);
            return Err(err);
        }
    };

    let file = OpenFile::create(vnode, open_args.access_mode, open_args.status_flags);
    let in_use = file.dup();
    let installed = ctx.process.file_table().write().install(fd, file);
    match installed {
        Ok(()) => Ok((fd, in_use)),
        Err((err, file)) => {
            in_use.release();
            file.release();
            Err(err)
        }
    }
}
