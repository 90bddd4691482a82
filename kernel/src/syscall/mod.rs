// SPDX-License-Identifier: MPL-2.0

//! Dispatches system calls to their handlers.
//! Each sub module contains the handler of one system call.

pub use self::meld::do_meld;
use self::{
    close::sys_close, dup::sys_dup2, lseek::sys_lseek, meld::sys_meld, open::sys_open,
    read::sys_read, unlink::sys_unlink, write::sys_write,
};
use crate::prelude::*;

mod close;
mod constants;
mod dup;
mod lseek;
mod meld;
mod open;
mod read;
#[cfg(test)]
mod test_utils;
mod unlink;
mod write;

/// Calls a syscall handler with the first `N` raw arguments converted to the
/// handler's parameter types, followed by the context.
macro_rules! syscall_handler {
    (1, $fn_name: ident, $args: ident, $ctx: expr) => {
        $fn_name($args[0] as _, $ctx)
    };
    (2, $fn_name: ident, $args: ident, $ctx: expr) => {
        $fn_name($args[0] as _, $args[1] as _, $ctx)
    };
    (3, $fn_name: ident, $args: ident, $ctx: expr) => {
        $fn_name($args[0] as _, $args[1] as _, $args[2] as _, $ctx)
    };
}

macro_rules! impl_syscall_nums_and_dispatch_fn {
    // $args and $ctx are needed since Rust macro is hygienic
    ( $( $name: ident = $num: literal => $handler: ident ( args[ .. $cnt: tt ] ) );* $(;)? ) => {
        // First, define the syscall numbers
        $(
            pub const $name: u64 = $num;
        )*

        // Then, define the dispatcher function
        pub fn syscall_dispatch(
            syscall_number: u64,
            args: [u64; 6],
            ctx: &Context,
        ) -> Result<SyscallReturn> {
            match syscall_number {
                $(
                    $num => {
                        log_syscall_entry!(ctx, $name);
                        syscall_handler!($cnt, $handler, args, ctx)
                    }
                )*
                _ => {
                    warn!("Unimplemented syscall number: {}", syscall_number);
                    return_errno_with_message!(Errno::ENOSYS, "Syscall was unimplemented");
                }
            }
        }
    }
}

macro_rules! log_syscall_entry {
    ($ctx: ident, $syscall_name: tt) => {
        if log::log_enabled!(log::Level::Info) {
            let syscall_name_str = stringify!($syscall_name);
            info!(
                "[pid={}][id={}][{}]",
                $ctx.process.pid(),
                $syscall_name,
                syscall_name_str
            );
        }
    };
}

impl_syscall_nums_and_dispatch_fn! {
    SYS_READ = 0               => sys_read(args[..3]);
    SYS_WRITE = 1              => sys_write(args[..3]);
    SYS_OPEN = 2               => sys_open(args[..3]);
    SYS_CLOSE = 3              => sys_close(args[..1]);
    SYS_LSEEK = 8              => sys_lseek(args[..3]);
    SYS_DUP2 = 33              => sys_dup2(args[..2]);
    SYS_UNLINK = 87            => sys_unlink(args[..1]);
    SYS_MELD = 500             => sys_meld(args[..3]);
}

/// Syscall return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyscallReturn {
    /// return isize, this value will be used to set rax
    Return(isize),
}

/// Runs system call `syscall_number` on behalf of `ctx.process`.
///
/// Returns the value for the user's return register: the result on success, or the
/// negated error number on failure.
pub fn handle_syscall(ctx: &Context, syscall_number: u64, args: [u64; 6]) -> isize {
    match syscall_dispatch(syscall_number, args, ctx) {
        Ok(SyscallReturn::Return(return_value)) => return_value,
        Err(err) => {
            debug!("syscall return error: {:?}", err);
            err.error().as_syscall_return()
        }
    }
}
