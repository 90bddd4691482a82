// SPDX-License-Identifier: MPL-2.0

use super::{OpenArgs, Vnode};
use crate::prelude::*;

/// A mounted file system that resolves paths to vnodes.
pub trait FileSystem: Send + Sync {
    /// Looks up `path`, creating or truncating the file as `args` requests.
    ///
    /// `O_CREAT` creates a missing file with `args.inode_mode`, `O_CREAT | O_EXCL`
    /// fails with `EEXIST` if the file exists, and `O_TRUNC` empties a writable
    /// existing file. A missing file without `O_CREAT` is `ENOENT`.
    fn open(&self, path: &str, args: &OpenArgs) -> Result<Arc<dyn Vnode>>;

    /// Removes `path` from the namespace.
    ///
    /// Open files that refer to it keep working until they are closed.
    fn unlink(&self, path: &str) -> Result<()>;
}
