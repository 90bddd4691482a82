// SPDX-License-Identifier: MPL-2.0

use core::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;

use super::ROOT_INO;
use crate::{
    fs::utils::{
        AccessMode, CreationFlags, FileSystem, InodeMode, Metadata, OpenArgs, Vnode, NAME_MAX,
    },
    prelude::*,
};

/// A volatile file system whose data and metadata exists only in memory.
///
/// The namespace is a single directory. A path names a file directly below the
/// root, with or without a leading `/`.
pub struct RamFs {
    /// Files by name
    entries: RwLock<HashMap<String, Arc<RamInode>>>,
    /// An inode allocator
    inode_allocator: AtomicU64,
}

impl RamFs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: RwLock::new(HashMap::new()),
            inode_allocator: AtomicU64::new(ROOT_INO + 1),
        })
    }

    fn alloc_id(&self) -> u64 {
        self.inode_allocator.fetch_add(1, Ordering::SeqCst)
    }

    /// Returns the inode that `path` names, if any.
    pub fn lookup(&self, path: &str) -> Option<Arc<RamInode>> {
        let name = file_name(path).ok()?;
        self.entries.read().get(name).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Returns the number of files in the namespace.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FileSystem for RamFs {
    fn open(&self, path: &str, args: &OpenArgs) -> Result<Arc<dyn Vnode>> {
        let name = file_name(path)?;
        let creation_flags = &args.creation_flags;

        let mut entries = self.entries.write();
        if let Some(inode) = entries.get(name) {
            if creation_flags.contains(CreationFlags::O_CREAT | CreationFlags::O_EXCL) {
                return_errno_with_message!(Errno::EEXIST, "file exists");
            }
            if creation_flags.contains(CreationFlags::O_TRUNC)
                && args.access_mode != AccessMode::O_RDONLY
            {
                inode.resize(0);
            }
            return Ok(inode.clone());
        }

        if !creation_flags.contains(CreationFlags::O_CREAT) {
            return_errno_with_message!(Errno::ENOENT, "file does not exist");
        }
        let inode = Arc::new(RamInode::new(self.alloc_id(), args.inode_mode));
        entries.insert(name.to_string(), inode.clone());
        debug!("ramfs: create {} as inode {}", name, inode.ino);
        Ok(inode)
    }

    fn unlink(&self, path: &str) -> Result<()> {
        let name = file_name(path)?;
        match self.entries.write().remove(name) {
            Some(inode) => {
                debug!("ramfs: unlink {} (inode {})", name, inode.ino);
                Ok(())
            }
            None => return_errno_with_message!(Errno::ENOENT, "file does not exist"),
        }
    }
}

/// Resolves `path` to a name in the root directory.
fn file_name(path: &str) -> Result<&str> {
    let name = path.strip_prefix('/').unwrap_or(path);
    if name.is_empty() {
        return_errno_with_message!(Errno::ENOENT, "the path is empty");
    }
    if name.contains('/') {
        return_errno_with_message!(Errno::ENOTDIR, "ramfs has no subdirectories");
    }
    if name.len() > NAME_MAX {
        return_errno_with_message!(Errno::ENAMETOOLONG, "the file name is too long");
    }
    Ok(name)
}

/// A regular file of [`RamFs`].
pub struct RamInode {
    data: RwLock<Vec<u8>>,
    ino: u64,
    mode: InodeMode,
}

impl RamInode {
    fn new(ino: u64, mode: InodeMode) -> Self {
        Self {
            data: RwLock::new(Vec::new()),
            ino,
            mode,
        }
    }

    pub fn ino(&self) -> u64 {
        self.ino
    }

    /// Returns a copy of the whole content.
    pub fn content(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    fn resize(&self, new_size: usize) {
        self.data.write().truncate(new_size);
    }
}

impl Vnode for RamInode {
    fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<usize> {
        let data = self.data.read();
        let start = data.len().min(offset);
        let end = data.len().min(offset.saturating_add(buf.len()));
        let read_len = end - start;
        buf[..read_len].copy_from_slice(&data[start..end]);
        Ok(read_len)
    }

    fn write_at(&self, offset: usize, buf: &[u8]) -> Result<usize> {
        let new_size = offset
            .checked_add(buf.len())
            .filter(|size| *size <= isize::MAX as usize)
            .ok_or_else(|| Error::with_message(Errno::EFBIG, "the file would be too large"))?;

        let mut data = self.data.write();
        if new_size > data.len() {
            let additional = new_size - data.len();
            data.try_reserve(additional)?;
            // A write past the end of file leaves a hole of zeros.
            data.resize(new_size, 0);
        }
        data[offset..new_size].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn metadata(&self) -> Result<Metadata> {
        Ok(Metadata {
            ino: self.ino,
            size: self.data.read().len(),
            mode: self.mode,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fs::utils::StatusFlags;

    fn args(access_mode: AccessMode, creation_flags: CreationFlags) -> OpenArgs {
        OpenArgs::new(
            access_mode,
            creation_flags,
            StatusFlags::empty(),
            InodeMode::from_bits_truncate(0o644),
        )
    }

    #[test]
    fn create_and_reopen() {
        let fs = RamFs::new();
        let err = fs
            .open("/a", &args(AccessMode::O_RDONLY, CreationFlags::empty()))
            .unwrap_err();
        assert_eq!(err.error(), Errno::ENOENT);

        let created = fs
            .open("/a", &args(AccessMode::O_RDWR, CreationFlags::O_CREAT))
            .unwrap();
        created.write_at(0, b"hello").unwrap();

        let reopened = fs
            .open("a", &args(AccessMode::O_RDONLY, CreationFlags::empty()))
            .unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(reopened.read_at(0, &mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], b"hello");
        assert_eq!(reopened.metadata().unwrap().mode.bits(), 0o644);
    }

    #[test]
    fn exclusive_create_and_truncate() {
        let fs = RamFs::new();
        let file = fs
            .open("/a", &args(AccessMode::O_WRONLY, CreationFlags::O_CREAT))
            .unwrap();
        file.write_at(0, b"data").unwrap();

        let err = fs
            .open(
                "/a",
                &args(
                    AccessMode::O_WRONLY,
                    CreationFlags::O_CREAT | CreationFlags::O_EXCL,
                ),
            )
            .unwrap_err();
        assert_eq!(err.error(), Errno::EEXIST);
        assert_eq!(file.size().unwrap(), 4);

        // Truncation needs write access.
        fs.open("/a", &args(AccessMode::O_RDONLY, CreationFlags::O_TRUNC))
            .unwrap();
        assert_eq!(file.size().unwrap(), 4);
        fs.open("/a", &args(AccessMode::O_RDWR, CreationFlags::O_TRUNC))
            .unwrap();
        assert_eq!(file.size().unwrap(), 0);
    }

    #[test]
    fn write_past_end_leaves_hole() {
        let fs = RamFs::new();
        let file = fs
            .open("/a", &args(AccessMode::O_RDWR, CreationFlags::O_CREAT))
            .unwrap();
        file.write_at(3, b"xy").unwrap();

        let mut buf = [0xffu8; 8];
        assert_eq!(file.read_at(0, &mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], b"\0\0\0xy");
        assert_eq!(file.read_at(5, &mut buf).unwrap(), 0);
        assert_eq!(file.read_at(100, &mut buf).unwrap(), 0);
    }

    #[test]
    fn unlink_keeps_open_inode() {
        let fs = RamFs::new();
        let file = fs
            .open("/a", &args(AccessMode::O_RDWR, CreationFlags::O_CREAT))
            .unwrap();
        fs.unlink("/a").unwrap();
        assert!(!fs.contains("/a"));
        assert_eq!(fs.unlink("/a").unwrap_err().error(), Errno::ENOENT);

        assert_eq!(file.write_at(0, b"still here").unwrap(), 10);
        assert_eq!(file.size().unwrap(), 10);
    }

    #[test]
    fn bad_paths() {
        let fs = RamFs::new();
        let create = args(AccessMode::O_RDWR, CreationFlags::O_CREAT);
        assert_eq!(fs.open("/", &create).unwrap_err().error(), Errno::ENOENT);
        assert_eq!(fs.open("/d/f", &create).unwrap_err().error(), Errno::ENOTDIR);
        let long = "x".repeat(NAME_MAX + 1);
        assert_eq!(
            fs.open(&long, &create).unwrap_err().error(),
            Errno::ENAMETOOLONG
        );
        assert!(fs.is_empty());
    }
}
