// SPDX-License-Identifier: MPL-2.0

//! Helpers for system call tests.

use crate::{
    config::FdParams,
    fs::{
        ramfs::RamFs,
        utils::{
            AccessMode, CreationFlags, FileSystem, InodeMode, Metadata, OpenArgs, StatusFlags,
            Vnode,
        },
    },
    prelude::*,
    process::Process,
    syscall::handle_syscall,
    vm::PAGE_SIZE,
};

/// Where the user memory of a test process starts.
pub const USER_BASE: Vaddr = 0x10_0000;
/// The pages mapped at [`USER_BASE`].
pub const USER_PAGES: usize = 16;

const PATH_SLOT_SIZE: usize = 256;
/// User buffers live in the upper half of the mapping, paths in the lower one.
const BUF_BASE: Vaddr = USER_BASE + USER_PAGES / 2 * PAGE_SIZE;

/// Returns the address of the `idx`-th path slot.
pub fn path_at(idx: usize) -> u64 {
    (USER_BASE + idx * PATH_SLOT_SIZE) as u64
}

/// Returns the address of a user buffer `offset` bytes into the buffer area.
pub fn buf_at(offset: usize) -> u64 {
    (BUF_BASE + offset) as u64
}

pub struct TestProcess {
    pub fs: Arc<RamFs>,
    pub process: Process,
}

impl TestProcess {
    pub fn new(max_files: usize) -> Self {
        let fs = RamFs::new();
        Self::with_fs(fs.clone(), fs, max_files)
    }

    /// Creates a process that sees `fs_view`, which is backed by `fs`.
    pub fn with_fs(fs: Arc<RamFs>, fs_view: Arc<dyn FileSystem>, max_files: usize) -> Self {
        let params = FdParams::default().with_max_files(max_files).unwrap();
        let process = Process::new(1, fs_view, &params);
        process.vm().map(USER_BASE, USER_PAGES * PAGE_SIZE).unwrap();
        Self { fs, process }
    }

    /// Writes `s` with a nul terminator to the `idx`-th path slot.
    pub fn put_str(&self, idx: usize, s: &str) -> u64 {
        let addr = path_at(idx);
        let mut bytes = s.as_bytes().to_vec();
        bytes.push(0);
        self.process.vm().write(addr as Vaddr, &bytes).unwrap();
        addr
    }

    pub fn put_bytes(&self, offset: usize, bytes: &[u8]) -> u64 {
        let addr = buf_at(offset);
        self.process.vm().write(addr as Vaddr, bytes).unwrap();
        addr
    }

    pub fn get_bytes(&self, offset: usize, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        self.process
            .vm()
            .read(buf_at(offset) as Vaddr, &mut bytes)
            .unwrap();
        bytes
    }

    /// Issues a system call with the given leading arguments; the rest are zero.
    pub fn syscall(&self, num: u64, args: &[u64]) -> isize {
        let mut full_args = [0u64; 6];
        full_args[..args.len()].copy_from_slice(args);
        handle_syscall(&Context::new(&self.process), num, full_args)
    }
}

/// Creates `path` in `fs` with `content`.
pub fn create_file(fs: &RamFs, path: &str, content: &[u8]) {
    let args = OpenArgs::new(
        AccessMode::O_WRONLY,
        CreationFlags::O_CREAT | CreationFlags::O_TRUNC,
        StatusFlags::empty(),
        InodeMode::from_bits_truncate(0o644),
    );
    let vnode = fs.open(path, &args).unwrap();
    assert_eq!(vnode.write_at(0, content).unwrap(), content.len());
}

/// Returns the content of `path` in `fs`.
pub fn file_content(fs: &RamFs, path: &str) -> Vec<u8> {
    fs.lookup(path).unwrap().content()
}

/// How a [`FaultyFs`] vnode misbehaves.
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    /// Every read fails with `EIO`.
    ReadError,
    /// Every write stores at most one byte.
    ShortWrite,
}

/// A file system that injects I/O faults into the vnodes of one path.
pub struct FaultyFs {
    inner: Arc<RamFs>,
    path: &'static str,
    fault: Fault,
}

impl FaultyFs {
    pub fn new(inner: Arc<RamFs>, path: &'static str, fault: Fault) -> Arc<Self> {
        Arc::new(Self { inner, path, fault })
    }
}

impl FileSystem for FaultyFs {
    fn open(&self, path: &str, args: &OpenArgs) -> Result<Arc<dyn Vnode>> {
        let vnode = self.inner.open(path, args)?;
        if path != self.path {
            return Ok(vnode);
        }
        Ok(Arc::new(FaultyVnode {
            inner: vnode,
            fault: self.fault,
        }))
    }

    fn unlink(&self, path: &str) -> Result<()> {
        self.inner.unlink(path)
    }
}

struct FaultyVnode {
    inner: Arc<dyn Vnode>,
    fault: Fault,
}

impl Vnode for FaultyVnode {
    fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<usize> {
        match self.fault {
            Fault::ReadError => return_errno_with_message!(Errno::EIO, "injected read error"),
            Fault::ShortWrite => self.inner.read_at(offset, buf),
        }
    }

    fn write_at(&self, offset: usize, buf: &[u8]) -> Result<usize> {
        match self.fault {
            Fault::ReadError => self.inner.write_at(offset, buf),
            Fault::ShortWrite => {
                let len = buf.len().min(1);
                self.inner.write_at(offset, &buf[..len])
            }
        }
    }

    fn metadata(&self) -> Result<Metadata> {
        self.inner.metadata()
    }
}
