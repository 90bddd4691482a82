// SPDX-License-Identifier: MPL-2.0

//! The `meld` system call.
//!
//! `meld(path1, path2, path3)` creates `path3` and fills it by taking turns between
//! the two input files, four bytes at a time: first from `path1`, then from `path2`.
//! The output is capped at half the combined input size, and the melding stops
//! after the first step in which either input runs short. It returns the number
//! of bytes in the new file.
//!
//! The three files get descriptors in the caller's file table while `meld` runs,
//! and all of them are closed before it returns. If `meld` fails after creating
//! `path3`, the new file is removed again.

use super::{
    constants::{MAX_FILENAME_LEN, MELD_CHUNK_SIZE, MELD_FILE_MODE},
    open::{do_open, open_in_free_fd},
    SyscallReturn,
};
use crate::{
    fs::{
        file_table::FileDesc,
        open_file::{FileRef, OpenFile},
        utils::{AccessMode, CreationFlags, InodeMode, OpenArgs, StatusFlags},
    },
    prelude::*,
};

pub fn sys_meld(
    path1_addr: Vaddr,
    path2_addr: Vaddr,
    path3_addr: Vaddr,
    ctx: &Context,
) -> Result<SyscallReturn> {
    let user_space = ctx.user_space();
    let path1 = user_space.read_cstring(path1_addr, MAX_FILENAME_LEN)?;
    let path2 = user_space.read_cstring(path2_addr, MAX_FILENAME_LEN)?;
    let path3 = user_space.read_cstring(path3_addr, MAX_FILENAME_LEN)?;
    debug!("path1 = {:?}, path2 = {:?}, path3 = {:?}", path1, path2, path3);

    let written = do_meld(path1.to_str()?, path2.to_str()?, path3.to_str()?, ctx)?;
    Ok(SyscallReturn::Return(written as _))
}

/// Melds the files at `path1` and `path2` into a new file at `path3`.
pub fn do_meld(path1: &str, path2: &str, path3: &str, ctx: &Context) -> Result<usize> {
    let mut meld = MeldFiles::new(ctx);

    let input_args = OpenArgs::new(
        AccessMode::O_RDONLY,
        CreationFlags::empty(),
        StatusFlags::empty(),
        InodeMode::empty(),
    );
    let input1 = meld.open(path1, &input_args)?;
    let input2 = meld.open(path2, &input_args)?;
    let output = meld.create(path3)?;

    let written = interleave(&input1, &input2, &output)?;
    meld.commit();
    Ok(written)
}

/// Copies alternating chunks of `input1` and `input2` to `output`.
fn interleave(input1: &OpenFile, input2: &OpenFile, output: &OpenFile) -> Result<usize> {
    let size1 = input1.metadata()?.size;
    let size2 = input2.metadata()?.size;
    let budget = size1
        .checked_add(size2)
        .ok_or_else(|| Error::with_message(Errno::EFBIG, "the inputs are too large"))?
        / 2;
    trace!("meld: sizes = ({}, {}), budget = {}", size1, size2, budget);

    let mut scratch = Vec::new();
    scratch.try_reserve_exact(2 * MELD_CHUNK_SIZE)?;
    scratch.resize(2 * MELD_CHUNK_SIZE, 0);
    let (chunk1, chunk2) = scratch.split_at_mut(MELD_CHUNK_SIZE);

    let mut emitted = 0;
    while emitted < budget {
        let len1 = input1.read(chunk1)?;
        let len2 = input2.read(chunk2)?;

        for chunk in [&chunk1[..len1], &chunk2[..len2]] {
            let len = chunk.len().min(budget - emitted);
            if len == 0 {
                continue;
            }
            if output.write(&chunk[..len])? != len {
                return_errno_with_message!(Errno::EIO, "short write to the melded file");
            }
            emitted += len;
        }

        if len1 < MELD_CHUNK_SIZE || len2 < MELD_CHUNK_SIZE {
            break;
        }
    }

    Ok(output.offset())
}

/// The descriptors opened by one `meld` call.
///
/// Dropping it closes the descriptors, and removes the output file unless the
/// call was committed.
struct MeldFiles<'a, 'p> {
    ctx: &'a Context<'a>,
    opened: Vec<(FileDesc, FileRef)>,
    created: Option<&'p str>,
    committed: bool,
}

impl<'a, 'p> MeldFiles<'a, 'p> {
    fn new(ctx: &'a Context<'a>) -> Self {
        Self {
            ctx,
            opened: Vec::new(),
            created: None,
            committed: false,
        }
    }

    /// Opens an input file and returns an in-use reference to it.
    fn open(&mut self, path: &str, args: &OpenArgs) -> Result<FileRef> {
        self.opened.try_reserve(1)?;
        let (fd, file) = do_open(path, args, self.ctx)?;
        self.opened.push((fd, file.dup()));
        Ok(file)
    }

    /// Creates the output file, which must not exist.
    fn create(&mut self, path: &'p str) -> Result<FileRef> {
        self.opened.try_reserve(1)?;
        let args = OpenArgs::new(
            AccessMode::O_WRONLY,
            CreationFlags::O_CREAT | CreationFlags::O_EXCL,
            StatusFlags::empty(),
            InodeMode::from_bits_truncate(MELD_FILE_MODE),
        );
        let ctx = self.ctx;
        let (fd, file) = open_in_free_fd(&args, ctx, || {
            let vnode = ctx.process.fs().open(path, &args)?;
            self.created = Some(path);
            Ok(vnode)
        })?;
        self.opened.push((fd, file.dup()));
        Ok(file)
    }

    fn commit(&mut self) {
        self.committed = true;
    }
}

impl Drop for MeldFiles<'_, '_> {
    fn drop(&mut self) {
        for (fd, file) in self.opened.drain(..).rev() {
            let detached = {
                let mut file_table = self.ctx.process.file_table().write();
                let still_ours = file_table
                    .get(fd)
                    .map(|current| {
                        let same = current.is_same(&file);
                        file_table.put(fd, current);
                        same
                    })
                    .unwrap_or(false);
                if still_ours {
                    file_table.place_at(None, fd).ok().flatten()
                } else {
                    None
                }
            };

            match detached {
                Some(detached) => {
                    detached.release();
                }
                None => warn!("meld: fd {} was closed or replaced behind our back", fd),
            }
            file.release();
        }

        if self.committed {
            return;
        }
        if let Some(path) = self.created {
            if let Err(err) = self.ctx.process.fs().unlink(path) {
                warn!("meld: cannot remove the partial output {}: {}", path, err);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    use super::*;
    use crate::syscall::{
        test_utils::{create_file, file_content, Fault, FaultyFs, TestProcess},
        SYS_MELD,
    };

    /// Melds `/a` and `/b` into `/c` and returns the result of the call.
    fn meld(test: &TestProcess) -> isize {
        let path1 = test.put_str(0, "/a");
        let path2 = test.put_str(1, "/b");
        let path3 = test.put_str(2, "/c");
        test.syscall(SYS_MELD, &[path1, path2, path3])
    }

    /// What `meld` is expected to produce from `a` and `b`.
    fn expected_output(a: &[u8], b: &[u8]) -> Vec<u8> {
        let budget = (a.len() + b.len()) / 2;
        let mut output = Vec::new();
        for (chunk1, chunk2) in a
            .chunks(MELD_CHUNK_SIZE)
            .map(Some)
            .chain(core::iter::repeat(None))
            .zip(b.chunks(MELD_CHUNK_SIZE).map(Some).chain(core::iter::repeat(None)))
        {
            let chunk1 = chunk1.unwrap_or(&[]);
            let chunk2 = chunk2.unwrap_or(&[]);
            output.extend_from_slice(chunk1);
            output.extend_from_slice(chunk2);
            if output.len() >= budget
                || chunk1.len() < MELD_CHUNK_SIZE
                || chunk2.len() < MELD_CHUNK_SIZE
            {
                break;
            }
        }
        output.truncate(budget);
        output
    }

    fn assert_no_fds(test: &TestProcess) {
        assert!(test.process.file_table().read().is_empty());
    }

    #[test]
    fn meld_interleaves_chunks() {
        let test = TestProcess::new(8);
        create_file(&test.fs, "/a", b"AAAABBBBCCCC");
        create_file(&test.fs, "/b", b"ddddeeeeffff");
        assert!(!test.fs.contains("/c"));

        assert_eq!(meld(&test), 12);
        assert_eq!(file_content(&test.fs, "/c"), b"AAAAddddBBBB");
        assert_no_fds(&test);
        // The inputs are left alone.
        assert_eq!(file_content(&test.fs, "/a"), b"AAAABBBBCCCC");
        assert_eq!(file_content(&test.fs, "/b"), b"ddddeeeeffff");
        // Only the namespace and `lookup` refer to the output.
        assert_eq!(Arc::strong_count(&test.fs.lookup("/c").unwrap()), 2);
    }

    #[test]
    fn meld_stops_at_short_input() {
        let test = TestProcess::new(8);
        create_file(&test.fs, "/a", b"AAAABB");
        create_file(&test.fs, "/b", b"ddddeeeeffffgggg");

        // The budget is 11, so "eeee" is cut to a single byte after the short "BB".
        assert_eq!(meld(&test), 11);
        assert_eq!(file_content(&test.fs, "/c"), b"AAAAddddBBe");
        assert_no_fds(&test);
    }

    #[test]
    fn meld_with_empty_inputs() {
        let test = TestProcess::new(8);
        create_file(&test.fs, "/a", b"");
        create_file(&test.fs, "/b", b"");

        assert_eq!(meld(&test), 0);
        assert_eq!(file_content(&test.fs, "/c"), b"");
        assert_no_fds(&test);
    }

    #[test]
    fn meld_never_overwrites() {
        let test = TestProcess::new(8);
        create_file(&test.fs, "/a", b"AAAA");
        create_file(&test.fs, "/b", b"dddd");
        create_file(&test.fs, "/c", b"precious");

        assert_eq!(meld(&test), Errno::EEXIST.as_syscall_return());
        assert_eq!(file_content(&test.fs, "/c"), b"precious");
        assert_eq!(test.fs.len(), 3);
        assert_no_fds(&test);
    }

    #[test]
    fn meld_missing_input() {
        let test = TestProcess::new(8);
        create_file(&test.fs, "/a", b"AAAA");

        assert_eq!(meld(&test), Errno::ENOENT.as_syscall_return());
        assert!(!test.fs.contains("/c"));
        assert_no_fds(&test);
        assert_eq!(Arc::strong_count(&test.fs.lookup("/a").unwrap()), 2);
    }

    #[test]
    fn meld_without_free_fds() {
        // Room for the inputs, but not for the output.
        let test = TestProcess::new(2);
        create_file(&test.fs, "/a", b"AAAA");
        create_file(&test.fs, "/b", b"dddd");

        assert_eq!(meld(&test), Errno::EMFILE.as_syscall_return());
        assert!(!test.fs.contains("/c"));
        assert_no_fds(&test);
    }

    #[test]
    fn meld_keeps_other_fds() {
        let test = TestProcess::new(8);
        create_file(&test.fs, "/a", b"AAAABBBB");
        create_file(&test.fs, "/b", b"ddddeeee");
        let path = test.put_str(3, "/a");
        assert_eq!(test.syscall(crate::syscall::SYS_OPEN, &[path, 0]), 0);

        assert_eq!(meld(&test), 8);
        let file_table = test.process.file_table().read();
        assert_eq!(file_table.fds().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn meld_short_write_removes_output() {
        let fs = crate::fs::ramfs::RamFs::new();
        let test = TestProcess::with_fs(
            fs.clone(),
            FaultyFs::new(fs, "/c", Fault::ShortWrite),
            8,
        );
        create_file(&test.fs, "/a", b"AAAABBBB");
        create_file(&test.fs, "/b", b"ddddeeee");

        assert_eq!(meld(&test), Errno::EIO.as_syscall_return());
        assert!(!test.fs.contains("/c"));
        assert_no_fds(&test);
    }

    #[test]
    fn meld_read_error_removes_output() {
        let fs = crate::fs::ramfs::RamFs::new();
        let test = TestProcess::with_fs(
            fs.clone(),
            FaultyFs::new(fs, "/b", Fault::ReadError),
            8,
        );
        create_file(&test.fs, "/a", b"AAAABBBB");
        create_file(&test.fs, "/b", b"ddddeeee");

        assert_eq!(meld(&test), Errno::EIO.as_syscall_return());
        assert!(!test.fs.contains("/c"));
        assert_eq!(test.fs.len(), 2);
        assert_no_fds(&test);
    }

    #[test]
    fn meld_bad_path_address() {
        let test = TestProcess::new(8);
        create_file(&test.fs, "/a", b"AAAA");
        create_file(&test.fs, "/b", b"dddd");
        let path1 = test.put_str(0, "/a");
        let path2 = test.put_str(1, "/b");

        assert_eq!(
            test.syscall(SYS_MELD, &[path1, path2, 0]),
            Errno::EFAULT.as_syscall_return()
        );
        assert!(!test.fs.contains("/c"));
        assert_no_fds(&test);
    }

    #[test]
    fn meld_random_inputs() {
        let mut rng = SmallRng::seed_from_u64(0);
        for _ in 0..64 {
            let test = TestProcess::new(8);
            let a: Vec<u8> = (0..rng.random_range(0..40))
                .map(|_| rng.random_range(b'a'..=b'z'))
                .collect();
            let b: Vec<u8> = (0..rng.random_range(0..40))
                .map(|_| rng.random_range(b'A'..=b'Z'))
                .collect();
            create_file(&test.fs, "/a", &a);
            create_file(&test.fs, "/b", &b);

            let expected = expected_output(&a, &b);
            assert_eq!(meld(&test), expected.len() as isize);
            assert_eq!(file_content(&test.fs, "/c"), expected);
            assert!(expected.len() <= (a.len() + b.len()) / 2);
            assert_no_fds(&test);
        }
    }
}
