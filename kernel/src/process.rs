// SPDX-License-Identifier: MPL-2.0

//! Processes as far as files are concerned

use crate::{
    config::FdParams,
    fs::{file_table::FileTable, utils::FileSystem},
    prelude::*,
    vm::VmSpace,
};

pub type Pid = u32;

/// A process owns one file table and one address space, and sees one file system.
pub struct Process {
    pid: Pid,
    vm: VmSpace,
    file_table: RwLock<FileTable>,
    fs: Arc<dyn FileSystem>,
}

impl Process {
    /// Creates a process with an empty address space and an empty file table.
    pub fn new(pid: Pid, fs: Arc<dyn FileSystem>, params: &FdParams) -> Self {
        debug!("process {}: created with {} fd slots", pid, params.max_files());
        Self {
            pid,
            vm: VmSpace::new(),
            file_table: RwLock::new(FileTable::with_params(params)),
            fs,
        }
    }

    /// Creates a child process.
    ///
    /// The child gets a copy of the address space and a copy of the file table
    /// whose descriptors refer to the same open files as the parent's.
    pub fn fork(&self, child_pid: Pid) -> Self {
        let file_table = self.file_table.read().clone();
        debug!(
            "process {}: forked {} with {} open fds",
            self.pid,
            child_pid,
            file_table.len()
        );
        Self {
            pid: child_pid,
            vm: self.vm.clone(),
            file_table: RwLock::new(file_table),
            fs: self.fs.clone(),
        }
    }

    /// Closes every descriptor of the process.
    pub fn exit(&self) {
        let files = self.file_table.write().close_all();
        debug!("process {}: exit, closing {} fds", self.pid, files.len());
        for file in files {
            file.release();
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn vm(&self) -> &VmSpace {
        &self.vm
    }

    pub fn file_table(&self) -> &RwLock<FileTable> {
        &self.file_table
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }
}

impl Drop for Process {
    fn drop(&mut self) {
        for file in self.file_table.get_mut().close_all() {
            file.release();
        }
    }
}
