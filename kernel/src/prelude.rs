// SPDX-License-Identifier: MPL-2.0

#![allow(unused)]

pub(crate) use alloc::{
    boxed::Box,
    collections::BTreeMap,
    ffi::CString,
    format,
    string::{String, ToString},
    sync::{Arc, Weak},
    vec,
    vec::Vec,
};
pub(crate) use core::{ffi::CStr, fmt::Debug};

pub(crate) use bitflags::bitflags;
pub(crate) use log::{debug, error, info, trace, warn};
pub(crate) use spin::{Mutex, MutexGuard, RwLock};

pub(crate) use crate::{
    context::Context,
    error::{Errno, Error},
    vm::Vaddr,
};
pub(crate) type Result<T> = core::result::Result<T, Error>;
pub(crate) use crate::{return_errno, return_errno_with_message};
