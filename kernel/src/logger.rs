// SPDX-License-Identifier: MPL-2.0

//! The logger of the file-descriptor subsystem.
//!
//! Records are formatted as `"{level:<5}: {message}"` and handed to a console sink
//! registered with [`init`]. Until a sink is registered, records are dropped.

use core::fmt;

use log::{LevelFilter, Metadata, Record};

use crate::{config::FdParams, prelude::*};

/// A console that receives formatted log lines.
pub type ConsoleSink = fn(fmt::Arguments);

struct FdLogger {
    sink: RwLock<Option<ConsoleSink>>,
}

static LOGGER: FdLogger = FdLogger {
    sink: RwLock::new(None),
};

impl log::Log for FdLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // Use a global lock to prevent interleaving of log messages.
        static RECORD_LOCK: Mutex<()> = Mutex::new(());
        let _lock = RECORD_LOCK.lock();

        if let Some(sink) = *self.sink.read() {
            sink(format_args!("{:<5}: {}\n", record.level(), record.args()));
        }
    }

    fn flush(&self) {}
}

/// Installs the logger with `sink` as its console and the level from `params`.
///
/// Calling this more than once only replaces the sink and the level.
pub fn init(sink: ConsoleSink, params: &FdParams) {
    *LOGGER.sink.write() = Some(sink);
    let _ = log::set_logger(&LOGGER);
    set_level(params.log_level());
}

/// Changes the maximum level at runtime.
pub fn set_level(level: LevelFilter) {
    log::set_max_level(level);
}
