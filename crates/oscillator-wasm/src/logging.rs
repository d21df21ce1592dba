//! `tracing` output routed to the browser console.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;
use web_sys::console;

/// Console function an event is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleMethod {
    /// `console.error`
    Error,
    /// `console.warn`
    Warn,
    /// `console.info`
    Info,
    /// `console.debug`
    Debug,
    /// `console.log`
    #[default]
    Log,
}

impl ConsoleMethod {
    /// The method matching an event level.
    pub fn for_level(level: Level) -> Self {
        if level == Level::ERROR {
            Self::Error
        } else if level == Level::WARN {
            Self::Warn
        } else if level == Level::INFO {
            Self::Info
        } else {
            Self::Debug
        }
    }

    fn write(self, line: &str) {
        let line = JsValue::from_str(line);
        match self {
            Self::Error => console::error_1(&line),
            Self::Warn => console::warn_1(&line),
            Self::Info => console::info_1(&line),
            Self::Debug => console::debug_1(&line),
            Self::Log => console::log_1(&line),
        }
    }
}

/// Buffers one formatted event and hands it to the console on flush.
#[derive(Debug, Default)]
pub struct ConsoleWriter {
    method: ConsoleMethod,
    buffer: Vec<u8>,
}

impl ConsoleWriter {
    /// A writer that flushes through `method`.
    pub fn new(method: ConsoleMethod) -> Self {
        Self {
            method,
            buffer: Vec::new(),
        }
    }

    /// Console function this writer uses.
    pub fn method(&self) -> ConsoleMethod {
        self.method
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            let line = String::from_utf8_lossy(&self.buffer);
            self.method.write(line.trim_end());
            self.buffer.clear();
        }
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}

/// [`MakeWriter`] producing a fresh [`ConsoleWriter`] per event, using the
/// console function that matches the event's level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::default()
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(ConsoleMethod::for_level(*meta.level()))
    }
}

/// Installs the console subscriber. Later calls are no-ops.
///
/// Timestamps are left out because `SystemTime` is unavailable on
/// `wasm32-unknown-unknown`.
pub fn init(max_level: Level) {
    let installed = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_max_level(max_level)
        .with_ansi(false)
        .without_time()
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(%max_level, "console logging installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_picks_console_method() {
        assert_eq!(ConsoleMethod::for_level(Level::ERROR), ConsoleMethod::Error);
        assert_eq!(ConsoleMethod::for_level(Level::WARN), ConsoleMethod::Warn);
        assert_eq!(ConsoleMethod::for_level(Level::INFO), ConsoleMethod::Info);
        assert_eq!(ConsoleMethod::for_level(Level::DEBUG), ConsoleMethod::Debug);
        assert_eq!(ConsoleMethod::for_level(Level::TRACE), ConsoleMethod::Debug);
    }

    #[test]
    fn test_plain_writer_uses_log() {
        assert_eq!(ConsoleMakeWriter.make_writer().method(), ConsoleMethod::Log);
        assert_eq!(
            ConsoleWriter::new(ConsoleMethod::Warn).method(),
            ConsoleMethod::Warn
        );
    }
}
