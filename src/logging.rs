//! Interrupt-safe logging.
//!
//! The edge and tick handlers run with tens of microseconds of budget;
//! blocking log sinks are off-limits there. Messages go into a fixed
//! lock-free ring instead and are drained outside interrupt context:
//!
//! ```text
//! interrupt handlers ──▶ LogStream ──▶ drain loop (application)
//! never blocks            ring          println / UART, blocking ok
//! ```
//!
//! `push` never blocks and drops the message when the ring is full (the
//! drop count is kept). Producers are the interrupt handlers, which do not
//! nest on this platform, so writes are serialized by construction; the
//! single drainer runs in application context.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum message length in bytes.
pub const MAX_MSG_LEN: usize = 64;

/// Default ring size (number of entries). Must be a power of 2.
pub const LOG_BUFFER_SIZE: usize = 64;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Timestamp in microseconds (producer-supplied).
    pub timestamp_us: i64,
    pub level: LogLevel,
    /// Message length in `msg`.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message bytes as a str (lossy only if a producer pushed non-UTF8).
    pub fn message(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<non-utf8>")
    }
}

/// Lock-free SPSC log ring.
///
/// # Safety
///
/// Uses `UnsafeCell` internally but is safe under the crate's execution
/// model: producers run only in interrupt context (handlers do not nest,
/// so at most one `push` is in flight), and exactly one drainer runs in
/// application context. Index handoff uses acquire/release ordering so the
/// drainer observes entry bytes before the index that publishes them.
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
}

// SAFETY: single producer context, single consumer, atomic index handoff.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "log ring size must be a power of 2");

        Self {
            entries: UnsafeCell::new([LogEntry::EMPTY; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Push a log entry. Never blocks; returns `false` if the ring was
    /// full and the message dropped.
    #[inline]
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N as u32 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let idx = (write as usize) & Self::MASK;
        let len = msg.len().min(MAX_MSG_LEN);

        // SAFETY: producer side is serialized (non-nesting interrupts) and
        // the slot at `idx` is outside the drainer's published range.
        unsafe {
            let entry = &mut (*self.entries.get())[idx];
            entry.timestamp_us = timestamp_us;
            entry.level = level;
            entry.len = len as u8;
            entry.msg[..len].copy_from_slice(&msg[..len]);
        }

        self.write_idx.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Drain the next entry, or `None` when the ring is empty.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) & Self::MASK;

        // SAFETY: single drainer; the entry at `idx` was published by the
        // release store of `write_idx`.
        let entry = unsafe { (*self.entries.get())[idx] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Number of entries waiting to be drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    /// Messages dropped because the ring was full.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format into a stack buffer; returns the number of bytes written.
/// Output is truncated at the buffer length.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    use core::fmt::Write;

    struct Cursor<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl Write for Cursor<'_> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let bytes = s.as_bytes();
            let take = bytes.len().min(self.buf.len() - self.pos);
            self.buf[self.pos..self.pos + take].copy_from_slice(&bytes[..take]);
            self.pos += take;
            Ok(())
        }
    }

    let mut cursor = Cursor { buf, pos: 0 };
    let _ = core::fmt::write(&mut cursor, args);
    cursor.pos
}

/// Interrupt-safe log macro. Formats into a stack buffer and pushes to the
/// given [`LogStream`]; never blocks.
#[macro_export]
macro_rules! isr_log {
    ($stream:expr, $level:expr, $timestamp:expr, $($arg:tt)*) => {{
        let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
        let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
        $stream.push($timestamp, $level, &buf[..len]);
    }};
}

#[macro_export]
macro_rules! isr_error {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::isr_log!($stream, $crate::logging::LogLevel::Error, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! isr_warn {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::isr_log!($stream, $crate::logging::LogLevel::Warn, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! isr_info {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::isr_log!($stream, $crate::logging::LogLevel::Info, $timestamp, $($arg)*)
    };
}

#[macro_export]
macro_rules! isr_debug {
    ($stream:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::isr_log!($stream, $crate::logging::LogLevel::Debug, $timestamp, $($arg)*)
    };
}
