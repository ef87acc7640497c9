//! Human-readable debug traces, replayable with `advent replay`.
//!
//! A trace is plain text. Frames start with [`STEP`]; a frame may carry a
//! side panel before [`DATA`] and the frame body after it. Everything after
//! [`END`] is free-form.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const STEP: &str = "==========STEP==========\n";
pub const DATA: &str = "==========DATA==========\n";
pub const END: &str = "==========END==========\n";

pub const DEFAULT_FLUSH_AT: usize = 256 * 1024 * 1024;

/// Buffered trace writer. Inactive logs drop everything without formatting it.
#[derive(Debug)]
pub struct TraceLog {
    active: bool,
    buffer: String,
    sink: Option<PathBuf>,
    flush_at: usize,
}

impl TraceLog {
    pub fn disabled() -> Self {
        TraceLog {active: false, buffer: String::new(), sink: None, flush_at: usize::MAX}
    }

    /// Active log that keeps everything in memory; see [`TraceLog::contents`].
    pub fn in_memory() -> Self {
        TraceLog {active: true, ..TraceLog::disabled()}
    }

    /// Truncates `path` and appends to it whenever the buffer grows past `flush_at` bytes.
    pub fn to_file(path: impl AsRef<Path>, flush_at: usize) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        OpenOptions::new().create(true).write(true).truncate(true).open(&path)?;
        Ok(TraceLog {active: true, buffer: String::new(), sink: Some(path), flush_at})
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn write_str(&mut self, s: &str) -> io::Result<()> {
        if !self.active {return Ok(())}
        self.buffer.push_str(s);
        self.flush_if_full()
    }

    /// Lets `write!(trace, ...)` work; arguments are only formatted when active.
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        if !self.active {return Ok(())}
        fmt::Write::write_fmt(&mut self.buffer, args).map_err(io::Error::other)?;
        self.flush_if_full()
    }

    /// Renders `frame` only when the log is active.
    pub fn write_with(&mut self, frame: impl FnOnce() -> String) -> io::Result<()> {
        if !self.active {return Ok(())}
        let frame = frame();
        self.write_str(&frame)
    }

    /// Starts a new replay frame with the body produced by `frame`.
    pub fn step(&mut self, frame: impl FnOnce() -> String) -> io::Result<()> {
        self.write_with(|| STEP.to_owned() + &frame())
    }

    fn flush_if_full(&mut self) -> io::Result<()> {
        if self.buffer.len() > self.flush_at {self.flush()} else {Ok(())}
    }

    /// Appends the buffer to the backing file. In-memory logs keep their buffer.
    pub fn flush(&mut self) -> io::Result<()> {
        let Some(path) = &self.sink else {return Ok(())};
        if self.buffer.is_empty() {return Ok(())}
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(self.buffer.as_bytes())?;
        self.buffer.clear();
        Ok(())
    }

    pub fn close(mut self) -> io::Result<()> {
        self.flush()
    }

    /// Text written so far and not yet flushed.
    pub fn contents(&self) -> &str {
        &self.buffer
    }
}
