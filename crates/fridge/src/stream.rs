//! Backing stream abstraction.
//!
//! A [`Stream`] is anything a [`Fridge`](crate::Fridge) can read its document
//! from and rewrite in place: `Read + Write + Seek` plus the ability to drop
//! its contents (`truncate`) and push them to durable storage (`sync`).

use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, Write};
use std::path::Path;

/// A seekable, truncatable text resource backing a fridge.
pub trait Stream: Read + Write + Seek {
    /// Drops all content, leaving a zero-length stream. The cursor position
    /// is unspecified afterwards; callers seek explicitly.
    fn truncate(&mut self) -> io::Result<()>;

    /// Pushes written content to durable storage. Defaults to `flush`.
    fn sync(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Stream for File {
    fn truncate(&mut self) -> io::Result<()> {
        self.set_len(0)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.flush()?;
        self.sync_all()
    }
}

impl Stream for Cursor<Vec<u8>> {
    fn truncate(&mut self) -> io::Result<()> {
        self.get_mut().clear();
        Ok(())
    }
}

impl Stream for Cursor<&mut Vec<u8>> {
    fn truncate(&mut self) -> io::Result<()> {
        self.get_mut().clear();
        Ok(())
    }
}

/// Opens `path` for read/write without truncating it. A missing file is
/// created empty; every other failure propagates.
pub fn open_path<P: AsRef<Path>>(path: P) -> io::Result<File> {
    let path = path.as_ref();
    match OpenOptions::new().read(true).write(true).open(path) {
        Ok(file) => {
            log::debug!("opened {}", path.display());
            Ok(file)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => create_or_open(path),
        Err(e) => Err(e),
    }
}

/// Creates `path` empty, or opens it untouched if another process created it
/// after the first open attempt.
fn create_or_open(path: &Path) -> io::Result<File> {
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => {
            log::debug!("created {}", path.display());
            Ok(file)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            log::debug!("{} appeared concurrently, opening it", path.display());
            OpenOptions::new().read(true).write(true).open(path)
        }
        Err(e) => Err(e),
    }
}
