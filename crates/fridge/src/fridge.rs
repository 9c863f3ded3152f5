use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::mem;
use std::ops::{Index, IndexMut};
use std::path::Path;

use serde_json::map::{Entry, Iter, IterMut, Keys, Values};
use serde_json::{Map, Value};

use crate::codec::{self, DecodeOptions, EncodeOptions};
use crate::error::{FridgeError, Result};
use crate::options::OpenOptions;
use crate::stream::Stream;

/// Where the document lives.
///
/// An owned file was opened from a path and is closed (dropped) by
/// [`Fridge::close`]. A borrowed stream belongs to the caller and is only
/// ever written to.
pub(crate) enum Handle<'a, S> {
    Owned(File),
    Borrowed(&'a mut S),
    Released,
}

impl<S: Stream> Handle<'_, S> {
    fn get_mut(&mut self) -> Option<&mut dyn Stream> {
        match self {
            Handle::Owned(file) => Some(file),
            Handle::Borrowed(stream) => Some(&mut **stream),
            Handle::Released => None,
        }
    }
}

/// A JSON object kept in memory and persisted to a backing stream.
///
/// # Lifecycle
///
/// 1. Construction acquires the stream (opening or creating a file, or
///    borrowing a caller's stream) and performs the first [`load`].
/// 2. The caller reads and mutates the map through the usual mapping methods.
/// 3. [`save`] rewrites the whole stream with the current contents.
/// 4. [`close`] saves one last time and releases an owned file. It is
///    idempotent; afterwards [`load`] and [`save`] fail with
///    [`FridgeError::Closed`] while the map itself stays readable and
///    writable.
///
/// Dropping an open fridge closes it. Errors raised by that final save
/// cannot be returned and are only logged, so callers that care should close
/// explicitly or use [`scoped`].
///
/// [`load`]: Fridge::load
/// [`save`]: Fridge::save
/// [`close`]: Fridge::close
/// [`scoped`]: Fridge::scoped
pub struct Fridge<'a, S: Stream = File> {
    data: Map<String, Value>,
    handle: Handle<'a, S>,
    closed: bool,
    decode: DecodeOptions,
    encode: EncodeOptions,
    sync: bool,
}

impl Fridge<'static, File> {
    /// Opens (or creates) the document at `path` with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        OpenOptions::new().path(path.as_ref()).open()
    }

    /// Returns a builder for non-default construction.
    pub fn options() -> OpenOptions<'static, File> {
        OpenOptions::new()
    }
}

impl<'a, S: Stream> Fridge<'a, S> {
    /// Wraps a caller-owned stream with default options. The stream is
    /// decoded from its current position and is never closed by the fridge.
    pub fn from_stream(stream: &'a mut S) -> Result<Self> {
        OpenOptions::new().stream(stream).open()
    }

    pub(crate) fn with_handle(
        handle: Handle<'a, S>,
        decode: DecodeOptions,
        encode: EncodeOptions,
        sync: bool,
    ) -> Result<Self> {
        let mut fridge = Self {
            data: Map::new(),
            handle,
            closed: false,
            decode,
            encode,
            sync,
        };
        if let Err(e) = fridge.load() {
            // Nothing was loaded; Drop must not overwrite the stream.
            fridge.closed = true;
            return Err(e);
        }
        Ok(fridge)
    }

    /// Replaces the map with the document decoded from the stream's current
    /// position. Unsaved mutations are discarded.
    ///
    /// Blank content loads as an empty map, and so does malformed content
    /// unless [`DecodeOptions::strict`] is set. The stream is not rewound;
    /// use [`stream_mut`](Fridge::stream_mut) to reposition it first.
    ///
    /// # Errors
    ///
    /// - [`FridgeError::Closed`] after [`close`](Fridge::close).
    /// - [`FridgeError::InvalidFormat`] if the root value is not an object.
    /// - [`FridgeError::Malformed`] for invalid JSON in strict mode.
    /// - [`FridgeError::Io`] if reading fails.
    ///
    /// On error the map is left untouched.
    pub fn load(&mut self) -> Result<()> {
        self.ensure_open()?;
        let stream = self.handle.get_mut().ok_or(FridgeError::Closed)?;

        let mut buf = Vec::new();
        stream.read_to_end(&mut buf)?;
        let data = codec::decode(&buf, &self.decode)?;

        log::debug!("loaded {} keys ({} bytes)", data.len(), buf.len());
        self.data = data;
        Ok(())
    }

    /// Truncates the stream and writes the full map into it from the start.
    ///
    /// # Errors
    ///
    /// [`FridgeError::Closed`] after [`close`](Fridge::close), or
    /// [`FridgeError::Io`] if the stream cannot be rewritten.
    pub fn save(&mut self) -> Result<()> {
        self.ensure_open()?;
        let bytes = codec::encode(&self.data, &self.encode)?;
        let stream = self.handle.get_mut().ok_or(FridgeError::Closed)?;

        stream.truncate()?;
        stream.seek(SeekFrom::Start(0))?;
        stream.write_all(&bytes)?;
        if self.sync {
            stream.sync()?;
        } else {
            stream.flush()?;
        }

        log::debug!("saved {} keys ({} bytes)", self.data.len(), bytes.len());
        Ok(())
    }

    /// Saves and then releases an owned file. Does nothing if already closed.
    ///
    /// The fridge ends up closed even when the final save fails; that error
    /// is returned once and later calls are no-ops.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let saved = self.save();
        self.closed = true;
        if let Handle::Owned(_) = self.handle {
            self.handle = Handle::Released;
            log::debug!("closed owned file");
        }
        saved
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// `true` when the stream was opened from a path by this fridge.
    pub fn owns_stream(&self) -> bool {
        !matches!(self.handle, Handle::Borrowed(_))
    }

    /// The backing stream while open, e.g. to rewind before a [`load`].
    ///
    /// [`load`]: Fridge::load
    pub fn stream_mut(&mut self) -> Option<&mut dyn Stream> {
        if self.closed {
            return None;
        }
        self.handle.get_mut()
    }

    /// Runs `f` and then closes the fridge, whatever `f` returned.
    ///
    /// An error from `f` takes precedence over an error from the final save.
    pub fn scoped<T, E, F>(mut self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Self) -> std::result::Result<T, E>,
        E: From<FridgeError>,
    {
        let out = f(&mut self);
        let closed = self.close();
        let value = out?;
        closed?;
        Ok(value)
    }

    /// Closes the fridge and hands back the map.
    pub fn into_map(mut self) -> Result<Map<String, Value>> {
        self.close()?;
        Ok(mem::take(&mut self.data))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(FridgeError::Closed)
        } else {
            Ok(())
        }
    }

    // -------------------- mapping surface --------------------

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.data.get_mut(key)
    }

    /// Sets `key`, returning the previous value if there was one.
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<Value>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.data.insert(key.into(), value.into())
    }

    /// Removes `key`; the remaining keys keep their order.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn entry<K: Into<String>>(&mut self, key: K) -> Entry<'_> {
        self.data.entry(key)
    }

    pub fn iter(&self) -> Iter<'_> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_> {
        self.data.iter_mut()
    }

    pub fn keys(&self) -> Keys<'_> {
        self.data.keys()
    }

    pub fn values(&self) -> Values<'_> {
        self.data.values()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.data
    }
}

impl<S: Stream> Drop for Fridge<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("fridge dropped with unsaved changes: {}", e);
        }
    }
}

impl<S: Stream> fmt::Debug for Fridge<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fridge")
            .field("data", &self.data)
            .field("closed", &self.closed)
            .field("owns_stream", &self.owns_stream())
            .finish()
    }
}

/// Panics if `key` is absent, like indexing a [`Map`].
impl<S: Stream> Index<&str> for Fridge<'_, S> {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        &self.data[key]
    }
}

impl<S: Stream> IndexMut<&str> for Fridge<'_, S> {
    fn index_mut(&mut self, key: &str) -> &mut Value {
        &mut self.data[key]
    }
}

impl<'b, S: Stream> IntoIterator for &'b Fridge<'_, S> {
    type Item = (&'b String, &'b Value);
    type IntoIter = Iter<'b>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<'b, S: Stream> IntoIterator for &'b mut Fridge<'_, S> {
    type Item = (&'b String, &'b mut Value);
    type IntoIter = IterMut<'b>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter_mut()
    }
}

impl<S: Stream> Extend<(String, Value)> for Fridge<'_, S> {
    fn extend<T: IntoIterator<Item = (String, Value)>>(&mut self, iter: T) {
        self.data.extend(iter);
    }
}

impl<S: Stream> PartialEq<Map<String, Value>> for Fridge<'_, S> {
    fn eq(&self, other: &Map<String, Value>) -> bool {
        self.data == *other
    }
}
