//! Construction of a [`Fridge`].
//!
//! [`OpenOptions`] follows the shape of [`std::fs::OpenOptions`]: chain the
//! settings, then call [`open`](OpenOptions::open). Exactly one source must
//! end up selected: an explicit path, an explicit stream, or the path carried
//! by [`Defaults`].

use std::fs::File;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::codec::{DecodeOptions, EncodeOptions};
use crate::error::{FridgeError, Result};
use crate::fridge::{Fridge, Handle};
use crate::stream::{open_path, Stream};

/// Fallback configuration applied by [`OpenOptions::defaults`].
///
/// `path` is only used when neither [`OpenOptions::path`] nor
/// [`OpenOptions::stream`] is given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub path: Option<PathBuf>,
    pub decode: DecodeOptions,
    pub encode: EncodeOptions,
    pub sync: bool,
}

/// Builder for [`Fridge`].
pub struct OpenOptions<'a, S = File> {
    path: Option<PathBuf>,
    stream: Option<&'a mut S>,
    default_path: Option<PathBuf>,
    decode: DecodeOptions,
    encode: EncodeOptions,
    sync: bool,
}

impl OpenOptions<'static, File> {
    pub fn new() -> Self {
        Self {
            path: None,
            stream: None,
            default_path: None,
            decode: DecodeOptions::default(),
            encode: EncodeOptions::default(),
            sync: false,
        }
    }
}

impl Default for OpenOptions<'static, File> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, S: Stream> OpenOptions<'a, S> {
    /// Back the fridge with the file at `path`, created if missing. The
    /// fridge owns the file and closes it on [`Fridge::close`].
    pub fn path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Back the fridge with a caller-owned stream. It is decoded from its
    /// current position and never closed by the fridge.
    pub fn stream<'b, T: Stream>(self, stream: &'b mut T) -> OpenOptions<'b, T> {
        OpenOptions {
            path: self.path,
            stream: Some(stream),
            default_path: self.default_path,
            decode: self.decode,
            encode: self.encode,
            sync: self.sync,
        }
    }

    pub fn decode(mut self, decode: DecodeOptions) -> Self {
        self.decode = decode;
        self
    }

    pub fn encode(mut self, encode: EncodeOptions) -> Self {
        self.encode = encode;
        self
    }

    /// Call [`Stream::sync`] after every save instead of a plain flush.
    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Applies `defaults`. Settings chained afterwards override them.
    pub fn defaults(mut self, defaults: &Defaults) -> Self {
        self.default_path = defaults.path.clone();
        self.decode = defaults.decode;
        self.encode = defaults.encode;
        self.sync = defaults.sync;
        self
    }

    /// Acquires the stream and performs the initial load.
    ///
    /// # Errors
    ///
    /// - [`FridgeError::InvalidArgument`] if both a path and a stream were
    ///   given, or neither was and no default path is set.
    /// - [`FridgeError::Io`] if the file cannot be opened or created.
    /// - Any error from [`Fridge::load`].
    pub fn open(self) -> Result<Fridge<'a, S>> {
        let OpenOptions {
            path,
            stream,
            default_path,
            decode,
            encode,
            sync,
        } = self;

        let handle = match (path, stream, default_path) {
            (Some(_), Some(_), _) => {
                return Err(FridgeError::InvalidArgument(
                    "only a path or only a stream can be given",
                ))
            }
            (Some(path), None, _) | (None, None, Some(path)) => {
                Handle::Owned(open_path(&path)?)
            }
            (None, Some(stream), _) => Handle::Borrowed(stream),
            (None, None, None) => {
                return Err(FridgeError::InvalidArgument("no path or stream specified"))
            }
        };

        Fridge::with_handle(handle, decode, encode, sync)
    }

    /// Opens, loads and immediately closes. The returned fridge holds the
    /// full contents but refuses further [`load`](Fridge::load) and
    /// [`save`](Fridge::save) calls.
    ///
    /// Closing saves, so the stream is rewritten once in canonical form.
    pub fn open_read_only(self) -> Result<Fridge<'a, S>> {
        let mut fridge = self.open()?;
        fridge.close()?;
        Ok(fridge)
    }
}
