//! # Fridge
//!
//! A persistent, JSON-encoded map. A [`Fridge`] loads a JSON object from a
//! backing stream when it is created, lets the caller mutate it like any
//! other map, and writes the whole object back on [`save`](Fridge::save) or
//! [`close`](Fridge::close).
//!
//! ## Lifecycle
//!
//! ```text
//!   open ──load──▶ Open ──close──▶ Closed
//!                  │  ▲              │
//!                  └──┘ load/save    └── close is a no-op
//! ```
//!
//! - **Open**: `load` and `save` may be called any number of times, in any
//!   order.
//! - **Closed**: terminal. `load` and `save` fail with
//!   [`FridgeError::Closed`]; the map is still readable and writable.
//!
//! A fridge opened from a path owns its file and closes it on `close`. A
//! fridge built from a caller's stream only borrows it and never closes it.
//! Dropping an open fridge closes it.
//!
//! ## Stream format
//!
//! A single UTF-8 JSON document whose root is an object. Blank content loads
//! as `{}`. Every save truncates the stream and rewrites it from the start.
//!
//! ## Example
//! ```rust
//! use fridge::Fridge;
//! use std::io::{Cursor, Seek};
//!
//! let mut buf = Cursor::new(Vec::new());
//! {
//!     let mut fridge = Fridge::from_stream(&mut buf).unwrap();
//!     fridge.insert("a", "a");
//! } // dropped: saved
//! assert_eq!(buf.get_ref().as_slice(), br#"{"a": "a"}"#);
//!
//! buf.rewind().unwrap();
//! let fridge = Fridge::from_stream(&mut buf).unwrap();
//! assert_eq!(fridge["a"], "a");
//! ```

mod codec;
mod error;
mod fridge;
mod options;
mod stream;

pub use codec::{DecodeOptions, EncodeOptions, Style};
pub use error::{FridgeError, Result};
pub use fridge::Fridge;
pub use options::{Defaults, OpenOptions};
pub use stream::Stream;

pub use serde_json::{Map, Value};
