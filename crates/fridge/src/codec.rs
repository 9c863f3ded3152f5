//! JSON encoding and decoding of the fridge document.
//!
//! The document is a single JSON object. Decoding is lenient by default:
//! blank or malformed content yields an empty map. Encoding always writes the
//! whole map; the output layout is controlled by [`EncodeOptions`].
//!
//! Keys are written in document order: the order they were loaded in, with
//! new keys appended. The default [`Style::Spaced`] layout puts a space after
//! `,` and `:`:
//!
//! ```text
//! {"a": "a", "list": [1, 2]}
//! ```

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter, Serializer};
use serde_json::{Map, Value};

use crate::error::{FridgeError, Result};

/// Options forwarded to every decode call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Reject non-blank content that is not valid JSON with
    /// [`FridgeError::Malformed`] instead of loading it as `{}`.
    pub strict: bool,
}

/// Output layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Style {
    /// Single line with `", "` and `": "` separators.
    #[default]
    Spaced,
    /// Single line, no whitespace at all.
    Compact,
    /// One member per line, indented by `indent` spaces per level.
    Pretty { indent: usize },
}

/// Options forwarded to every encode call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    pub style: Style,
    /// Escape every non-ASCII character as `\uXXXX` (surrogate pairs above
    /// the BMP). Off by default: non-ASCII text is written as raw UTF-8.
    pub ensure_ascii: bool,
    /// Terminate the document with `\n`.
    pub trailing_newline: bool,
}

impl EncodeOptions {
    pub fn compact() -> Self {
        Self {
            style: Style::Compact,
            ..Self::default()
        }
    }

    pub fn pretty(indent: usize) -> Self {
        Self {
            style: Style::Pretty { indent },
            trailing_newline: true,
            ..Self::default()
        }
    }
}

/// Decodes `bytes` into the root map.
///
/// # Errors
///
/// - [`FridgeError::InvalidFormat`] if the root is valid JSON but not an
///   object.
/// - [`FridgeError::Malformed`] for invalid JSON, only when `opts.strict`.
pub fn decode(bytes: &[u8], opts: &DecodeOptions) -> Result<Map<String, Value>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    let value: Value = match serde_json::from_slice(bytes) {
        Ok(v) => v,
        Err(e) if opts.strict => return Err(FridgeError::Malformed(e)),
        Err(e) => {
            log::warn!("malformed document loaded as empty: {}", e);
            return Ok(Map::new());
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(FridgeError::InvalidFormat {
            found: type_name(&other),
        }),
    }
}

/// Encodes `map` into a complete document.
pub fn encode(map: &Map<String, Value>, opts: &EncodeOptions) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match opts.style {
        Style::Spaced => write_with(&mut out, map, Spaced, opts.ensure_ascii)?,
        Style::Compact => write_with(&mut out, map, CompactFormatter, opts.ensure_ascii)?,
        Style::Pretty { indent } => {
            let indent = vec![b' '; indent];
            let pretty = PrettyFormatter::with_indent(&indent);
            write_with(&mut out, map, pretty, opts.ensure_ascii)?
        }
    }
    if opts.trailing_newline {
        out.push(b'\n');
    }
    Ok(out)
}

fn write_with<F: Formatter>(
    out: &mut Vec<u8>,
    map: &Map<String, Value>,
    formatter: F,
    ensure_ascii: bool,
) -> Result<()> {
    let formatter = Escaping {
        inner: formatter,
        ensure_ascii,
    };
    let mut ser = Serializer::with_formatter(out, formatter);
    map.serialize(&mut ser).map_err(io::Error::from)?;
    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `", "` between members, `": "` after keys.
struct Spaced;

impl Formatter for Spaced {
    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

/// Wraps a layout formatter and optionally escapes non-ASCII text.
///
/// Structural hooks are forwarded so stateful layouts (pretty printing) keep
/// their indentation bookkeeping.
struct Escaping<F> {
    inner: F,
    ensure_ascii: bool,
}

impl<F: Formatter> Formatter for Escaping<F> {
    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        if !self.ensure_ascii || fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                for unit in c.encode_utf16(&mut units).iter() {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}
