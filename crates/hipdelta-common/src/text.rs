//! Name and string field codecs.
//!
//! Names are stored in a fixed 32-byte field on read, and re-emitted in a
//! variable-length form: the text, a terminator, and one more terminator if
//! needed to make the total length even.

use std::io::{self, Read};

use byteorder::ReadBytesExt;

/// Maximum width of a name field, terminator included.
pub const NAME_LENGTH: usize = 32;

/// Read a name from a fixed-width field.
///
/// At most [`NAME_LENGTH`] bytes are consumed. A null at the very first byte
/// is skipped and reading continues; any later null ends the name. The bytes
/// after the terminator inside the field are left unread.
pub fn read_fixed_name<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut name = Vec::with_capacity(NAME_LENGTH);

    for index in 0..NAME_LENGTH {
        match reader.read_u8()? {
            0 if index > 0 => break,
            0 => {}
            byte => name.push(byte),
        }
    }

    Ok(name)
}

/// Encode text in the even-padded, null-terminated convention.
///
/// Only the bytes before the first null in `text` are kept.
///
/// ```
/// use hipdelta_common::text::encode_padded;
///
/// assert_eq!(encode_padded(b"abc"), b"abc\0");
/// assert_eq!(encode_padded(b"ab"), b"ab\0\0");
/// assert_eq!(encode_padded(b""), b"\0\0");
/// ```
pub fn encode_padded(text: &[u8]) -> Vec<u8> {
    let end = memchr::memchr(0, text).unwrap_or(text.len());

    let mut out = Vec::with_capacity(end + 2);
    out.extend_from_slice(&text[..end]);
    out.push(0);
    if out.len() % 2 != 0 {
        out.push(0);
    }
    out
}

/// Encode a name field, truncating it so the terminator still fits in
/// [`NAME_LENGTH`] bytes.
pub fn encode_name(name: &[u8]) -> Vec<u8> {
    encode_padded(&name[..name.len().min(NAME_LENGTH - 1)])
}
