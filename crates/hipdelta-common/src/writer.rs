//! Seekable big-endian writer with backpatchable fields.
//!
//! Archive sections carry their own length up front, but that length is only
//! known once the section body has been written. [`BinaryWriter::reserve_u32`]
//! writes a zero placeholder and hands back a [`Deferred`] handle, which is
//! later passed to [`BinaryWriter::resolve`] together with the real value.

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, WriteBytesExt};
use zerocopy::{Immutable, IntoBytes};

use crate::{Error, Result};

/// A reserved 32-bit field waiting for its final value.
///
/// Dropping a `Deferred` without resolving it leaves the zero placeholder in
/// the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a reserved field stays zero until it is resolved"]
pub struct Deferred {
    position: u64,
}

impl Deferred {
    /// Absolute stream position of the reserved field.
    #[inline]
    pub const fn position(&self) -> u64 {
        self.position
    }
}

/// A big-endian binary writer over a seekable sink.
#[derive(Debug)]
pub struct BinaryWriter<W> {
    inner: W,
}

impl<W: Write + Seek> BinaryWriter<W> {
    /// Wrap a seekable sink.
    #[inline]
    pub const fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Unwrap the writer, returning the underlying sink.
    #[inline]
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Get the current absolute position in the stream.
    #[inline]
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Get the current position as a 32-bit on-disk offset.
    pub fn position_u32(&mut self) -> Result<u32> {
        let position = self.position()?;
        u32::try_from(position).map_err(|_| Error::ValueOutOfRange {
            what: "file offset",
            value: position,
        })
    }

    /// Write a big-endian u32.
    #[inline]
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.inner.write_u32::<BigEndian>(value)?;
        Ok(())
    }

    /// Write raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        Ok(())
    }

    /// Write `count` copies of `byte`.
    pub fn write_fill(&mut self, byte: u8, count: usize) -> Result<()> {
        io::copy(&mut io::repeat(byte).take(count as u64), &mut self.inner)?;
        Ok(())
    }

    /// Write a struct using zerocopy.
    #[inline]
    pub fn write_struct<T: IntoBytes + Immutable>(&mut self, value: &T) -> Result<()> {
        self.write_bytes(value.as_bytes())
    }

    /// Reserve a 32-bit field, writing a zero placeholder.
    pub fn reserve_u32(&mut self) -> Result<Deferred> {
        let position = self.position()?;
        self.write_u32(0)?;
        Ok(Deferred { position })
    }

    /// Write the final value of a reserved field.
    ///
    /// The stream position is restored afterwards, so writing continues
    /// where it left off.
    pub fn resolve(&mut self, field: Deferred, value: u32) -> Result<()> {
        let resume = self.position()?;
        self.inner.seek(SeekFrom::Start(field.position))?;
        self.write_u32(value)?;
        self.inner.seek(SeekFrom::Start(resume))?;
        Ok(())
    }

    /// Flush the underlying sink.
    #[inline]
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
