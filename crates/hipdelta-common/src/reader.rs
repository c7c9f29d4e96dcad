//! Seekable big-endian reader.
//!
//! This module provides [`BinaryReader`], a cursor over any `Read + Seek`
//! source. HIP archives are walked with two kinds of movement: relative skips
//! over blocks whose content is not needed, and absolute jumps to positions
//! computed from earlier length fields. Both are explicit methods here so the
//! offset arithmetic stays in one place and can be tested against in-memory
//! buffers.

use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};
use zerocopy::FromBytes;

use crate::text;
use crate::{Error, Result};

/// A big-endian binary reader over a seekable stream.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use hipdelta_common::BinaryReader;
///
/// let data = [0x48, 0x49, 0x50, 0x41, 0x00, 0x00, 0x00, 0x14];
/// let mut reader = BinaryReader::new(Cursor::new(&data[..]));
///
/// assert_eq!(reader.read_u32().unwrap(), 0x48495041);
/// assert_eq!(reader.read_u32().unwrap(), 20);
/// ```
#[derive(Debug)]
pub struct BinaryReader<R> {
    inner: R,
}

impl<R: Read + Seek> BinaryReader<R> {
    /// Wrap a seekable source.
    #[inline]
    pub const fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Get the current absolute position in the stream.
    #[inline]
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Seek to an absolute position.
    #[inline]
    pub fn seek(&mut self, position: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(position))?;
        Ok(())
    }

    /// Advance the position by a number of bytes without reading them.
    pub fn advance(&mut self, count: u64) -> Result<()> {
        let delta = i64::try_from(count).map_err(|_| Error::ValueOutOfRange {
            what: "skip length",
            value: count,
        })?;
        self.inner.seek(SeekFrom::Current(delta))?;
        Ok(())
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.inner.read_u8()?)
    }

    /// Read a big-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.inner.read_u32::<BigEndian>()?)
    }

    /// Fill `buf` completely from the stream.
    #[inline]
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf)?;
        Ok(())
    }

    /// Read `count` bytes into a new buffer.
    ///
    /// `count` usually comes straight from the stream, so the buffer is
    /// reserved fallibly instead of aborting on an absurd length.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(count)
            .map_err(|_| Error::Allocation(count))?;
        bytes.resize(count, 0);
        self.inner.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// Read `count` bytes starting at absolute `position`.
    pub fn read_bytes_at(&mut self, position: u64, count: usize) -> Result<Vec<u8>> {
        self.seek(position)?;
        self.read_bytes(count)
    }

    /// Read a fixed-width name field. See [`text::read_fixed_name`].
    pub fn read_fixed_name(&mut self) -> Result<Vec<u8>> {
        Ok(text::read_fixed_name(&mut self.inner)?)
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate. Fields
    /// are expected to use zerocopy's big-endian wrapper types.
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let bytes = self.read_bytes(std::mem::size_of::<T>())?;
        T::read_from_bytes(&bytes).map_err(|_| Error::Layout(std::any::type_name::<T>()))
    }

    /// Expect specific magic bytes.
    pub fn expect_magic(&mut self, expected: &[u8]) -> Result<()> {
        let mut actual = vec![0u8; expected.len()];
        match self.inner.read_exact(&mut actual) {
            Ok(()) => {}
            // A file shorter than its magic is simply not an archive.
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(Error::InvalidMagic {
                    expected: expected.to_vec(),
                    actual: Vec::new(),
                })
            }
            Err(e) => return Err(e.into()),
        }
        if actual != expected {
            return Err(Error::InvalidMagic {
                expected: expected.to_vec(),
                actual,
            });
        }
        Ok(())
    }
}

/// Compare two equally sized regions of two streams.
///
/// Reads `len` bytes starting at `left_pos` in `left` and at `right_pos` in
/// `right`, chunk by chunk, and returns `true` when every byte matches.
/// Both readers are left at an unspecified position.
pub fn regions_equal<A, B>(
    left: &mut BinaryReader<A>,
    left_pos: u64,
    right: &mut BinaryReader<B>,
    right_pos: u64,
    len: u64,
) -> Result<bool>
where
    A: Read + Seek,
    B: Read + Seek,
{
    const CHUNK: usize = 64 * 1024;

    let mut lbuf = vec![0u8; CHUNK];
    let mut rbuf = vec![0u8; CHUNK];
    let mut done = 0u64;

    while done < len {
        let step = (len - done).min(CHUNK as u64) as usize;

        left.seek(left_pos + done)?;
        left.read_exact(&mut lbuf[..step])?;
        right.seek(right_pos + done)?;
        right.read_exact(&mut rbuf[..step])?;

        if lbuf[..step] != rbuf[..step] {
            return Ok(false);
        }
        done += step as u64;
    }

    Ok(true)
}
