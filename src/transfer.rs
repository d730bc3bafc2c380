//! Single byte sink and source contracts.
//!
//! Everything that moves a value across the bus goes through these two
//! traits, one byte per call. Implementations decide what happens when they
//! are full or empty: a sink reports it by accepting 0 bytes, a source either
//! blocks, returns a sentinel from [`ByteSource::read_byte`], or reports `None`
//! from [`ByteSource::try_read_byte`].

use heapless::Vec;

/// Byte handed out by sources with nothing left to read, matching the `-1`
/// an Arduino `Wire.read()` returns once truncated to a byte.
pub const EMPTY_READ: u8 = 0xFF;

pub trait ByteSink {
    /// Offers one byte and returns how many were accepted, either 0 or 1.
    fn write_byte(&mut self, byte: u8) -> usize;
}

pub trait ByteSource {
    /// Returns the next byte. What comes back when nothing is available is
    /// up to the implementation.
    fn read_byte(&mut self) -> u8;

    /// Returns the next byte, or `None` if nothing is available.
    ///
    /// Sources that block until a byte arrives can rely on the default.
    fn try_read_byte(&mut self) -> Option<u8> {
        Some(self.read_byte())
    }
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    fn write_byte(&mut self, byte: u8) -> usize {
        (**self).write_byte(byte)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn read_byte(&mut self) -> u8 {
        (**self).read_byte()
    }

    fn try_read_byte(&mut self) -> Option<u8> {
        (**self).try_read_byte()
    }
}

// Rejects bytes once the vector is at capacity.
impl<const N: usize> ByteSink for Vec<u8, N> {
    fn write_byte(&mut self, byte: u8) -> usize {
        self.push(byte).map(|()| 1).unwrap_or(0)
    }
}

/// Reads bytes out of a borrowed slice, front to back.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Number of bytes not read yet.
    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }
}

impl<'a> From<&'a [u8]> for Reader<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl<'a> ByteSource for Reader<'a> {
    fn read_byte(&mut self) -> u8 {
        self.try_read_byte().unwrap_or(EMPTY_READ)
    }

    fn try_read_byte(&mut self) -> Option<u8> {
        let (first, rest) = self.bytes.split_first()?;
        self.bytes = rest;
        Some(*first)
    }
}
