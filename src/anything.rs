//! Moving whole values through a byte sink or source.
//!
//! A value travels as its in-memory bytes, in memory order, one byte per
//! sink or source call. Which types qualify is decided by `zerocopy`: a value
//! can be written when it is [`IntoBytes`] + [`Immutable`] (no padding, no
//! interior mutability) and read back when it is also [`FromBytes`] (every
//! bit pattern is valid). Nothing is converted on the way, so the layout is
//! that of the compiling target. Both ends must agree on endianness and
//! `repr` for the bytes to mean the same value.
//!
//! [`write_anything`] and [`read_anything`] report progress only through the
//! returned count. [`try_write_anything`] and [`try_read_anything`] turn an
//! incomplete transfer into an [`Error`].

use crate::error::Error;
use crate::transfer::{ByteSink, ByteSource};
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes};

/// Offers every byte of `value` to `sink` and returns how many it accepted.
///
/// The sink is called exactly `size_of::<T>()` times, even after it starts
/// rejecting bytes. A result below `size_of::<T>()` means the rejected bytes
/// are lost.
pub fn write_anything<T, S>(sink: &mut S, value: &T) -> usize
where
    T: IntoBytes + Immutable,
    S: ByteSink + ?Sized,
{
    value
        .as_bytes()
        .iter()
        .map(|&byte| sink.write_byte(byte))
        .sum()
}

/// Overwrites every byte of `value` with the next byte from `source` and
/// returns `size_of::<T>()`.
///
/// Uses [`ByteSource::read_byte`], so an empty source leaves whatever it
/// hands out for that case in the value.
pub fn read_anything<T, S>(source: &mut S, value: &mut T) -> usize
where
    T: FromBytes + IntoBytes,
    S: ByteSource + ?Sized,
{
    let bytes = value.as_mut_bytes();
    bytes.iter_mut().for_each(|byte| *byte = source.read_byte());
    bytes.len()
}

/// Like [`write_anything`], but stops at the first rejected byte and reports
/// it as [`ErrorKind::ShortWrite`](crate::error::ErrorKind::ShortWrite).
///
/// Bytes accepted before the rejection stay in the sink.
pub fn try_write_anything<T, S>(sink: &mut S, value: &T) -> Result<usize, Error>
where
    T: IntoBytes + Immutable,
    S: ByteSink + ?Sized,
{
    let bytes = value.as_bytes();
    for (written, &byte) in bytes.iter().enumerate() {
        if sink.write_byte(byte) == 0 {
            warn!("short write: {} of {} bytes", written, bytes.len());
            return Err(Error::short_write(written, bytes.len()));
        }
    }
    Ok(bytes.len())
}

/// Like [`read_anything`], but uses [`ByteSource::try_read_byte`] and fails
/// with [`ErrorKind::ShortRead`](crate::error::ErrorKind::ShortRead) when the
/// source runs dry.
///
/// `value` is only assigned once all bytes have arrived; a short read leaves
/// it untouched.
pub fn try_read_anything<T, S>(source: &mut S, value: &mut T) -> Result<usize, Error>
where
    T: FromBytes + IntoBytes,
    S: ByteSource + ?Sized,
{
    let mut staged: T = FromZeros::new_zeroed();
    let bytes = staged.as_mut_bytes();
    let expected = bytes.len();
    for (read, slot) in bytes.iter_mut().enumerate() {
        match source.try_read_byte() {
            Some(byte) => *slot = byte,
            None => {
                warn!("short read: {} of {} bytes", read, expected);
                return Err(Error::short_read(read, expected));
            }
        }
    }
    *value = staged;
    Ok(expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ShortTransfer};
    use crate::transfer::{Reader, EMPTY_READ};
    use core::fmt::Write;
    use core::mem::size_of;
    use heapless::Vec;
    use zerocopy_derive::{FromBytes, Immutable, IntoBytes};

    #[derive(Clone, Copy, Debug, PartialEq, FromBytes, IntoBytes, Immutable)]
    #[repr(C)]
    struct Reading {
        celsius: i16,
        humidity: u16,
        sequence: u32,
    }

    // Accepts up to `limit` bytes and counts every call.
    struct Limited {
        accepted: Vec<u8, 16>,
        limit: usize,
        calls: usize,
    }

    impl Limited {
        fn new(limit: usize) -> Self {
            Self {
                accepted: Vec::new(),
                limit,
                calls: 0,
            }
        }
    }

    impl ByteSink for Limited {
        fn write_byte(&mut self, byte: u8) -> usize {
            self.calls += 1;
            if self.accepted.len() < self.limit {
                self.accepted.write_byte(byte)
            } else {
                0
            }
        }
    }

    // Never runs dry and counts every call.
    struct Counting {
        calls: usize,
    }

    impl ByteSource for Counting {
        fn read_byte(&mut self) -> u8 {
            self.calls += 1;
            0x00
        }
    }

    #[test]
    fn write_returns_size() {
        let mut sink = Limited::new(16);
        let reading = Reading {
            celsius: -40,
            humidity: 512,
            sequence: 7,
        };
        assert_eq!(write_anything(&mut sink, &reading), size_of::<Reading>());
        assert_eq!(sink.calls, 8);
        assert_eq!(sink.accepted.as_slice(), reading.as_bytes());
    }

    #[test]
    fn write_keeps_memory_order() {
        let value = 0x01020304u32;
        let mut sink = Vec::<u8, 4>::new();
        assert_eq!(write_anything(&mut sink, &value), 4);
        assert_eq!(sink.as_slice(), &value.to_ne_bytes());
    }

    #[test]
    #[cfg(target_endian = "little")]
    fn little_endian_u32() {
        let mut sink = Vec::<u8, 4>::new();
        assert_eq!(write_anything(&mut sink, &0x01020304u32), 4);
        assert_eq!(sink.as_slice(), &[0x04, 0x03, 0x02, 0x01]);

        let mut value = 0u32;
        let mut reader = Reader::new(&[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(read_anything(&mut reader, &mut value), 4);
        assert_eq!(value, 0x01020304);
    }

    #[test]
    fn round_trip() {
        let sent = Reading {
            celsius: 21,
            humidity: 4096,
            sequence: 0xCAFE_F00D,
        };
        let mut wire = Vec::<u8, 16>::new();
        write_anything(&mut wire, &sent);

        let mut received = Reading {
            celsius: 0,
            humidity: 0,
            sequence: 0,
        };
        let mut reader = Reader::new(&wire);
        assert_eq!(read_anything(&mut reader, &mut received), 8);
        assert_eq!(received, sent);
        assert_eq!(reader.remaining(), 0);

        let sent = [1.5f32, -0.25, 1024.0];
        let mut wire = Vec::<u8, 16>::new();
        assert_eq!(try_write_anything(&mut wire, &sent), Ok(12));
        let mut received = [0f32; 3];
        assert_eq!(try_read_anything(&mut Reader::new(&wire), &mut received), Ok(12));
        assert_eq!(received, sent);
    }

    #[test]
    fn zero_sized() {
        let mut sink = Limited::new(0);
        assert_eq!(write_anything(&mut sink, &()), 0);
        assert_eq!(try_write_anything(&mut sink, &()), Ok(0));
        assert_eq!(sink.calls, 0);

        let mut source = Counting { calls: 0 };
        assert_eq!(read_anything(&mut source, &mut ()), 0);
        assert_eq!(try_read_anything(&mut source, &mut ()), Ok(0));
        assert_eq!(source.calls, 0);
    }

    #[test]
    fn short_write_is_counted() {
        let mut sink = Limited::new(2);
        assert_eq!(write_anything(&mut sink, &0x01020304u32), 2);
        // Every byte is still offered.
        assert_eq!(sink.calls, 4);
        assert_eq!(sink.accepted.as_slice(), &0x01020304u32.to_ne_bytes()[..2]);
    }

    #[test]
    fn short_write_is_an_error() {
        let mut sink = Limited::new(2);
        let error = try_write_anything(&mut sink, &0x01020304u32).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ShortWrite);
        assert_eq!(
            error.short_transfer(),
            Some(ShortTransfer {
                transferred: 2,
                expected: 4
            })
        );
        assert_eq!(sink.calls, 3);

        let mut text = heapless::String::<80>::new();
        write!(text, "{}", error).unwrap();
        assert_eq!(
            text.as_str(),
            "sink accepted fewer bytes than the value holds (2 of 4 bytes)"
        );
    }

    #[test]
    fn read_from_empty_source_uses_sentinel() {
        let mut value = 0u32;
        let mut reader = Reader::new(&[0x00]);
        assert_eq!(read_anything(&mut reader, &mut value), 4);
        assert_eq!(value.as_bytes(), &[0x00, EMPTY_READ, EMPTY_READ, EMPTY_READ]);
    }

    #[test]
    fn short_read_leaves_value() {
        let mut value = 0xDEAD_BEEFu32;
        let mut reader = Reader::new(&[0x01, 0x02, 0x03]);
        let error = try_read_anything(&mut reader, &mut value).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ShortRead);
        assert_eq!(
            error.short_transfer(),
            Some(ShortTransfer {
                transferred: 3,
                expected: 4
            })
        );
        assert_eq!(value, 0xDEAD_BEEF);
        assert_eq!(reader.remaining(), 0);
    }
}
