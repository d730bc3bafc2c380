#![no_std]
mod fmt;

pub mod anything;
pub mod error;
pub mod transfer;
pub mod wire;

pub use anything::{read_anything, try_read_anything, try_write_anything, write_anything};
pub use error::{Error, ErrorKind, ShortTransfer};
pub use transfer::{ByteSink, ByteSource, Reader, EMPTY_READ};
pub use wire::{Wire, WireConfig, BUFFER_LENGTH};
