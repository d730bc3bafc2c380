//! Arduino `Wire` style buffering on top of an `embedded-hal` I2C bus.
//!
//! Bytes written through [`ByteSink`] collect in a transmit buffer until
//! [`Wire::end_transmission`] sends them in a single bus write. Bytes fetched
//! by [`Wire::request_from`] land in a receive buffer and are handed out one
//! at a time through [`ByteSource`].
//!
//! Bus access goes through `&mut self`; sharing one bus between several
//! `Wire`s is left to the caller (e.g. `embedded-hal-bus`).

use super::anything::{try_read_anything, try_write_anything};
use super::error::{Error, ErrorKind};
use super::transfer::{ByteSink, ByteSource, EMPTY_READ};
use core::mem::size_of;
use heapless::Vec;
use zerocopy::{FromBytes, Immutable, IntoBytes};

/// Default size of the transmit and receive buffers, as on AVR Arduinos.
pub const BUFFER_LENGTH: usize = 32;

// Linux i2c-dev reports a NACK whenever the target is still busy with the
// previous transfer, so retry a lot more there.
#[cfg(target_os = "none")]
const RETRY: usize = 2;
#[cfg(not(target_os = "none"))]
const RETRY: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WireConfig {
    /// How many times a failed bus write is repeated before giving up.
    pub retry: usize,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self { retry: RETRY }
    }
}

pub struct Wire<PHY, const N: usize = BUFFER_LENGTH> {
    phy: PHY,
    config: WireConfig,
    target: Option<u8>,
    tx: Vec<u8, N>,
    rx: Vec<u8, N>,
    rx_index: usize,
}

impl<PHY> Wire<PHY> {
    /// Create an adapter with the default buffer size and configuration
    pub fn new(phy: PHY) -> Self {
        Self::with_config(phy, WireConfig::default())
    }
}

impl<PHY, const N: usize> Wire<PHY, N> {
    /// Create an adapter with a custom configuration
    pub fn with_config(phy: PHY, config: WireConfig) -> Self {
        Self {
            phy,
            config,
            target: None,
            tx: Vec::new(),
            rx: Vec::new(),
            rx_index: 0,
        }
    }

    pub fn config(&self) -> &WireConfig {
        &self.config
    }

    /// Give the bus back.
    pub fn release(self) -> PHY {
        self.phy
    }

    /// Starts collecting bytes for `address`. Anything buffered by an earlier,
    /// unfinished transmission is dropped.
    pub fn begin_transmission(&mut self, address: u8) {
        self.target.replace(address);
        self.tx.clear();
    }

    /// Number of received bytes not read yet.
    pub fn available(&self) -> usize {
        self.rx.len() - self.rx_index
    }

    fn abort_transmission(&mut self) {
        self.target = None;
        self.tx.clear();
    }

    fn prepare_receive(&mut self, len: usize) -> Result<(), Error> {
        if len > N {
            return Err(ErrorKind::SmallBuffer.into());
        }
        self.rx_index = 0;
        self.rx.clear();
        self.rx
            .resize(len, 0x00u8)
            .unwrap_or_else(|()| unreachable!("Length is within the buffer capacity."));
        Ok(())
    }
}

impl<PHY, const N: usize> ByteSink for Wire<PHY, N> {
    /// Buffers `byte` for the current transmission. Returns 0 outside of a
    /// transmission or once the transmit buffer is full.
    fn write_byte(&mut self, byte: u8) -> usize {
        if self.target.is_none() {
            return 0;
        }
        self.tx.write_byte(byte)
    }
}

impl<PHY, const N: usize> ByteSource for Wire<PHY, N> {
    /// Returns [`EMPTY_READ`] once every received byte has been read.
    fn read_byte(&mut self) -> u8 {
        self.try_read_byte().unwrap_or(EMPTY_READ)
    }

    fn try_read_byte(&mut self) -> Option<u8> {
        let byte = *self.rx.get(self.rx_index)?;
        self.rx_index += 1;
        Some(byte)
    }
}

impl<PHY, const N: usize> Wire<PHY, N>
where
    PHY: embedded_hal_async::i2c::I2c,
{
    /// Sends the buffered bytes to the address given to
    /// [`begin_transmission`](Self::begin_transmission) and returns how many
    /// were sent. The buffer is emptied either way.
    pub async fn end_transmission(&mut self) -> Result<usize, Error> {
        let address = self.target.take().ok_or(ErrorKind::NoTransmission)?;

        let mut count = 0;
        loop {
            let result = self.phy.write(address, &self.tx).await;

            if result.is_ok() {
                break;
            } else {
                if count >= self.config.retry {
                    self.tx.clear();
                    return Err(ErrorKind::TxFail.into());
                }
                count += 1;
                trace!("write to {} failed, retry {}", address, count);
            }
        }

        let written = self.tx.len();
        self.tx.clear();
        debug!("wrote {} bytes to {}", written, address);
        Ok(written)
    }

    /// Reads `len` bytes from `address` into the receive buffer, replacing
    /// whatever was left unread.
    pub async fn request_from(&mut self, address: u8, len: usize) -> Result<usize, Error> {
        self.prepare_receive(len)?;
        if self.phy.read(address, &mut self.rx).await.is_err() {
            self.rx.clear();
            return Err(ErrorKind::RxFail.into());
        }
        debug!("read {} bytes from {}", len, address);
        Ok(len)
    }

    /// Sends `value` to `address` in one transmission.
    pub async fn send<T>(&mut self, address: u8, value: &T) -> Result<(), Error>
    where
        T: IntoBytes + Immutable,
    {
        self.begin_transmission(address);
        if let Err(error) = try_write_anything(self, value) {
            self.abort_transmission();
            return Err(error);
        }
        self.end_transmission().await.map(drop)
    }

    /// Reads exactly `size_of::<T>()` bytes from `address` into `value`.
    pub async fn receive<T>(&mut self, address: u8, value: &mut T) -> Result<(), Error>
    where
        T: FromBytes + IntoBytes,
    {
        self.request_from(address, size_of::<T>()).await?;
        try_read_anything(self, value).map(drop)
    }
}

impl<PHY, const N: usize> Wire<PHY, N>
where
    PHY: embedded_hal::i2c::I2c,
{
    /// Sends the buffered bytes to the address given to
    /// [`begin_transmission`](Self::begin_transmission) and returns how many
    /// were sent. The buffer is emptied either way.
    pub fn end_transmission_blocking(&mut self) -> Result<usize, Error> {
        let address = self.target.take().ok_or(ErrorKind::NoTransmission)?;

        let mut count = 0;
        loop {
            let result = self.phy.write(address, &self.tx);

            if result.is_ok() {
                break;
            } else {
                if count >= self.config.retry {
                    self.tx.clear();
                    return Err(ErrorKind::TxFail.into());
                }
                count += 1;
                trace!("write to {} failed, retry {}", address, count);
            }
        }

        let written = self.tx.len();
        self.tx.clear();
        debug!("wrote {} bytes to {}", written, address);
        Ok(written)
    }

    /// Reads `len` bytes from `address` into the receive buffer, replacing
    /// whatever was left unread.
    pub fn request_from_blocking(&mut self, address: u8, len: usize) -> Result<usize, Error> {
        self.prepare_receive(len)?;
        if self.phy.read(address, &mut self.rx).is_err() {
            self.rx.clear();
            return Err(ErrorKind::RxFail.into());
        }
        debug!("read {} bytes from {}", len, address);
        Ok(len)
    }

    /// Sends `value` to `address` in one transmission.
    pub fn send_blocking<T>(&mut self, address: u8, value: &T) -> Result<(), Error>
    where
        T: IntoBytes + Immutable,
    {
        self.begin_transmission(address);
        if let Err(error) = try_write_anything(self, value) {
            self.abort_transmission();
            return Err(error);
        }
        self.end_transmission_blocking().map(drop)
    }

    /// Reads exactly `size_of::<T>()` bytes from `address` into `value`.
    pub fn receive_blocking<T>(&mut self, address: u8, value: &mut T) -> Result<(), Error>
    where
        T: FromBytes + IntoBytes,
    {
        self.request_from_blocking(address, size_of::<T>())?;
        try_read_anything(self, value).map(drop)
    }
}
