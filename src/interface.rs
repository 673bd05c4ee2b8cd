//! Bus transports between the driver and the controller.
//!
//! A transport moves one command or data transfer at a time and reports how
//! many bytes a single transfer may carry. Splitting longer payloads is the
//! driver's job.

use embedded_hal::digital::OutputPin;
#[cfg(not(feature = "async"))]
use embedded_hal::i2c::I2c;
use embedded_hal::i2c::Operation;
#[cfg(not(feature = "async"))]
use embedded_hal::spi::SpiDevice;
#[cfg(feature = "async")]
use embedded_hal_async::i2c::I2c;
#[cfg(feature = "async")]
use embedded_hal_async::spi::SpiDevice;

use crate::Error;

/// Default 7-bit address of SH110X modules
pub const DEFAULT_I2C_ADDRESS: u8 = 0x3C;
/// Address with the SA0 strap pulled high
pub const ALTERNATE_I2C_ADDRESS: u8 = 0x3D;

/// Payload bytes per I2C transfer: a 32-byte transfer minus the control byte
pub const DEFAULT_I2C_CHUNK_LIMIT: usize = 31;
/// Payload bytes per SPI transfer: one full page row
pub const DEFAULT_SPI_CHUNK_LIMIT: usize = 128;

// I2C control bytes (Co = 0, D/C# selects the stream type)
const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
/// Raw byte transport to the controller.
pub trait Interface {
    /// Error reported by the underlying bus
    type Error;

    /// Maximum payload bytes accepted by one `write_command`/`write_data` call.
    fn chunk_limit(&self) -> usize;

    /// Send command bytes in a single transfer.
    async fn write_command(&mut self, bytes: &[u8]) -> Result<(), Error<Self::Error>>;

    /// Send display RAM bytes in a single transfer.
    async fn write_data(&mut self, bytes: &[u8]) -> Result<(), Error<Self::Error>>;
}

/// I2C transport: every transfer is prefixed with a control byte.
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
    chunk_limit: usize,
}

impl<I2C> I2cInterface<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            chunk_limit: DEFAULT_I2C_CHUNK_LIMIT,
        }
    }

    /// Override the payload limit, e.g. for controllers with a larger bus buffer.
    pub fn with_chunk_limit(mut self, chunk_limit: usize) -> Self {
        self.chunk_limit = chunk_limit.max(1);
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl<I2C: I2c> I2cInterface<I2C> {
    async fn write_with_control(
        &mut self,
        control: u8,
        bytes: &[u8],
    ) -> Result<(), Error<I2C::Error>> {
        // Adjacent writes go out as one transfer without a repeated start
        self.i2c
            .transaction(
                self.address,
                &mut [Operation::Write(&[control]), Operation::Write(bytes)],
            )
            .await
            .map_err(Error::Comm)
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl<I2C: I2c> Interface for I2cInterface<I2C> {
    type Error = I2C::Error;

    fn chunk_limit(&self) -> usize {
        self.chunk_limit
    }

    async fn write_command(&mut self, bytes: &[u8]) -> Result<(), Error<Self::Error>> {
        self.write_with_control(CONTROL_COMMAND, bytes).await
    }

    async fn write_data(&mut self, bytes: &[u8]) -> Result<(), Error<Self::Error>> {
        self.write_with_control(CONTROL_DATA, bytes).await
    }
}

/// 4-wire SPI transport: DC low for commands, high for data.
///
/// Any `SpiDevice` works here, whether backed by a hardware peripheral or a
/// bit-banged bus; chip select is handled by the device.
pub struct SpiInterface<SPI, DC> {
    spi: SPI,
    dc: DC,
    chunk_limit: usize,
}

impl<SPI, DC> SpiInterface<SPI, DC> {
    pub fn new(spi: SPI, dc: DC) -> Self {
        Self {
            spi,
            dc,
            chunk_limit: DEFAULT_SPI_CHUNK_LIMIT,
        }
    }

    pub fn with_chunk_limit(mut self, chunk_limit: usize) -> Self {
        self.chunk_limit = chunk_limit.max(1);
        self
    }

    pub fn release(self) -> (SPI, DC) {
        (self.spi, self.dc)
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), keep_self),
    async(feature = "async", keep_self)
)]
impl<SPI: SpiDevice, DC: OutputPin> Interface for SpiInterface<SPI, DC> {
    type Error = SPI::Error;

    fn chunk_limit(&self) -> usize {
        self.chunk_limit
    }

    async fn write_command(&mut self, bytes: &[u8]) -> Result<(), Error<Self::Error>> {
        // Set DC low for command
        self.dc.set_low().map_err(|_| Error::Pin)?;
        self.spi.write(bytes).await.map_err(Error::Comm)
    }

    async fn write_data(&mut self, bytes: &[u8]) -> Result<(), Error<Self::Error>> {
        self.dc.set_high().map_err(|_| Error::Pin)?;
        self.spi.write(bytes).await.map_err(Error::Comm)
    }
}
