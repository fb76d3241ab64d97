//! Bus interface implementations for the MPU9250
//!
//! Both buses expose the same flat register space. Multi-byte accesses rely on
//! the device's register auto-increment, so a burst is one address byte
//! followed by the data, sent as a single bus transaction.

use crate::{I2C_ADDRESS_AD0_HIGH, I2C_ADDRESS_AD0_LOW};

use device_driver::RegisterInterface;
use embedded_hal::{i2c, spi};

/// Read flag in the first SPI byte
const SPI_READ: u8 = 0x80;

/// Level of the AD0 pin, which selects the I2C address
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ad0 {
    /// AD0 tied to GND: 0x68
    #[default]
    Low,
    /// AD0 tied to VDDIO: 0x69
    High,
}

impl Ad0 {
    /// 7-bit I2C address for this pin level
    #[must_use]
    pub const fn address(self) -> u8 {
        match self {
            Self::Low => I2C_ADDRESS_AD0_LOW,
            Self::High => I2C_ADDRESS_AD0_HIGH,
        }
    }
}

/// I2C interface for the MPU9250
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// I2C interface at the address selected by `ad0`
    ///
    /// # Example
    /// ```ignore
    /// let interface = I2cInterface::new(i2c, Ad0::High);
    /// let mut imu = Mpu9250Driver::new(interface)?;
    /// ```
    pub const fn new(i2c: I2C, ad0: Ad0) -> Self {
        Self {
            i2c,
            address: ad0.address(),
        }
    }

    /// I2C interface at 0x68, the usual breakout board wiring
    pub const fn default(i2c: I2C) -> Self {
        Self::new(i2c, Ad0::Low)
    }

    /// I2C interface at an arbitrary address, e.g. behind an address translator
    pub const fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Device address used on the bus
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Consume the interface and return the I2C peripheral
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> RegisterInterface for I2cInterface<I2C>
where
    I2C: i2c::I2c<Error = E>,
{
    type Error = E;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[address], read_data)
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        // Adjacent writes go out without a repeated start
        self.i2c.transaction(
            self.address,
            &mut [i2c::Operation::Write(&[address]), i2c::Operation::Write(write_data)],
        )
    }
}

/// SPI interface for the MPU9250
///
/// Takes an [`SpiDevice`](spi::SpiDevice), which owns chip select. Use SPI
/// mode 0 or 3. Configuration registers accept at most 1 MHz; sensor and
/// interrupt registers can be read at up to 20 MHz.
///
/// Call [`enable_spi_mode`](crate::Mpu9250Driver::enable_spi_mode) after
/// `begin` to disable the I2C slave interface.
///
/// ```ignore
/// let spi_device = ExclusiveDevice::new(spi_bus, cs, delay);
/// let interface = SpiInterface::new(spi_device);
/// ```
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI> {
    /// Wrap an SPI device
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Consume the interface and return the SPI device
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI, E> RegisterInterface for SpiInterface<SPI>
where
    SPI: spi::SpiDevice<Error = E>,
{
    type Error = E;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.spi.transaction(&mut [
            spi::Operation::Write(&[address | SPI_READ]),
            spi::Operation::Read(read_data),
        ])
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        self.spi.transaction(&mut [
            spi::Operation::Write(&[address & !SPI_READ]),
            spi::Operation::Write(write_data),
        ])
    }
}
