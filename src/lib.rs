#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod calibration;
pub mod device;
pub mod fifo;
pub mod interface;
pub mod interrupt;
pub mod power;
pub mod registers;
pub mod sensors;

// Re-export main types
pub use calibration::{BiasCalibrationConfig, BiasSet, ReferenceGravity, SelfTestResult};
pub use device::{AccelData, GyroData, MagData, Mpu9250Config, Mpu9250Driver};
pub use interface::{Ad0, I2cInterface, SpiInterface};
pub use interrupt::{DataReadyFlag, InterruptConfig, InterruptPinConfig, InterruptStatus};
pub use power::{ClockSource, LowPowerRate, SensorPowerConfig, WakeOnMotionConfig};
pub use sensors::{
    AccelCalibration, AccelConfig, AccelDataG, AccelDlpf, AccelFullScale, GyroCalibration,
    GyroConfig, GyroDataDps, GyroDataRps, GyroDlpf, GyroFullScale, MagCalibration, MagConfig,
    MagDataMilliGauss, MagMode, MagResolution, MagSensitivity,
};

/// MPU9250 I2C address when AD0 pin is low (default: 0x68)
///
/// Use [`I2cInterface::default()`] for this configuration.
pub const I2C_ADDRESS_AD0_LOW: u8 = 0x68;

/// MPU9250 I2C address when AD0 pin is high (alternative: 0x69)
///
/// Use [`I2cInterface::new`] with [`Ad0::High`] for this configuration.
pub const I2C_ADDRESS_AD0_HIGH: u8 = 0x69;

/// Expected value of `WHO_AM_I` register
pub const WHO_AM_I_VALUE: u8 = 0x71;

/// Driver errors
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error with the device
    Bus(E),
    /// Invalid `WHO_AM_I` register value (contains the actual value read)
    InvalidDevice(u8),
    /// Factory self-test deviation exceeded the tolerance on at least one axis
    SelfTestFailed,
    /// Invalid AK8963 `WIA` register value (contains the actual value read)
    InvalidMagnetometer(u8),
    /// Invalid configuration parameter
    InvalidConfig,
    /// Auxiliary I2C transaction with the magnetometer failed (NACK or timeout)
    Magnetometer,
    /// The FIFO held no complete accel/gyro packet during bias calibration
    NoCalibrationSamples,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}
