//! Power management and wake-on-motion
//!
//! The MPU9250 supports several ways to reduce power consumption:
//! - **Sleep mode**: all sensors off
//! - **Gyro standby**: gyro drive and PLL running, sense paths off
//! - **Accelerometer cycle mode**: periodic single accel samples (0.24 Hz - 500 Hz)
//! - **Wake-on-motion (`WoM`)**: interrupt when any accel axis changes by more
//!   than a threshold between cycle samples
//!
//! # Example
//!
//! ```ignore
//! # use mpu9250::{Mpu9250Driver, power::{LowPowerRate, WakeOnMotionConfig}};
//! # let mut imu: Mpu9250Driver<_> = todo!();
//! let config = WakeOnMotionConfig::new(LowPowerRate::Hz31_25, 40)?;
//! imu.enable_wake_on_motion(&mut delay, &config)?;
//!
//! if imu.wake_on_motion_detected()? {
//!     imu.gyro_mag_wake(&mut delay)?;
//! }
//! # Ok::<(), mpu9250::Error<()>>(())
//! ```

use crate::Error;

/// Clock source selection (`CLKSEL` in `PWR_MGMT_1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Internal 20 MHz oscillator
    Internal20MHz = 0,
    /// Auto-select the gyro PLL when ready, else the internal oscillator
    AutoSelect = 1,
    /// Stop clock and keep timing generator in reset
    Stop = 7,
}

/// Low-power accelerometer wake-up rates (`LP_ACCEL_ODR`)
///
/// Lower rates consume less power.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LowPowerRate {
    /// 0.24 Hz (4.17 second period) - lowest power
    Hz0_24 = 0,
    /// 0.49 Hz (2.04 second period)
    Hz0_49 = 1,
    /// 0.98 Hz (1.02 second period)
    Hz0_98 = 2,
    /// 1.95 Hz (512 ms period)
    Hz1_95 = 3,
    /// 3.91 Hz (256 ms period)
    Hz3_91 = 4,
    /// 7.81 Hz (128 ms period)
    Hz7_81 = 5,
    /// 15.63 Hz (64 ms period)
    Hz15_63 = 6,
    /// 31.25 Hz (32 ms period)
    Hz31_25 = 7,
    /// 62.50 Hz (16 ms period)
    Hz62_50 = 8,
    /// 125 Hz (8 ms period)
    Hz125 = 9,
    /// 250 Hz (4 ms period)
    Hz250 = 10,
    /// 500 Hz (2 ms period)
    Hz500 = 11,
}

impl LowPowerRate {
    /// Get the sample rate in Hz
    #[must_use]
    pub const fn rate_hz(self) -> f32 {
        match self {
            Self::Hz0_24 => 0.24,
            Self::Hz0_49 => 0.49,
            Self::Hz0_98 => 0.98,
            Self::Hz1_95 => 1.95,
            Self::Hz3_91 => 3.91,
            Self::Hz7_81 => 7.81,
            Self::Hz15_63 => 15.63,
            Self::Hz31_25 => 31.25,
            Self::Hz62_50 => 62.50,
            Self::Hz125 => 125.0,
            Self::Hz250 => 250.0,
            Self::Hz500 => 500.0,
        }
    }

    /// Get the sample period in milliseconds
    #[must_use]
    pub fn period_ms(self) -> f32 {
        1000.0 / self.rate_hz()
    }

    /// Get register value for `LP_ACCEL_ODR`
    #[must_use]
    pub const fn odr_value(self) -> u8 {
        self as u8
    }
}

/// Wake-on-motion configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WakeOnMotionConfig {
    /// Accelerometer wake-up rate while cycling
    pub rate: LowPowerRate,
    /// Motion threshold in milligravity (mg)
    /// Range: 0-1020 mg in 4 mg steps
    pub threshold_mg: u16,
}

impl Default for WakeOnMotionConfig {
    fn default() -> Self {
        Self {
            rate: LowPowerRate::Hz31_25,
            threshold_mg: 40,
        }
    }
}

impl WakeOnMotionConfig {
    /// Create a new wake-on-motion configuration
    ///
    /// # Arguments
    /// * `rate` - Accelerometer wake-up rate
    /// * `threshold_mg` - Motion threshold in mg (0-1020)
    ///
    /// # Errors
    /// Returns `InvalidConfig` if threshold is out of range
    pub const fn new(rate: LowPowerRate, threshold_mg: u16) -> Result<Self, Error<()>> {
        if threshold_mg > 1020 {
            return Err(Error::InvalidConfig);
        }
        Ok(Self { rate, threshold_mg })
    }

    /// Get the `WOM_THR` register value
    ///
    /// The register uses 4 mg steps. Out-of-range thresholds saturate to 255.
    #[must_use]
    pub fn threshold_register_value(&self) -> u8 {
        u8::try_from(self.threshold_mg / 4).unwrap_or(u8::MAX)
    }
}

/// Individual sensor axis power control (`PWR_MGMT_2`)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct SensorPowerConfig {
    /// Disable accelerometer X-axis
    pub disable_accel_x: bool,
    /// Disable accelerometer Y-axis
    pub disable_accel_y: bool,
    /// Disable accelerometer Z-axis
    pub disable_accel_z: bool,
    /// Disable gyroscope X-axis
    pub disable_gyro_x: bool,
    /// Disable gyroscope Y-axis
    pub disable_gyro_y: bool,
    /// Disable gyroscope Z-axis
    pub disable_gyro_z: bool,
}

impl SensorPowerConfig {
    /// Enable all sensors
    #[must_use]
    pub const fn all_enabled() -> Self {
        Self {
            disable_accel_x: false,
            disable_accel_y: false,
            disable_accel_z: false,
            disable_gyro_x: false,
            disable_gyro_y: false,
            disable_gyro_z: false,
        }
    }

    /// Disable all gyroscope axes
    #[must_use]
    pub const fn gyro_disabled() -> Self {
        Self {
            disable_accel_x: false,
            disable_accel_y: false,
            disable_accel_z: false,
            disable_gyro_x: true,
            disable_gyro_y: true,
            disable_gyro_z: true,
        }
    }

    /// Check if all accelerometer axes are enabled
    #[must_use]
    pub const fn is_accel_enabled(&self) -> bool {
        !self.disable_accel_x && !self.disable_accel_y && !self.disable_accel_z
    }

    /// Check if all gyroscope axes are enabled
    #[must_use]
    pub const fn is_gyro_enabled(&self) -> bool {
        !self.disable_gyro_x && !self.disable_gyro_y && !self.disable_gyro_z
    }
}
