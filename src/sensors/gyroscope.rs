//! Gyroscope sensor types and configuration
//!
//! Provides types, enums, and utility functions for the MPU9250's 3-axis gyroscope.

/// Gyroscope full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroFullScale {
    /// ±250 degrees per second
    Dps250 = 0,
    /// ±500 degrees per second
    Dps500 = 1,
    /// ±1000 degrees per second
    Dps1000 = 2,
    /// ±2000 degrees per second
    Dps2000 = 3,
}

impl GyroFullScale {
    /// Resolution in degrees per second per LSB
    #[must_use]
    pub fn resolution(self) -> f32 {
        match self {
            Self::Dps250 => 250.0 / 32768.0,
            Self::Dps500 => 500.0 / 32768.0,
            Self::Dps1000 => 1000.0 / 32768.0,
            Self::Dps2000 => 2000.0 / 32768.0,
        }
    }

    /// Sensitivity in LSB per degree per second, as listed in the datasheet
    #[must_use]
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::Dps250 => 131.0,
            Self::Dps500 => 65.5,
            Self::Dps1000 => 32.8,
            Self::Dps2000 => 16.4,
        }
    }

    /// Get the maximum value in degrees per second
    #[must_use]
    pub const fn max_value(self) -> u16 {
        match self {
            Self::Dps250 => 250,
            Self::Dps500 => 500,
            Self::Dps1000 => 1000,
            Self::Dps2000 => 2000,
        }
    }
}

/// Gyroscope and temperature Digital Low Pass Filter (`DLPF_CFG` in `CONFIG`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroDlpf {
    /// 250 Hz gyro bandwidth, 8 kHz internal rate
    Hz250 = 0,
    /// 184 Hz bandwidth, 1 kHz internal rate
    Hz184 = 1,
    /// 92 Hz bandwidth
    Hz92 = 2,
    /// 41 Hz bandwidth
    Hz41 = 3,
    /// 20 Hz bandwidth
    Hz20 = 4,
    /// 10 Hz bandwidth
    Hz10 = 5,
    /// 5 Hz bandwidth
    Hz5 = 6,
    /// 3600 Hz bandwidth, 8 kHz internal rate
    Hz3600 = 7,
}

impl GyroDlpf {
    /// Get the 3dB bandwidth in Hz
    #[must_use]
    pub const fn bandwidth_hz(self) -> u16 {
        match self {
            Self::Hz250 => 250,
            Self::Hz184 => 184,
            Self::Hz92 => 92,
            Self::Hz41 => 41,
            Self::Hz20 => 20,
            Self::Hz10 => 10,
            Self::Hz5 => 5,
            Self::Hz3600 => 3600,
        }
    }

    /// Internal sample rate in Hz before `SMPLRT_DIV` is applied
    #[must_use]
    pub const fn internal_rate_hz(self) -> u16 {
        match self {
            Self::Hz250 | Self::Hz3600 => 8000,
            _ => 1000,
        }
    }
}

/// Gyroscope configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroConfig {
    /// Full-scale range
    pub full_scale: GyroFullScale,
    /// Digital Low Pass Filter configuration
    pub dlpf: GyroDlpf,
}

impl Default for GyroConfig {
    fn default() -> Self {
        Self {
            full_scale: GyroFullScale::Dps250,
            dlpf: GyroDlpf::Hz41,
        }
    }
}

impl GyroConfig {
    /// Output data rate in Hz for the given `SMPLRT_DIV` value
    #[must_use]
    pub fn sample_rate_hz(&self, sample_rate_divisor: u8) -> f32 {
        f32::from(self.dlpf.internal_rate_hz()) / (1.0 + f32::from(sample_rate_divisor))
    }
}

/// Gyroscope data in degrees per second
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroDataDps {
    /// X-axis rotation in °/s
    pub x: f32,
    /// Y-axis rotation in °/s
    pub y: f32,
    /// Z-axis rotation in °/s
    pub z: f32,
}

impl GyroDataDps {
    /// Convert to radians per second
    #[must_use]
    pub fn to_radians_per_sec(&self) -> GyroDataRps {
        GyroDataRps {
            x: self.x.to_radians(),
            y: self.y.to_radians(),
            z: self.z.to_radians(),
        }
    }
}

/// Gyroscope data in radians per second
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroDataRps {
    /// X-axis rotation in rad/s
    pub x: f32,
    /// Y-axis rotation in rad/s
    pub y: f32,
    /// Z-axis rotation in rad/s
    pub z: f32,
}

/// Gyroscope calibration data (biases in °/s)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroCalibration {
    /// Bias for X-axis in °/s
    pub bias_x: f32,
    /// Bias for Y-axis in °/s
    pub bias_y: f32,
    /// Bias for Z-axis in °/s
    pub bias_z: f32,
}

impl GyroCalibration {
    /// Convert raw counts to °/s and remove the bias
    #[must_use]
    pub fn apply(&self, raw_x: i16, raw_y: i16, raw_z: i16, resolution: f32) -> GyroDataDps {
        GyroDataDps {
            x: f32::from(raw_x) * resolution - self.bias_x,
            y: f32::from(raw_y) * resolution - self.bias_y,
            z: f32::from(raw_z) * resolution - self.bias_z,
        }
    }
}
