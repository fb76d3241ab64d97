//! Accelerometer sensor types and configuration
//!
//! Provides types, enums, and utility functions for the MPU9250's 3-axis accelerometer.

/// Accelerometer full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelFullScale {
    /// ±2g range (most sensitive, least range)
    G2 = 0,
    /// ±4g range
    G4 = 1,
    /// ±8g range
    G8 = 2,
    /// ±16g range (least sensitive, most range)
    G16 = 3,
}

impl AccelFullScale {
    /// Resolution in g per LSB
    ///
    /// Multiplying a raw count by this value yields acceleration in g.
    #[must_use]
    pub fn resolution(self) -> f32 {
        match self {
            Self::G2 => 2.0 / 32768.0,
            Self::G4 => 4.0 / 32768.0,
            Self::G8 => 8.0 / 32768.0,
            Self::G16 => 16.0 / 32768.0,
        }
    }

    /// Get the sensitivity in LSB/g (Least Significant Bit per g)
    #[must_use]
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::G2 => 16384.0,
            Self::G4 => 8192.0,
            Self::G8 => 4096.0,
            Self::G16 => 2048.0,
        }
    }

    /// Get the maximum value in g
    #[must_use]
    pub const fn max_value(self) -> u8 {
        match self {
            Self::G2 => 2,
            Self::G4 => 4,
            Self::G8 => 8,
            Self::G16 => 16,
        }
    }
}

/// Accelerometer Digital Low Pass Filter (`A_DLPFCFG`), 1 kHz output rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelDlpf {
    /// 218.1 Hz bandwidth
    Hz218 = 0,
    /// 218.1 Hz bandwidth (alternate encoding)
    Hz218Alt = 1,
    /// 99 Hz bandwidth
    Hz99 = 2,
    /// 44.8 Hz bandwidth
    Hz45 = 3,
    /// 21.2 Hz bandwidth
    Hz21 = 4,
    /// 10.2 Hz bandwidth
    Hz10 = 5,
    /// 5.05 Hz bandwidth
    Hz5 = 6,
    /// 420 Hz bandwidth
    Hz420 = 7,
}

impl AccelDlpf {
    /// Get the 3dB bandwidth in Hz
    #[must_use]
    pub const fn bandwidth_hz(self) -> f32 {
        match self {
            Self::Hz218 | Self::Hz218Alt => 218.1,
            Self::Hz99 => 99.0,
            Self::Hz45 => 44.8,
            Self::Hz21 => 21.2,
            Self::Hz10 => 10.2,
            Self::Hz5 => 5.05,
            Self::Hz420 => 420.0,
        }
    }
}

/// Accelerometer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelConfig {
    /// Full-scale range
    pub full_scale: AccelFullScale,
    /// Digital Low Pass Filter configuration
    pub dlpf: AccelDlpf,
    /// Bypass the DLPF (4 kHz output, 1.13 kHz bandwidth)
    pub fchoice_bypass: bool,
}

impl Default for AccelConfig {
    fn default() -> Self {
        Self {
            full_scale: AccelFullScale::G2,
            dlpf: AccelDlpf::Hz45,
            fchoice_bypass: false,
        }
    }
}

/// Accelerometer data in physical units (g-force)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelDataG {
    /// X-axis acceleration in g
    pub x: f32,
    /// Y-axis acceleration in g
    pub y: f32,
    /// Z-axis acceleration in g
    pub z: f32,
}

impl AccelDataG {
    /// Get the magnitude of the acceleration vector
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }
}

/// Accelerometer calibration data
///
/// Biases are in g and subtracted after the raw count is scaled.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelCalibration {
    /// Bias for X-axis in g
    pub bias_x: f32,
    /// Bias for Y-axis in g
    pub bias_y: f32,
    /// Bias for Z-axis in g
    pub bias_z: f32,
}

impl AccelCalibration {
    /// Convert raw counts to g and remove the bias
    ///
    /// `physical = raw * resolution - bias`
    #[must_use]
    pub fn apply(&self, raw_x: i16, raw_y: i16, raw_z: i16, resolution: f32) -> AccelDataG {
        AccelDataG {
            x: f32::from(raw_x) * resolution - self.bias_x,
            y: f32::from(raw_y) * resolution - self.bias_y,
            z: f32::from(raw_z) * resolution - self.bias_z,
        }
    }
}
