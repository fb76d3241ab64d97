//! Magnetometer sensor types and configuration
//!
//! Provides types, enums, constants, and utility functions for the MPU9250's
//! embedded AK8963 3-axis magnetometer.

/// AK8963 magnetometer I2C address on the auxiliary bus
pub const AK8963_I2C_ADDRESS: u8 = 0x0C;

/// AK8963 `WIA` (device ID) register address
pub const AK8963_REG_WIA: u8 = 0x00;

/// Expected `WIA` value for AK8963
pub const AK8963_WIA_VALUE: u8 = 0x48;

/// AK8963 Status 1 register address (bit 0: data ready)
pub const AK8963_REG_ST1: u8 = 0x02;

/// AK8963 Control 1 register address (resolution and mode)
pub const AK8963_REG_CNTL1: u8 = 0x0A;

/// AK8963 X-axis sensitivity adjustment (fuse ROM, followed by Y and Z)
pub const AK8963_REG_ASAX: u8 = 0x10;

/// ST2 magnetic sensor overflow bit
pub const AK8963_ST2_HOFL: u8 = 0x08;

/// Magnetometer output resolution (`BIT` in `CNTL1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MagResolution {
    /// 14-bit output, 0.6 µT/LSB
    Bits14 = 0,
    /// 16-bit output, 0.15 µT/LSB
    Bits16 = 1,
}

impl MagResolution {
    /// Resolution in milligauss per LSB
    ///
    /// The full-scale range is ±4912 µT; one µT is ten milligauss.
    #[must_use]
    pub fn resolution(self) -> f32 {
        match self {
            Self::Bits14 => 10.0 * 4912.0 / 8190.0,
            Self::Bits16 => 10.0 * 4912.0 / 32760.0,
        }
    }
}

/// Magnetometer operating mode (`MODE` in `CNTL1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MagMode {
    /// Power-down mode
    PowerDown = 0x00,
    /// Single measurement mode
    Single = 0x01,
    /// Continuous measurement mode 1 (8 Hz)
    Continuous8Hz = 0x02,
    /// Continuous measurement mode 2 (100 Hz)
    Continuous100Hz = 0x06,
    /// Self-test mode
    SelfTest = 0x08,
    /// Fuse ROM access mode
    FuseRom = 0x0F,
}

impl MagMode {
    /// Get the sample rate in Hz for continuous modes
    #[must_use]
    pub const fn sample_rate_hz(self) -> Option<u8> {
        match self {
            Self::Continuous8Hz => Some(8),
            Self::Continuous100Hz => Some(100),
            _ => None,
        }
    }

    /// Check if this is a continuous measurement mode
    #[must_use]
    pub const fn is_continuous(self) -> bool {
        matches!(self, Self::Continuous8Hz | Self::Continuous100Hz)
    }

    /// Sample count and inter-sample delay for a calibration sweep
    ///
    /// Both rates cover roughly 16 seconds of motion; the delay is slightly
    /// longer than the output period so every sample is fresh.
    #[must_use]
    pub const fn calibration_schedule(self) -> Option<MagSweepSchedule> {
        match self {
            Self::Continuous8Hz => Some(MagSweepSchedule {
                samples: 128,
                delay_ms: 135,
            }),
            Self::Continuous100Hz => Some(MagSweepSchedule {
                samples: 1500,
                delay_ms: 12,
            }),
            _ => None,
        }
    }
}

/// Sampling plan of a magnetometer calibration sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagSweepSchedule {
    /// Number of samples to collect
    pub samples: u16,
    /// Delay between samples in milliseconds
    pub delay_ms: u32,
}

/// Magnetometer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagConfig {
    /// Output resolution
    pub resolution: MagResolution,
    /// Operating mode
    pub mode: MagMode,
}

impl Default for MagConfig {
    fn default() -> Self {
        Self {
            resolution: MagResolution::Bits16,
            mode: MagMode::Continuous100Hz,
        }
    }
}

impl MagConfig {
    /// Value written to `CNTL1`
    #[must_use]
    pub const fn cntl1(&self) -> u8 {
        (self.resolution as u8) << 4 | self.mode as u8
    }
}

/// Magnetometer data in milligauss
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagDataMilliGauss {
    /// X-axis magnetic field in mG
    pub x: f32,
    /// Y-axis magnetic field in mG
    pub y: f32,
    /// Z-axis magnetic field in mG
    pub z: f32,
}

impl MagDataMilliGauss {
    /// Calculate the magnitude of the magnetic field vector in mG
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }

    /// Heading in degrees (0-360) assuming the sensor is level
    #[must_use]
    pub fn heading(&self) -> f32 {
        let mut heading_deg = libm::atan2f(self.y, self.x).to_degrees();
        if heading_deg < 0.0 {
            heading_deg += 360.0;
        }
        heading_deg
    }
}

/// Factory sensitivity adjustment read from the AK8963 fuse ROM
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagSensitivity {
    /// X-axis multiplier
    pub x: f32,
    /// Y-axis multiplier
    pub y: f32,
    /// Z-axis multiplier
    pub z: f32,
}

impl Default for MagSensitivity {
    fn default() -> Self {
        Self {
            x: 1.0,
            y: 1.0,
            z: 1.0,
        }
    }
}

impl MagSensitivity {
    /// Decode the `ASAX`, `ASAY`, `ASAZ` bytes
    ///
    /// `adjustment = (asa - 128) / 256 + 1`
    #[must_use]
    pub fn from_asa(asa: [u8; 3]) -> Self {
        let decode = |value: u8| (f32::from(value) - 128.0) / 256.0 + 1.0;
        Self {
            x: decode(asa[0]),
            y: decode(asa[1]),
            z: decode(asa[2]),
        }
    }
}

/// Magnetometer calibration data
///
/// Compensates for hard-iron (offset, mG) and soft-iron (scale) effects.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagCalibration {
    /// Hard-iron bias for X-axis in mG
    pub bias_x: f32,
    /// Hard-iron bias for Y-axis in mG
    pub bias_y: f32,
    /// Hard-iron bias for Z-axis in mG
    pub bias_z: f32,
    /// Soft-iron scale for X-axis
    pub scale_x: f32,
    /// Soft-iron scale for Y-axis
    pub scale_y: f32,
    /// Soft-iron scale for Z-axis
    pub scale_z: f32,
}

impl Default for MagCalibration {
    fn default() -> Self {
        Self {
            bias_x: 0.0,
            bias_y: 0.0,
            bias_z: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            scale_z: 1.0,
        }
    }
}

impl MagCalibration {
    /// Convert raw counts to milligauss and apply the corrections
    ///
    /// `(raw * resolution * sensitivity - bias) * scale`
    #[must_use]
    pub fn apply(
        &self,
        raw_x: i16,
        raw_y: i16,
        raw_z: i16,
        resolution: f32,
        sensitivity: &MagSensitivity,
    ) -> MagDataMilliGauss {
        MagDataMilliGauss {
            x: (f32::from(raw_x) * resolution * sensitivity.x - self.bias_x) * self.scale_x,
            y: (f32::from(raw_y) * resolution * sensitivity.y - self.bias_y) * self.scale_y,
            z: (f32::from(raw_z) * resolution * sensitivity.z - self.bias_z) * self.scale_z,
        }
    }
}
